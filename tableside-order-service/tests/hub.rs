use std::sync::Arc;
use std::time::Duration;

use bigdecimal::BigDecimal;
use chrono::Utc;
use tokio::time::timeout;
use uuid::Uuid;

use tableside_order_service::events::{OrderEvent, OrderNotification};
use tableside_order_service::hub::EventHub;
use tableside_order_service::models::{Order, OrderStatus, Restaurant};

fn event_for(restaurant_id: Uuid, customer: &str) -> OrderEvent {
    let restaurant = Restaurant {
        id: restaurant_id,
        owner: "alice".to_string(),
        name: "Trattoria Uno".to_string(),
        address: String::new(),
        phone_number: String::new(),
    };
    let order = Order {
        id: Uuid::new_v4(),
        table_id: Uuid::new_v4(),
        customer_name: customer.to_string(),
        status: OrderStatus::Pending,
        total_amount: BigDecimal::from(10),
        created_at: Utc::now(),
        updated_at: Utc::now(),
        line_items: vec![],
    };
    OrderEvent::Created(OrderNotification::new(&order, &restaurant))
}

fn customer(event: &OrderEvent) -> String {
    event.notification().order.customer_name.clone()
}

#[tokio::test]
async fn fanout_follows_entitlement_sets_exactly() {
    let hub = Arc::new(EventHub::new());
    let r1 = Uuid::new_v4();
    let r2 = Uuid::new_v4();
    let r3 = Uuid::new_v4();

    let mut both = hub.subscribe([r1, r2].into());
    let mut third = hub.subscribe([r3].into());

    hub.publish(event_for(r1, "a"));
    hub.publish(event_for(r2, "b"));
    hub.publish(event_for(r3, "c"));

    let first = both.next_event().await.expect("event");
    let second = both.next_event().await.expect("event");
    assert_eq!(customer(&first), "a");
    assert_eq!(customer(&second), "b");

    let only = third.next_event().await.expect("event");
    assert_eq!(customer(&only), "c");

    // Nothing else is pending for either session.
    assert!(timeout(Duration::from_millis(50), both.next_event())
        .await
        .is_err());
    assert!(timeout(Duration::from_millis(50), third.next_event())
        .await
        .is_err());
}

#[tokio::test]
async fn events_for_one_restaurant_arrive_in_publish_order() {
    let hub = Arc::new(EventHub::new());
    let r1 = Uuid::new_v4();
    let mut session = hub.subscribe([r1].into());

    for i in 0..10 {
        hub.publish(event_for(r1, &format!("c{i}")));
    }
    for i in 0..10 {
        let event = session.next_event().await.expect("event");
        assert_eq!(customer(&event), format!("c{i}"));
    }
}

#[tokio::test]
async fn saturated_subscriber_is_dropped_without_stalling_the_rest() {
    let hub = Arc::new(EventHub::with_capacity(4));
    let r1 = Uuid::new_v4();

    let mut slow = hub.subscribe([r1].into());
    let mut fast = hub.subscribe([r1].into());
    assert_eq!(hub.session_count(), 2);

    // Fill both queues to the brim; nobody is over the line yet.
    for i in 0..4 {
        hub.publish(event_for(r1, &format!("c{i}")));
    }
    assert_eq!(hub.session_count(), 2);

    // Only the fast session drains.
    for i in 0..4 {
        let event = fast.next_event().await.expect("event");
        assert_eq!(customer(&event), format!("c{i}"));
    }

    // The next publish overflows the stalled session's queue. Publish is
    // synchronous, so merely returning from the call shows nothing blocked
    // on the stalled consumer.
    hub.publish(event_for(r1, "c4"));

    assert_eq!(hub.session_count(), 1);
    assert!(!hub.is_registered(slow.id()));
    assert!(hub.is_registered(fast.id()));

    let event = timeout(Duration::from_secs(1), fast.next_event())
        .await
        .expect("delivery")
        .expect("event");
    assert_eq!(customer(&event), "c4");

    // The dropped session drains what was buffered, then sees its queue
    // closed.
    for i in 0..4 {
        let event = slow.next_event().await.expect("buffered event");
        assert_eq!(customer(&event), format!("c{i}"));
    }
    assert!(slow.next_event().await.is_none());

    // Later traffic still reaches the survivor.
    hub.publish(event_for(r1, "after"));
    let event = fast.next_event().await.expect("event");
    assert_eq!(customer(&event), "after");
}

#[tokio::test]
async fn unregister_is_idempotent_and_stops_delivery() {
    let hub = Arc::new(EventHub::new());
    let r1 = Uuid::new_v4();
    let mut session = hub.subscribe([r1].into());

    hub.unregister(session.id());
    hub.unregister(session.id());
    assert_eq!(hub.session_count(), 0);

    hub.publish(event_for(r1, "late"));
    assert!(session.next_event().await.is_none());
}

#[tokio::test]
async fn dropping_a_session_unregisters_it() {
    let hub = Arc::new(EventHub::new());
    let r1 = Uuid::new_v4();
    let session = hub.subscribe([r1].into());
    assert_eq!(hub.session_count(), 1);
    drop(session);
    assert_eq!(hub.session_count(), 0);

    // Publishing into an empty membership set is a no-op.
    hub.publish(event_for(r1, "nobody"));
}

#[tokio::test]
async fn session_with_no_entitlements_receives_nothing() {
    let hub = Arc::new(EventHub::new());
    let mut session = hub.subscribe(Default::default());
    hub.publish(event_for(Uuid::new_v4(), "a"));
    assert!(timeout(Duration::from_millis(50), session.next_event())
        .await
        .is_err());
}
