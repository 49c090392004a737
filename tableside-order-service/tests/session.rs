use std::sync::Arc;
use std::time::Duration;

use bigdecimal::BigDecimal;
use chrono::Utc;
use tokio::time::timeout;
use uuid::Uuid;

use tableside_order_service::events::{OrderEvent, OrderNotification};
use tableside_order_service::hub::EventHub;
use tableside_order_service::models::{Order, OrderStatus, Restaurant};
use tableside_order_service::transport::memory::memory_transport;

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

#[tokio::test]
async fn session_writes_queued_events_to_its_transport() {
    let hub = Arc::new(EventHub::new());
    let r1 = Uuid::new_v4();
    let session = hub.subscribe([r1].into());
    let (sink, watch, mut handle) = memory_transport();

    let worker = tokio::spawn(session.run(sink, watch));

    hub.publish(event_for(r1, "a"));
    hub.publish(event_for(r1, "b"));

    let first = handle.delivered().await.expect("first");
    let second = handle.delivered().await.expect("second");
    assert_eq!(first.notification().order.customer_name, "a");
    assert_eq!(second.notification().order.customer_name, "b");

    handle.close();
    timeout(Duration::from_secs(1), worker)
        .await
        .expect("teardown")
        .expect("task");
    assert_eq!(hub.session_count(), 0);
}

#[tokio::test]
async fn peer_close_tears_the_session_down() {
    let hub = Arc::new(EventHub::new());
    let session = hub.subscribe([Uuid::new_v4()].into());
    let (sink, watch, mut handle) = memory_transport();

    handle.close();
    timeout(Duration::from_secs(1), session.run(sink, watch))
        .await
        .expect("teardown");
    assert_eq!(hub.session_count(), 0);
}

#[tokio::test]
async fn write_failure_tears_the_session_down() {
    let hub = Arc::new(EventHub::new());
    let r1 = Uuid::new_v4();
    let session = hub.subscribe([r1].into());
    let (sink, watch, handle) = memory_transport();
    handle.sever();

    hub.publish(event_for(r1, "doomed"));
    timeout(Duration::from_secs(1), session.run(sink, watch))
        .await
        .expect("teardown");
    assert_eq!(hub.session_count(), 0);
}

#[tokio::test]
async fn hub_side_disconnect_ends_a_running_session() {
    let hub = Arc::new(EventHub::with_capacity(1));
    let r1 = Uuid::new_v4();
    let session = hub.subscribe([r1].into());

    // Second publish overflows the queue and the hub drops the session
    // before it ever starts draining.
    hub.publish(event_for(r1, "kept"));
    hub.publish(event_for(r1, "overflow"));
    assert_eq!(hub.session_count(), 0);

    let (sink, watch, mut handle) = memory_transport();
    timeout(Duration::from_secs(1), session.run(sink, watch))
        .await
        .expect("teardown");

    // The buffered event still went out before the closed queue ended the
    // session.
    let delivered = handle.delivered().await.expect("buffered");
    assert_eq!(delivered.notification().order.customer_name, "kept");
    assert!(handle.delivered().await.is_none());
}
