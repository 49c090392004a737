use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::hub::EventHub;
use crate::models::{Order, Restaurant};

/// Denormalized order snapshot handed to subscribers: the full order plus
/// the owning restaurant's identity, so a dashboard can render it without a
/// second fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderNotification {
    pub restaurant_id: Uuid,
    pub restaurant_name: String,
    #[serde(flatten)]
    pub order: Order,
}

impl OrderNotification {
    pub fn new(order: &Order, restaurant: &Restaurant) -> Self {
        Self {
            restaurant_id: restaurant.id,
            restaurant_name: restaurant.name.clone(),
            order: order.clone(),
        }
    }
}

/// Order lifecycle event as broadcast over the hub. Serializes to the wire
/// shape `{"type": "order_created", "order": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "order")]
pub enum OrderEvent {
    #[serde(rename = "order_created")]
    Created(OrderNotification),
    #[serde(rename = "order_updated")]
    Updated(OrderNotification),
}

impl OrderEvent {
    /// Restaurant the event belongs to; the hub filters fan-out on this.
    pub fn restaurant_id(&self) -> Uuid {
        match self {
            OrderEvent::Created(n) | OrderEvent::Updated(n) => n.restaurant_id,
        }
    }

    pub fn notification(&self) -> &OrderNotification {
        match self {
            OrderEvent::Created(n) | OrderEvent::Updated(n) => n,
        }
    }
}

/// Publishes order lifecycle events to the hub. Publishing is
/// fire-and-forget: it neither blocks nor fails the surrounding operation.
#[derive(Debug, Clone)]
pub struct OrderEventPublisher {
    hub: Arc<EventHub>,
}

impl OrderEventPublisher {
    pub fn new(hub: Arc<EventHub>) -> Self {
        Self { hub }
    }

    pub fn order_created(&self, order: &Order, restaurant: &Restaurant) {
        self.hub
            .publish(OrderEvent::Created(OrderNotification::new(order, restaurant)));
    }

    pub fn order_updated(&self, order: &Order, restaurant: &Restaurant) {
        self.hub
            .publish(OrderEvent::Updated(OrderNotification::new(order, restaurant)));
    }
}

#[cfg(test)]
mod tests {
    use bigdecimal::BigDecimal;
    use chrono::Utc;

    use super::*;
    use crate::models::OrderStatus;

    #[test]
    fn event_wire_shape_is_tagged() {
        let restaurant = Restaurant {
            id: Uuid::new_v4(),
            owner: "alice".to_string(),
            name: "Trattoria".to_string(),
            address: String::new(),
            phone_number: String::new(),
        };
        let order = Order {
            id: Uuid::new_v4(),
            table_id: Uuid::new_v4(),
            customer_name: "Bob".to_string(),
            status: OrderStatus::Pending,
            total_amount: BigDecimal::from(12),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            line_items: vec![],
        };

        let event = OrderEvent::Created(OrderNotification::new(&order, &restaurant));
        let value = serde_json::to_value(&event).expect("serialize");
        assert_eq!(value["type"], "order_created");
        assert_eq!(value["order"]["restaurant_name"], "Trattoria");
        assert_eq!(value["order"]["status"], "pending");
        assert_eq!(
            value["order"]["id"],
            serde_json::to_value(order.id).expect("uuid")
        );
    }
}
