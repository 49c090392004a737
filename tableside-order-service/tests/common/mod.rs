use std::sync::Arc;

use bigdecimal::BigDecimal;
use uuid::Uuid;

use tableside_order_service::hub::EventHub;
use tableside_order_service::models::{DiningTable, MenuItem, Restaurant};
use tableside_order_service::orders::{NewOrderLine, OrderService};
use tableside_order_service::store::MemoryStore;

pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub hub: Arc<EventHub>,
    pub service: Arc<OrderService>,
    pub restaurant: Restaurant,
    pub table: DiningTable,
}

/// One restaurant with one table, owned by "alice".
pub fn fixture() -> Fixture {
    let store = Arc::new(MemoryStore::new());
    let hub = Arc::new(EventHub::new());
    let service = Arc::new(OrderService::new(Arc::clone(&store), Arc::clone(&hub)));

    let restaurant = Restaurant {
        id: Uuid::new_v4(),
        owner: "alice".to_string(),
        name: "Trattoria Uno".to_string(),
        address: "1 Via Roma".to_string(),
        phone_number: "555-0100".to_string(),
    };
    let table = DiningTable {
        id: Uuid::new_v4(),
        restaurant_id: restaurant.id,
        table_number: 4,
    };
    store.insert_restaurant(restaurant.clone());
    store.insert_table(table.clone());

    Fixture {
        store,
        hub,
        service,
        restaurant,
        table,
    }
}

pub fn menu_item(
    store: &MemoryStore,
    restaurant_id: Uuid,
    name: &str,
    price: i64,
    quantity: i32,
) -> MenuItem {
    let item = MenuItem {
        id: Uuid::new_v4(),
        restaurant_id,
        name: name.to_string(),
        description: format!("{name} of the house"),
        price: BigDecimal::from(price),
        category: "main".to_string(),
        quantity,
    };
    store.insert_menu_item(item.clone());
    item
}

pub fn line(menu_item_id: Uuid, quantity: i32) -> NewOrderLine {
    NewOrderLine {
        menu_item_id,
        quantity,
        special_instructions: String::new(),
    }
}
