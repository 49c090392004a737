use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use tableside_order_service::events::OrderNotification;
use tableside_order_service::models::{DiningTable, MenuItem, Order, OrderLine, Restaurant};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateRestaurantRequest {
    /// Name of the restaurant
    pub name: String,
    /// Address of the restaurant
    pub address: String,
    /// Contact phone number
    pub phone_number: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RestaurantResponse {
    /// Unique identifier for the restaurant
    pub id: Uuid,
    /// Name of the restaurant
    pub name: String,
    /// Address of the restaurant
    pub address: String,
    /// Contact phone number
    pub phone_number: String,
}

impl From<Restaurant> for RestaurantResponse {
    fn from(r: Restaurant) -> Self {
        Self {
            id: r.id,
            name: r.name,
            address: r.address,
            phone_number: r.phone_number,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateTableRequest {
    /// Number printed on the physical table
    pub table_number: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TableResponse {
    /// Unique identifier for the table
    pub id: Uuid,
    /// Restaurant the table belongs to
    pub restaurant_id: Uuid,
    /// Number printed on the physical table
    pub table_number: i32,
}

impl From<DiningTable> for TableResponse {
    fn from(t: DiningTable) -> Self {
        Self {
            id: t.id,
            restaurant_id: t.restaurant_id,
            table_number: t.table_number,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateMenuItemRequest {
    /// Name of the menu item
    pub name: String,
    /// Description shown to customers
    pub description: Option<String>,
    /// Price of the menu item (as string)
    pub price: String,
    /// Category, e.g. starter, main, dessert, drink
    pub category: Option<String>,
    /// Initially available quantity
    pub quantity: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateMenuItemRequest {
    /// New name, if changing
    pub name: Option<String>,
    /// New description, if changing
    pub description: Option<String>,
    /// New price (as string), if changing
    pub price: Option<String>,
    /// New category, if changing
    pub category: Option<String>,
    /// New available quantity, if changing
    pub quantity: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MenuItemResponse {
    /// Unique identifier for the menu item
    pub id: Uuid,
    /// Restaurant the item belongs to
    pub restaurant_id: Uuid,
    /// Name of the menu item
    pub name: String,
    /// Description shown to customers
    pub description: String,
    /// Price of the menu item (as string)
    pub price: String,
    /// Category of the item
    pub category: String,
    /// Currently available quantity
    pub quantity: i32,
}

impl From<MenuItem> for MenuItemResponse {
    fn from(i: MenuItem) -> Self {
        Self {
            id: i.id,
            restaurant_id: i.restaurant_id,
            name: i.name,
            description: i.description,
            price: i.price.to_string(),
            category: i.category,
            quantity: i.quantity,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderItemRequest {
    /// Menu item being ordered
    pub menu_item_id: Uuid,
    /// Requested quantity; zero or less counts as one
    pub quantity: i32,
    /// Free-text preparation notes
    pub special_instructions: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    /// Table the order is placed from
    pub table_id: Uuid,
    /// Name of the customer placing the order
    pub customer_name: String,
    /// Ordered items
    pub order_items: Vec<OrderItemRequest>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    /// New status value, stored as given
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderLineResponse {
    /// Unique identifier for the order line
    pub id: Uuid,
    /// Menu item the line refers to
    pub menu_item_id: Uuid,
    /// Item name captured at placement time
    pub name: String,
    /// Ordered quantity
    pub quantity: i32,
    /// Unit price captured at placement time (as string)
    pub price: String,
    /// Free-text preparation notes
    pub special_instructions: String,
}

impl From<OrderLine> for OrderLineResponse {
    fn from(l: OrderLine) -> Self {
        Self {
            id: l.id,
            menu_item_id: l.menu_item_id,
            name: l.name,
            quantity: l.quantity,
            price: l.price.to_string(),
            special_instructions: l.special_instructions,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    /// Unique identifier for the order
    pub id: Uuid,
    /// Table the order was placed from
    pub table_id: Uuid,
    /// Name of the customer
    pub customer_name: String,
    /// Current order status
    pub status: String,
    /// Order total (as string)
    pub total_amount: String,
    /// When the order was placed
    pub created_at: DateTime<Utc>,
    /// When the order last changed
    pub updated_at: DateTime<Utc>,
    /// Ordered items
    pub order_items: Vec<OrderLineResponse>,
}

impl From<Order> for OrderResponse {
    fn from(o: Order) -> Self {
        Self {
            id: o.id,
            table_id: o.table_id,
            customer_name: o.customer_name,
            status: o.status.as_str().to_string(),
            total_amount: o.total_amount.to_string(),
            created_at: o.created_at,
            updated_at: o.updated_at,
            order_items: o.line_items.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithRestaurantResponse {
    /// Restaurant the order belongs to
    pub restaurant_id: Uuid,
    /// Name of that restaurant
    pub restaurant_name: String,
    /// The order itself, flattened into this object
    #[serde(flatten)]
    pub order: OrderResponse,
}

impl From<OrderNotification> for OrderWithRestaurantResponse {
    fn from(n: OrderNotification) -> Self {
        Self {
            restaurant_id: n.restaurant_id,
            restaurant_name: n.restaurant_name,
            order: n.order.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiErrorResponse {
    /// Error message
    pub error: String,
}
