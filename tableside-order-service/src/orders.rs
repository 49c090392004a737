use std::collections::HashSet;
use std::sync::Arc;

use bigdecimal::BigDecimal;
use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::events::{OrderEventPublisher, OrderNotification};
use crate::hub::EventHub;
use crate::models::{Order, OrderLine, OrderStatus};
use crate::store::{MemoryStore, ReserveError, StoreError};

#[derive(Error, Debug)]
pub enum PlaceOrderError {
    #[error("restaurant not found")]
    RestaurantNotFound,
    #[error("table not found")]
    TableNotFound,
    #[error("table does not belong to this restaurant")]
    TableMismatch,
    #[error("menu item {0} not found")]
    ItemNotFound(Uuid),
    #[error("insufficient stock for item: {0}")]
    InsufficientStock(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Error, Debug)]
pub enum OrderAccessError {
    #[error("order not found")]
    NotFound,
}

#[derive(Debug, Clone)]
pub struct NewOrderLine {
    pub menu_item_id: Uuid,
    pub quantity: i32,
    pub special_instructions: String,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub table_id: Uuid,
    pub customer_name: String,
    pub lines: Vec<NewOrderLine>,
}

/// Coordinates order placement and status changes: one atomic unit of work
/// against the store per call, then a fire-and-forget event to the hub.
#[derive(Debug)]
pub struct OrderService {
    store: Arc<MemoryStore>,
    publisher: OrderEventPublisher,
}

impl OrderService {
    pub fn new(store: Arc<MemoryStore>, hub: Arc<EventHub>) -> Self {
        Self {
            store,
            publisher: OrderEventPublisher::new(hub),
        }
    }

    /// Place an order for a table. Every requested line is reserved against
    /// the menu item rows under their locks; the order and all stock
    /// decrements land in one commit, or none of them land at all.
    pub async fn place_order(
        &self,
        restaurant_id: Uuid,
        request: NewOrder,
    ) -> Result<Order, PlaceOrderError> {
        let restaurant = self
            .store
            .get_restaurant(restaurant_id)
            .map_err(|_| PlaceOrderError::RestaurantNotFound)?;
        let table = self
            .store
            .get_table(request.table_id)
            .map_err(|_| PlaceOrderError::TableNotFound)?;
        if table.restaurant_id != restaurant.id {
            return Err(PlaceOrderError::TableMismatch);
        }

        let mut reservation = self
            .store
            .lock_menu_items(
                restaurant.id,
                request.lines.iter().map(|line| line.menu_item_id),
            )
            .await
            .map_err(|err| match err {
                ReserveError::NotFound(id) => PlaceOrderError::ItemNotFound(id),
                ReserveError::InsufficientStock { name, .. } => {
                    PlaceOrderError::InsufficientStock(name)
                }
            })?;

        let order_id = Uuid::new_v4();
        let mut total_amount = BigDecimal::from(0);
        let mut line_items = Vec::with_capacity(request.lines.len());

        for line in &request.lines {
            let item = reservation
                .item(line.menu_item_id)
                .ok_or(PlaceOrderError::ItemNotFound(line.menu_item_id))?;
            let name = item.name.clone();
            let price = item.price.clone();

            // Zero and negative quantities count as a single item.
            let quantity = if line.quantity <= 0 { 1 } else { line.quantity };

            reservation
                .reserve(line.menu_item_id, quantity)
                .map_err(|err| match err {
                    ReserveError::NotFound(id) => PlaceOrderError::ItemNotFound(id),
                    ReserveError::InsufficientStock { name, .. } => {
                        PlaceOrderError::InsufficientStock(name)
                    }
                })?;

            total_amount += &price * BigDecimal::from(quantity);
            line_items.push(OrderLine {
                id: Uuid::new_v4(),
                order_id,
                menu_item_id: line.menu_item_id,
                name,
                quantity,
                price,
                special_instructions: line.special_instructions.clone(),
            });
        }

        let now = Utc::now();
        let order = reservation.commit(Order {
            id: order_id,
            table_id: table.id,
            customer_name: request.customer_name,
            status: OrderStatus::Pending,
            total_amount,
            created_at: now,
            updated_at: now,
            line_items,
        })?;

        tracing::info!(order = %order.id, restaurant = %restaurant.id, "order placed");
        self.publisher.order_created(&order, &restaurant);
        Ok(order)
    }

    /// Overwrite an order's status. The status is stored as given; there is
    /// no transition check. Orders outside the caller's restaurants do not
    /// exist as far as the caller can tell.
    pub fn update_status(
        &self,
        owned_restaurants: &HashSet<Uuid>,
        order_id: Uuid,
        status: OrderStatus,
    ) -> Result<Order, OrderAccessError> {
        let (_, restaurant) = self.accessible_order(owned_restaurants, order_id)?;
        let order = self
            .store
            .update_order_status(order_id, status)
            .map_err(|_| OrderAccessError::NotFound)?;

        tracing::info!(order = %order.id, status = %order.status, "order status updated");
        self.publisher.order_updated(&order, &restaurant);
        Ok(order)
    }

    pub fn get_order(
        &self,
        owned_restaurants: &HashSet<Uuid>,
        order_id: Uuid,
    ) -> Result<Order, OrderAccessError> {
        let (order, _) = self.accessible_order(owned_restaurants, order_id)?;
        Ok(order)
    }

    pub fn delete_order(
        &self,
        owned_restaurants: &HashSet<Uuid>,
        order_id: Uuid,
    ) -> Result<(), OrderAccessError> {
        self.accessible_order(owned_restaurants, order_id)?;
        self.store
            .delete_order(order_id)
            .map_err(|_| OrderAccessError::NotFound)
    }

    pub fn list_orders(&self, restaurant_id: Uuid) -> Vec<Order> {
        self.store.list_orders(restaurant_id)
    }

    /// Every order across the caller's restaurants, denormalized with the
    /// restaurant identity the way subscribers see them.
    pub fn list_all_orders(&self, owned_restaurants: &HashSet<Uuid>) -> Vec<OrderNotification> {
        let mut all = Vec::new();
        for restaurant_id in owned_restaurants {
            let Ok(restaurant) = self.store.get_restaurant(*restaurant_id) else {
                continue;
            };
            for order in self.store.list_orders(*restaurant_id) {
                all.push(OrderNotification::new(&order, &restaurant));
            }
        }
        all.sort_by_key(|n| n.order.created_at);
        all
    }

    /// Load an order and its restaurant, treating anything outside the
    /// caller's restaurants as nonexistent.
    fn accessible_order(
        &self,
        owned_restaurants: &HashSet<Uuid>,
        order_id: Uuid,
    ) -> Result<(Order, crate::models::Restaurant), OrderAccessError> {
        let order = self
            .store
            .get_order(order_id)
            .map_err(|_| OrderAccessError::NotFound)?;
        let table = self
            .store
            .get_table(order.table_id)
            .map_err(|_| OrderAccessError::NotFound)?;
        if !owned_restaurants.contains(&table.restaurant_id) {
            return Err(OrderAccessError::NotFound);
        }
        let restaurant = self
            .store
            .get_restaurant(table.restaurant_id)
            .map_err(|_| OrderAccessError::NotFound)?;
        Ok((order, restaurant))
    }
}
