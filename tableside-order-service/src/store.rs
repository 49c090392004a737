use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use bigdecimal::BigDecimal;
use chrono::Utc;
use parking_lot::RwLock;
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::models::{DiningTable, MenuItem, Order, OrderStatus, Restaurant};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("restaurant not found")]
    RestaurantNotFound,
    #[error("table not found")]
    TableNotFound,
    #[error("menu item not found")]
    MenuItemNotFound,
    #[error("order not found")]
    OrderNotFound,
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Outcome of trying to take stock inside a reservation, per item.
#[derive(Error, Debug)]
pub enum ReserveError {
    #[error("menu item {0} not found")]
    NotFound(Uuid),
    #[error("insufficient stock for item: {name}")]
    InsufficientStock {
        name: String,
        requested: i32,
        available: i32,
    },
}

/// Field-wise menu item edit. `None` leaves the field untouched.
#[derive(Debug, Default, Clone)]
pub struct MenuItemUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<BigDecimal>,
    pub category: Option<String>,
    pub quantity: Option<i32>,
}

/// In-memory relational store. Catalog rows live in plain maps; each menu
/// item row sits behind its own async mutex so stock mutations go through
/// an explicit lock-read-validate-write protocol instead of relying on a
/// database client's locking clause.
///
/// The catalog locks are never held across an await point; row guards are.
#[derive(Debug, Default)]
pub struct MemoryStore {
    restaurants: RwLock<HashMap<Uuid, Restaurant>>,
    tables: RwLock<HashMap<Uuid, DiningTable>>,
    menu_items: RwLock<HashMap<Uuid, Arc<Mutex<MenuItem>>>>,
    orders: RwLock<HashMap<Uuid, Order>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- restaurants ----

    pub fn insert_restaurant(&self, restaurant: Restaurant) {
        self.restaurants
            .write()
            .insert(restaurant.id, restaurant);
    }

    pub fn get_restaurant(&self, id: Uuid) -> Result<Restaurant, StoreError> {
        self.restaurants
            .read()
            .get(&id)
            .cloned()
            .ok_or(StoreError::RestaurantNotFound)
    }

    pub fn list_restaurants(&self, owner: &str) -> Vec<Restaurant> {
        let mut restaurants: Vec<_> = self
            .restaurants
            .read()
            .values()
            .filter(|r| r.owner == owner)
            .cloned()
            .collect();
        restaurants.sort_by(|a, b| a.name.cmp(&b.name));
        restaurants
    }

    /// Restaurant ids owned by a principal. This is the entitlement set a
    /// subscriber is registered with at connection time.
    pub fn restaurant_ids_owned_by(&self, owner: &str) -> HashSet<Uuid> {
        self.restaurants
            .read()
            .values()
            .filter(|r| r.owner == owner)
            .map(|r| r.id)
            .collect()
    }

    // ---- tables ----

    pub fn insert_table(&self, table: DiningTable) {
        self.tables.write().insert(table.id, table);
    }

    pub fn get_table(&self, id: Uuid) -> Result<DiningTable, StoreError> {
        self.tables
            .read()
            .get(&id)
            .cloned()
            .ok_or(StoreError::TableNotFound)
    }

    pub fn list_tables(&self, restaurant_id: Uuid) -> Vec<DiningTable> {
        let mut tables: Vec<_> = self
            .tables
            .read()
            .values()
            .filter(|t| t.restaurant_id == restaurant_id)
            .cloned()
            .collect();
        tables.sort_by_key(|t| t.table_number);
        tables
    }

    // ---- menu items ----

    pub fn insert_menu_item(&self, item: MenuItem) {
        self.menu_items
            .write()
            .insert(item.id, Arc::new(Mutex::new(item)));
    }

    pub async fn get_menu_item(&self, id: Uuid) -> Result<MenuItem, StoreError> {
        let row = self
            .menu_items
            .read()
            .get(&id)
            .cloned()
            .ok_or(StoreError::MenuItemNotFound)?;
        let item = row.lock().await;
        Ok(item.clone())
    }

    pub async fn list_menu_items(&self, restaurant_id: Uuid) -> Vec<MenuItem> {
        let rows: Vec<_> = self.menu_items.read().values().cloned().collect();
        let mut items = Vec::new();
        for row in rows {
            let item = row.lock().await;
            if item.restaurant_id == restaurant_id {
                items.push(item.clone());
            }
        }
        items.sort_by(|a, b| a.name.cmp(&b.name));
        items
    }

    /// Owner edit. Takes the row lock, so it serializes against in-flight
    /// reservations instead of racing them.
    pub async fn update_menu_item(
        &self,
        id: Uuid,
        update: MenuItemUpdate,
    ) -> Result<MenuItem, StoreError> {
        let row = self
            .menu_items
            .read()
            .get(&id)
            .cloned()
            .ok_or(StoreError::MenuItemNotFound)?;
        let mut item = row.lock().await;
        if let Some(name) = update.name {
            item.name = name;
        }
        if let Some(description) = update.description {
            item.description = description;
        }
        if let Some(price) = update.price {
            item.price = price;
        }
        if let Some(category) = update.category {
            item.category = category;
        }
        if let Some(quantity) = update.quantity {
            item.quantity = quantity;
        }
        Ok(item.clone())
    }

    pub fn delete_menu_item(&self, id: Uuid) -> Result<(), StoreError> {
        self.menu_items
            .write()
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::MenuItemNotFound)
    }

    /// Open a reservation over every distinct menu item in `ids`, scoped to
    /// one restaurant. Guards are acquired in ascending id order so two
    /// reservations over overlapping item sets cannot deadlock; callers are
    /// free to validate and reserve in whatever order the request listed.
    ///
    /// An id that is absent, or that belongs to another restaurant, fails
    /// the whole acquisition before any stock is touched.
    pub async fn lock_menu_items(
        &self,
        restaurant_id: Uuid,
        ids: impl IntoIterator<Item = Uuid>,
    ) -> Result<MenuItemReservation<'_>, ReserveError> {
        let wanted: BTreeSet<Uuid> = ids.into_iter().collect();
        let mut pending = Vec::with_capacity(wanted.len());
        {
            let items = self.menu_items.read();
            for id in &wanted {
                let row = items.get(id).cloned().ok_or(ReserveError::NotFound(*id))?;
                pending.push((*id, row));
            }
        }

        let mut rows = HashMap::with_capacity(pending.len());
        for (id, row) in pending {
            let guard = row.lock_owned().await;
            if guard.restaurant_id != restaurant_id {
                return Err(ReserveError::NotFound(id));
            }
            rows.insert(id, guard);
        }

        Ok(MenuItemReservation {
            store: self,
            rows,
            staged: HashMap::new(),
        })
    }

    // ---- orders ----

    pub fn get_order(&self, id: Uuid) -> Result<Order, StoreError> {
        self.orders
            .read()
            .get(&id)
            .cloned()
            .ok_or(StoreError::OrderNotFound)
    }

    pub fn list_orders(&self, restaurant_id: Uuid) -> Vec<Order> {
        let table_ids: HashSet<Uuid> = self
            .tables
            .read()
            .values()
            .filter(|t| t.restaurant_id == restaurant_id)
            .map(|t| t.id)
            .collect();
        let mut orders: Vec<_> = self
            .orders
            .read()
            .values()
            .filter(|o| table_ids.contains(&o.table_id))
            .cloned()
            .collect();
        orders.sort_by_key(|o| o.created_at);
        orders
    }

    pub fn update_order_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<Order, StoreError> {
        let mut orders = self.orders.write();
        let order = orders.get_mut(&id).ok_or(StoreError::OrderNotFound)?;
        order.status = status;
        order.updated_at = Utc::now();
        Ok(order.clone())
    }

    pub fn delete_order(&self, id: Uuid) -> Result<(), StoreError> {
        self.orders
            .write()
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::OrderNotFound)
    }
}

/// A pessimistic unit of work over a set of menu item rows. Stock
/// decrements are staged against the locked rows and only become visible
/// on [`commit`], which also persists the order in the same step. Dropping
/// the reservation without committing releases every lock and leaves every
/// row exactly as it was read.
///
/// [`commit`]: MenuItemReservation::commit
pub struct MenuItemReservation<'a> {
    store: &'a MemoryStore,
    rows: HashMap<Uuid, OwnedMutexGuard<MenuItem>>,
    staged: HashMap<Uuid, i32>,
}

impl MenuItemReservation<'_> {
    /// Row state as read under the lock. Staged decrements are tracked
    /// separately and are accounted for by [`reserve`](Self::reserve).
    pub fn item(&self, id: Uuid) -> Option<&MenuItem> {
        self.rows.get(&id).map(|guard| &**guard)
    }

    /// Stage a stock decrement. Stages nothing and reports
    /// [`ReserveError::InsufficientStock`] when the remaining quantity
    /// cannot cover the request.
    pub fn reserve(&mut self, id: Uuid, quantity: i32) -> Result<(), ReserveError> {
        let row = self.rows.get(&id).ok_or(ReserveError::NotFound(id))?;
        let already_staged = self.staged.get(&id).copied().unwrap_or(0);
        let available = row.quantity - already_staged;
        if available < quantity {
            return Err(ReserveError::InsufficientStock {
                name: row.name.clone(),
                requested: quantity,
                available,
            });
        }
        *self.staged.entry(id).or_insert(0) += quantity;
        Ok(())
    }

    /// Apply every staged decrement through the held guards and persist the
    /// order and its lines in the same step. The row locks are released
    /// only after both writes land.
    pub fn commit(mut self, order: Order) -> Result<Order, StoreError> {
        for (id, reserved) in self.staged.drain() {
            if let Some(guard) = self.rows.get_mut(&id) {
                guard.quantity -= reserved;
            }
        }
        self.store.orders.write().insert(order.id, order.clone());
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(restaurant_id: Uuid, name: &str, quantity: i32) -> MenuItem {
        MenuItem {
            id: Uuid::new_v4(),
            restaurant_id,
            name: name.to_string(),
            description: String::new(),
            price: BigDecimal::from(5),
            category: "main".to_string(),
            quantity,
        }
    }

    #[tokio::test]
    async fn reservation_rolls_back_on_drop() {
        let store = MemoryStore::new();
        let restaurant_id = Uuid::new_v4();
        let row = item(restaurant_id, "soup", 3);
        let id = row.id;
        store.insert_menu_item(row);

        {
            let mut reservation = store
                .lock_menu_items(restaurant_id, [id])
                .await
                .expect("lock");
            reservation.reserve(id, 2).expect("reserve");
            // dropped without commit
        }

        assert_eq!(store.get_menu_item(id).await.expect("get").quantity, 3);
    }

    #[tokio::test]
    async fn reserve_clamps_instead_of_going_negative() {
        let store = MemoryStore::new();
        let restaurant_id = Uuid::new_v4();
        let row = item(restaurant_id, "soup", 1);
        let id = row.id;
        store.insert_menu_item(row);

        let mut reservation = store
            .lock_menu_items(restaurant_id, [id])
            .await
            .expect("lock");
        reservation.reserve(id, 1).expect("first unit fits");
        let err = reservation.reserve(id, 1).expect_err("second must fail");
        assert!(matches!(
            err,
            ReserveError::InsufficientStock { available: 0, .. }
        ));
    }

    #[tokio::test]
    async fn cross_restaurant_items_are_invisible() {
        let store = MemoryStore::new();
        let mine = Uuid::new_v4();
        let theirs = Uuid::new_v4();
        let row = item(theirs, "soup", 5);
        let id = row.id;
        store.insert_menu_item(row);

        let err = store
            .lock_menu_items(mine, [id])
            .await
            .err()
            .expect("must not lock");
        assert!(matches!(err, ReserveError::NotFound(found) if found == id));
    }
}
