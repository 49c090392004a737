pub mod events;
pub mod order;
pub mod restaurant;

// Re-export routers for easier importing
pub use events::router as events_router;
pub use order::router as order_router;
pub use restaurant::router as restaurant_router;

use std::collections::HashSet;
use std::sync::Arc;

use axum::http::HeaderMap;
use utoipa::OpenApi;
use uuid::Uuid;

use tableside_order_service::hub::EventHub;
use tableside_order_service::models::Restaurant;
use tableside_order_service::orders::OrderService;
use tableside_order_service::store::MemoryStore;

use crate::auth::TokenResolver;
use crate::error::ApiError;
use crate::models::*;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<MemoryStore>,
    pub hub: Arc<EventHub>,
    pub orders: Arc<OrderService>,
    pub auth: Arc<dyn TokenResolver>,
}

// Shared utility functions
fn extract_username(headers: &HeaderMap, state: &AppState) -> Result<String, ApiError> {
    let auth_header = headers
        .get("authorization")
        .ok_or(ApiError::AuthenticationFailed)?
        .to_str()
        .map_err(|_| ApiError::InvalidToken)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(ApiError::InvalidToken)?;

    state.auth.resolve(token).ok_or(ApiError::InvalidToken)
}

/// A restaurant the caller does not own is reported exactly like one that
/// does not exist.
fn verify_restaurant_ownership(
    state: &AppState,
    username: &str,
    restaurant_id: Uuid,
) -> Result<Restaurant, ApiError> {
    let restaurant = state
        .store
        .get_restaurant(restaurant_id)
        .map_err(|_| ApiError::NotFound("Restaurant not found".to_string()))?;
    if restaurant.owner != username {
        return Err(ApiError::NotFound("Restaurant not found".to_string()));
    }
    Ok(restaurant)
}

fn owned_restaurants(state: &AppState, username: &str) -> HashSet<Uuid> {
    state.store.restaurant_ids_owned_by(username)
}

#[derive(OpenApi)]
#[openapi(
    paths(
        restaurant::create_restaurant,
        restaurant::list_restaurants,
        restaurant::create_table,
        restaurant::list_tables,
        restaurant::create_menu_item,
        restaurant::list_menu_items,
        restaurant::update_menu_item,
        restaurant::delete_menu_item,
        restaurant::public_menu,
        order::create_order,
        order::create_public_order,
        order::list_orders,
        order::list_all_orders,
        order::get_order,
        order::update_order_status,
        order::delete_order,
    ),
    components(schemas(
        CreateRestaurantRequest,
        RestaurantResponse,
        CreateTableRequest,
        TableResponse,
        CreateMenuItemRequest,
        UpdateMenuItemRequest,
        MenuItemResponse,
        CreateOrderRequest,
        OrderItemRequest,
        UpdateOrderStatusRequest,
        OrderResponse,
        OrderLineResponse,
        OrderWithRestaurantResponse,
        ApiErrorResponse,
    )),
    tags(
        (name = "restaurants", description = "Restaurant, table and menu management"),
        (name = "orders", description = "Order placement and tracking"),
    )
)]
pub struct ApiDoc;
