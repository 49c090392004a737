use axum::{
    Router,
    extract::{Path, State},
    http::HeaderMap,
    response::Json,
    routing::{get, patch, post},
};
use tracing::instrument;
use uuid::Uuid;

use tableside_order_service::models::OrderStatus;
use tableside_order_service::orders::{NewOrder, NewOrderLine};

use crate::error::ApiError;
use crate::models::*;

use super::{AppState, extract_username, owned_restaurants, verify_restaurant_ownership};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_all_orders))
        .route("/orders/{id}", get(get_order).delete(delete_order))
        .route("/orders/{id}/status", patch(update_order_status))
        .route(
            "/restaurants/{restaurant_id}/orders",
            post(create_order).get(list_orders),
        )
        .route(
            "/public/restaurants/{restaurant_id}/orders",
            post(create_public_order),
        )
}

fn new_order(payload: CreateOrderRequest) -> NewOrder {
    NewOrder {
        table_id: payload.table_id,
        customer_name: payload.customer_name,
        lines: payload
            .order_items
            .into_iter()
            .map(|item| NewOrderLine {
                menu_item_id: item.menu_item_id,
                quantity: item.quantity,
                special_instructions: item.special_instructions.unwrap_or_default(),
            })
            .collect(),
    }
}

#[utoipa::path(
    post,
    path = "/restaurants/{restaurant_id}/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "Order created successfully", body = OrderResponse),
        (status = 400, description = "Insufficient stock", body = ApiErrorResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 404, description = "Restaurant, table, or menu item not found", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "orders"
)]
#[instrument(skip(state))]
pub async fn create_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(restaurant_id): Path<Uuid>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let username = extract_username(&headers, &state)?;
    let restaurant = verify_restaurant_ownership(&state, &username, restaurant_id)?;

    let order = state
        .orders
        .place_order(restaurant.id, new_order(payload))
        .await?;
    Ok(Json(order.into()))
}

#[utoipa::path(
    post,
    path = "/public/restaurants/{restaurant_id}/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "Order created successfully", body = OrderResponse),
        (status = 400, description = "Insufficient stock", body = ApiErrorResponse),
        (status = 404, description = "Restaurant, table, or menu item not found", body = ApiErrorResponse),
    ),
    tag = "orders"
)]
#[instrument(skip(state))]
pub async fn create_public_order(
    State(state): State<AppState>,
    Path(restaurant_id): Path<Uuid>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    // The QR flow: same placement path as staff, no authentication.
    let order = state
        .orders
        .place_order(restaurant_id, new_order(payload))
        .await?;
    Ok(Json(order.into()))
}

#[utoipa::path(
    get,
    path = "/restaurants/{restaurant_id}/orders",
    responses(
        (status = 200, description = "Orders of the restaurant", body = [OrderResponse]),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 404, description = "Restaurant not found", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "orders"
)]
#[instrument(skip(state))]
pub async fn list_orders(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(restaurant_id): Path<Uuid>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let username = extract_username(&headers, &state)?;
    let restaurant = verify_restaurant_ownership(&state, &username, restaurant_id)?;
    let orders = state
        .orders
        .list_orders(restaurant.id)
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(orders))
}

#[utoipa::path(
    get,
    path = "/orders",
    responses(
        (status = 200, description = "Orders across every restaurant the caller owns", body = [OrderWithRestaurantResponse]),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "orders"
)]
#[instrument(skip(state))]
pub async fn list_all_orders(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<OrderWithRestaurantResponse>>, ApiError> {
    let username = extract_username(&headers, &state)?;
    let owned = owned_restaurants(&state, &username);
    let orders = state
        .orders
        .list_all_orders(&owned)
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(orders))
}

#[utoipa::path(
    get,
    path = "/orders/{id}",
    responses(
        (status = 200, description = "The order", body = OrderResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 404, description = "Order not found", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "orders"
)]
#[instrument(skip(state))]
pub async fn get_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderResponse>, ApiError> {
    let username = extract_username(&headers, &state)?;
    let owned = owned_restaurants(&state, &username);
    let order = state.orders.get_order(&owned, id)?;
    Ok(Json(order.into()))
}

#[utoipa::path(
    patch,
    path = "/orders/{id}/status",
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Order status updated", body = OrderResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 404, description = "Order not found", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "orders"
)]
#[instrument(skip(state))]
pub async fn update_order_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let username = extract_username(&headers, &state)?;
    let owned = owned_restaurants(&state, &username);
    let order = state
        .orders
        .update_status(&owned, id, OrderStatus::from(payload.status))?;
    Ok(Json(order.into()))
}

#[utoipa::path(
    delete,
    path = "/orders/{id}",
    responses(
        (status = 200, description = "Order deleted"),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 404, description = "Order not found", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "orders"
)]
#[instrument(skip(state))]
pub async fn delete_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let username = extract_username(&headers, &state)?;
    let owned = owned_restaurants(&state, &username);
    state.orders.delete_order(&owned, id)?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}
