use axum::{
    Router,
    extract::{Path, State},
    http::HeaderMap,
    response::Json,
    routing::{get, patch, post},
};
use bigdecimal::BigDecimal;
use tracing::instrument;
use uuid::Uuid;

use tableside_order_service::models::{DiningTable, MenuItem, Restaurant};
use tableside_order_service::store::MenuItemUpdate;

use crate::error::ApiError;
use crate::models::*;

use super::{AppState, extract_username, verify_restaurant_ownership};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/restaurants",
            post(create_restaurant).get(list_restaurants),
        )
        .route(
            "/restaurants/{restaurant_id}/tables",
            post(create_table).get(list_tables),
        )
        .route(
            "/restaurants/{restaurant_id}/menu-items",
            post(create_menu_item).get(list_menu_items),
        )
        .route(
            "/restaurants/{restaurant_id}/menu-items/{item_id}",
            patch(update_menu_item).delete(delete_menu_item),
        )
        .route("/restaurants/{restaurant_id}/menu", get(public_menu))
}

#[utoipa::path(
    post,
    path = "/restaurants",
    request_body = CreateRestaurantRequest,
    responses(
        (status = 200, description = "Restaurant created successfully", body = RestaurantResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "restaurants"
)]
#[instrument(skip(state))]
pub async fn create_restaurant(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateRestaurantRequest>,
) -> Result<Json<RestaurantResponse>, ApiError> {
    let username = extract_username(&headers, &state)?;

    let restaurant = Restaurant {
        id: Uuid::new_v4(),
        owner: username,
        name: payload.name,
        address: payload.address,
        phone_number: payload.phone_number.unwrap_or_default(),
    };
    state.store.insert_restaurant(restaurant.clone());

    Ok(Json(restaurant.into()))
}

#[utoipa::path(
    get,
    path = "/restaurants",
    responses(
        (status = 200, description = "Restaurants owned by the caller", body = [RestaurantResponse]),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "restaurants"
)]
#[instrument(skip(state))]
pub async fn list_restaurants(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<RestaurantResponse>>, ApiError> {
    let username = extract_username(&headers, &state)?;
    let restaurants = state
        .store
        .list_restaurants(&username)
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(restaurants))
}

#[utoipa::path(
    post,
    path = "/restaurants/{restaurant_id}/tables",
    request_body = CreateTableRequest,
    responses(
        (status = 200, description = "Table created successfully", body = TableResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 404, description = "Restaurant not found", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "restaurants"
)]
#[instrument(skip(state))]
pub async fn create_table(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(restaurant_id): Path<Uuid>,
    Json(payload): Json<CreateTableRequest>,
) -> Result<Json<TableResponse>, ApiError> {
    let username = extract_username(&headers, &state)?;
    let restaurant = verify_restaurant_ownership(&state, &username, restaurant_id)?;

    let table = DiningTable {
        id: Uuid::new_v4(),
        restaurant_id: restaurant.id,
        table_number: payload.table_number,
    };
    state.store.insert_table(table.clone());

    Ok(Json(table.into()))
}

#[utoipa::path(
    get,
    path = "/restaurants/{restaurant_id}/tables",
    responses(
        (status = 200, description = "Tables of the restaurant", body = [TableResponse]),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 404, description = "Restaurant not found", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "restaurants"
)]
#[instrument(skip(state))]
pub async fn list_tables(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(restaurant_id): Path<Uuid>,
) -> Result<Json<Vec<TableResponse>>, ApiError> {
    let username = extract_username(&headers, &state)?;
    let restaurant = verify_restaurant_ownership(&state, &username, restaurant_id)?;
    let tables = state
        .store
        .list_tables(restaurant.id)
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(tables))
}

#[utoipa::path(
    post,
    path = "/restaurants/{restaurant_id}/menu-items",
    request_body = CreateMenuItemRequest,
    responses(
        (status = 200, description = "Menu item created successfully", body = MenuItemResponse),
        (status = 400, description = "Invalid price", body = ApiErrorResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 404, description = "Restaurant not found", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "restaurants"
)]
#[instrument(skip(state))]
pub async fn create_menu_item(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(restaurant_id): Path<Uuid>,
    Json(payload): Json<CreateMenuItemRequest>,
) -> Result<Json<MenuItemResponse>, ApiError> {
    let username = extract_username(&headers, &state)?;
    let restaurant = verify_restaurant_ownership(&state, &username, restaurant_id)?;

    let price = payload
        .price
        .parse::<BigDecimal>()
        .map_err(|_| ApiError::InvalidInput("Invalid price".to_string()))?;

    let item = MenuItem {
        id: Uuid::new_v4(),
        restaurant_id: restaurant.id,
        name: payload.name,
        description: payload.description.unwrap_or_default(),
        price,
        category: payload.category.unwrap_or_default(),
        quantity: payload.quantity.unwrap_or(0),
    };
    state.store.insert_menu_item(item.clone());

    Ok(Json(item.into()))
}

#[utoipa::path(
    get,
    path = "/restaurants/{restaurant_id}/menu-items",
    responses(
        (status = 200, description = "Menu items of the restaurant", body = [MenuItemResponse]),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 404, description = "Restaurant not found", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "restaurants"
)]
#[instrument(skip(state))]
pub async fn list_menu_items(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(restaurant_id): Path<Uuid>,
) -> Result<Json<Vec<MenuItemResponse>>, ApiError> {
    let username = extract_username(&headers, &state)?;
    let restaurant = verify_restaurant_ownership(&state, &username, restaurant_id)?;
    let items = state
        .store
        .list_menu_items(restaurant.id)
        .await
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(items))
}

#[utoipa::path(
    patch,
    path = "/restaurants/{restaurant_id}/menu-items/{item_id}",
    request_body = UpdateMenuItemRequest,
    responses(
        (status = 200, description = "Menu item updated successfully", body = MenuItemResponse),
        (status = 400, description = "Invalid price", body = ApiErrorResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 404, description = "Restaurant or menu item not found", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "restaurants"
)]
#[instrument(skip(state))]
pub async fn update_menu_item(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((restaurant_id, item_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateMenuItemRequest>,
) -> Result<Json<MenuItemResponse>, ApiError> {
    let username = extract_username(&headers, &state)?;
    let restaurant = verify_restaurant_ownership(&state, &username, restaurant_id)?;

    let existing = state.store.get_menu_item(item_id).await?;
    if existing.restaurant_id != restaurant.id {
        return Err(ApiError::NotFound("Menu item not found".to_string()));
    }

    let price = payload
        .price
        .map(|p| {
            p.parse::<BigDecimal>()
                .map_err(|_| ApiError::InvalidInput("Invalid price".to_string()))
        })
        .transpose()?;

    let item = state
        .store
        .update_menu_item(
            item_id,
            MenuItemUpdate {
                name: payload.name,
                description: payload.description,
                price,
                category: payload.category,
                quantity: payload.quantity,
            },
        )
        .await?;

    Ok(Json(item.into()))
}

#[utoipa::path(
    delete,
    path = "/restaurants/{restaurant_id}/menu-items/{item_id}",
    responses(
        (status = 200, description = "Menu item deleted"),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 404, description = "Restaurant or menu item not found", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "restaurants"
)]
#[instrument(skip(state))]
pub async fn delete_menu_item(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((restaurant_id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let username = extract_username(&headers, &state)?;
    let restaurant = verify_restaurant_ownership(&state, &username, restaurant_id)?;

    let existing = state.store.get_menu_item(item_id).await?;
    if existing.restaurant_id != restaurant.id {
        return Err(ApiError::NotFound("Menu item not found".to_string()));
    }
    state.store.delete_menu_item(item_id)?;

    Ok(Json(serde_json::json!({ "deleted": item_id })))
}

#[utoipa::path(
    get,
    path = "/restaurants/{restaurant_id}/menu",
    responses(
        (status = 200, description = "Menu visible to customers", body = [MenuItemResponse]),
        (status = 404, description = "Restaurant not found", body = ApiErrorResponse),
    ),
    tag = "restaurants"
)]
#[instrument(skip(state))]
pub async fn public_menu(
    State(state): State<AppState>,
    Path(restaurant_id): Path<Uuid>,
) -> Result<Json<Vec<MenuItemResponse>>, ApiError> {
    // The QR landing page; no authentication.
    let restaurant = state.store.get_restaurant(restaurant_id)?;
    let items = state
        .store
        .list_menu_items(restaurant.id)
        .await
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(items))
}
