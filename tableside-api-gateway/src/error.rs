use axum::{http::StatusCode, response::Json};
use serde_json::json;

use tableside_order_service::orders::{OrderAccessError, PlaceOrderError};
use tableside_order_service::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Authentication failed")]
    AuthenticationFailed,
    #[error("Invalid token")]
    InvalidToken,
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error("Insufficient stock for item: {0}")]
    InsufficientStock(String),
    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_message) = match &self {
            ApiError::AuthenticationFailed => (
                StatusCode::UNAUTHORIZED,
                "Authentication failed".to_string(),
            ),
            ApiError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid token".to_string()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::InsufficientStock(item) => (
                StatusCode::BAD_REQUEST,
                format!("Insufficient stock for item: {item}"),
            ),
            ApiError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}

impl From<PlaceOrderError> for ApiError {
    fn from(err: PlaceOrderError) -> Self {
        match err {
            PlaceOrderError::RestaurantNotFound => {
                ApiError::NotFound("Restaurant not found".to_string())
            }
            PlaceOrderError::TableNotFound => ApiError::NotFound("Table not found".to_string()),
            PlaceOrderError::TableMismatch => {
                ApiError::NotFound("Table does not belong to this restaurant".to_string())
            }
            PlaceOrderError::ItemNotFound(_) => {
                ApiError::NotFound("Menu item not found".to_string())
            }
            PlaceOrderError::InsufficientStock(item) => ApiError::InsufficientStock(item),
            PlaceOrderError::Store(err) => ApiError::InternalError(err.to_string()),
        }
    }
}

impl From<OrderAccessError> for ApiError {
    fn from(err: OrderAccessError) -> Self {
        match err {
            OrderAccessError::NotFound => ApiError::NotFound("Order not found".to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::RestaurantNotFound => {
                ApiError::NotFound("Restaurant not found".to_string())
            }
            StoreError::TableNotFound => ApiError::NotFound("Table not found".to_string()),
            StoreError::MenuItemNotFound => ApiError::NotFound("Menu item not found".to_string()),
            StoreError::OrderNotFound => ApiError::NotFound("Order not found".to_string()),
            StoreError::Backend(msg) => ApiError::InternalError(msg),
        }
    }
}
