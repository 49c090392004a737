use std::sync::Arc;

use axum::{Router, response::Json, routing::get};
use dotenvy::dotenv;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::info;
use utoipa::OpenApi;

use tableside_order_service::hub::EventHub;
use tableside_order_service::orders::OrderService;
use tableside_order_service::store::MemoryStore;

mod auth;
mod error;
mod handlers;
mod models;

use auth::{StaticTokenResolver, TokenResolver};
use handlers::{ApiDoc, AppState, events_router, order_router, restaurant_router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let store = Arc::new(MemoryStore::new());
    let hub = Arc::new(EventHub::new());
    let orders = Arc::new(OrderService::new(Arc::clone(&store), Arc::clone(&hub)));
    let auth: Arc<dyn TokenResolver> = Arc::new(StaticTokenResolver::from_env("AUTH_TOKENS"));

    let state = AppState {
        store,
        hub,
        orders,
        auth,
    };

    let cors = match std::env::var("CORS_ORIGINS") {
        Ok(origins) => {
            let origins = origins
                .split(',')
                .filter_map(|origin| origin.trim().parse::<axum::http::HeaderValue>().ok())
                .collect::<Vec<_>>();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any)
        }
        Err(_) => CorsLayer::permissive(),
    };

    let app = Router::new()
        .route("/health", get(health))
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .merge(restaurant_router())
        .merge(order_router())
        .merge(events_router())
        .with_state(state)
        .layer(cors);

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
    info!("API gateway listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
    }))
}
