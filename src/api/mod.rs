//! API layer
//!
//! HTTP handlers for:
//! - Users (register, login, logout, profile)
//! - Catalog
//! - Carts
//! - Orders
//! - Metrics (Prometheus)

mod carts;
mod extract;
mod items;
pub mod metrics;
mod orders;
mod users;

use axum::{
    Router,
    extract::OriginalUri,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Json},
    routing::{delete, get, post},
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::AppState;
use crate::auth::require_auth;

pub use metrics::metrics_router;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

/// GET /api/health
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "Server is running".to_string(),
        timestamp: Utc::now(),
    })
}

/// Unknown path, or a known path with a method it does not serve
pub async fn route_not_found(OriginalUri(uri): OriginalUri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "error": "Route not found",
            "path": uri.path(),
        })),
    )
}

/// Create the `/api` router
///
/// Routes are split into public and authenticated endpoints. The
/// authenticated ones pass through [`require_auth`] before the handler runs.
pub fn api_router(state: AppState) -> Router<AppState> {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/users", post(users::register))
        .route("/users/login", post(users::login))
        .route("/items", get(items::list_items))
        .route("/items/seed", post(items::seed_items));

    let authenticated_routes = Router::new()
        .route("/users/logout", post(users::logout))
        .route("/users/me", get(users::me))
        .route(
            "/carts",
            post(carts::add_to_cart)
                .get(carts::get_cart)
                .delete(carts::clear_cart),
        )
        .route("/carts/:item_id", delete(carts::remove_from_cart))
        .route("/orders", post(orders::place_order).get(orders::list_orders))
        .route("/orders/:order_id", get(orders::get_order))
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    public_routes
        .merge(authenticated_routes)
        .method_not_allowed_fallback(route_not_found)
}
