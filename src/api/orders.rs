//! Order endpoints
//!
//! All routes require authentication.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Serialize;

use crate::AppState;
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::service::{OrderDetails, OrderService};

/// Order placed response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderResponse {
    pub message: String,
    pub order_id: String,
    pub total: f64,
    pub item_count: usize,
}

fn build_order_service(state: &AppState) -> OrderService {
    OrderService::new(state.db.clone())
}

/// POST /api/orders
/// Place an order from the cart and empty it
pub async fn place_order(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<(StatusCode, Json<PlaceOrderResponse>), AppError> {
    let placed = build_order_service(&state).place_order(&user).await?;

    Ok((
        StatusCode::CREATED,
        Json(PlaceOrderResponse {
            message: "Order placed successfully".to_string(),
            order_id: placed.order.id,
            total: placed.order.total,
            item_count: placed.items.len(),
        }),
    ))
}

/// GET /api/orders
/// Order history, newest first
pub async fn list_orders(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<OrderDetails>>, AppError> {
    let orders = build_order_service(&state).list_orders(&user).await?;
    Ok(Json(orders))
}

/// GET /api/orders/:order_id
pub async fn get_order(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(order_id): Path<String>,
) -> Result<Json<OrderDetails>, AppError> {
    let order = build_order_service(&state)
        .get_order(&user, &order_id)
        .await?;
    Ok(Json(order))
}
