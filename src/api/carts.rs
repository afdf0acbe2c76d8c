//! Cart endpoints
//!
//! One cart per user, created on first add. All routes require authentication.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};

use super::extract::JsonBody;
use crate::AppState;
use crate::auth::CurrentUser;
use crate::data::{Cart, Item};
use crate::error::AppError;

/// Add to cart request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub item_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartChangeResponse {
    pub message: String,
    pub cart_size: i64,
}

/// Cart with populated items; `id` is null when the user has no cart yet
#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub id: Option<String>,
    pub items: Vec<Item>,
}

#[derive(Debug, Serialize)]
pub struct ClearCartResponse {
    pub message: String,
}

async fn existing_cart(state: &AppState, user_id: &str) -> Result<Cart, AppError> {
    state
        .db
        .get_cart(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Cart not found".to_string()))
}

/// POST /api/carts
/// Add an item to the cart
pub async fn add_to_cart(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    JsonBody(req): JsonBody<AddToCartRequest>,
) -> Result<(StatusCode, Json<CartChangeResponse>), AppError> {
    let item_id = req
        .item_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::Validation("Item ID is required".to_string()))?;

    let item = state
        .db
        .get_item(&item_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Item not found".to_string()))?;

    let cart = state.db.get_or_create_cart(&user.id).await?;
    if !state.db.add_cart_item(&cart.id, &item.id).await? {
        return Err(AppError::Validation("Item already in cart".to_string()));
    }

    let cart_size = state.db.count_cart_items(&cart.id).await?;
    tracing::debug!(user_id = %user.id, item_id = %item.id, cart_size, "Item added to cart");

    Ok((
        StatusCode::CREATED,
        Json(CartChangeResponse {
            message: "Item added to cart".to_string(),
            cart_size,
        }),
    ))
}

/// GET /api/carts
pub async fn get_cart(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<CartResponse>, AppError> {
    let Some(cart) = state.db.get_cart(&user.id).await? else {
        return Ok(Json(CartResponse {
            id: None,
            items: Vec::new(),
        }));
    };

    let items = state.db.get_cart_items(&cart.id).await?;
    Ok(Json(CartResponse {
        id: Some(cart.id),
        items,
    }))
}

/// DELETE /api/carts/:item_id
/// Remove one item; removing an item that is not in the cart is not an error
pub async fn remove_from_cart(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(item_id): Path<String>,
) -> Result<Json<CartChangeResponse>, AppError> {
    let cart = existing_cart(&state, &user.id).await?;

    state.db.remove_cart_item(&cart.id, &item_id).await?;
    let cart_size = state.db.count_cart_items(&cart.id).await?;

    Ok(Json(CartChangeResponse {
        message: "Item removed from cart".to_string(),
        cart_size,
    }))
}

/// DELETE /api/carts
/// Remove every item
pub async fn clear_cart(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ClearCartResponse>, AppError> {
    let cart = existing_cart(&state, &user.id).await?;

    state.db.clear_cart(&cart.id).await?;

    Ok(Json(ClearCartResponse {
        message: "Cart cleared successfully".to_string(),
    }))
}
