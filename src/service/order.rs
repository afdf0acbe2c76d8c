//! Order service
//!
//! Turns a user's cart into an order.

use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

use crate::data::{Database, EntityId, Order, OrderItem, OrderStatus, User, order_total};
use crate::error::AppError;
use crate::metrics::ORDERS_PLACED_TOTAL;

/// An order together with its line items
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetails {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Order service
pub struct OrderService {
    db: Arc<Database>,
}

impl OrderService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Place an order from everything in the user's cart
    ///
    /// The order insert and cart clear commit together.
    ///
    /// # Errors
    /// `Validation` if the user has no cart or it is empty
    pub async fn place_order(&self, user: &User) -> Result<OrderDetails, AppError> {
        let empty_cart =
            || AppError::Validation("Cart is empty. Add items before placing an order.".to_string());

        let cart = self.db.get_cart(&user.id).await?.ok_or_else(empty_cart)?;
        let cart_items = self.db.get_cart_items(&cart.id).await?;
        if cart_items.is_empty() {
            return Err(empty_cart());
        }

        let order = Order {
            id: EntityId::new().0,
            user_id: user.id.clone(),
            total: order_total(&cart_items),
            status: OrderStatus::Completed,
            created_at: Utc::now(),
        };
        let items: Vec<OrderItem> = cart_items.iter().map(OrderItem::from).collect();

        self.db.place_order(&order, &items, &cart.id).await?;

        ORDERS_PLACED_TOTAL.inc();
        tracing::info!(
            user_id = %user.id,
            order_id = %order.id,
            total = order.total,
            item_count = items.len(),
            "Order placed"
        );

        Ok(OrderDetails { order, items })
    }

    /// The user's orders, newest first, with line items
    pub async fn list_orders(&self, user: &User) -> Result<Vec<OrderDetails>, AppError> {
        let orders = self.db.list_orders(&user.id).await?;

        let mut details = Vec::with_capacity(orders.len());
        for order in orders {
            let items = self.db.get_order_items(&order.id).await?;
            details.push(OrderDetails { order, items });
        }

        Ok(details)
    }

    /// A single order, visible only to its owner
    ///
    /// # Errors
    /// - `NotFound` if no such order exists
    /// - `Forbidden` if it belongs to another user
    pub async fn get_order(&self, user: &User, order_id: &str) -> Result<OrderDetails, AppError> {
        let order = self
            .db
            .get_order(order_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

        if order.user_id != user.id {
            tracing::warn!(user_id = %user.id, order_id, "Order access denied");
            return Err(AppError::Forbidden(
                "Unauthorized to view this order".to_string(),
            ));
        }

        let items = self.db.get_order_items(&order.id).await?;
        Ok(OrderDetails { order, items })
    }
}
