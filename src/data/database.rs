//! SQLite database operations
//!
//! All database access goes through this module.
//! Every method is a single statement or a single transaction; callers
//! must not assume atomicity across two method calls.

use chrono::Utc;
use sqlx::{Pool, Sqlite, SqlitePool};
use std::path::Path;

use super::models::*;
use crate::error::AppError;

/// Database connection pool wrapper.
pub struct Database {
    pool: Pool<Sqlite>,
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db_error) if db_error.is_unique_violation())
}

impl Database {
    /// Connect to the SQLite file at `path` and run migrations.
    ///
    /// The file and its parent directory are created if missing.
    pub async fn connect(path: &Path) -> Result<Self, AppError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AppError::Database(sqlx::Error::Io(e)))?;
        }

        let connection_string = format!("sqlite:{}?mode=rwc", path.display());
        let pool = SqlitePool::connect(&connection_string).await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| {
                tracing::error!("Migration failed: {}", e);
                AppError::Internal(anyhow::anyhow!("Migration failed: {}", e))
            })?;

        tracing::info!(path = %path.display(), "Database connected and migrated successfully");

        Ok(Self { pool })
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Insert a new user
    ///
    /// # Errors
    /// `AppError::Conflict` if the email is already registered
    pub async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(error) if is_unique_violation(&error) => {
                Err(AppError::Conflict("Email already exists".to_string()))
            }
            Err(error) => Err(error.into()),
        }
    }

    pub async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn delete_user(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Sessions
    // =========================================================================

    /// Get the live session row for a user, if any
    pub async fn get_session(&self, user_id: &str) -> Result<Option<Session>, AppError> {
        let session = sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(session)
    }

    /// Store `session` as the user's only session, replacing any existing row
    pub async fn upsert_session(&self, session: &Session) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO sessions (user_id, token, issued_at, expires_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                token = excluded.token,
                issued_at = excluded.issued_at,
                expires_at = excluded.expires_at
            "#,
        )
        .bind(&session.user_id)
        .bind(&session.token)
        .bind(session.issued_at)
        .bind(session.expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Delete the user's session row
    ///
    /// # Returns
    /// `true` if a row was removed
    pub async fn delete_session(&self, user_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Items
    // =========================================================================

    /// All items, newest first
    pub async fn list_items(&self) -> Result<Vec<Item>, AppError> {
        let items = sqlx::query_as::<_, Item>(
            "SELECT id, name, price, description, created_at FROM items ORDER BY created_at DESC, rowid DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    pub async fn get_item(&self, id: &str) -> Result<Option<Item>, AppError> {
        let item = sqlx::query_as::<_, Item>(
            "SELECT id, name, price, description, created_at FROM items WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Replace the whole catalog with `items` in one transaction
    ///
    /// Removing an item also removes it from every cart.
    pub async fn replace_items(&self, items: &[Item]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM items").execute(&mut *tx).await?;

        for item in items {
            sqlx::query(
                "INSERT INTO items (id, name, price, description, created_at) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(&item.id)
            .bind(&item.name)
            .bind(item.price)
            .bind(&item.description)
            .bind(item.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    // =========================================================================
    // Carts
    // =========================================================================

    pub async fn get_cart(&self, user_id: &str) -> Result<Option<Cart>, AppError> {
        let cart = sqlx::query_as::<_, Cart>("SELECT * FROM carts WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(cart)
    }

    /// Get the user's cart, creating an empty one if it does not exist
    pub async fn get_or_create_cart(&self, user_id: &str) -> Result<Cart, AppError> {
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO carts (id, user_id, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(user_id) DO NOTHING
            "#,
        )
        .bind(EntityId::new().0)
        .bind(user_id)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let cart = sqlx::query_as::<_, Cart>("SELECT * FROM carts WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(cart)
    }

    /// Items in a cart, in the order they were added
    pub async fn get_cart_items(&self, cart_id: &str) -> Result<Vec<Item>, AppError> {
        let items = sqlx::query_as::<_, Item>(
            r#"
            SELECT i.id, i.name, i.price, i.description, i.created_at
            FROM cart_items ci
            JOIN items i ON i.id = ci.item_id
            WHERE ci.cart_id = ?
            ORDER BY ci.added_at ASC, ci.rowid ASC
            "#,
        )
        .bind(cart_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    pub async fn count_cart_items(&self, cart_id: &str) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cart_items WHERE cart_id = ?")
            .bind(cart_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Add an item to a cart
    ///
    /// # Returns
    /// `false` if the item was already in the cart
    pub async fn add_cart_item(&self, cart_id: &str, item_id: &str) -> Result<bool, AppError> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT OR IGNORE INTO cart_items (cart_id, item_id, added_at) VALUES (?, ?, ?)",
        )
        .bind(cart_id)
        .bind(item_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            self.touch_cart(cart_id).await?;
        }

        Ok(result.rows_affected() > 0)
    }

    pub async fn remove_cart_item(&self, cart_id: &str, item_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE cart_id = ? AND item_id = ?")
            .bind(cart_id)
            .bind(item_id)
            .execute(&self.pool)
            .await?;

        self.touch_cart(cart_id).await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn clear_cart(&self, cart_id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM cart_items WHERE cart_id = ?")
            .bind(cart_id)
            .execute(&self.pool)
            .await?;

        self.touch_cart(cart_id).await
    }

    async fn touch_cart(&self, cart_id: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE carts SET updated_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(cart_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Insert `order` with its line items and empty the cart, atomically
    pub async fn place_order(
        &self,
        order: &Order,
        items: &[OrderItem],
        cart_id: &str,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO orders (id, user_id, total, status, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&order.id)
        .bind(&order.user_id)
        .bind(order.total)
        .bind(order.status)
        .bind(order.created_at)
        .execute(&mut *tx)
        .await?;

        for (position, item) in items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_items (order_id, position, item_id, name, price, description)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&order.id)
            .bind(position as i64)
            .bind(&item.item_id)
            .bind(&item.name)
            .bind(item.price)
            .bind(&item.description)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("DELETE FROM cart_items WHERE cart_id = ?")
            .bind(cart_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE carts SET updated_at = ? WHERE id = ?")
            .bind(order.created_at)
            .bind(cart_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// A user's orders, newest first
    pub async fn list_orders(&self, user_id: &str) -> Result<Vec<Order>, AppError> {
        let orders = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE user_id = ? ORDER BY created_at DESC, rowid DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    pub async fn get_order(&self, id: &str) -> Result<Option<Order>, AppError> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    pub async fn get_order_items(&self, order_id: &str) -> Result<Vec<OrderItem>, AppError> {
        let items = sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT item_id, name, price, description
            FROM order_items
            WHERE order_id = ?
            ORDER BY position ASC
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }
}
