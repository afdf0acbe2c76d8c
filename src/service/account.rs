//! Account service
//!
//! Registration, login and logout on top of the session authority.

use chrono::Utc;
use std::sync::Arc;

use crate::auth::{SessionAuthority, password};
use crate::data::{Database, EntityId, User};
use crate::error::{AppError, AuthError};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

fn required(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Account service
pub struct AccountService {
    db: Arc<Database>,
    sessions: Arc<SessionAuthority>,
    min_password_length: usize,
}

impl AccountService {
    /// Create new account service
    pub fn new(
        db: Arc<Database>,
        sessions: Arc<SessionAuthority>,
        min_password_length: usize,
    ) -> Self {
        Self {
            db,
            sessions,
            min_password_length,
        }
    }

    /// Register a user and log them in
    ///
    /// The user row is written first, then the session. If the second
    /// write fails the user exists without a session and can log in.
    ///
    /// # Errors
    /// - `Validation` for missing fields or a short password
    /// - `Conflict` if the email is taken
    pub async fn register(
        &self,
        name: Option<String>,
        email: Option<String>,
        password: Option<String>,
    ) -> Result<String, AppError> {
        let (Some(name), Some(email), Some(password)) =
            (required(name), required(email), password.filter(|p| !p.is_empty()))
        else {
            return Err(AppError::Validation(
                "Name, email, and password are required".to_string(),
            ));
        };

        if password.chars().count() < self.min_password_length {
            return Err(AppError::Validation(format!(
                "Password must be at least {} characters",
                self.min_password_length
            )));
        }

        if self.db.get_user_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("Email already exists".to_string()));
        }

        let user = User {
            id: EntityId::new().0,
            name,
            email,
            password_hash: password::hash_password(&password).await?,
            created_at: Utc::now(),
        };
        self.db.insert_user(&user).await?;

        tracing::info!(user_id = %user.id, email = %user.email, "User registered");

        let token = self.sessions.issue(&user).await?;
        Ok(token)
    }

    /// Log in with email and password
    ///
    /// A user with a live session is refused before the password is
    /// checked, so a correct password cannot evict another device.
    ///
    /// # Errors
    /// - `Validation` for missing fields, unknown email or wrong password
    /// - `Auth(AlreadyLoggedInElsewhere)` if a live session exists
    pub async fn login(
        &self,
        email: Option<String>,
        password: Option<String>,
    ) -> Result<String, AppError> {
        let (Some(email), Some(password)) = (required(email), password.filter(|p| !p.is_empty()))
        else {
            return Err(AppError::Validation(
                "Email and password are required".to_string(),
            ));
        };

        let user = self
            .db
            .get_user_by_email(&email)
            .await?
            .ok_or_else(|| AppError::Validation(INVALID_CREDENTIALS.to_string()))?;

        if self.sessions.has_live_session(&user.id, Utc::now()).await? {
            tracing::warn!(user_id = %user.id, "Login refused: session active on another device");
            return Err(AuthError::AlreadyLoggedInElsewhere.into());
        }

        if !password::verify_password(&user.password_hash, &password).await? {
            tracing::debug!(user_id = %user.id, "Login refused: wrong password");
            return Err(AppError::Validation(INVALID_CREDENTIALS.to_string()));
        }

        let token = self.sessions.issue(&user).await?;
        tracing::info!(user_id = %user.id, "User logged in");

        Ok(token)
    }

    /// Log out, ending the user's session
    pub async fn logout(&self, user: &User) -> Result<(), AppError> {
        self.sessions.revoke(user).await?;
        Ok(())
    }
}
