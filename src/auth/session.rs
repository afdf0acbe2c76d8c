//! Session authority
//!
//! Owns the single-device rule: a user has at most one live session,
//! and only the token recorded in that session is accepted. The
//! `sessions` table is the source of truth. A token that verifies
//! cryptographically is still refused once its row is replaced or deleted.
//!
//! Nothing is cached in memory; every validation re-reads the store.
//!
//! The login check (`has_live_session`) and `issue` are separate store
//! round-trips. Two concurrent logins for the same user can both pass the
//! check; the later `issue` wins and the earlier token then fails with
//! `SessionSuperseded`.

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

use super::token::{TokenClaims, TokenCodec};
use crate::data::{Database, Session, User};
use crate::error::AuthError;
use crate::metrics::{SESSIONS_ISSUED_TOTAL, SESSIONS_REVOKED_TOTAL};

/// Issues, validates and revokes session tokens
pub struct SessionAuthority {
    db: Arc<Database>,
    codec: TokenCodec,
    ttl: Duration,
}

impl SessionAuthority {
    pub fn new(db: Arc<Database>, secret: &str, ttl: Duration) -> Self {
        Self {
            db,
            codec: TokenCodec::new(secret),
            ttl,
        }
    }

    /// Issue a new token for `user` and make it the user's only live session
    ///
    /// Overwrites any existing session. Callers apply the login policy
    /// first. No token is returned unless it was persisted.
    pub async fn issue(&self, user: &User) -> Result<String, AuthError> {
        self.issue_at(user, Utc::now()).await
    }

    pub async fn issue_at(&self, user: &User, now: DateTime<Utc>) -> Result<String, AuthError> {
        let claims = TokenClaims::new(&user.id, now, self.ttl);
        let token = self.codec.sign(&claims)?;

        let session = Session {
            user_id: user.id.clone(),
            token: token.clone(),
            issued_at: claims.issued_at(),
            expires_at: claims.expires_at(),
        };
        self.db.upsert_session(&session).await?;

        SESSIONS_ISSUED_TOTAL.inc();
        tracing::info!(
            user_id = %user.id,
            expires_at = %session.expires_at,
            "Session issued"
        );

        Ok(token)
    }

    /// Resolve `token` to its user if it is the user's live session token
    ///
    /// # Errors
    /// - `MissingToken` for an empty token
    /// - `TokenInvalid` / `TokenExpired` from signature and expiry checks
    /// - `UserNotFound` if the user was deleted
    /// - `SessionSuperseded` if the user's live session holds a different token, or none
    pub async fn validate(&self, token: &str) -> Result<User, AuthError> {
        self.validate_at(token, Utc::now()).await
    }

    pub async fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<User, AuthError> {
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        let claims = self.codec.verify(token, now)?;

        let user = self
            .db
            .get_user(&claims.sub)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        match self.db.get_session(&user.id).await? {
            Some(session) if session.token == token => Ok(user),
            _ => Err(AuthError::SessionSuperseded),
        }
    }

    /// Whether the user holds a session that has not yet expired
    ///
    /// An expired row does not block a new login; the next `issue` overwrites it.
    pub async fn has_live_session(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, AuthError> {
        let session = self.db.get_session(user_id).await?;
        Ok(session.is_some_and(|session| !session.is_expired_at(now)))
    }

    /// End the user's session. Revoking a logged-out user is a no-op.
    pub async fn revoke(&self, user: &User) -> Result<(), AuthError> {
        let removed = self.db.delete_session(&user.id).await?;

        if removed {
            SESSIONS_REVOKED_TOTAL.inc();
            tracing::info!(user_id = %user.id, "Session revoked");
        } else {
            tracing::debug!(user_id = %user.id, "Revoke on user without a session");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::EntityId;
    use tempfile::TempDir;

    const SECRET: &str = "test-secret-key-that-is-32-bytes!";

    async fn setup() -> (SessionAuthority, Arc<Database>, User, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db = Arc::new(
            Database::connect(&temp_dir.path().join("sessions.db"))
                .await
                .unwrap(),
        );

        let user = User {
            id: EntityId::new().0,
            name: "Alice".to_string(),
            email: "alice@x.com".to_string(),
            password_hash: "$argon2id$placeholder".to_string(),
            created_at: Utc::now(),
        };
        db.insert_user(&user).await.unwrap();

        let authority = SessionAuthority::new(db.clone(), SECRET, Duration::days(7));
        (authority, db, user, temp_dir)
    }

    #[tokio::test]
    async fn issued_token_validates_to_same_user() {
        let (authority, db, user, _dir) = setup().await;

        let token = authority.issue(&user).await.unwrap();
        let resolved = authority.validate(&token).await.unwrap();
        assert_eq!(resolved.id, user.id);

        let session = db.get_session(&user.id).await.unwrap().unwrap();
        assert_eq!(session.token, token);
        assert_eq!(session.expires_at - session.issued_at, Duration::days(7));
    }

    #[tokio::test]
    async fn reissue_supersedes_earlier_token() {
        let (authority, _db, user, _dir) = setup().await;

        let first = authority.issue(&user).await.unwrap();
        let second = authority.issue(&user).await.unwrap();
        assert_ne!(first, second);

        assert!(matches!(
            authority.validate(&first).await,
            Err(AuthError::SessionSuperseded)
        ));
        assert!(authority.validate(&second).await.is_ok());
    }

    #[tokio::test]
    async fn revoked_token_is_superseded() {
        let (authority, _db, user, _dir) = setup().await;

        let token = authority.issue(&user).await.unwrap();
        authority.revoke(&user).await.unwrap();

        assert!(matches!(
            authority.validate(&token).await,
            Err(AuthError::SessionSuperseded)
        ));
    }

    #[tokio::test]
    async fn revoke_is_idempotent() {
        let (authority, db, user, _dir) = setup().await;

        authority.revoke(&user).await.unwrap();
        authority.issue(&user).await.unwrap();
        authority.revoke(&user).await.unwrap();
        authority.revoke(&user).await.unwrap();

        assert!(db.get_session(&user.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expired_token_matching_active_session_is_expired() {
        let (authority, db, user, _dir) = setup().await;

        let issued = Utc::now() - Duration::days(8);
        let token = authority.issue_at(&user, issued).await.unwrap();
        assert_eq!(db.get_session(&user.id).await.unwrap().unwrap().token, token);

        assert!(matches!(
            authority.validate(&token).await,
            Err(AuthError::TokenExpired)
        ));

        // Expiry does not clear the stored session
        assert!(db.get_session(&user.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn token_for_deleted_user_is_user_not_found() {
        let (authority, db, user, _dir) = setup().await;

        let token = authority.issue(&user).await.unwrap();
        db.delete_user(&user.id).await.unwrap();

        assert!(matches!(
            authority.validate(&token).await,
            Err(AuthError::UserNotFound)
        ));
    }

    #[tokio::test]
    async fn tampered_token_is_invalid() {
        let (authority, _db, user, _dir) = setup().await;

        let token = authority.issue(&user).await.unwrap();
        let mut tampered = token.clone();
        let last = tampered.pop().unwrap();
        tampered.push(if last == 'A' { 'B' } else { 'A' });

        assert!(matches!(
            authority.validate(&tampered).await,
            Err(AuthError::TokenInvalid)
        ));
    }

    #[tokio::test]
    async fn empty_token_is_missing() {
        let (authority, _db, _user, _dir) = setup().await;

        assert!(matches!(
            authority.validate("").await,
            Err(AuthError::MissingToken)
        ));
    }

    #[tokio::test]
    async fn live_session_check_ignores_expired_rows() {
        let (authority, _db, user, _dir) = setup().await;
        let now = Utc::now();

        assert!(!authority.has_live_session(&user.id, now).await.unwrap());

        authority.issue_at(&user, now).await.unwrap();
        assert!(authority.has_live_session(&user.id, now).await.unwrap());
        assert!(
            !authority
                .has_live_session(&user.id, now + Duration::days(8))
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn concurrent_issues_leave_exactly_one_valid_token() {
        let (authority, _db, user, _dir) = setup().await;

        let (a, b) = tokio::join!(authority.issue(&user), authority.issue(&user));
        let (a, b) = (a.unwrap(), b.unwrap());

        let valid = [
            authority.validate(&a).await.is_ok(),
            authority.validate(&b).await.is_ok(),
        ];
        assert_eq!(valid.iter().filter(|ok| **ok).count(), 1);
    }
}
