//! Session authentication
//!
//! Handles:
//! - Password hashing
//! - Signed session tokens
//! - Single-device session enforcement
//! - Authentication middleware

mod middleware;
pub mod password;
pub mod session;
pub mod token;

pub use middleware::{CurrentUser, authenticate, require_auth};
pub use session::SessionAuthority;
pub use token::{TokenClaims, TokenCodec};
