//! Authentication middleware
//!
//! Protects routes that require authentication. The token is the raw
//! `Authorization` header value, without a `Bearer` scheme.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, State},
    http::{HeaderMap, Request, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};

use super::session::SessionAuthority;
use crate::AppState;
use crate::data::User;
use crate::error::{AppError, AuthError};
use crate::metrics::AUTH_REJECTIONS_TOTAL;

/// Raw token from the `Authorization` header
///
/// `Ok(None)` when the header is absent; a header that is not
/// visible ASCII is rejected as an invalid token.
fn extract_token_from_headers(headers: &HeaderMap) -> Result<Option<&str>, AuthError> {
    match headers.get(AUTHORIZATION) {
        None => Ok(None),
        Some(value) => value
            .to_str()
            .map(|token| Some(token.trim()))
            .map_err(|_| AuthError::TokenInvalid),
    }
}

/// Admit or reject a request given its raw `Authorization` value
///
/// An absent or blank value is `MissingToken`; everything else is
/// decided by [`SessionAuthority::validate`] and returned unchanged.
pub async fn authenticate(
    sessions: &SessionAuthority,
    raw_header: Option<&str>,
) -> Result<User, AuthError> {
    let result = match raw_header.map(str::trim) {
        None | Some("") => Err(AuthError::MissingToken),
        Some(token) => sessions.validate(token).await,
    };

    if let Err(error) = &result {
        record_rejection(error);
    }

    result
}

fn record_rejection(error: &AuthError) {
    AUTH_REJECTIONS_TOTAL
        .with_label_values(&[error.reason()])
        .inc();
    tracing::debug!(reason = error.reason(), "Request rejected by auth gate");
}

async fn authenticate_headers(headers: &HeaderMap, state: &AppState) -> Result<User, AuthError> {
    let token = extract_token_from_headers(headers).inspect_err(record_rejection)?;
    authenticate(&state.sessions, token).await
}

/// Middleware to require authentication
///
/// Resolves the user from the `Authorization` header and adds it
/// to request extensions for the downstream handler.
///
/// # Usage
/// ```ignore
/// let protected_routes = Router::new()
///     .route("/api/carts", ...)
///     .layer(middleware::from_fn_with_state(state, require_auth));
/// ```
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    let user = authenticate_headers(request.headers(), &state).await?;

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Extractor for current authenticated user
///
/// Uses the user resolved by [`require_auth`] when present, otherwise
/// authenticates the request itself. The user lives for this request only.
///
/// # Usage
/// ```ignore
/// async fn handler(
///     CurrentUser(user): CurrentUser,
/// ) -> impl IntoResponse {
///     format!("Hello, {}", user.name)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<User>().cloned() {
            return Ok(CurrentUser(user));
        }

        let state = AppState::from_ref(state);
        let user = authenticate_headers(&parts.headers, &state).await?;
        parts.extensions.insert(user.clone());

        Ok(CurrentUser(user))
    }
}
