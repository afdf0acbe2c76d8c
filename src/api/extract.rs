//! Request body extractor
//!
//! Same as [`axum::Json`] except that rejections go through [`AppError`],
//! so a bad body gets the usual `{"error": ...}` response.

use axum::{
    Json, async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// JSON request body
///
/// An empty body reads as `{}`, so a handler sees missing fields and
/// reports them itself. The `Content-Type` header is not checked.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await?;

        let body: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
            &b"{}"[..]
        } else {
            &bytes[..]
        };

        let Json(value) = Json::<T>::from_bytes(body)?;
        Ok(JsonBody(value))
    }
}
