//! Identity extraction. The upstream auth layer terminates credentials and
//! forwards the caller's account id in `X-Account-Id`; this crate never
//! sees a password or token.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::error::ApiError;

pub const ACCOUNT_HEADER: &str = "x-account-id";

/// The authenticated caller's account id.
#[derive(Debug, Clone, Copy)]
pub struct CurrentAccount(pub Uuid);

impl<S> FromRequestParts<S> for CurrentAccount
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(ACCOUNT_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("missing X-Account-Id header".to_string()))?;
        let id = Uuid::parse_str(raw)
            .map_err(|_| ApiError::Unauthorized("malformed X-Account-Id header".to_string()))?;
        Ok(CurrentAccount(id))
    }
}
