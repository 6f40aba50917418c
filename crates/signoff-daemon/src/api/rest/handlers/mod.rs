//! API request handlers

mod health;
mod notifications;
mod reports;
mod stream;

pub use health::*;
pub use notifications::*;
pub use reports::*;
pub use stream::*;

use crate::error::{ApiError, ApiResult};
use approval_types::UserId;
use axum::http::HeaderMap;

/// Resolve the acting user from the `X-Actor-Id` header. The daemon
/// trusts an upstream gateway to have authenticated the caller.
pub(crate) fn actor_id(headers: &HeaderMap) -> ApiResult<UserId> {
    let value = headers.get("x-actor-id").ok_or(ApiError::MissingActor)?;
    let id = value
        .to_str()
        .map_err(|_| ApiError::BadRequest("X-Actor-Id must be visible ASCII".to_string()))?
        .trim();
    if id.is_empty() {
        return Err(ApiError::MissingActor);
    }
    Ok(UserId::new(id))
}
