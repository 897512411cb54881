//! Request-context extractor for the owner of generated content.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use studio_core::error::CoreError;
use studio_core::types::DbId;
use studio_gateway::persister::OwnerIdentity;

use crate::error::AppError;

/// Header carrying the authenticated user's ID, set by the upstream auth proxy.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Owner of anything a request generates.
///
/// Resolves to [`OwnerIdentity::User`] when the `x-user-id` header holds a
/// positive integer and to [`OwnerIdentity::Default`] when the header is
/// absent. A malformed header is rejected with 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestOwner(pub OwnerIdentity);

impl<S> FromRequestParts<S> for RequestOwner
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(raw) = parts.headers.get(USER_ID_HEADER) else {
            return Ok(RequestOwner(OwnerIdentity::Default));
        };

        let user_id = raw
            .to_str()
            .ok()
            .and_then(|v| v.trim().parse::<DbId>().ok())
            .filter(|id| *id > 0)
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(format!(
                    "Invalid {USER_ID_HEADER} header"
                )))
            })?;

        Ok(RequestOwner(OwnerIdentity::User(user_id)))
    }
}
