//! Shared response envelope for API handlers.
//!
//! Successful responses use `{ "success": true, "data": ..., "message": ... }`;
//! failures are produced by [`crate::error::AppError`] with the same
//! top-level `success` and `message` fields.

use serde::Serialize;

/// Standard success envelope.
///
/// # Example
///
/// ```ignore
/// Ok(Json(ApiResponse::ok(data, "Generation task created")))
/// ```
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub message: String,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: message.into(),
        }
    }
}
