//! Failure envelope for route timeouts.

use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::error::AppError;

/// Replace the bare `408` produced by `TimeoutLayer` with the standard
/// failure envelope. Responses that already carry a body type pass through.
pub async fn timeout_envelope(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT
        && !response.headers().contains_key(CONTENT_TYPE)
    {
        tracing::warn!("Request exceeded its route timeout");
        return AppError::RequestTimeout.into_response();
    }
    response
}
