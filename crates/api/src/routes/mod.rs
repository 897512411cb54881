pub mod generation;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` routes served within the standard request timeout.
///
/// ```text
/// /image-generate              create (POST), status (GET ?task_id=)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().merge(generation::router())
}

/// Build the `/api` routes that poll to completion and need a longer timeout.
///
/// ```text
/// /image-generate/wait         create and wait (POST)
/// ```
pub fn long_running_routes() -> Router<AppState> {
    Router::new().merge(generation::long_running_router())
}
