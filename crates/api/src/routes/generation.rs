//! Route definitions for image generation.
//!
//! ```text
//! POST   /image-generate          create_task
//! GET    /image-generate          get_task_status (?task_id=)
//! POST   /image-generate/wait     generate_and_wait
//! ```

use axum::routing::post;
use axum::Router;

use crate::handlers::generation;
use crate::state::AppState;

/// Routes answered within the ordinary request timeout.
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/image-generate",
        post(generation::create_task).get(generation::get_task_status),
    )
}

/// Routes that hold the request open for a whole polling session.
pub fn long_running_router() -> Router<AppState> {
    Router::new().route("/image-generate/wait", post(generation::generate_and_wait))
}
