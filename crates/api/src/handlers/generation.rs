//! Handlers for asynchronous image generation.
//!
//! Routes:
//! - `POST /image-generate`: create a task
//! - `GET  /image-generate?task_id=...`: read a task's status once
//! - `POST /image-generate/wait`: create and poll to completion

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use studio_core::generation::{GenerationParams, TaskStatus};
use studio_core::types::DbId;
use studio_gateway::service::GenerationOutcome;

use crate::error::{AppError, AppResult};
use crate::middleware::owner::RequestOwner;
use crate::response::ApiResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// Response data for a newly created task.
#[derive(Debug, Serialize)]
pub struct CreatedTask {
    pub task_id: String,
    pub status: &'static str,
}

/// Query parameters for a status read.
#[derive(Debug, Deserialize)]
pub struct TaskStatusQuery {
    pub task_id: Option<String>,
    /// Prompt of the original request, stored as the work's description.
    pub prompt: Option<String>,
}

/// Client-facing view of a task.
#[derive(Debug, Serialize)]
pub struct TaskView {
    pub task_id: String,
    /// One of `completed`, `failed`, `processing`, `pending`.
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_id: Option<DbId>,
}

impl From<GenerationOutcome> for TaskView {
    fn from(outcome: GenerationOutcome) -> Self {
        Self {
            task_id: outcome.task_id,
            status: outcome.status.client_label(),
            image_url: outcome.image_url,
            error_message: outcome.error_message,
            work_id: outcome.work_id,
        }
    }
}

fn status_message(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Succeeded => "Image generated",
        TaskStatus::Failed => "Image generation failed",
        TaskStatus::Processing => "Image generation in progress",
        TaskStatus::Unknown => "Image generation queued",
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/image-generate
///
/// Validates the parameters and creates a task on the inference gateway.
pub async fn create_task(
    State(state): State<AppState>,
    payload: Result<Json<GenerationParams>, JsonRejection>,
) -> AppResult<Json<ApiResponse<CreatedTask>>> {
    let service = state.generation()?;
    let Json(params) = payload?;

    let task_id = service.submit(&params).await?;

    Ok(Json(ApiResponse::ok(
        CreatedTask {
            task_id,
            status: TaskStatus::Processing.client_label(),
        },
        "Generation task created",
    )))
}

/// GET /api/image-generate?task_id=...
///
/// Reads the task once. A succeeded task is recorded as a creative work on
/// a best-effort basis; the response does not depend on that write.
pub async fn get_task_status(
    State(state): State<AppState>,
    RequestOwner(owner): RequestOwner,
    Query(query): Query<TaskStatusQuery>,
) -> AppResult<Json<ApiResponse<TaskView>>> {
    let service = state.generation()?;

    let task_id = query
        .task_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest("task_id query parameter is required".into()))?;

    let outcome = service
        .check(task_id, owner, query.prompt.as_deref())
        .await?;

    let message = status_message(outcome.status);
    Ok(Json(ApiResponse::ok(TaskView::from(outcome), message)))
}

/// POST /api/image-generate/wait
///
/// Creates a task and polls it to a terminal state before responding.
/// Polling stops early when the server shuts down or the client goes away.
pub async fn generate_and_wait(
    State(state): State<AppState>,
    RequestOwner(owner): RequestOwner,
    payload: Result<Json<GenerationParams>, JsonRejection>,
) -> AppResult<Json<ApiResponse<TaskView>>> {
    let service = state.generation()?;
    let Json(params) = payload?;

    let cancel = state.shutdown.child_token();
    let outcome = service.generate_and_wait(&params, owner, &cancel).await?;

    let message = status_message(outcome.status);
    Ok(Json(ApiResponse::ok(TaskView::from(outcome), message)))
}
