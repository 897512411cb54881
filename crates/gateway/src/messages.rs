//! Wire types for the ModelScope inference API.
//!
//! Only the fields this client reads are modelled; everything else in the
//! gateway's responses is ignored during deserialization.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Header that switches image generation into asynchronous (task) mode.
pub const HEADER_ASYNC_MODE: &str = "X-ModelScope-Async-Mode";
/// Header naming the task family on status reads.
pub const HEADER_TASK_TYPE: &str = "X-ModelScope-Task-Type";
/// Task type sent on every status read.
pub const TASK_TYPE_IMAGE_GENERATION: &str = "image_generation";

/// Body of `POST /v1/images/generations`.
#[derive(Debug, Serialize)]
pub struct CreateTaskRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub width: u32,
    pub height: u32,
    pub steps: u32,
    pub guidance_scale: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loras: Option<&'a BTreeMap<String, f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
}

/// Response of `POST /v1/images/generations` in async mode.
#[derive(Debug, Deserialize)]
pub struct CreateTaskResponse {
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub task_status: Option<String>,
}

/// Response of `GET /v1/tasks/{task_id}`.
#[derive(Debug, Deserialize)]
pub struct TaskStatusResponse {
    #[serde(default)]
    pub task_status: String,
    /// `null` until the task succeeds.
    #[serde(default)]
    pub output_images: Option<Vec<String>>,
    #[serde(default)]
    pub error_message: Option<String>,
}
