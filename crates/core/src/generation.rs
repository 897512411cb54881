//! Generation task model, request parameters and their validation.
//!
//! A [`GenerationTask`] is the locally cached view of a task running on the
//! inference gateway. Tasks are only ever built from a fresh gateway read
//! (see [`GenerationTask::from_remote`]), so the client never invents a
//! status on its own.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Polling defaults
// ---------------------------------------------------------------------------

/// Delay between two status reads of the same task.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
/// Status reads per polling session before giving up (~5 minutes).
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 60;

// ---------------------------------------------------------------------------
// Parameter defaults and limits
// ---------------------------------------------------------------------------

pub const DEFAULT_WIDTH: u32 = 1024;
pub const DEFAULT_HEIGHT: u32 = 1024;
pub const DEFAULT_STEPS: u32 = 30;
pub const DEFAULT_GUIDANCE_SCALE: f64 = 7.5;

pub const MAX_PROMPT_CHARS: usize = 2000;
pub const MIN_DIMENSION: u32 = 64;
pub const MAX_DIMENSION: u32 = 2048;
pub const MAX_STEPS: u32 = 100;
pub const MIN_GUIDANCE_SCALE: f64 = 1.0;
pub const MAX_GUIDANCE_SCALE: f64 = 20.0;
pub const MAX_LORA_WEIGHT: f64 = 2.0;
/// Seeds must fit a signed 32-bit integer on the gateway side.
pub const MAX_SEED: i64 = i32::MAX as i64;
/// Longest task ID accepted from a client.
pub const MAX_TASK_ID_CHARS: usize = 128;

/// Longest title stored for a generated work.
pub const MAX_TITLE_CHARS: usize = 80;
/// Title used when the prompt is blank.
pub const FALLBACK_TITLE: &str = "AI generated image";

// ---------------------------------------------------------------------------
// Remote status vocabulary
// ---------------------------------------------------------------------------

pub const REMOTE_STATUS_SUCCEED: &str = "SUCCEED";
pub const REMOTE_STATUS_FAILED: &str = "FAILED";
pub const REMOTE_STATUS_PROCESSING: &str = "PROCESSING";

// ---------------------------------------------------------------------------
// Task status
// ---------------------------------------------------------------------------

/// Local status of a generation task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Processing,
    Succeeded,
    Failed,
    Unknown,
}

impl TaskStatus {
    /// Map the gateway's status string onto the local enum.
    ///
    /// Anything outside the known vocabulary (including queue states such
    /// as `PENDING`) becomes [`TaskStatus::Unknown`].
    pub fn from_remote(status: &str) -> Self {
        match status {
            REMOTE_STATUS_SUCCEED => Self::Succeeded,
            REMOTE_STATUS_FAILED => Self::Failed,
            REMOTE_STATUS_PROCESSING => Self::Processing,
            _ => Self::Unknown,
        }
    }

    /// No further transitions happen after a terminal state.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    /// Label consumed by the front end.
    pub fn client_label(self) -> &'static str {
        match self {
            Self::Succeeded => "completed",
            Self::Failed => "failed",
            Self::Processing => "processing",
            Self::Unknown => "pending",
        }
    }
}

// ---------------------------------------------------------------------------
// Task
// ---------------------------------------------------------------------------

/// Last observed state of a task on the inference gateway.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationTask {
    pub task_id: String,
    pub status: TaskStatus,
    /// Present iff `status == Succeeded`.
    pub output_url: Option<String>,
    /// Present only when `status == Failed`.
    pub error_message: Option<String>,
}

impl GenerationTask {
    /// Build a task from a gateway status read.
    ///
    /// Keeps `output_url` set exactly when the task succeeded. A success
    /// report that carries no image is downgraded to `Failed`, because there
    /// is nothing the caller could show.
    pub fn from_remote(
        task_id: impl Into<String>,
        remote_status: &str,
        output_images: Vec<String>,
        error_message: Option<String>,
    ) -> Self {
        let task_id = task_id.into();
        let status = TaskStatus::from_remote(remote_status);
        let first_image = output_images.into_iter().find(|url| !url.trim().is_empty());

        match (status, first_image) {
            (TaskStatus::Succeeded, Some(url)) => Self {
                task_id,
                status,
                output_url: Some(url),
                error_message: None,
            },
            (TaskStatus::Succeeded, None) => Self {
                task_id,
                status: TaskStatus::Failed,
                output_url: None,
                error_message: Some("Task succeeded but returned no output image".to_string()),
            },
            (TaskStatus::Failed, _) => Self {
                task_id,
                status,
                output_url: None,
                error_message: Some(
                    error_message
                        .filter(|m| !m.trim().is_empty())
                        .unwrap_or_else(|| "Image generation failed".to_string()),
                ),
            },
            (status, _) => Self {
                task_id,
                status,
                output_url: None,
                error_message: None,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Request parameters
// ---------------------------------------------------------------------------

/// Parameters of one image-generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub prompt: String,
    /// Gateway model id; the configured default is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_steps")]
    pub steps: u32,
    #[serde(default = "default_guidance_scale")]
    pub guidance_scale: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    /// LoRA repository id to weight.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loras: Option<BTreeMap<String, f64>>,
}

fn default_width() -> u32 {
    DEFAULT_WIDTH
}

fn default_height() -> u32 {
    DEFAULT_HEIGHT
}

fn default_steps() -> u32 {
    DEFAULT_STEPS
}

fn default_guidance_scale() -> f64 {
    DEFAULT_GUIDANCE_SCALE
}

impl GenerationParams {
    /// Parameters with every optional field at its default.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: None,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            steps: DEFAULT_STEPS,
            guidance_scale: DEFAULT_GUIDANCE_SCALE,
            seed: None,
            loras: None,
        }
    }
}

/// Validate generation parameters before anything is sent to the gateway.
pub fn validate_params(params: &GenerationParams) -> Result<(), CoreError> {
    let prompt = params.prompt.trim();
    if prompt.is_empty() {
        return Err(CoreError::validation("prompt must not be empty"));
    }
    if prompt.chars().count() > MAX_PROMPT_CHARS {
        return Err(CoreError::validation(format!(
            "prompt must be at most {MAX_PROMPT_CHARS} characters"
        )));
    }

    validate_dimension("width", params.width)?;
    validate_dimension("height", params.height)?;

    if params.steps == 0 || params.steps > MAX_STEPS {
        return Err(CoreError::validation(format!(
            "steps must be between 1 and {MAX_STEPS}"
        )));
    }

    let g = params.guidance_scale;
    if !g.is_finite() || !(MIN_GUIDANCE_SCALE..=MAX_GUIDANCE_SCALE).contains(&g) {
        return Err(CoreError::validation(format!(
            "guidance_scale must be between {MIN_GUIDANCE_SCALE} and {MAX_GUIDANCE_SCALE}"
        )));
    }

    if let Some(seed) = params.seed {
        if !(0..=MAX_SEED).contains(&seed) {
            return Err(CoreError::validation(format!(
                "seed must be between 0 and {MAX_SEED}"
            )));
        }
    }

    if let Some(loras) = &params.loras {
        for (repo, weight) in loras {
            if repo.trim().is_empty() {
                return Err(CoreError::validation("lora repository id must not be empty"));
            }
            if !weight.is_finite() || !(0.0..=MAX_LORA_WEIGHT).contains(weight) {
                return Err(CoreError::validation(format!(
                    "lora weight for '{repo}' must be between 0 and {MAX_LORA_WEIGHT}"
                )));
            }
        }
    }

    Ok(())
}

/// Validate a client-supplied task ID before it is used in a gateway URL.
///
/// Only ASCII letters, digits, `-` and `_` are accepted.
pub fn validate_task_id(task_id: &str) -> Result<(), CoreError> {
    if task_id.is_empty() || task_id.len() > MAX_TASK_ID_CHARS {
        return Err(CoreError::validation(format!(
            "task_id must be 1 to {MAX_TASK_ID_CHARS} characters"
        )));
    }
    if !task_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(CoreError::validation(
            "task_id may only contain letters, digits, '-' and '_'",
        ));
    }
    Ok(())
}

fn validate_dimension(name: &str, value: u32) -> Result<(), CoreError> {
    if !(MIN_DIMENSION..=MAX_DIMENSION).contains(&value) || value % 8 != 0 {
        return Err(CoreError::validation(format!(
            "{name} must be a multiple of 8 between {MIN_DIMENSION} and {MAX_DIMENSION}"
        )));
    }
    Ok(())
}

/// Title stored for a generated work: the first line of the prompt,
/// truncated to [`MAX_TITLE_CHARS`].
pub fn derive_title(prompt: &str) -> String {
    let first_line = prompt.lines().map(str::trim).find(|l| !l.is_empty());
    match first_line {
        None => FALLBACK_TITLE.to_string(),
        Some(line) if line.chars().count() <= MAX_TITLE_CHARS => line.to_string(),
        Some(line) => {
            let mut title: String = line.chars().take(MAX_TITLE_CHARS - 3).collect();
            title.push_str("...");
            title
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
