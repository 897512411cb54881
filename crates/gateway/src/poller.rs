//! Polling loop that drives a generation task to a terminal state.
//!
//! [`poll_until_terminal`] reads the task status, waits, and reads again
//! until the task succeeds, fails, the attempt budget runs out, or the
//! [`CancellationToken`] fires. Each call owns its own attempt counter, so
//! concurrent sessions never interact.

use std::time::Duration;

use rand::Rng;
use studio_core::error_category::ErrorCategory;
use studio_core::generation::{
    GenerationTask, TaskStatus, DEFAULT_MAX_POLL_ATTEMPTS, DEFAULT_POLL_INTERVAL_SECS,
};
use tokio_util::sync::CancellationToken;

use crate::api::GatewayError;
use crate::gateway::TaskGateway;

/// Largest random delay added per wait, as a fraction of the interval.
const JITTER_FRACTION: f64 = 0.2;

/// Tunable parameters for a polling session.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Wait between the first and second status read.
    pub interval: Duration,
    /// Total status reads before giving up. Zero is treated as one.
    pub max_attempts: u32,
    /// Growth factor applied to the interval after every wait.
    /// `1.0` keeps the interval fixed.
    pub multiplier: f64,
    /// Upper bound on the interval when `multiplier > 1.0`.
    pub max_interval: Duration,
    /// Add up to 20% random delay to each wait.
    pub jitter: bool,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            max_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
            multiplier: 1.0,
            max_interval: Duration::from_secs(30),
            jitter: false,
        }
    }
}

impl PollConfig {
    /// Fixed-interval polling with the given budget.
    pub fn fixed(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
            ..Default::default()
        }
    }
}

/// Errors that end a polling session without a result.
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    /// A status read failed. Not retried by the poller.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The remote task reported failure.
    #[error("Generation task {task_id} failed: {message}")]
    Failed { task_id: String, message: String },

    /// The attempt budget ran out before a terminal state was seen.
    #[error("Generation task {task_id} did not finish after {attempts} status checks")]
    Timeout { task_id: String, attempts: u32 },

    /// The caller cancelled the session.
    #[error("Polling of generation task {task_id} was cancelled")]
    Cancelled { task_id: String },
}

impl PollError {
    /// Category reported to the front end.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Gateway(e) => e.category(),
            Self::Failed { .. } => ErrorCategory::Server,
            Self::Timeout { .. } => ErrorCategory::Timeout,
            Self::Cancelled { .. } => ErrorCategory::Unknown,
        }
    }
}

/// Calculate the next interval from the current one.
///
/// The result is clamped to [`PollConfig::max_interval`], except that a
/// fixed schedule (`multiplier <= 1.0`) never changes.
pub fn next_interval(current: Duration, config: &PollConfig) -> Duration {
    if config.multiplier <= 1.0 {
        return current;
    }
    let next_ms = (current.as_millis() as f64 * config.multiplier) as u64;
    Duration::from_millis(next_ms).min(config.max_interval.max(current))
}

/// Apply jitter to a wait when enabled.
fn with_jitter(base: Duration, config: &PollConfig) -> Duration {
    if !config.jitter {
        return base;
    }
    let spread_ms = (base.as_millis() as f64 * JITTER_FRACTION) as u64;
    if spread_ms == 0 {
        return base;
    }
    base + Duration::from_millis(rand::rng().random_range(0..=spread_ms))
}

/// Poll a task until it reaches a terminal state.
///
/// Performs at most `max_attempts` status reads. Returns the task on
/// success; fails with [`PollError::Failed`] the moment the task reports
/// failure, with [`PollError::Timeout`] after the last read, with
/// [`PollError::Gateway`] on the first read error, and with
/// [`PollError::Cancelled`] once `cancel` fires.
pub async fn poll_until_terminal<G>(
    gateway: &G,
    task_id: &str,
    config: &PollConfig,
    cancel: &CancellationToken,
) -> Result<GenerationTask, PollError>
where
    G: TaskGateway + ?Sized,
{
    let max_attempts = config.max_attempts.max(1);
    let mut interval = config.interval;

    for attempt in 1..=max_attempts {
        let task = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!(task_id, attempt, "Polling cancelled");
                return Err(PollError::Cancelled { task_id: task_id.to_string() });
            }
            result = gateway.query_task(task_id) => result?,
        };

        match task.status {
            TaskStatus::Succeeded => {
                tracing::info!(task_id, attempt, "Generation task succeeded");
                return Ok(task);
            }
            TaskStatus::Failed => {
                let message = task
                    .error_message
                    .unwrap_or_else(|| "Image generation failed".to_string());
                tracing::warn!(task_id, attempt, error = %message, "Generation task failed");
                return Err(PollError::Failed {
                    task_id: task_id.to_string(),
                    message,
                });
            }
            TaskStatus::Processing | TaskStatus::Unknown => {
                tracing::debug!(
                    task_id,
                    attempt,
                    max_attempts,
                    status = ?task.status,
                    "Generation task not finished",
                );
            }
        }

        if attempt == max_attempts {
            break;
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!(task_id, attempt, "Polling cancelled");
                return Err(PollError::Cancelled { task_id: task_id.to_string() });
            }
            _ = tokio::time::sleep(with_jitter(interval, config)) => {}
        }

        interval = next_interval(interval, config);
    }

    tracing::warn!(task_id, attempts = max_attempts, "Generation task timed out");
    Err(PollError::Timeout {
        task_id: task_id.to_string(),
        attempts: max_attempts,
    })
}
