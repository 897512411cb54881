//! The seam between generation logic and the remote inference service.

use async_trait::async_trait;
use studio_core::generation::{GenerationParams, GenerationTask};

use crate::api::GatewayError;

/// Create-and-read access to asynchronous generation tasks.
///
/// Implementations hold no per-task state: every call is an independent
/// request against the remote service.
#[async_trait]
pub trait TaskGateway: Send + Sync {
    /// Submit a generation request and return the issued task ID.
    ///
    /// Never returns an empty ID on success.
    async fn create_task(&self, params: &GenerationParams) -> Result<String, GatewayError>;

    /// Read the current state of a task.
    async fn query_task(&self, task_id: &str) -> Result<GenerationTask, GatewayError>;
}
