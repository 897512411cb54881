//! End-to-end generation flow: validate, create, poll, record.

use std::sync::Arc;

use studio_core::error::CoreError;
use studio_core::error_category::ErrorCategory;
use studio_core::generation::{
    validate_params, validate_task_id, GenerationParams, GenerationTask, TaskStatus,
};
use studio_core::types::DbId;
use tokio_util::sync::CancellationToken;

use crate::api::GatewayError;
use crate::gateway::TaskGateway;
use crate::persister::{OwnerIdentity, PersistRequest, ResultPersister};
use crate::poller::{poll_until_terminal, PollConfig, PollError};

/// Errors from the generation flow.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error(transparent)]
    Invalid(#[from] CoreError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Poll(#[from] PollError),
}

impl GenerateError {
    /// Category reported to the front end.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Invalid(_) => ErrorCategory::Unknown,
            Self::Gateway(e) => e.category(),
            Self::Poll(e) => e.category(),
        }
    }
}

/// What the caller sees about a task after a status read.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOutcome {
    pub task_id: String,
    pub status: TaskStatus,
    pub image_url: Option<String>,
    pub error_message: Option<String>,
    /// Row ID of the recorded work, when recording succeeded.
    pub work_id: Option<DbId>,
}

impl GenerationOutcome {
    fn from_task(task: GenerationTask, work_id: Option<DbId>) -> Self {
        Self {
            task_id: task.task_id,
            status: task.status,
            image_url: task.output_url,
            error_message: task.error_message,
            work_id,
        }
    }
}

/// Composes the gateway client, the poller and the persister.
///
/// Cheap to share behind an `Arc`; holds no per-task state.
pub struct GenerationService {
    gateway: Arc<dyn TaskGateway>,
    persister: Option<ResultPersister>,
    poll: PollConfig,
}

impl GenerationService {
    /// * `persister` - `None` disables recording of finished works.
    pub fn new(
        gateway: Arc<dyn TaskGateway>,
        persister: Option<ResultPersister>,
        poll: PollConfig,
    ) -> Self {
        Self {
            gateway,
            persister,
            poll,
        }
    }

    /// Validate parameters and create a remote task.
    pub async fn submit(&self, params: &GenerationParams) -> Result<String, GenerateError> {
        validate_params(params)?;
        let task_id = self.gateway.create_task(params).await?;
        Ok(task_id)
    }

    /// Read a task's status once, recording the work if it has succeeded.
    ///
    /// `task_id` comes from the client and is validated before any
    /// gateway call.
    ///
    /// A failed remote task is a normal outcome here (the read itself
    /// worked); only gateway errors are returned as `Err`.
    pub async fn check(
        &self,
        task_id: &str,
        owner: OwnerIdentity,
        description: Option<&str>,
    ) -> Result<GenerationOutcome, GenerateError> {
        validate_task_id(task_id)?;
        let task = self.gateway.query_task(task_id).await?;
        let work_id = self.record(&task, owner, description).await;
        Ok(GenerationOutcome::from_task(task, work_id))
    }

    /// Create a task and poll it to a terminal state.
    ///
    /// Stops early with [`PollError::Cancelled`] when `cancel` fires.
    pub async fn generate_and_wait(
        &self,
        params: &GenerationParams,
        owner: OwnerIdentity,
        cancel: &CancellationToken,
    ) -> Result<GenerationOutcome, GenerateError> {
        let task_id = self.submit(params).await?;
        let task = poll_until_terminal(self.gateway.as_ref(), &task_id, &self.poll, cancel).await?;
        let work_id = self.record(&task, owner, Some(&params.prompt)).await;
        Ok(GenerationOutcome::from_task(task, work_id))
    }

    /// Best-effort write for succeeded tasks; a no-op otherwise.
    async fn record(
        &self,
        task: &GenerationTask,
        owner: OwnerIdentity,
        description: Option<&str>,
    ) -> Option<DbId> {
        let persister = self.persister.as_ref()?;
        let output_url = match (task.status, &task.output_url) {
            (TaskStatus::Succeeded, Some(url)) => url.clone(),
            _ => return None,
        };
        let req = PersistRequest {
            task_id: task.task_id.clone(),
            output_url,
            description: description.map(str::to_string),
            owner,
        };
        persister.persist_best_effort(&req).await
    }
}
