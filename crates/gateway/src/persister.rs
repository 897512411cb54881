//! Best-effort recording of finished artifacts.
//!
//! A succeeded task's output is already usable by the caller, so writing
//! the bookkeeping row must never turn a success into a failure.
//! [`ResultPersister::persist_best_effort`] logs and swallows every error
//! and gives up once its write budget is spent.

use std::sync::Arc;
use std::time::Duration;

use studio_core::generation::derive_title;
use studio_core::types::DbId;
use studio_db::models::creative_work::{CreateCreativeWork, CreativeWork, CONTENT_TYPE_IMAGE};
use studio_db::repositories::{CreativeWorkRepo, UserRepo};

/// Who owns a generated work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerIdentity {
    /// An authenticated user, taken from the request context.
    User(DbId),
    /// The configured default creator account.
    Default,
}

/// Everything needed to record one generated artifact.
#[derive(Debug, Clone)]
pub struct PersistRequest {
    pub task_id: String,
    pub output_url: String,
    /// Prompt or other descriptive text; also the source of the title.
    pub description: Option<String>,
    pub owner: OwnerIdentity,
}

/// Errors from recording a work. Never surfaced to end users.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Default creator account '{0}' does not exist")]
    OwnerNotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Default budget for one best-effort write.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(3);

/// Writes `creative_works` rows for succeeded tasks.
#[derive(Clone)]
pub struct ResultPersister {
    pool: sqlx::PgPool,
    default_owner_username: Arc<str>,
    write_timeout: Duration,
}

impl ResultPersister {
    /// * `default_owner_username` - account that owns works created
    ///   without an authenticated user.
    pub fn new(pool: sqlx::PgPool, default_owner_username: impl Into<Arc<str>>) -> Self {
        Self {
            pool,
            default_owner_username: default_owner_username.into(),
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }

    /// Override the budget [`Self::persist_best_effort`] allows one write.
    /// Keep it well under the HTTP request timeout.
    pub fn with_write_timeout(mut self, write_timeout: Duration) -> Self {
        self.write_timeout = write_timeout;
        self
    }

    /// Record a generated work, returning the stored row.
    ///
    /// A task is recorded at most once; a repeated call for the same task
    /// returns the existing row.
    pub async fn persist(&self, req: &PersistRequest) -> Result<CreativeWork, PersistenceError> {
        if let Some(existing) = CreativeWorkRepo::find_by_task_id(&self.pool, &req.task_id).await? {
            tracing::debug!(task_id = %req.task_id, work_id = existing.id, "Work already recorded");
            return Ok(existing);
        }

        let creator_id = self.resolve_owner(req.owner).await?;
        let description = req
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty());

        let input = CreateCreativeWork {
            creator_id,
            title: derive_title(description.unwrap_or_default()),
            description: description.map(str::to_string),
            content_type: CONTENT_TYPE_IMAGE.to_string(),
            media_url: req.output_url.clone(),
            source_task_id: Some(req.task_id.clone()),
            is_public: true,
            is_featured: false,
        };

        let work = CreativeWorkRepo::create(&self.pool, &input).await?;
        tracing::info!(
            task_id = %req.task_id,
            work_id = work.id,
            creator_id,
            "Generated work recorded",
        );
        Ok(work)
    }

    /// Record a generated work, logging and discarding any failure.
    ///
    /// Returns the work ID when the write succeeded within the write
    /// timeout.
    pub async fn persist_best_effort(&self, req: &PersistRequest) -> Option<DbId> {
        match tokio::time::timeout(self.write_timeout, self.persist(req)).await {
            Ok(Ok(work)) => Some(work.id),
            Ok(Err(e)) => {
                tracing::warn!(
                    task_id = %req.task_id,
                    error = %e,
                    "Failed to record generated work; continuing without it",
                );
                None
            }
            Err(_) => {
                tracing::warn!(
                    task_id = %req.task_id,
                    timeout_ms = self.write_timeout.as_millis() as u64,
                    "Recording generated work timed out; continuing without it",
                );
                None
            }
        }
    }

    async fn resolve_owner(&self, owner: OwnerIdentity) -> Result<DbId, PersistenceError> {
        match owner {
            OwnerIdentity::User(id) => Ok(id),
            OwnerIdentity::Default => {
                UserRepo::find_id_by_username(&self.pool, &self.default_owner_username)
                    .await?
                    .ok_or_else(|| {
                        PersistenceError::OwnerNotFound(self.default_owner_username.to_string())
                    })
            }
        }
    }
}
