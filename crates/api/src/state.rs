use std::sync::Arc;
use std::time::Duration;

use studio_gateway::api::{GatewayError, ModelScopeApi};
use studio_gateway::persister::ResultPersister;
use studio_gateway::service::GenerationService;
use tokio_util::sync::CancellationToken;

use crate::config::ServerConfig;
use crate::error::{AppError, AppResult};

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: studio_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Generation flow; `None` while no gateway API key is configured.
    pub generation: Option<Arc<GenerationService>>,
    /// Cancelled on shutdown so long-running polling sessions stop.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Build state from configuration, wiring the ModelScope client when an
    /// API key is present.
    pub fn new(
        pool: studio_db::DbPool,
        config: ServerConfig,
        shutdown: CancellationToken,
    ) -> Result<Self, GatewayError> {
        let generation = match &config.gateway.api_key {
            Some(api_key) => {
                let api = ModelScopeApi::new(
                    config.gateway.base_url.clone(),
                    api_key.clone(),
                    config.gateway.model.clone(),
                    Duration::from_secs(config.gateway.request_timeout_secs),
                )?;
                let persister =
                    ResultPersister::new(pool.clone(), config.default_creator_username.as_str())
                        .with_write_timeout(Duration::from_secs(config.persist_timeout_secs));
                Some(Arc::new(GenerationService::new(
                    Arc::new(api),
                    Some(persister),
                    config.gateway.poll.clone(),
                )))
            }
            None => {
                tracing::warn!("MODELSCOPE_API_KEY is not set; generation requests will fail");
                None
            }
        };

        Ok(Self {
            pool,
            config: Arc::new(config),
            generation,
            shutdown,
        })
    }

    /// The generation service, or a configuration error when no API key is set.
    pub fn generation(&self) -> AppResult<&Arc<GenerationService>> {
        self.generation.as_ref().ok_or(AppError::MissingApiKey)
    }
}
