//! REST client for the ModelScope inference gateway.
//!
//! Wraps the two endpoints the generation flow needs (task creation and
//! task status) using [`reqwest`]. The client keeps no state between calls.

use std::time::Duration;

use async_trait::async_trait;
use studio_core::error_category::ErrorCategory;
use studio_core::generation::{GenerationParams, GenerationTask};

use crate::gateway::TaskGateway;
use crate::messages::{
    CreateTaskRequest, CreateTaskResponse, TaskStatusResponse, HEADER_ASYNC_MODE,
    HEADER_TASK_TYPE, TASK_TYPE_IMAGE_GENERATION,
};

/// Public ModelScope inference endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api-inference.modelscope.cn";
/// Model used when a request does not name one.
pub const DEFAULT_MODEL: &str = "MusePublic/489_ckpt_FLUX_1";
/// Per-request timeout for outbound calls.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the ModelScope inference API.
#[derive(Clone)]
pub struct ModelScopeApi {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    default_model: String,
}

/// Errors from the gateway REST layer.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, decode).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The gateway returned a non-2xx status code.
    #[error("Gateway API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for diagnostics.
        body: String,
    },

    /// Task creation succeeded at the HTTP level but no task ID came back.
    #[error("Gateway accepted the request but returned no task_id")]
    MissingTaskId,

    /// The configured base URL cannot carry a path.
    #[error("Invalid gateway base URL: {0}")]
    InvalidBaseUrl(String),
}

impl GatewayError {
    /// Category reported to the front end.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Api { status, .. } => ErrorCategory::for_http_status(*status),
            Self::Request(e) if e.is_timeout() => ErrorCategory::Timeout,
            Self::Request(e) if e.is_decode() => ErrorCategory::Server,
            Self::Request(_) => ErrorCategory::Network,
            Self::MissingTaskId => ErrorCategory::Server,
            Self::InvalidBaseUrl(_) => ErrorCategory::Unknown,
        }
    }
}

impl ModelScopeApi {
    /// Create a client with its own connection pool and request timeout.
    ///
    /// * `base_url` - API root, e.g. `https://api-inference.modelscope.cn`.
    /// * `api_key`  - bearer token sent on every request.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        default_model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url, api_key, default_model))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        default_model: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            api_key: api_key.into(),
            default_model: default_model.into(),
        }
    }

    /// API root this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Submit an image-generation request in asynchronous mode.
    ///
    /// Sends `POST /v1/images/generations` and returns the task ID.
    pub async fn create_task(&self, params: &GenerationParams) -> Result<String, GatewayError> {
        let model = params.model.as_deref().unwrap_or(&self.default_model);
        let body = CreateTaskRequest {
            model,
            prompt: params.prompt.trim(),
            width: params.width,
            height: params.height,
            steps: params.steps,
            guidance_scale: params.guidance_scale,
            loras: params.loras.as_ref(),
            seed: params.seed,
        };

        tracing::debug!(model, "Creating generation task");

        let response = self
            .client
            .post(format!("{}/v1/images/generations", self.base_url))
            .bearer_auth(&self.api_key)
            .header(HEADER_ASYNC_MODE, "true")
            .json(&body)
            .send()
            .await?;

        let parsed: CreateTaskResponse = Self::parse_response(response).await?;
        let task_id = parsed
            .task_id
            .filter(|id| !id.trim().is_empty())
            .ok_or(GatewayError::MissingTaskId)?;

        tracing::info!(
            task_id = %task_id,
            task_status = parsed.task_status.as_deref().unwrap_or("<none>"),
            "Generation task created",
        );
        Ok(task_id)
    }

    /// Read the current state of a task.
    ///
    /// Sends `GET /v1/tasks/{task_id}` and maps the gateway's status
    /// vocabulary onto [`GenerationTask`]. The ID is always sent as a
    /// single percent-encoded path segment.
    pub async fn query_task(&self, task_id: &str) -> Result<GenerationTask, GatewayError> {
        let response = self
            .client
            .get(self.task_url(task_id)?)
            .bearer_auth(&self.api_key)
            .header(HEADER_TASK_TYPE, TASK_TYPE_IMAGE_GENERATION)
            .send()
            .await?;

        let parsed: TaskStatusResponse = Self::parse_response(response).await?;
        let task = GenerationTask::from_remote(
            task_id,
            &parsed.task_status,
            parsed.output_images.unwrap_or_default(),
            parsed.error_message,
        );

        tracing::debug!(
            task_id,
            remote_status = %parsed.task_status,
            status = ?task.status,
            "Task status read",
        );
        Ok(task)
    }

    // ---- private helpers ----

    /// `{base}/v1/tasks/{task_id}` with `task_id` encoded as one segment.
    fn task_url(&self, task_id: &str) -> Result<reqwest::Url, GatewayError> {
        let invalid = || GatewayError::InvalidBaseUrl(self.base_url.clone());
        let mut url = reqwest::Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(["v1", "tasks", task_id]);
        Ok(url)
    }

    /// Return the response unchanged on success, or a
    /// [`GatewayError::Api`] holding status and body text on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, GatewayError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::warn!(status = status.as_u16(), body = %body, "Gateway returned an error");
            return Err(GatewayError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, GatewayError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl TaskGateway for ModelScopeApi {
    async fn create_task(&self, params: &GenerationParams) -> Result<String, GatewayError> {
        ModelScopeApi::create_task(self, params).await
    }

    async fn query_task(&self, task_id: &str) -> Result<GenerationTask, GatewayError> {
        ModelScopeApi::query_task(self, task_id).await
    }
}
