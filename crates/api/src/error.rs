use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use studio_core::error::CoreError;
use studio_core::error_category::ErrorCategory;
use studio_gateway::api::GatewayError;
use studio_gateway::poller::PollError;
use studio_gateway::service::GenerateError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and [`GenerateError`] for the
/// generation flow, and adds HTTP-specific variants. Implements
/// [`IntoResponse`] to produce the failure envelope:
///
/// ```json
/// { "success": false,
///   "error": { "code": "...", "category": "auth", "message": "...", "actions": ["retry"] },
///   "message": "..." }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `studio_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A failure in the generation flow.
    #[error(transparent)]
    Generation(#[from] GenerateError),

    /// `MODELSCOPE_API_KEY` is not configured.
    #[error("Generation service API key is not configured")]
    MissingApiKey,

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The route's time budget ran out before a response was ready.
    #[error("Request timed out")]
    RequestTimeout,
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Status, machine code, category and message for one error.
struct Classified {
    status: StatusCode,
    code: &'static str,
    category: ErrorCategory,
    message: String,
}

impl Classified {
    fn new(
        status: StatusCode,
        code: &'static str,
        category: ErrorCategory,
        message: impl Into<String>,
    ) -> Self {
        Self {
            status,
            code,
            category,
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let c = match &self {
            AppError::Core(core) => classify_core(core),
            AppError::Generation(err) => classify_generation(err),
            AppError::MissingApiKey => {
                tracing::error!("Generation requested but MODELSCOPE_API_KEY is not configured");
                Classified::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CONFIG_ERROR",
                    ErrorCategory::Auth,
                    "The generation service API key is not configured. Please contact the administrator.",
                )
            }
            AppError::BadRequest(msg) => Classified::new(
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
                ErrorCategory::Unknown,
                msg.clone(),
            ),
            AppError::RequestTimeout => Classified::new(
                StatusCode::REQUEST_TIMEOUT,
                "REQUEST_TIMEOUT",
                ErrorCategory::Timeout,
                ErrorCategory::Timeout.user_message(),
            ),
        };

        let body = json!({
            "success": false,
            "error": {
                "code": c.code,
                "category": c.category,
                "message": c.message,
                "actions": c.category.actions(),
            },
            "message": c.message,
        });

        (c.status, axum::Json(body)).into_response()
    }
}

fn classify_core(core: &CoreError) -> Classified {
    match core {
        CoreError::Validation(msg) => Classified::new(
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            ErrorCategory::Unknown,
            msg.clone(),
        ),
        CoreError::Unauthorized(msg) => Classified::new(
            StatusCode::UNAUTHORIZED,
            "UNAUTHORIZED",
            ErrorCategory::Auth,
            msg.clone(),
        ),
    }
}

fn classify_generation(err: &GenerateError) -> Classified {
    match err {
        GenerateError::Invalid(core) => classify_core(core),
        GenerateError::Gateway(e) => classify_gateway(e),
        GenerateError::Poll(PollError::Gateway(e)) => classify_gateway(e),
        GenerateError::Poll(PollError::Failed { task_id, message }) => {
            tracing::warn!(task_id = %task_id, error = %message, "Generation failed");
            Classified::new(
                StatusCode::BAD_GATEWAY,
                "GENERATION_FAILED",
                ErrorCategory::Server,
                format!("Image generation failed: {message}"),
            )
        }
        GenerateError::Poll(PollError::Timeout { task_id, attempts }) => {
            tracing::warn!(task_id = %task_id, attempts, "Generation timed out");
            Classified::new(
                StatusCode::GATEWAY_TIMEOUT,
                "GENERATION_TIMEOUT",
                ErrorCategory::Timeout,
                ErrorCategory::Timeout.user_message(),
            )
        }
        GenerateError::Poll(PollError::Cancelled { task_id }) => {
            tracing::info!(task_id = %task_id, "Generation cancelled");
            Classified::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "GENERATION_CANCELLED",
                ErrorCategory::Unknown,
                "Generation was cancelled before it finished",
            )
        }
    }
}

/// Gateway failures keep their detail in the logs; the client gets the
/// category's fixed message.
fn classify_gateway(err: &GatewayError) -> Classified {
    let category = err.category();
    tracing::warn!(error = %err, category = category.as_str(), "Gateway call failed");
    let (status, code) = match category {
        ErrorCategory::Auth => (StatusCode::UNAUTHORIZED, "GATEWAY_AUTH_ERROR"),
        ErrorCategory::Timeout => (StatusCode::GATEWAY_TIMEOUT, "GATEWAY_TIMEOUT"),
        ErrorCategory::Network => (StatusCode::BAD_GATEWAY, "GATEWAY_UNREACHABLE"),
        ErrorCategory::Server | ErrorCategory::Unknown => {
            (StatusCode::BAD_GATEWAY, "GATEWAY_ERROR")
        }
    };
    Classified::new(status, code, category, category.user_message())
}
