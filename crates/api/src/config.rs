use std::str::FromStr;
use std::time::Duration;

use studio_gateway::api::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use studio_gateway::poller::PollConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the API key have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds for ordinary routes (default: `30`).
    pub request_timeout_secs: u64,
    /// Timeout for routes that poll a task to completion. Defaults to the
    /// full polling budget plus one minute.
    pub wait_timeout_secs: u64,
    /// Username owning generated works when a request carries no user.
    pub default_creator_username: String,
    /// Budget for recording a finished work; must stay well under
    /// `request_timeout_secs` (default: `3`).
    pub persist_timeout_secs: u64,
    /// Inference gateway settings.
    pub gateway: GatewayConfig,
}

/// Inference gateway client and polling settings.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Bearer token. Optional at startup; generation requests fail with a
    /// configuration error while it is missing.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub request_timeout_secs: u64,
    pub poll: PollConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                               |
    /// |----------------------------|---------------------------------------|
    /// | `HOST`                     | `0.0.0.0`                             |
    /// | `PORT`                     | `3000`                                |
    /// | `CORS_ORIGINS`             | `http://localhost:3000`               |
    /// | `REQUEST_TIMEOUT_SECS`     | `30`                                  |
    /// | `WAIT_TIMEOUT_SECS`        | poll interval * attempts + 60         |
    /// | `DEFAULT_CREATOR_USERNAME` | `admin`                               |
    /// | `PERSIST_TIMEOUT_SECS`     | `3`                                   |
    /// | `MODELSCOPE_API_KEY`       | unset                                 |
    /// | `MODELSCOPE_BASE_URL`      | `https://api-inference.modelscope.cn` |
    /// | `MODELSCOPE_MODEL`         | `MusePublic/489_ckpt_FLUX_1`          |
    /// | `GATEWAY_TIMEOUT_SECS`     | `30`                                  |
    /// | `POLL_INTERVAL_SECS`       | `5`                                   |
    /// | `POLL_MAX_ATTEMPTS`        | `60`                                  |
    /// | `POLL_BACKOFF_MULTIPLIER`  | `1.0`                                 |
    /// | `POLL_MAX_INTERVAL_SECS`   | `30`                                  |
    /// | `POLL_JITTER`              | `false`                               |
    ///
    /// Panics on malformed values so misconfiguration fails at startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = parse_env("PORT", "3000");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = parse_env("REQUEST_TIMEOUT_SECS", "30");

        let default_creator_username =
            std::env::var("DEFAULT_CREATOR_USERNAME").unwrap_or_else(|_| "admin".into());

        let persist_timeout_secs: u64 = parse_env("PERSIST_TIMEOUT_SECS", "3");

        let gateway = GatewayConfig::from_env();

        let wait_timeout_secs = match std::env::var("WAIT_TIMEOUT_SECS") {
            Ok(v) => v.parse().expect("WAIT_TIMEOUT_SECS must be a valid u64"),
            Err(_) => default_wait_timeout_secs(&gateway.poll),
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            wait_timeout_secs,
            default_creator_username,
            persist_timeout_secs,
            gateway,
        }
    }
}

impl GatewayConfig {
    fn from_env() -> Self {
        let api_key = std::env::var("MODELSCOPE_API_KEY")
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        let base_url = std::env::var("MODELSCOPE_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        let model = std::env::var("MODELSCOPE_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());
        let request_timeout_secs: u64 = parse_env("GATEWAY_TIMEOUT_SECS", "30");

        let poll = PollConfig {
            interval: Duration::from_secs(parse_env("POLL_INTERVAL_SECS", "5")),
            max_attempts: parse_env("POLL_MAX_ATTEMPTS", "60"),
            multiplier: parse_env("POLL_BACKOFF_MULTIPLIER", "1.0"),
            max_interval: Duration::from_secs(parse_env("POLL_MAX_INTERVAL_SECS", "30")),
            jitter: parse_env("POLL_JITTER", "false"),
        };

        Self {
            api_key,
            base_url,
            model,
            request_timeout_secs,
            poll,
        }
    }
}

/// Upper bound on a full polling session, plus a minute of slack for task
/// creation and persistence.
pub fn default_wait_timeout_secs(poll: &PollConfig) -> u64 {
    let per_wait = if poll.multiplier > 1.0 {
        poll.interval.max(poll.max_interval)
    } else {
        poll.interval
    };
    per_wait.as_secs() * u64::from(poll.max_attempts.max(1)) + 60
}

fn parse_env<T>(key: &str, default: &str) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    raw.trim()
        .parse()
        .unwrap_or_else(|e| panic!("{key} has an invalid value '{raw}': {e}"))
}
