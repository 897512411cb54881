//! Typed classification of generation failures.
//!
//! Every failure is tagged with an [`ErrorCategory`] where it happens (the
//! gateway client, the poller, the configuration check). The front end
//! switches on the tag to pick an icon, a message and the actions it offers;
//! it never inspects the error text.

use serde::Serialize;

/// User-facing category of a generation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// The gateway rejected our credentials, or none are configured.
    Auth,
    /// The gateway could not be reached.
    Network,
    /// The task did not reach a terminal state in time.
    Timeout,
    /// The gateway (or the remote task) failed.
    Server,
    /// Anything we cannot attribute.
    Unknown,
}

/// Follow-up action the front end may offer next to an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorAction {
    Retry,
    ContactAdmin,
}

impl ErrorCategory {
    /// Classify a non-success HTTP status returned by the gateway.
    pub fn for_http_status(status: u16) -> Self {
        match status {
            401 | 403 => Self::Auth,
            408 | 504 => Self::Timeout,
            500..=599 => Self::Server,
            _ => Self::Unknown,
        }
    }

    /// Actions offered for this category. Retry is always available.
    pub fn actions(self) -> &'static [ErrorAction] {
        match self {
            Self::Auth => &[ErrorAction::Retry, ErrorAction::ContactAdmin],
            _ => &[ErrorAction::Retry],
        }
    }

    /// Fixed user-facing message for this category.
    pub fn user_message(self) -> &'static str {
        match self {
            Self::Auth => "The generation service rejected the API key. Please contact the administrator.",
            Self::Network => "Could not reach the generation service. Check your connection and try again.",
            Self::Timeout => "Generation is taking longer than expected. Please try again later.",
            Self::Server => "The generation service reported an error. Please try again.",
            Self::Unknown => "Generation failed for an unknown reason. Please try again.",
        }
    }

    /// Stable string tag, identical to the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Network => "network",
            Self::Timeout => "timeout",
            Self::Server => "server",
            Self::Unknown => "unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_and_forbidden_are_auth() {
        assert_eq!(ErrorCategory::for_http_status(401), ErrorCategory::Auth);
        assert_eq!(ErrorCategory::for_http_status(403), ErrorCategory::Auth);
    }

    #[test]
    fn gateway_timeouts_are_timeout() {
        assert_eq!(ErrorCategory::for_http_status(408), ErrorCategory::Timeout);
        assert_eq!(ErrorCategory::for_http_status(504), ErrorCategory::Timeout);
    }

    #[test]
    fn five_hundreds_are_server() {
        assert_eq!(ErrorCategory::for_http_status(500), ErrorCategory::Server);
        assert_eq!(ErrorCategory::for_http_status(503), ErrorCategory::Server);
    }

    #[test]
    fn other_client_errors_are_unknown() {
        assert_eq!(ErrorCategory::for_http_status(400), ErrorCategory::Unknown);
        assert_eq!(ErrorCategory::for_http_status(429), ErrorCategory::Unknown);
    }

    #[test]
    fn only_auth_offers_contact_admin() {
        assert!(ErrorCategory::Auth
            .actions()
            .contains(&ErrorAction::ContactAdmin));
        for category in [
            ErrorCategory::Network,
            ErrorCategory::Timeout,
            ErrorCategory::Server,
            ErrorCategory::Unknown,
        ] {
            assert_eq!(category.actions(), &[ErrorAction::Retry]);
        }
    }

    #[test]
    fn serialized_tag_matches_as_str() {
        let json = serde_json::to_value(ErrorCategory::Timeout).unwrap();
        assert_eq!(json, serde_json::json!(ErrorCategory::Timeout.as_str()));
    }

    #[test]
    fn messages_are_distinct() {
        let all = [
            ErrorCategory::Auth,
            ErrorCategory::Network,
            ErrorCategory::Timeout,
            ErrorCategory::Server,
            ErrorCategory::Unknown,
        ];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a.user_message(), b.user_message());
            }
        }
    }
}
