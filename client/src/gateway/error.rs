//! Gateway error types.

use crate::error::GENERIC_ERROR_MESSAGE;
use serde_json::Value;
use thiserror::Error;

/// Failures of a call to the remote todo service
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// No response reached the client (connection refused, timeout, ...)
    #[error("Request failed: {0}")]
    Transport(String),

    /// The service answered with a non-success status
    #[error("Server error ({status}): {detail}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Human-readable reason reported by the service
        detail: String,
    },

    /// A success response whose body could not be parsed
    #[error("Failed to parse response: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Builds a [`GatewayError::Server`] from a status and the raw response body
    ///
    /// The `detail` field of a JSON body wins. Validation failures reported as
    /// a list of `{msg}` objects are joined. Otherwise the body text is used,
    /// then the canonical reason of the status.
    #[must_use]
    pub fn from_response(status: u16, body: &str) -> Self {
        let detail = detail_from_body(body)
            .or_else(|| {
                let text = body.trim();
                (!text.is_empty() && !text.starts_with('{')).then(|| text.to_string())
            })
            .or_else(|| {
                reqwest::StatusCode::from_u16(status)
                    .ok()
                    .and_then(|s| s.canonical_reason())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string());

        Self::Server { status, detail }
    }

    /// Message to show the user
    ///
    /// The service's `detail` for server failures, the display text otherwise.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Server { detail, .. } => detail.clone(),
            other => other.to_string(),
        }
    }

    /// HTTP status, when the service answered
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            Self::Transport(_) | Self::Decode(_) => None,
        }
    }

    /// Whether the service reported the target as missing
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Server { status: 404, .. })
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::Decode(error.to_string())
        } else {
            Self::Transport(error.to_string())
        }
    }
}

fn detail_from_body(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::String(detail) if !detail.trim().is_empty() => Some(detail.clone()),
        Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(error: &GatewayError) -> &str {
        match error {
            GatewayError::Server { detail, .. } => detail,
            _ => "",
        }
    }

    #[test]
    fn string_detail_is_used() {
        let error = GatewayError::from_response(404, r#"{"detail": "Todo not found"}"#);
        assert_eq!(detail(&error), "Todo not found");
        assert_eq!(error.status(), Some(404));
        assert!(error.is_not_found());
    }

    #[test]
    fn validation_list_is_joined() {
        let body = r#"{"detail": [
            {"loc": ["body", "title"], "msg": "field required", "type": "value_error.missing"},
            {"loc": ["body", "max_subtasks"], "msg": "ensure this value is less than or equal to 10"}
        ]}"#;
        let error = GatewayError::from_response(422, body);
        assert_eq!(
            detail(&error),
            "field required; ensure this value is less than or equal to 10"
        );
    }

    #[test]
    fn plain_text_body_is_used() {
        let error = GatewayError::from_response(502, "upstream unavailable\n");
        assert_eq!(detail(&error), "upstream unavailable");
    }

    #[test]
    fn falls_back_to_status_reason() {
        assert_eq!(detail(&GatewayError::from_response(500, "")), "Internal Server Error");
        assert_eq!(
            detail(&GatewayError::from_response(503, r#"{"error": "x"}"#)),
            "Service Unavailable"
        );
    }

    #[test]
    fn user_message_prefers_detail() {
        let server = GatewayError::Server {
            status: 400,
            detail: "Title is required".to_string(),
        };
        assert_eq!(server.user_message(), "Title is required");

        let transport = GatewayError::Transport("connection refused".to_string());
        assert_eq!(transport.user_message(), "Request failed: connection refused");
        assert_eq!(transport.status(), None);
    }
}
