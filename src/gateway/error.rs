//! Gateway failure classification.

use serde::Deserialize;
use thiserror::Error;

/// Errors raised by a [`TodoGateway`](super::TodoGateway) operation.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Request never produced a response (DNS, TLS, connection reset...)
    #[error("Connection to '{table}' failed: {source}")]
    Transport {
        table: String,
        #[source]
        source: reqwest::Error,
    },

    /// Service answered with a non-success status
    #[error("Service error: {status} - {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// Update target does not exist
    #[error("Todo '{id}' not found")]
    NotFound { id: String },

    /// Response body did not match the expected shape
    #[error("Unexpected response from service: {0}")]
    Decode(String),

    /// Anything else the gateway could not classify
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Short machine-readable tag, used in log fields.
    pub fn error_type(&self) -> &'static str {
        match self {
            ServiceError::Transport { .. } => "transport_error",
            ServiceError::Api { .. } => "api_error",
            ServiceError::NotFound { .. } => "not_found",
            ServiceError::Decode(_) => "decode_error",
            ServiceError::Internal(_) => "internal_error",
        }
    }

    /// Build an [`ServiceError::Api`] from a status and the raw error body.
    ///
    /// PostgREST bodies (`{code, message, details, hint}`) are unpacked; anything
    /// else is carried verbatim, or replaced by the status reason when empty.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        if let Ok(parsed) = serde_json::from_slice::<ApiErrorBody>(body) {
            if let Some(message) = parsed.describe() {
                return ServiceError::Api {
                    status,
                    code: parsed.code,
                    message,
                };
            }
        }
        let text = String::from_utf8_lossy(body).trim().to_string();
        let message = if text.is_empty() {
            reqwest::StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("request rejected")
                .to_string()
        } else {
            text
        };
        ServiceError::Api {
            status,
            code: None,
            message,
        }
    }
}

/// Error payload returned by PostgREST.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

impl ApiErrorBody {
    fn describe(&self) -> Option<String> {
        let message = self.message.as_deref()?.trim();
        if message.is_empty() {
            return None;
        }
        Some(match self.details.as_deref().map(str::trim) {
            Some(details) if !details.is_empty() => format!("{message} ({details})"),
            _ => message.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn postgrest_body_is_unpacked() {
        let body = br#"{"code":"23502","message":"null value in column \"title\"","details":"Failing row contains (...)","hint":null}"#;
        match ServiceError::from_response(400, body) {
            ServiceError::Api { status, code, message } => {
                assert_eq!(status, 400);
                assert_eq!(code.as_deref(), Some("23502"));
                assert!(message.starts_with("null value in column"));
                assert!(message.ends_with("(Failing row contains (...))"));
            }
            other => panic!("Expected Api, got {other:?}"),
        }
    }

    #[test]
    fn plain_text_body_is_kept() {
        let err = ServiceError::from_response(502, b"upstream unavailable");
        assert_eq!(err.to_string(), "Service error: 502 - upstream unavailable");
        assert_eq!(err.error_type(), "api_error");
    }

    #[test]
    fn empty_body_falls_back_to_reason() {
        let err = ServiceError::from_response(401, b"");
        assert_eq!(err.to_string(), "Service error: 401 - Unauthorized");
    }

    #[test]
    fn not_found_message() {
        let err = ServiceError::NotFound { id: "abc".to_string() };
        assert_eq!(err.to_string(), "Todo 'abc' not found");
        assert_eq!(err.error_type(), "not_found");
    }
}
