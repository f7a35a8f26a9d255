use std::io;
use thiserror::Error;
use http::StatusCode;
use serde_json::Value;

/// Errors returned by [`crate::OpenRouterClient`] operations
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request build error: {0}")]
    BuildError(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Non-success status. `body` is the decoded JSON error body, or the raw
    /// text when it is not JSON, or `Null` when the server sent nothing.
    #[error("HTTP error: status={status}, body={body}")]
    Http { status: StatusCode, body: Value },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Reqwest error: {0}")]
    Reqwest(reqwest::Error),
}

impl ClientError {
    /// HTTP status carried by an [`ClientError::Http`] error
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Decoded error body carried by an [`ClientError::Http`] error
    #[must_use]
    pub fn body(&self) -> Option<&Value> {
        match self {
            ClientError::Http { body, .. } => Some(body),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout(err.to_string())
        } else if err.is_connect() {
            ClientError::Connection(err.to_string())
        } else {
            ClientError::Reqwest(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_http_error_accessors() {
        let err = ClientError::Http {
            status: StatusCode::BAD_REQUEST,
            body: json!({"error": "bad"}),
        };
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
        assert_eq!(err.body(), Some(&json!({"error": "bad"})));
    }

    #[test]
    fn test_non_http_error_has_no_status() {
        let err = ClientError::Timeout("deadline".into());
        assert!(err.status().is_none());
        assert!(err.body().is_none());
    }

    #[test]
    fn test_serde_error_conversion() {
        let err: ClientError = serde_json::from_str::<Value>("{").unwrap_err().into();
        assert!(matches!(err, ClientError::Serialization(_)));
    }
}
