use bytes::Bytes;
use http::StatusCode;
use serde_json::Value;

use crate::error::ClientError;

/// A fully buffered, decoded response
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Response {
    status: StatusCode,
    body: Value,
}

impl Response {
    /// Read the whole body of a transport response
    pub(crate) async fn read(response: reqwest::Response) -> Result<Self, ClientError> {
        let status = response.status();
        let bytes = response.bytes().await?;
        Ok(Self::from_bytes(status, &bytes))
    }

    pub(crate) fn from_bytes(status: StatusCode, bytes: &Bytes) -> Self {
        Self {
            status,
            body: decode_lenient(bytes),
        }
    }

    pub(crate) fn status(&self) -> StatusCode {
        self.status
    }

    pub(crate) fn body(&self) -> &Value {
        &self.body
    }

    /// Return only the body, or the status and body as an error for non-2xx
    pub(crate) fn into_body(self) -> Result<Value, ClientError> {
        if self.status.is_success() {
            Ok(self.body)
        } else {
            Err(ClientError::Http {
                status: self.status,
                body: self.body,
            })
        }
    }
}

/// Decode a body as JSON, falling back to its text
///
/// Empty (or whitespace-only) bodies decode to `Null`.
pub(crate) fn decode_lenient(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}
