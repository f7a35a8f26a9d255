use http::{Method, StatusCode};
use serde_json::Value;

/// What an observer gets to see of a response
#[derive(Debug, Clone, Copy)]
pub struct ResponseInfo<'a> {
    pub method: &'a Method,
    pub url: &'a str,
    pub status: StatusCode,
    /// Decoded body, when it was read before the observer ran.
    /// Successful streaming responses never carry one.
    pub body: Option<&'a Value>,
}

/// Hook invoked for every response once its status is known
///
/// Observers must not rely on being able to change the outcome of a call.
pub trait ResponseObserver: Send + Sync {
    fn on_response(&self, info: &ResponseInfo<'_>);
}

/// Observer installed by `Configuration::log_errors`
#[derive(Debug, Default, Clone, Copy)]
pub struct ErrorLogger;

impl ResponseObserver for ErrorLogger {
    fn on_response(&self, info: &ResponseInfo<'_>) {
        if info.status.is_success() {
            tracing::debug!(
                method = %info.method,
                url = info.url,
                status = info.status.as_u16(),
                "OpenRouter response"
            );
            return;
        }

        match info.body {
            Some(body) => tracing::error!(
                method = %info.method,
                url = info.url,
                status = info.status.as_u16(),
                body = %body,
                "OpenRouter HTTP error"
            ),
            None => tracing::error!(
                method = %info.method,
                url = info.url,
                status = info.status.as_u16(),
                "OpenRouter HTTP error"
            ),
        }
    }
}
