use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::ClientError;
use crate::observer::ResponseObserver;

pub const DEFAULT_URI_BASE: &str = "https://openrouter.ai/api";
pub const DEFAULT_API_VERSION: &str = "v1";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Hook applied to every freshly built transport before it is used
pub type TransportHook = Arc<dyn Fn(reqwest::ClientBuilder) -> reqwest::ClientBuilder + Send + Sync>;

/// Configuration for [`crate::OpenRouterClient`]
///
/// Read on every request and never mutated by the client.
#[derive(Clone)]
pub struct Configuration {
    pub uri_base: String,
    pub api_version: String,
    pub access_token: String,
    /// Sent on every request, overriding the built-in headers on collision
    pub extra_headers: BTreeMap<String, String>,
    /// Connect and per-read timeout; also the total deadline of non-streaming calls
    pub request_timeout: Duration,
    pub transport_hook: Option<TransportHook>,
    /// Log every response through [`crate::ErrorLogger`]
    pub log_errors: bool,
    pub observer: Option<Arc<dyn ResponseObserver>>,
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("uri_base", &self.uri_base)
            .field("api_version", &self.api_version)
            .field("access_token", &"[REDACTED]")
            .field("extra_headers", &self.extra_headers)
            .field("request_timeout", &self.request_timeout)
            .field("transport_hook", &self.transport_hook.is_some())
            .field("log_errors", &self.log_errors)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl Configuration {
    /// Create configuration pointing at the public `OpenRouter` endpoint
    #[must_use]
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            uri_base: DEFAULT_URI_BASE.to_owned(),
            api_version: DEFAULT_API_VERSION.to_owned(),
            access_token: access_token.into(),
            extra_headers: BTreeMap::new(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            transport_hook: None,
            log_errors: false,
            observer: None,
        }
    }

    #[must_use]
    pub fn with_uri_base(mut self, uri_base: impl Into<String>) -> Self {
        self.uri_base = uri_base.into();
        self
    }

    #[must_use]
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Add a header sent on every request
    #[must_use]
    pub fn with_extra_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Customize the `reqwest` client builder (proxies, TLS roots, ...)
    #[must_use]
    pub fn with_transport_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(reqwest::ClientBuilder) -> reqwest::ClientBuilder + Send + Sync + 'static,
    {
        self.transport_hook = Some(Arc::new(hook));
        self
    }

    #[must_use]
    pub fn with_log_errors(mut self, enabled: bool) -> Self {
        self.log_errors = enabled;
        self
    }

    /// Install a custom observer that sees every response
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn ResponseObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Create configuration from environment variables
    ///
    /// Expects:
    /// - `OPENROUTER_ACCESS_TOKEN`: API key (required)
    /// - `OPENROUTER_URI_BASE`: base URI (default: "<https://openrouter.ai/api>")
    /// - `OPENROUTER_API_VERSION`: API version segment (default: "v1")
    /// - `OPENROUTER_REQUEST_TIMEOUT`: timeout in seconds (default: 120)
    /// - `OPENROUTER_LOG_ERRORS`: "true" or "1" enables response logging
    ///
    /// # Errors
    /// Returns [`ClientError::BuildError`] when the token is missing or the
    /// timeout is not a whole number of seconds.
    pub fn from_env() -> Result<Self, ClientError> {
        let access_token = std::env::var("OPENROUTER_ACCESS_TOKEN")
            .map_err(|_| ClientError::BuildError("OPENROUTER_ACCESS_TOKEN not set".into()))?;

        let mut config = Self::new(access_token);
        if let Ok(uri_base) = std::env::var("OPENROUTER_URI_BASE") {
            config.uri_base = uri_base;
        }
        if let Ok(api_version) = std::env::var("OPENROUTER_API_VERSION") {
            config.api_version = api_version;
        }
        if let Ok(secs) = std::env::var("OPENROUTER_REQUEST_TIMEOUT") {
            let secs = secs.trim().parse::<u64>().map_err(|e| {
                ClientError::BuildError(format!("Invalid OPENROUTER_REQUEST_TIMEOUT: {e}"))
            })?;
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Ok(flag) = std::env::var("OPENROUTER_LOG_ERRORS") {
            config.log_errors = matches!(flag.trim().to_ascii_lowercase().as_str(), "true" | "1");
        }

        Ok(config)
    }

    /// Build the per-call transport
    ///
    /// `request_timeout` bounds connecting and every single read, so a stream
    /// that keeps producing events is never cut off. Buffered calls add a
    /// total deadline per request on top of this.
    pub(crate) fn transport(&self) -> Result<reqwest::Client, ClientError> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(self.request_timeout)
            .read_timeout(self.request_timeout);
        if let Some(hook) = &self.transport_hook {
            builder = hook(builder);
        }
        builder
            .build()
            .map_err(|e| ClientError::BuildError(e.to_string()))
    }
}
