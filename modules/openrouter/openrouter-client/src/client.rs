use std::future::Future;
use std::sync::Arc;

use http::{Method, StatusCode};
use serde_json::Value;

use crate::body::{self, Body};
use crate::config::Configuration;
use crate::error::ClientError;
use crate::observer::{ErrorLogger, ResponseInfo, ResponseObserver};
use crate::params::{EventCallback, MultipartParameters, PostParameters};
use crate::request::Request;
use crate::response::Response;
use crate::stream::StreamState;

/// `OpenRouter` API client
///
/// Cheap to clone and safe to share between threads: the only state is the
/// immutable configuration, and every call builds its own transport.
#[derive(Debug, Clone)]
pub struct OpenRouterClient {
    config: Arc<Configuration>,
}

impl OpenRouterClient {
    #[must_use]
    pub fn new(config: Configuration) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Create client from `OPENROUTER_*` environment variables
    ///
    /// # Errors
    /// See [`Configuration::from_env`].
    pub fn from_env() -> Result<Self, ClientError> {
        Ok(Self::new(Configuration::from_env()?))
    }

    #[must_use]
    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// GET `path` and return the decoded body
    ///
    /// Bodies that are not JSON come back as [`Value::String`].
    ///
    /// # Errors
    /// Transport errors, or [`ClientError::Http`] for a non-2xx status.
    pub async fn get(&self, path: &str) -> Result<Value, ClientError> {
        let request = Request::new(&self.config, Method::GET, path, Body::Empty)?;
        self.execute(request).await
    }

    /// DELETE `path` and return the decoded body
    ///
    /// # Errors
    /// Transport errors, or [`ClientError::Http`] for a non-2xx status.
    pub async fn delete(&self, path: &str) -> Result<Value, ClientError> {
        let request = Request::new(&self.config, Method::DELETE, path, Body::Empty)?;
        self.execute(request).await
    }

    /// POST `parameters` as JSON to `path`
    ///
    /// With a streaming callback the response is consumed as Server-Sent
    /// Events, every event is handed to the callback, and `None` is returned
    /// once the stream ends. Otherwise the decoded body is returned.
    ///
    /// # Errors
    /// Transport errors, [`ClientError::Http`] for an error status (for
    /// streaming calls, any status other than 200), or
    /// [`ClientError::Serialization`] for an event whose data is not JSON.
    /// Events delivered before a streaming error stay delivered.
    pub async fn post(
        &self,
        path: &str,
        parameters: PostParameters<'_>,
    ) -> Result<Option<Value>, ClientError> {
        let (json, callback) = parameters.encode()?;
        let request = Request::new(&self.config, Method::POST, path, Body::Json(json))?;
        match callback {
            Some(callback) => {
                self.execute_streaming(request, callback).await?;
                Ok(None)
            }
            None => self.execute(request).await.map(Some),
        }
    }

    /// POST `parameters` to `path` as `multipart/form-data`
    ///
    /// # Errors
    /// [`ClientError::Io`] when a file field cannot be opened, transport
    /// errors, or [`ClientError::Http`] for a non-2xx status.
    pub async fn multipart_post(
        &self,
        path: &str,
        parameters: MultipartParameters,
    ) -> Result<Value, ClientError> {
        let request = Request::new(
            &self.config,
            Method::POST,
            path,
            Body::Multipart(parameters),
        )?;
        self.execute(request).await
    }

    /// Blocking version of [`Self::get`]
    ///
    /// # Errors
    /// See [`Self::get`].
    ///
    /// # Panics
    /// When called from inside a current-thread Tokio runtime.
    pub fn get_blocking(&self, path: &str) -> Result<Value, ClientError> {
        block_on(self.get(path))
    }

    /// Blocking version of [`Self::delete`]
    ///
    /// # Errors
    /// See [`Self::delete`].
    ///
    /// # Panics
    /// When called from inside a current-thread Tokio runtime.
    pub fn delete_blocking(&self, path: &str) -> Result<Value, ClientError> {
        block_on(self.delete(path))
    }

    /// Blocking version of [`Self::post`]
    ///
    /// The callback runs on the calling thread's runtime, in arrival order.
    ///
    /// # Errors
    /// See [`Self::post`].
    ///
    /// # Panics
    /// When called from inside a current-thread Tokio runtime.
    pub fn post_blocking(
        &self,
        path: &str,
        parameters: PostParameters<'_>,
    ) -> Result<Option<Value>, ClientError> {
        block_on(self.post(path, parameters))
    }

    /// Blocking version of [`Self::multipart_post`]
    ///
    /// # Errors
    /// See [`Self::multipart_post`].
    ///
    /// # Panics
    /// When called from inside a current-thread Tokio runtime.
    pub fn multipart_post_blocking(
        &self,
        path: &str,
        parameters: MultipartParameters,
    ) -> Result<Value, ClientError> {
        block_on(self.multipart_post(path, parameters))
    }

    async fn send(
        &self,
        request: Request,
        streaming: bool,
    ) -> Result<reqwest::Response, ClientError> {
        let transport = self.config.transport()?;
        let (method, url, headers, payload) = request.into_parts();
        tracing::debug!(%method, url = %url, streaming, "OpenRouter request");

        let mut builder = transport.request(method, &url).headers(headers);
        if !streaming {
            builder = builder.timeout(self.config.request_timeout);
        }
        let builder = match payload {
            Body::Empty => builder,
            Body::Json(bytes) => builder.body(bytes),
            Body::Multipart(params) => builder.multipart(body::into_form(params).await?),
        };

        Ok(builder.send().await?)
    }

    async fn execute(&self, request: Request) -> Result<Value, ClientError> {
        let method = request.method().clone();
        let url = request.url().to_owned();

        let response = Response::read(self.send(request, false).await?).await?;
        self.observe(&method, &url, response.status(), Some(response.body()));
        response.into_body()
    }

    async fn execute_streaming(
        &self,
        request: Request,
        callback: EventCallback<'_>,
    ) -> Result<(), ClientError> {
        let method = request.method().clone();
        let url = request.url().to_owned();

        let response = self.send(request, true).await?;
        let status = response.status();
        if status == StatusCode::OK {
            self.observe(&method, &url, status, None);
        }

        let result = StreamState::new(callback).consume(response).await;
        if status != StatusCode::OK {
            // The error body is only known once the stream has been drained
            let body = match &result {
                Err(ClientError::Http { body, .. }) => Some(body),
                _ => None,
            };
            self.observe(&method, &url, status, body);
        }

        let delivered = result?;
        tracing::debug!(url = %url, delivered, "OpenRouter stream finished");
        Ok(())
    }

    fn observe(&self, method: &Method, url: &str, status: StatusCode, body: Option<&Value>) {
        let info = ResponseInfo {
            method,
            url,
            status,
            body,
        };
        if self.config.log_errors {
            ErrorLogger.on_response(&info);
        }
        if let Some(observer) = &self.config.observer {
            observer.on_response(&info);
        }
    }
}

/// Drive `fut` to completion from synchronous code
///
/// Reuses the ambient multi-threaded runtime if there is one, otherwise
/// spins up a temporary current-thread runtime.
fn block_on<T, F>(fut: F) -> Result<T, ClientError>
where
    F: Future<Output = Result<T, ClientError>>,
{
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => tokio::task::block_in_place(|| handle.block_on(fut)),
        Err(_) => tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?
            .block_on(fut),
    }
}
