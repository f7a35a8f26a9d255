//! `OpenRouter` API client
//!
//! Thin HTTP binding for the `OpenRouter` chat-completion gateway (an
//! `OpenAI`-compatible API). It builds authenticated requests, streams
//! Server-Sent-Events responses into a callback, and decodes JSON bodies.
//!
//! - `get`, `post`, `delete` and `multipart_post`, each with a `*_blocking` twin
//! - Streaming POSTs: every SSE event except `[DONE]` is decoded and handed
//!   to the caller's callback, in order, as it arrives
//! - Errors carry the HTTP status and the decoded (or raw) error body
//!
//! # Examples
//!
//! ## Blocking Usage
//!
//! ```no_run
//! use openrouter_client::{Configuration, OpenRouterClient};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OpenRouterClient::new(Configuration::new("sk-or-..."));
//! let models = client.get_blocking("models")?;
//! println!("{}", models["data"][0]["id"]);
//! # Ok(())
//! # }
//! ```
//!
//! ## SSE Streaming
//!
//! ```no_run
//! use openrouter_client::{OpenRouterClient, PostParameters};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OpenRouterClient::from_env()?;
//!
//! let parameters = PostParameters::json(&json!({
//!     "model": "openai/gpt-4o-mini",
//!     "messages": [{"role": "user", "content": "Hello"}],
//! }))?
//! .on_event(|chunk| {
//!     if let Some(text) = chunk["choices"][0]["delta"]["content"].as_str() {
//!         print!("{text}");
//!     }
//! });
//!
//! client.post("chat/completions", parameters).await?;
//! # Ok(())
//! # }
//! ```

mod body;
mod client;
mod config;
mod error;
mod observer;
mod params;
mod request;
mod response;
mod sse;
mod stream;

// Re-export public API
pub use client::OpenRouterClient;
pub use config::{
    Configuration, DEFAULT_API_VERSION, DEFAULT_REQUEST_TIMEOUT, DEFAULT_URI_BASE, TransportHook,
};
pub use error::ClientError;
pub use observer::{ErrorLogger, ResponseInfo, ResponseObserver};
pub use params::{EventCallback, MultipartParameters, MultipartValue, PostParameters, Stream};
pub use request::{
    DEFAULT_REFERER, DEFAULT_TITLE, REFERER_HEADER, TITLE_HEADER, build_headers, build_url,
};
pub use sse::{SseEvent, SseParser};
pub use stream::DONE_SENTINEL;

// Re-export commonly used types from dependencies
pub use http::{Method, StatusCode};
pub use serde_json::Value;
