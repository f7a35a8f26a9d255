use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, HeaderName, HeaderValue, Method};

use crate::body::Body;
use crate::config::Configuration;
use crate::error::ClientError;

/// `HTTP-Referer` and `X-Title` identify the calling application to `OpenRouter`
pub const REFERER_HEADER: &str = "HTTP-Referer";
pub const TITLE_HEADER: &str = "X-Title";
pub const DEFAULT_REFERER: &str = "https://github.com/cyberfabric/cyberfabric-core";
pub const DEFAULT_TITLE: &str = "OpenRouter Rust Client";

/// Join base URI, API version and path with single `/` separators
///
/// Only the separators at each joint are collapsed; nothing is encoded or
/// otherwise normalized.
#[must_use]
pub fn build_url(uri_base: &str, api_version: &str, path: &str) -> String {
    let mut url = String::with_capacity(uri_base.len() + api_version.len() + path.len() + 2);
    for part in [uri_base, api_version, path] {
        if part.is_empty() {
            continue;
        }
        if url.is_empty() {
            url.push_str(part);
            continue;
        }
        let trimmed = url.trim_end_matches('/').len();
        url.truncate(trimmed);
        url.push('/');
        url.push_str(part.trim_start_matches('/'));
    }
    url
}

/// Build the header map for a call
///
/// Multipart calls get no `Content-Type` here; the transport writes
/// `multipart/form-data` together with the generated boundary.
///
/// # Errors
/// Returns [`ClientError::BuildError`] for a token or extra header that is not
/// a valid header name/value.
pub fn build_headers(config: &Configuration, multipart: bool) -> Result<HeaderMap, ClientError> {
    let mut headers = HeaderMap::new();

    let bearer = HeaderValue::from_str(&format!("Bearer {}", config.access_token))
        .map_err(|e| ClientError::BuildError(format!("Invalid access token: {e}")))?;
    headers.insert(AUTHORIZATION, bearer);
    if !multipart {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }
    headers.insert(
        HeaderName::from_static("http-referer"),
        HeaderValue::from_static(DEFAULT_REFERER),
    );
    headers.insert(
        HeaderName::from_static("x-title"),
        HeaderValue::from_static(DEFAULT_TITLE),
    );

    for (name, value) in &config.extra_headers {
        let name = HeaderName::try_from(name.as_str())
            .map_err(|e| ClientError::BuildError(format!("Invalid header name: {e}")))?;
        let value = HeaderValue::try_from(value.as_str())
            .map_err(|e| ClientError::BuildError(format!("Invalid header value: {e}")))?;
        if multipart && name == CONTENT_TYPE {
            continue;
        }
        headers.insert(name, value);
    }

    Ok(headers)
}

/// A fully built call: method, absolute URL, headers and body
#[derive(Debug)]
pub(crate) struct Request {
    method: Method,
    url: String,
    headers: HeaderMap,
    body: Body,
}

impl Request {
    pub(crate) fn new(
        config: &Configuration,
        method: Method,
        path: &str,
        body: Body,
    ) -> Result<Self, ClientError> {
        let headers = build_headers(config, body.is_multipart())?;
        Ok(Self {
            method,
            url: build_url(&config.uri_base, &config.api_version, path),
            headers,
            body,
        })
    }

    pub(crate) fn method(&self) -> &Method {
        &self.method
    }

    pub(crate) fn url(&self) -> &str {
        &self.url
    }

    pub(crate) fn into_parts(self) -> (Method, String, HeaderMap, Body) {
        (self.method, self.url, self.headers, self.body)
    }
}
