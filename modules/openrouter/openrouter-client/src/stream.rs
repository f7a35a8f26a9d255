use futures::StreamExt;
use http::StatusCode;
use serde_json::Value;

use crate::error::ClientError;
use crate::params::EventCallback;
use crate::response::decode_lenient;
use crate::sse::SseParser;

/// Data of the event that ends an `OpenRouter` stream
pub const DONE_SENTINEL: &str = "[DONE]";

/// State of one streaming call
///
/// Owns the SSE parser for the lifetime of the call; dropping it releases
/// any partially buffered event.
pub(crate) struct StreamState<'a> {
    parser: SseParser,
    callback: EventCallback<'a>,
    delivered: usize,
}

impl<'a> StreamState<'a> {
    pub(crate) fn new(callback: EventCallback<'a>) -> Self {
        Self {
            parser: SseParser::new(),
            callback,
            delivered: 0,
        }
    }

    /// Number of events handed to the callback so far
    pub(crate) fn delivered(&self) -> usize {
        self.delivered
    }

    /// Handle one raw chunk of the response body
    ///
    /// A non-200 status turns the chunk into an error body before any SSE
    /// parsing happens.
    pub(crate) fn on_chunk(&mut self, status: StatusCode, chunk: &[u8]) -> Result<(), ClientError> {
        if chunk.is_empty() {
            return Ok(());
        }
        if status != StatusCode::OK {
            return Err(ClientError::Http {
                status,
                body: decode_lenient(chunk),
            });
        }

        for event in self.parser.feed(chunk)? {
            if event.data == DONE_SENTINEL {
                continue;
            }
            let value: Value = serde_json::from_str(&event.data)?;
            tracing::trace!(index = self.delivered, "stream event");
            (self.callback)(value);
            self.delivered += 1;
        }
        Ok(())
    }

    /// Called once the transport reports end of stream
    pub(crate) fn finish(&self, status: StatusCode) -> Result<(), ClientError> {
        if status != StatusCode::OK {
            // Error status with an empty body never reached on_chunk
            return Err(ClientError::Http {
                status,
                body: Value::Null,
            });
        }
        if self.parser.has_pending() {
            tracing::debug!("stream ended inside an unterminated event, discarding it");
        }
        Ok(())
    }

    /// Pump a transport response through the state until the stream ends
    pub(crate) async fn consume(mut self, response: reqwest::Response) -> Result<usize, ClientError> {
        let status = response.status();
        let mut chunks = response.bytes_stream();
        while let Some(chunk) = chunks.next().await {
            self.on_chunk(status, &chunk?)?;
        }
        self.finish(status)?;
        Ok(self.delivered())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn recording_state() -> (StreamState<'static>, Arc<Mutex<Vec<Value>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let state = StreamState::new(Box::new(move |value: Value| sink.lock().unwrap().push(value)));
        (state, seen)
    }

    #[test]
    fn test_two_events_then_done() {
        let (mut state, seen) = recording_state();
        state
            .on_chunk(
                StatusCode::OK,
                b"data: {\"id\":1}\n\ndata: {\"id\":2}\n\ndata: [DONE]\n\n",
            )
            .unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![json!({"id": 1}), json!({"id": 2})]);
        assert_eq!(state.delivered(), 2);
        assert!(state.finish(StatusCode::OK).is_ok());
    }

    #[test]
    fn test_event_split_across_chunks() {
        let (mut state, seen) = recording_state();
        state.on_chunk(StatusCode::OK, b"data: {\"a\"").unwrap();
        assert!(seen.lock().unwrap().is_empty());

        state.on_chunk(StatusCode::OK, b":1}\n\n").unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![json!({"a": 1})]);
    }

    #[test]
    fn test_error_status_with_json_body() {
        let (mut state, seen) = recording_state();
        let err = state
            .on_chunk(StatusCode::INTERNAL_SERVER_ERROR, br#"{"error":"bad"}"#)
            .unwrap_err();

        match err {
            ClientError::Http { status, body } => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(body, json!({"error": "bad"}));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_error_status_with_raw_body() {
        let (mut state, _) = recording_state();
        let err = state
            .on_chunk(StatusCode::INTERNAL_SERVER_ERROR, b"oops")
            .unwrap_err();
        assert_eq!(err.body(), Some(&json!("oops")));
    }

    #[test]
    fn test_error_status_checked_before_sse_parsing() {
        let (mut state, seen) = recording_state();
        let err = state
            .on_chunk(StatusCode::TOO_MANY_REQUESTS, b"data: {\"a\":1}\n\n")
            .unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::TOO_MANY_REQUESTS));
        assert_eq!(err.body(), Some(&json!("data: {\"a\":1}\n\n")));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_empty_chunk_is_noop() {
        let (mut state, seen) = recording_state();
        state.on_chunk(StatusCode::OK, b"").unwrap();
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_error_status_without_body_fails_on_finish() {
        let (state, _) = recording_state();
        let err = state.finish(StatusCode::BAD_GATEWAY).unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::BAD_GATEWAY));
        assert_eq!(err.body(), Some(&Value::Null));
    }

    #[test]
    fn test_invalid_event_json_aborts() {
        let (mut state, seen) = recording_state();
        let err = state
            .on_chunk(StatusCode::OK, b"data: {\"ok\":true}\n\ndata: not json\n\ndata: {\"late\":1}\n\n")
            .unwrap_err();
        assert!(matches!(err, ClientError::Serialization(_)));
        assert_eq!(*seen.lock().unwrap(), vec![json!({"ok": true})]);
    }

    #[test]
    fn test_borrowed_callback() {
        let mut seen = Vec::new();
        {
            let mut state = StreamState::new(Box::new(|value: Value| seen.push(value)));
            state.on_chunk(StatusCode::OK, b"data: {\"n\":1}\n\n").unwrap();
        }
        assert_eq!(seen, vec![json!({"n": 1})]);
    }
}
