use std::fmt;
use std::path::PathBuf;

use bytes::Bytes;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ClientError;

/// Per-event callback for streaming POST calls
pub type EventCallback<'a> = Box<dyn FnMut(Value) + Send + 'a>;

/// How the `stream` field of a POST body is produced
#[derive(Default)]
pub enum Stream<'a> {
    /// No `stream` field is sent
    #[default]
    None,
    /// `stream` is sent as the given boolean; the response is not parsed as SSE
    Flag(bool),
    /// `stream: true` is sent and every SSE event is decoded and handed to the callback
    Callback(EventCallback<'a>),
}

impl fmt::Debug for Stream<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stream::None => write!(f, "Stream::None"),
            Stream::Flag(flag) => f.debug_tuple("Stream::Flag").field(flag).finish(),
            Stream::Callback(_) => write!(f, "Stream::Callback(..)"),
        }
    }
}

/// Parameters of a JSON POST call
#[derive(Debug, Default)]
pub struct PostParameters<'a> {
    fields: Map<String, Value>,
    stream: Stream<'a>,
}

impl<'a> PostParameters<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build parameters from a JSON object
    ///
    /// A boolean `stream` member becomes [`Stream::Flag`]; any other `stream`
    /// value is sent untouched.
    ///
    /// # Errors
    /// Returns [`ClientError::BuildError`] when `value` is not a JSON object.
    pub fn from_value(value: Value) -> Result<Self, ClientError> {
        let Value::Object(mut fields) = value else {
            return Err(ClientError::BuildError(
                "POST parameters must be a JSON object".into(),
            ));
        };

        let stream = match fields.get("stream") {
            Some(Value::Bool(flag)) => {
                let flag = *flag;
                fields.remove("stream");
                Stream::Flag(flag)
            }
            _ => Stream::None,
        };

        Ok(Self { fields, stream })
    }

    /// Build parameters from any value serializing to a JSON object
    ///
    /// # Errors
    /// Returns [`ClientError::Serialization`] if `value` fails to serialize and
    /// [`ClientError::BuildError`] if it is not an object.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, ClientError> {
        Self::from_value(serde_json::to_value(value)?)
    }

    /// Set a body field
    #[must_use]
    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn stream(mut self, stream: Stream<'a>) -> Self {
        self.stream = stream;
        self
    }

    /// Stream the response, handing each decoded event to `callback`
    #[must_use]
    pub fn on_event<F>(self, callback: F) -> Self
    where
        F: FnMut(Value) + Send + 'a,
    {
        self.stream(Stream::Callback(Box::new(callback)))
    }

    #[must_use]
    pub fn is_streaming(&self) -> bool {
        matches!(self.stream, Stream::Callback(_))
    }

    /// Encode the body, splitting off the streaming callback if there is one
    pub(crate) fn encode(self) -> Result<(Bytes, Option<EventCallback<'a>>), ClientError> {
        let Self { mut fields, stream } = self;
        let callback = match stream {
            Stream::None => None,
            Stream::Flag(flag) => {
                fields.insert("stream".to_owned(), Value::Bool(flag));
                None
            }
            Stream::Callback(callback) => {
                fields.insert("stream".to_owned(), Value::Bool(true));
                Some(callback)
            }
        };

        let body = serde_json::to_vec(&Value::Object(fields))?;
        Ok((Bytes::from(body), callback))
    }
}

/// One field of a multipart POST
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MultipartValue {
    Text(String),
    /// Uploaded from disk as a stream, named after the file's basename
    File(PathBuf),
}

impl From<String> for MultipartValue {
    fn from(s: String) -> Self {
        MultipartValue::Text(s)
    }
}

impl From<&str> for MultipartValue {
    fn from(s: &str) -> Self {
        MultipartValue::Text(s.to_owned())
    }
}

impl From<PathBuf> for MultipartValue {
    fn from(p: PathBuf) -> Self {
        MultipartValue::File(p)
    }
}

/// Parameters of a multipart POST call, sent in insertion order
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MultipartParameters {
    fields: Vec<(String, MultipartValue)>,
}

impl MultipartParameters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields
            .push((name.into(), MultipartValue::Text(value.into())));
        self
    }

    #[must_use]
    pub fn file(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.fields
            .push((name.into(), MultipartValue::File(path.into())));
        self
    }

    /// Build from a JSON object; strings are sent verbatim, other values as JSON text
    ///
    /// # Errors
    /// Returns [`ClientError::BuildError`] when `value` is not a JSON object.
    pub fn from_value(value: Value) -> Result<Self, ClientError> {
        let Value::Object(map) = value else {
            return Err(ClientError::BuildError(
                "multipart parameters must be a JSON object".into(),
            ));
        };

        let fields = map
            .into_iter()
            .map(|(name, value)| {
                let text = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                (name, MultipartValue::Text(text))
            })
            .collect();
        Ok(Self { fields })
    }

    #[must_use]
    pub fn fields(&self) -> &[(String, MultipartValue)] {
        &self.fields
    }

    pub(crate) fn into_fields(self) -> Vec<(String, MultipartValue)> {
        self.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(bytes: &Bytes) -> Value {
        serde_json::from_slice(bytes).unwrap()
    }

    #[test]
    fn test_callback_forces_stream_true() {
        let params = PostParameters::json(&json!({"model": "openai/gpt-4o", "stream": false}))
            .unwrap()
            .on_event(|_| {});
        assert!(params.is_streaming());

        let (body, callback) = params.encode().unwrap();
        assert!(callback.is_some());
        assert_eq!(decode(&body), json!({"model": "openai/gpt-4o", "stream": true}));
    }

    #[test]
    fn test_stream_flag_is_encoded_verbatim() {
        let params = PostParameters::from_value(json!({"model": "m", "stream": false})).unwrap();
        let (body, callback) = params.encode().unwrap();
        assert!(callback.is_none());
        assert_eq!(decode(&body), json!({"model": "m", "stream": false}));
    }

    #[test]
    fn test_no_stream_field_by_default() {
        let params = PostParameters::new().field("model", "m");
        let (body, callback) = params.encode().unwrap();
        assert!(callback.is_none());
        assert_eq!(decode(&body), json!({"model": "m"}));
    }

    #[test]
    fn test_non_object_parameters_rejected() {
        let err = PostParameters::from_value(json!([1, 2])).unwrap_err();
        assert!(matches!(err, ClientError::BuildError(_)));
    }

    #[test]
    fn test_multipart_from_value_stringifies_scalars() {
        let params = MultipartParameters::from_value(json!({"purpose": "fine-tune", "n": 2})).unwrap();
        let mut fields = params.fields().to_vec();
        fields.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(
            fields,
            vec![
                ("n".to_owned(), MultipartValue::Text("2".to_owned())),
                ("purpose".to_owned(), MultipartValue::Text("fine-tune".to_owned())),
            ]
        );
    }

    #[test]
    fn test_multipart_builder_keeps_order() {
        let params = MultipartParameters::new()
            .text("purpose", "fine-tune")
            .file("file", "/tmp/data.jsonl");
        assert_eq!(params.fields().len(), 2);
        assert_eq!(
            params.fields()[1].1,
            MultipartValue::File(PathBuf::from("/tmp/data.jsonl"))
        );
    }
}
