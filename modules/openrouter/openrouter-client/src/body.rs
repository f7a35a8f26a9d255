use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use tokio_util::io::ReaderStream;

use crate::error::ClientError;
use crate::params::{MultipartParameters, MultipartValue};

/// Outbound request body
pub(crate) enum Body {
    /// GET and DELETE
    Empty,
    /// Encoded JSON parameters
    Json(Bytes),
    /// Form fields, files opened lazily when the request is sent
    Multipart(MultipartParameters),
}

impl std::fmt::Debug for Body {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Body::Empty => write!(f, "Body::Empty"),
            Body::Json(bytes) => f.debug_tuple("Body::Json").field(&bytes.len()).finish(),
            Body::Multipart(params) => f
                .debug_tuple("Body::Multipart")
                .field(&params.fields().len())
                .finish(),
        }
    }
}

impl Body {
    pub(crate) fn is_multipart(&self) -> bool {
        matches!(self, Body::Multipart(_))
    }
}

/// Turn multipart parameters into a form, opening every file-valued field as an upload stream
pub(crate) async fn into_form(params: MultipartParameters) -> Result<Form, ClientError> {
    let mut form = Form::new();
    for (name, value) in params.into_fields() {
        form = match value {
            MultipartValue::Text(text) => form.text(name, text),
            MultipartValue::File(path) => {
                let file = tokio::fs::File::open(&path).await?;
                let len = file.metadata().await?.len();
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();

                // No explicit MIME type, the server infers it.
                let part = Part::stream_with_length(
                    reqwest::Body::wrap_stream(ReaderStream::new(file)),
                    len,
                )
                .file_name(file_name);
                form.part(name, part)
            }
        };
    }
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let params = MultipartParameters::new().file("file", "/definitely/not/here.jsonl");
        let err = into_form(params).await.unwrap_err();
        assert!(matches!(err, ClientError::Io(_)));
    }

    #[tokio::test]
    async fn test_form_from_text_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("train.jsonl");
        std::fs::write(&path, "{\"prompt\":\"hi\"}\n").unwrap();

        let params = MultipartParameters::new()
            .text("purpose", "fine-tune")
            .file("file", &path);
        let form = into_form(params).await.unwrap();
        assert!(!form.boundary().is_empty());
    }

    #[test]
    fn test_body_debug_hides_content() {
        let body = Body::Json(Bytes::from_static(b"{\"secret\":1}"));
        assert_eq!(format!("{body:?}"), "Body::Json(12)");
        assert!(!body.is_multipart());
    }
}
