use crate::error::ClientError;

/// A parsed Server-Sent Event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    /// Optional event ID
    pub id: Option<String>,
    /// Optional event type
    pub event: Option<String>,
    /// Event data, multiple `data:` lines joined with `\n`
    pub data: String,
    /// Optional retry interval in milliseconds
    pub retry: Option<u64>,
}

/// Incremental SSE parser
///
/// Bytes are buffered until a blank line closes an event, so events and
/// multi-byte characters may be split across any number of chunks.
#[derive(Debug, Default)]
pub struct SseParser {
    buffer: Vec<u8>,
    /// Bytes of `buffer` already searched for a separator
    scanned: usize,
}

impl SseParser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return every event it completes, in order
    ///
    /// # Errors
    /// Returns [`ClientError::InvalidResponse`] if a completed event is not UTF-8.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<SseEvent>, ClientError> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(separator) = self.find_double_newline() {
            let event_bytes: Vec<u8> = self.buffer.drain(..separator + 2).collect();
            self.scanned = 0;
            if let Some(event) = Self::parse_sse_event(&event_bytes)? {
                events.push(event);
            }
        }
        Ok(events)
    }

    /// Whether an incomplete event is still buffered
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.buffer.is_empty()
    }

    /// Find position of double newline in buffer
    ///
    /// Resumes where the previous search stopped, backing up far enough to
    /// catch a separator split across chunks.
    fn find_double_newline(&mut self) -> Option<usize> {
        let buf = &self.buffer;
        for i in self.scanned.saturating_sub(3)..buf.len().saturating_sub(1) {
            if buf[i] == b'\n' && buf[i + 1] == b'\n' {
                return Some(i);
            }
            if i + 3 < buf.len()
                && buf[i] == b'\r'
                && buf[i + 1] == b'\n'
                && buf[i + 2] == b'\r'
                && buf[i + 3] == b'\n'
            {
                return Some(i + 2);
            }
        }
        self.scanned = self.buffer.len();
        None
    }

    /// Parse a single SSE event from bytes
    fn parse_sse_event(data: &[u8]) -> Result<Option<SseEvent>, ClientError> {
        let text = std::str::from_utf8(data)
            .map_err(|e| ClientError::InvalidResponse(format!("Invalid UTF-8 in SSE: {e}")))?;

        let mut id = None;
        let mut event = None;
        let mut data_lines = Vec::new();
        let mut retry = None;

        for line in text.lines() {
            let line = line.trim_end_matches('\r');

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with(':') {
                continue;
            }

            let (field, value) = match line.split_once(':') {
                Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
                None => (line, ""),
            };

            match field {
                "id" => id = Some(value.to_owned()),
                "event" => event = Some(value.to_owned()),
                "data" => data_lines.push(value),
                "retry" => retry = value.parse::<u64>().ok(),
                _ => {}
            }
        }

        // If no data was found, skip this event
        if data_lines.is_empty() {
            return Ok(None);
        }

        Ok(Some(SseEvent {
            id,
            event,
            data: data_lines.join("\n"),
            retry,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_event() {
        let event = SseParser::parse_sse_event(b"data: hello world\n\n").unwrap().unwrap();
        assert_eq!(event.data, "hello world");
        assert_eq!(event.id, None);
        assert_eq!(event.event, None);
    }

    #[test]
    fn test_parse_event_with_id() {
        let data = b"id: 123\nevent: message\nretry: 500\ndata: hello\n\n";
        let event = SseParser::parse_sse_event(data).unwrap().unwrap();
        assert_eq!(event.data, "hello");
        assert_eq!(event.id, Some("123".to_owned()));
        assert_eq!(event.event, Some("message".to_owned()));
        assert_eq!(event.retry, Some(500));
    }

    #[test]
    fn test_parse_multiline_data() {
        let data = b"data: line 1\ndata: line 2\ndata: line 3\n\n";
        let event = SseParser::parse_sse_event(data).unwrap().unwrap();
        assert_eq!(event.data, "line 1\nline 2\nline 3");
    }

    #[test]
    fn test_comment_only_event_is_skipped() {
        // OpenRouter sends these as keep-alives while a model is queued
        let mut parser = SseParser::new();
        let events = parser.feed(b": OPENROUTER PROCESSING\n\n").unwrap();
        assert!(events.is_empty());
        assert!(!parser.has_pending());
    }

    #[test]
    fn test_events_split_across_chunks() {
        let mut parser = SseParser::new();
        assert!(parser.feed(b"data: {\"a\"").unwrap().is_empty());
        assert!(parser.has_pending());

        let events = parser.feed(b":1}\n\n").unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "{\"a\":1}");
        assert!(!parser.has_pending());
    }

    #[test]
    fn test_separator_split_across_chunks() {
        let mut parser = SseParser::new();
        assert!(parser.feed(b"data: x\n").unwrap().is_empty());
        let events = parser.feed(b"\ndata: y\n\n").unwrap();
        let data: Vec<_> = events.iter().map(|e| e.data.as_str()).collect();
        assert_eq!(data, ["x", "y"]);
    }

    #[test]
    fn test_crlf_separators() {
        let mut parser = SseParser::new();
        let events = parser.feed(b"data: one\r\n\r\ndata: two\r\n\r\n").unwrap();
        let data: Vec<_> = events.iter().map(|e| e.data.as_str()).collect();
        assert_eq!(data, ["one", "two"]);
    }

    #[test]
    fn test_multibyte_char_split_across_chunks() {
        let bytes = "data: caf\u{e9}\n\n".as_bytes();
        let split = bytes.len() - 3;
        let mut parser = SseParser::new();
        assert!(parser.feed(&bytes[..split]).unwrap().is_empty());
        let events = parser.feed(&bytes[split..]).unwrap();
        assert_eq!(events[0].data, "caf\u{e9}");
    }

    #[test]
    fn test_byte_at_a_time_feed() {
        let input = b"data: {\"long\":\"aaaaaaaaaaaaaaaa\"}\r\n\r\ndata: two\n\n";
        let mut parser = SseParser::new();
        let mut data = Vec::new();
        for byte in input {
            for event in parser.feed(std::slice::from_ref(byte)).unwrap() {
                data.push(event.data);
            }
            assert!(parser.scanned <= parser.buffer.len());
        }
        assert_eq!(data, ["{\"long\":\"aaaaaaaaaaaaaaaa\"}", "two"]);
        assert!(!parser.has_pending());
    }

    #[test]
    fn test_empty_chunk_is_noop() {
        let mut parser = SseParser::new();
        assert!(parser.feed(b"").unwrap().is_empty());
        assert!(!parser.has_pending());
    }
}
