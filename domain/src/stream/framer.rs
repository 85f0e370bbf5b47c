//! Incremental line framing for chunked event-stream bodies.
//!
//! [`StreamFramer`] turns arbitrarily split byte fragments into complete
//! protocol lines. Fragments may cut a line, or even a multi-byte UTF-8
//! sequence, at any position; the framer keeps whatever is incomplete and
//! yields it once the rest arrives.

/// Prefix marking a line that carries an event payload.
pub const EVENT_PREFIX: &str = "data: ";

/// Byte that terminates a protocol line.
pub const LINE_TERMINATOR: char = '\n';

/// Reassembles complete lines from a fragmented byte stream.
///
/// Decoding is incremental and lossy in the same way a streaming text
/// decoder is: an incomplete trailing sequence waits for the next fragment,
/// while a definitely-invalid sequence becomes `U+FFFD`.
///
/// # Example
///
/// ```
/// use casefile_domain::stream::framer::StreamFramer;
///
/// let mut framer = StreamFramer::new();
/// assert!(framer.push(b"data: {\"type\":").is_empty());
/// let lines = framer.push(b"\"start\"}\n\n");
/// assert_eq!(lines, vec!["data: {\"type\":\"start\"}".to_string(), String::new()]);
/// ```
#[derive(Debug, Default)]
pub struct StreamFramer {
    /// Undecoded bytes (an incomplete UTF-8 sequence at most).
    pending: Vec<u8>,
    /// Decoded text after the last line terminator.
    remainder: String,
}

impl StreamFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one fragment and return every line it completed, in order.
    pub fn push(&mut self, fragment: &[u8]) -> Vec<String> {
        self.decode(fragment);
        self.drain_lines()
    }

    /// Feed an already-decoded text fragment.
    pub fn push_str(&mut self, fragment: &str) -> Vec<String> {
        self.push(fragment.as_bytes())
    }

    /// Signal end of stream.
    ///
    /// The leftover segment is returned only when it looks like an event
    /// line; anything else (blank padding, a truncated comment) is dropped.
    pub fn finish(&mut self) -> Option<String> {
        if !self.pending.is_empty() {
            let tail = std::mem::take(&mut self.pending);
            self.remainder.push_str(&String::from_utf8_lossy(&tail));
        }

        let rest = std::mem::take(&mut self.remainder);
        let rest = rest.strip_suffix('\r').unwrap_or(&rest);
        if rest.starts_with(EVENT_PREFIX) {
            Some(rest.to_string())
        } else {
            None
        }
    }

    /// Text received after the last complete line.
    pub fn remainder(&self) -> &str {
        &self.remainder
    }

    /// Number of bytes still waiting to be decoded.
    pub fn pending_bytes(&self) -> usize {
        self.pending.len()
    }

    fn decode(&mut self, fragment: &[u8]) {
        self.pending.extend_from_slice(fragment);

        let mut consumed = 0;
        while consumed < self.pending.len() {
            let rest = &self.pending[consumed..];
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    self.remainder.push_str(text);
                    consumed = self.pending.len();
                }
                Err(err) => {
                    let valid = err.valid_up_to();
                    if let Ok(text) = std::str::from_utf8(&rest[..valid]) {
                        self.remainder.push_str(text);
                    }
                    match err.error_len() {
                        Some(invalid) => {
                            self.remainder.push(char::REPLACEMENT_CHARACTER);
                            consumed += valid + invalid;
                        }
                        // Incomplete sequence at the end: wait for more bytes.
                        None => {
                            consumed += valid;
                            break;
                        }
                    }
                }
            }
        }

        self.pending.drain(..consumed);
    }

    fn drain_lines(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        while let Some(pos) = self.remainder.find(LINE_TERMINATOR) {
            let mut line: String = self.remainder.drain(..=pos).collect();
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
            lines.push(line);
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = concat!(
        "data: {\"type\": \"start\", \"character_name\": \"李管家\"}\n\n",
        "data: {\"type\": \"chunk\", \"content\": \"他\"}\n\n",
        ": keepalive comment\n",
        "data: {\"type\": \"chunk\", \"content\": \"不在场\"}\n\n",
        "data: {\"type\": \"complete\", \"round_number\": 2}\n\n",
    );

    fn frame_all(fragments: &[&[u8]]) -> Vec<String> {
        let mut framer = StreamFramer::new();
        let mut lines = Vec::new();
        for fragment in fragments {
            lines.extend(framer.push(fragment));
        }
        lines.extend(framer.finish());
        lines
    }

    #[test]
    fn test_single_fragment_yields_all_lines() {
        let lines = frame_all(&[SAMPLE.as_bytes()]);
        let events: Vec<_> = lines.iter().filter(|l| l.starts_with(EVENT_PREFIX)).collect();
        assert_eq!(events.len(), 4);
        assert_eq!(lines[2], ": keepalive comment");
    }

    #[test]
    fn test_every_two_way_split_matches_unsplit() {
        let bytes = SAMPLE.as_bytes();
        let expected = frame_all(&[bytes]);

        for cut in 0..=bytes.len() {
            let (a, b) = bytes.split_at(cut);
            assert_eq!(frame_all(&[a, b]), expected, "split at byte {}", cut);
        }
    }

    #[test]
    fn test_byte_at_a_time_matches_unsplit() {
        let bytes = SAMPLE.as_bytes();
        let expected = frame_all(&[bytes]);
        let singles: Vec<&[u8]> = bytes.chunks(1).collect();
        assert_eq!(frame_all(&singles), expected);
    }

    #[test]
    fn test_uneven_chunk_sizes_match_unsplit() {
        let bytes = SAMPLE.as_bytes();
        let expected = frame_all(&[bytes]);
        for size in [2, 3, 5, 7, 11, 13] {
            let chunks: Vec<&[u8]> = bytes.chunks(size).collect();
            assert_eq!(frame_all(&chunks), expected, "chunk size {}", size);
        }
    }

    #[test]
    fn test_multibyte_character_split_across_fragments() {
        // "场" is E5 9C BA
        let mut framer = StreamFramer::new();
        assert!(framer.push(b"data: \xE5\x9C").is_empty());
        assert_eq!(framer.pending_bytes(), 2);
        let lines = framer.push(b"\xBA\n");
        assert_eq!(lines, vec!["data: 场".to_string()]);
        assert_eq!(framer.pending_bytes(), 0);
    }

    #[test]
    fn test_invalid_bytes_become_replacement_character() {
        let mut framer = StreamFramer::new();
        let lines = framer.push(b"data: a\xFFb\n");
        assert_eq!(lines, vec!["data: a\u{FFFD}b".to_string()]);
    }

    #[test]
    fn test_finish_flushes_unterminated_event_line() {
        let mut framer = StreamFramer::new();
        assert!(framer.push(b"data: {\"type\":\"complete\"}").is_empty());
        assert_eq!(
            framer.finish(),
            Some("data: {\"type\":\"complete\"}".to_string())
        );
    }

    #[test]
    fn test_finish_drops_non_event_remainder() {
        let mut framer = StreamFramer::new();
        framer.push(b"data: x\n: trailing");
        assert_eq!(framer.finish(), None);
    }

    #[test]
    fn test_crlf_terminators_are_stripped() {
        let mut framer = StreamFramer::new();
        let lines = framer.push(b"data: one\r\ndata: two\r");
        assert_eq!(lines, vec!["data: one".to_string()]);
        let lines = framer.push(b"\n");
        assert_eq!(lines, vec!["data: two".to_string()]);
    }

    #[test]
    fn test_remainder_holds_incomplete_line() {
        let mut framer = StreamFramer::new();
        framer.push(b"data: partial");
        assert_eq!(framer.remainder(), "data: partial");
    }
}
