//! Event-line parsing.
//!
//! [`parse_event_line`] classifies one framed line. Decode failures are a
//! normal outcome ([`ParsedLine::Malformed`]) rather than an error: a single
//! bad line must never abort an otherwise healthy stream.

use super::framer::EVENT_PREFIX;
use serde::de::DeserializeOwned;

/// Classification of one complete protocol line.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedLine<E> {
    /// Not an event line (blank separator, comment, empty payload).
    NotAnEvent,
    /// Carried the event prefix but the payload could not be decoded.
    Malformed { payload: String, reason: String },
    /// A decoded event.
    Event(E),
}

impl<E> ParsedLine<E> {
    pub fn is_event(&self) -> bool {
        matches!(self, ParsedLine::Event(_))
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, ParsedLine::Malformed { .. })
    }

    /// Consume and return the event, if any.
    pub fn into_event(self) -> Option<E> {
        match self {
            ParsedLine::Event(event) => Some(event),
            _ => None,
        }
    }
}

/// Return the raw payload of an event line, or `None` for other lines.
pub fn event_payload(line: &str) -> Option<&str> {
    line.strip_prefix(EVENT_PREFIX).map(str::trim)
}

/// Parse one framed line into an event of type `E`.
///
/// `E` is one of the tagged event enums (dialogue or trial); unknown tags
/// decode to their `Unknown` variant, so only structurally broken payloads
/// end up as `Malformed`.
pub fn parse_event_line<E: DeserializeOwned>(line: &str) -> ParsedLine<E> {
    let Some(payload) = event_payload(line) else {
        return ParsedLine::NotAnEvent;
    };

    if payload.is_empty() {
        return ParsedLine::NotAnEvent;
    }

    match serde_json::from_str::<E>(payload) {
        Ok(event) => ParsedLine::Event(event),
        Err(e) => ParsedLine::Malformed {
            payload: payload.to_string(),
            reason: e.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::dialogue::DialogueEvent;
    use crate::event::trial::TrialEvent;

    #[test]
    fn test_non_prefixed_lines_are_not_events() {
        assert_eq!(
            parse_event_line::<DialogueEvent>(""),
            ParsedLine::NotAnEvent
        );
        assert_eq!(
            parse_event_line::<DialogueEvent>(": ping"),
            ParsedLine::NotAnEvent
        );
        assert_eq!(
            parse_event_line::<DialogueEvent>("event: chunk"),
            ParsedLine::NotAnEvent
        );
    }

    #[test]
    fn test_empty_payload_is_not_an_event() {
        assert_eq!(
            parse_event_line::<DialogueEvent>("data:   "),
            ParsedLine::NotAnEvent
        );
    }

    #[test]
    fn test_chunk_line_parses() {
        let parsed = parse_event_line::<DialogueEvent>(r#"data: {"type": "chunk", "content": "他"}"#);
        assert_eq!(
            parsed,
            ParsedLine::Event(DialogueEvent::Chunk {
                content: "他".to_string()
            })
        );
    }

    #[test]
    fn test_broken_json_is_malformed_not_panic() {
        let parsed = parse_event_line::<DialogueEvent>(r#"data: {"type": "chunk", "content": "#);
        assert!(parsed.is_malformed());
        if let ParsedLine::Malformed { payload, reason } = parsed {
            assert!(payload.starts_with('{'));
            assert!(!reason.is_empty());
        }
    }

    #[test]
    fn test_missing_required_field_is_malformed() {
        let parsed = parse_event_line::<TrialEvent>(r#"data: {"type": "witness_start"}"#);
        assert!(parsed.is_malformed());
    }

    #[test]
    fn test_unknown_type_decodes_to_unknown_variant() {
        let parsed = parse_event_line::<DialogueEvent>(r#"data: {"type": "heartbeat"}"#);
        assert_eq!(parsed.into_event(), Some(DialogueEvent::Unknown));
    }

    #[test]
    fn test_payload_whitespace_is_trimmed() {
        let parsed = parse_event_line::<DialogueEvent>("data:  {\"type\":\"response_complete\"}  ");
        assert_eq!(parsed.into_event(), Some(DialogueEvent::ResponseComplete));
    }
}
