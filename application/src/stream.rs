//! Async adapters from raw response bodies to typed events.
//!
//! [`lines`] drives a [`StreamFramer`] over a [`ByteStream`]; [`events`]
//! parses those lines. Both are lazy, finite and single-pass: nothing is
//! read until polled, and the stream ends after the body ends or fails.

use crate::ports::game_transport::{ByteStream, TransportError};
use casefile_domain::{ParsedLine, StreamFramer, parse_event_line};
use futures::StreamExt;
use futures::stream::{self, BoxStream};
use serde::de::DeserializeOwned;
use std::collections::VecDeque;

/// One item of a parsed event stream.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamItem<E> {
    Event(E),
    /// An event line whose payload failed to decode. The stream continues.
    Malformed { payload: String, reason: String },
}

struct LineState {
    body: ByteStream,
    framer: StreamFramer,
    ready: VecDeque<String>,
    finished: bool,
}

/// Split a response body into protocol lines.
///
/// A transport error is yielded once and ends the stream. At end of body
/// the framer's remainder is flushed if it is an event line.
pub fn lines(body: ByteStream) -> BoxStream<'static, Result<String, TransportError>> {
    let state = LineState {
        body,
        framer: StreamFramer::new(),
        ready: VecDeque::new(),
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(line) = state.ready.pop_front() {
                return Some((Ok(line), state));
            }
            if state.finished {
                return None;
            }
            match state.body.next().await {
                Some(Ok(fragment)) => {
                    let lines = state.framer.push(&fragment);
                    state.ready.extend(lines);
                }
                Some(Err(e)) => {
                    state.finished = true;
                    return Some((Err(e), state));
                }
                None => {
                    state.finished = true;
                    if let Some(rest) = state.framer.finish() {
                        state.ready.push_back(rest);
                    }
                }
            }
        }
    })
    .boxed()
}

/// Parse a response body into events of type `E`, skipping non-event lines.
pub fn events<E>(body: ByteStream) -> BoxStream<'static, Result<StreamItem<E>, TransportError>>
where
    E: DeserializeOwned + Send + 'static,
{
    lines(body)
        .filter_map(|line| async move {
            match line {
                Ok(line) => match parse_event_line::<E>(&line) {
                    ParsedLine::NotAnEvent => None,
                    ParsedLine::Malformed { payload, reason } => {
                        Some(Ok(StreamItem::Malformed { payload, reason }))
                    }
                    ParsedLine::Event(event) => Some(Ok(StreamItem::Event(event))),
                },
                Err(e) => Some(Err(e)),
            }
        })
        .boxed()
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// A body that yields `fragments` in order.
    pub fn body_from(fragments: Vec<Vec<u8>>) -> ByteStream {
        Box::pin(stream::iter(fragments.into_iter().map(Ok)))
    }

    /// A body that yields `text` split into `size`-byte fragments.
    pub fn chunked_body(text: &str, size: usize) -> ByteStream {
        body_from(text.as_bytes().chunks(size).map(<[u8]>::to_vec).collect())
    }

    /// A body that yields `text` and then fails.
    pub fn failing_body(text: &str, error: TransportError) -> ByteStream {
        let items = vec![Ok(text.as_bytes().to_vec()), Err(error)];
        Box::pin(stream::iter(items))
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use casefile_domain::DialogueEvent;

    const BODY: &str = "data: {\"type\":\"start\"}\n\n\
        data: {\"type\":\"chunk\",\"content\":\"他不在场\"}\n\n\
        data: {\"type\":\"complete\",\"round_number\":1,\"rounds_exhausted\":false}";

    #[tokio::test]
    async fn test_lines_independent_of_fragment_size() {
        let expected: Vec<String> = lines(chunked_body(BODY, BODY.len()))
            .map(|l| l.unwrap())
            .collect()
            .await;
        for size in [1, 2, 3, 7, 16] {
            let got: Vec<String> = lines(chunked_body(BODY, size))
                .map(|l| l.unwrap())
                .collect()
                .await;
            assert_eq!(got, expected, "fragment size {}", size);
        }
        assert!(expected.last().unwrap().contains("complete"));
    }

    #[tokio::test]
    async fn test_events_skip_blank_lines() {
        let items: Vec<_> = events::<DialogueEvent>(chunked_body(BODY, 5))
            .map(|item| item.unwrap())
            .collect()
            .await;
        assert_eq!(items.len(), 3);
        assert_eq!(
            items[1],
            StreamItem::Event(DialogueEvent::Chunk {
                content: "他不在场".into()
            })
        );
    }

    #[tokio::test]
    async fn test_malformed_line_does_not_end_stream() {
        let body = "data: {not json}\ndata: {\"type\":\"response_complete\"}\n";
        let items: Vec<_> = events::<DialogueEvent>(chunked_body(body, 4))
            .map(|item| item.unwrap())
            .collect()
            .await;
        assert!(matches!(items[0], StreamItem::Malformed { .. }));
        assert_eq!(items[1], StreamItem::Event(DialogueEvent::ResponseComplete));
    }

    #[tokio::test]
    async fn test_transport_error_ends_stream() {
        let body = failing_body(
            "data: {\"type\":\"start\"}\n",
            TransportError::BodyError("reset".into()),
        );
        let items: Vec<_> = lines(body).collect().await;
        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert_eq!(items[1], Err(TransportError::BodyError("reset".into())));
    }
}
