//! Incrementally streamed text.

use serde::Serialize;

/// Marker appended to text that is still streaming.
pub const STREAMING_CURSOR: char = '|';

/// Lifecycle of a [`TextSlot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotState {
    Streaming,
    Finalized,
}

/// A block of text built from chunks in arrival order.
///
/// The slot is created by its first chunk, grows by appending, and is
/// closed by [`finalize`](Self::finalize) or
/// [`finalize_with`](Self::finalize_with). Finalizing is idempotent: once
/// closed, neither further chunks nor a second finalize change the content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextSlot {
    text: String,
    state: SlotState,
}

impl Default for TextSlot {
    fn default() -> Self {
        Self::streaming()
    }
}

impl TextSlot {
    /// An empty slot that is still streaming.
    pub fn streaming() -> Self {
        Self {
            text: String::new(),
            state: SlotState::Streaming,
        }
    }

    /// A slot created from its first chunk.
    pub fn from_chunk(chunk: &str) -> Self {
        Self {
            text: chunk.to_string(),
            state: SlotState::Streaming,
        }
    }

    /// A slot that arrives already complete.
    pub fn finalized(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            state: SlotState::Finalized,
        }
    }

    /// Append a chunk. Returns `false` (and drops the chunk) once finalized.
    pub fn append(&mut self, chunk: &str) -> bool {
        if self.is_finalized() {
            return false;
        }
        self.text.push_str(chunk);
        true
    }

    /// Close the slot, keeping the accumulated text.
    ///
    /// Returns `true` only on the transition.
    pub fn finalize(&mut self) -> bool {
        if self.is_finalized() {
            return false;
        }
        self.state = SlotState::Finalized;
        true
    }

    /// Close the slot, replacing the text with the server's complete copy.
    ///
    /// A slot that is already final keeps its content.
    pub fn finalize_with(&mut self, authoritative: &str) -> bool {
        if self.is_finalized() {
            return false;
        }
        self.text.clear();
        self.text.push_str(authoritative);
        self.state = SlotState::Finalized;
        true
    }

    pub fn is_finalized(&self) -> bool {
        self.state == SlotState::Finalized
    }

    pub fn state(&self) -> SlotState {
        self.state
    }

    /// Raw accumulated text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Display form: escaped `\n` sequences become newlines, and a streaming
    /// slot carries the cursor marker.
    pub fn render(&self) -> String {
        let mut out = self.text.replace("\\n", "\n");
        if !self.is_finalized() {
            out.push(STREAMING_CURSOR);
        }
        out
    }
}
