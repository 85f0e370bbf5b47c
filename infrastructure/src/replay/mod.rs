//! Replays recorded event streams from disk.
//!
//! A recording is the raw response body of one stream, saved verbatim. It is
//! fed back in fixed-size byte fragments, which exercises the framer's
//! handling of lines and code points split across reads.

use async_trait::async_trait;
use casefile_application::ports::game_transport::{
    AccusationRequest, ByteStream, GameTransport, HintRequest, QuestionRequest, StartGameRequest,
    TransportError,
};
use casefile_domain::{DEFAULT_MAX_ROUNDS, GameStateSummary, Hint, StartedGame};
use futures::StreamExt;
use futures::stream;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default fragment size when none is given.
pub const DEFAULT_FRAGMENT_SIZE: usize = 64;

/// [`GameTransport`] that serves one recording for every stream request.
pub struct ReplayTransport {
    path: PathBuf,
    fragment_size: usize,
    max_rounds: u32,
}

impl ReplayTransport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            fragment_size: DEFAULT_FRAGMENT_SIZE,
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }

    /// Bytes per fragment. Zero is treated as one.
    pub fn with_fragment_size(mut self, size: usize) -> Self {
        self.fragment_size = size.max(1);
        self
    }

    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn open(&self) -> Result<ByteStream, TransportError> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            TransportError::ConnectionError(format!("{}: {}", self.path.display(), e))
        })?;
        debug!(
            "Replaying {} ({} bytes in {}-byte fragments)",
            self.path.display(),
            bytes.len(),
            self.fragment_size
        );
        Ok(fragments(bytes, self.fragment_size))
    }
}

/// Split `bytes` into a body of `size`-byte fragments.
pub fn fragments(bytes: Vec<u8>, size: usize) -> ByteStream {
    let chunks: Vec<Result<Vec<u8>, TransportError>> = bytes
        .chunks(size.max(1))
        .map(|chunk| Ok(chunk.to_vec()))
        .collect();
    stream::iter(chunks).boxed()
}

#[async_trait]
impl GameTransport for ReplayTransport {
    async fn open_dialogue_stream(
        &self,
        _request: &QuestionRequest,
    ) -> Result<ByteStream, TransportError> {
        self.open().await
    }

    async fn open_trial_stream(
        &self,
        _request: &AccusationRequest,
    ) -> Result<ByteStream, TransportError> {
        self.open().await
    }

    async fn fetch_game_state(&self, session_id: &str) -> Result<GameStateSummary, TransportError> {
        Ok(GameStateSummary::fresh(session_id, self.max_rounds))
    }

    async fn start_game(&self, _request: &StartGameRequest) -> Result<StartedGame, TransportError> {
        Err(not_recorded("start"))
    }

    async fn request_hint(&self, _request: &HintRequest) -> Result<Hint, TransportError> {
        Err(not_recorded("hint"))
    }
}

/// Only streams are recorded; the plain JSON routes have nothing to replay.
fn not_recorded(route: &str) -> TransportError {
    TransportError::Other(format!("{} is not available when replaying a recording", route))
}

#[cfg(test)]
mod tests {
    use super::*;
    use casefile_application::{
        AskQuestionInput, AskQuestionUseCase, GameSession, NoObserver, SubmitAccusationInput,
        SubmitAccusationUseCase,
    };
    use std::io::Write;
    use std::sync::Arc;

    fn recording(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for line in lines {
            write!(file, "data: {}\n\n", line).unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[tokio::test]
    async fn test_fragments_cover_input() {
        let body: Vec<Vec<u8>> = fragments(b"abcdefg".to_vec(), 3)
            .map(|f| f.unwrap())
            .collect()
            .await;
        assert_eq!(body, vec![b"abc".to_vec(), b"def".to_vec(), b"g".to_vec()]);
    }

    #[tokio::test]
    async fn test_replayed_dialogue() {
        let file = recording(&[
            r#"{"type":"start"}"#,
            r#"{"type":"chunk","content":"他"}"#,
            r#"{"type":"chunk","content":"不在场"}"#,
            r#"{"type":"complete","round_number":2,"rounds_exhausted":false}"#,
        ]);
        for size in [1, 2, 5] {
            let transport = ReplayTransport::new(file.path()).with_fragment_size(size);
            let use_case = AskQuestionUseCase::new(Arc::new(transport));
            let game = GameSession::new("replay", 30);
            let output = use_case
                .execute(&game, AskQuestionInput::new("王医生", "问"), &NoObserver)
                .await
                .unwrap();
            assert_eq!(output.dialogue.answer.render(), "他不在场");
        }
    }

    #[tokio::test]
    async fn test_replayed_trial() {
        let file = recording(&[
            r#"{"type":"witness_start","witness_name":"王医生","index":0}"#,
            r#"{"type":"testimony_chunk","witness_name":"王医生","content":"他"}"#,
            r#"{"type":"witness_complete","witness_name":"王医生","testimony":"他当晚在场"}"#,
            r#"{"type":"complete"}"#,
        ]);
        let transport = ReplayTransport::new(file.path()).with_fragment_size(3);
        let use_case = SubmitAccusationUseCase::new(Arc::new(transport));
        let game = GameSession::new("replay", 30);
        let snapshot = use_case
            .execute(&game, SubmitAccusationInput::new("张三", "理由"), &NoObserver)
            .await
            .unwrap();
        assert_eq!(snapshot.state.testimonies[0].text.render(), "他当晚在场");
    }

    #[tokio::test]
    async fn test_plain_routes_are_not_replayed() {
        let transport = ReplayTransport::new("/nonexistent/recording.sse");
        let request = HintRequest {
            session_id: "replay".into(),
        };
        let result = transport.request_hint(&request).await;
        assert!(matches!(result, Err(TransportError::Other(_))));
        let state = transport.fetch_game_state("replay").await.unwrap();
        assert_eq!(state.current_round, 0);
    }

    #[tokio::test]
    async fn test_missing_recording() {
        let transport = ReplayTransport::new("/nonexistent/recording.sse");
        let result = transport.open().await;
        assert!(matches!(result, Err(TransportError::ConnectionError(_))));
    }
}
