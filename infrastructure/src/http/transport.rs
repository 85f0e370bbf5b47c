//! [`GameTransport`] over HTTP with streamed response bodies.

use async_trait::async_trait;
use casefile_application::ports::game_transport::{
    AccusationRequest, ByteStream, GameTransport, HintRequest, QuestionRequest, StartGameRequest,
    TransportError,
};
use casefile_domain::{GameStateSummary, Hint, StartedGame};
use futures::StreamExt;
use reqwest::header::ACCEPT;
use reqwest::{Client, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

const API_PREFIX: &str = "api/game";
const EVENT_STREAM: &str = "text/event-stream";

/// Talks to the game server's `/api/game` routes.
///
/// Only the connection phase has a timeout; an open stream is read for as
/// long as the server keeps it open.
#[derive(Clone)]
pub struct HttpGameTransport {
    client: Client,
    base_url: String,
}

impl HttpGameTransport {
    pub fn new(base_url: impl Into<String>) -> Result<Self, TransportError> {
        Self::with_connect_timeout(base_url, None)
    }

    pub fn with_connect_timeout(
        base_url: impl Into<String>,
        connect_timeout: Option<Duration>,
    ) -> Result<Self, TransportError> {
        let mut builder = Client::builder();
        if let Some(timeout) = connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| TransportError::Other(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL of a game route, e.g. `question/stream`.
    pub fn endpoint(&self, route: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            API_PREFIX,
            route.trim_start_matches('/')
        )
    }

    async fn open_stream(
        &self,
        route: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<ByteStream, TransportError> {
        let url = self.endpoint(route);
        debug!("Opening event stream: POST {}", url);

        let response = self
            .client
            .post(&url)
            .header(ACCEPT, EVENT_STREAM)
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError::ConnectionError(e.to_string()))?;
        let response = check_status(response).await?;

        let body = response.bytes_stream().map(|fragment| {
            fragment
                .map(|bytes| bytes.to_vec())
                .map_err(|e| TransportError::BodyError(e.to_string()))
        });
        Ok(body.boxed())
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        route: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<T, TransportError> {
        let url = self.endpoint(route);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError::ConnectionError(e.to_string()))?;
        read_json(check_status(response).await?).await
    }
}

#[async_trait]
impl GameTransport for HttpGameTransport {
    async fn open_dialogue_stream(
        &self,
        request: &QuestionRequest,
    ) -> Result<ByteStream, TransportError> {
        self.open_stream("question/stream", request).await
    }

    async fn open_trial_stream(
        &self,
        request: &AccusationRequest,
    ) -> Result<ByteStream, TransportError> {
        self.open_stream("accusation/stream", request).await
    }

    async fn fetch_game_state(&self, session_id: &str) -> Result<GameStateSummary, TransportError> {
        let url = self.endpoint(&format!("{}/state", session_id));
        debug!("Fetching game state: GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| TransportError::ConnectionError(e.to_string()))?;
        read_json(check_status(response).await?).await
    }

    async fn start_game(&self, request: &StartGameRequest) -> Result<StartedGame, TransportError> {
        self.post_json("start", request).await
    }

    async fn request_hint(&self, request: &HintRequest) -> Result<Hint, TransportError> {
        self.post_json("hint", request).await
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, TransportError> {
    response
        .json::<T>()
        .await
        .map_err(|e| TransportError::InvalidResponse(e.to_string()))
}

async fn check_status(response: Response) -> Result<Response, TransportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let detail = error_detail(&body);
    warn!("Game server returned {}: {}", status, detail);
    Err(TransportError::Status {
        status: status.as_u16(),
        detail,
    })
}

/// Human-readable reason from an error body.
///
/// The server reports failures as `{"detail": "..."}`; anything else is
/// returned trimmed.
pub fn error_detail(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body)
        && let Some(detail) = value.get("detail")
    {
        return match detail.as_str() {
            Some(s) => s.to_string(),
            None => detail.to_string(),
        };
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "(empty response body)".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_cleanly() {
        let transport = HttpGameTransport::new("http://localhost:8000/").unwrap();
        assert_eq!(
            transport.endpoint("question/stream"),
            "http://localhost:8000/api/game/question/stream"
        );
        assert_eq!(
            transport.endpoint("/abc/state"),
            "http://localhost:8000/api/game/abc/state"
        );
    }

    #[test]
    fn test_error_detail_from_json() {
        assert_eq!(error_detail(r#"{"detail":"游戏会话不存在"}"#), "游戏会话不存在");
        assert_eq!(
            error_detail(r#"{"detail":[{"msg":"field required"}]}"#),
            r#"[{"msg":"field required"}]"#
        );
    }

    #[test]
    fn test_error_detail_fallbacks() {
        assert_eq!(error_detail("  Internal Server Error \n"), "Internal Server Error");
        assert_eq!(error_detail(""), "(empty response body)");
        assert_eq!(error_detail(r#"{"message":"x"}"#), r#"{"message":"x"}"#);
    }
}
