//! Long-lived WebSocket side channel for suggested questions.
//!
//! Each frame is one JSON text message. A background task owns the read
//! half and hands every reply to the request it answers. Replies that echo a
//! `character_name` go to the oldest request for that character; frames
//! without one (`error`) go to the oldest request overall. The server sends
//! nothing for a character it does not know, so such a request only ends
//! through the reply timeout or by closing the channel.
//!
//! The channel shares nothing with dialogue or trial streams.

use super::error::{Result, SuggestionError};
use casefile_domain::{SuggestionMessage, SuggestionRequest};
use futures::{Sink, SinkExt, Stream, StreamExt};
use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{Mutex, oneshot};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{WebSocketStream, connect_async};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

type FrameSink = Pin<Box<dyn Sink<Message, Error = tungstenite::Error> + Send>>;

/// WebSocket URL of a game's suggestion channel.
///
/// `http`/`https` base URLs map to `ws`/`wss`; `ws`/`wss` are kept.
pub fn ws_url(base_url: &str, session_id: &str) -> Result<String> {
    let base = base_url.trim_end_matches('/');
    let origin = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else if base.starts_with("ws://") || base.starts_with("wss://") {
        base.to_string()
    } else {
        return Err(SuggestionError::InvalidUrl(base_url.to_string()));
    };
    Ok(format!("{}/ws/{}", origin, session_id))
}

struct Waiter {
    character_name: String,
    reply: oneshot::Sender<SuggestionMessage>,
}

/// Requests waiting for a reply, oldest first.
#[derive(Default)]
struct Pending {
    replies: VecDeque<Waiter>,
    pongs: VecDeque<oneshot::Sender<()>>,
}

impl Pending {
    /// Remove the waiter a reply belongs to.
    ///
    /// Waiters whose caller gave up are dropped first so a stale request
    /// never absorbs a reply meant for a live one.
    fn take_reply(
        &mut self,
        character_name: Option<&str>,
    ) -> Option<oneshot::Sender<SuggestionMessage>> {
        self.replies.retain(|waiter| !waiter.reply.is_closed());
        let position = match character_name {
            Some(name) => self
                .replies
                .iter()
                .position(|waiter| waiter.character_name == name)?,
            None if self.replies.is_empty() => return None,
            None => 0,
        };
        self.replies.remove(position).map(|waiter| waiter.reply)
    }

    fn clear(&mut self) {
        self.replies.clear();
        self.pongs.clear();
    }
}

/// Client side of the suggestion channel.
pub struct SuggestionChannel {
    /// Background reader task handle.
    reader_handle: JoinHandle<()>,
    /// Serialized writes. Held while a waiter is queued so queue order
    /// matches wire order.
    writer: Mutex<FrameSink>,
    pending: Arc<StdMutex<Pending>>,
    closed: CancellationToken,
    reply_timeout: Option<Duration>,
}

impl SuggestionChannel {
    /// Connect to `{base_url}/ws/{session_id}`.
    pub async fn connect(
        base_url: &str,
        session_id: &str,
        connect_timeout: Option<Duration>,
    ) -> Result<Self> {
        let url = ws_url(base_url, session_id)?;
        info!("Connecting suggestion channel {}", url);

        let connecting = connect_async(url.as_str());
        let (stream, _response) = match connect_timeout {
            Some(limit) => tokio::time::timeout(limit, connecting)
                .await
                .map_err(|_| SuggestionError::Timeout(format!("connecting to {}", url)))??,
            None => connecting.await?,
        };
        Ok(Self::from_stream(stream))
    }

    /// Start the channel over an established WebSocket.
    pub fn from_stream<S>(stream: WebSocketStream<S>) -> Self
    where
        S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
    {
        let (sink, frames) = stream.split();
        let pending = Arc::new(StdMutex::new(Pending::default()));
        let closed = CancellationToken::new();

        let pending_bg = Arc::clone(&pending);
        let closed_bg = closed.clone();
        let reader_handle = tokio::spawn(async move {
            Self::reader_loop(frames, pending_bg, closed_bg.clone()).await;
            closed_bg.cancel();
        });

        let writer: FrameSink = Box::pin(sink);
        Self {
            reader_handle,
            writer: Mutex::new(writer),
            pending,
            closed,
            reply_timeout: None,
        }
    }

    /// Give up on a request after `timeout` without a reply.
    pub fn with_reply_timeout(mut self, timeout: Duration) -> Self {
        self.reply_timeout = Some(timeout);
        self
    }

    /// Ask for suggested questions for `character_name`.
    pub async fn suggest(&self, character_name: &str) -> Result<Vec<String>> {
        let (tx, rx) = oneshot::channel();
        let request = SuggestionRequest::GetSuggestedQuestions {
            character_name: character_name.to_string(),
        };
        {
            let mut writer = self.writer.lock().await;
            lock(&self.pending).replies.push_back(Waiter {
                character_name: character_name.to_string(),
                reply: tx,
            });
            if let Err(e) = Self::write_frame(&mut writer, &request).await {
                lock(&self.pending).replies.pop_back();
                return Err(e);
            }
        }
        debug!("Requested suggestions for {}", character_name);

        let reply = match self.reply_timeout {
            Some(limit) => tokio::time::timeout(limit, rx).await.map_err(|_| {
                SuggestionError::Timeout(format!("no suggestions for {}", character_name))
            })?,
            None => rx.await,
        };
        match reply.map_err(|_| SuggestionError::Closed)? {
            SuggestionMessage::SuggestedQuestions { questions, .. } => Ok(questions),
            SuggestionMessage::Error { message } => Err(SuggestionError::Server(message)),
            other => Err(SuggestionError::UnexpectedReply(format!("{:?}", other))),
        }
    }

    /// Send a keepalive and wait for the matching `pong`.
    pub async fn ping(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        {
            let mut writer = self.writer.lock().await;
            lock(&self.pending).pongs.push_back(tx);
            if let Err(e) = Self::write_frame(&mut writer, &SuggestionRequest::Ping).await {
                lock(&self.pending).pongs.pop_back();
                return Err(e);
            }
        }
        rx.await.map_err(|_| SuggestionError::Closed)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    /// Send a close frame and stop the reader. Waiting requests fail with
    /// [`SuggestionError::Closed`].
    pub async fn close(&self) -> Result<()> {
        debug!("Closing suggestion channel");
        let result = self.writer.lock().await.close().await;
        self.closed.cancel();
        self.reader_handle.abort();
        lock(&self.pending).clear();
        match result {
            Ok(()) | Err(tungstenite::Error::ConnectionClosed) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_frame(writer: &mut FrameSink, request: &SuggestionRequest) -> Result<()> {
        let frame = serde_json::to_string(request)?;
        trace!("Suggestion channel send: {}", frame);
        writer.send(Message::Text(frame)).await?;
        Ok(())
    }

    async fn reader_loop<St>(
        mut frames: St,
        pending: Arc<StdMutex<Pending>>,
        closed: CancellationToken,
    ) where
        St: Stream<Item = std::result::Result<Message, tungstenite::Error>> + Unpin,
    {
        loop {
            let next = tokio::select! {
                biased;
                _ = closed.cancelled() => break,
                next = frames.next() => next,
            };
            let text = match next {
                Some(Ok(Message::Text(text))) => text,
                Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes) {
                    Ok(text) => text,
                    Err(_) => {
                        warn!("Suggestion channel: ignoring non-UTF-8 binary frame");
                        continue;
                    }
                },
                Some(Ok(Message::Close(_))) | None => {
                    debug!("Suggestion channel closed by server");
                    break;
                }
                // Control frames are answered by the WebSocket layer.
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    warn!("Suggestion channel read error: {}", e);
                    break;
                }
            };

            let frame = text.trim();
            if frame.is_empty() {
                continue;
            }
            trace!("Suggestion channel received: {}", frame);

            let message: SuggestionMessage = match serde_json::from_str(frame) {
                Ok(m) => m,
                Err(e) => {
                    warn!("Suggestion channel: failed to parse frame: {} ({})", e, frame);
                    continue;
                }
            };

            match message {
                SuggestionMessage::Pong => {
                    if let Some(tx) = lock(&pending).pongs.pop_front() {
                        let _ = tx.send(());
                    } else {
                        debug!("Suggestion channel: unsolicited pong");
                    }
                }
                SuggestionMessage::Unknown => {
                    debug!("Suggestion channel: ignoring unknown frame");
                }
                reply => {
                    let character_name = match &reply {
                        SuggestionMessage::SuggestedQuestions { character_name, .. } => {
                            character_name.clone()
                        }
                        _ => None,
                    };
                    let waiter = lock(&pending).take_reply(character_name.as_deref());
                    match waiter {
                        Some(tx) => {
                            let _ = tx.send(reply);
                        }
                        None => debug!(
                            "Suggestion channel: no request waiting for reply ({:?})",
                            character_name
                        ),
                    }
                }
            }
        }

        // Dropping the senders wakes every waiter with `Closed`.
        lock(&pending).clear();
    }
}

impl Drop for SuggestionChannel {
    fn drop(&mut self) {
        self.closed.cancel();
        self.reader_handle.abort();
    }
}

fn lock<T>(mutex: &StdMutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use casefile_application::{
        AccusationRequest, AskQuestionInput, AskQuestionUseCase, ByteStream, GameSession,
        GameTransport, HintRequest, NoObserver, QuestionRequest, StartGameRequest, StreamError,
        TransportError,
    };
    use casefile_domain::{GameStateSummary, Hint, StartedGame};
    use tokio::io::{DuplexStream, duplex};
    use tokio_tungstenite::tungstenite::protocol::Role;

    type Reply<T> = std::result::Result<T, TransportError>;

    /// Server end of an in-memory WebSocket.
    struct FakeServer {
        ws: WebSocketStream<DuplexStream>,
    }

    impl FakeServer {
        async fn next_request(&mut self) -> serde_json::Value {
            loop {
                match self.ws.next().await.unwrap().unwrap() {
                    Message::Text(text) => return serde_json::from_str(&text).unwrap(),
                    _ => continue,
                }
            }
        }

        async fn send(&mut self, frame: &str) {
            self.ws.send(Message::Text(frame.to_string())).await.unwrap();
        }
    }

    async fn pair() -> (SuggestionChannel, FakeServer) {
        let (client, server) = duplex(4096);
        let client = WebSocketStream::from_raw_socket(client, Role::Client, None).await;
        let server = WebSocketStream::from_raw_socket(server, Role::Server, None).await;
        (SuggestionChannel::from_stream(client), FakeServer { ws: server })
    }

    fn spawn_suggest(
        channel: &Arc<SuggestionChannel>,
        character_name: &'static str,
    ) -> JoinHandle<Result<Vec<String>>> {
        let channel = Arc::clone(channel);
        tokio::spawn(async move { channel.suggest(character_name).await })
    }

    #[test]
    fn test_ws_url() {
        assert_eq!(
            ws_url("http://localhost:8000/", "abc").unwrap(),
            "ws://localhost:8000/ws/abc"
        );
        assert_eq!(
            ws_url("https://game.example.com", "abc").unwrap(),
            "wss://game.example.com/ws/abc"
        );
        assert_eq!(
            ws_url("ws://127.0.0.1:9000", "abc").unwrap(),
            "ws://127.0.0.1:9000/ws/abc"
        );
        assert!(matches!(
            ws_url("localhost:8000", "abc"),
            Err(SuggestionError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_suggest_round_trip() {
        let (channel, mut server) = pair().await;

        let request = tokio::spawn(async move {
            let result = channel.suggest("王医生").await;
            (channel, result)
        });

        let frame = server.next_request().await;
        assert_eq!(frame["type"], "get_suggested_questions");
        assert_eq!(frame["character_name"], "王医生");
        server
            .send(r#"{"type":"suggested_questions","character_name":"王医生","questions":["你在哪？","几点？"]}"#)
            .await;

        let (_channel, result) = request.await.unwrap();
        assert_eq!(result.unwrap(), vec!["你在哪？".to_string(), "几点？".to_string()]);
    }

    #[tokio::test]
    async fn test_unanswered_character_does_not_take_next_reply() {
        let (channel, mut server) = pair().await;
        let channel = Arc::new(channel);

        // The server stays silent for characters it does not know.
        let unknown = spawn_suggest(&channel, "无名氏");
        assert_eq!(server.next_request().await["character_name"], "无名氏");
        let known = spawn_suggest(&channel, "王医生");
        assert_eq!(server.next_request().await["character_name"], "王医生");

        server
            .send(r#"{"type":"suggested_questions","character_name":"王医生","questions":["你在哪？"]}"#)
            .await;

        assert_eq!(known.await.unwrap().unwrap(), vec!["你在哪？".to_string()]);
        assert!(!unknown.is_finished());

        channel.close().await.unwrap();
        assert!(matches!(unknown.await.unwrap(), Err(SuggestionError::Closed)));
    }

    #[tokio::test]
    async fn test_replies_routed_by_name_out_of_order() {
        let (channel, mut server) = pair().await;
        let channel = Arc::new(channel);

        let first = spawn_suggest(&channel, "甲");
        assert_eq!(server.next_request().await["character_name"], "甲");
        let second = spawn_suggest(&channel, "乙");
        assert_eq!(server.next_request().await["character_name"], "乙");

        server
            .send(r#"{"type":"suggested_questions","character_name":"乙","questions":["给乙"]}"#)
            .await;
        server
            .send(r#"{"type":"suggested_questions","character_name":"甲","questions":["给甲"]}"#)
            .await;

        assert_eq!(first.await.unwrap().unwrap(), vec!["给甲".to_string()]);
        assert_eq!(second.await.unwrap().unwrap(), vec!["给乙".to_string()]);
    }

    #[tokio::test]
    async fn test_nameless_replies_fall_back_to_request_order() {
        let (channel, mut server) = pair().await;
        let channel = Arc::new(channel);

        let first = spawn_suggest(&channel, "甲");
        assert_eq!(server.next_request().await["character_name"], "甲");
        let second = spawn_suggest(&channel, "乙");
        assert_eq!(server.next_request().await["character_name"], "乙");

        server.send(r#"{"type":"error","message":"生成失败"}"#).await;
        server
            .send(r#"{"type":"suggested_questions","questions":["给乙"]}"#)
            .await;

        match first.await.unwrap() {
            Err(SuggestionError::Server(message)) => assert_eq!(message, "生成失败"),
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(second.await.unwrap().unwrap(), vec!["给乙".to_string()]);
    }

    #[tokio::test]
    async fn test_timed_out_request_releases_its_place() {
        let (channel, mut server) = pair().await;
        let channel = Arc::new(channel.with_reply_timeout(Duration::from_millis(50)));

        let stale = spawn_suggest(&channel, "无名氏");
        server.next_request().await;
        assert!(matches!(
            stale.await.unwrap(),
            Err(SuggestionError::Timeout(_))
        ));

        let live = spawn_suggest(&channel, "王医生");
        server.next_request().await;
        server.send(r#"{"type":"error","message":"生成失败"}"#).await;

        match live.await.unwrap() {
            Err(SuggestionError::Server(message)) => assert_eq!(message, "生成失败"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_and_unknown_frames_are_skipped() {
        let (channel, mut server) = pair().await;
        let request = tokio::spawn(async move { channel.suggest("王医生").await });

        server.next_request().await;
        server.send("{broken").await;
        server.send(r#"{"type":"game_update"}"#).await;
        server
            .ws
            .send(Message::Binary(
                r#"{"type":"suggested_questions","character_name":"王医生","questions":["问题"]}"#
                    .as_bytes()
                    .to_vec(),
            ))
            .await
            .unwrap();

        assert_eq!(request.await.unwrap().unwrap(), vec!["问题".to_string()]);
    }

    #[tokio::test]
    async fn test_ping_pong() {
        let (channel, mut server) = pair().await;
        let ping = tokio::spawn(async move { channel.ping().await });

        assert_eq!(server.next_request().await["type"], "ping");
        server.send(r#"{"type":"pong"}"#).await;

        assert!(ping.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_server_disconnect_fails_waiters() {
        let (channel, mut server) = pair().await;
        let request = tokio::spawn(async move {
            let result = channel.suggest("王医生").await;
            (channel.is_closed(), result)
        });

        server.next_request().await;
        drop(server);

        let (closed, result) = request.await.unwrap();
        assert!(matches!(result, Err(SuggestionError::Closed)));
        assert!(closed);
    }

    #[tokio::test]
    async fn test_close() {
        let (channel, _server) = pair().await;
        channel.close().await.unwrap();
        assert!(channel.is_closed());
    }

    /// Transport whose dialogue answers start and then never finish.
    struct StalledDialogue;

    #[async_trait]
    impl GameTransport for StalledDialogue {
        async fn open_dialogue_stream(&self, _request: &QuestionRequest) -> Reply<ByteStream> {
            let head = futures::stream::iter(vec![Ok(b"data: {\"type\":\"start\"}\n\n".to_vec())]);
            Ok(head.chain(futures::stream::pending()).boxed())
        }

        async fn open_trial_stream(&self, _request: &AccusationRequest) -> Reply<ByteStream> {
            Err(TransportError::Other("no trials".into()))
        }

        async fn fetch_game_state(&self, session_id: &str) -> Reply<GameStateSummary> {
            Ok(GameStateSummary::fresh(session_id, 30))
        }

        async fn start_game(&self, _request: &StartGameRequest) -> Reply<StartedGame> {
            Err(TransportError::Other("no games".into()))
        }

        async fn request_hint(&self, _request: &HintRequest) -> Reply<Hint> {
            Err(TransportError::Other("no hints".into()))
        }
    }

    #[tokio::test]
    async fn test_suggestions_arrive_while_dialogue_is_stalled() {
        let game = Arc::new(GameSession::new("g1", 30));
        let ask = {
            let game = Arc::clone(&game);
            tokio::spawn(async move {
                AskQuestionUseCase::new(Arc::new(StalledDialogue))
                    .execute(&game, AskQuestionInput::new("王医生", "你在哪？"), &NoObserver)
                    .await
            })
        };
        while !game.is_in_flight("王医生") {
            tokio::task::yield_now().await;
        }

        let (channel, mut server) = pair().await;
        let request = tokio::spawn(async move { channel.suggest("王医生").await });
        assert_eq!(server.next_request().await["character_name"], "王医生");
        server
            .send(r#"{"type":"suggested_questions","character_name":"王医生","questions":["那晚你见过谁？"]}"#)
            .await;

        assert_eq!(
            request.await.unwrap().unwrap(),
            vec!["那晚你见过谁？".to_string()]
        );
        assert!(!ask.is_finished());
        assert!(game.is_in_flight("王医生"));

        game.teardown();
        assert_eq!(ask.await.unwrap().unwrap_err(), StreamError::Cancelled);
    }

    #[tokio::test]
    async fn test_connect_over_tcp() {
        use tokio::net::TcpListener;
        use tokio_tungstenite::tungstenite::handshake::server::{
            ErrorResponse, Request, Response,
        };

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let mut path = String::new();
            let record_path = |request: &Request, response: Response| {
                path = request.uri().path().to_string();
                Ok::<Response, ErrorResponse>(response)
            };
            let mut ws = tokio_tungstenite::accept_hdr_async(socket, record_path)
                .await
                .unwrap();
            let request = loop {
                if let Message::Text(text) = ws.next().await.unwrap().unwrap() {
                    break text;
                }
            };
            assert_eq!(request, r#"{"type":"ping"}"#);
            ws.send(Message::Text(r#"{"type":"pong"}"#.to_string()))
                .await
                .unwrap();
            path
        });

        let channel = SuggestionChannel::connect(
            &format!("http://{}", address),
            "g1",
            Some(Duration::from_secs(5)),
        )
        .await
        .unwrap();
        channel.ping().await.unwrap();

        assert_eq!(server.await.unwrap(), "/ws/g1");
    }
}
