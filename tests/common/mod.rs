//! Shared fixtures for integration tests

#![allow(dead_code)]

use bytes::Bytes;
use mockito::{Mock, Server, ServerGuard};
use std::sync::Arc;
use std::time::Duration;
use territory_intel::diagnostics::InMemoryDiagnosticSink;
use territory_intel::transport::{EventSource, TransportError};
use territory_intel::{
    BoxStream, ClientConfig, Error, PipeResult, SessionId, StreamClient, StreamClientBuilder,
    StreamStatus,
};
use tokio::sync::{mpsc, watch, Mutex};
use tokio_stream::wrappers::ReceiverStream;

pub const WAIT: Duration = Duration::from_secs(5);

/// One stream opened by the client, driven by the test.
pub struct Connection {
    pub session_id: SessionId,
    tx: mpsc::Sender<PipeResult<Bytes>>,
}

impl Connection {
    /// Send one JSON event as an SSE frame.
    pub async fn send_event(&self, json: &str) {
        self.send_raw(format!("data: {}\n\n", json)).await;
    }

    pub async fn send_raw(&self, chunk: impl Into<Bytes>) {
        self.tx
            .send(Ok(chunk.into()))
            .await
            .expect("client dropped the stream");
    }

    /// Break the stream with a transport error.
    pub async fn fail(&self, message: &str) {
        self.tx
            .send(Err(Error::Transport(TransportError::Other(message.to_string()))))
            .await
            .expect("client dropped the stream");
    }

    /// Resolves once the client has released the stream.
    pub async fn released(&self) {
        tokio::time::timeout(WAIT, self.tx.closed())
            .await
            .expect("stream was not released");
    }
}

/// Event source backed by in-process channels. Every `open` hands a [`Connection`]
/// to the test through the receiver returned by [`channel_source`].
pub struct ChannelSource {
    opened: mpsc::UnboundedSender<Connection>,
}

pub fn channel_source() -> (Arc<ChannelSource>, mpsc::UnboundedReceiver<Connection>) {
    let (opened, rx) = mpsc::unbounded_channel();
    (Arc::new(ChannelSource { opened }), rx)
}

#[async_trait::async_trait]
impl EventSource for ChannelSource {
    async fn open(&self, session_id: SessionId) -> territory_intel::Result<BoxStream<'static, Bytes>> {
        let (tx, rx) = mpsc::channel(64);
        self.opened
            .send(Connection { session_id, tx })
            .map_err(|_| Error::Transport(TransportError::Other("test harness gone".into())))?;
        Ok(Box::pin(ReceiverStream::new(rx)))
    }
}

/// Event source whose `open` always fails.
pub struct RefusingSource;

#[async_trait::async_trait]
impl EventSource for RefusingSource {
    async fn open(&self, _session_id: SessionId) -> territory_intel::Result<BoxStream<'static, Bytes>> {
        Err(Error::Remote {
            status: 503,
            message: "reasoning service unavailable".into(),
        })
    }
}

/// Client wired to a channel source and an in-memory diagnostic sink.
pub struct Harness {
    pub client: StreamClient,
    pub connections: mpsc::UnboundedReceiver<Connection>,
    pub diagnostics: Arc<InMemoryDiagnosticSink>,
}

impl Harness {
    pub fn new() -> Self {
        let (source, connections) = channel_source();
        let diagnostics = Arc::new(InMemoryDiagnosticSink::new(256));
        let client = StreamClientBuilder::new()
            .event_source(source)
            .diagnostic_sink(diagnostics.clone())
            .build()
            .expect("client builds");
        Self {
            client,
            connections,
            diagnostics,
        }
    }

    pub async fn next_connection(&mut self) -> Connection {
        tokio::time::timeout(WAIT, self.connections.recv())
            .await
            .expect("no connection opened")
            .expect("source dropped")
    }
}

pub fn sid(id: u64) -> SessionId {
    SessionId::new(id).unwrap()
}

/// Wait until the published status satisfies `pred`.
pub async fn wait_status(
    rx: &mut watch::Receiver<StreamStatus>,
    pred: impl FnMut(&StreamStatus) -> bool,
) -> StreamStatus {
    *tokio::time::timeout(WAIT, rx.wait_for(pred))
        .await
        .expect("timed out waiting for stream status")
        .expect("status channel closed")
}

pub fn phase(session: u64, name: &str) -> String {
    format!(
        r#"{{"type":"phase","sessionId":{},"phase":"{}","timestamp":"2024-05-01T10:00:00Z"}}"#,
        session, name
    )
}

pub fn thought(session: u64, agent: &str, content: &str) -> String {
    format!(
        r#"{{"type":"thought","sessionId":{},"agent":"{}","thoughtType":"observation","content":"{}"}}"#,
        session, agent, content
    )
}

pub fn action(session: u64, agent: &str, description: &str) -> String {
    format!(
        r#"{{"type":"action","sessionId":{},"agent":"{}","actionType":"query","description":"{}","metadata":{{"table":"rx_history"}}}}"#,
        session, agent, description
    )
}

pub fn completed(session: u64, summary: &str) -> String {
    format!(
        r#"{{"type":"completed","sessionId":{},"result":{{"summary":"{}"}}}}"#,
        session, summary
    )
}

pub fn connected(session: u64) -> String {
    format!(r#"{{"type":"connected","sessionId":{}}}"#, session)
}

/// Mock HTTP server for the transport and dashboard tests.
pub struct MockServerFixture {
    pub server: Arc<Mutex<ServerGuard>>,
    pub base_url: String,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let base_url = server.url();
        Self {
            server: Arc::new(Mutex::new(server)),
            base_url,
        }
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            ..ClientConfig::default()
        }
    }

    /// Mock a session stream that sends `events` as SSE frames and then ends.
    pub async fn mock_sse_stream(&self, session_id: u64, events: &[String]) -> Mock {
        let body: String = events
            .iter()
            .map(|event| format!("data: {}\n\n", event))
            .collect();
        let mut server = self.server.lock().await;
        server
            .mock(
                "GET",
                format!("/api/agent/sessions/{}/stream", session_id).as_str(),
            )
            .match_header("accept", "text/event-stream")
            .with_status(200)
            .with_header("content-type", "text/event-stream")
            .with_body(body)
            .create_async()
            .await
    }

    pub async fn mock_json(&self, method: &str, path: &str, status: usize, body: &str) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock(method, path)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }
}
