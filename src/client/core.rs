use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::pipeline::{create_decoder, StreamFormat};
use crate::session::{
    ConnectionState, FrameOutcome, FrameStats, SessionLog, SessionSnapshot, SessionState,
    StreamStatus,
};
use crate::transport::EventSource;
use crate::types::SessionId;
use crate::{BoxStream, Error, ErrorContext, Result};
use futures::StreamExt;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// State shared between the client handle and its reader task.
struct Shared {
    state: Mutex<SessionState>,
    status: watch::Sender<StreamStatus>,
    sink: Arc<dyn DiagnosticSink>,
}

impl Shared {
    fn new(sink: Arc<dyn DiagnosticSink>) -> Self {
        let state = SessionState::new();
        let (status, _) = watch::channel(state.status());
        Self {
            state: Mutex::new(state),
            status,
            sink,
        }
    }

    /// Run `f` under the state lock and publish the resulting status.
    fn with_state<R>(&self, f: impl FnOnce(&mut SessionState, &dyn DiagnosticSink) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let out = f(&mut state, self.sink.as_ref());
        let next = state.status();
        self.status.send_if_modified(|current| {
            if *current != next {
                *current = next;
                true
            } else {
                false
            }
        });
        out
    }

    fn transport_failed(&self, generation: u64, session_id: SessionId, err: &Error) {
        self.with_state(|state, sink| {
            if state.mark_closed(generation) {
                sink.report(Diagnostic::TransportFailed {
                    session_id,
                    message: err.to_string(),
                });
            }
        });
    }

    fn stream_ended(&self, generation: u64, session_id: SessionId) {
        self.with_state(|state, sink| {
            if state.mark_closed(generation) {
                sink.report(Diagnostic::StreamClosed { session_id });
            }
        });
    }
}

/// Handle on the reader task of one subscription.
///
/// Dropping it cancels the task, so every exit path (unsubscribe, re-subscribe,
/// dropping the client) releases the connection.
struct Subscription {
    session_id: SessionId,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.task.abort();
    }
}

/// Client for the agent reasoning event stream.
///
/// Holds at most one live subscription. All state lives in a [`SessionState`] behind a
/// mutex; the reader task applies frames with the generation it was started with, so
/// frames from a superseded or closed subscription are refused under the same lock
/// that `subscribe` and `unsubscribe` take.
pub struct StreamClient {
    source: Arc<dyn EventSource>,
    format: StreamFormat,
    shared: Arc<Shared>,
    active: Option<Subscription>,
}

impl StreamClient {
    pub(crate) fn from_parts(
        source: Arc<dyn EventSource>,
        format: StreamFormat,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self {
            source,
            format,
            shared: Arc::new(Shared::new(sink)),
            active: None,
        }
    }

    /// Create a client from configuration, using the HTTP transport.
    pub fn new(config: crate::config::ClientConfig) -> Result<Self> {
        crate::client::builder::StreamClientBuilder::new()
            .config(config)
            .build()
    }

    /// Select `session_id` and start streaming its events.
    ///
    /// Any previous subscription is closed first and the log, phase and status are reset.
    /// `None` leaves the client idle with an empty log and no network activity.
    /// Returns immediately; the connection is opened by a background task, so a tokio
    /// runtime must be running when a session is selected.
    pub fn subscribe(&mut self, session_id: Option<SessionId>) -> Result<()> {
        let runtime = match session_id {
            Some(_) => Some(tokio::runtime::Handle::try_current().map_err(|e| {
                Error::runtime_with_context(
                    "subscribe requires a tokio runtime",
                    ErrorContext::new()
                        .with_details(e.to_string())
                        .with_source("stream_client"),
                )
            })?),
            None => None,
        };

        // Release the old connection before the state is reset for the new one.
        self.active = None;
        let generation = self.shared.with_state(|state, _| state.select(session_id));

        let (Some(session_id), Some(runtime)) = (session_id, runtime) else {
            debug!("no active session");
            return Ok(());
        };

        let cancel = CancellationToken::new();
        let task = runtime.spawn(run_subscription(
            self.source.clone(),
            self.format,
            self.shared.clone(),
            session_id,
            generation,
            cancel.clone(),
        ));
        info!(%session_id, generation, "subscribed to reasoning session");

        self.active = Some(Subscription {
            session_id,
            cancel,
            task,
        });
        Ok(())
    }

    /// Close the active subscription, keeping the accumulated log.
    ///
    /// Once this returns no further frame is applied. Calling it again is a no-op.
    pub fn unsubscribe(&mut self) {
        let Some(sub) = self.active.take() else {
            return;
        };
        self.shared.with_state(|state, _| state.close());
        info!(session_id = %sub.session_id, "unsubscribed from reasoning session");
        drop(sub);
    }

    /// Deliver one text frame to the active session.
    ///
    /// The reader task calls the same path for every frame it decodes. Never fails;
    /// the outcome says whether the frame was logged, acknowledged or dropped.
    pub fn on_frame(&self, raw: &str) -> FrameOutcome {
        self.shared
            .with_state(|state, sink| state.apply_frame(raw, sink))
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.shared.with_state(|state, _| state.session_id())
    }

    pub fn connection(&self) -> ConnectionState {
        self.shared.with_state(|state, _| state.connection())
    }

    pub fn is_connected(&self) -> bool {
        self.connection().is_connected()
    }

    pub fn phase_label(&self) -> String {
        self.shared
            .with_state(|state, _| state.phase_label().to_string())
    }

    pub fn event_count(&self) -> usize {
        self.shared.with_state(|state, _| state.log().len())
    }

    pub fn stats(&self) -> FrameStats {
        self.shared.with_state(|state, _| state.stats())
    }

    /// Borrow the session log under the state lock.
    ///
    /// Keep `f` short: frames are not applied while it runs.
    pub fn with_log<R>(&self, f: impl FnOnce(&SessionLog) -> R) -> R {
        self.shared.with_state(|state, _| f(state.log()))
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.shared.with_state(|state, _| state.snapshot())
    }

    pub fn status(&self) -> StreamStatus {
        *self.shared.status.borrow()
    }

    /// Observe status changes (connection transitions and log growth).
    pub fn watch_status(&self) -> watch::Receiver<StreamStatus> {
        self.shared.status.subscribe()
    }
}

async fn run_subscription(
    source: Arc<dyn EventSource>,
    format: StreamFormat,
    shared: Arc<Shared>,
    session_id: SessionId,
    generation: u64,
    cancel: CancellationToken,
) {
    let opened = tokio::select! {
        biased;
        _ = cancel.cancelled() => return,
        r = source.open(session_id) => r,
    };
    let body = match opened {
        Ok(body) => body,
        Err(e) => return shared.transport_failed(generation, session_id, &e),
    };

    let mut frames: BoxStream<'static, String> = match decode(format, body).await {
        Ok(frames) => frames,
        Err(e) => return shared.transport_failed(generation, session_id, &e),
    };

    if !shared.with_state(|state, _| state.mark_open(generation)) {
        return;
    }
    debug!(%session_id, generation, "event stream open");

    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            next = frames.next() => next,
        };
        match next {
            Some(Ok(frame)) => {
                shared.with_state(|state, sink| state.apply_frame_for(generation, &frame, sink));
            }
            Some(Err(e)) => return shared.transport_failed(generation, session_id, &e),
            None => return shared.stream_ended(generation, session_id),
        }
    }
}

async fn decode(
    format: StreamFormat,
    body: BoxStream<'static, bytes::Bytes>,
) -> Result<BoxStream<'static, String>> {
    let decoder = create_decoder(format)?;
    decoder.decode_frames(body).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::noop_sink;
    use bytes::Bytes;
    use futures::stream;

    struct StaticSource(Vec<&'static str>);

    #[async_trait::async_trait]
    impl EventSource for StaticSource {
        async fn open(&self, _session_id: SessionId) -> Result<BoxStream<'static, Bytes>> {
            let chunks: Vec<crate::PipeResult<Bytes>> = self
                .0
                .iter()
                .map(|c| Ok(Bytes::from_static(c.as_bytes())))
                .collect();
            Ok(Box::pin(stream::iter(chunks)))
        }
    }

    fn source() -> Arc<dyn EventSource> {
        Arc::new(StaticSource(vec![
            "data: {\"type\":\"phase\",\"sessionId\":5,\"phase\":\"Planning\"}\n\n",
            "data: {\"type\":\"completed\",\"sessionId\":5,\"result\":null}\n\n",
        ]))
    }

    #[test]
    fn test_reader_runs_until_stream_ends() {
        let id = SessionId::new(5).unwrap();
        let shared = Arc::new(Shared::new(noop_sink()));
        let generation = shared.with_state(|state, _| state.select(Some(id)));

        tokio_test::block_on(run_subscription(
            source(),
            StreamFormat::Sse,
            shared.clone(),
            id,
            generation,
            CancellationToken::new(),
        ));

        let snapshot = shared.with_state(|state, _| state.snapshot());
        assert_eq!(snapshot.events.len(), 2);
        assert_eq!(snapshot.connection, ConnectionState::Closed);
        assert_eq!(snapshot.phase_label(), "Completed");
    }

    #[test]
    fn test_superseded_reader_writes_nothing() {
        let id = SessionId::new(5).unwrap();
        let shared = Arc::new(Shared::new(noop_sink()));
        let stale = shared.with_state(|state, _| state.select(Some(id)));
        shared.with_state(|state, _| state.select(Some(id)));

        tokio_test::block_on(run_subscription(
            source(),
            StreamFormat::Sse,
            shared.clone(),
            id,
            stale,
            CancellationToken::new(),
        ));

        let snapshot = shared.with_state(|state, _| state.snapshot());
        assert!(snapshot.events.is_empty());
        assert_eq!(snapshot.connection, ConnectionState::Connecting);
    }

    #[test]
    fn test_cancelled_reader_does_not_open() {
        let id = SessionId::new(5).unwrap();
        let shared = Arc::new(Shared::new(noop_sink()));
        let generation = shared.with_state(|state, _| state.select(Some(id)));
        let cancel = CancellationToken::new();
        cancel.cancel();

        tokio_test::block_on(run_subscription(
            source(),
            StreamFormat::Sse,
            shared.clone(),
            id,
            generation,
            cancel,
        ));

        assert_eq!(
            shared.with_state(|state, _| state.connection()),
            ConnectionState::Connecting
        );
    }
}
