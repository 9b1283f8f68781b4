//! 诊断模块：记录帧解码失败、会话过滤与传输中断等非致命事件。
//!
//! Diagnostics for the stream client.
//!
//! Nothing reported here is fatal: malformed frames are dropped, frames addressed to
//! another session are filtered and transport failures only flip the connection state.
//! Sinks are called synchronously while the session state is locked, so implementations
//! must be quick and must not call back into the client.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`Diagnostic`] | Typed diagnostic record |
//! | [`DiagnosticSink`] | Trait for diagnostic destinations |
//! | [`TracingDiagnosticSink`] | Default sink, forwards to `tracing` |
//! | [`InMemoryDiagnosticSink`] | Bounded in-memory sink for tests |
//! | [`CompositeDiagnosticSink`] | Multi-destination composite sink |

use crate::types::SessionId;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Maximum number of frame characters kept in a diagnostic.
const FRAME_EXCERPT_CHARS: usize = 160;

#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// A frame could not be decoded into a known event.
    MalformedFrame {
        session_id: Option<SessionId>,
        reason: String,
        excerpt: String,
    },
    /// A decoded event was addressed to a session other than the active one.
    ForeignSession {
        expected: SessionId,
        received: SessionId,
    },
    /// The transport failed to open or broke mid-stream.
    TransportFailed {
        session_id: SessionId,
        message: String,
    },
    /// The server ended the stream.
    StreamClosed { session_id: SessionId },
}

impl Diagnostic {
    pub(crate) fn malformed(
        session_id: Option<SessionId>,
        reason: impl Into<String>,
        frame: &str,
    ) -> Self {
        Diagnostic::MalformedFrame {
            session_id,
            reason: reason.into(),
            excerpt: frame.chars().take(FRAME_EXCERPT_CHARS).collect(),
        }
    }

    pub fn session_id(&self) -> Option<SessionId> {
        match self {
            Diagnostic::MalformedFrame { session_id, .. } => *session_id,
            Diagnostic::ForeignSession { expected, .. } => Some(*expected),
            Diagnostic::TransportFailed { session_id, .. }
            | Diagnostic::StreamClosed { session_id } => Some(*session_id),
        }
    }
}

pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

/// Discards everything.
pub struct NoopDiagnosticSink;

impl DiagnosticSink for NoopDiagnosticSink {
    fn report(&self, _: Diagnostic) {}
}

/// Returns a no-op diagnostic sink.
pub fn noop_sink() -> Arc<dyn DiagnosticSink> {
    Arc::new(NoopDiagnosticSink)
}

/// Forwards diagnostics to `tracing`.
pub struct TracingDiagnosticSink;

impl DiagnosticSink for TracingDiagnosticSink {
    fn report(&self, diagnostic: Diagnostic) {
        match diagnostic {
            Diagnostic::MalformedFrame {
                session_id,
                reason,
                excerpt,
            } => {
                tracing::warn!(session_id = ?session_id, %reason, frame = %excerpt, "dropping malformed frame");
            }
            Diagnostic::ForeignSession { expected, received } => {
                tracing::warn!(%expected, %received, "dropping event for another session");
            }
            Diagnostic::TransportFailed {
                session_id,
                message,
            } => {
                tracing::warn!(%session_id, error = %message, "event stream transport failed");
            }
            Diagnostic::StreamClosed { session_id } => {
                tracing::debug!(%session_id, "event stream closed by server");
            }
        }
    }
}

/// Returns the default, tracing-backed sink.
pub fn tracing_sink() -> Arc<dyn DiagnosticSink> {
    Arc::new(TracingDiagnosticSink)
}

/// In-memory sink for testing. Keeps the most recent `max` diagnostics.
pub struct InMemoryDiagnosticSink {
    records: Mutex<VecDeque<Diagnostic>>,
    max_records: usize,
}

impl InMemoryDiagnosticSink {
    pub fn new(max: usize) -> Self {
        Self {
            records: Mutex::new(VecDeque::new()),
            max_records: max.max(1),
        }
    }

    pub fn records(&self) -> Vec<Diagnostic> {
        self.records
            .lock()
            .map(|r| r.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut r) = self.records.lock() {
            r.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticSink for InMemoryDiagnosticSink {
    fn report(&self, diagnostic: Diagnostic) {
        if let Ok(mut records) = self.records.lock() {
            records.push_back(diagnostic);
            while records.len() > self.max_records {
                records.pop_front();
            }
        }
    }
}

/// Composite sink for multiple destinations.
pub struct CompositeDiagnosticSink {
    sinks: Vec<Arc<dyn DiagnosticSink>>,
}

impl CompositeDiagnosticSink {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn add_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl Default for CompositeDiagnosticSink {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticSink for CompositeDiagnosticSink {
    fn report(&self, diagnostic: Diagnostic) {
        for s in &self.sinks {
            s.report(diagnostic.clone());
        }
    }
}
