use super::log::SessionLog;
use super::phase::{Phase, PhaseTracker};
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::types::{AgentEvent, EventKind, SessionId};
use serde::Serialize;
use serde_json::Value;

/// Connection lifecycle of the active subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// No session selected.
    Idle,
    /// Session selected, transport not yet confirmed.
    Connecting,
    Open,
    /// Unsubscribed, or the transport failed or ended. The log is kept.
    Closed,
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Open)
    }

    /// Whether frames for the selected session are still accepted.
    pub fn is_live(&self) -> bool {
        matches!(self, ConnectionState::Connecting | ConnectionState::Open)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Idle => "idle",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "open",
            ConnectionState::Closed => "closed",
        }
    }
}

/// What happened to one delivered frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Appended(EventKind),
    /// A `connected` acknowledgment; updates the connected flag only.
    Acknowledged,
    Ignored(IgnoreReason),
}

impl FrameOutcome {
    pub fn is_appended(&self) -> bool {
        matches!(self, FrameOutcome::Appended(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Not JSON, no `type` discriminator, or a known type with invalid fields.
    Malformed,
    /// A `type` this client does not know.
    UnknownType,
    /// Addressed to another session.
    ForeignSession,
    /// No live subscription, or the frame belongs to a superseded one.
    Inactive,
}

/// Per-subscription frame counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub appended: u64,
    pub acknowledged: u64,
    pub malformed: u64,
    pub unknown: u64,
    pub foreign: u64,
    pub inactive: u64,
}

/// Lightweight status published to observers after every change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamStatus {
    pub session_id: Option<SessionId>,
    pub connection: ConnectionState,
    pub events: usize,
    pub generation: u64,
}

/// Owned copy of a session, for readers outside the client.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub session_id: Option<SessionId>,
    pub connection: ConnectionState,
    pub acknowledged: bool,
    pub phase: Phase,
    pub events: Vec<AgentEvent>,
    pub stats: FrameStats,
}

impl SessionSnapshot {
    pub fn phase_label(&self) -> &str {
        self.phase.label()
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }
}

/// Reconstructed state of one reasoning session.
///
/// This is the synchronous core of the stream client: every mutation goes through
/// here. A `generation` counter identifies the current subscription; frames tagged
/// with an older generation are refused, which is what keeps a superseded
/// connection from writing into the next session's log.
#[derive(Debug)]
pub struct SessionState {
    generation: u64,
    connection: ConnectionState,
    acknowledged: bool,
    log: SessionLog,
    phase: PhaseTracker,
    stats: FrameStats,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            generation: 0,
            connection: ConnectionState::Idle,
            acknowledged: false,
            log: SessionLog::new(None),
            phase: PhaseTracker::new(),
            stats: FrameStats::default(),
        }
    }

    /// Select a session (or none), resetting everything. Returns the new generation.
    pub fn select(&mut self, session_id: Option<SessionId>) -> u64 {
        self.generation += 1;
        self.connection = match session_id {
            Some(_) => ConnectionState::Connecting,
            None => ConnectionState::Idle,
        };
        self.acknowledged = false;
        self.log.reset(session_id);
        self.phase.reset();
        self.stats = FrameStats::default();
        self.generation
    }

    /// Close the live subscription, keeping the log. No-op unless live.
    pub fn close(&mut self) -> bool {
        if !self.connection.is_live() {
            return false;
        }
        self.connection = ConnectionState::Closed;
        self.generation += 1;
        true
    }

    /// Transport opened for `generation`. Returns false if that subscription is gone.
    pub(crate) fn mark_open(&mut self, generation: u64) -> bool {
        if generation != self.generation || !self.connection.is_live() {
            return false;
        }
        self.connection = ConnectionState::Open;
        true
    }

    /// Transport ended or failed for `generation`. The log is kept.
    pub(crate) fn mark_closed(&mut self, generation: u64) -> bool {
        if generation != self.generation || !self.connection.is_live() {
            return false;
        }
        self.connection = ConnectionState::Closed;
        true
    }

    /// Apply a frame delivered by the subscription identified by `generation`.
    pub fn apply_frame_for(
        &mut self,
        generation: u64,
        raw: &str,
        sink: &dyn DiagnosticSink,
    ) -> FrameOutcome {
        if generation != self.generation {
            self.stats.inactive += 1;
            return FrameOutcome::Ignored(IgnoreReason::Inactive);
        }
        self.apply_frame(raw, sink)
    }

    /// Decode, classify and route one text frame for the current subscription.
    ///
    /// Never fails: anything that is not a valid event for the active session is
    /// dropped and, where useful, reported to `sink`.
    pub fn apply_frame(&mut self, raw: &str, sink: &dyn DiagnosticSink) -> FrameOutcome {
        let active = match self.log.session_id() {
            Some(id) if self.connection.is_live() => id,
            _ => {
                self.stats.inactive += 1;
                return FrameOutcome::Ignored(IgnoreReason::Inactive);
            }
        };

        let value: Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(e) => return self.malformed(active, e.to_string(), raw, sink),
        };

        let kind = match value.get("type").and_then(Value::as_str) {
            Some(t) => match EventKind::from_type(t) {
                Some(kind) => kind,
                None => {
                    tracing::trace!(session_id = %active, event_type = t, "ignoring unknown event type");
                    self.stats.unknown += 1;
                    return FrameOutcome::Ignored(IgnoreReason::UnknownType);
                }
            },
            None => return self.malformed(active, "missing type discriminator", raw, sink),
        };

        let event: AgentEvent = match serde_json::from_value(value) {
            Ok(e) => e,
            Err(e) => {
                return self.malformed(
                    active,
                    format!("invalid {} event: {}", kind.as_str(), e),
                    raw,
                    sink,
                )
            }
        };

        let received = event.session_id();
        if received != active {
            self.stats.foreign += 1;
            sink.report(Diagnostic::ForeignSession {
                expected: active,
                received,
            });
            return FrameOutcome::Ignored(IgnoreReason::ForeignSession);
        }

        match event {
            AgentEvent::Connected(_) => {
                self.acknowledged = true;
                if self.connection == ConnectionState::Connecting {
                    self.connection = ConnectionState::Open;
                }
                self.stats.acknowledged += 1;
                FrameOutcome::Acknowledged
            }
            event => {
                self.phase.observe(&event);
                self.log.append(event);
                self.stats.appended += 1;
                FrameOutcome::Appended(kind)
            }
        }
    }

    fn malformed(
        &mut self,
        active: SessionId,
        reason: impl Into<String>,
        raw: &str,
        sink: &dyn DiagnosticSink,
    ) -> FrameOutcome {
        self.stats.malformed += 1;
        sink.report(Diagnostic::malformed(Some(active), reason, raw));
        FrameOutcome::Ignored(IgnoreReason::Malformed)
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.log.session_id()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    /// Whether the server acknowledged the session with a `connected` event.
    pub fn acknowledged(&self) -> bool {
        self.acknowledged
    }

    pub fn log(&self) -> &SessionLog {
        &self.log
    }

    pub fn phase(&self) -> &Phase {
        self.phase.phase()
    }

    pub fn phase_label(&self) -> &str {
        self.phase.label()
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub fn status(&self) -> StreamStatus {
        StreamStatus {
            session_id: self.session_id(),
            connection: self.connection,
            events: self.log.len(),
            generation: self.generation,
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.session_id(),
            connection: self.connection,
            acknowledged: self.acknowledged,
            phase: self.phase.phase().clone(),
            events: self.log.events().cloned().collect(),
            stats: self.stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::InMemoryDiagnosticSink;

    fn sid(n: u64) -> SessionId {
        SessionId::new(n).unwrap()
    }

    fn live(n: u64) -> SessionState {
        let mut state = SessionState::new();
        state.select(Some(sid(n)));
        state
    }

    #[test]
    fn test_null_selection_is_idle_and_empty() {
        let mut state = live(1);
        let sink = InMemoryDiagnosticSink::new(8);
        state.apply_frame(r#"{"type":"phase","sessionId":1,"phase":"A"}"#, &sink);
        state.select(None);
        assert_eq!(state.connection(), ConnectionState::Idle);
        assert!(state.log().is_empty());
        assert!(!state.is_connected());
        assert_eq!(state.phase_label(), "Initializing");
    }

    #[test]
    fn test_connected_only_sets_flag() {
        let mut state = live(42);
        let sink = InMemoryDiagnosticSink::new(8);
        let outcome = state.apply_frame(r#"{"type":"connected","sessionId":42}"#, &sink);
        assert_eq!(outcome, FrameOutcome::Acknowledged);
        assert!(state.is_connected());
        assert!(state.acknowledged());
        assert!(state.log().is_empty());
    }

    #[test]
    fn test_malformed_frames_are_reported_not_logged() {
        let mut state = live(1);
        let sink = InMemoryDiagnosticSink::new(8);
        for raw in ["not json", "{", "[1,2]", r#"{"sessionId":1}"#, r#"{"type":"thought","sessionId":1}"#] {
            let outcome = state.apply_frame(raw, &sink);
            assert_eq!(outcome, FrameOutcome::Ignored(IgnoreReason::Malformed), "{raw}");
        }
        assert!(state.log().is_empty());
        assert_eq!(sink.len(), 5);
        assert_eq!(state.stats().malformed, 5);
    }

    #[test]
    fn test_unknown_types_are_silent() {
        let mut state = live(1);
        let sink = InMemoryDiagnosticSink::new(8);
        let outcome = state.apply_frame(r#"{"type":"unknown_future_event","x":1}"#, &sink);
        assert_eq!(outcome, FrameOutcome::Ignored(IgnoreReason::UnknownType));
        assert!(sink.is_empty());
        assert!(state.log().is_empty());
    }

    #[test]
    fn test_foreign_session_events_are_filtered() {
        let mut state = live(1);
        let sink = InMemoryDiagnosticSink::new(8);
        let outcome = state.apply_frame(r#"{"type":"phase","sessionId":2,"phase":"X"}"#, &sink);
        assert_eq!(outcome, FrameOutcome::Ignored(IgnoreReason::ForeignSession));
        assert_eq!(state.phase_label(), "Initializing");
        assert_eq!(
            sink.records(),
            vec![Diagnostic::ForeignSession {
                expected: sid(1),
                received: sid(2)
            }]
        );
    }

    #[test]
    fn test_stale_generation_is_refused() {
        let mut state = SessionState::new();
        let sink = InMemoryDiagnosticSink::new(8);
        let old = state.select(Some(sid(1)));
        let new = state.select(Some(sid(1)));
        assert_ne!(old, new);

        let frame = r#"{"type":"phase","sessionId":1,"phase":"Old"}"#;
        assert_eq!(
            state.apply_frame_for(old, frame, &sink),
            FrameOutcome::Ignored(IgnoreReason::Inactive)
        );
        assert!(state.apply_frame_for(new, frame, &sink).is_appended());
    }

    #[test]
    fn test_close_keeps_log_and_is_idempotent() {
        let mut state = live(5);
        let sink = InMemoryDiagnosticSink::new(8);
        state.apply_frame(r#"{"type":"phase","sessionId":5,"phase":"A"}"#, &sink);

        assert!(state.close());
        let after_first = (state.connection(), state.log().len(), state.generation());
        assert!(!state.close());
        assert_eq!(
            (state.connection(), state.log().len(), state.generation()),
            after_first
        );
        assert_eq!(state.connection(), ConnectionState::Closed);
        assert_eq!(state.log().len(), 1);

        // closed sessions take no more frames
        let outcome = state.apply_frame(r#"{"type":"phase","sessionId":5,"phase":"B"}"#, &sink);
        assert_eq!(outcome, FrameOutcome::Ignored(IgnoreReason::Inactive));
    }

    #[test]
    fn test_transport_close_only_affects_current_generation() {
        let mut state = SessionState::new();
        let old = state.select(Some(sid(1)));
        let new = state.select(Some(sid(2)));
        assert!(!state.mark_closed(old));
        assert!(state.mark_open(new));
        assert!(state.is_connected());
        assert!(state.mark_closed(new));
        assert!(!state.is_connected());
    }
}
