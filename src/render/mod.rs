//! 渲染模块：将会话日志、阶段与连接状态转换为时间线数据。
//!
//! Pure functions only. The timeline is plain data (serializable) so any front end,
//! including the bundled CLI, can draw it.

pub mod agents;

use crate::session::{ConnectionState, SessionLog, SessionSnapshot};
use crate::types::{AgentEvent, AgentRole, EventKind, SessionId};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

pub use agents::{agent_display, AgentDisplay};

/// Longest rendered completion summary, in characters.
const RESULT_SUMMARY_CHARS: usize = 240;

#[derive(Debug, Clone, Serialize)]
pub struct Timeline {
    pub session_id: Option<SessionId>,
    pub phase: String,
    pub connection: ConnectionState,
    pub connected: bool,
    pub completed: bool,
    pub entries: Vec<TimelineEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineEntry {
    pub index: usize,
    pub kind: EventKind,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<AgentBadge>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<(String, String)>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentBadge {
    /// Role name as sent by the server.
    pub name: String,
    pub display: AgentDisplay,
}

impl AgentBadge {
    fn new(role: &AgentRole) -> Self {
        Self {
            name: role.as_str().to_string(),
            display: agent_display(role),
        }
    }
}

/// Build the timeline for a session.
pub fn render(log: &SessionLog, phase: &str, connection: ConnectionState) -> Timeline {
    let entries: Vec<TimelineEntry> = log
        .events()
        .enumerate()
        .map(|(index, event)| render_event(index, event))
        .collect();
    Timeline {
        session_id: log.session_id(),
        phase: phase.to_string(),
        connection,
        connected: connection.is_connected(),
        completed: log.events().any(AgentEvent::is_terminal),
        entries,
    }
}

pub fn render_snapshot(snapshot: &SessionSnapshot) -> Timeline {
    let entries: Vec<TimelineEntry> = snapshot
        .events
        .iter()
        .enumerate()
        .map(|(index, event)| render_event(index, event))
        .collect();
    Timeline {
        session_id: snapshot.session_id,
        phase: snapshot.phase_label().to_string(),
        connection: snapshot.connection,
        connected: snapshot.is_connected(),
        completed: snapshot.events.iter().any(AgentEvent::is_terminal),
        entries,
    }
}

pub fn render_event(index: usize, event: &AgentEvent) -> TimelineEntry {
    let mut entry = TimelineEntry {
        index,
        kind: event.kind(),
        title: String::new(),
        body: None,
        agent: event.agent().map(AgentBadge::new),
        timestamp: event.timestamp().map(str::to_string),
        details: Vec::new(),
    };

    match event {
        AgentEvent::Connected(_) => {
            entry.title = "Connected".to_string();
        }
        AgentEvent::Phase(e) => {
            entry.title = format!("Phase: {}", e.phase);
        }
        AgentEvent::Thought(e) => {
            entry.title = format!("{} · {}", agent_display(&e.agent).label, e.thought_type);
            entry.body = Some(e.content.clone());
        }
        AgentEvent::Action(e) => {
            entry.title = format!("{} → {}", agent_display(&e.agent).label, e.action_type);
            entry.body = Some(e.description.clone());
            let mut details: Vec<(String, String)> = e
                .metadata
                .iter()
                .map(|(k, v)| (k.clone(), value_text(v)))
                .collect();
            details.sort_by(|a, b| a.0.cmp(&b.0));
            entry.details = details;
        }
        AgentEvent::Completed(e) => {
            entry.title = "Completed".to_string();
            entry.body = summarize_result(&e.result);
        }
    }
    entry
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Short human summary of a completion payload.
fn summarize_result(result: &Value) -> Option<String> {
    let text = match result {
        Value::Null => return None,
        Value::Object(map) => ["summary", "recommendation", "message"]
            .iter()
            .find_map(|k| map.get(*k).and_then(Value::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| result.to_string()),
        other => value_text(other),
    };
    let mut chars = text.chars();
    let mut summary: String = chars.by_ref().take(RESULT_SUMMARY_CHARS).collect();
    if chars.next().is_some() {
        summary.push('…');
    }
    Some(summary)
}

impl fmt::Display for TimelineEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ts) = &self.timestamp {
            write!(f, "[{}] ", ts)?;
        }
        write!(f, "{}", self.title)?;
        if let Some(body) = &self.body {
            write!(f, ": {}", body)?;
        }
        for (k, v) in &self.details {
            write!(f, "\n    {} = {}", k, v)?;
        }
        Ok(())
    }
}
