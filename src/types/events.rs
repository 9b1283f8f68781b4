//! Agent reasoning events as emitted on the session stream

use super::{AgentRole, SessionId};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Reasoning stream event, discriminated by the `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    /// Session acknowledgment (never stored in the session log)
    Connected(ConnectedEvent),

    /// Coarse-grained stage change
    Phase(PhaseEvent),

    /// Narrative reasoning produced by one agent
    Thought(ThoughtEvent),

    /// Concrete step taken by one agent
    Action(ActionEvent),

    /// Terminal result of the session
    Completed(CompletedEvent),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedEvent {
    pub session_id: SessionId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseEvent {
    pub session_id: SessionId,
    pub phase: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThoughtEvent {
    pub session_id: SessionId,
    pub agent: AgentRole,
    pub thought_type: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionEvent {
    pub session_id: SessionId,
    pub agent: AgentRole,
    pub action_type: String,
    pub description: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub metadata: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedEvent {
    pub session_id: SessionId,
    #[serde(default)]
    pub result: Value,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

/// The closed set of `type` discriminators understood by this client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Connected,
    Phase,
    Thought,
    Action,
    Completed,
}

impl EventKind {
    /// Classify a raw `type` value; `None` means a type this client does not know.
    pub fn from_type(value: &str) -> Option<Self> {
        match value {
            "connected" => Some(EventKind::Connected),
            "phase" => Some(EventKind::Phase),
            "thought" => Some(EventKind::Thought),
            "action" => Some(EventKind::Action),
            "completed" => Some(EventKind::Completed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Connected => "connected",
            EventKind::Phase => "phase",
            EventKind::Thought => "thought",
            EventKind::Action => "action",
            EventKind::Completed => "completed",
        }
    }
}

impl AgentEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            AgentEvent::Connected(_) => EventKind::Connected,
            AgentEvent::Phase(_) => EventKind::Phase,
            AgentEvent::Thought(_) => EventKind::Thought,
            AgentEvent::Action(_) => EventKind::Action,
            AgentEvent::Completed(_) => EventKind::Completed,
        }
    }

    pub fn session_id(&self) -> SessionId {
        match self {
            AgentEvent::Connected(e) => e.session_id,
            AgentEvent::Phase(e) => e.session_id,
            AgentEvent::Thought(e) => e.session_id,
            AgentEvent::Action(e) => e.session_id,
            AgentEvent::Completed(e) => e.session_id,
        }
    }

    pub fn timestamp(&self) -> Option<&str> {
        match self {
            AgentEvent::Phase(e) => e.timestamp.as_deref(),
            AgentEvent::Thought(e) => e.timestamp.as_deref(),
            AgentEvent::Action(e) => e.timestamp.as_deref(),
            AgentEvent::Connected(_) | AgentEvent::Completed(_) => None,
        }
    }

    /// The agent behind a thought or action.
    pub fn agent(&self) -> Option<&AgentRole> {
        match self {
            AgentEvent::Thought(e) => Some(&e.agent),
            AgentEvent::Action(e) => Some(&e.agent),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AgentEvent::Completed(_))
    }
}
