//! Agent roles participating in a reasoning session.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of the agent that produced a thought or action.
///
/// The known set is closed in the UI but the server may introduce new roles at any
/// time; those decode to [`AgentRole::Other`] and keep their original name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AgentRole {
    Planner,
    Analyst,
    Synthesizer,
    Reflector,
    Other(String),
}

impl AgentRole {
    pub fn as_str(&self) -> &str {
        match self {
            AgentRole::Planner => "planner",
            AgentRole::Analyst => "analyst",
            AgentRole::Synthesizer => "synthesizer",
            AgentRole::Reflector => "reflector",
            AgentRole::Other(name) => name.as_str(),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, AgentRole::Other(_))
    }
}

impl From<String> for AgentRole {
    fn from(name: String) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "planner" => AgentRole::Planner,
            "analyst" => AgentRole::Analyst,
            "synthesizer" => AgentRole::Synthesizer,
            "reflector" => AgentRole::Reflector,
            _ => AgentRole::Other(name),
        }
    }
}

impl From<&str> for AgentRole {
    fn from(name: &str) -> Self {
        AgentRole::from(name.to_string())
    }
}

impl From<AgentRole> for String {
    fn from(role: AgentRole) -> Self {
        match role {
            AgentRole::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
