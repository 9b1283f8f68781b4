use crate::types::AgentRole;
use serde::Serialize;

/// How an agent role is presented in the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AgentDisplay {
    pub label: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
}

const PLANNER: AgentDisplay = AgentDisplay {
    label: "Planner",
    icon: "brain",
    color: "#6366f1",
};
const ANALYST: AgentDisplay = AgentDisplay {
    label: "Analyst",
    icon: "bar-chart-3",
    color: "#0ea5e9",
};
const SYNTHESIZER: AgentDisplay = AgentDisplay {
    label: "Synthesizer",
    icon: "sparkles",
    color: "#f59e0b",
};
const REFLECTOR: AgentDisplay = AgentDisplay {
    label: "Reflector",
    icon: "refresh-cw",
    color: "#10b981",
};
/// Used for roles this client does not know.
pub const FALLBACK: AgentDisplay = AgentDisplay {
    label: "Agent",
    icon: "bot",
    color: "#64748b",
};

pub fn agent_display(role: &AgentRole) -> AgentDisplay {
    match role {
        AgentRole::Planner => PLANNER,
        AgentRole::Analyst => ANALYST,
        AgentRole::Synthesizer => SYNTHESIZER,
        AgentRole::Reflector => REFLECTOR,
        AgentRole::Other(_) => FALLBACK,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_roles_use_fallback() {
        assert_eq!(agent_display(&AgentRole::from("auditor")), FALLBACK);
        assert_eq!(agent_display(&AgentRole::Planner).label, "Planner");
    }
}
