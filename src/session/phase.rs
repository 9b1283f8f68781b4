//! Current reasoning phase, derived from the event stream.

use crate::types::AgentEvent;

pub const INITIALIZING_LABEL: &str = "Initializing";
pub const COMPLETED_LABEL: &str = "Completed";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Initializing,
    Named(String),
    Completed,
}

impl Phase {
    pub fn label(&self) -> &str {
        match self {
            Phase::Initializing => INITIALIZING_LABEL,
            Phase::Named(label) => label.as_str(),
            Phase::Completed => COMPLETED_LABEL,
        }
    }
}

/// Last-writer-wins phase label.
///
/// `completed` is terminal: later `phase` events are still logged by the session but
/// no longer move the label.
#[derive(Debug, Clone, Default)]
pub struct PhaseTracker {
    phase: Phase,
}

impl PhaseTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, event: &AgentEvent) {
        match event {
            AgentEvent::Phase(e) if !self.is_completed() => {
                self.phase = Phase::Named(e.phase.clone());
            }
            AgentEvent::Completed(_) => self.phase = Phase::Completed,
            _ => {}
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn label(&self) -> &str {
        self.phase.label()
    }

    pub fn is_completed(&self) -> bool {
        self.phase == Phase::Completed
    }

    pub(crate) fn reset(&mut self) {
        self.phase = Phase::Initializing;
    }
}
