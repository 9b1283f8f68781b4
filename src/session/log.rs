//! Append-only event log for one reasoning session.

use crate::types::{AgentEvent, SessionId};
use std::iter::FusedIterator;

/// Ordered, append-only sequence of events for exactly one session.
///
/// Insertion order is arrival order. Events are never reordered, edited or removed;
/// the only way the log shrinks is a full reset when another session is selected.
#[derive(Debug, Clone, Default)]
pub struct SessionLog {
    session_id: Option<SessionId>,
    events: Vec<AgentEvent>,
}

impl SessionLog {
    pub fn new(session_id: Option<SessionId>) -> Self {
        Self {
            session_id,
            events: Vec::new(),
        }
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session_id
    }

    /// Iterate the log in arrival order.
    ///
    /// Each call starts from the first event. A later call after new arrivals yields the
    /// same prefix followed by the new events.
    pub fn events(&self) -> Events<'_> {
        Events {
            inner: self.events.iter(),
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&AgentEvent> {
        self.events.get(index)
    }

    pub fn last(&self) -> Option<&AgentEvent> {
        self.events.last()
    }

    pub(crate) fn append(&mut self, event: AgentEvent) {
        debug_assert_eq!(Some(event.session_id()), self.session_id);
        self.events.push(event);
    }

    pub(crate) fn reset(&mut self, session_id: Option<SessionId>) {
        self.session_id = session_id;
        self.events.clear();
    }
}

/// Borrowing iterator over a [`SessionLog`].
#[derive(Debug, Clone)]
pub struct Events<'a> {
    inner: std::slice::Iter<'a, AgentEvent>,
}

impl<'a> Iterator for Events<'a> {
    type Item = &'a AgentEvent;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for Events<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl ExactSizeIterator for Events<'_> {}

impl FusedIterator for Events<'_> {}

impl<'a> IntoIterator for &'a SessionLog {
    type Item = &'a AgentEvent;
    type IntoIter = Events<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PhaseEvent;

    fn phase(session: SessionId, label: &str) -> AgentEvent {
        AgentEvent::Phase(PhaseEvent {
            session_id: session,
            phase: label.to_string(),
            timestamp: None,
        })
    }

    #[test]
    fn test_events_are_restartable_and_extend() {
        let sid = SessionId::new(1).unwrap();
        let mut log = SessionLog::new(Some(sid));
        log.append(phase(sid, "a"));
        log.append(phase(sid, "b"));

        let first: Vec<_> = log.events().cloned().collect();
        let second: Vec<_> = log.events().cloned().collect();
        assert_eq!(first, second);

        log.append(phase(sid, "c"));
        let third: Vec<_> = log.events().cloned().collect();
        assert_eq!(third.len(), 3);
        assert_eq!(&third[..2], &first[..]);
    }

    #[test]
    fn test_reset_empties_and_rescopes() {
        let a = SessionId::new(1).unwrap();
        let b = SessionId::new(2).unwrap();
        let mut log = SessionLog::new(Some(a));
        log.append(phase(a, "x"));
        log.reset(Some(b));
        assert!(log.is_empty());
        assert_eq!(log.session_id(), Some(b));
        assert_eq!(log.events().len(), 0);
    }
}
