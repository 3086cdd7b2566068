//! Bounded per-agent event history.

use std::collections::VecDeque;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Kind of notable agent-internal event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EventKind {
    GoalChange,
    ImpulsiveExplore,
    NewState,
    FrustrationPeak,
    MetaCognitionActive,
    MetaCognitionInactive,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventKind::GoalChange => "goal_change",
            EventKind::ImpulsiveExplore => "impulsive_explore",
            EventKind::NewState => "new_state",
            EventKind::FrustrationPeak => "frustration_peak",
            EventKind::MetaCognitionActive => "meta_cognition_active",
            EventKind::MetaCognitionInactive => "meta_cognition_inactive",
        };
        f.write_str(s)
    }
}

/// A single logged event.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AgentEvent {
    pub id: u64,
    pub step: u64,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: EventKind,
    pub message: String,
}

/// Append-only event log that evicts its oldest entry at capacity.
///
/// Purely observational: nothing in the learning loop reads it back.
#[derive(Debug, Clone, PartialEq)]
pub struct EventLog {
    entries: VecDeque<AgentEvent>,
    next_id: u64,
    capacity: usize,
}

impl EventLog {
    pub const DEFAULT_CAPACITY: usize = 50;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            next_id: 0,
            capacity,
        }
    }

    /// Rebuilds a log from stored entries and id counter.
    ///
    /// Keeps only the newest `DEFAULT_CAPACITY` entries. The counter never
    /// goes below one past the largest stored id.
    pub fn restore(entries: Vec<AgentEvent>, next_id: u64) -> Self {
        let mut log = Self::new();
        let floor = entries
            .iter()
            .map(|e| e.id.saturating_add(1))
            .max()
            .unwrap_or(0);
        let skip = entries.len().saturating_sub(log.capacity);
        log.entries.extend(entries.into_iter().skip(skip));
        log.next_id = next_id.max(floor);
        log
    }

    /// Appends an event and returns its id.
    pub fn push(&mut self, kind: EventKind, message: impl Into<String>, step: u64) -> u64 {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        if self.capacity == 0 {
            return id;
        }
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(AgentEvent {
            id,
            step,
            kind,
            message: message.into(),
        });
        id
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Id the next event will receive.
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Iterates from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &AgentEvent> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&AgentEvent> {
        self.entries.back()
    }

    /// Number of stored events of the given kind.
    pub fn count(&self, kind: EventKind) -> usize {
        self.entries.iter().filter(|e| e.kind == kind).count()
    }

    pub fn to_vec(&self) -> Vec<AgentEvent> {
        self.entries.iter().cloned().collect()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_assigns_increasing_ids() {
        let mut log = EventLog::new();
        assert_eq!(log.push(EventKind::NewState, "a", 1), 0);
        assert_eq!(log.push(EventKind::GoalChange, "b", 2), 1);
        assert_eq!(log.len(), 2);
        assert_eq!(log.last().unwrap().kind, EventKind::GoalChange);
    }

    #[test]
    fn evicts_oldest_at_capacity() {
        let mut log = EventLog::new();
        for i in 0..60 {
            log.push(EventKind::NewState, format!("e{i}"), i);
        }
        assert_eq!(log.len(), EventLog::DEFAULT_CAPACITY);
        assert_eq!(log.iter().next().unwrap().id, 10);
        assert_eq!(log.next_id(), 60);
    }

    #[test]
    fn restore_trims_and_keeps_counter_ahead() {
        let entries: Vec<_> = (0..55)
            .map(|i| AgentEvent {
                id: i,
                step: i,
                kind: EventKind::NewState,
                message: String::new(),
            })
            .collect();
        let log = EventLog::restore(entries, 3);
        assert_eq!(log.len(), 50);
        assert_eq!(log.iter().next().unwrap().id, 5);
        assert_eq!(log.next_id(), 55);
    }

    #[test]
    fn ids_saturate_at_max() {
        let stored = vec![AgentEvent {
            id: u64::MAX,
            step: 0,
            kind: EventKind::NewState,
            message: String::new(),
        }];
        let mut log = EventLog::restore(stored, 0);
        assert_eq!(log.next_id(), u64::MAX);

        let mut log2 = EventLog::restore(Vec::new(), u64::MAX);
        assert_eq!(log2.push(EventKind::GoalChange, "a", 1), u64::MAX);
        assert_eq!(log2.push(EventKind::GoalChange, "b", 2), u64::MAX);
        assert_eq!(log2.next_id(), u64::MAX);

        log.push(EventKind::NewState, "c", 3);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn count_by_kind() {
        let mut log = EventLog::new();
        log.push(EventKind::NewState, "", 0);
        log.push(EventKind::NewState, "", 1);
        log.push(EventKind::GoalChange, "", 2);
        assert_eq!(log.count(EventKind::NewState), 2);
        assert_eq!(log.count(EventKind::FrustrationPeak), 0);
    }

    #[test]
    fn kind_display_is_snake_case() {
        assert_eq!(EventKind::MetaCognitionActive.to_string(), "meta_cognition_active");
    }
}
