use chrono::{DateTime, Local};
use std::collections::HashMap;
use std::time::Duration;

/// Process executable name of a monitored application, e.g. "game.exe"
pub type TrackedName = String;

/// A tracked application that is currently running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveSession {
    pub start_time: DateTime<Local>,
}

/// Everything the tracker knows: running sessions plus the historical ledger
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackerState {
    pub active: HashMap<TrackedName, ActiveSession>,
    /// Sum of all closed sessions per application
    pub completed: HashMap<TrackedName, Duration>,
}

impl TrackerState {
    pub fn is_empty(&self) -> bool {
        self.active.is_empty() && self.completed.is_empty()
    }

    pub fn completed_for(&self, name: &str) -> Duration {
        self.completed.get(name).copied().unwrap_or_default()
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.active.contains_key(name)
    }
}

/// A session that just ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoppedSession {
    pub name: TrackedName,
    pub duration: Duration,
}

/// Result of comparing one snapshot against the tracker state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transitions {
    pub started: Vec<TrackedName>,
    pub stopped: Vec<StoppedSession>,
}

impl Transitions {
    pub fn is_empty(&self) -> bool {
        self.started.is_empty() && self.stopped.is_empty()
    }
}

/// Start/stop notification pushed from the poll loop to the event sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenceEvent {
    Started {
        name: TrackedName,
        at: DateTime<Local>,
    },
    Stopped {
        name: TrackedName,
        at: DateTime<Local>,
        duration: Duration,
    },
}

impl PresenceEvent {
    pub fn name(&self) -> &str {
        match self {
            Self::Started { name, .. } | Self::Stopped { name, .. } => name,
        }
    }

    /// Expand a reconcile result into individual events, starts first
    pub fn from_transitions(transitions: Transitions, at: DateTime<Local>) -> Vec<Self> {
        let Transitions { started, stopped } = transitions;
        started
            .into_iter()
            .map(|name| Self::Started { name, at })
            .chain(stopped.into_iter().map(|s| Self::Stopped {
                name: s.name,
                at,
                duration: s.duration,
            }))
            .collect()
    }
}
