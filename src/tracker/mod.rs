//! Process presence tracking
//!
//! Turns repeated process-list snapshots into start/stop transitions and a
//! per-application ledger of completed play time.
//!
//! # Architecture
//!
//! ```text
//!   poll task                          bot / dispatch tasks
//!      │                                       │
//!      │ apply(snapshot)                       │ status_report() / statistics_report()
//!      ▼                                       ▼
//! ┌──────────────────────────────────────────────────────┐
//! │ PresenceTracker   Arc<RwLock<TrackerState>>          │
//! │    reconcile (pure)          report (pure)           │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! Only map accesses happen under the lock. Report formatting works on a cloned
//! snapshot and notification delivery happens elsewhere.

pub mod report;

use crate::data::{ActiveSession, StoppedSession, TrackedName, TrackerState, Transitions};
use chrono::{DateTime, Local};
use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Compare a snapshot of running tracked applications against `state`.
///
/// Opens a session for every newly seen name and closes every session whose
/// name is missing from the snapshot, folding its duration into the ledger.
/// A negative duration (wall clock moved backwards) counts as zero.
/// Both lists in the result are sorted by name.
pub fn reconcile(
    state: &mut TrackerState,
    snapshot: &HashSet<TrackedName>,
    now: DateTime<Local>,
) -> Transitions {
    let mut started: Vec<TrackedName> = snapshot
        .iter()
        .filter(|name| !state.active.contains_key(*name))
        .cloned()
        .collect();
    started.sort();

    for name in &started {
        state
            .active
            .insert(name.clone(), ActiveSession { start_time: now });
    }

    let mut gone: Vec<TrackedName> = state
        .active
        .keys()
        .filter(|name| !snapshot.contains(*name))
        .cloned()
        .collect();
    gone.sort();

    let mut stopped = Vec::with_capacity(gone.len());
    for name in gone {
        let Some(session) = state.active.remove(&name) else {
            continue;
        };
        let duration = (now - session.start_time).to_std().unwrap_or_default();
        *state.completed.entry(name.clone()).or_default() += duration;
        stopped.push(StoppedSession { name, duration });
    }

    Transitions { started, stopped }
}

/// Shared handle to the tracker state
///
/// Cloning is cheap; every clone sees the same state.
#[derive(Debug, Clone, Default)]
pub struct PresenceTracker {
    state: Arc<RwLock<TrackerState>>,
}

impl PresenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconcile a snapshot taken just now
    pub fn apply(&self, snapshot: &HashSet<TrackedName>) -> Transitions {
        self.apply_at(snapshot, Local::now())
    }

    /// Reconcile a snapshot taken at `now`
    pub fn apply_at(&self, snapshot: &HashSet<TrackedName>, now: DateTime<Local>) -> Transitions {
        let mut state = self.write();
        reconcile(&mut state, snapshot, now)
    }

    /// Consistent copy of the current state
    pub fn snapshot(&self) -> TrackerState {
        self.read().clone()
    }

    /// Currently running applications with start time and elapsed time
    pub fn status_report(&self) -> String {
        report::status_report(&self.snapshot(), Local::now())
    }

    /// Completed totals plus running sessions, or the "no data" message
    pub fn statistics_report(&self) -> String {
        report::statistics_report(&self.snapshot(), Local::now())
    }

    // Poisoning is ignored; the next reconcile repairs any partial update.
    fn read(&self) -> RwLockReadGuard<'_, TrackerState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, TrackerState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
