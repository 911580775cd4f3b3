//! Background poll loop driving the presence tracker

use crate::config::PollingConfig;
use crate::data::{PresenceEvent, TrackedName};
use crate::events::EVENT_CHANNEL_CAPACITY;
use crate::source::{filter_tracked, SnapshotSource};
use crate::tracker::PresenceTracker;
use crate::util::send_or_log;
use anyhow::{Context, Result};
use chrono::Local;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;

/// Samples the process list on a fixed cadence and feeds the tracker
pub struct Poller<S> {
    source: Arc<Mutex<S>>,
    tracker: PresenceTracker,
    tracked: Arc<HashSet<TrackedName>>,
    settings: PollingConfig,
}

impl<S: SnapshotSource + 'static> Poller<S> {
    pub fn new(
        source: S,
        tracker: PresenceTracker,
        tracked: HashSet<TrackedName>,
        settings: PollingConfig,
    ) -> Self {
        Self {
            source: Arc::new(Mutex::new(source)),
            tracker,
            tracked: Arc::new(tracked),
            settings,
        }
    }

    /// Start polling in a background task.
    ///
    /// The returned receiver yields every start/stop event. Dropping it does
    /// not stop polling; the tracker keeps updating and events are discarded.
    pub fn start(self) -> mpsc::Receiver<PresenceEvent> {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        tokio::spawn(async move {
            self.run(tx).await;
        });

        rx
    }

    /// Run the polling loop forever
    async fn run(self, tx: mpsc::Sender<PresenceEvent>) {
        let interval = self.settings.interval();
        let error_backoff = self.settings.error_backoff();

        loop {
            match self.poll_in_background().await {
                Ok(events) => {
                    for event in events {
                        send_or_log(&tx, event, "presence event");
                    }
                    tokio::time::sleep(interval).await;
                }
                Err(e) => {
                    tracing::warn!(
                        "Process poll failed, retrying in {}s: {:#}",
                        error_backoff.as_secs(),
                        e
                    );
                    tokio::time::sleep(error_backoff).await;
                }
            }
        }
    }

    /// One poll on the blocking pool. A panic in there is reported as an
    /// ordinary poll error.
    async fn poll_in_background(&self) -> Result<Vec<PresenceEvent>> {
        let source = Arc::clone(&self.source);
        let tracker = self.tracker.clone();
        let tracked = Arc::clone(&self.tracked);

        tokio::task::spawn_blocking(move || poll(&source, &tracker, &tracked))
            .await
            .context("Process poll task panicked")?
    }

    /// Take one snapshot and reconcile it
    pub fn poll_once(&mut self) -> Result<Vec<PresenceEvent>> {
        poll(&self.source, &self.tracker, &self.tracked)
    }
}

fn poll<S: SnapshotSource>(
    source: &Mutex<S>,
    tracker: &PresenceTracker,
    tracked: &HashSet<TrackedName>,
) -> Result<Vec<PresenceEvent>> {
    // A source that panicked last time is still usable
    let running = source
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .list_process_names()
        .context("Failed to list running processes")?;

    let snapshot = filter_tracked(&running, tracked);
    let now = Local::now();
    let transitions = tracker.apply_at(&snapshot, now);

    if !transitions.is_empty() {
        tracing::debug!(
            started = transitions.started.len(),
            stopped = transitions.stopped.len(),
            "Presence changed"
        );
    }

    Ok(PresenceEvent::from_transitions(transitions, now))
}
