//! Event sink: turns presence events into log lines and chat notifications
//!
//! Delivery is best-effort. A failed send is logged and the message is gone;
//! nothing is retried and nothing flows back to the poll loop.

use crate::data::PresenceEvent;
use crate::util::format_hms;
use anyhow::Result;
use std::future::Future;
use tokio::sync::mpsc;

/// Capacity of the poller → dispatcher channel
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Outbound notification channel (a chat bot, in practice)
pub trait Notifier: Send + Sync {
    fn send(&self, text: &str) -> impl Future<Output = Result<()>> + Send;
}

/// Human-readable text for one event
pub fn format_event(event: &PresenceEvent) -> String {
    match event {
        PresenceEvent::Started { name, at } => {
            format!("🎮 Game {} started at {}", name, at.format("%H:%M:%S"))
        }
        PresenceEvent::Stopped { name, at, duration } => format!(
            "⏹️ Game {} closed at {}\nSession time: {}",
            name,
            at.format("%H:%M:%S"),
            format_hms(*duration)
        ),
    }
}

/// Drain `rx` until every sender is gone, logging each event and handing it to
/// `notifier` when there is one.
pub async fn run_dispatcher<N: Notifier>(
    mut rx: mpsc::Receiver<PresenceEvent>,
    notifier: Option<N>,
) {
    while let Some(event) = rx.recv().await {
        let text = format_event(&event);
        tracing::info!("{}", text.replace('\n', " | "));

        let Some(notifier) = notifier.as_ref() else {
            continue;
        };

        if let Err(e) = notifier.send(&text).await {
            tracing::warn!("Failed to deliver notification for {}: {:#}", event.name(), e);
        }
    }

    tracing::debug!("Event channel closed, dispatcher exiting");
}

/// Spawn [`run_dispatcher`] on the runtime
pub fn spawn_dispatcher<N>(
    rx: mpsc::Receiver<PresenceEvent>,
    notifier: Option<N>,
) -> tokio::task::JoinHandle<()>
where
    N: Notifier + 'static,
{
    tokio::spawn(run_dispatcher(rx, notifier))
}
