//! Utility functions and helpers.

use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;

/// Render a duration as `HH:MM:SS`. Hours are not wrapped at 24.
pub fn format_hms(duration: Duration) -> String {
    let total = duration.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Hand a value to a channel without waiting, logging a warning if it is dropped.
///
/// Used for fire-and-forget delivery: a full or closed channel loses the value
/// instead of stalling the sender.
pub fn send_or_log<T>(tx: &mpsc::Sender<T>, value: T, context: &str) -> bool {
    match tx.try_send(value) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Dropped {}: {}", context, e);
            false
        }
    }
}

/// Keep a background task alive: spawn it, and respawn it `restart_delay`
/// after it panics. Returns once the task finishes normally or is cancelled.
pub async fn supervise<F, Fut>(name: &str, restart_delay: Duration, mut make_task: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()> + Send + 'static,
{
    loop {
        match tokio::spawn(make_task()).await {
            Ok(()) => return,
            Err(e) if e.is_panic() => {
                tracing::error!(
                    "{} task panicked, restarting in {}s",
                    name,
                    restart_delay.as_secs()
                );
                tokio::time::sleep(restart_delay).await;
            }
            Err(_) => return,
        }
    }
}
