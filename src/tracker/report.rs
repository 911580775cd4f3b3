//! Text reports over a tracker snapshot, as sent to chat

use crate::data::TrackerState;
use crate::util::format_hms;
use chrono::{DateTime, Local};
use std::fmt::Write;
use std::time::Duration;

/// Returned by [`statistics_report`] when nothing has been observed yet
pub const NO_DATA: &str = "📊 Statistics are empty. No game data yet.";

/// Returned by [`status_report`] when nothing is running
pub const NO_ACTIVE: &str = "🔸 No games are running right now";

fn elapsed(start: DateTime<Local>, now: DateTime<Local>) -> Duration {
    (now - start).to_std().unwrap_or_default()
}

/// Running applications, each with start time and current session length
pub fn status_report(state: &TrackerState, now: DateTime<Local>) -> String {
    if state.active.is_empty() {
        return NO_ACTIVE.to_string();
    }

    let mut active: Vec<_> = state.active.iter().collect();
    active.sort_by(|a, b| a.0.cmp(b.0));

    let mut text = String::from("🟢 Active games:\n\n");
    for (name, session) in active {
        let _ = writeln!(text, "🎮 {}", name);
        let _ = writeln!(text, "  ⏰ Started: {}", session.start_time.format("%H:%M:%S"));
        let _ = writeln!(
            text,
            "  ⏱️ Session time: {}\n",
            format_hms(elapsed(session.start_time, now))
        );
    }
    text
}

/// Completed totals followed by sessions still running
pub fn statistics_report(state: &TrackerState, now: DateTime<Local>) -> String {
    if state.is_empty() {
        return NO_DATA.to_string();
    }

    let mut text = String::from("📊 Play time statistics:\n\n");

    if !state.completed.is_empty() {
        let mut completed: Vec<_> = state.completed.iter().collect();
        completed.sort_by(|a, b| a.0.cmp(b.0));

        text.push_str("🏁 Completed sessions:\n");
        for (name, total) in completed {
            let _ = writeln!(text, "  • {}: {}", name, format_hms(*total));
        }
    }

    if !state.active.is_empty() {
        let mut active: Vec<_> = state.active.iter().collect();
        active.sort_by(|a, b| a.0.cmp(b.0));

        text.push_str("\n🟢 Active now:\n");
        for (name, session) in active {
            let _ = writeln!(
                text,
                "  • {}: {} (running)",
                name,
                format_hms(elapsed(session.start_time, now))
            );
        }
    }

    text
}
