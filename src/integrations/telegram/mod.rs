//! Telegram bot integration
//!
//! Pushes start/stop notifications (via [`client::TelegramClient`] as a
//! [`Notifier`](crate::events::Notifier)) and answers `/status` and `/stats`
//! by long-polling `getUpdates`.

pub mod client;
pub mod commands;

pub use client::TelegramClient;
pub use commands::BotCommand;

use crate::config::TelegramConfig;
use crate::tracker::PresenceTracker;
use client::Update;
use std::time::Duration;

/// A command addressed to the bot, with the chat it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingCommand {
    pub chat_id: i64,
    pub command: BotCommand,
}

/// Extract commands from a batch of updates.
///
/// Returns the offset for the next `getUpdates` call (past every update seen,
/// including ones that carried no command) or `None` for an empty batch.
pub fn collect_commands(updates: &[Update]) -> (Option<i64>, Vec<IncomingCommand>) {
    let next_offset = updates.iter().map(|u| u.update_id + 1).max();

    let commands = updates
        .iter()
        .filter_map(|u| u.message.as_ref())
        .filter_map(|m| {
            let command = BotCommand::parse(m.text.as_deref()?)?;
            Some(IncomingCommand {
                chat_id: m.chat.id,
                command,
            })
        })
        .collect();

    (next_offset, commands)
}

/// Answer chat commands forever, reconnecting after transport errors
pub async fn run_bot(
    client: TelegramClient,
    tracker: PresenceTracker,
    tracked_apps: Vec<String>,
    settings: TelegramConfig,
) {
    let retry = Duration::from_secs(settings.retry_secs);
    let mut offset: Option<i64> = None;

    tracing::info!("Starting Telegram bot");

    loop {
        let updates = match client.get_updates(offset, settings.poll_timeout_secs).await {
            Ok(updates) => updates,
            Err(e) => {
                tracing::warn!("Telegram polling failed, reconnecting in {}s: {:#}", retry.as_secs(), e);
                tokio::time::sleep(retry).await;
                continue;
            }
        };

        let (next_offset, commands) = collect_commands(&updates);
        if next_offset.is_some() {
            offset = next_offset;
        }

        for incoming in commands {
            tracing::debug!(chat_id = incoming.chat_id, command = ?incoming.command, "Bot command");
            let text = commands::reply(incoming.command, &tracker, &tracked_apps);
            if let Err(e) = client.send_message(&incoming.chat_id.to_string(), &text).await {
                tracing::warn!("Failed to reply to chat {}: {:#}", incoming.chat_id, e);
            }
        }
    }
}
