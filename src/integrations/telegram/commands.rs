//! Chat commands understood by the bot

use crate::tracker::PresenceTracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    Start,
    Status,
    Stats,
    Help,
}

impl BotCommand {
    /// Parse the first word of a message, e.g. `/stats` or `/stats@my_bot now`.
    /// Anything that isn't one of our commands yields `None`.
    pub fn parse(text: &str) -> Option<Self> {
        let word = text.split_whitespace().next()?;
        let command = word.strip_prefix('/')?;
        let command = command.split('@').next().unwrap_or(command);

        match command.to_ascii_lowercase().as_str() {
            "start" => Some(Self::Start),
            "status" => Some(Self::Status),
            "stats" => Some(Self::Stats),
            "help" => Some(Self::Help),
            _ => None,
        }
    }
}

pub fn welcome_text() -> String {
    "🎮 Welcome to playwatch!\n\n\
     This bot tracks how long your games run and keeps play time statistics.\n\n\
     📋 Commands:\n\
     /start - Show this message\n\
     /status - Games running right now\n\
     /stats - Full play time statistics\n\
     /help - Command reference\n\n\
     🔔 You'll get a notification whenever a game starts or closes."
        .to_string()
}

pub fn help_text(tracked_apps: &[String]) -> String {
    let mut text = String::from(
        "📚 Command reference:\n\n\
         🔹 /start - Welcome message\n\
         🔹 /status - Running games and their current session time\n\
         🔹 /stats - Play time statistics (completed + running)\n\
         🔹 /help - This reference\n\n\
         🔔 Automatic notifications:\n\
         • when a game starts\n\
         • when a game closes, with the session time\n\n\
         🛠 Tracked applications:\n",
    );
    for app in tracked_apps {
        text.push_str("• ");
        text.push_str(app);
        text.push('\n');
    }
    text
}

/// Build the reply for a command
pub fn reply(command: BotCommand, tracker: &PresenceTracker, tracked_apps: &[String]) -> String {
    match command {
        BotCommand::Start => welcome_text(),
        BotCommand::Status => tracker.status_report(),
        BotCommand::Stats => tracker.statistics_report(),
        BotCommand::Help => help_text(tracked_apps),
    }
}
