use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable holding the Telegram bot token
pub const BOT_TOKEN_ENV: &str = "BOT_TOKEN";
/// Environment variable holding the chat that receives notifications
pub const CHAT_ID_ENV: &str = "CHAT_ID";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tracking: TrackingConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Process executable names, matched exactly
    #[serde(default = "default_apps")]
    pub apps: Vec<String>,
}

fn default_apps() -> Vec<String> {
    ["game.exe", "steam.exe", "minecraft.exe"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            apps: default_apps(),
        }
    }
}

impl TrackingConfig {
    pub fn tracked_names(&self) -> HashSet<String> {
        self.apps.iter().cloned().collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_poll_interval")]
    pub interval_secs: u64,
    /// Sleep after a failed snapshot before trying again
    #[serde(default = "default_error_backoff")]
    pub error_backoff_secs: u64,
}

fn default_poll_interval() -> u64 {
    5
}

fn default_error_backoff() -> u64 {
    10
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_poll_interval(),
            error_backoff_secs: default_error_backoff(),
        }
    }
}

impl PollingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn error_backoff(&self) -> Duration {
        Duration::from_secs(self.error_backoff_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Usually supplied through `BOT_TOKEN` instead of the file
    #[serde(default)]
    pub token: Option<String>,
    /// Usually supplied through `CHAT_ID` instead of the file
    #[serde(default)]
    pub chat_id: Option<String>,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Long-poll timeout passed to getUpdates
    #[serde(default = "default_long_poll")]
    pub poll_timeout_secs: u64,
    /// Pause before reconnecting after a failed getUpdates
    #[serde(default = "default_retry")]
    pub retry_secs: u64,
}

fn default_api_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_long_poll() -> u64 {
    30
}

fn default_retry() -> u64 {
    30
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: None,
            chat_id: None,
            api_url: default_api_url(),
            poll_timeout_secs: default_long_poll(),
            retry_secs: default_retry(),
        }
    }
}

impl Config {
    /// Let `BOT_TOKEN` / `CHAT_ID` override whatever the file says.
    /// Blank values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(token) = non_blank(BOT_TOKEN_ENV) {
            self.telegram.token = Some(token);
        }
        if let Some(chat_id) = non_blank(CHAT_ID_ENV) {
            self.telegram.chat_id = Some(chat_id);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.tracking.apps.iter().all(|a| a.trim().is_empty()) {
            anyhow::bail!("No applications configured under [tracking].apps");
        }
        if self.polling.interval_secs == 0 {
            anyhow::bail!("polling.interval_secs must be at least 1");
        }
        if self.polling.error_backoff_secs == 0 {
            anyhow::bail!("polling.error_backoff_secs must be at least 1");
        }
        if self.telegram.retry_secs == 0 {
            anyhow::bail!("telegram.retry_secs must be at least 1");
        }
        Ok(())
    }
}

pub fn config_dir() -> Result<PathBuf> {
    let dir = directories::ProjectDirs::from("", "", "playwatch")
        .context("Could not determine config directory")?
        .config_dir()
        .to_path_buf();
    Ok(dir)
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

pub fn parse(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Load the config file, then apply environment overrides.
///
/// An explicit `path` must exist. Without one, a missing default file just
/// means built-in defaults.
pub fn load(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(p) => {
            if !p.exists() {
                anyhow::bail!("Config file not found at {}", p.display());
            }
            Some(p.to_path_buf())
        }
        None => default_config_path().ok().filter(|p| p.exists()),
    };

    let mut config = match path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            parse(&content)
                .with_context(|| format!("Failed to parse config from {}", path.display()))?
        }
        None => {
            tracing::info!("No config file found, using defaults");
            Config::default()
        }
    };

    config.apply_env(|key| std::env::var(key).ok());
    Ok(config)
}

pub async fn init_wizard() -> Result<()> {
    use std::io::{self, Write};

    println!("playwatch Configuration Wizard");
    println!("==============================\n");

    let config_path = default_config_path()?;
    if config_path.exists() {
        print!("Config already exists at {}. Overwrite? [y/N] ", config_path.display());
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    print!(
        "Applications to track, comma separated (Enter for {}): ",
        default_apps().join(", ")
    );
    io::stdout().flush()?;
    let mut apps = String::new();
    io::stdin().read_line(&mut apps)?;

    print!("Telegram bot token (optional, or set {}): ", BOT_TOKEN_ENV);
    io::stdout().flush()?;
    let mut token = String::new();
    io::stdin().read_line(&mut token)?;

    print!("Telegram chat id for notifications (optional, or set {}): ", CHAT_ID_ENV);
    io::stdout().flush()?;
    let mut chat_id = String::new();
    io::stdin().read_line(&mut chat_id)?;

    let apps: Vec<String> = apps
        .split(',')
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .collect();

    let optional = |s: &str| {
        let s = s.trim();
        if s.is_empty() {
            None
        } else {
            Some(s.to_string())
        }
    };

    let config = Config {
        tracking: TrackingConfig {
            apps: if apps.is_empty() { default_apps() } else { apps },
        },
        polling: PollingConfig::default(),
        telegram: TelegramConfig {
            token: optional(&token),
            chat_id: optional(&chat_id),
            ..TelegramConfig::default()
        },
    };

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Write config with restricted permissions
    let content = toml::to_string_pretty(&config)?;
    std::fs::write(&config_path, content)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&config_path, std::fs::Permissions::from_mode(0o600))?;
    }

    println!("\nConfig saved to {}", config_path.display());
    println!("Run `playwatch` to start tracking.");

    Ok(())
}
