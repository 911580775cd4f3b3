use anyhow::Result;
use clap::Parser;
use playwatch::config;
use playwatch::events::spawn_dispatcher;
use playwatch::integrations::telegram::{self, TelegramClient};
use playwatch::monitor::Poller;
use playwatch::source::{filter_tracked, SnapshotSource, SystemProcesses};
use playwatch::tracker::PresenceTracker;
use playwatch::util::supervise;
use std::time::Duration;
use tokio::sync::oneshot;

#[derive(Parser, Debug)]
#[command(name = "playwatch")]
#[command(about = "Track how long configured applications run and report it over Telegram")]
#[command(version)]
struct Args {
    /// Initialize configuration
    #[arg(long)]
    init: bool,

    /// Path to config file
    #[arg(long, short)]
    config: Option<std::path::PathBuf>,

    /// Print the tracked applications running right now and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("playwatch=info".parse()?),
        )
        .init();

    if args.init {
        config::init_wizard().await?;
        return Ok(());
    }

    let config = config::load(args.config.as_deref())?;
    let tracked = config.tracking.tracked_names();

    if args.once {
        let mut source = SystemProcesses::new();
        let mut running: Vec<_> = filter_tracked(&source.list_process_names()?, &tracked)
            .into_iter()
            .collect();
        running.sort();
        if running.is_empty() {
            println!("No tracked applications running");
        }
        for name in running {
            println!("{}", name);
        }
        return Ok(());
    }

    let tracker = PresenceTracker::new();
    let events = Poller::new(
        SystemProcesses::new(),
        tracker.clone(),
        tracked,
        config.polling.clone(),
    )
    .start();

    let telegram = config.telegram.token.as_deref().map(|token| {
        TelegramClient::new(
            &config.telegram.api_url,
            token,
            config.telegram.chat_id.clone(),
        )
    });

    match telegram {
        Some(client) => {
            if client.chat_id().is_none() {
                tracing::warn!(
                    "{} not set, start/stop notifications will only be logged",
                    config::CHAT_ID_ENV
                );
            }
            spawn_dispatcher(events, Some(client.clone()));
            let tracker = tracker.clone();
            let apps = config.tracking.apps.clone();
            let settings = config.telegram.clone();
            let restart_delay = Duration::from_secs(settings.retry_secs);
            tokio::spawn(supervise("Telegram bot", restart_delay, move || {
                telegram::run_bot(
                    client.clone(),
                    tracker.clone(),
                    apps.clone(),
                    settings.clone(),
                )
            }));
        }
        None => {
            tracing::warn!(
                "{} not set, Telegram bot disabled; events will only be logged",
                config::BOT_TOKEN_ENV
            );
            spawn_dispatcher::<TelegramClient>(events, None);
        }
    }

    tracing::info!("Tracking {}", config.tracking.apps.join(", "));
    println!("playwatch running. Type 'exit' to quit.");

    tokio::select! {
        _ = exit_requested() => {}
        result = tokio::signal::ctrl_c() => result?,
    }

    println!("Shutting down...");
    Ok(())
}

/// Resolves once `exit` is typed on stdin.
///
/// Reads on a plain thread so a pending read never holds up runtime shutdown.
/// If stdin closes first, this never resolves and Ctrl-C is the only way out.
async fn exit_requested() {
    let (tx, rx) = oneshot::channel::<()>();

    std::thread::spawn(move || {
        let mut line = String::new();
        loop {
            line.clear();
            match std::io::stdin().read_line(&mut line) {
                Ok(0) | Err(_) => return,
                Ok(_) if line.trim().eq_ignore_ascii_case("exit") => {
                    let _ = tx.send(());
                    return;
                }
                Ok(_) => {}
            }
        }
    });

    if rx.await.is_err() {
        std::future::pending::<()>().await;
    }
}
