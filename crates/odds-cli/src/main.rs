//! odds: console front-end for "What are the odds?" challenges.
//!
//! Reads interactions from stdin, one per line, and prints what a chat
//! channel would show. All game state lives in the odds-core manager.

mod config;
mod console;
mod handlers;
mod render;

use clap::Parser;
use config::{OddsConfig, Overrides};
use console::ConsoleCommand;
use handlers::{Audience, OddsBot, Reply};
use odds_core::{ExpireReason, GameManager, Scope, Session};
use std::io::BufRead;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// odds — What are the odds? challenge bot (console edition)
#[derive(Parser, Debug)]
#[command(name = "odds", version, about = "What are the odds? challenge bot (console edition)")]
struct Cli {
    /// Config file path
    #[arg(long, default_value = "~/.odds/config.toml")]
    config: String,

    /// Game timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Smallest allowed max
    #[arg(long)]
    min_max: Option<u32>,

    /// Largest allowed max
    #[arg(long)]
    max_max: Option<u32>,

    /// Server id used as the game scope
    #[arg(long, default_value = "console")]
    guild: String,

    /// Channel id used as the game scope
    #[arg(long, default_value = "general")]
    channel: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    use tracing_subscriber::EnvFilter;
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let overrides = Overrides {
        timeout_ms: cli.timeout_ms,
        min_max: cli.min_max,
        max_max: cli.max_max,
    };
    let config = match OddsConfig::load(&PathBuf::from(&cli.config), &overrides) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(error = %format!("{e:#}"), "failed to load config");
            std::process::exit(1);
        }
    };

    info!(
        version = env!("CARGO_PKG_VERSION"),
        timeout_ms = config.timeout.as_millis() as u64,
        guild = %cli.guild,
        channel = %cli.channel,
        "starting odds"
    );

    let (expired_tx, expired_rx) = mpsc::unbounded_channel::<(Session, ExpireReason)>();
    let manager = GameManager::new(config.timeout, move |session, reason| {
        let tx = expired_tx.clone();
        async move {
            tx.send((session, reason))
                .map_err(|e| anyhow::anyhow!("console loop stopped: {e}"))
        }
    });
    let bot = OddsBot::new(
        manager.clone(),
        config.limits,
        Scope::new(cli.guild, cli.channel),
    );

    run_console(&bot, expired_rx).await;

    manager.shutdown().await;
    info!("odds stopped");
}

/// Drive the bot from stdin until `quit`, EOF, or Ctrl-C.
async fn run_console(bot: &OddsBot, mut expired_rx: mpsc::UnboundedReceiver<(Session, ExpireReason)>) {
    let mut lines = spawn_stdin_reader();
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("received shutdown signal");
                break;
            }
            Some((session, reason)) = expired_rx.recv() => {
                print_replies(&bot.expired(&session, reason));
            }
            line = lines.recv() => {
                let Some(line) = line else {
                    break;
                };
                let command = match console::parse_line(&line) {
                    Ok(Some(command)) => command,
                    Ok(None) => continue,
                    Err(e) => {
                        println!("error: {e}");
                        continue;
                    }
                };
                let replies = match command {
                    ConsoleCommand::Quit => break,
                    ConsoleCommand::Help => {
                        println!("{}", console::USAGE);
                        continue;
                    }
                    ConsoleCommand::Odds { user, target, max, prompt } => {
                        bot.odds(&user, &target, max, &prompt).await
                    }
                    ConsoleCommand::Click { user, custom_id } => bot.click(&user, &custom_id).await,
                    ConsoleCommand::Submit { user, custom_id, raw_pick } => {
                        bot.submit(&user, &custom_id, &raw_pick).await
                    }
                };
                print_replies(&replies);
            }
        }
    }
}

/// Read stdin on a plain thread; a blocking read cannot be cancelled, so it
/// must not hold up runtime shutdown.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "failed to read stdin");
                    break;
                }
            }
        }
    });
    rx
}

fn print_replies(replies: &[Reply]) {
    for reply in replies {
        match &reply.audience {
            Audience::Channel => println!("[#channel] {}", reply.text),
            Audience::User(user) => println!("[to {user}] {}", reply.text),
        }
    }
}
