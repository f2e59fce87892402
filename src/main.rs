//! desk-guard - workstation guard controlled through a Telegram bot.
//!
//! Loads `config.json`, connects the bot and serves commands until Ctrl+C.

use desk_guard::bot::TelegramBot;
use desk_guard::config::Config;
use desk_guard::context::AppContext;
use desk_guard::dispatcher::Dispatcher;
use desk_guard::monitor::WatcherConfig;
use desk_guard::platform::{NativeCursor, NativeScreen};
use futures::StreamExt;
use std::pin::pin;
use std::sync::Arc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("desk_guard=info")),
        )
        .init();

    println!("╔════════════════════════════════════════════════════════════╗");
    println!("║              desk-guard - Workstation Guard                ║");
    println!("╚════════════════════════════════════════════════════════════╝");
    println!();

    println!("🔧 Loading configuration...");
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load configuration");
            return Err(e.into());
        }
    };
    println!(
        "   ✓ Cursor check interval: {}ms",
        config.check_interval.as_millis()
    );

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run(config, runtime.handle().clone()))?;

    println!("\n👋 desk-guard has exited. Goodbye!");
    Ok(())
}

async fn run(
    config: Config,
    handle: tokio::runtime::Handle,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔧 Connecting to Telegram...");
    let bot = Arc::new(TelegramBot::new(
        &config.bot_token,
        &config.api_url,
        config.poll_timeout,
    )?);
    let me = match bot.get_me().await {
        Ok(me) => me,
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize bot");
            return Err(e.into());
        }
    };
    tracing::info!("Authorized on account {}", me.display_name());
    println!("   ✓ Authorized as {}", me.display_name());

    println!("🔧 Initializing platform backends...");
    let screen = Arc::new(NativeScreen::new()?);
    let cursor = Arc::new(NativeCursor::new()?);
    println!("   ✓ Platform ready");

    let ctx = Arc::new(AppContext::new(
        Arc::clone(&bot),
        screen,
        cursor,
        WatcherConfig {
            interval: config.check_interval,
            start_position: config.guard_start,
        },
        config.lock_grace,
        handle,
    ));
    let dispatcher = Dispatcher::new(Arc::clone(&ctx));

    // Shutdown signal
    let (shutdown_tx, mut shutdown_rx) = tokio::sync::watch::channel(false);
    ctrlc::set_handler(move || {
        println!("\n🛑 Shutdown signal received...");
        let _ = shutdown_tx.send(true);
    })?;

    println!();
    println!("════════════════════════════════════════════════════════════════");
    println!("🎯 desk-guard is running!");
    println!("   • Send /start to the bot for the command menu");
    println!("   • Press Ctrl+C to quit");
    println!("════════════════════════════════════════════════════════════════");
    println!();

    let mut commands = pin!(Arc::clone(&bot).commands());
    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => break,
            next = commands.next() => {
                let Some(command) = next else {
                    tracing::warn!("Update stream closed");
                    break;
                };
                if let Err(e) = dispatcher.dispatch(&command).await {
                    tracing::warn!(chat_id = command.chat.0, error = %e, "Failed to handle command");
                }
            }
        }
    }

    println!("\n⏳ Shutting down...");
    if ctx.watcher.is_running() {
        let watcher = Arc::clone(&ctx.watcher);
        tokio::task::spawn_blocking(move || watcher.stop()).await??;
    }

    Ok(())
}
