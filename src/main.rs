//! funding_bot - Main Entry Point
//!
//! Wires configuration, the snapshot store, and the run-loop FSM around
//! the trade engine. Ships with the paper-trading backend; a live chain
//! client plugs in through the same ChainQuery/ChainExecutor traits.

use std::sync::atomic::Ordering;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use funding_bot::common::channels::create_command_channel;
use funding_bot::{load_config, BotCommand, Engine, PaperChain, Runner, SnapshotStore};

/// CLI arguments for the bot
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Trader address used for position and balance queries
    #[arg(long, default_value = "paper-trader")]
    trader: String,

    /// Run against the in-process paper chain instead of a live network
    #[arg(long)]
    paper: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    dotenvy::dotenv().ok();

    let config = load_config(Some(&args.config))?;
    config.validate()?;
    info!(chain_id = %config.chain.chain_id, "starting funding bot");

    if !args.paper {
        anyhow::bail!("no live chain backend is wired in; run with --paper");
    }

    let chain = Arc::new(PaperChain::new());
    seed_paper_markets(&chain).await;

    let mut engine = Engine::new(Arc::clone(&chain), &args.trader)
        .with_leverage(Decimal::from(config.settings.leverage));
    if let Some(db) = &config.database {
        let store = SnapshotStore::connect(&db.url, db.max_connections).await?;
        engine = engine.with_store(store);
        info!(url = %db.url, "snapshot store attached");
    }

    let cancel = engine.cancel_handle();
    let (commands, command_rx) = create_command_channel();
    let runner = Runner::new(
        engine,
        command_rx,
        Duration::from_secs(config.settings.cycle_interval_seconds),
    );

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received shutdown signal");
            cancel.store(true, Ordering::Relaxed);
            let _ = commands.send(BotCommand::Stop).await;
        }
    });

    let engine = runner.run().await?;
    info!(
        final_value = ?engine.portfolio().total_value(),
        "bot stopped"
    );

    Ok(())
}

/// Seed the paper chain with two diverged localnet-style markets.
async fn seed_paper_markets(chain: &PaperChain) {
    // mark = quote/base * multiplier; both start 25% above index
    chain
        .add_market("ubtc:unusd", dec!(10000), dec!(10000), dec!(125), dec!(100))
        .await;
    chain
        .add_market("ueth:unusd", dec!(20000), dec!(20000), dec!(25), dec!(20))
        .await;
    chain
        .set_wallet(vec![funding_bot::Coin::new("unusd", dec!(100000))])
        .await;
}
