//! funding_bot
//!
//! A market-neutral funding-rate arbitrage bot for perpetual-futures
//! AMMs. Watches the divergence between each market's mark price and its
//! oracle index price, then opens, closes, or flips a 1x position to
//! profit from (and dampen) that divergence while keeping a local ledger
//! of traded vs. liquid balances.

pub mod chain;
pub mod common;
pub mod config;
pub mod db;
pub mod engine;
pub mod portfolio;
pub mod strategy;

// Re-export commonly used types
pub use chain::{ChainExecutor, ChainQuery, PaperChain};
pub use common::errors::{BotError, Result};
pub use common::types::{Coin, MarketSnapshot, PositionRecord, PriceSnapshot, TxResult};
pub use config::{load_config, load_from_env, BotConfig};
pub use db::SnapshotStore;
pub use engine::runner::{BotCommand, RunState, Runner};
pub use engine::{CycleReport, Engine, PairOutcome};
pub use portfolio::{Portfolio, PortfolioBalances};
pub use strategy::{
    classify, is_against_market, is_insignificant, position_stats, quote_needed_to_move_price,
    PositionStats, TradeAction, TradeSide,
};
