//! Error types for the bot

use rust_decimal::Decimal;
use thiserror::Error;

/// Result type alias using our BotError
pub type Result<T> = std::result::Result<T, BotError>;

/// Main error type for bot operations
#[derive(Error, Debug)]
pub enum BotError {
    /// Index/mark ratio was non-positive, so the corrective notional is
    /// undefined. The affected pair is skipped for the cycle; never fatal.
    #[error("invalid index/mark price ratio {ratio} for pair {pair}")]
    InvalidPriceRatio { pair: String, ratio: Decimal },

    /// Unknown trade-action discriminant. Unreachable with the closed
    /// enum; can only surface when decoding persisted trade-log rows.
    #[error("invalid trade action kind: {0}")]
    InvalidActionKind(i64),

    /// Chain query errors (markets, prices, positions, balances, height)
    #[error("chain query error: {0}")]
    Query(String),

    /// Transaction execution errors (open/close broadcast)
    #[error("trade execution error: {0}")]
    Execution(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Snapshot store errors
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// JSON serialization errors (snapshot export)
    #[error("JSON error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Channel send errors
    #[error("channel send error: {0}")]
    ChannelSend(String),
}
