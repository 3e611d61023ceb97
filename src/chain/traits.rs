//! Collaborator traits for the chain client
//!
//! The only seam between the decision core and the chain SDK. The bot
//! never constructs or signs transactions itself; implementations own
//! retry and timeout policy for their network calls.

use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::common::errors::Result;
use crate::common::types::{Coin, MarketSnapshot, PositionRecord, TxResult};
use crate::strategy::TradeSide;

/// Read-only chain queries, refreshed once per cycle
#[async_trait]
pub trait ChainQuery: Send + Sync {
    /// All perp markets with their current AMM reserves
    async fn markets(&self) -> Result<Vec<MarketSnapshot>>;

    /// Oracle exchange rates, keyed by pair
    async fn oracle_prices(&self) -> Result<HashMap<String, Decimal>>;

    /// Open positions held by `trader`
    async fn positions(&self, trader: &str) -> Result<Vec<PositionRecord>>;

    /// Liquid wallet balances of `trader`
    async fn wallet_balances(&self, trader: &str) -> Result<Vec<Coin>>;

    /// Latest block height, used only to tag persisted snapshots
    async fn block_height(&self) -> Result<i64>;
}

/// Transaction execution against the chain
///
/// Calls block until the transaction is accepted or rejected by the
/// network; the engine treats them as its only suspension points.
#[async_trait]
pub trait ChainExecutor: Send + Sync {
    /// Open a position for `trader` on `pair` sized at `quote_amount`
    async fn open_position(
        &self,
        trader: &str,
        pair: &str,
        side: TradeSide,
        quote_amount: Decimal,
        leverage: Decimal,
    ) -> Result<TxResult>;

    /// Close the trader's position on `pair` entirely (market order)
    async fn close_position(&self, trader: &str, pair: &str) -> Result<TxResult>;
}
