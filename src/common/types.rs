//! Core data types shared across the bot
//!
//! These are the per-cycle snapshots supplied by the chain query
//! collaborator. They are immutable within a cycle and carry no identity
//! across cycles beyond the pair key (e.g. `"ubtc:unusd"`).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single token amount, denominated by its denom string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: Decimal,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: Decimal) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }
}

impl std::fmt::Display for Coin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// Per-market snapshot of the AMM's pooled reserves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Pair key in `BASE:QUOTE` form
    pub pair: String,
    /// Pooled base-asset reserve
    pub base_reserve: Decimal,
    /// Pooled quote-asset reserve
    pub quote_reserve: Decimal,
    /// Multiplier applied to the raw reserve ratio to get the mark price
    pub price_multiplier: Decimal,
    /// Net open interest skew (long minus short)
    pub bias: Decimal,
}

impl MarketSnapshot {
    /// The AMM-implied price for this market.
    ///
    /// Reserve ratio scaled by the price multiplier; `None` when the base
    /// reserve is zero and the ratio is undefined.
    pub fn mark_price(&self) -> Option<Decimal> {
        if self.base_reserve.is_zero() {
            return None;
        }
        Some(self.quote_reserve / self.base_reserve * self.price_multiplier)
    }

    /// Quote denom of the pair (`"ubtc:unusd"` → `"unusd"`).
    ///
    /// Falls back to the whole pair string if the key is malformed.
    pub fn quote_denom(&self) -> &str {
        self.pair.split(':').nth(1).unwrap_or(&self.pair)
    }
}

/// Per-market snapshot of index (oracle) and mark (AMM) prices
///
/// Built by joining the markets query with the oracle query; a pair with
/// an oracle price but no matching market, or vice versa, is dropped
/// silently during the join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    pub pair: String,
    /// Oracle/reference spot price the market tracks
    pub index_price: Decimal,
    /// AMM-implied price
    pub mark_price: Decimal,
}

/// An open perp position held by the trader on one pair
///
/// Exists only while the position size is non-zero; replaced wholesale
/// each cycle, never diffed incrementally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionRecord {
    pub pair: String,
    /// Signed size: positive = long, negative = short
    pub size: Decimal,
    pub unrealized_pnl: Decimal,
    /// Address of the position holder
    pub trader: String,
}

/// Result of a broadcast transaction, as reported by the executor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxResult {
    pub tx_hash: String,
    /// Block height the transaction landed at
    pub height: i64,
}
