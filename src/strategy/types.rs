//! Strategy decision types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::common::errors::BotError;

/// Action the bot takes on one pair in one cycle
///
/// Pure output of the classifier; logged for audit but never persisted as
/// state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeAction {
    /// Open a new position at the freshly computed notional
    OpenOrder,
    /// Close the existing position entirely
    CloseOrder,
    /// Close the existing position, then re-enter at the fresh notional
    CloseAndOpenOrder,
    /// No external call this cycle
    DontTrade,
}

impl TradeAction {
    /// Stable discriminant used by the trade log table
    pub fn as_i64(self) -> i64 {
        match self {
            TradeAction::OpenOrder => 0,
            TradeAction::CloseOrder => 1,
            TradeAction::CloseAndOpenOrder => 2,
            TradeAction::DontTrade => 3,
        }
    }
}

impl TryFrom<i64> for TradeAction {
    type Error = BotError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(TradeAction::OpenOrder),
            1 => Ok(TradeAction::CloseOrder),
            2 => Ok(TradeAction::CloseAndOpenOrder),
            3 => Ok(TradeAction::DontTrade),
            other => Err(BotError::InvalidActionKind(other)),
        }
    }
}

impl std::fmt::Display for TradeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeAction::OpenOrder => write!(f, "open"),
            TradeAction::CloseOrder => write!(f, "close"),
            TradeAction::CloseAndOpenOrder => write!(f, "close_and_open"),
            TradeAction::DontTrade => write!(f, "dont_trade"),
        }
    }
}

/// Position side, derived from the sign of a notional or size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeSide {
    Long,
    Short,
}

impl TradeSide {
    /// Positive ⇒ long, negative or zero ⇒ short
    pub fn from_notional(notional: Decimal) -> Self {
        if notional > Decimal::ZERO {
            TradeSide::Long
        } else {
            TradeSide::Short
        }
    }
}

impl std::fmt::Display for TradeSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeSide::Long => write!(f, "long"),
            TradeSide::Short => write!(f, "short"),
        }
    }
}

/// Divergence metrics for a pair where a position is currently open
///
/// Recomputed every cycle from the position, price, and market snapshots;
/// never stored. A pair with no open position has no stats at all — the
/// classifier takes `Option<&PositionStats>` so that "no position" is a
/// distinct state rather than a zero-filled struct.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionStats {
    pub mark_price: Decimal,
    pub index_price: Decimal,
    /// Signed position size: positive = long, negative = short
    pub size: Decimal,
    pub price_multiplier: Decimal,
    /// `|mark - index| * price_multiplier`, always >= 0
    pub market_delta: Decimal,
    pub unrealized_pnl: Decimal,
    /// True when the trader is paying funding rather than receiving it
    pub is_against_market: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_action_discriminant_round_trip() {
        for action in [
            TradeAction::OpenOrder,
            TradeAction::CloseOrder,
            TradeAction::CloseAndOpenOrder,
            TradeAction::DontTrade,
        ] {
            assert_eq!(TradeAction::try_from(action.as_i64()).unwrap(), action);
        }
    }

    #[test]
    fn test_unknown_action_discriminant() {
        let err = TradeAction::try_from(42).unwrap_err();
        assert!(matches!(err, BotError::InvalidActionKind(42)));
    }

    #[test]
    fn test_side_from_notional() {
        assert_eq!(TradeSide::from_notional(dec!(1)), TradeSide::Long);
        assert_eq!(TradeSide::from_notional(dec!(-1)), TradeSide::Short);
        // Zero notional opens short, matching the original sign convention
        assert_eq!(TradeSide::from_notional(dec!(0)), TradeSide::Short);
    }
}
