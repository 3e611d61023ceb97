//! Position-stat evaluator
//!
//! Derives the divergence metrics the classifier needs for a pair where a
//! position is currently open. Callers with no open position skip this
//! entirely and pass `None` downstream.

use rust_decimal::Decimal;

use crate::common::types::{PositionRecord, PriceSnapshot};
use crate::strategy::types::PositionStats;

/// Build the current-cycle stats for an open position.
pub fn position_stats(
    position: &PositionRecord,
    prices: &PriceSnapshot,
    price_multiplier: Decimal,
) -> PositionStats {
    let market_delta = (prices.mark_price - prices.index_price).abs() * price_multiplier;

    PositionStats {
        mark_price: prices.mark_price,
        index_price: prices.index_price,
        size: position.size,
        price_multiplier,
        market_delta,
        unrealized_pnl: position.unrealized_pnl,
        is_against_market: is_against_market(position.size, prices.mark_price, prices.index_price),
    }
}

/// True if the position is diverging the mark and index price — i.e. the
/// trader is paying funding on this position rather than receiving it.
pub fn is_against_market(size: Decimal, mark: Decimal, index: Decimal) -> bool {
    let market_long = mark > index;
    let pos_long = size > Decimal::ZERO;
    market_long != pos_long
}
