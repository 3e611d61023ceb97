//! Trade-action classifier
//!
//! Maps (quote-to-move, quote reserve, position stats) to one of the four
//! trade actions through a first-match decision table. The table order is
//! load-bearing: a position that is against the market never reaches the
//! close-and-open rule, even when its PnL would satisfy it, because the
//! close-only rule is checked first. Do not reorder.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::strategy::quote::is_insignificant;
use crate::strategy::types::{PositionStats, TradeAction};

/// Inputs to one classification, bundled so the table predicates share a
/// single signature.
#[derive(Debug, Clone)]
pub struct DecisionInputs<'a> {
    /// Signed corrective notional from the calculator
    pub quote_to_move: Decimal,
    /// The market's pooled quote reserve
    pub quote_reserve: Decimal,
    /// Stats for the open position on this pair, if any
    pub stats: Option<&'a PositionStats>,
}

/// One (predicate, action) row of the decision table
pub struct DecisionRule {
    pub name: &'static str,
    pub applies: fn(&DecisionInputs) -> bool,
    pub action: TradeAction,
}

/// The ordered decision table. First matching rule wins; rules below a
/// match are never evaluated.
pub const DECISION_TABLE: &[DecisionRule] = &[
    // The live position is losing to funding and the corrective trade is
    // too small to be worth re-entering: exit only.
    DecisionRule {
        name: "close_losing_position",
        applies: |inputs| {
            let Some(stats) = inputs.stats else {
                return false;
            };
            is_insignificant(inputs.quote_to_move, inputs.quote_reserve)
                && stats.is_against_market
                && stats.market_delta > stats.index_price / dec!(10)
        },
        action: TradeAction::CloseOrder,
    },
    // No exposure yet and the corrective trade is large enough to take.
    DecisionRule {
        name: "open_on_divergence",
        applies: |inputs| {
            inputs.stats.is_none()
                && !is_insignificant(inputs.quote_to_move, inputs.quote_reserve)
        },
        action: TradeAction::OpenOrder,
    },
    // Position is favorable and has banked more than 10% of its size:
    // realize the profit and re-enter at the fresh notional.
    DecisionRule {
        name: "take_profit_and_reenter",
        applies: |inputs| {
            let Some(stats) = inputs.stats else {
                return false;
            };
            !stats.is_against_market && stats.unrealized_pnl > stats.size.abs() / dec!(10)
        },
        action: TradeAction::CloseAndOpenOrder,
    },
];

/// Classify the current cycle's state for one pair into a trade action.
///
/// `stats` is `Some` exactly when the trader holds an open position on the
/// pair. Falls through to `DontTrade` when no table rule matches.
pub fn classify(
    quote_to_move: Decimal,
    quote_reserve: Decimal,
    stats: Option<&PositionStats>,
) -> TradeAction {
    let inputs = DecisionInputs {
        quote_to_move,
        quote_reserve,
        stats,
    };

    DECISION_TABLE
        .iter()
        .find(|rule| (rule.applies)(&inputs))
        .map(|rule| rule.action)
        .unwrap_or(TradeAction::DontTrade)
}
