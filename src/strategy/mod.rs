//! Trade-decision core
//!
//! Pure computation, one market at a time:
//!
//! ```text
//! PriceSnapshot ─┐
//!                ▼
//!   quote_needed_to_move_price()      (quote.rs)
//!                │
//!                ▼
//!   classify() over DECISION_TABLE    (classifier.rs)
//!       │    with Option<PositionStats> from position_stats() (stats.rs)
//!       ▼
//!   TradeAction → engine dispatch
//! ```
//!
//! Nothing here talks to the chain: the calculator and classifier return
//! values that the engine interprets. All state they see arrives as
//! arguments and dies with the cycle.

mod classifier;
mod quote;
mod stats;
mod types;

pub use classifier::{classify, DecisionInputs, DecisionRule, DECISION_TABLE};
pub use quote::{is_insignificant, quote_needed_to_move_price};
pub use stats::{is_against_market, position_stats};
pub use types::{PositionStats, TradeAction, TradeSide};
