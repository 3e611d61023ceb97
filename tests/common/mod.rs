//! Common test fixtures

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

use funding_bot::{Coin, PaperChain, PositionRecord};

pub const TRADER: &str = "test-trader";

/// A paper chain with one market whose mark price sits 25% above the
/// oracle index (mark 125 vs index 100), big enough that the corrective
/// short is significant.
pub async fn diverged_chain() -> Arc<PaperChain> {
    let chain = Arc::new(PaperChain::new());
    chain
        .add_market("ubtc:unusd", dec!(10000), dec!(10000), dec!(125), dec!(100))
        .await;
    chain
        .set_wallet(vec![Coin::new("unusd", dec!(100000))])
        .await;
    chain
}

/// A paper chain with one balanced market (mark == index): nothing to do.
pub async fn balanced_chain() -> Arc<PaperChain> {
    let chain = Arc::new(PaperChain::new());
    chain
        .add_market("ubtc:unusd", dec!(10000), dec!(10000), dec!(100), dec!(100))
        .await;
    chain
        .set_wallet(vec![Coin::new("unusd", dec!(100000))])
        .await;
    chain
}

pub fn position(pair: &str, size: Decimal, pnl: Decimal) -> PositionRecord {
    PositionRecord {
        pair: pair.to_string(),
        size,
        unrealized_pnl: pnl,
        trader: TRADER.to_string(),
    }
}
