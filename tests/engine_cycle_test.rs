//! Integration tests for the full trade cycle against the paper chain

mod common;

use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use std::sync::Arc;

use funding_bot::{ChainQuery, Coin, Engine, PaperChain, SnapshotStore, TradeAction};

use common::{balanced_chain, diverged_chain, position, TRADER};

#[tokio::test]
async fn test_cycle_opens_short_on_overpriced_market() {
    let chain = diverged_chain().await;
    let mut engine = Engine::new(Arc::clone(&chain), TRADER);

    let report = engine.run_cycle().await.unwrap();

    assert_eq!(report.outcomes.len(), 1);
    let outcome = &report.outcomes[0];
    assert_eq!(outcome.pair, "ubtc:unusd");
    assert_eq!(outcome.action, TradeAction::OpenOrder);
    // Mark above index: corrective trade is a net quote outflow
    assert!(outcome.quote_to_move < dec!(0));

    // The executor saw the trade: a short position now exists on chain
    let positions = chain.positions(TRADER).await.unwrap();
    assert_eq!(positions.len(), 1);
    assert!(positions[0].size < dec!(0));

    // And the ledger booked the absolute rounded notional
    let traded = &engine.portfolio().balances.traded_balances["ubtc:unusd"];
    assert_eq!(traded.denom, "unusd");
    assert_eq!(traded.amount, outcome.quote_to_move.round().abs());
}

#[tokio::test]
async fn test_cycle_is_noop_when_prices_agree() {
    let chain = balanced_chain().await;
    let mut engine = Engine::new(Arc::clone(&chain), TRADER);

    let report = engine.run_cycle().await.unwrap();

    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(report.outcomes[0].action, TradeAction::DontTrade);
    assert_eq!(report.outcomes[0].quote_to_move, dec!(0));
    assert!(chain.positions(TRADER).await.unwrap().is_empty());
    assert!(engine.portfolio().balances.traded_balances.is_empty());
}

#[tokio::test]
async fn test_invalid_oracle_price_skips_pair_not_cycle() {
    let chain = diverged_chain().await;
    // Second market with a broken oracle price
    chain
        .add_market("ueth:unusd", dec!(10000), dec!(10000), dec!(25), dec!(-1))
        .await;
    let mut engine = Engine::new(Arc::clone(&chain), TRADER);

    let report = engine.run_cycle().await.unwrap();

    // The bad pair is skipped; the good one still trades
    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(report.outcomes[0].pair, "ubtc:unusd");
    assert_eq!(report.outcomes[0].action, TradeAction::OpenOrder);
}

#[tokio::test]
async fn test_cycle_closes_position_losing_to_funding() {
    // Small divergence (insignificant corrective trade), short position
    // against a market whose mark sits above index, delta 101 > 100/10.
    let chain = Arc::new(PaperChain::new());
    chain
        .add_market("ubtc:unusd", dec!(10000), dec!(10000), dec!(101), dec!(100))
        .await;
    chain.set_position(position("ubtc:unusd", dec!(-50), dec!(0))).await;
    let mut engine = Engine::new(Arc::clone(&chain), TRADER);

    let report = engine.run_cycle().await.unwrap();

    assert_eq!(report.outcomes[0].action, TradeAction::CloseOrder);
    assert!(chain.positions(TRADER).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_cycle_flips_profitable_position() {
    // Prices agree, so the corrective trade is insignificant; the open
    // short is favorable and has banked pnl 1000 > |-100|/10.
    let chain = balanced_chain().await;
    chain
        .set_position(position("ubtc:unusd", dec!(-100), dec!(1000)))
        .await;
    let mut engine = Engine::new(Arc::clone(&chain), TRADER);

    let report = engine.run_cycle().await.unwrap();

    assert_eq!(report.outcomes[0].action, TradeAction::CloseAndOpenOrder);
}

#[tokio::test]
async fn test_cycle_persists_snapshots_and_trades() {
    let chain = diverged_chain().await;
    let store = SnapshotStore::in_memory().await.unwrap();
    let mut engine = Engine::new(Arc::clone(&chain), TRADER).with_store(store.clone());

    let report = engine.run_cycle().await.unwrap();
    let height = report.block_height;

    assert_eq!(store.amm_snapshots_by_block(height).await.unwrap().len(), 1);
    assert_eq!(
        store.price_snapshots_by_block(height).await.unwrap().len(),
        1
    );
    assert_eq!(store.balance_snapshots().await.unwrap().len(), 1);

    let trades = store.trade_log().await.unwrap();
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].trade_action().unwrap(), TradeAction::OpenOrder);
    assert_eq!(trades[0].pair, "ubtc:unusd");
}

#[tokio::test]
async fn test_close_all_positions_returns_ledger_to_wallet() {
    let chain = diverged_chain().await;
    let mut engine = Engine::new(Arc::clone(&chain), TRADER);

    engine.run_cycle().await.unwrap();
    let opened: Coin = engine.portfolio().balances.traded_balances["ubtc:unusd"].clone();
    assert!(opened.amount > dec!(0));

    engine.close_all_positions().await.unwrap();

    assert!(chain.positions(TRADER).await.unwrap().is_empty());
    let traded = &engine.portfolio().balances.traded_balances["ubtc:unusd"];
    assert_eq!(traded.amount, dec!(0));
    // The close handed the coin back to the wallet as a separate entry
    assert!(engine
        .portfolio()
        .balances
        .wallet_coins
        .iter()
        .any(|coin| *coin == opened));
}
