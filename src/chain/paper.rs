//! Paper-trading chain backend
//!
//! An in-process implementation of [`ChainQuery`] and [`ChainExecutor`]
//! over a simulated constant-product AMM. Serves as the `--paper` mode
//! backend and as the test double for the engine: opening a position
//! shifts the simulated reserves the way a real fill would, so a
//! corrective trade visibly moves the mark price toward the index.

use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use tracing::debug;

use crate::chain::traits::{ChainExecutor, ChainQuery};
use crate::common::errors::{BotError, Result};
use crate::common::types::{Coin, MarketSnapshot, PositionRecord, TxResult};
use crate::strategy::TradeSide;

#[derive(Debug, Clone)]
struct PaperMarket {
    market: MarketSnapshot,
    index_price: Decimal,
}

#[derive(Debug, Default)]
struct PaperState {
    markets: HashMap<String, PaperMarket>,
    positions: HashMap<String, PositionRecord>,
    wallet: Vec<Coin>,
    height: i64,
    tx_counter: u64,
}

/// Simulated chain shared behind an async lock
#[derive(Debug, Default)]
pub struct PaperChain {
    state: RwLock<PaperState>,
}

impl PaperChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a market with its reserves and oracle price.
    pub async fn add_market(
        &self,
        pair: &str,
        base_reserve: Decimal,
        quote_reserve: Decimal,
        price_multiplier: Decimal,
        index_price: Decimal,
    ) {
        let mut state = self.state.write().await;
        state.markets.insert(
            pair.to_string(),
            PaperMarket {
                market: MarketSnapshot {
                    pair: pair.to_string(),
                    base_reserve,
                    quote_reserve,
                    price_multiplier,
                    bias: Decimal::ZERO,
                },
                index_price,
            },
        );
    }

    /// Move the oracle price for a pair.
    pub async fn set_index_price(&self, pair: &str, index_price: Decimal) {
        let mut state = self.state.write().await;
        if let Some(entry) = state.markets.get_mut(pair) {
            entry.index_price = index_price;
        }
    }

    /// Seed the trader's liquid wallet.
    pub async fn set_wallet(&self, coins: Vec<Coin>) {
        self.state.write().await.wallet = coins;
    }

    /// Inject a position directly, for scenarios that start mid-trade.
    pub async fn set_position(&self, position: PositionRecord) {
        let mut state = self.state.write().await;
        state.positions.insert(position.pair.clone(), position);
    }

    fn next_tx(state: &mut PaperState) -> TxResult {
        state.tx_counter += 1;
        state.height += 1;
        TxResult {
            tx_hash: format!("PAPER-{:08}", state.tx_counter),
            height: state.height,
        }
    }
}

#[async_trait]
impl ChainQuery for PaperChain {
    async fn markets(&self) -> Result<Vec<MarketSnapshot>> {
        let state = self.state.read().await;
        let mut markets: Vec<MarketSnapshot> =
            state.markets.values().map(|m| m.market.clone()).collect();
        markets.sort_by(|a, b| a.pair.cmp(&b.pair));
        Ok(markets)
    }

    async fn oracle_prices(&self) -> Result<HashMap<String, Decimal>> {
        let state = self.state.read().await;
        Ok(state
            .markets
            .iter()
            .map(|(pair, m)| (pair.clone(), m.index_price))
            .collect())
    }

    async fn positions(&self, trader: &str) -> Result<Vec<PositionRecord>> {
        let state = self.state.read().await;
        Ok(state
            .positions
            .values()
            .filter(|p| p.trader == trader && !p.size.is_zero())
            .cloned()
            .collect())
    }

    async fn wallet_balances(&self, _trader: &str) -> Result<Vec<Coin>> {
        Ok(self.state.read().await.wallet.clone())
    }

    async fn block_height(&self) -> Result<i64> {
        Ok(self.state.read().await.height)
    }
}

#[async_trait]
impl ChainExecutor for PaperChain {
    async fn open_position(
        &self,
        trader: &str,
        pair: &str,
        side: TradeSide,
        quote_amount: Decimal,
        _leverage: Decimal,
    ) -> Result<TxResult> {
        let mut state = self.state.write().await;

        let entry = state
            .markets
            .get_mut(pair)
            .ok_or_else(|| BotError::Execution(format!("unknown market {pair}")))?;
        let mark = entry
            .market
            .mark_price()
            .ok_or_else(|| BotError::Execution(format!("market {pair} has no mark price")))?;

        let signed_quote = match side {
            TradeSide::Long => quote_amount.abs(),
            TradeSide::Short => -quote_amount.abs(),
        };

        // Constant-product fill: quote reserve shifts by the notional,
        // base reserve follows k.
        let k = entry.market.base_reserve * entry.market.quote_reserve;
        let new_quote = entry.market.quote_reserve + signed_quote;
        if new_quote <= Decimal::ZERO {
            return Err(BotError::Execution(format!(
                "notional {quote_amount} would drain the {pair} pool"
            )));
        }
        entry.market.quote_reserve = new_quote;
        entry.market.base_reserve = k / new_quote;

        let size = signed_quote / mark;
        debug!(pair, %side, %quote_amount, "paper fill");

        let position = state
            .positions
            .entry(pair.to_string())
            .or_insert_with(|| PositionRecord {
                pair: pair.to_string(),
                size: Decimal::ZERO,
                unrealized_pnl: Decimal::ZERO,
                trader: trader.to_string(),
            });
        position.size += size;

        Ok(Self::next_tx(&mut state))
    }

    async fn close_position(&self, trader: &str, pair: &str) -> Result<TxResult> {
        let mut state = self.state.write().await;

        let position = state
            .positions
            .remove(pair)
            .ok_or_else(|| BotError::Execution(format!("no open position on {pair}")))?;
        if position.trader != trader {
            state.positions.insert(pair.to_string(), position);
            return Err(BotError::Execution(format!(
                "position on {pair} belongs to another trader"
            )));
        }

        debug!(pair, size = %position.size, "paper close");
        Ok(Self::next_tx(&mut state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const TRADER: &str = "paper-trader";

    #[tokio::test]
    async fn test_open_shifts_mark_toward_index() {
        let chain = PaperChain::new();
        // mark = 10000/10000 * 125 = 125, index 100
        chain
            .add_market("ubtc:unusd", dec!(10000), dec!(10000), dec!(125), dec!(100))
            .await;

        // A short (quote outflow) should pull the mark price down
        chain
            .open_position(TRADER, "ubtc:unusd", TradeSide::Short, dec!(1000), dec!(1))
            .await
            .unwrap();

        let markets = chain.markets().await.unwrap();
        let mark = markets[0].mark_price().unwrap();
        assert!(mark < dec!(125));

        let positions = chain.positions(TRADER).await.unwrap();
        assert_eq!(positions.len(), 1);
        assert!(positions[0].size < dec!(0));
    }

    #[tokio::test]
    async fn test_close_removes_position() {
        let chain = PaperChain::new();
        chain
            .add_market("ubtc:unusd", dec!(10000), dec!(10000), dec!(1), dec!(1))
            .await;
        chain
            .open_position(TRADER, "ubtc:unusd", TradeSide::Long, dec!(500), dec!(1))
            .await
            .unwrap();

        chain.close_position(TRADER, "ubtc:unusd").await.unwrap();
        assert!(chain.positions(TRADER).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_close_without_position_errors() {
        let chain = PaperChain::new();
        let err = chain.close_position(TRADER, "ubtc:unusd").await.unwrap_err();
        assert!(matches!(err, BotError::Execution(_)));
    }

    #[tokio::test]
    async fn test_height_advances_per_fill() {
        let chain = PaperChain::new();
        chain
            .add_market("ubtc:unusd", dec!(10000), dec!(10000), dec!(1), dec!(1))
            .await;
        assert_eq!(chain.block_height().await.unwrap(), 0);

        chain
            .open_position(TRADER, "ubtc:unusd", TradeSide::Long, dec!(100), dec!(1))
            .await
            .unwrap();
        assert_eq!(chain.block_height().await.unwrap(), 1);
    }
}
