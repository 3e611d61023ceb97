//! Cycle orchestrator
//!
//! Sequences one trade cycle across all tracked pairs: snapshot queries,
//! the per-pair calculator → classifier → dispatch chain, and ledger
//! reconciliation after each executed action. Single-writer: the engine
//! owns the portfolio ledger and is the only thing that mutates it.

pub mod runner;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::chain::{ChainExecutor, ChainQuery};
use crate::common::errors::{BotError, Result};
use crate::common::types::{Coin, MarketSnapshot, PositionRecord, PriceSnapshot};
use crate::db::SnapshotStore;
use crate::portfolio::Portfolio;
use crate::strategy::{
    classify, position_stats, quote_needed_to_move_price, TradeAction, TradeSide,
};

/// Outcome for one pair in one cycle
#[derive(Debug, Clone, PartialEq)]
pub struct PairOutcome {
    pub pair: String,
    pub quote_to_move: Decimal,
    pub action: TradeAction,
}

/// Summary of one completed cycle
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub block_height: i64,
    pub outcomes: Vec<PairOutcome>,
}

/// The trade engine, generic over the chain collaborator
pub struct Engine<C>
where
    C: ChainQuery + ChainExecutor,
{
    chain: Arc<C>,
    store: Option<SnapshotStore>,
    portfolio: Portfolio,
    trader: String,
    leverage: Decimal,
    cancelled: Arc<AtomicBool>,
}

impl<C> Engine<C>
where
    C: ChainQuery + ChainExecutor,
{
    pub fn new(chain: Arc<C>, trader: impl Into<String>) -> Self {
        Self {
            chain,
            store: None,
            portfolio: Portfolio::new(),
            trader: trader.into(),
            leverage: Decimal::ONE,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Attach a snapshot store; every cycle then persists its snapshots
    /// and executed trades tagged with the block height.
    pub fn with_store(mut self, store: SnapshotStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_leverage(mut self, leverage: Decimal) -> Self {
        self.leverage = leverage;
        self
    }

    /// Flag checked before each pair: once set, in-flight calls finish
    /// but no further pairs start.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    /// Run one full trade cycle across all tracked pairs.
    ///
    /// Collaborator errors propagate out; an `InvalidPriceRatio` on a
    /// single pair only skips that pair.
    pub async fn run_cycle(&mut self) -> Result<CycleReport> {
        let markets = self.fetch_markets().await?;
        let prices = self.join_prices(&markets).await?;
        let positions = self.fetch_positions().await?;

        let wallet = self.chain.wallet_balances(&self.trader).await?;
        self.portfolio.balances.set_wallet_coins(wallet.clone());

        let height = self.chain.block_height().await?;

        if let Some(store) = &self.store {
            let market_rows: Vec<MarketSnapshot> = markets.values().cloned().collect();
            let price_rows: Vec<PriceSnapshot> = prices.values().cloned().collect();
            let position_rows: Vec<PositionRecord> = positions.values().cloned().collect();
            store.insert_markets(&market_rows, height).await?;
            store.insert_prices(&price_rows, height).await?;
            store.insert_positions(&position_rows, height).await?;
            store.insert_balances(&self.trader, &wallet, height).await?;
        }

        // Deterministic pair order; the pairs themselves are independent.
        let mut pairs: Vec<&String> = prices.keys().collect();
        pairs.sort();

        let mut outcomes = Vec::with_capacity(pairs.len());
        for pair in pairs {
            if self.cancelled.load(Ordering::Relaxed) {
                info!("cycle cancelled, skipping remaining pairs");
                break;
            }

            let market = &markets[pair];
            let price = &prices[pair];

            let quote_to_move = match quote_needed_to_move_price(
                pair,
                market.quote_reserve,
                price.index_price,
                price.mark_price,
            ) {
                Ok(quote) => quote,
                Err(err @ BotError::InvalidPriceRatio { .. }) => {
                    warn!(pair, %err, "skipping pair for this cycle");
                    continue;
                }
                Err(err) => return Err(err),
            };

            let stats = positions
                .get(pair.as_str())
                .map(|position| position_stats(position, price, market.price_multiplier));

            let action = classify(quote_to_move, market.quote_reserve, stats.as_ref());
            debug!(pair, %quote_to_move, %action, "classified");

            self.perform_trade_action(pair, market, action, quote_to_move, height)
                .await?;

            outcomes.push(PairOutcome {
                pair: pair.clone(),
                quote_to_move,
                action,
            });
        }

        self.portfolio.block_number = height;
        info!(height, pairs = outcomes.len(), "cycle complete");

        Ok(CycleReport {
            block_height: height,
            outcomes,
        })
    }

    /// Close every open position, reconciling each close. Used by the
    /// runner on shutdown so the bot never exits levered.
    pub async fn close_all_positions(&mut self) -> Result<()> {
        let positions = self.chain.positions(&self.trader).await?;
        let height = self.chain.block_height().await?;

        for position in positions {
            let tx = self
                .chain
                .close_position(&self.trader, &position.pair)
                .await?;
            info!(pair = %position.pair, tx_hash = %tx.tx_hash, "closed on shutdown");

            let notional = self.close_notional(&position.pair);
            self.portfolio
                .reconcile(TradeAction::CloseOrder, &position.pair, notional.clone());
            if let Some(store) = &self.store {
                store
                    .record_trade(&position.pair, TradeAction::CloseOrder, &notional, height)
                    .await?;
            }
        }
        Ok(())
    }

    async fn fetch_markets(&self) -> Result<HashMap<String, MarketSnapshot>> {
        Ok(self
            .chain
            .markets()
            .await?
            .into_iter()
            .map(|m| (m.pair.clone(), m))
            .collect())
    }

    async fn fetch_positions(&self) -> Result<HashMap<String, PositionRecord>> {
        Ok(self
            .chain
            .positions(&self.trader)
            .await?
            .into_iter()
            .map(|p| (p.pair.clone(), p))
            .collect())
    }

    /// Join the markets query with the oracle query into price snapshots.
    ///
    /// A pair present on only one side, or whose mark price is undefined,
    /// is dropped silently; that is documented behavior, not an error.
    async fn join_prices(
        &self,
        markets: &HashMap<String, MarketSnapshot>,
    ) -> Result<HashMap<String, PriceSnapshot>> {
        let oracle = self.chain.oracle_prices().await?;

        let mut prices = HashMap::new();
        for (pair, market) in markets {
            let (Some(index_price), Some(mark_price)) =
                (oracle.get(pair).copied(), market.mark_price())
            else {
                debug!(pair, "no oracle price or undefined mark, dropping pair");
                continue;
            };
            prices.insert(
                pair.clone(),
                PriceSnapshot {
                    pair: pair.clone(),
                    index_price,
                    mark_price,
                },
            );
        }
        Ok(prices)
    }

    /// Dispatch one classified action to the executor and reconcile the
    /// ledger once the execution succeeded.
    async fn perform_trade_action(
        &mut self,
        pair: &str,
        market: &MarketSnapshot,
        action: TradeAction,
        quote_to_move: Decimal,
        height: i64,
    ) -> Result<()> {
        match action {
            TradeAction::DontTrade => return Ok(()),
            TradeAction::OpenOrder => {
                let notional = self.open(pair, market, quote_to_move).await?;
                self.portfolio
                    .reconcile(TradeAction::OpenOrder, pair, notional.clone());
                self.log_trade(pair, action, &notional, height).await?;
            }
            TradeAction::CloseOrder => {
                let tx = self.chain.close_position(&self.trader, pair).await?;
                info!(pair, tx_hash = %tx.tx_hash, "closed position");
                let notional = self.close_notional(pair);
                self.portfolio
                    .reconcile(TradeAction::CloseOrder, pair, notional.clone());
                self.log_trade(pair, action, &notional, height).await?;
            }
            TradeAction::CloseAndOpenOrder => {
                // A close failure aborts without attempting the open. The
                // reverse does not roll back: a successful close followed
                // by a failed open leaves the trader flat.
                let tx = self.chain.close_position(&self.trader, pair).await?;
                info!(pair, tx_hash = %tx.tx_hash, "closed position for re-entry");
                let close_notional = self.close_notional(pair);
                self.portfolio
                    .reconcile(TradeAction::CloseOrder, pair, close_notional.clone());
                self.log_trade(pair, TradeAction::CloseOrder, &close_notional, height)
                    .await?;

                let notional = self.open(pair, market, quote_to_move).await?;
                self.portfolio
                    .reconcile(TradeAction::OpenOrder, pair, notional.clone());
                self.log_trade(pair, TradeAction::OpenOrder, &notional, height)
                    .await?;
            }
        }
        Ok(())
    }

    async fn open(
        &mut self,
        pair: &str,
        market: &MarketSnapshot,
        quote_to_move: Decimal,
    ) -> Result<Coin> {
        let side = TradeSide::from_notional(quote_to_move);
        let amount = quote_to_move.round().abs();

        let tx = self
            .chain
            .open_position(&self.trader, pair, side, amount, self.leverage)
            .await?;
        info!(pair, %side, %amount, tx_hash = %tx.tx_hash, "opened position");

        Ok(Coin::new(market.quote_denom(), amount))
    }

    /// The notional a full close returns: the pair's entire traded
    /// balance.
    fn close_notional(&self, pair: &str) -> Coin {
        self.portfolio
            .balances
            .traded_balances
            .get(pair)
            .cloned()
            .unwrap_or_else(|| {
                let quote_denom = pair.split(':').nth(1).unwrap_or(pair);
                Coin::new(quote_denom, Decimal::ZERO)
            })
    }

    async fn log_trade(
        &self,
        pair: &str,
        action: TradeAction,
        notional: &Coin,
        height: i64,
    ) -> Result<()> {
        if let Some(store) = &self.store {
            store.record_trade(pair, action, notional, height).await?;
        }
        Ok(())
    }
}
