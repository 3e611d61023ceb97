//! Portfolio ledger
//!
//! Local bookkeeping of traded vs. liquid balances. The ledger starts
//! empty at bot startup and is mutated only through [`Portfolio::reconcile`]
//! after an action is confirmed executed; persistence for audit is the
//! snapshot store's concern.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::common::types::Coin;
use crate::strategy::TradeAction;

/// Ledger of balances plus the block height it was last updated at
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Portfolio {
    pub balances: PortfolioBalances,
    /// Block number of the last reconciliation
    pub block_number: i64,
}

/// Traded and liquid balances
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PortfolioBalances {
    /// Balances currently deployed in each perp market, keyed by pair
    pub traded_balances: HashMap<String, Coin>,
    /// Liquid assets available in the wallet
    pub wallet_coins: Vec<Coin>,
}

impl PortfolioBalances {
    /// Total value across wallet and traded balances, merged by denom.
    pub fn total_value(&self) -> Vec<Coin> {
        let mut totals: HashMap<String, Decimal> = HashMap::new();
        for coin in self
            .wallet_coins
            .iter()
            .chain(self.traded_balances.values())
        {
            *totals.entry(coin.denom.clone()).or_default() += coin.amount;
        }

        let mut coins: Vec<Coin> = totals
            .into_iter()
            .map(|(denom, amount)| Coin::new(denom, amount))
            .collect();
        coins.sort_by(|a, b| a.denom.cmp(&b.denom));
        coins
    }

    /// Replace the wallet coins from a fresh balance query, merging by
    /// denom.
    pub fn set_wallet_coins(&mut self, coins: Vec<Coin>) {
        let mut merged: HashMap<String, Decimal> = HashMap::new();
        for coin in coins {
            *merged.entry(coin.denom).or_default() += coin.amount;
        }
        self.wallet_coins = merged
            .into_iter()
            .map(|(denom, amount)| Coin::new(denom, amount))
            .collect();
        self.wallet_coins.sort_by(|a, b| a.denom.cmp(&b.denom));
    }

    fn add_traded(&mut self, pair: &str, amount: Coin) {
        match self.traded_balances.get_mut(pair) {
            Some(existing) if existing.denom == amount.denom => {
                existing.amount += amount.amount;
            }
            _ => {
                self.traded_balances.insert(pair.to_string(), amount);
            }
        }
    }

    /// Subtract from the pair's traded balance and hand the coin back to
    /// the wallet.
    ///
    /// Known behavior, preserved on purpose: the subtraction is skipped
    /// silently when the denom doesn't match, and the returned coin is
    /// appended to `wallet_coins` as a new entry rather than merged into
    /// an existing one, so repeated round-trips grow the wallet list with
    /// duplicate denoms. `total_value()` merges by denom, so the aggregate
    /// still conserves value.
    fn remove_traded(&mut self, pair: &str, amount: Coin) {
        if let Some(existing) = self.traded_balances.get_mut(pair) {
            if existing.denom == amount.denom {
                existing.amount -= amount.amount;
            }
        }
        self.wallet_coins.push(amount);
    }
}

impl Portfolio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total value across wallet and traded balances.
    pub fn total_value(&self) -> Vec<Coin> {
        self.balances.total_value()
    }

    /// Update the ledger after `action` executed on `pair` with the given
    /// notional coin.
    ///
    /// Opens add to the pair's traded balance; closes subtract from it and
    /// return the coin to the wallet. `CloseAndOpenOrder` never reaches
    /// here as itself: the engine reconciles its close and open sub-steps
    /// as two independent calls. `DontTrade` is a no-op.
    pub fn reconcile(&mut self, action: TradeAction, pair: &str, notional: Coin) {
        match action {
            TradeAction::OpenOrder => self.balances.add_traded(pair, notional),
            TradeAction::CloseOrder => self.balances.remove_traded(pair, notional),
            TradeAction::CloseAndOpenOrder | TradeAction::DontTrade => {}
        }
    }
}
