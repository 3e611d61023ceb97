//! Snapshot persistence
//!
//! Audit store for the per-cycle chain snapshots and executed trades, all
//! tagged with the block height they were observed at. SQLite via sqlx;
//! decimals are stored as TEXT. The decision logic never reads this store.

use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::common::errors::Result;
use crate::common::types::{Coin, MarketSnapshot, PositionRecord, PriceSnapshot};
use crate::strategy::TradeAction;

/// Persisted AMM reserve snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AmmRow {
    pub pair: String,
    pub base_reserve: String,
    pub quote_reserve: String,
    pub price_multiplier: String,
    pub bias: String,
    pub block_height: i64,
}

/// Persisted price snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PriceRow {
    pub pair: String,
    pub index_price: String,
    pub mark_price: String,
    pub block_height: i64,
}

/// Persisted position snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PositionRow {
    pub pair: String,
    pub size: String,
    pub unrealized_pnl: String,
    pub trader: String,
    pub block_height: i64,
}

/// Persisted wallet balance snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct BalanceRow {
    pub trader: String,
    pub denom: String,
    pub amount: String,
    pub block_height: i64,
}

/// Persisted trade-log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TradeLogRow {
    pub pair: String,
    pub action: i64,
    pub notional: String,
    pub denom: String,
    pub block_height: i64,
    pub created_at: String,
}

impl TradeLogRow {
    /// Decode the stored action discriminant.
    ///
    /// The only place `InvalidActionKind` can actually surface: the enum
    /// is closed in memory but the table column is just an integer.
    pub fn trade_action(&self) -> Result<TradeAction> {
        TradeAction::try_from(self.action)
    }
}

/// All tables bundled for JSON export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbRecords {
    pub amms: Vec<AmmRow>,
    pub prices: Vec<PriceRow>,
    pub positions: Vec<PositionRow>,
    pub balances: Vec<BalanceRow>,
    pub trades: Vec<TradeLogRow>,
}

/// SQLite-backed store for cycle snapshots
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    pool: SqlitePool,
}

impl SnapshotStore {
    /// Connect to `url` (e.g. `sqlite://bot.db`), creating the file and
    /// schema if missing.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(sqlx::Error::from)?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// In-memory store, used by tests and paper mode without a database
    /// URL. Single connection: every pooled connection would otherwise get
    /// its own private `:memory:` database.
    pub async fn in_memory() -> Result<Self> {
        Self::connect("sqlite::memory:", 1).await
    }

    async fn migrate(&self) -> Result<()> {
        // One statement per call: prepared statements can't batch.
        let statements = [
            "CREATE TABLE IF NOT EXISTS amm_snapshots (
                pair TEXT NOT NULL,
                base_reserve TEXT NOT NULL,
                quote_reserve TEXT NOT NULL,
                price_multiplier TEXT NOT NULL,
                bias TEXT NOT NULL,
                block_height INTEGER NOT NULL
            )",
            "CREATE TABLE IF NOT EXISTS price_snapshots (
                pair TEXT NOT NULL,
                index_price TEXT NOT NULL,
                mark_price TEXT NOT NULL,
                block_height INTEGER NOT NULL
            )",
            "CREATE TABLE IF NOT EXISTS position_snapshots (
                pair TEXT NOT NULL,
                size TEXT NOT NULL,
                unrealized_pnl TEXT NOT NULL,
                trader TEXT NOT NULL,
                block_height INTEGER NOT NULL
            )",
            "CREATE TABLE IF NOT EXISTS balance_snapshots (
                trader TEXT NOT NULL,
                denom TEXT NOT NULL,
                amount TEXT NOT NULL,
                block_height INTEGER NOT NULL
            )",
            "CREATE TABLE IF NOT EXISTS trade_log (
                pair TEXT NOT NULL,
                action INTEGER NOT NULL,
                notional TEXT NOT NULL,
                denom TEXT NOT NULL,
                block_height INTEGER NOT NULL,
                created_at TEXT NOT NULL
            )",
        ];
        for statement in statements {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Delete every row from every table.
    pub async fn clear_all(&self) -> Result<()> {
        for table in [
            "amm_snapshots",
            "price_snapshots",
            "position_snapshots",
            "balance_snapshots",
            "trade_log",
        ] {
            sqlx::query(&format!("DELETE FROM {table}"))
                .execute(&self.pool)
                .await?;
        }
        Ok(())
    }

    pub async fn insert_markets(
        &self,
        markets: &[MarketSnapshot],
        block_height: i64,
    ) -> Result<()> {
        for market in markets {
            sqlx::query(
                "INSERT INTO amm_snapshots \
                 (pair, base_reserve, quote_reserve, price_multiplier, bias, block_height) \
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(&market.pair)
            .bind(market.base_reserve.to_string())
            .bind(market.quote_reserve.to_string())
            .bind(market.price_multiplier.to_string())
            .bind(market.bias.to_string())
            .bind(block_height)
            .execute(&self.pool)
            .await?;
        }
        Ok(())
    }

    pub async fn insert_prices(&self, prices: &[PriceSnapshot], block_height: i64) -> Result<()> {
        for price in prices {
            sqlx::query(
                "INSERT INTO price_snapshots (pair, index_price, mark_price, block_height) \
                 VALUES (?, ?, ?, ?)",
            )
            .bind(&price.pair)
            .bind(price.index_price.to_string())
            .bind(price.mark_price.to_string())
            .bind(block_height)
            .execute(&self.pool)
            .await?;
        }
        Ok(())
    }

    pub async fn insert_positions(
        &self,
        positions: &[PositionRecord],
        block_height: i64,
    ) -> Result<()> {
        for position in positions {
            sqlx::query(
                "INSERT INTO position_snapshots \
                 (pair, size, unrealized_pnl, trader, block_height) \
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(&position.pair)
            .bind(position.size.to_string())
            .bind(position.unrealized_pnl.to_string())
            .bind(&position.trader)
            .bind(block_height)
            .execute(&self.pool)
            .await?;
        }
        Ok(())
    }

    pub async fn insert_balances(
        &self,
        trader: &str,
        coins: &[Coin],
        block_height: i64,
    ) -> Result<()> {
        for coin in coins {
            sqlx::query(
                "INSERT INTO balance_snapshots (trader, denom, amount, block_height) \
                 VALUES (?, ?, ?, ?)",
            )
            .bind(trader)
            .bind(&coin.denom)
            .bind(coin.amount.to_string())
            .bind(block_height)
            .execute(&self.pool)
            .await?;
        }
        Ok(())
    }

    /// Append one executed action to the historical trade log.
    pub async fn record_trade(
        &self,
        pair: &str,
        action: TradeAction,
        notional: &Coin,
        block_height: i64,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO trade_log (pair, action, notional, denom, block_height, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(pair)
        .bind(action.as_i64())
        .bind(notional.amount.to_string())
        .bind(&notional.denom)
        .bind(block_height)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn amm_snapshots(&self) -> Result<Vec<AmmRow>> {
        Ok(sqlx::query_as("SELECT * FROM amm_snapshots")
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn amm_snapshots_by_block(&self, block_height: i64) -> Result<Vec<AmmRow>> {
        Ok(
            sqlx::query_as("SELECT * FROM amm_snapshots WHERE block_height = ?")
                .bind(block_height)
                .fetch_all(&self.pool)
                .await?,
        )
    }

    pub async fn price_snapshots(&self) -> Result<Vec<PriceRow>> {
        Ok(sqlx::query_as("SELECT * FROM price_snapshots")
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn price_snapshots_by_block(&self, block_height: i64) -> Result<Vec<PriceRow>> {
        Ok(
            sqlx::query_as("SELECT * FROM price_snapshots WHERE block_height = ?")
                .bind(block_height)
                .fetch_all(&self.pool)
                .await?,
        )
    }

    pub async fn position_snapshots(&self) -> Result<Vec<PositionRow>> {
        Ok(sqlx::query_as("SELECT * FROM position_snapshots")
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn position_snapshots_by_block(&self, block_height: i64) -> Result<Vec<PositionRow>> {
        Ok(
            sqlx::query_as("SELECT * FROM position_snapshots WHERE block_height = ?")
                .bind(block_height)
                .fetch_all(&self.pool)
                .await?,
        )
    }

    pub async fn balance_snapshots(&self) -> Result<Vec<BalanceRow>> {
        Ok(sqlx::query_as("SELECT * FROM balance_snapshots")
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn trade_log(&self) -> Result<Vec<TradeLogRow>> {
        Ok(sqlx::query_as("SELECT * FROM trade_log")
            .fetch_all(&self.pool)
            .await?)
    }

    /// Bundle every table into one JSON document.
    pub async fn export_json(&self) -> Result<String> {
        let records = DbRecords {
            amms: self.amm_snapshots().await?,
            prices: self.price_snapshots().await?,
            positions: self.position_snapshots().await?,
            balances: self.balance_snapshots().await?,
            trades: self.trade_log().await?,
        };
        Ok(serde_json::to_string(&records)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_market() -> MarketSnapshot {
        MarketSnapshot {
            pair: "ubtc:unusd".to_string(),
            base_reserve: dec!(10000),
            quote_reserve: dec!(10000),
            price_multiplier: dec!(10),
            bias: dec!(0),
        }
    }

    #[tokio::test]
    async fn test_insert_and_query_by_block() {
        let store = SnapshotStore::in_memory().await.unwrap();
        store.insert_markets(&[sample_market()], 7).await.unwrap();
        store.insert_markets(&[sample_market()], 8).await.unwrap();

        let rows = store.amm_snapshots_by_block(7).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].pair, "ubtc:unusd");
        assert_eq!(rows[0].quote_reserve, "10000");

        assert_eq!(store.amm_snapshots().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_trade_log_round_trip() {
        let store = SnapshotStore::in_memory().await.unwrap();
        let notional = Coin::new("unusd", dec!(350));
        store
            .record_trade("ubtc:unusd", TradeAction::OpenOrder, &notional, 9)
            .await
            .unwrap();

        let rows = store.trade_log().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].trade_action().unwrap(), TradeAction::OpenOrder);
        assert_eq!(rows[0].notional, "350");
        assert_eq!(rows[0].denom, "unusd");
    }

    #[tokio::test]
    async fn test_clear_all() {
        let store = SnapshotStore::in_memory().await.unwrap();
        store.insert_markets(&[sample_market()], 1).await.unwrap();
        store.clear_all().await.unwrap();
        assert!(store.amm_snapshots().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_export_json_contains_all_tables() {
        let store = SnapshotStore::in_memory().await.unwrap();
        store.insert_markets(&[sample_market()], 1).await.unwrap();

        let json = store.export_json().await.unwrap();
        let records: DbRecords = serde_json::from_str(&json).unwrap();
        assert_eq!(records.amms.len(), 1);
        assert!(records.trades.is_empty());
    }
}
