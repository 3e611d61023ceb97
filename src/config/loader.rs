//! Configuration loader

use config::{Config, Environment, File};
use std::path::Path;

use super::types::{BotConfig, BotSettings, ChainConfig};
use crate::common::errors::{BotError, Result};

/// Load configuration from file and environment variables
///
/// Priority (highest to lowest):
/// 1. Environment variables (prefixed with BOT_)
/// 2. Configuration file (TOML format)
/// 3. Default values
pub fn load_config(config_path: Option<&str>) -> Result<BotConfig> {
    let mut builder = Config::builder();

    if let Some(path) = config_path {
        if Path::new(path).exists() {
            builder = builder.add_source(File::with_name(path).required(false));
        }
    }

    builder = builder.add_source(
        Environment::with_prefix("BOT")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder
        .build()
        .map_err(|e| BotError::Configuration(e.to_string()))?;

    config
        .try_deserialize()
        .map_err(|e| BotError::Configuration(e.to_string()))
}

/// Load configuration from environment variables only
///
/// Reads the legacy flat variable names (`CHAIN_ID`, `GRPC_ENDPOINT`,
/// `TMRPC_ENDPOINT`, `MNEMONIC`) from the process environment or a `.env`
/// file, falling back to the localnet defaults for anything unset.
pub fn load_from_env() -> Result<BotConfig> {
    dotenvy::dotenv().ok();

    let defaults = ChainConfig::default();
    let chain = ChainConfig {
        chain_id: std::env::var("CHAIN_ID").unwrap_or(defaults.chain_id),
        grpc_endpoint: std::env::var("GRPC_ENDPOINT").unwrap_or(defaults.grpc_endpoint),
        tmrpc_endpoint: std::env::var("TMRPC_ENDPOINT").unwrap_or(defaults.tmrpc_endpoint),
        mnemonic: std::env::var("MNEMONIC").ok(),
    };

    Ok(BotConfig {
        chain,
        database: None,
        settings: BotSettings::default(),
    })
}
