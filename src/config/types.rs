//! Configuration types

use serde::{Deserialize, Serialize};

/// Main bot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Chain connection settings
    #[serde(default)]
    pub chain: ChainConfig,
    /// Snapshot database configuration (optional)
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    /// General bot settings
    #[serde(default)]
    pub settings: BotSettings,
}

/// Chain connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Chain identifier
    #[serde(default = "default_chain_id")]
    pub chain_id: String,
    /// gRPC endpoint for queries and broadcasts
    #[serde(default = "default_grpc_endpoint")]
    pub grpc_endpoint: String,
    /// Tendermint RPC endpoint, used only for block-height tagging
    #[serde(default = "default_tmrpc_endpoint")]
    pub tmrpc_endpoint: String,
    /// Trader mnemonic; key management happens in the chain collaborator
    #[serde(default)]
    pub mnemonic: Option<String>,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            chain_id: default_chain_id(),
            grpc_endpoint: default_grpc_endpoint(),
            tmrpc_endpoint: default_tmrpc_endpoint(),
            mnemonic: None,
        }
    }
}

fn default_chain_id() -> String {
    "nibiru-localnet-0".to_string()
}

fn default_grpc_endpoint() -> String {
    "localhost:9090".to_string()
}

fn default_tmrpc_endpoint() -> String {
    "http://localhost:26657".to_string()
}

/// Database configuration for the snapshot store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL (e.g. `sqlite://bot.db`)
    pub url: String,
    /// Maximum number of connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

/// General bot settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Seconds between trade cycles
    #[serde(default = "default_cycle_interval")]
    pub cycle_interval_seconds: u64,
    /// Leverage used for every opened position
    #[serde(default = "default_leverage")]
    pub leverage: u32,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            cycle_interval_seconds: default_cycle_interval(),
            leverage: default_leverage(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_cycle_interval() -> u64 {
    30
}

fn default_leverage() -> u32 {
    1
}

impl BotConfig {
    /// Reject configurations with blank chain settings.
    ///
    /// Mirrors the shape of the original env-file check: every connection
    /// field must be present before the bot starts a run loop.
    pub fn validate(&self) -> crate::common::errors::Result<()> {
        use crate::common::errors::BotError;

        if self.chain.chain_id.trim().is_empty() {
            return Err(BotError::Configuration("chain_id is empty".to_string()));
        }
        if self.chain.grpc_endpoint.trim().is_empty() {
            return Err(BotError::Configuration(
                "grpc_endpoint is empty".to_string(),
            ));
        }
        if self.chain.tmrpc_endpoint.trim().is_empty() {
            return Err(BotError::Configuration(
                "tmrpc_endpoint is empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = BotConfig {
            chain: ChainConfig::default(),
            database: None,
            settings: BotSettings::default(),
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_blank_chain_id_rejected() {
        let config = BotConfig {
            chain: ChainConfig {
                chain_id: "  ".to_string(),
                ..ChainConfig::default()
            },
            database: None,
            settings: BotSettings::default(),
        };
        assert!(config.validate().is_err());
    }
}
