//! Bot configuration loading and validation

pub mod loader;
pub mod types;

pub use loader::{load_config, load_from_env};
pub use types::{BotConfig, BotSettings, ChainConfig, DatabaseConfig};
