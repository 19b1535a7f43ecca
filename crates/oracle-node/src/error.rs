//! Error types for the oracle node

use flight_surety_core::SuretyError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NodeError {
    #[error("Ledger rejected call: {0}")]
    Ledger(#[from] SuretyError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Node task failed: {0}")]
    Task(String),
}

pub type NodeResult<T> = Result<T, NodeError>;

impl NodeError {
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig(reason.into())
    }
}
