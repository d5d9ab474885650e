use granary_core::{Amount, Commodity};
use granary_ports::BrokerError;
use thiserror::Error;

/// Rejected configuration, reported before any actor starts
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{field} must be positive")]
    NonPositive { field: &'static str },

    #[error("Unknown sourcing strategy: {0}")]
    UnknownSourcing(String),

    #[error("Invalid configuration file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors surfaced by a simulation run
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Broker error: {0}")]
    Broker(#[from] BrokerError),

    #[error(
        "Conservation violated for {commodity}: produced {produced}, held {held}, consumed {consumed}"
    )]
    Conservation {
        commodity: Commodity,
        produced: Amount,
        held: Amount,
        consumed: Amount,
    },

    #[error("Actor task failed: {0}")]
    TaskFailed(String),
}

pub type Result<T> = std::result::Result<T, RunnerError>;
