//! Error types for the tally_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for tally_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unrecognized unit string; callers treat the amount as zero
    #[error("Unknown unit: {0}")]
    UnknownUnit(String),

    /// Malformed user input, recovered locally without corrupting totals
    #[error("Input error: {0}")]
    Input(String),

    /// Operation not valid for the ledger's current open/closed state
    #[error("State error: {0}")]
    State(String),

    /// A store round-trip failed; in-memory state matches the last durable write
    #[error("Persistence failed: {0}")]
    Persistence(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
