//! Engine error types.

use thiserror::Error;

/// Errors raised by indicators and strategy construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Input series is too short, mismatched, or empty
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Highest high equals lowest low over the window
    #[error("Flat price range over {0} bars")]
    FlatRange(usize),

    /// Invalid parameters at construction time
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
