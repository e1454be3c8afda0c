//! Simulated venue error types.

use rust_decimal::Decimal;
use shadow_domain::{DomainError, OrderId};
use shadow_exec::ExecError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    /// Order cost exceeds the available balance
    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: Decimal, available: Decimal },

    /// Order id is not open on this account
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// Rejected argument (non-positive entry, negative percentage)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Historical data file is missing
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Historical data file could not be read or parsed
    #[error("Error reading or parsing the file {}: {message}", .path.display())]
    HistoricalData { path: PathBuf, message: String },

    /// Domain error
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),
}

pub type SimResult<T> = Result<T, SimError>;

impl From<SimError> for ExecError {
    fn from(err: SimError) -> Self {
        match err {
            SimError::InsufficientBalance { .. } | SimError::InvalidInput(_) => {
                ExecError::OrderRejected(err.to_string())
            }
            SimError::OrderNotFound(id) => ExecError::OrderNotFound(id),
            SimError::Domain(e) => ExecError::Domain(e),
            SimError::FileNotFound(_) | SimError::HistoricalData { .. } => {
                ExecError::BarSource(err.to_string())
            }
        }
    }
}
