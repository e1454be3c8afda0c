//! Execution layer error types.

use shadow_domain::{DomainError, OrderId};
use thiserror::Error;

/// Errors that can occur while collecting bars or routing orders.
#[derive(Debug, Error)]
pub enum ExecError {
    /// Bar source failure (I/O, exhausted feed, bad data)
    #[error("Bar source error: {0}")]
    BarSource(String),

    /// Order gateway communication error
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// Order was rejected by the venue (e.g. insufficient balance)
    #[error("Order rejected: {0}")]
    OrderRejected(String),

    /// Order unknown to the venue
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// Port used before `init()`
    #[error("Not initialized: {0}")]
    NotInitialized(String),

    /// Domain error
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),
}

/// Result type for execution operations.
pub type ExecResult<T> = Result<T, ExecError>;
