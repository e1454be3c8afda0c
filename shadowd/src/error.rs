//! Daemon error types.

use shadow_domain::DomainError;
use shadow_engine::EngineError;
use shadow_exec::ExecError;
use shadow_sim::SimError;
use thiserror::Error;

/// Daemon-level errors.
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Domain error
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Engine error
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Execution error
    #[error("Execution error: {0}")]
    Exec(#[from] ExecError),

    /// Simulated venue error
    #[error("Simulation error: {0}")]
    Sim(#[from] SimError),

    /// Robot used in a state that does not allow the operation
    #[error("Invalid robot state: {0}")]
    InvalidState(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for daemon operations.
pub type DaemonResult<T> = Result<T, DaemonError>;
