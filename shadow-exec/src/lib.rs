//! Shadow Execution Layer
//!
//! Ports between the robot and the outside world: where bars come from,
//! where orders go, and what time it is.
//!
//! # Architecture
//!
//! ```text
//! Robot → BarSource    → Vec<Bar>
//!       → OrderGateway → Order
//! Scheduler → Clock    → aligned start instant
//! ```
//!
//! # Components
//!
//! - **Ports**: `BarSource` and `OrderGateway` traits
//! - **Clock**: wall-clock abstraction plus period-alignment arithmetic
//! - **Stub**: scripted implementations for tests
//!
//! Simulated venues (virtual account, historical replay) live in
//! `shadow-sim`.

#![warn(clippy::all)]

pub mod clock;
pub mod error;
pub mod ports;
pub mod stub;

// Re-exports for convenience
pub use clock::{
    initial_delay_millis, millis_to_datetime, shift_back_to_previous_period, Clock, FixedClock,
    SystemClock,
};
pub use error::{ExecError, ExecResult};
pub use ports::{BarSource, OpenOrderRequest, OrderGateway};
pub use stub::{StubBarSource, StubGateway};
