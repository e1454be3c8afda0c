//! Shadow Domain Layer
//!
//! Pure domain types with zero I/O dependencies: bars, timeframes,
//! positions, orders and exploration states.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod entities;
pub mod market_data;
pub mod value_objects;

// Re-export commonly used types
pub use entities::{Order, OrderId, OrderType, Position};
pub use market_data::Bar;
pub use value_objects::{DomainError, ExplorationState, PositionType, TimeUnit, Timeframe};
