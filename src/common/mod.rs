//! Common utilities and types used throughout the bridge simulator.
//!
//! This module provides the simulated time type, the transfer direction and
//! the error types shared by the bridge, the DRAM model and the front-end.

/// Transfer direction (read/write).
pub mod data;

/// Error types for callers, configuration and timing.
pub mod error;

/// Picosecond-resolution simulated time.
pub mod time;

pub use data::Direction;
pub use error::{BridgeError, ConfigError, TimingError};
pub use time::SimTime;
