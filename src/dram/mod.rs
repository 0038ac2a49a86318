//! DRAM Model.
//!
//! Everything the DRAM controller target needs to know about the device:
//! the command set, address decoding, per-standard memory specifications and
//! the timing checker built on top of them.

/// Address-to-location decoding.
pub mod address;

/// Timing-constraint checker.
pub mod checker;

/// DRAM command set.
pub mod command;

/// Memory specifications and timing tables.
pub mod memspec;

pub use address::{AddressMapping, DramLocation};
pub use checker::TimingChecker;
pub use command::Command;
pub use memspec::{MemSpec, MemoryStandard, TimingTable};
