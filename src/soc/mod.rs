//! System-on-Chip components: the memory targets behind the bridge and the
//! system that wires them together.

/// System wiring and event dispatch.
pub mod builder;

/// Memory targets.
pub mod memory;

/// Target interface.
pub mod traits;

pub use builder::System;
pub use traits::{MemoryTarget, TargetReply};
