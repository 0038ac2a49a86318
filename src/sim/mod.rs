//! Simulation infrastructure: the event kernel and configuration loading.

/// Time-ordered event queue.
pub mod kernel;

/// Configuration, memspec and address-mapping loading.
pub mod loader;

pub use kernel::EventQueue;
