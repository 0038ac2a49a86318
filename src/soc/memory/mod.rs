//! Memory targets and their backing store.

/// Fixed-latency and DRAM timing controllers.
pub mod controller;

/// Sparse functional memory contents.
pub mod store;

pub use controller::{DramController, SimpleController};
pub use store::SparseStore;
