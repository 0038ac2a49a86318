//! AXI-to-DRAM Bridge Simulator Library.
//!
//! This crate models an AXI4 slave bridge that splits incoming bursts into
//! downstream-width sub-transactions, forwards them to a memory target and
//! reassembles the responses. Behind the bridge sits either a fixed-latency
//! memory or a DRAM controller whose command stream is validated by a
//! per-standard timing checker (LPDDR5, DDR4).
//!
//! # Architecture
//!
//! * **Bridge**: Segmentation, completion tracking and response reassembly,
//!   with a blocking and an event-driven path.
//! * **DRAM**: Memory specifications, address decoding and the timing checker.
//! * **SoC**: Memory targets and the system that wires them to the bridge.
//! * **Front-end**: Blocking and polling request APIs for host code.
//!
//! # Modules
//!
//! * `bridge`: AXI request types, segmentation and completion tracking.
//! * `common`: Simulated time, direction and error types.
//! * `config`: Configuration loading and parsing.
//! * `dram`: Memory specifications, address mapping and timing checker.
//! * `model`: Request front-end.
//! * `sim`: Event kernel and loaders.
//! * `soc`: Memory targets and system wiring.
//! * `stats`: Statistics collection.

/// AXI bridge: request types, segmentation and completion tracking.
///
/// Splits AXI bursts into downstream-width chunks, tracks their completion in
/// any order and builds the aggregate response once every chunk is in.
pub mod bridge;

/// Shared types and error handling.
pub mod common;

/// Configuration system for the bridge, the memory target and the simulation clock.
///
/// Loads and parses TOML configuration files; every key has a default.
pub mod config;

/// DRAM device model.
///
/// Memory specifications for LPDDR5 and DDR4, address-to-bank decoding and
/// the command timing checker.
pub mod dram;

/// Blocking and polling request front-end.
pub mod model;

/// Simulation infrastructure: the discrete-event kernel and file loaders.
pub mod sim;

/// System-on-Chip components: memory targets and system wiring.
pub mod soc;

/// Statistics collection and reporting.
///
/// Tracks request counts, latency and bandwidth at the bridge, and command
/// and row-buffer counts at the DRAM controller.
pub mod stats;
