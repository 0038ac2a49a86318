//! AXI-to-memory bridge.
//!
//! Splits AXI bursts into downstream-width sub-transactions and reassembles
//! their responses. Two paths share the segmentation rules: the tracked
//! [`engine`], driven by simulation events, and the synchronous
//! [`blocking`] path.

/// Synchronous segmentation path.
pub mod blocking;

/// Per-request completion accounting.
pub mod context;

/// Event-driven segmentation and completion tracking.
pub mod engine;

/// Sub-transaction payload pool.
pub mod pool;

/// AXI request/response types.
pub mod request;

pub use context::{RequestContext, RequestId};
pub use engine::{BridgeEngine, Completion, RequestState};
pub use pool::{PayloadHandle, PayloadPool, SubTransaction};
pub use request::{
    AxiAttributes, AxiRequest, AxiResp, AxiResponse, AxiTransactionBuilder, BurstType,
    ResponseStatus,
};
