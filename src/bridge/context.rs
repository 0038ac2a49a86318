//! Request Context.
//!
//! Per-request completion bookkeeping. A context counts dispatched but not
//! yet completed chunks and remembers the first failure. It becomes ready to
//! finalize only once the outstanding count is zero *and* the dispatcher has
//! issued the last chunk; completions may arrive before dispatch has finished,
//! in any order.

use super::request::{AxiRequest, AxiResponse, ResponseStatus};
use crate::common::{Direction, SimTime};
use std::fmt;

/// Bridge-assigned request identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Accounting state of one accepted request.
#[derive(Debug)]
pub struct RequestContext {
    pub id: RequestId,
    pub direction: Direction,
    pub request: AxiRequest,
    pub accepted_at: SimTime,
    total_bytes: usize,
    completed_bytes: usize,
    outstanding: usize,
    dispatched: usize,
    all_issued: bool,
    error: Option<ResponseStatus>,
}

impl RequestContext {
    /// Creates the context. The transfer length is taken from the request.
    pub fn new(id: RequestId, direction: Direction, request: AxiRequest, now: SimTime) -> Self {
        let total_bytes = request.total_bytes();
        Self {
            id,
            direction,
            request,
            accepted_at: now,
            total_bytes,
            completed_bytes: 0,
            outstanding: 0,
            dispatched: 0,
            all_issued: false,
            error: None,
        }
    }

    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    pub fn completed_bytes(&self) -> usize {
        self.completed_bytes
    }

    /// Chunks dispatched and not yet completed.
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    /// Chunks dispatched so far.
    pub fn dispatched(&self) -> usize {
        self.dispatched
    }

    pub fn all_issued(&self) -> bool {
        self.all_issued
    }

    /// First recorded failure, if any.
    pub fn error(&self) -> Option<ResponseStatus> {
        self.error
    }

    /// Counts a chunk as dispatched.
    pub fn on_dispatched(&mut self) {
        self.outstanding += 1;
        self.dispatched += 1;
    }

    /// Marks the dispatch loop as finished for this request.
    pub fn mark_all_issued(&mut self) {
        self.all_issued = true;
    }

    /// Accounts a chunk completion.
    ///
    /// # Arguments
    ///
    /// * `bytes` - Length of the completed chunk.
    /// * `status` - Transport status the chunk finished with.
    ///
    /// # Returns
    ///
    /// `true` if the context is now ready to finalize.
    pub fn on_chunk_complete(&mut self, bytes: usize, status: ResponseStatus) -> bool {
        debug_assert!(self.outstanding > 0, "completion without dispatch");
        self.outstanding = self.outstanding.saturating_sub(1);
        self.completed_bytes += bytes;
        if !status.is_ok() && self.error.is_none() {
            self.error = Some(status);
        }
        self.is_ready()
    }

    /// Nothing in flight and nothing left to dispatch.
    pub fn is_ready(&self) -> bool {
        self.outstanding == 0 && self.all_issued
    }

    /// Aggregate status: the first error, or `Ok`.
    pub fn status(&self) -> ResponseStatus {
        self.error.unwrap_or(ResponseStatus::Ok)
    }

    /// Builds the aggregate response, measuring latency up to `now`.
    pub fn response(&self, now: SimTime) -> AxiResponse {
        AxiResponse::from_status(self.status(), now.saturating_sub(self.accepted_at))
    }
}
