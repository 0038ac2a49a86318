//! System-on-Chip Traits.
//!
//! This module defines the interface between the bridge and the memory-style
//! targets behind it. A downstream transaction follows a two-phase handshake:
//! the target first accepts the request (END_REQ) and later begins the
//! response (BEGIN_RESP). Both phases are reported as delays relative to the
//! time of the call, which lets the caller schedule them on the event queue.

use crate::bridge::pool::SubTransaction;
use crate::bridge::request::ResponseStatus;
use crate::common::SimTime;
use crate::stats::DramStats;

/// Timing and status of one downstream access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetReply {
    pub status: ResponseStatus,
    /// Delay until the target accepts the request (END_REQ).
    pub accept_delay: SimTime,
    /// Delay until the response begins (BEGIN_RESP). Never shorter than
    /// `accept_delay`.
    pub response_delay: SimTime,
}

impl TargetReply {
    /// Successful access.
    pub fn ok(accept_delay: SimTime, response_delay: SimTime) -> Self {
        Self {
            status: ResponseStatus::Ok,
            accept_delay,
            response_delay: response_delay.max(accept_delay),
        }
    }

    /// Failed access, answered after `delay`.
    pub fn error(status: ResponseStatus, delay: SimTime) -> Self {
        Self {
            status,
            accept_delay: delay,
            response_delay: delay,
        }
    }
}

/// A memory-style transaction target.
///
/// Data moves functionally during [`MemoryTarget::access`]: a write consumes
/// `data`, a read fills it. Only the reported delays are timed.
pub trait MemoryTarget {
    /// Returns the user-friendly name of the target.
    ///
    /// Used for debugging and logging purposes.
    fn name(&self) -> &str;

    /// Performs a downstream access.
    ///
    /// # Arguments
    ///
    /// * `chunk` - Sub-transaction metadata (address, direction, attributes).
    /// * `data` - The chunk's window into the parent request buffer.
    /// * `now` - Simulated time of the request.
    fn access(&mut self, chunk: &SubTransaction, data: &mut [u8], now: SimTime) -> TargetReply;

    /// Highest address the target can serve, exclusive.
    fn capacity(&self) -> u64;

    /// Command and row-buffer counters, for targets that model a DRAM device.
    fn dram_stats(&self) -> Option<&DramStats> {
        None
    }
}

impl<T: MemoryTarget + ?Sized> MemoryTarget for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn access(&mut self, chunk: &SubTransaction, data: &mut [u8], now: SimTime) -> TargetReply {
        (**self).access(chunk, data, now)
    }

    fn capacity(&self) -> u64 {
        (**self).capacity()
    }

    fn dram_stats(&self) -> Option<&DramStats> {
        (**self).dram_stats()
    }
}
