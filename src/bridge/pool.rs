//! Sub-transaction Payload Pool.
//!
//! Sub-transactions live in a slot arena and are addressed by a small
//! [`PayloadHandle`]. A slot is either free or checked out; releasing a slot
//! hands the payload back to the caller and bumps the slot's generation, so a
//! handle kept past its release is detected instead of aliasing a new payload.

use super::context::RequestId;
use super::request::{AxiAttributes, ResponseStatus};
use crate::common::{BridgeError, Direction};
use std::ops::{Deref, DerefMut, Range};

/// A downstream-sized chunk of an AXI request.
///
/// `range` is the chunk's window into the parent request's buffer; the data
/// itself is never copied into the sub-transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubTransaction {
    pub parent: RequestId,
    /// Position of the chunk within its request, starting at 0.
    pub index: usize,
    pub direction: Direction,
    pub address: u64,
    pub range: Range<usize>,
    pub attributes: AxiAttributes,
    pub status: ResponseStatus,
}

impl SubTransaction {
    /// Chunk length in bytes.
    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

/// Handle to a checked-out pool slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PayloadHandle {
    index: usize,
    generation: u32,
}

impl PayloadHandle {
    pub fn slot(self) -> usize {
        self.index
    }
}

#[derive(Debug)]
enum Slot {
    Free { generation: u32 },
    CheckedOut { generation: u32, payload: SubTransaction },
}

/// Handle-indexed object pool for sub-transactions.
#[derive(Debug, Default)]
pub struct PayloadPool {
    slots: Vec<Slot>,
    free: Vec<usize>,
    in_use: usize,
    peak: usize,
}

impl PayloadPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pool with `capacity` slots allocated up front.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| Slot::Free { generation: 0 }).collect(),
            free: (0..capacity).rev().collect(),
            in_use: 0,
            peak: 0,
        }
    }

    /// Checks a payload into a free slot, growing the pool if none is left.
    pub fn acquire(&mut self, payload: SubTransaction) -> PayloadHandle {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot::Free { generation: 0 });
                self.slots.len() - 1
            }
        };
        let generation = match self.slots[index] {
            Slot::Free { generation } => generation,
            Slot::CheckedOut { generation, .. } => generation,
        };
        self.slots[index] = Slot::CheckedOut { generation, payload };
        self.in_use += 1;
        self.peak = self.peak.max(self.in_use);
        PayloadHandle { index, generation }
    }

    pub fn get(&self, handle: PayloadHandle) -> Result<&SubTransaction, BridgeError> {
        match self.slots.get(handle.index) {
            Some(Slot::CheckedOut { generation, payload }) if *generation == handle.generation => {
                Ok(payload)
            }
            _ => Err(BridgeError::StalePayload(handle.index)),
        }
    }

    /// Returns a slot to the pool and hands back its payload.
    pub fn release(&mut self, handle: PayloadHandle) -> Result<SubTransaction, BridgeError> {
        self.get(handle)?;
        let freed = Slot::Free {
            generation: handle.generation.wrapping_add(1),
        };
        match std::mem::replace(&mut self.slots[handle.index], freed) {
            Slot::CheckedOut { payload, .. } => {
                self.free.push(handle.index);
                self.in_use -= 1;
                Ok(payload)
            }
            Slot::Free { .. } => Err(BridgeError::StalePayload(handle.index)),
        }
    }

    /// Checks a payload out for the lifetime of the returned guard.
    pub fn scoped(&mut self, payload: SubTransaction) -> PayloadGuard<'_> {
        let handle = self.acquire(payload);
        PayloadGuard { pool: self, handle }
    }

    /// Slots currently checked out.
    pub fn in_use(&self) -> usize {
        self.in_use
    }

    /// Highest number of slots checked out at once.
    pub fn peak_in_use(&self) -> usize {
        self.peak
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

/// Scoped pool checkout; the slot is released when the guard drops.
pub struct PayloadGuard<'a> {
    pool: &'a mut PayloadPool,
    handle: PayloadHandle,
}

impl PayloadGuard<'_> {
    pub fn handle(&self) -> PayloadHandle {
        self.handle
    }
}

impl Deref for PayloadGuard<'_> {
    type Target = SubTransaction;

    fn deref(&self) -> &SubTransaction {
        match &self.pool.slots[self.handle.index] {
            Slot::CheckedOut { payload, .. } => payload,
            Slot::Free { .. } => unreachable!("guarded slot released early"),
        }
    }
}

impl DerefMut for PayloadGuard<'_> {
    fn deref_mut(&mut self) -> &mut SubTransaction {
        match &mut self.pool.slots[self.handle.index] {
            Slot::CheckedOut { payload, .. } => payload,
            Slot::Free { .. } => unreachable!("guarded slot released early"),
        }
    }
}

impl Drop for PayloadGuard<'_> {
    fn drop(&mut self) {
        let _ = self.pool.release(self.handle);
    }
}
