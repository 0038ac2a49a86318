//! Transfer Direction.
//!
//! Classifies a transaction as a read or a write. The bridge, the downstream
//! targets and the DRAM controller all branch on this, so it lives with the
//! other shared types.

/// Direction of a memory transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Data flows from memory to the initiator.
    Read,

    /// Data flows from the initiator to memory.
    Write,
}

impl Direction {
    /// Returns `true` for [`Direction::Write`].
    pub fn is_write(self) -> bool {
        matches!(self, Direction::Write)
    }

    /// Single-letter tag used in trace output (`R` / `W`).
    pub fn tag(self) -> &'static str {
        match self {
            Direction::Read => "R",
            Direction::Write => "W",
        }
    }
}
