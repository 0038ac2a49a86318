//! DRAM Timing Checker.
//!
//! Computes the earliest legal issue time of a command and records the
//! effect of issued commands on future constraint windows. The state tables
//! are shared by all standards; what each command does to them is defined by
//! the per-standard rule modules.

pub mod ddr4;
pub mod lpddr5;
pub mod state;

pub use state::TimingState;

use crate::common::{SimTime, TimingError};
use crate::dram::address::DramLocation;
use crate::dram::command::Command;
use crate::dram::memspec::{MemSpec, TimingTable};

/// Per-channel timing checker.
#[derive(Debug, Clone)]
pub struct TimingChecker {
    timing: TimingTable,
    state: TimingState,
}

impl TimingChecker {
    /// Creates a checker for a resolved memory specification.
    ///
    /// All constraint entries start at time zero.
    pub fn new(spec: &MemSpec) -> Self {
        Self {
            timing: spec.timing.clone(),
            state: TimingState::new(&spec.organisation),
        }
    }

    fn standard_name(&self) -> &'static str {
        match self.timing {
            TimingTable::Lpddr5(_) => "LPDDR5",
            TimingTable::Ddr4(_) => "DDR4",
        }
    }

    fn validate(&self, command: Command, loc: &DramLocation) -> Result<(), TimingError> {
        let supported = match self.timing {
            TimingTable::Lpddr5(_) => lpddr5::supports(command),
            TimingTable::Ddr4(_) => ddr4::supports(command),
        };
        if !supported {
            return Err(TimingError::UnsupportedCommand {
                command,
                standard: self.standard_name(),
            });
        }
        self.state.check_location(loc)
    }

    /// Earliest time at or after `now` at which `command` may be issued to
    /// `loc`.
    ///
    /// # Arguments
    ///
    /// * `command` - Command to be issued.
    /// * `loc` - Target rank, bank group and bank.
    /// * `now` - Current simulated time.
    pub fn earliest_legal_time(
        &self,
        command: Command,
        loc: &DramLocation,
        now: SimTime,
    ) -> Result<SimTime, TimingError> {
        self.validate(command, loc)?;
        Ok(self.state.earliest(command, loc, now))
    }

    /// Records that `command` was issued to `loc` at `issue`.
    ///
    /// Raises every constraint entry the command affects. Entries are never
    /// lowered, so recording out of time order is harmless but pointless.
    pub fn record_issued(
        &mut self,
        command: Command,
        loc: &DramLocation,
        issue: SimTime,
    ) -> Result<(), TimingError> {
        self.validate(command, loc)?;
        log::trace!(
            "{} issued at {} on rank {} group {} bank {}",
            command,
            issue,
            loc.rank,
            loc.bank_group,
            loc.bank
        );
        match &self.timing {
            TimingTable::Lpddr5(t) => lpddr5::record(&mut self.state, t, command, loc, issue),
            TimingTable::Ddr4(t) => ddr4::record(&mut self.state, t, command, loc, issue),
        }
        Ok(())
    }

    /// Timing table the checker works from.
    pub fn timing(&self) -> &TimingTable {
        &self.timing
    }

    /// Read-only view of the constraint state.
    pub fn state(&self) -> &TimingState {
        &self.state
    }
}
