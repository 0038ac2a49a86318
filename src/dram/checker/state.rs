//! Timing-constraint state shared by all standards.
//!
//! Each table row is a command, each column a bank, bank group or rank. An
//! entry holds the earliest time that command may next be issued to that
//! resource. Entries are only ever raised.

use crate::common::{SimTime, TimingError};
use crate::dram::address::DramLocation;
use crate::dram::command::Command;
use crate::dram::memspec::Organisation;
use std::collections::VecDeque;

/// Activates tracked per rank for the four-activate window.
pub const FAW_DEPTH: usize = 4;

/// Earliest-time table indexed by `[command][resource]`.
#[derive(Debug, Clone)]
pub struct ConstraintTable {
    width: usize,
    entries: Vec<SimTime>,
}

impl ConstraintTable {
    fn new(width: usize) -> Self {
        Self {
            width,
            entries: vec![SimTime::ZERO; Command::COUNT * width],
        }
    }

    /// Number of resources (banks, groups or ranks) in the table.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Earliest legal time of `command` on resource `index`.
    pub fn get(&self, command: Command, index: usize) -> SimTime {
        self.entries[command.index() * self.width + index]
    }

    /// Raises the entry for `command` on resource `index` to at least `time`.
    pub fn raise(&mut self, command: Command, index: usize, time: SimTime) {
        self.entries[command.index() * self.width + index].raise_to(time);
    }

    /// Raises the entry for several commands at once.
    pub fn raise_all(&mut self, commands: &[Command], index: usize, time: SimTime) {
        for &command in commands {
            self.raise(command, index, time);
        }
    }
}

/// Complete timing state of one channel.
#[derive(Debug, Clone)]
pub struct TimingState {
    pub per_bank: ConstraintTable,
    pub per_bank_group: ConstraintTable,
    pub per_rank: ConstraintTable,
    /// Command/data bus occupied until this time.
    pub bus_busy_until: SimTime,
    /// Most recent ACT times per rank, oldest first.
    pub last_activates: Vec<VecDeque<SimTime>>,
}

impl TimingState {
    pub fn new(org: &Organisation) -> Self {
        Self {
            per_bank: ConstraintTable::new(org.banks_per_channel),
            per_bank_group: ConstraintTable::new(org.groups_per_channel),
            per_rank: ConstraintTable::new(org.ranks),
            bus_busy_until: SimTime::ZERO,
            last_activates: vec![VecDeque::with_capacity(FAW_DEPTH + 1); org.ranks],
        }
    }

    /// Rejects locations outside the tables.
    pub fn check_location(&self, loc: &DramLocation) -> Result<(), TimingError> {
        let bounds = [
            ("rank", loc.rank, self.per_rank.width()),
            ("bank group", loc.bank_group, self.per_bank_group.width()),
            ("bank", loc.bank, self.per_bank.width()),
        ];
        for (what, index, limit) in bounds {
            if index >= limit {
                return Err(TimingError::LocationOutOfRange { what, index, limit });
            }
        }
        Ok(())
    }

    /// Latest of `now` and every constraint class for `command` at `loc`.
    pub fn earliest(&self, command: Command, loc: &DramLocation, now: SimTime) -> SimTime {
        now.max(self.per_bank.get(command, loc.bank))
            .max(self.per_bank_group.get(command, loc.bank_group))
            .max(self.per_rank.get(command, loc.rank))
            .max(self.bus_busy_until)
    }

    /// Pushes an ACT into the rank's window.
    ///
    /// # Returns
    ///
    /// The oldest of the last four activates once four are on record, which
    /// bounds the next activate on the rank.
    pub fn push_activate(&mut self, rank: usize, issue: SimTime) -> Option<SimTime> {
        let window = &mut self.last_activates[rank];
        window.push_back(issue);
        if window.len() > FAW_DEPTH {
            window.pop_front();
        }
        if window.len() == FAW_DEPTH {
            window.front().copied()
        } else {
            None
        }
    }

    /// Marks the bus busy until at least `until`.
    pub fn occupy_bus(&mut self, until: SimTime) {
        self.bus_busy_until.raise_to(until);
    }

    /// Ranks other than `rank`.
    pub fn other_ranks(&self, rank: usize) -> impl Iterator<Item = usize> {
        (0..self.per_rank.width()).filter(move |&r| r != rank)
    }
}
