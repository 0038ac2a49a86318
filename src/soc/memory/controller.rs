//! Memory Timing Controllers.
//!
//! This module provides the memory targets that sit behind the bridge. The
//! `SimpleController` answers every access after a fixed latency. The
//! `DramController` schedules the DRAM commands each access needs, asks the
//! timing checker for the earliest legal issue time of every command, and
//! derives the response time from the last column command. Both keep the
//! actual memory contents in a [`SparseStore`].

use super::store::SparseStore;
use crate::bridge::pool::SubTransaction;
use crate::bridge::request::ResponseStatus;
use crate::common::{Direction, SimTime, TimingError};
use crate::config::PagePolicy;
use crate::dram::address::{AddressMapping, DramLocation};
use crate::dram::checker::TimingChecker;
use crate::dram::command::Command;
use crate::dram::memspec::MemSpec;
use crate::soc::traits::{MemoryTarget, TargetReply};
use crate::stats::DramStats;

fn out_of_range(addr: u64, len: usize, capacity: u64) -> bool {
    addr.checked_add(len as u64)
        .map_or(true, |end| end > capacity)
}

/// A simple memory target with fixed latency.
///
/// Models an ideal memory system where every access takes a constant amount
/// of time, ignoring row buffer locality or refresh cycles.
pub struct SimpleController {
    /// Fixed latency per access.
    latency: SimTime,
    capacity: u64,
    store: SparseStore,
}

impl SimpleController {
    /// Creates a new SimpleController.
    ///
    /// # Arguments
    ///
    /// * `latency` - Time from request to response.
    /// * `capacity` - Size of the address space in bytes.
    pub fn new(latency: SimTime, capacity: u64) -> Self {
        Self {
            latency,
            capacity,
            store: SparseStore::new(),
        }
    }
}

impl MemoryTarget for SimpleController {
    fn name(&self) -> &str {
        "simple"
    }

    /// Accepts at once and responds after the fixed latency.
    fn access(&mut self, chunk: &SubTransaction, data: &mut [u8], _now: SimTime) -> TargetReply {
        if out_of_range(chunk.address, data.len(), self.capacity) {
            return TargetReply::error(ResponseStatus::AddressError, self.latency);
        }
        match chunk.direction {
            Direction::Write => self.store.write(chunk.address, data),
            Direction::Read => self.store.read(chunk.address, data),
        }
        TargetReply::ok(SimTime::ZERO, self.latency)
    }

    fn capacity(&self) -> u64 {
        self.capacity
    }
}

/// A checker-driven DRAM controller.
///
/// Commands go out in order on a single command bus. For every access the
/// controller
///
/// * runs an all-bank refresh first if one is due,
/// * opens the target row (precharging a conflicting row under the open-page
///   policy),
/// * issues one column command per burst the access touches.
///
/// Every command waits for the checker's earliest legal time and is then
/// recorded in the checker.
pub struct DramController {
    spec: MemSpec,
    mapping: AddressMapping,
    checker: TimingChecker,
    store: SparseStore,
    page_policy: PagePolicy,
    refresh: bool,
    /// Open row per channel-global bank.
    open_rows: Vec<Option<usize>>,
    next_refresh: SimTime,
    /// Issue time of the most recent command.
    cursor: SimTime,
    burst_bytes: u64,
    stats: DramStats,
}

/// Unsupported commands or out-of-range locations mean the controller and
/// the checker disagree about the device. There is no way to continue.
fn fatal(err: TimingError) -> ! {
    panic!("DRAM controller issued an illegal command: {}", err)
}

impl DramController {
    /// Creates a controller for a device.
    ///
    /// # Arguments
    ///
    /// * `spec` - Resolved memory specification.
    /// * `mapping` - Validated address mapping for the device.
    /// * `page_policy` - Keep rows open after an access, or close them with
    ///   auto-precharge.
    /// * `refresh` - Issue periodic all-bank refreshes.
    pub fn new(spec: MemSpec, mapping: AddressMapping, page_policy: PagePolicy, refresh: bool) -> Self {
        let org = &spec.organisation;
        let burst_bytes = (org.bytes_per_column() as u64 * spec.architecture.burst_length).max(1);
        Self {
            checker: TimingChecker::new(&spec),
            open_rows: vec![None; org.banks_per_channel],
            next_refresh: spec.timing.refresh_interval(),
            cursor: SimTime::ZERO,
            burst_bytes,
            store: SparseStore::new(),
            stats: DramStats::default(),
            mapping,
            page_policy,
            refresh,
            spec,
        }
    }

    pub fn spec(&self) -> &MemSpec {
        &self.spec
    }

    pub fn checker(&self) -> &TimingChecker {
        &self.checker
    }

    /// Bytes moved by one column command.
    pub fn burst_bytes(&self) -> u64 {
        self.burst_bytes
    }

    /// Row currently open in a channel-global bank.
    pub fn open_row(&self, bank: usize) -> Option<usize> {
        self.open_rows.get(bank).copied().flatten()
    }

    fn issue(&mut self, command: Command, loc: &DramLocation, not_before: SimTime) -> SimTime {
        let at = self
            .checker
            .earliest_legal_time(command, loc, not_before.max(self.cursor))
            .unwrap_or_else(|e| fatal(e));
        self.checker
            .record_issued(command, loc, at)
            .unwrap_or_else(|e| fatal(e));
        self.cursor = at;
        self.stats.count(command);
        at
    }

    fn refresh_if_due(&mut self, now: SimTime) {
        if !self.refresh || now < self.next_refresh {
            return;
        }
        let org = self.spec.organisation.clone();
        for rank in 0..org.ranks {
            let loc = DramLocation::new(&org, rank, 0, 0);
            let banks = rank * org.banks_per_rank..(rank + 1) * org.banks_per_rank;
            if self.open_rows[banks.clone()].iter().any(Option::is_some) {
                self.issue(Command::Preab, &loc, now);
                self.open_rows[banks].fill(None);
            }
            let at = self.issue(Command::Refab, &loc, now);
            log::debug!("[DRAM] refresh rank {} at {}", rank, at);
            self.stats.refreshes += 1;
        }

        self.next_refresh += self.spec.timing.refresh_interval();
        if self.next_refresh <= now {
            self.next_refresh = now + self.spec.timing.refresh_interval();
        }
    }

    /// Makes `loc.row` the open row of its bank.
    ///
    /// # Returns
    ///
    /// The time of the first command issued and of the ACT, or `None` on a
    /// row hit.
    fn open_row_for(&mut self, loc: &DramLocation, now: SimTime) -> Option<(SimTime, SimTime)> {
        match self.open_rows[loc.bank] {
            Some(row) if row == loc.row => {
                self.stats.row_hits += 1;
                None
            }
            Some(_) => {
                self.stats.row_conflicts += 1;
                let pre = self.issue(Command::Prepb, loc, now);
                let act = self.issue(Command::Act, loc, pre);
                self.open_rows[loc.bank] = Some(loc.row);
                Some((pre, act))
            }
            None => {
                self.stats.row_misses += 1;
                let act = self.issue(Command::Act, loc, now);
                self.open_rows[loc.bank] = Some(loc.row);
                Some((act, act))
            }
        }
    }
}

impl MemoryTarget for DramController {
    fn name(&self) -> &str {
        &self.spec.memory_id
    }

    fn access(&mut self, chunk: &SubTransaction, data: &mut [u8], now: SimTime) -> TargetReply {
        let t_ck = self.spec.timing.t_ck();
        if data.is_empty() {
            return TargetReply::ok(SimTime::ZERO, t_ck);
        }
        if out_of_range(chunk.address, data.len(), self.capacity()) {
            self.stats.address_errors += 1;
            log::warn!(
                "[DRAM] access {:#x}+{} beyond {} byte device",
                chunk.address,
                data.len(),
                self.capacity()
            );
            return TargetReply::error(ResponseStatus::AddressError, t_ck);
        }

        self.refresh_if_due(now);

        let closed = self.page_policy == PagePolicy::Closed;
        let (column, data_latency) = match (chunk.direction, closed) {
            (Direction::Read, false) => (Command::Rd, self.spec.timing.read_latency()),
            (Direction::Read, true) => (Command::Rda, self.spec.timing.read_latency()),
            (Direction::Write, false) => (Command::Wr, self.spec.timing.write_latency()),
            (Direction::Write, true) => (Command::Wra, self.spec.timing.write_latency()),
        };
        let act_to_column = self.spec.timing.activate_to_column();

        let end = chunk.address + data.len() as u64;
        let mut block = chunk.address - chunk.address % self.burst_bytes;
        let mut first_issue: Option<SimTime> = None;
        let mut last_column = now;

        while block < end {
            let Some(loc) = self.mapping.decode(block, &self.spec.organisation) else {
                self.stats.address_errors += 1;
                return TargetReply::error(ResponseStatus::AddressError, t_ck);
            };

            let not_before = match self.open_row_for(&loc, now) {
                Some((first, act)) => {
                    first_issue.get_or_insert(first);
                    act + act_to_column
                }
                None => now,
            };
            last_column = self.issue(column, &loc, not_before);
            first_issue.get_or_insert(last_column);
            if closed {
                self.open_rows[loc.bank] = None;
            }
            log::trace!(
                "[DRAM] {} row {} col {} bank {} at {}",
                column,
                loc.row,
                loc.column,
                loc.bank,
                last_column
            );
            block += self.burst_bytes;
        }

        match chunk.direction {
            Direction::Write => self.store.write(chunk.address, data),
            Direction::Read => self.store.read(chunk.address, data),
        }

        let accepted = first_issue.unwrap_or(now);
        TargetReply::ok(
            accepted.saturating_sub(now),
            (last_column + data_latency).saturating_sub(now),
        )
    }

    fn capacity(&self) -> u64 {
        self.spec.memory_size_bytes()
    }

    fn dram_stats(&self) -> Option<&DramStats> {
        Some(&self.stats)
    }
}
