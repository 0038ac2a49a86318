//! DDR4 record rules.

use super::state::TimingState;
use crate::common::SimTime;
use crate::dram::address::DramLocation;
use crate::dram::command::Command;
use crate::dram::memspec::ddr4::Ddr4Timing;

use Command::*;

const READS: &[Command] = &[Rd, Rda];
const WRITES: &[Command] = &[Wr, Wra];
const COLUMNS: &[Command] = &[Rd, Rda, Wr, Wra];

/// Commands with DDR4 timing rules. DDR4 has no per-bank refresh.
pub fn supports(command: Command) -> bool {
    matches!(
        command,
        Act | Prepb | Preab | Rd | Rda | Wr | Wra | Refab | Srefen | Srefex
    )
}

/// Applies the effect of `command` issued at `issue` to the timing state.
pub fn record(
    state: &mut TimingState,
    t: &Ddr4Timing,
    command: Command,
    loc: &DramLocation,
    issue: SimTime,
) {
    let (bank, group, rank) = (loc.bank, loc.bank_group, loc.rank);

    match command {
        Rd | Rda => {
            state.per_bank_group.raise_all(READS, group, issue + t.t_ccd_l);
            state.per_bank_group.raise_all(WRITES, group, issue + t.t_rdwr);

            state.per_rank.raise_all(READS, rank, issue + t.t_ccd_s);
            state.per_rank.raise_all(WRITES, rank, issue + t.t_rdwr);

            for other in state.other_ranks(rank) {
                state.per_rank.raise_all(READS, other, issue + t.t_burst + t.t_rtrs);
                state.per_rank.raise_all(WRITES, other, issue + t.t_rdwr_r);
            }

            if command == Rda {
                state.per_bank.raise(Act, bank, issue + t.t_rdaact);
                state.per_rank.raise(Refab, rank, issue + t.t_rdpre + t.t_rp);
            } else {
                state.per_bank.raise(Prepb, bank, issue + t.t_rdpre);
            }
        }
        Wr | Wra => {
            state.per_bank_group.raise_all(READS, group, issue + t.t_wrrd_l);
            state.per_bank_group.raise_all(WRITES, group, issue + t.t_ccd_l);

            state.per_rank.raise_all(READS, rank, issue + t.t_wrrd_s);
            state.per_rank.raise_all(WRITES, rank, issue + t.t_ccd_s);

            for other in state.other_ranks(rank) {
                state.per_rank.raise_all(READS, other, issue + t.t_wrrd_r);
                state.per_rank.raise_all(WRITES, other, issue + t.t_burst + t.t_rtrs);
            }

            if command == Wra {
                state.per_bank.raise(Act, bank, issue + t.t_wraact);
            } else {
                state.per_bank.raise(Prepb, bank, issue + t.t_wrpre);
            }
        }
        Act => {
            state
                .per_bank
                .raise_all(COLUMNS, bank, issue + t.t_rcd.saturating_sub(t.t_al));
            state.per_bank.raise(Prepb, bank, issue + t.t_ras);
            state.per_bank.raise(Act, bank, issue + t.t_rc);

            state.per_bank_group.raise(Act, group, issue + t.t_rrd_l);
            state.per_rank.raise(Act, rank, issue + t.t_rrd_s);
            state.per_rank.raise(Preab, rank, issue + t.t_ras);
            state.per_rank.raise(Refab, rank, issue + t.t_rc);

            if let Some(oldest) = state.push_activate(rank, issue) {
                state.per_rank.raise(Act, rank, oldest + t.t_faw);
            }
        }
        Prepb => {
            state.per_bank.raise(Act, bank, issue + t.t_rp);
        }
        Preab => {
            state.per_rank.raise(Act, rank, issue + t.t_rp);
            state.per_rank.raise(Refab, rank, issue + t.t_rp);
        }
        Refab => {
            state.per_rank.raise(Act, rank, issue + t.t_rfc);
            state.per_rank.raise(Refab, rank, issue + t.t_rfc);
        }
        Srefen => {
            state.per_rank.raise(Srefex, rank, issue + t.t_ckesr);
        }
        Srefex => {
            state.per_rank.raise(Act, rank, issue + t.t_xs);
            state.per_rank.raise(Refab, rank, issue + t.t_xs);
        }
        Refpb | Pdea | Pdxa | Pdep | Pdxp => return,
    }

    // DDR4 commands occupy the command bus for a single clock.
    state.occupy_bus(issue + t.t_ck);
}
