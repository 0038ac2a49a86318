//! LPDDR5 record rules.
//!
//! The LPDDR5 parameter set has no tRCD, tCCD_S/L or tRTP. Column-to-column
//! spacing falls back to one clock, ACT-to-column spacing to zero and
//! read-to-precharge to the read data window.

use super::state::TimingState;
use crate::common::SimTime;
use crate::dram::address::DramLocation;
use crate::dram::command::Command;
use crate::dram::memspec::lpddr5::Lpddr5Timing;

use Command::*;

const READS: &[Command] = &[Rd, Rda];
const WRITES: &[Command] = &[Wr, Wra];

/// Commands with LPDDR5 timing rules.
pub fn supports(command: Command) -> bool {
    matches!(
        command,
        Act | Prepb | Preab | Rd | Rda | Wr | Wra | Refab | Refpb | Srefen | Srefex
    )
}

/// Applies the effect of `command` issued at `issue` to the timing state.
///
/// Callers check [`supports`] first.
pub fn record(
    state: &mut TimingState,
    t: &Lpddr5Timing,
    command: Command,
    loc: &DramLocation,
    issue: SimTime,
) {
    let (bank, group, rank) = (loc.bank, loc.bank_group, loc.rank);

    let bus_until = match command {
        Rd | Rda => {
            state.per_rank.raise_all(READS, rank, issue + t.t_ck);
            state.per_rank.raise_all(WRITES, rank, issue + t.t_rdwr_l);

            state.per_bank_group.raise_all(READS, group, issue + t.t_ck);
            state.per_bank_group.raise_all(WRITES, group, issue + t.t_rdwr_s);

            for other in state.other_ranks(rank) {
                state.per_rank.raise_all(READS, other, issue + t.t_burst + t.t_rtrs);
                state.per_rank.raise_all(WRITES, other, issue + t.t_rdwr_r);
            }

            if command == Rda {
                state.per_bank.raise(Act, bank, issue + t.t_rdaact);
                state.per_rank.raise(Refab, rank, issue + t.t_rdpre + t.t_rp_pb);
            } else {
                state.per_bank.raise(Prepb, bank, issue + t.t_rdpre);
            }
            issue + t.t_burst
        }
        Wr | Wra => {
            state.per_rank.raise_all(READS, rank, issue + t.t_wrrd_l);
            state.per_rank.raise_all(WRITES, rank, issue + t.t_ck);

            state.per_bank_group.raise_all(READS, group, issue + t.t_wrrd_s);
            state.per_bank_group.raise_all(WRITES, group, issue + t.t_ck);

            for other in state.other_ranks(rank) {
                state.per_rank.raise_all(READS, other, issue + t.t_wrrd_r);
                state.per_rank.raise_all(WRITES, other, issue + t.t_burst + t.t_rtrs);
            }

            if command == Wra {
                state.per_bank.raise(Act, bank, issue + t.t_wraact);
            } else {
                state.per_bank.raise(Prepb, bank, issue + t.t_wrpre);
            }
            issue + t.t_burst
        }
        Act => {
            state.per_bank.raise(Prepb, bank, issue + t.t_ras);
            // No tRCD: column commands may follow immediately.
            state.per_bank.raise_all(&[Rd, Rda, Wr, Wra], bank, issue);
            state.per_bank.raise(Act, bank, issue + t.t_rc_pb);

            state.per_rank.raise(Act, rank, issue + t.t_rrd);
            state.per_bank_group.raise(Act, group, issue + t.t_rrd);

            if let Some(oldest) = state.push_activate(rank, issue) {
                state.per_rank.raise(Act, rank, oldest + t.t_faw);
            }
            issue + t.t_ck
        }
        Prepb => {
            state.per_bank.raise(Act, bank, issue + t.t_rp_pb);
            issue + t.t_ck
        }
        Preab => {
            state.per_rank.raise(Act, rank, issue + t.t_rp_ab);
            issue + t.t_ck
        }
        Refab => {
            state.per_rank.raise(Act, rank, issue + t.t_rfc_ab);
            state.per_rank.raise(Refab, rank, issue + t.t_rfc_ab);
            issue + t.t_ck
        }
        Refpb => {
            state.per_bank.raise(Act, bank, issue + t.t_rfc_pb);
            issue + t.t_ck
        }
        Srefen => {
            state.per_rank.raise(Srefex, rank, issue + t.t_ck);
            issue + t.t_ck
        }
        Srefex => {
            state.per_rank.raise(Srefen, rank, issue + t.t_ck);
            state.per_rank.raise(Act, rank, issue + t.t_ck);
            issue + t.t_ck
        }
        Pdea | Pdxa | Pdep | Pdxp => return,
    };

    state.occupy_bus(bus_until);
}
