//! Integration tests for the DRAM timing checker.

use axi_dram_bridge::common::{SimTime, TimingError};
use axi_dram_bridge::dram::checker::TimingChecker;
use axi_dram_bridge::dram::command::Command;
use axi_dram_bridge::dram::memspec::lpddr5::Lpddr5Timing;
use axi_dram_bridge::dram::memspec::{MemSpec, MemoryStandard, TimingTable, LPDDR5_EMBEDDED};
use axi_dram_bridge::dram::DramLocation;

fn lpddr5() -> MemSpec {
    MemSpec::embedded(MemoryStandard::Lpddr5).unwrap()
}

fn ddr4() -> MemSpec {
    MemSpec::embedded(MemoryStandard::Ddr4).unwrap()
}

/// The embedded LPDDR5 device with a second rank.
fn lpddr5_two_ranks() -> MemSpec {
    let json = LPDDR5_EMBEDDED.replace("\"nbrOfRanks\": 1", "\"nbrOfRanks\": 2");
    let spec = MemSpec::from_json_str(&json).unwrap();
    assert_eq!(spec.organisation.ranks, 2);
    spec
}

fn lpddr5_timing(spec: &MemSpec) -> Lpddr5Timing {
    match &spec.timing {
        TimingTable::Lpddr5(t) => t.clone(),
        TimingTable::Ddr4(_) => panic!("expected LPDDR5 timing"),
    }
}

/// Location of `bank_in_group` in `group` on `rank`.
fn ranked(spec: &MemSpec, rank: usize, group: usize, bank_in_group: usize) -> DramLocation {
    DramLocation::new(&spec.organisation, rank, group, bank_in_group)
}

/// Location of `bank_in_group` in `group` on rank 0.
fn bank(spec: &MemSpec, group: usize, bank_in_group: usize) -> DramLocation {
    DramLocation::new(&spec.organisation, 0, group, bank_in_group)
}

/// Issues `command` at its earliest legal time and returns that time.
fn issue(checker: &mut TimingChecker, command: Command, loc: &DramLocation, now: SimTime) -> SimTime {
    let at = checker.earliest_legal_time(command, loc, now).unwrap();
    checker.record_issued(command, loc, at).unwrap();
    at
}

/// Tests that a fresh checker allows any supported command at once.
#[test]
fn test_fresh_checker_allows_everything() {
    let spec = lpddr5();
    let checker = TimingChecker::new(&spec);
    let loc = bank(&spec, 1, 2);
    for command in [Command::Act, Command::Rd, Command::Wr, Command::Refab] {
        assert_eq!(
            checker.earliest_legal_time(command, &loc, SimTime::from_ns(7)),
            Ok(SimTime::from_ns(7))
        );
    }
}

/// Tests that a second ACT on the same bank waits for tRCpb.
#[test]
fn test_lpddr5_act_to_act_same_bank_waits_trc() {
    let spec = lpddr5();
    let TimingTable::Lpddr5(t) = &spec.timing else {
        panic!("expected LPDDR5 timing");
    };
    let mut checker = TimingChecker::new(&spec);
    let loc = bank(&spec, 0, 0);

    let first = issue(&mut checker, Command::Act, &loc, SimTime::ZERO);
    let second = checker
        .earliest_legal_time(Command::Act, &loc, first)
        .unwrap();
    assert!(second >= first + t.t_rc_pb);
    assert_eq!(second, first + t.t_rc_pb);

    // Another bank only waits for tRRD.
    let other = checker
        .earliest_legal_time(Command::Act, &bank(&spec, 1, 0), first)
        .unwrap();
    assert_eq!(other, first + t.t_rrd);
}

/// Tests that a fifth ACT inside the tFAW window waits for the first plus tFAW.
#[test]
fn test_lpddr5_fifth_activate_waits_for_faw() {
    let json = LPDDR5_EMBEDDED.replace("\"FAW\": 16", "\"FAW\": 32");
    let spec = MemSpec::from_json_str(&json).unwrap();
    let TimingTable::Lpddr5(t) = &spec.timing else {
        panic!("expected LPDDR5 timing");
    };
    assert_eq!(t.t_faw, SimTime::from_ns(40));
    let mut checker = TimingChecker::new(&spec);

    let mut times = Vec::new();
    for group in 0..4 {
        times.push(issue(&mut checker, Command::Act, &bank(&spec, group, 0), SimTime::ZERO));
    }
    for pair in times.windows(2) {
        assert_eq!(pair[1], pair[0] + t.t_rrd);
    }

    let fifth = checker
        .earliest_legal_time(Command::Act, &bank(&spec, 0, 1), times[3])
        .unwrap();
    assert_eq!(fifth, times[0] + t.t_faw);
    assert!(fifth > times[3] + t.t_rrd);
}

/// Tests read-to-read and read-to-write spacing on one rank.
#[test]
fn test_lpddr5_read_spacing() {
    let spec = lpddr5();
    let TimingTable::Lpddr5(t) = &spec.timing else {
        panic!("expected LPDDR5 timing");
    };
    let mut checker = TimingChecker::new(&spec);
    let loc = bank(&spec, 0, 0);

    let rd = issue(&mut checker, Command::Rd, &loc, SimTime::ZERO);
    // The data bus holds the next read off for a full burst.
    assert_eq!(
        checker.earliest_legal_time(Command::Rd, &loc, rd),
        Ok(rd + t.t_burst)
    );
    assert_eq!(
        checker.earliest_legal_time(Command::Wr, &bank(&spec, 1, 0), rd),
        Ok(rd + t.t_rdwr_l)
    );
    assert_eq!(
        checker.earliest_legal_time(Command::Prepb, &loc, rd),
        Ok(rd + t.t_rdpre)
    );
}

/// Tests that write-to-read within a bank group waits for tWRRD_S.
#[test]
fn test_lpddr5_write_to_read() {
    let spec = lpddr5();
    let TimingTable::Lpddr5(t) = &spec.timing else {
        panic!("expected LPDDR5 timing");
    };
    let mut checker = TimingChecker::new(&spec);
    let loc = bank(&spec, 2, 1);

    let wr = issue(&mut checker, Command::Wr, &loc, SimTime::ZERO);
    assert_eq!(
        checker.earliest_legal_time(Command::Rd, &loc, wr),
        Ok(wr + t.t_wrrd_l.max(t.t_wrrd_s))
    );
    assert_eq!(
        checker.earliest_legal_time(Command::Prepb, &loc, wr),
        Ok(wr + t.t_wrpre)
    );
}

/// Tests that refresh blocks activates on the rank for tRFCab.
#[test]
fn test_lpddr5_refresh_blocks_activate() {
    let spec = lpddr5();
    let TimingTable::Lpddr5(t) = &spec.timing else {
        panic!("expected LPDDR5 timing");
    };
    let mut checker = TimingChecker::new(&spec);
    let loc = bank(&spec, 0, 0);

    let refresh = issue(&mut checker, Command::Refab, &loc, SimTime::from_ns(100));
    assert_eq!(refresh, SimTime::from_ns(100));
    assert_eq!(
        checker.earliest_legal_time(Command::Act, &bank(&spec, 3, 3), refresh),
        Ok(refresh + t.t_rfc_ab)
    );
}

/// Tests that recording never lowers an existing constraint.
#[test]
fn test_constraints_only_move_forward() {
    let spec = lpddr5();
    let mut checker = TimingChecker::new(&spec);
    let loc = bank(&spec, 0, 0);

    checker
        .record_issued(Command::Act, &loc, SimTime::from_ns(100))
        .unwrap();
    let bound = checker
        .earliest_legal_time(Command::Act, &loc, SimTime::ZERO)
        .unwrap();
    checker
        .record_issued(Command::Act, &loc, SimTime::from_ns(10))
        .unwrap();
    assert_eq!(
        checker.earliest_legal_time(Command::Act, &loc, SimTime::ZERO),
        Ok(bound)
    );
}

/// Tests that power-down commands are rejected by the LPDDR5 checker.
#[test]
fn test_lpddr5_rejects_power_down() {
    let spec = lpddr5();
    let mut checker = TimingChecker::new(&spec);
    let loc = bank(&spec, 0, 0);
    let expected = Err(TimingError::UnsupportedCommand {
        command: Command::Pdea,
        standard: "LPDDR5",
    });

    assert_eq!(
        checker.earliest_legal_time(Command::Pdea, &loc, SimTime::ZERO),
        expected
    );
    assert_eq!(
        checker.record_issued(Command::Pdea, &loc, SimTime::ZERO),
        Err(TimingError::UnsupportedCommand {
            command: Command::Pdea,
            standard: "LPDDR5",
        })
    );
}

/// Tests that locations outside the device are rejected.
#[test]
fn test_location_out_of_range() {
    let spec = lpddr5();
    let checker = TimingChecker::new(&spec);
    let loc = DramLocation {
        bank: 16,
        ..DramLocation::default()
    };
    assert_eq!(
        checker.earliest_legal_time(Command::Act, &loc, SimTime::ZERO),
        Err(TimingError::LocationOutOfRange {
            what: "bank",
            index: 16,
            limit: 16,
        })
    );
}

/// Tests that DDR4 column commands wait for tRCD after ACT.
#[test]
fn test_ddr4_activate_to_read_waits_trcd() {
    let spec = ddr4();
    let TimingTable::Ddr4(t) = &spec.timing else {
        panic!("expected DDR4 timing");
    };
    let mut checker = TimingChecker::new(&spec);
    let loc = bank(&spec, 1, 1);

    let act = issue(&mut checker, Command::Act, &loc, SimTime::ZERO);
    assert_eq!(
        checker.earliest_legal_time(Command::Rd, &loc, act),
        Ok(act + t.t_rcd)
    );
    assert_eq!(spec.timing.activate_to_column(), t.t_rcd);
}

/// Tests the DDR4 four-activate window.
#[test]
fn test_ddr4_fifth_activate_waits_for_faw() {
    let spec = ddr4();
    let TimingTable::Ddr4(t) = &spec.timing else {
        panic!("expected DDR4 timing");
    };
    let mut checker = TimingChecker::new(&spec);

    let mut times = Vec::new();
    for group in 0..4 {
        times.push(issue(&mut checker, Command::Act, &bank(&spec, group, 0), SimTime::ZERO));
    }
    let fifth = checker
        .earliest_legal_time(Command::Act, &bank(&spec, 0, 1), times[3])
        .unwrap();
    assert_eq!(fifth, times[0] + t.t_faw);
}

/// Tests that DDR4 has no per-bank refresh.
#[test]
fn test_ddr4_rejects_per_bank_refresh() {
    let spec = ddr4();
    let checker = TimingChecker::new(&spec);
    assert_eq!(
        checker.earliest_legal_time(Command::Refpb, &bank(&spec, 0, 0), SimTime::ZERO),
        Err(TimingError::UnsupportedCommand {
            command: Command::Refpb,
            standard: "DDR4",
        })
    );
}

/// Tests read spacing towards another rank.
#[test]
fn test_lpddr5_read_to_other_rank() {
    let spec = lpddr5_two_ranks();
    let t = lpddr5_timing(&spec);
    let mut checker = TimingChecker::new(&spec);
    let start = SimTime::from_ns(100);

    checker
        .record_issued(Command::Rd, &ranked(&spec, 0, 0, 0), start)
        .unwrap();
    let other = ranked(&spec, 1, 0, 0);
    assert_eq!(
        checker.earliest_legal_time(Command::Rd, &other, start),
        Ok(start + t.t_burst + t.t_rtrs)
    );
    assert_eq!(
        checker.earliest_legal_time(Command::Rda, &other, start),
        Ok(start + t.t_burst + t.t_rtrs)
    );
    assert_eq!(
        checker.earliest_legal_time(Command::Wr, &other, start),
        Ok(start + t.t_rdwr_r.max(t.t_burst))
    );
}

/// Tests write spacing towards another rank.
#[test]
fn test_lpddr5_write_to_other_rank() {
    let spec = lpddr5_two_ranks();
    let t = lpddr5_timing(&spec);
    let mut checker = TimingChecker::new(&spec);
    let start = SimTime::from_ns(100);

    checker
        .record_issued(Command::Wr, &ranked(&spec, 1, 2, 3), start)
        .unwrap();
    let other = ranked(&spec, 0, 2, 3);
    assert_eq!(
        checker.earliest_legal_time(Command::Rd, &other, start),
        Ok(start + t.t_wrrd_r.max(t.t_burst))
    );
    assert_eq!(
        checker.earliest_legal_time(Command::Wra, &other, start),
        Ok(start + t.t_burst + t.t_rtrs)
    );
    // The writing rank itself still waits for tWRRD_L.
    assert_eq!(
        checker.earliest_legal_time(Command::Rd, &ranked(&spec, 1, 0, 0), start),
        Ok(start + t.t_wrrd_l)
    );
}

/// Tests that a read with auto-precharge gates the next ACT and REFAB.
#[test]
fn test_lpddr5_read_auto_precharge() {
    let spec = lpddr5();
    let t = lpddr5_timing(&spec);
    let mut checker = TimingChecker::new(&spec);
    let loc = bank(&spec, 1, 1);
    let start = SimTime::from_ns(100);

    checker.record_issued(Command::Rda, &loc, start).unwrap();
    assert_eq!(t.t_rdaact, t.t_rdpre + t.t_rp_pb);
    assert_eq!(
        checker.earliest_legal_time(Command::Act, &loc, start),
        Ok(start + t.t_rdaact)
    );
    assert_eq!(
        checker.earliest_legal_time(Command::Refab, &bank(&spec, 3, 0), start),
        Ok(start + t.t_rdpre + t.t_rp_pb)
    );
    // Other banks only see the data bus.
    assert_eq!(
        checker.earliest_legal_time(Command::Act, &bank(&spec, 2, 0), start),
        Ok(start + t.t_burst)
    );
}

/// Tests that a write with auto-precharge gates the next ACT on the bank.
#[test]
fn test_lpddr5_write_auto_precharge() {
    let spec = lpddr5();
    let t = lpddr5_timing(&spec);
    let mut checker = TimingChecker::new(&spec);
    let loc = bank(&spec, 0, 3);
    let start = SimTime::from_ns(100);

    checker.record_issued(Command::Wra, &loc, start).unwrap();
    assert_eq!(
        checker.earliest_legal_time(Command::Act, &loc, start),
        Ok(start + t.t_wraact)
    );
    assert!(t.t_wraact > t.t_wrpre);
}

/// Tests that PREAB holds off activates on its rank for tRPab.
#[test]
fn test_lpddr5_precharge_all_to_activate() {
    let spec = lpddr5_two_ranks();
    let t = lpddr5_timing(&spec);
    let mut checker = TimingChecker::new(&spec);
    let start = SimTime::from_ns(100);

    checker
        .record_issued(Command::Preab, &ranked(&spec, 0, 0, 0), start)
        .unwrap();
    assert_eq!(
        checker.earliest_legal_time(Command::Act, &ranked(&spec, 0, 2, 1), start),
        Ok(start + t.t_rp_ab.max(t.t_ck))
    );
    assert_eq!(
        checker.earliest_legal_time(Command::Act, &ranked(&spec, 1, 2, 1), start),
        Ok(start + t.t_ck)
    );
}

/// Tests that a per-bank refresh blocks only its own bank for tRFCpb.
#[test]
fn test_lpddr5_per_bank_refresh_to_activate() {
    let spec = lpddr5();
    let t = lpddr5_timing(&spec);
    let mut checker = TimingChecker::new(&spec);
    let loc = bank(&spec, 1, 2);
    let start = SimTime::from_ns(100);

    checker.record_issued(Command::Refpb, &loc, start).unwrap();
    assert_eq!(
        checker.earliest_legal_time(Command::Act, &loc, start),
        Ok(start + t.t_rfc_pb.max(t.t_ck))
    );
    assert_eq!(
        checker.earliest_legal_time(Command::Act, &bank(&spec, 1, 3), start),
        Ok(start + t.t_ck)
    );
}

/// Tests that self-refresh entry and exit block each other on their rank.
#[test]
fn test_lpddr5_self_refresh_entry_and_exit() {
    let spec = lpddr5_two_ranks();
    let t = lpddr5_timing(&spec);
    let mut checker = TimingChecker::new(&spec);
    let loc = ranked(&spec, 0, 0, 0);

    let entry = SimTime::from_ns(100);
    checker.record_issued(Command::Srefen, &loc, entry).unwrap();
    let ranks = &checker.state().per_rank;
    assert_eq!(ranks.get(Command::Srefex, 0), entry + t.t_ck);
    assert_eq!(ranks.get(Command::Srefen, 0), SimTime::ZERO);
    assert_eq!(ranks.get(Command::Srefex, 1), SimTime::ZERO);

    let exit = SimTime::from_ns(500);
    checker.record_issued(Command::Srefex, &loc, exit).unwrap();
    let ranks = &checker.state().per_rank;
    assert_eq!(ranks.get(Command::Srefen, 0), exit + t.t_ck);
    assert_eq!(ranks.get(Command::Act, 0), exit + t.t_ck);
    assert_eq!(ranks.get(Command::Act, 1), SimTime::ZERO);
}

/// Tests that an ACT occupies the command bus for one clock.
#[test]
fn test_lpddr5_activate_holds_bus_one_clock() {
    let spec = lpddr5_two_ranks();
    let t = lpddr5_timing(&spec);
    let mut checker = TimingChecker::new(&spec);
    let loc = ranked(&spec, 0, 0, 0);
    let start = SimTime::from_ns(100);

    checker.record_issued(Command::Act, &loc, start).unwrap();
    assert_eq!(checker.state().bus_busy_until, start + t.t_ck);
    // No tRCD on LPDDR5: the column command only waits for the bus.
    assert_eq!(
        checker.earliest_legal_time(Command::Rd, &loc, start),
        Ok(start + t.t_ck)
    );
    assert_eq!(
        checker.earliest_legal_time(Command::Act, &ranked(&spec, 1, 0, 0), start),
        Ok(start + t.t_ck)
    );
}
