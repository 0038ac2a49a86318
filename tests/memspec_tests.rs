//! Integration tests for memory specifications and address mappings.

use axi_dram_bridge::common::{ConfigError, SimTime};
use axi_dram_bridge::dram::memspec::{
    MemSpec, MemoryStandard, TimingTable, DDR4_EMBEDDED, LPDDR5_EMBEDDED,
};
use axi_dram_bridge::dram::AddressMapping;

/// Strips the `memspec` wrapper from an embedded spec.
fn bare(json: &str) -> String {
    let value: serde_json::Value = serde_json::from_str(json).unwrap();
    value["memspec"].to_string()
}

/// Tests the organisation and clock of the embedded LPDDR5 device.
#[test]
fn test_lpddr5_embedded_organisation() {
    let spec = MemSpec::embedded(MemoryStandard::Lpddr5).unwrap();
    let org = &spec.organisation;

    assert_eq!(spec.standard, MemoryStandard::Lpddr5);
    assert_eq!(spec.memory_id, "JEDEC_16Gb_LPDDR5-6400_16bit");
    assert_eq!(org.banks_per_rank, 16);
    assert_eq!(org.groups_per_rank, 4);
    assert_eq!(org.banks_per_group, 4);
    assert_eq!(org.bytes_per_column(), 2);
    assert_eq!(spec.memory_size_bytes(), 1 << 31);
    assert_eq!(spec.timing.t_ck(), SimTime::from_ps(1_250));
    assert!(!spec.power.is_empty());

    let TimingTable::Lpddr5(t) = &spec.timing else {
        panic!("expected LPDDR5 timing");
    };
    // BL16 at eight data beats per clock takes two clocks.
    assert_eq!(t.t_burst, SimTime::from_ps(2_500));
    assert_eq!(t.t_rc_pb, SimTime::from_ns(60));
    assert_eq!(t.t_rdaact, t.t_rdpre + t.t_rp_pb);
}

/// Tests that the `memspec` wrapper is optional.
#[test]
fn test_wrapper_is_optional() {
    let wrapped = MemSpec::from_json_str(LPDDR5_EMBEDDED).unwrap();
    let plain = MemSpec::from_json_str(&bare(LPDDR5_EMBEDDED)).unwrap();
    assert_eq!(wrapped.organisation, plain.organisation);
    assert_eq!(wrapped.timing, plain.timing);
}

/// Tests the DDR4 refresh mode selecting tRFC.
#[test]
fn test_ddr4_refresh_mode_selects_trfc() {
    let spec = MemSpec::from_json_str(DDR4_EMBEDDED).unwrap();
    let TimingTable::Ddr4(t) = &spec.timing else {
        panic!("expected DDR4 timing");
    };
    assert_eq!(t.t_rfc, SimTime::cycles(t.t_ck, 420.0));

    let fgr = DDR4_EMBEDDED.replace("\"RefMode\": 1", "\"RefMode\": 4");
    let spec = MemSpec::from_json_str(&fgr).unwrap();
    let TimingTable::Ddr4(t) = &spec.timing else {
        panic!("expected DDR4 timing");
    };
    assert_eq!(t.t_rfc, SimTime::cycles(t.t_ck, 192.0));
}

/// Tests that standard names are matched without regard to case.
#[test]
fn test_standard_names() {
    assert_eq!(MemoryStandard::from_name("lpddr5").unwrap(), MemoryStandard::Lpddr5);
    assert_eq!(MemoryStandard::from_name("DDR4").unwrap(), MemoryStandard::Ddr4);
    assert!(matches!(
        MemoryStandard::from_name("HBM2"),
        Err(ConfigError::UnsupportedStandard(name)) if name == "HBM2"
    ));
    assert_eq!(MemoryStandard::Ddr4.to_string(), "DDR4");
}

/// Tests that an unknown memory type fails to parse.
#[test]
fn test_unknown_memory_type_is_rejected() {
    let json = LPDDR5_EMBEDDED.replace("\"memoryType\": \"LPDDR5\"", "\"memoryType\": \"GDDR7\"");
    assert!(matches!(MemSpec::from_json_str(&json), Err(ConfigError::Json(_))));
}

/// Tests that unusable architectures are rejected.
#[test]
fn test_invalid_architecture_is_rejected() {
    let no_banks = LPDDR5_EMBEDDED.replace("\"nbrOfBanks\": 16", "\"nbrOfBanks\": 0");
    assert!(matches!(
        MemSpec::from_json_str(&no_banks),
        Err(ConfigError::InvalidArchitecture(_))
    ));

    let uneven = LPDDR5_EMBEDDED.replace("\"nbrOfBankGroups\": 4", "\"nbrOfBankGroups\": 3");
    assert!(matches!(
        MemSpec::from_json_str(&uneven),
        Err(ConfigError::InvalidArchitecture(_))
    ));
}

/// Tests parsing and validating a DRAMSys address mapping.
#[test]
fn test_address_mapping_from_json() {
    let spec = MemSpec::embedded(MemoryStandard::Lpddr5).unwrap();
    let json = r#"{
        "addressmapping": {
            "BYTE_BIT": [0],
            "COLUMN_BIT": [1, 2, 3, 4, 5, 6, 7, 8, 9, 10],
            "BANKGROUP_BIT": [11, 12],
            "BANK_BIT": [13, 14],
            "ROW_BIT": [15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26, 27, 28, 29, 30]
        }
    }"#;
    let mapping = AddressMapping::from_json_str(json).unwrap();
    mapping.validate(&spec.organisation).unwrap();
    assert_eq!(mapping.mapped_mask(), (1u64 << 31) - 1);

    // Bit 11 now selects the bank group.
    let loc = mapping.decode(1 << 11, &spec.organisation).unwrap();
    assert_eq!(loc.bank_group, 1);
    assert_eq!(loc.bank, 4);
}

/// Tests that a mapping wider than the device is rejected.
#[test]
fn test_address_mapping_too_wide() {
    let spec = MemSpec::embedded(MemoryStandard::Lpddr5).unwrap();
    let mut mapping = AddressMapping::linear(&spec.organisation).unwrap();
    mapping.bank_bits.push(40);
    assert!(matches!(
        mapping.validate(&spec.organisation),
        Err(ConfigError::InvalidArchitecture(_))
    ));
}

/// Tests that tBURST counts whole clocks of burst length over data rate.
#[test]
fn test_burst_duration_uses_whole_clocks() {
    let json = LPDDR5_EMBEDDED.replace("\"burstLength\": 16", "\"burstLength\": 12");
    let spec = MemSpec::from_json_str(&json).unwrap();
    let TimingTable::Lpddr5(t) = &spec.timing else {
        panic!("expected LPDDR5 timing");
    };
    // 12 / 8 truncates to one clock.
    assert_eq!(t.t_burst, t.t_ck);
    assert_eq!(t.t_rdpre, t.t_rl + t.t_ck);
}
