//! Integration tests for configuration loading.

use axi_dram_bridge::common::{ConfigError, SimTime};
use axi_dram_bridge::config::{Config, ControllerKind, PagePolicy};
use axi_dram_bridge::dram::memspec::{MemoryStandard, LPDDR5_EMBEDDED};
use axi_dram_bridge::sim::loader;
use axi_dram_bridge::soc::{MemoryTarget, System};
use std::fs;
use std::path::PathBuf;

/// Writes `contents` to a uniquely named file in the temp directory.
fn temp_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("axi_bridge_{}_{}", std::process::id(), name));
    fs::write(&path, contents).unwrap();
    path
}

/// Tests the defaults of an empty configuration.
#[test]
fn test_empty_config_uses_defaults() {
    let config = Config::from_toml_str("").unwrap();

    assert!(config.general.verbose);
    assert_eq!(config.bridge.axi_data_width, 128);
    assert_eq!(config.bridge.beat_bytes(), 32);
    assert_eq!(config.bridge.max_outstanding_val(), 16);
    assert_eq!(config.bridge.request_queue_depth_val(), 16);
    assert_eq!(config.bridge.base_latency(), SimTime::ZERO);
    assert_eq!(config.memory.controller, ControllerKind::Dram);
    assert_eq!(config.memory.standard, "LPDDR5");
    assert_eq!(config.memory.page_policy, PagePolicy::Open);
    assert!(config.memory.refresh);
    assert_eq!(config.simulation.clock_period(), SimTime::from_ns(1));
    assert_eq!(config.simulation.step(), config.simulation.clock_period());
}

/// Tests a partial configuration overriding selected keys.
#[test]
fn test_partial_config_overrides() {
    let config = Config::from_toml_str(
        r#"
        [bridge]
        downstream_beat_bytes = 64
        beat_latency_ps = 1500

        [memory]
        controller = "Simple"
        standard = "DDR4"
        page_policy = "Closed"

        [simulation]
        step_ps = 250
        "#,
    )
    .unwrap();

    assert_eq!(config.bridge.beat_bytes(), 64);
    assert_eq!(config.bridge.beat_latency(), SimTime::from_ps(1_500));
    assert_eq!(config.bridge.max_outstanding, 16);
    assert_eq!(config.memory.controller, ControllerKind::Simple);
    assert_eq!(config.memory.page_policy, PagePolicy::Closed);
    assert_eq!(config.simulation.step(), SimTime::from_ps(250));
}

/// Tests that zero-valued limits are clamped.
#[test]
fn test_zero_limits_are_clamped() {
    let config = Config::from_toml_str(
        r#"
        [bridge]
        downstream_beat_bytes = 0
        max_outstanding = 0
        request_queue_depth = 0
        "#,
    )
    .unwrap();
    assert_eq!(config.bridge.beat_bytes(), 1);
    assert_eq!(config.bridge.max_outstanding_val(), 1);
    assert_eq!(config.bridge.request_queue_depth_val(), 1);
}

/// Tests that malformed TOML is reported.
#[test]
fn test_invalid_toml_is_rejected() {
    assert!(Config::from_toml_str("[bridge\nmax_outstanding = 1").is_err());
    assert!(Config::from_toml_str("[bridge]\nmax_outstanding = \"many\"").is_err());
}

/// Tests loading a configuration file from disk.
#[test]
fn test_load_config_from_file() {
    let path = temp_file("config.toml", "[general]\nverbose = false\ndump_bytes = 16\n");
    let config = loader::load_config(&path).unwrap();
    fs::remove_file(&path).ok();

    assert!(!config.general.verbose);
    assert_eq!(config.general.dump_bytes, 16);
}

/// Tests that a missing file is an I/O error naming the path.
#[test]
fn test_missing_config_file() {
    let path = PathBuf::from("/nonexistent/axi_bridge/config.toml");
    match loader::load_config(&path) {
        Err(ConfigError::Io { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected an I/O error, got {:?}", other.map(|_| ())),
    }
}

/// Tests that an unknown standard aborts system construction.
#[test]
fn test_unknown_standard_is_fatal() {
    let mut config = Config::default();
    config.memory.standard = "HBM3".to_string();
    assert!(matches!(
        System::new(&config, None),
        Err(ConfigError::UnsupportedStandard(_))
    ));
}

/// Tests resolving the memspec and address mapping from files.
#[test]
fn test_resolve_from_files() {
    let memspec = temp_file("memspec.json", LPDDR5_EMBEDDED);
    let mapping = temp_file(
        "mapping.json",
        r#"{
            "BYTE_BIT": [0],
            "COLUMN_BIT": [1, 2, 3, 4, 5, 6, 7, 8, 9, 10],
            "BANK_BIT": [11, 12],
            "BANKGROUP_BIT": [13, 14],
            "ROW_BIT": [15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26, 27, 28, 29, 30]
        }"#,
    );

    let mut config = Config::default();
    config.general.verbose = false;
    config.memory.memspec_path = Some(memspec.display().to_string());
    config.memory.address_mapping_path = Some(mapping.display().to_string());

    let spec = loader::resolve_memspec(&config).unwrap();
    assert_eq!(spec.standard, MemoryStandard::Lpddr5);
    let resolved = loader::resolve_address_mapping(&config, &spec).unwrap();
    assert_eq!(resolved.bank_bits, vec![11, 12]);

    let system = System::new(&config, None).unwrap();
    assert_eq!(system.target.name(), "JEDEC_16Gb_LPDDR5-6400_16bit");
    assert_eq!(system.target.capacity(), 1 << 31);

    fs::remove_file(&memspec).ok();
    fs::remove_file(&mapping).ok();
}

/// Tests that an address mapping too wide for the device is rejected.
#[test]
fn test_resolve_rejects_bad_mapping() {
    let mapping = temp_file(
        "bad_mapping.json",
        r#"{ "COLUMN_BIT": [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11], "BANK_BIT": [12], "ROW_BIT": [13] }"#,
    );
    let mut config = Config::default();
    config.memory.address_mapping_path = Some(mapping.display().to_string());

    let spec = loader::resolve_memspec(&config).unwrap();
    assert!(matches!(
        loader::resolve_address_mapping(&config, &spec),
        Err(ConfigError::InvalidArchitecture(_))
    ));
    fs::remove_file(&mapping).ok();
}

/// Tests the shipped configuration file.
#[test]
fn test_shipped_default_config_parses() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("configs/default.toml");
    let config = loader::load_config(&path).unwrap();
    assert_eq!(config.bridge.beat_bytes(), 32);
    assert_eq!(config.memory.controller, ControllerKind::Dram);
}
