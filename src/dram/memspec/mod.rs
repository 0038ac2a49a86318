//! Memory Specifications.
//!
//! Parses DRAMUtils-style memspec JSON and resolves it into a [`MemSpec`]:
//! the device organisation plus a per-standard [`TimingTable`] with all
//! timing values already converted to simulated time.
//!
//! The standard is selected by the `memoryType` key, so a single file format
//! covers every supported device family:
//!
//! ```json
//! { "memspec": { "memoryType": "LPDDR5", "memoryId": "...",
//!                "memarchitecturespec": { ... },
//!                "memtimingspec": { ... },
//!                "mempowerspec": { ... } } }
//! ```

pub mod ddr4;
pub mod lpddr5;

use crate::common::{ConfigError, SimTime};
use ddr4::{Ddr4Timing, Ddr4TimingSpec};
use lpddr5::{Lpddr5Timing, Lpddr5TimingSpec};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

/// `memarchitecturespec` section; identical layout across standards.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Architecture {
    pub nbr_of_channels: u64,
    pub nbr_of_devices: u64,
    pub nbr_of_ranks: u64,
    pub nbr_of_banks: u64,
    #[serde(default)]
    pub nbr_of_bank_groups: u64,
    pub nbr_of_rows: u64,
    pub nbr_of_columns: u64,
    pub burst_length: u64,
    pub data_rate: u64,
    pub width: u64,
    /// DDR4 fine-granularity refresh mode (1, 2 or 4).
    #[serde(rename = "RefMode", default)]
    pub ref_mode: Option<u64>,
}

/// An LPDDR5 memspec as stored on disk.
#[derive(Debug, Clone, Deserialize)]
pub struct Lpddr5Spec {
    #[serde(rename = "memoryId")]
    pub memory_id: String,
    pub memarchitecturespec: Architecture,
    pub memtimingspec: Lpddr5TimingSpec,
    /// Currents and voltages; carried along but not evaluated.
    #[serde(default)]
    pub mempowerspec: BTreeMap<String, f64>,
}

/// A DDR4 memspec as stored on disk.
#[derive(Debug, Clone, Deserialize)]
pub struct Ddr4Spec {
    #[serde(rename = "memoryId")]
    pub memory_id: String,
    pub memarchitecturespec: Architecture,
    pub memtimingspec: Ddr4TimingSpec,
    #[serde(default)]
    pub mempowerspec: BTreeMap<String, f64>,
}

/// Raw memspec, tagged by its `memoryType` string.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "memoryType")]
pub enum MemSpecConfig {
    #[serde(rename = "LPDDR5")]
    Lpddr5(Lpddr5Spec),
    #[serde(rename = "DDR4")]
    Ddr4(Ddr4Spec),
}

/// Supported memory standards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryStandard {
    Lpddr5,
    Ddr4,
}

impl MemoryStandard {
    /// Identifier string as used in memspec files.
    pub fn name(self) -> &'static str {
        match self {
            MemoryStandard::Lpddr5 => "LPDDR5",
            MemoryStandard::Ddr4 => "DDR4",
        }
    }

    /// Parses a standard identifier, ignoring case.
    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        match name.to_ascii_uppercase().as_str() {
            "LPDDR5" => Ok(MemoryStandard::Lpddr5),
            "DDR4" => Ok(MemoryStandard::Ddr4),
            _ => Err(ConfigError::UnsupportedStandard(name.to_string())),
        }
    }
}

impl fmt::Display for MemoryStandard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Device organisation, with per-channel totals precomputed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Organisation {
    pub channels: usize,
    pub ranks: usize,
    pub banks_per_rank: usize,
    pub groups_per_rank: usize,
    pub banks_per_group: usize,
    pub banks_per_channel: usize,
    pub groups_per_channel: usize,
    pub rows: usize,
    pub columns: usize,
    pub width_bits: usize,
    pub devices_per_rank: usize,
}

impl Organisation {
    fn from_architecture(arch: &Architecture) -> Result<Self, ConfigError> {
        let nonzero = |value: u64, what: &str| {
            if value == 0 {
                Err(ConfigError::InvalidArchitecture(format!("{} must be non-zero", what)))
            } else {
                Ok(value as usize)
            }
        };

        let channels = nonzero(arch.nbr_of_channels, "nbrOfChannels")?;
        let ranks = nonzero(arch.nbr_of_ranks, "nbrOfRanks")?;
        let banks_per_rank = nonzero(arch.nbr_of_banks, "nbrOfBanks")?;
        let rows = nonzero(arch.nbr_of_rows, "nbrOfRows")?;
        let columns = nonzero(arch.nbr_of_columns, "nbrOfColumns")?;
        let width_bits = nonzero(arch.width, "width")?;
        let devices_per_rank = nonzero(arch.nbr_of_devices, "nbrOfDevices")?;
        nonzero(arch.burst_length, "burstLength")?;
        nonzero(arch.data_rate, "dataRate")?;

        // A device without bank groups behaves as a single group per rank.
        let groups_per_rank = arch.nbr_of_bank_groups.max(1) as usize;
        if banks_per_rank % groups_per_rank != 0 {
            return Err(ConfigError::InvalidArchitecture(format!(
                "{} banks cannot be split into {} bank groups",
                banks_per_rank, groups_per_rank
            )));
        }

        Ok(Self {
            channels,
            ranks,
            banks_per_rank,
            groups_per_rank,
            banks_per_group: banks_per_rank / groups_per_rank,
            banks_per_channel: banks_per_rank * ranks,
            groups_per_channel: groups_per_rank * ranks,
            rows,
            columns,
            width_bits,
            devices_per_rank,
        })
    }

    /// Bytes moved by one column access across all devices of a rank.
    pub fn bytes_per_column(&self) -> usize {
        (self.width_bits * self.devices_per_rank / 8).max(1)
    }

    /// Capacity of one channel in bytes.
    pub fn channel_bytes(&self) -> u64 {
        self.banks_per_channel as u64
            * self.rows as u64
            * self.columns as u64
            * self.bytes_per_column() as u64
    }
}

/// Per-standard timing table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimingTable {
    Lpddr5(Lpddr5Timing),
    Ddr4(Ddr4Timing),
}

impl TimingTable {
    /// Clock period.
    pub fn t_ck(&self) -> SimTime {
        match self {
            TimingTable::Lpddr5(t) => t.t_ck,
            TimingTable::Ddr4(t) => t.t_ck,
        }
    }

    /// Duration of one data burst on the DQ bus.
    pub fn burst_duration(&self) -> SimTime {
        match self {
            TimingTable::Lpddr5(t) => t.t_burst,
            TimingTable::Ddr4(t) => t.t_burst,
        }
    }

    /// Time from a READ command until its last data beat.
    pub fn read_latency(&self) -> SimTime {
        match self {
            TimingTable::Lpddr5(t) => t.t_rl + t.t_burst,
            TimingTable::Ddr4(t) => t.t_rl + t.t_burst,
        }
    }

    /// Time from a WRITE command until its last data beat.
    pub fn write_latency(&self) -> SimTime {
        match self {
            TimingTable::Lpddr5(t) => t.t_wl + t.t_burst,
            TimingTable::Ddr4(t) => t.t_wl + t.t_burst,
        }
    }

    /// Minimum spacing between ACT and the first column command on a bank.
    ///
    /// The LPDDR5 parameter set has no tRCD, so the activate completes
    /// immediately there.
    pub fn activate_to_column(&self) -> SimTime {
        match self {
            TimingTable::Lpddr5(_) => SimTime::ZERO,
            TimingTable::Ddr4(t) => t.t_rcd.saturating_sub(t.t_al),
        }
    }

    /// Average all-bank refresh interval.
    pub fn refresh_interval(&self) -> SimTime {
        match self {
            TimingTable::Lpddr5(t) => t.t_refi,
            TimingTable::Ddr4(t) => t.t_refi,
        }
    }
}

/// A resolved memory specification.
#[derive(Debug, Clone)]
pub struct MemSpec {
    pub standard: MemoryStandard,
    pub memory_id: String,
    pub architecture: Architecture,
    pub organisation: Organisation,
    pub timing: TimingTable,
    pub power: BTreeMap<String, f64>,
}

impl MemSpec {
    /// Resolves a parsed memspec into organisation and timing tables.
    pub fn from_config(config: MemSpecConfig) -> Result<Self, ConfigError> {
        match config {
            MemSpecConfig::Lpddr5(spec) => {
                let organisation = Organisation::from_architecture(&spec.memarchitecturespec)?;
                let timing =
                    Lpddr5Timing::derive(&spec.memtimingspec, &spec.memarchitecturespec);
                Ok(Self {
                    standard: MemoryStandard::Lpddr5,
                    memory_id: spec.memory_id,
                    architecture: spec.memarchitecturespec,
                    organisation,
                    timing: TimingTable::Lpddr5(timing),
                    power: spec.mempowerspec,
                })
            }
            MemSpecConfig::Ddr4(spec) => {
                let organisation = Organisation::from_architecture(&spec.memarchitecturespec)?;
                let timing = Ddr4Timing::derive(&spec.memtimingspec, &spec.memarchitecturespec);
                Ok(Self {
                    standard: MemoryStandard::Ddr4,
                    memory_id: spec.memory_id,
                    architecture: spec.memarchitecturespec,
                    organisation,
                    timing: TimingTable::Ddr4(timing),
                    power: spec.mempowerspec,
                })
            }
        }
    }

    /// Parses memspec JSON. Both the wrapped (`{"memspec": {...}}`) and the
    /// bare form are accepted.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let mut value: serde_json::Value = serde_json::from_str(json)?;
        if let Some(inner) = value.get_mut("memspec") {
            value = inner.take();
        }
        let config: MemSpecConfig = serde_json::from_value(value)?;
        Self::from_config(config)
    }

    /// Loads one of the memspecs shipped with the crate.
    pub fn embedded(standard: MemoryStandard) -> Result<Self, ConfigError> {
        match standard {
            MemoryStandard::Lpddr5 => Self::from_json_str(LPDDR5_EMBEDDED),
            MemoryStandard::Ddr4 => Self::from_json_str(DDR4_EMBEDDED),
        }
    }

    /// Channel capacity in bytes.
    pub fn memory_size_bytes(&self) -> u64 {
        self.organisation.channel_bytes()
    }

    /// Logs the device summary.
    pub fn log_summary(&self) {
        let org = &self.organisation;
        log::info!("Memory Configuration");
        log::info!("  Memory type:          {}", self.standard);
        log::info!("  Memory id:            {}", self.memory_id);
        log::info!("  Memory size in bytes: {}", self.memory_size_bytes());
        log::info!("  Ranks per channel:    {}", org.ranks);
        log::info!("  Bank groups per rank: {}", org.groups_per_rank);
        log::info!("  Banks per group:      {}", org.banks_per_group);
        log::info!("  Rows per bank:        {}", org.rows);
        log::info!("  Columns per row:      {}", org.columns);
        log::info!("  Device width in bits: {}", org.width_bits);
        log::info!("  tCK:                  {}", self.timing.t_ck());
    }
}

/// JEDEC LPDDR5-6400 x16 device, one rank.
pub const LPDDR5_EMBEDDED: &str = r#"
{
    "memspec": {
        "memoryId": "JEDEC_16Gb_LPDDR5-6400_16bit",
        "memoryType": "LPDDR5",
        "memarchitecturespec": {
            "nbrOfChannels": 1,
            "nbrOfDevices": 1,
            "nbrOfRanks": 1,
            "nbrOfBanks": 16,
            "nbrOfBankGroups": 4,
            "nbrOfRows": 65536,
            "nbrOfColumns": 1024,
            "burstLength": 16,
            "dataRate": 8,
            "width": 16
        },
        "memtimingspec": {
            "REFI": 3124,
            "REFIpb": 390,
            "RFCab": 224,
            "RFCpb": 112,
            "RAS": 34,
            "RPab": 17,
            "RPpb": 15,
            "RCab": 51,
            "RCpb": 48,
            "PPD": 2,
            "FAW": 16,
            "RRD": 4,
            "RL": 17,
            "WL": 9,
            "WCK2DQO": 1,
            "WR": 28,
            "WTR_L": 10,
            "WTR_S": 5,
            "RTRS": 1,
            "tCK": 1.25e-9
        },
        "mempowerspec": {
            "vdd1": 1.8,
            "vdd2h": 1.05,
            "vdd2l": 0.9,
            "vddq": 0.5,
            "idd01": 5.0e-3,
            "idd02h": 60.0e-3,
            "idd2n1": 2.0e-3,
            "idd2n2h": 30.0e-3,
            "idd3n1": 2.5e-3,
            "idd3n2h": 35.0e-3,
            "idd4r1": 3.0e-3,
            "idd4r2h": 230.0e-3,
            "idd4w1": 3.0e-3,
            "idd4w2h": 200.0e-3,
            "idd51": 15.0e-3,
            "idd52h": 100.0e-3,
            "idd61": 0.3e-3,
            "idd62h": 0.6e-3
        }
    }
}
"#;

/// JEDEC DDR4-2400 x8 device, eight devices per rank.
pub const DDR4_EMBEDDED: &str = r#"
{
    "memspec": {
        "memoryId": "JEDEC_8Gb_DDR4-2400_8bit",
        "memoryType": "DDR4",
        "memarchitecturespec": {
            "nbrOfChannels": 1,
            "nbrOfDevices": 8,
            "nbrOfRanks": 1,
            "nbrOfBanks": 16,
            "nbrOfBankGroups": 4,
            "nbrOfRows": 65536,
            "nbrOfColumns": 1024,
            "burstLength": 8,
            "dataRate": 2,
            "width": 8,
            "RefMode": 1
        },
        "memtimingspec": {
            "CKE": 6,
            "CKESR": 7,
            "RAS": 39,
            "RC": 55,
            "RCD": 16,
            "RL": 16,
            "RPRE": 1,
            "RTP": 9,
            "WL": 12,
            "WPRE": 1,
            "WR": 18,
            "XP": 8,
            "XS": 324,
            "REFI": 9360,
            "RFC1": 420,
            "RFC2": 312,
            "RFC4": 192,
            "RP": 16,
            "DQSCK": 2,
            "CCD_S": 4,
            "CCD_L": 6,
            "FAW": 26,
            "RRD_S": 4,
            "RRD_L": 6,
            "WTR_S": 3,
            "WTR_L": 9,
            "XPDLL": 768,
            "XSDLL": 768,
            "AL": 0,
            "ACTPDEN": 1,
            "PRPDEN": 1,
            "REFPDEN": 1,
            "RTRS": 1,
            "tCK": 0.833e-9
        },
        "mempowerspec": {
            "vdd": 1.2,
            "idd0": 56.25e-3,
            "idd2n": 33.75e-3,
            "idd3n": 39.5e-3,
            "idd4r": 157.5e-3,
            "idd4w": 135.0e-3,
            "idd6n": 20.25e-3,
            "idd2p": 17.0e-3,
            "idd3p": 22.5e-3,
            "vpp": 2.5,
            "ipp0": 4.0e-3,
            "vddq": 1.2
        }
    }
}
"#;
