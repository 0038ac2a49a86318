use crate::common::SimTime;
use serde::Deserialize;

const AXI_DATA_WIDTH: usize = 128;
const DOWNSTREAM_BEAT_BYTES: usize = 32;
const MAX_OUTSTANDING: usize = 16;
const REQUEST_QUEUE_DEPTH: usize = 16;
const DUMP_BYTES: usize = 128;

const CLOCK_PERIOD_PS: u64 = 1_000;
const SIMPLE_LATENCY_PS: u64 = 20_000;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub bridge: BridgeConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

impl Config {
    /// Parses a TOML configuration. Missing sections and keys take their
    /// defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Whether per-transaction logging is on. The `always-trace` feature
    /// forces it.
    pub fn verbose(&self) -> bool {
        cfg!(feature = "always-trace") || self.general.verbose
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeneralConfig {
    #[serde(default = "default_verbose")]
    pub verbose: bool,

    #[serde(default = "default_dump_bytes")]
    pub dump_bytes: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: default_verbose(),
            dump_bytes: default_dump_bytes(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct BridgeConfig {
    #[serde(default = "default_axi_data_width")]
    pub axi_data_width: usize,

    #[serde(default = "default_beat_bytes")]
    pub downstream_beat_bytes: usize,

    #[serde(default)]
    pub base_latency_ps: u64,

    #[serde(default)]
    pub beat_latency_ps: u64,

    #[serde(default = "default_max_outstanding")]
    pub max_outstanding: usize,

    #[serde(default = "default_queue_depth")]
    pub request_queue_depth: usize,
}

impl BridgeConfig {
    /// Downstream chunk size; a zero width is treated as one byte.
    pub fn beat_bytes(&self) -> usize {
        self.downstream_beat_bytes.max(1)
    }

    pub fn base_latency(&self) -> SimTime {
        SimTime::from_ps(self.base_latency_ps)
    }

    pub fn beat_latency(&self) -> SimTime {
        SimTime::from_ps(self.beat_latency_ps)
    }

    pub fn max_outstanding_val(&self) -> usize {
        self.max_outstanding.max(1)
    }

    pub fn request_queue_depth_val(&self) -> usize {
        self.request_queue_depth.max(1)
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            axi_data_width: default_axi_data_width(),
            downstream_beat_bytes: default_beat_bytes(),
            base_latency_ps: 0,
            beat_latency_ps: 0,
            max_outstanding: default_max_outstanding(),
            request_queue_depth: default_queue_depth(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerKind {
    #[default]
    Dram,
    Simple,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum PagePolicy {
    #[default]
    Open,
    Closed,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MemoryConfig {
    #[serde(default)]
    pub controller: ControllerKind,

    #[serde(default = "default_standard")]
    pub standard: String,

    #[serde(default)]
    pub memspec_path: Option<String>,

    #[serde(default)]
    pub address_mapping_path: Option<String>,

    #[serde(default)]
    pub page_policy: PagePolicy,

    #[serde(default = "default_refresh")]
    pub refresh: bool,

    #[serde(default = "default_simple_latency")]
    pub simple_latency_ps: u64,
}

impl MemoryConfig {
    pub fn simple_latency(&self) -> SimTime {
        SimTime::from_ps(self.simple_latency_ps)
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            controller: ControllerKind::default(),
            standard: default_standard(),
            memspec_path: None,
            address_mapping_path: None,
            page_policy: PagePolicy::default(),
            refresh: default_refresh(),
            simple_latency_ps: default_simple_latency(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SimulationConfig {
    #[serde(default = "default_clock_period")]
    pub clock_period_ps: u64,

    #[serde(default)]
    pub step_ps: Option<u64>,
}

impl SimulationConfig {
    pub fn clock_period(&self) -> SimTime {
        SimTime::from_ps(self.clock_period_ps.max(1))
    }

    /// Blocking-wait step; the clock period unless set explicitly.
    pub fn step(&self) -> SimTime {
        match self.step_ps {
            Some(ps) if ps > 0 => SimTime::from_ps(ps),
            _ => self.clock_period(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            clock_period_ps: default_clock_period(),
            step_ps: None,
        }
    }
}

fn default_verbose() -> bool {
    true
}

fn default_dump_bytes() -> usize {
    DUMP_BYTES
}

fn default_axi_data_width() -> usize {
    AXI_DATA_WIDTH
}

fn default_beat_bytes() -> usize {
    DOWNSTREAM_BEAT_BYTES
}

fn default_max_outstanding() -> usize {
    MAX_OUTSTANDING
}

fn default_queue_depth() -> usize {
    REQUEST_QUEUE_DEPTH
}

fn default_standard() -> String {
    "LPDDR5".to_string()
}

fn default_refresh() -> bool {
    true
}

fn default_simple_latency() -> u64 {
    SIMPLE_LATENCY_PS
}

fn default_clock_period() -> u64 {
    CLOCK_PERIOD_PS
}
