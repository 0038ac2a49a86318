//! Error Types.
//!
//! Errors are split by concern. Caller misuse of the bridge or front-end is a
//! [`BridgeError`] and is reported synchronously at the point of misuse.
//! Configuration problems are a [`ConfigError`]; the simulator cannot proceed
//! without a usable memory description, so the binary aborts on them. A
//! [`TimingError`] means a command or location the memory standard does not
//! know about reached the checker, which is a programming error.

use crate::bridge::request::ResponseStatus;
use crate::dram::command::Command;
use std::path::PathBuf;
use thiserror::Error;

/// Errors reported to bridge and front-end callers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// The handle does not belong to this model or was never issued.
    #[error("invalid request handle")]
    InvalidHandle,

    /// The request identifier is unknown to the bridge engine.
    #[error("unknown request id {0}")]
    UnknownRequest(u64),

    /// The response was requested before the transaction finished.
    #[error("request {0} is not completed yet")]
    NotCompleted(u64),

    /// The request buffer does not match the declared transfer length.
    #[error("buffer holds {buffer} bytes but the transfer length is {length}")]
    LengthMismatch { buffer: usize, length: usize },

    /// The bridge request FIFO is full.
    #[error("request queue is full ({depth} entries)")]
    QueueFull { depth: usize },

    /// The stepping interval for blocking waits must be positive.
    #[error("step time must be positive")]
    InvalidStep,

    /// AxSIZE above 7 (128 bytes per beat) is not a legal AXI beat size.
    #[error("burst size {0} is out of range (0..=7)")]
    InvalidBurstSize(u8),

    /// The transfer completed with an error response.
    #[error("transfer failed: {0}")]
    Transfer(ResponseStatus),

    /// A payload handle was used after it was returned to the pool.
    #[error("payload slot {0} is not checked out")]
    StalePayload(usize),
}

/// Errors raised while loading configuration or memory specifications.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration file could not be read.
    #[error("could not read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The simulator configuration is not valid TOML for [`crate::config::Config`].
    #[error("invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// The memory specification is not valid JSON for any supported standard.
    #[error("invalid memspec: {0}")]
    Json(#[from] serde_json::Error),

    /// No embedded memspec exists for the requested standard.
    #[error("unsupported memory standard '{0}'")]
    UnsupportedStandard(String),

    /// The architecture section describes an unusable device.
    #[error("invalid memory architecture: {0}")]
    InvalidArchitecture(String),
}

/// Errors raised by the timing checker.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimingError {
    /// The memory standard has no timing rules for this command.
    #[error("command {command} is not supported by {standard}")]
    UnsupportedCommand {
        command: Command,
        standard: &'static str,
    },

    /// The target location lies outside the configured device organisation.
    #[error("{what} index {index} out of range (limit {limit})")]
    LocationOutOfRange {
        what: &'static str,
        index: usize,
        limit: usize,
    },
}
