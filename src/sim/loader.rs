//! Configuration and Memory Specification Loading.
//!
//! Reads the simulator configuration and resolves the memory specification
//! and address mapping it refers to. Every failure is reported as a
//! [`ConfigError`]; the binary treats them as fatal.

use crate::common::ConfigError;
use crate::config::Config;
use crate::dram::address::AddressMapping;
use crate::dram::memspec::{MemSpec, MemoryStandard};
use std::fs;
use std::path::Path;

fn read_text(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads a TOML configuration file.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let text = read_text(path)?;
    let config = Config::from_toml_str(&text)?;
    log::debug!("[Loader] configuration read from {}", path.display());
    Ok(config)
}

/// Loads a memspec JSON file.
pub fn load_memspec(path: &Path) -> Result<MemSpec, ConfigError> {
    let spec = MemSpec::from_json_str(&read_text(path)?)?;
    log::info!(
        "[Loader] memspec '{}' ({}) read from {}",
        spec.memory_id,
        spec.standard,
        path.display()
    );
    Ok(spec)
}

/// Resolves the memory specification named by the configuration: the file
/// at `memspec_path` if set, otherwise the embedded spec for `standard`.
pub fn resolve_memspec(config: &Config) -> Result<MemSpec, ConfigError> {
    match &config.memory.memspec_path {
        Some(path) => load_memspec(Path::new(path)),
        None => MemSpec::embedded(MemoryStandard::from_name(&config.memory.standard)?),
    }
}

/// Resolves the address mapping: the file at `address_mapping_path` if set,
/// otherwise the linear mapping for the device. The result is validated
/// against the device organisation.
pub fn resolve_address_mapping(
    config: &Config,
    spec: &MemSpec,
) -> Result<AddressMapping, ConfigError> {
    let mapping = match &config.memory.address_mapping_path {
        Some(path) => AddressMapping::from_json_str(&read_text(Path::new(path))?)?,
        None => AddressMapping::linear(&spec.organisation)?,
    };
    mapping.validate(&spec.organisation)?;
    Ok(mapping)
}
