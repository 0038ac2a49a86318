//! Address Mapping.
//!
//! Translates a flat physical address into a DRAM location using per-field
//! bit lists, the same representation as the DRAMSys `addressmapping`
//! section. Each list names, from the least significant position upwards, the
//! address bits that make up that field.

use crate::common::ConfigError;
use crate::dram::memspec::Organisation;
use serde::Deserialize;

/// A decoded DRAM location.
///
/// `bank_group` and `bank` are channel-global indices, so they address the
/// checker's per-group and per-bank tables directly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DramLocation {
    pub rank: usize,
    pub bank_group: usize,
    pub bank: usize,
    pub row: usize,
    pub column: usize,
}

impl DramLocation {
    /// Builds a location from rank-local coordinates.
    ///
    /// # Arguments
    ///
    /// * `org` - Device organisation used to globalise the indices.
    /// * `rank` - Rank index.
    /// * `group` - Bank group within the rank.
    /// * `bank_in_group` - Bank within the group.
    pub fn new(org: &Organisation, rank: usize, group: usize, bank_in_group: usize) -> Self {
        Self {
            rank,
            bank_group: rank * org.groups_per_rank + group,
            bank: rank * org.banks_per_rank + group * org.banks_per_group + bank_in_group,
            row: 0,
            column: 0,
        }
    }

    /// Same location with a different row and column.
    pub fn at(mut self, row: usize, column: usize) -> Self {
        self.row = row;
        self.column = column;
        self
    }
}

/// Bit-list address mapping.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AddressMapping {
    #[serde(rename = "BYTE_BIT", default)]
    pub byte_bits: Vec<u32>,
    #[serde(rename = "COLUMN_BIT")]
    pub column_bits: Vec<u32>,
    #[serde(rename = "BANK_BIT")]
    pub bank_bits: Vec<u32>,
    #[serde(rename = "BANKGROUP_BIT", default)]
    pub bank_group_bits: Vec<u32>,
    #[serde(rename = "RANK_BIT", default)]
    pub rank_bits: Vec<u32>,
    #[serde(rename = "ROW_BIT")]
    pub row_bits: Vec<u32>,
}

fn log2_exact(value: usize, what: &str) -> Result<u32, ConfigError> {
    if value.is_power_of_two() {
        Ok(value.trailing_zeros())
    } else {
        Err(ConfigError::InvalidArchitecture(format!(
            "{} count {} is not a power of two",
            what, value
        )))
    }
}

impl AddressMapping {
    /// Contiguous mapping for an organisation, fields packed from the least
    /// significant bit: byte, column, bank, bank group, rank, row.
    pub fn linear(org: &Organisation) -> Result<Self, ConfigError> {
        let widths = [
            log2_exact(org.bytes_per_column(), "byte")?,
            log2_exact(org.columns, "column")?,
            log2_exact(org.banks_per_group, "bank")?,
            log2_exact(org.groups_per_rank, "bank group")?,
            log2_exact(org.ranks, "rank")?,
            log2_exact(org.rows, "row")?,
        ];

        let mut next = 0u32;
        let mut take = |width: u32| {
            let bits: Vec<u32> = (next..next + width).collect();
            next += width;
            bits
        };

        Ok(Self {
            byte_bits: take(widths[0]),
            column_bits: take(widths[1]),
            bank_bits: take(widths[2]),
            bank_group_bits: take(widths[3]),
            rank_bits: take(widths[4]),
            row_bits: take(widths[5]),
        })
    }

    /// Parses a DRAMSys address mapping. Both `{"addressmapping": {...}}` and
    /// the bare object are accepted.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let mut value: serde_json::Value = serde_json::from_str(json)?;
        if let Some(inner) = value.get_mut("addressmapping") {
            value = inner.take();
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Checks that every field fits the organisation and that no address bit
    /// is used twice.
    pub fn validate(&self, org: &Organisation) -> Result<(), ConfigError> {
        let fields: [(&str, &Vec<u32>, usize); 5] = [
            ("column", &self.column_bits, org.columns),
            ("bank", &self.bank_bits, org.banks_per_group),
            ("bank group", &self.bank_group_bits, org.groups_per_rank),
            ("rank", &self.rank_bits, org.ranks),
            ("row", &self.row_bits, org.rows),
        ];
        for (name, bits, limit) in fields {
            if bits.len() >= usize::BITS as usize || (1usize << bits.len()) > limit {
                return Err(ConfigError::InvalidArchitecture(format!(
                    "{} mapping uses {} bits but the device has {} {}s",
                    name,
                    bits.len(),
                    limit,
                    name
                )));
            }
        }

        let mut seen = 0u64;
        for &bit in self.all_bits() {
            if bit >= 64 || seen & (1 << bit) != 0 {
                return Err(ConfigError::InvalidArchitecture(format!(
                    "address bit {} is mapped twice or out of range",
                    bit
                )));
            }
            seen |= 1 << bit;
        }
        Ok(())
    }

    fn all_bits(&self) -> impl Iterator<Item = &u32> {
        self.byte_bits
            .iter()
            .chain(&self.column_bits)
            .chain(&self.bank_bits)
            .chain(&self.bank_group_bits)
            .chain(&self.rank_bits)
            .chain(&self.row_bits)
    }

    /// Mask of all address bits the mapping consumes.
    pub fn mapped_mask(&self) -> u64 {
        self.all_bits().fold(0u64, |mask, &bit| mask | (1u64 << bit))
    }

    fn gather(addr: u64, bits: &[u32]) -> usize {
        bits.iter()
            .enumerate()
            .fold(0usize, |acc, (i, &bit)| acc | ((((addr >> bit) & 1) as usize) << i))
    }

    /// Decodes an address.
    ///
    /// # Returns
    ///
    /// `None` if the address sets a bit outside the mapping, i.e. lies beyond
    /// the device capacity.
    pub fn decode(&self, addr: u64, org: &Organisation) -> Option<DramLocation> {
        if addr & !self.mapped_mask() != 0 {
            return None;
        }
        let rank = Self::gather(addr, &self.rank_bits);
        let group = Self::gather(addr, &self.bank_group_bits);
        let bank = Self::gather(addr, &self.bank_bits);
        let row = Self::gather(addr, &self.row_bits);
        let column = Self::gather(addr, &self.column_bits);
        Some(DramLocation::new(org, rank, group, bank).at(row, column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dram::memspec::{MemSpec, MemoryStandard};

    fn lpddr5_org() -> Organisation {
        MemSpec::embedded(MemoryStandard::Lpddr5)
            .unwrap()
            .organisation
    }

    #[test]
    fn linear_mapping_packs_fields_from_lsb() {
        let org = lpddr5_org();
        let map = AddressMapping::linear(&org).unwrap();
        assert_eq!(map.byte_bits, vec![0]);
        assert_eq!(map.column_bits.first(), Some(&1));
        assert_eq!(map.bank_bits, vec![11, 12]);
        assert_eq!(map.bank_group_bits, vec![13, 14]);
        assert!(map.rank_bits.is_empty());
        assert_eq!(map.row_bits.len(), 16);
        map.validate(&org).unwrap();
    }

    #[test]
    fn decode_globalises_bank_index() {
        let org = lpddr5_org();
        let map = AddressMapping::linear(&org).unwrap();
        // group 2, bank 3 within the group, row 5, column 7
        let addr = (5u64 << 15) | (2 << 13) | (3 << 11) | (7 << 1);
        let loc = map.decode(addr, &org).unwrap();
        assert_eq!(loc.bank_group, 2);
        assert_eq!(loc.bank, 2 * 4 + 3);
        assert_eq!(loc.row, 5);
        assert_eq!(loc.column, 7);
    }

    #[test]
    fn decode_rejects_addresses_past_capacity() {
        let org = lpddr5_org();
        let map = AddressMapping::linear(&org).unwrap();
        assert!(map.decode(1u64 << 31, &org).is_none());
        assert!(map.decode((1u64 << 31) - 1, &org).is_some());
    }

    #[test]
    fn validate_rejects_duplicate_bits() {
        let org = lpddr5_org();
        let mut map = AddressMapping::linear(&org).unwrap();
        map.bank_bits = vec![1, 12];
        assert!(map.validate(&org).is_err());
    }
}
