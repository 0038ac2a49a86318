//! DRAM Command Set.
//!
//! The commands a controller can put on the command bus. Only a subset has
//! timing rules in each standard's checker; the power-down commands are
//! listed so that the checker can reject them explicitly.

use std::fmt;

/// A DRAM command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    /// Row activate.
    Act,
    /// Per-bank precharge.
    Prepb,
    /// All-bank precharge.
    Preab,
    /// Column read.
    Rd,
    /// Column read with auto-precharge.
    Rda,
    /// Column write.
    Wr,
    /// Column write with auto-precharge.
    Wra,
    /// All-bank refresh.
    Refab,
    /// Per-bank refresh.
    Refpb,
    /// Self-refresh entry.
    Srefen,
    /// Self-refresh exit.
    Srefex,
    /// Active power-down entry.
    Pdea,
    /// Active power-down exit.
    Pdxa,
    /// Precharge power-down entry.
    Pdep,
    /// Precharge power-down exit.
    Pdxp,
}

impl Command {
    /// Number of distinct commands; sizes the per-command timing arrays.
    pub const COUNT: usize = 15;

    /// All commands in index order.
    pub const ALL: [Command; Command::COUNT] = [
        Command::Act,
        Command::Prepb,
        Command::Preab,
        Command::Rd,
        Command::Rda,
        Command::Wr,
        Command::Wra,
        Command::Refab,
        Command::Refpb,
        Command::Srefen,
        Command::Srefex,
        Command::Pdea,
        Command::Pdxa,
        Command::Pdep,
        Command::Pdxp,
    ];

    /// Dense index of the command, used to address timing tables.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// READ or READ with auto-precharge.
    pub fn is_read(self) -> bool {
        matches!(self, Command::Rd | Command::Rda)
    }

    /// WRITE or WRITE with auto-precharge.
    pub fn is_write(self) -> bool {
        matches!(self, Command::Wr | Command::Wra)
    }

    /// Mnemonic as printed in traces.
    pub fn mnemonic(self) -> &'static str {
        match self {
            Command::Act => "ACT",
            Command::Prepb => "PREPB",
            Command::Preab => "PREAB",
            Command::Rd => "RD",
            Command::Rda => "RDA",
            Command::Wr => "WR",
            Command::Wra => "WRA",
            Command::Refab => "REFAB",
            Command::Refpb => "REFPB",
            Command::Srefen => "SREFEN",
            Command::Srefex => "SREFEX",
            Command::Pdea => "PDEA",
            Command::Pdxa => "PDXA",
            Command::Pdep => "PDEP",
            Command::Pdxp => "PDXP",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_matches_position_in_all() {
        for (i, cmd) in Command::ALL.iter().enumerate() {
            assert_eq!(cmd.index(), i);
        }
    }
}
