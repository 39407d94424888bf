//! Output dialects and their divider/record line formatting.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Width of the identifier column in PHY, NEXUS and TNT records.
pub const ID_WIDTH: usize = 55;

/// Line printed under a FASTA gene divider header.
pub const FASTA_DIVIDER_RULE: &str = "--------------------";

/// Output file format of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
    Fasta,
    Nexus,
    Phy,
    Tnt,
}

impl FileFormat {
    pub const ALL: [FileFormat; 4] = [Self::Fasta, Self::Nexus, Self::Phy, Self::Tnt];

    /// Divider line(s) opening a gene block. Non-FASTA dividers begin with a newline,
    /// which leaves a blank line between blocks once lines are joined.
    #[must_use]
    pub fn gene_divider(self, gene: &str, suffix: Option<&str>) -> String {
        let suffix = suffix.unwrap_or("");
        match self {
            Self::Fasta => format!(">{gene}{suffix}\n{FASTA_DIVIDER_RULE}"),
            Self::Nexus | Self::Phy => format!("\n[{gene}{suffix}]"),
            Self::Tnt => "\n[&dna]".to_string(),
        }
    }

    /// A voucher's row. Identifiers wider than the column are kept whole.
    #[must_use]
    pub fn record(self, id: &str, seq: &str) -> String {
        match self {
            Self::Fasta => format!(">{id}\n{seq}"),
            Self::Nexus | Self::Phy | Self::Tnt => format!("{id:<ID_WIDTH$}{seq}"),
        }
    }
}

impl FromStr for FileFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FASTA" => Ok(Self::Fasta),
            "NEXUS" => Ok(Self::Nexus),
            "PHY" => Ok(Self::Phy),
            "TNT" => Ok(Self::Tnt),
            _ => Err(Error::Parse(format!("unrecognized file format: {s}"))),
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fasta => write!(f, "FASTA"),
            Self::Nexus => write!(f, "NEXUS"),
            Self::Phy => write!(f, "PHY"),
            Self::Tnt => write!(f, "TNT"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fasta_lines() {
        assert_eq!(
            FileFormat::Fasta.gene_divider("COI", Some("_1st_codon")),
            ">COI_1st_codon\n--------------------"
        );
        assert_eq!(FileFormat::Fasta.gene_divider("COI", None), ">COI\n--------------------");
        assert_eq!(FileFormat::Fasta.record("CP100-10", "ACGT"), ">CP100-10\nACGT");
    }

    #[test]
    fn bracketed_dividers() {
        assert_eq!(FileFormat::Nexus.gene_divider("EF1a", None), "\n[EF1a]");
        assert_eq!(
            FileFormat::Phy.gene_divider("EF1a", Some("_3rd_codon")),
            "\n[EF1a_3rd_codon]"
        );
        assert_eq!(FileFormat::Tnt.gene_divider("EF1a", Some("_3rd_codon")), "\n[&dna]");
    }

    #[test]
    fn fixed_width_records() {
        for format in [FileFormat::Nexus, FileFormat::Phy, FileFormat::Tnt] {
            let line = format.record("CP100-10", "ACGT");
            assert_eq!(line.len(), ID_WIDTH + 4);
            assert!(line.starts_with("CP100-10 "));
            assert_eq!(&line[ID_WIDTH..], "ACGT");
        }
        let long_id = "X".repeat(60);
        assert_eq!(FileFormat::Phy.record(&long_id, "AC"), format!("{long_id}AC"));
    }

    #[test]
    fn parse_and_display() {
        for format in FileFormat::ALL {
            assert_eq!(format.to_string().parse::<FileFormat>().unwrap(), format);
        }
        assert_eq!("nexus".parse::<FileFormat>().unwrap(), FileFormat::Nexus);
        assert!("MEGA".parse::<FileFormat>().is_err());
    }
}
