//! Reading frames, codon-position splitting and codon translation tables.

use std::fmt;

use crate::error::Error;

/// Offset (1, 2 or 3) of the first base of the first complete codon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReadingFrame(u8);

impl ReadingFrame {
    /// Number of leading bases discarded before the first codon.
    #[must_use]
    pub fn trim(self) -> usize {
        usize::from(self.0 - 1)
    }

    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for ReadingFrame {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1..=3 => Ok(Self(value)),
            _ => Err(Error::Validation(format!(
                "invalid reading frame: {value} (expected 1, 2 or 3)"
            ))),
        }
    }
}

impl fmt::Display for ReadingFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A nucleotide position within a codon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CodonPosition {
    First,
    Second,
    Third,
}

impl CodonPosition {
    pub const ALL: [CodonPosition; 3] = [Self::First, Self::Second, Self::Third];

    /// Offset of this position inside a codon.
    #[must_use]
    pub fn offset(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
            Self::Third => 2,
        }
    }

    /// Request token for this position (`1st`, `2nd`, `3rd`).
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Self::First => "1st",
            Self::Second => "2nd",
            Self::Third => "3rd",
        }
    }

    /// Divider suffix used when the position gets a partition of its own.
    #[must_use]
    pub fn suffix(self) -> &'static str {
        match self {
            Self::First => "_1st_codon",
            Self::Second => "_2nd_codon",
            Self::Third => "_3rd_codon",
        }
    }
}

impl fmt::Display for CodonPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A sequence decomposed into its three codon positions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CodonSplit {
    pub first: String,
    pub second: String,
    pub third: String,
}

impl CodonSplit {
    #[must_use]
    pub fn get(&self, position: CodonPosition) -> &str {
        match position {
            CodonPosition::First => &self.first,
            CodonPosition::Second => &self.second,
            CodonPosition::Third => &self.third,
        }
    }

    /// Concatenate the given positions, each as a whole block, in the order given.
    #[must_use]
    pub fn concat(&self, positions: &[CodonPosition]) -> String {
        let len = positions.iter().map(|&p| self.get(p).len()).sum();
        let mut out = String::with_capacity(len);
        for &p in positions {
            out.push_str(self.get(p));
        }
        out
    }
}

/// Put `seq` in frame and split it into 1st, 2nd and 3rd codon positions.
///
/// A frame of 2 drops one leading base: `ATGGGG` becomes `TGGGG`, which splits into
/// `TG`, `GG` and `G`. Sequences shorter than the trim yield three empty strings.
#[must_use]
pub fn split_codon_positions(frame: ReadingFrame, seq: &str) -> CodonSplit {
    let mut split = CodonSplit::default();
    for (i, base) in seq.chars().skip(frame.trim()).enumerate() {
        match i % 3 {
            0 => split.first.push(base),
            1 => split.second.push(base),
            _ => split.third.push(base),
        }
    }
    split
}

/// Lookup table for translating codons to amino acids.
///
/// Indexed by 6-bit codon encoding: A=0, C=1, G=2, T/U=3.
/// Index = first*16 + second*4 + third.
pub struct CodonTable {
    table: [u8; 64],
}

fn base_to_index(b: u8) -> Option<usize> {
    match b {
        b'A' | b'a' => Some(0),
        b'C' | b'c' => Some(1),
        b'G' | b'g' => Some(2),
        b'T' | b't' | b'U' | b'u' => Some(3),
        _ => None,
    }
}

impl CodonTable {
    /// Table for an NCBI genetic code id. Only the standard (1) and vertebrate
    /// mitochondrial (2) codes are available.
    pub fn for_genetic_code(id: u8) -> Result<Self, Error> {
        match id {
            1 => Ok(Self::standard()),
            2 => Ok(Self::mitochondrial()),
            _ => Err(Error::Validation(format!("unsupported genetic code: {id}"))),
        }
    }

    /// Standard genetic code (NCBI translation table 1).
    #[must_use]
    pub fn standard() -> Self {
        #[rustfmt::skip]
        let table: [u8; 64] = [
            b'K', b'N', b'K', b'N',  // AA*
            b'T', b'T', b'T', b'T',  // AC*
            b'R', b'S', b'R', b'S',  // AG*
            b'I', b'I', b'M', b'I',  // AT*
            b'Q', b'H', b'Q', b'H',  // CA*
            b'P', b'P', b'P', b'P',  // CC*
            b'R', b'R', b'R', b'R',  // CG*
            b'L', b'L', b'L', b'L',  // CT*
            b'E', b'D', b'E', b'D',  // GA*
            b'A', b'A', b'A', b'A',  // GC*
            b'G', b'G', b'G', b'G',  // GG*
            b'V', b'V', b'V', b'V',  // GT*
            b'*', b'Y', b'*', b'Y',  // TA*
            b'S', b'S', b'S', b'S',  // TC*
            b'*', b'C', b'W', b'C',  // TG*
            b'L', b'F', b'L', b'F',  // TT*
        ];
        Self { table }
    }

    /// Vertebrate mitochondrial genetic code (NCBI translation table 2).
    /// Differences from standard: TGA→W, AGA→*, AGG→*, ATA→M.
    #[must_use]
    pub fn mitochondrial() -> Self {
        let mut code = Self::standard();
        code.table[56] = b'W';
        code.table[8] = b'*';
        code.table[10] = b'*';
        code.table[12] = b'M';
        code
    }

    /// Translate a single codon to an amino acid; gaps and ambiguity codes give `X`.
    #[must_use]
    pub fn translate_codon(&self, codon: &[u8]) -> u8 {
        if codon.len() < 3 {
            return b'X';
        }
        match (
            base_to_index(codon[0]),
            base_to_index(codon[1]),
            base_to_index(codon[2]),
        ) {
            (Some(a), Some(b), Some(c)) => self.table[a * 16 + b * 4 + c],
            _ => b'X',
        }
    }
}

/// Translate an in-frame nucleotide sequence; a trailing partial codon becomes `X`.
pub fn translate(cds: &[u8], table: &CodonTable) -> Vec<u8> {
    let mut protein: Vec<u8> = cds
        .chunks_exact(3)
        .map(|codon| table.translate_codon(codon))
        .collect();
    if cds.len() % 3 != 0 {
        protein.push(b'X');
    }
    protein
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(n: u8) -> ReadingFrame {
        ReadingFrame::try_from(n).unwrap()
    }

    #[test]
    fn reading_frame_bounds() {
        assert!(ReadingFrame::try_from(0).is_err());
        assert!(ReadingFrame::try_from(4).is_err());
        assert_eq!(frame(1).trim(), 0);
        assert_eq!(frame(3).trim(), 2);
    }

    #[test]
    fn split_frame_one() {
        let split = split_codon_positions(frame(1), "ATGCGATCG");
        assert_eq!(split.first, "ACT");
        assert_eq!(split.second, "TGC");
        assert_eq!(split.third, "CAG");
    }

    #[test]
    fn split_frame_two_trims_one_base() {
        let split = split_codon_positions(frame(2), "ATGGGG");
        assert_eq!(split.first, "TG");
        assert_eq!(split.second, "GG");
        assert_eq!(split.third, "G");
    }

    #[test]
    fn split_shorter_than_trim() {
        let split = split_codon_positions(frame(3), "A");
        assert_eq!(split, CodonSplit::default());
    }

    #[test]
    fn split_interleaves_back_to_trimmed_sequence() {
        let seqs = ["", "A", "AC", "ACGTN?-ACGTTGCA", "NNNN??ATG", "ATGCGATCGA"];
        for seq in seqs {
            for f in 1..=3 {
                let split = split_codon_positions(frame(f), seq);
                let trimmed: String = seq.chars().skip(usize::from(f - 1)).collect();

                let lens = [split.first.len(), split.second.len(), split.third.len()];
                assert!(lens.iter().max().unwrap() - lens.iter().min().unwrap() <= 1);

                let parts: Vec<Vec<char>> = CodonPosition::ALL
                    .iter()
                    .map(|&p| split.get(p).chars().collect())
                    .collect();
                let mut rebuilt = String::new();
                for i in 0..trimmed.len() {
                    rebuilt.push(parts[i % 3][i / 3]);
                }
                assert_eq!(rebuilt, trimmed, "seq {seq:?} frame {f}");
            }
        }
    }

    #[test]
    fn concat_keeps_positions_as_blocks() {
        let split = split_codon_positions(frame(1), "ATGCGATCG");
        assert_eq!(
            split.concat(&[CodonPosition::First, CodonPosition::Third]),
            "ACTCAG"
        );
    }

    #[test]
    fn standard_and_mitochondrial_codes() {
        let standard = CodonTable::standard();
        assert_eq!(standard.translate_codon(b"ATG"), b'M');
        assert_eq!(standard.translate_codon(b"TGA"), b'*');
        let mito = CodonTable::for_genetic_code(2).unwrap();
        assert_eq!(mito.translate_codon(b"TGA"), b'W');
        assert_eq!(mito.translate_codon(b"AGA"), b'*');
        assert_eq!(mito.translate_codon(b"ATA"), b'M');
        assert!(CodonTable::for_genetic_code(5).is_err());
    }

    #[test]
    fn translate_with_partial_codon_and_gaps() {
        let table = CodonTable::standard();
        assert_eq!(translate(b"ATGGCATGCTAA", &table), b"MAC*");
        assert_eq!(translate(b"ATGGC", &table), b"MX");
        assert_eq!(translate(b"AT?NNN", &table), b"XX");
        assert!(translate(b"", &table).is_empty());
    }
}
