//! Resolution of requested codon positions and partitioning into a layout strategy.

use std::fmt;
use std::str::FromStr;

use crate::codon::CodonPosition::{self, First, Second, Third};
use crate::error::Error;

/// Codon positions requested by the user, as given (`ALL` kept separate from 1st/2nd/3rd).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PositionRequest {
    pub first: bool,
    pub second: bool,
    pub third: bool,
    pub all: bool,
}

impl PositionRequest {
    /// Parse request tokens (`1st`, `2nd`, `3rd`, `ALL`), ignoring case. Repeated tokens
    /// are harmless.
    pub fn from_tokens<I, S>(tokens: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut request = Self::default();
        for token in tokens {
            let token = token.as_ref().trim();
            match token.to_ascii_lowercase().as_str() {
                "1st" => request.first = true,
                "2nd" => request.second = true,
                "3rd" => request.third = true,
                "all" => request.all = true,
                _ => {
                    return Err(Error::Parse(format!("unknown codon position: '{token}'")));
                }
            }
        }
        Ok(request)
    }

    /// Requested positions in codon order, with `ALL` expanded.
    #[must_use]
    pub fn positions(&self) -> Vec<CodonPosition> {
        if self.all {
            return CodonPosition::ALL.to_vec();
        }
        [(self.first, First), (self.second, Second), (self.third, Third)]
            .into_iter()
            .filter_map(|(wanted, p)| wanted.then_some(p))
            .collect()
    }
}

impl fmt::Display for PositionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tokens: Vec<&str> = [(self.first, "1st"), (self.second, "2nd"), (self.third, "3rd")]
            .into_iter()
            .filter_map(|(wanted, t)| wanted.then_some(t))
            .collect();
        if self.all {
            tokens.push("ALL");
        }
        if tokens.is_empty() {
            f.write_str("none")
        } else {
            f.write_str(&tokens.join(", "))
        }
    }
}

/// How requested codon positions are grouped into partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partitioning {
    /// One partition per requested position.
    Each,
    /// All requested positions in a single partition.
    One,
    /// 1st and 2nd positions together, 3rd on its own.
    FirstSecondThird,
}

impl Partitioning {
    pub const ALL: [Partitioning; 3] = [Self::Each, Self::One, Self::FirstSecondThird];
}

impl FromStr for Partitioning {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "each" => Ok(Self::Each),
            "one" => Ok(Self::One),
            "1st2nd_3rd" => Ok(Self::FirstSecondThird),
            _ => Err(Error::Parse(format!(
                "unknown partitioning: '{s}' (expected EACH, ONE or 1st2nd_3rd)"
            ))),
        }
    }
}

impl fmt::Display for Partitioning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Each => f.write_str("EACH"),
            Self::One => f.write_str("ONE"),
            Self::FirstSecondThird => f.write_str("1st2nd_3rd"),
        }
    }
}

/// The layout strategy selected for a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    SinglePositionEach(CodonPosition),
    /// Renders exactly like [`Strategy::SinglePositionEach`].
    SinglePositionOne(CodonPosition),
    TwoPositionEach([CodonPosition; 2]),
    TwoPositionOne([CodonPosition; 2]),
    TwoPositionSplit([CodonPosition; 2]),
    ThreePositionEach,
    /// Whole, unsplit sequences in one partition.
    ThreePositionOne,
    ThreePositionSplit,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SinglePositionEach(p) | Self::SinglePositionOne(p) => {
                write!(f, "{p} codon position")
            }
            Self::TwoPositionSplit([First, Second]) => {
                f.write_str("1st and 2nd codon positions, 1st+2nd together")
            }
            Self::TwoPositionEach([a, b]) | Self::TwoPositionSplit([a, b]) => {
                write!(f, "{a} and {b} codon positions, one partition each")
            }
            Self::TwoPositionOne([a, b]) => write!(f, "{a} and {b} codon positions, one partition"),
            Self::ThreePositionEach => f.write_str("all codon positions, one partition each"),
            Self::ThreePositionOne => f.write_str("full sequences, one partition"),
            Self::ThreePositionSplit => f.write_str("all codon positions, 1st+2nd | 3rd"),
        }
    }
}

/// What a partition holds for every record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartitionContent {
    /// These positions, each as a contiguous block, in the order listed.
    Positions(Vec<CodonPosition>),
    /// The record's sequence untouched.
    FullSequence,
}

/// One partition of a layout plan: its content and the divider suffix appended to gene names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionLayout {
    pub content: PartitionContent,
    pub suffix: Option<&'static str>,
}

impl PartitionLayout {
    fn single(position: CodonPosition) -> Self {
        Self {
            content: PartitionContent::Positions(vec![position]),
            suffix: Some(position.suffix()),
        }
    }

    fn joined(positions: &[CodonPosition], suffix: Option<&'static str>) -> Self {
        Self {
            content: PartitionContent::Positions(positions.to_vec()),
            suffix,
        }
    }
}

pub const FIRST_SECOND_SUFFIX: &str = "_1st_2nd_codons";

/// Select the strategy for a position request and partitioning.
///
/// Total over every request: only an empty position set is rejected.
pub fn resolve(request: PositionRequest, partitioning: Partitioning) -> Result<Strategy, Error> {
    use Partitioning::{Each, FirstSecondThird, One};

    let strategy = match (request.positions().as_slice(), partitioning) {
        (&[p], Each | FirstSecondThird) => Strategy::SinglePositionEach(p),
        (&[p], One) => Strategy::SinglePositionOne(p),
        (&[a, b], Each) => Strategy::TwoPositionEach([a, b]),
        (&[a, b], One) => Strategy::TwoPositionOne([a, b]),
        (&[a, b], FirstSecondThird) => Strategy::TwoPositionSplit([a, b]),
        (&[_, _, _], Each) => Strategy::ThreePositionEach,
        (&[_, _, _], One) => Strategy::ThreePositionOne,
        (&[_, _, _], FirstSecondThird) => Strategy::ThreePositionSplit,
        _ => {
            return Err(Error::UnsupportedCombination {
                positions: request.to_string(),
                partitioning: partitioning.to_string(),
            });
        }
    };
    Ok(strategy)
}

impl Strategy {
    /// Expand the strategy into its ordered partition layouts.
    #[must_use]
    pub fn plan(self) -> Vec<PartitionLayout> {
        match self {
            Self::SinglePositionEach(p) | Self::SinglePositionOne(p) => {
                vec![PartitionLayout::single(p)]
            }
            Self::TwoPositionEach(positions) => {
                positions.into_iter().map(PartitionLayout::single).collect()
            }
            Self::TwoPositionOne(positions) => vec![PartitionLayout::joined(&positions, None)],
            Self::TwoPositionSplit(positions) => {
                if positions == [First, Second] {
                    vec![PartitionLayout::joined(&positions, Some(FIRST_SECOND_SUFFIX))]
                } else {
                    positions.into_iter().map(PartitionLayout::single).collect()
                }
            }
            Self::ThreePositionEach => CodonPosition::ALL
                .into_iter()
                .map(PartitionLayout::single)
                .collect(),
            Self::ThreePositionOne => vec![PartitionLayout {
                content: PartitionContent::FullSequence,
                suffix: None,
            }],
            Self::ThreePositionSplit => vec![
                PartitionLayout::joined(&[First, Second], Some(FIRST_SECOND_SUFFIX)),
                PartitionLayout::single(Third),
            ],
        }
    }
}
