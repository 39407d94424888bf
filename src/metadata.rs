//! Partition metadata: characters per gene and vouchers with too few genes.

use std::collections::{BTreeMap, BTreeSet};

use crate::assemble::{GeneBlock, Row};
use crate::error::Error;
use crate::format::{FASTA_DIVIDER_RULE, FileFormat};
use crate::strategy::FIRST_SECOND_SUFFIX;

/// Character counts and voucher coverage derived from a partition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    /// Characters per gene, taken from the first row of each gene block.
    pub gene_codes_and_lengths: BTreeMap<String, usize>,
    /// Sum of `gene_codes_and_lengths`.
    pub number_chars: usize,
    /// Vouchers with fewer non-empty genes than the configured minimum.
    pub vouchers_to_drop: BTreeSet<String>,
}

impl Metadata {
    /// Compute metadata over gene blocks, keyed by each block's gene code.
    #[must_use]
    pub fn from_blocks(blocks: &[GeneBlock], minimum_number_of_genes: Option<usize>) -> Self {
        let mut gene_codes_and_lengths = BTreeMap::new();
        for block in blocks {
            if let Some(row) = block.rows.first() {
                gene_codes_and_lengths.insert(block.gene_code.clone(), row.seq.chars().count());
            }
        }
        let number_chars = gene_codes_and_lengths.values().sum();
        let vouchers_to_drop = vouchers_to_drop(blocks, minimum_number_of_genes);
        Self {
            gene_codes_and_lengths,
            number_chars,
            vouchers_to_drop,
        }
    }
}

/// Vouchers whose count of genes with real data (anything besides `?`) is below the minimum.
#[must_use]
pub fn vouchers_to_drop(
    blocks: &[GeneBlock],
    minimum_number_of_genes: Option<usize>,
) -> BTreeSet<String> {
    let Some(minimum) = minimum_number_of_genes else {
        return BTreeSet::new();
    };

    let mut genes_per_voucher: BTreeMap<&str, usize> = BTreeMap::new();
    for block in blocks {
        for row in &block.rows {
            let count = genes_per_voucher.entry(row.voucher.as_str()).or_insert(0);
            if row.seq.chars().any(|c| c != '?') {
                *count += 1;
            }
        }
    }

    genes_per_voucher
        .into_iter()
        .filter(|&(_, count)| count < minimum)
        .map(|(voucher, _)| voucher.to_string())
        .collect()
}

/// Recover gene blocks from a rendered dataset, in file order.
///
/// Bracketed dividers name PHY and NEXUS blocks; TNT dividers carry no name, so its
/// blocks are numbered `dummy0`, `dummy1`, ... Known codon suffixes (`_1st_codon`,
/// `_1st_2nd_codons`, ...) are split off the divider label into the block's suffix.
/// Records with an empty sequence are kept as empty rows.
pub fn parse_rendered(text: &str, format: FileFormat) -> Result<Vec<GeneBlock>, Error> {
    match format {
        FileFormat::Fasta => parse_fasta_blocks(text),
        FileFormat::Nexus | FileFormat::Phy | FileFormat::Tnt => {
            parse_fixed_width_blocks(text, format)
        }
    }
}

/// The blocks of the first partition.
///
/// Every partition holds one block per included gene, so with a known partition count
/// the first partition is the leading `len / count` blocks. Without one, named formats
/// end the first partition at the first repeated gene or changed suffix; TNT blocks
/// carry no names and are all taken.
pub fn first_partition(
    blocks: &[GeneBlock],
    format: FileFormat,
    partitions: Option<usize>,
) -> Result<&[GeneBlock], Error> {
    if let Some(count) = partitions {
        if count == 0 || blocks.len() % count != 0 {
            return Err(Error::Validation(format!(
                "{} gene blocks cannot form {count} partitions",
                blocks.len()
            )));
        }
        return Ok(&blocks[..blocks.len() / count]);
    }
    if format == FileFormat::Tnt {
        return Ok(blocks);
    }

    let Some(first) = blocks.first() else {
        return Ok(blocks);
    };
    let end = blocks
        .iter()
        .enumerate()
        .skip(1)
        .find(|(i, block)| {
            block.suffix != first.suffix
                || blocks[..*i].iter().any(|b| b.gene_code == block.gene_code)
        })
        .map_or(blocks.len(), |(i, _)| i);
    Ok(&blocks[..end])
}

const KNOWN_SUFFIXES: [&str; 4] = [
    FIRST_SECOND_SUFFIX,
    "_1st_codon",
    "_2nd_codon",
    "_3rd_codon",
];

fn new_block(label: &str) -> GeneBlock {
    let (gene_code, suffix) = KNOWN_SUFFIXES
        .iter()
        .find_map(|&suffix| {
            label
                .strip_suffix(suffix)
                .filter(|code| !code.is_empty())
                .map(|code| (code, Some(suffix)))
        })
        .unwrap_or((label, None));
    GeneBlock {
        gene_code: gene_code.to_string(),
        suffix,
        rows: Vec::new(),
    }
}

fn parse_fixed_width_blocks(text: &str, format: FileFormat) -> Result<Vec<GeneBlock>, Error> {
    let mut blocks: Vec<GeneBlock> = Vec::new();

    for (line_num, line) in text.lines().enumerate() {
        let line_num = line_num + 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(inner) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            let block = if format == FileFormat::Tnt {
                new_block(&format!("dummy{}", blocks.len()))
            } else {
                new_block(inner)
            };
            blocks.push(block);
            continue;
        }

        let Some(block) = blocks.last_mut() else {
            return Err(Error::Format(format!(
                "record before any gene divider (line {line_num}: {line})"
            )));
        };
        let mut tokens = line.split_whitespace();
        let (voucher, seq) = match (tokens.next(), tokens.next(), tokens.next()) {
            (Some(voucher), Some(seq), None) => (voucher, seq),
            // sequence empty after trimming, e.g. a short sequence in a late reading frame
            (Some(voucher), None, None) => (voucher, ""),
            _ => {
                return Err(Error::Format(format!(
                    "expected voucher and sequence (line {line_num}: {line})"
                )));
            }
        };
        block.rows.push(Row {
            voucher: voucher.to_string(),
            seq: seq.to_string(),
        });
    }

    Ok(blocks)
}

/// A FASTA header and the line under it (empty when the next line is another header).
struct FastaEntry<'a> {
    line_num: usize,
    id: &'a str,
    body: &'a str,
}

fn fasta_entries(text: &str) -> Result<Vec<FastaEntry<'_>>, Error> {
    let lines: Vec<&str> = text.lines().map(str::trim).collect();
    let mut entries = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        if line.is_empty() {
            i += 1;
            continue;
        }
        let Some(id) = line.strip_prefix('>') else {
            return Err(Error::Format(format!(
                "expected FASTA header (line {}: {line})",
                i + 1
            )));
        };
        let body = match lines.get(i + 1) {
            Some(next) if !next.starts_with('>') => *next,
            _ => "",
        };
        if id.split_whitespace().count() != 1 || body.split_whitespace().count() > 1 {
            return Err(Error::Format(format!(
                "expected voucher and sequence (line {}: {line})",
                i + 1
            )));
        }
        entries.push(FastaEntry {
            line_num: i + 1,
            id,
            body,
        });
        i += if body.is_empty() && lines.get(i + 1).is_none_or(|l| l.starts_with('>')) {
            1
        } else {
            2
        };
    }

    Ok(entries)
}

/// A header over the divider rule opens a gene block, unless it can only be a record
/// whose sequence happens to be all gaps: right after a divider (blocks are never
/// empty), at the end of the file, or when neither it nor the next voucher already
/// occurs in the open block.
fn is_divider(
    entry: &FastaEntry<'_>,
    next: Option<&FastaEntry<'_>>,
    open: Option<&GeneBlock>,
) -> bool {
    if entry.body != FASTA_DIVIDER_RULE {
        return false;
    }
    let Some(block) = open else {
        return true;
    };
    if block.rows.is_empty() {
        return false;
    }
    let Some(next) = next else {
        return false;
    };
    let in_block = |id: &str| block.rows.iter().any(|r| r.voucher == id);
    in_block(entry.id) || next.id == entry.id || in_block(next.id)
}

fn parse_fasta_blocks(text: &str) -> Result<Vec<GeneBlock>, Error> {
    let entries = fasta_entries(text)?;
    let mut blocks: Vec<GeneBlock> = Vec::new();

    for (k, entry) in entries.iter().enumerate() {
        if is_divider(entry, entries.get(k + 1), blocks.last()) {
            blocks.push(new_block(entry.id));
            continue;
        }
        let Some(block) = blocks.last_mut() else {
            return Err(Error::Format(format!(
                "record before any gene divider (line {}: >{})",
                entry.line_num, entry.id
            )));
        };
        block.rows.push(Row {
            voucher: entry.id.to_string(),
            seq: entry.body.to_string(),
        });
    }

    Ok(blocks)
}
