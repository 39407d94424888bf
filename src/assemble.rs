//! Partition assembly: per-gene blocks of voucher rows for every partition of a layout.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::codon::{ReadingFrame, split_codon_positions};
use crate::sequence::{SeqObjs, SequenceRecord};
use crate::strategy::{PartitionContent, PartitionLayout};

/// A voucher's sequence inside a gene block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub voucher: String,
    pub seq: String,
}

/// The rows of one gene within one partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneBlock {
    pub gene_code: String,
    /// Appended to the gene code in the divider (`_1st_codon`, `_1st_2nd_codons`, ...).
    pub suffix: Option<&'static str>,
    pub rows: Vec<Row>,
}

impl GeneBlock {
    /// Gene code with its divider suffix.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}{}", self.gene_code, self.suffix.unwrap_or(""))
    }
}

/// One contiguous block of the output, covering every included gene.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub blocks: Vec<GeneBlock>,
}

/// Assembled partitions plus the warnings raised while building them.
#[derive(Debug, Clone, Default)]
pub struct Assembly {
    pub partitions: Vec<Partition>,
    pub warnings: Vec<String>,
}

#[must_use]
pub fn missing_reading_frame_warning(gene_code: &str) -> String {
    format!(
        "Reading frame for gene {gene_code} hasn't been specified so it cannot be included in your dataset."
    )
}

/// Distributes sequence records into partitions according to a layout plan.
pub struct Assembler<'a> {
    seq_objs: &'a SeqObjs,
    reading_frames: &'a HashMap<String, Option<ReadingFrame>>,
    vouchers: Option<HashSet<&'a str>>,
}

impl<'a> Assembler<'a> {
    /// `reading_frames` holds exactly the requested genes; other genes are ignored.
    pub fn new(
        seq_objs: &'a SeqObjs,
        reading_frames: &'a HashMap<String, Option<ReadingFrame>>,
    ) -> Self {
        Self {
            seq_objs,
            reading_frames,
            vouchers: None,
        }
    }

    /// Only emit records of these vouchers.
    #[must_use]
    pub fn with_vouchers(mut self, vouchers: &'a [String]) -> Self {
        self.vouchers = Some(vouchers.iter().map(|v| v.as_str()).collect());
        self
    }

    fn wants_voucher(&self, voucher: &str) -> bool {
        self.vouchers.as_ref().is_none_or(|set| set.contains(voucher))
    }

    /// Build one partition per layout, walking genes in code order.
    #[must_use]
    pub fn assemble(&self, layouts: &[PartitionLayout]) -> Assembly {
        let mut assembly = Assembly {
            partitions: vec![Partition::default(); layouts.len()],
            warnings: Vec::new(),
        };

        for (gene_code, records) in self.seq_objs {
            let Some(frame) = self.reading_frames.get(gene_code) else {
                debug!(gene = %gene_code, "gene not requested, skipping");
                continue;
            };
            let Some(frame) = *frame else {
                warn!(gene = %gene_code, "no reading frame, gene excluded");
                assembly
                    .warnings
                    .push(missing_reading_frame_warning(gene_code));
                continue;
            };

            let records: Vec<&SequenceRecord> = records
                .iter()
                .filter(|r| {
                    let keep = self.wants_voucher(&r.id);
                    if !keep {
                        debug!(gene = %gene_code, voucher = %r.id, "voucher not requested");
                    }
                    keep
                })
                .collect();
            if records.is_empty() {
                continue;
            }

            let mut blocks: Vec<GeneBlock> = layouts
                .iter()
                .map(|layout| GeneBlock {
                    gene_code: gene_code.clone(),
                    suffix: layout.suffix,
                    rows: Vec::with_capacity(records.len()),
                })
                .collect();

            for record in records {
                let split = split_codon_positions(frame, &record.seq);
                for (layout, block) in layouts.iter().zip(blocks.iter_mut()) {
                    let seq = match &layout.content {
                        PartitionContent::Positions(positions) => split.concat(positions),
                        PartitionContent::FullSequence => record.seq.clone(),
                    };
                    block.rows.push(Row {
                        voucher: record.id.clone(),
                        seq,
                    });
                }
            }

            for (partition, block) in assembly.partitions.iter_mut().zip(blocks) {
                partition.blocks.push(block);
            }
        }

        assembly
    }
}
