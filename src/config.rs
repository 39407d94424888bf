use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::codon::ReadingFrame;
use crate::dataset::DatasetRequest;
use crate::fasta;
use crate::format::FileFormat;
use crate::genes::{GeneInfo, GeneTable};
use crate::protein::{SequenceRow, VoucherInfo};
use crate::sequence::{SeqObjs, SequenceRecord};
use crate::strategy::{Partitioning, PositionRequest, resolve};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneEntry {
    pub gene_code: String,
    pub reading_frame: Option<u8>,
    pub genetic_code: Option<u8>,
    #[serde(default)]
    pub description: String,
    /// FASTA alignment, relative to the config file.
    pub alignment: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VoucherEntry {
    pub code: String,
    pub genus: String,
    pub species: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetConfig {
    pub codon_positions: Vec<String>,
    pub partition_by_positions: String,
    pub file_format: String,
    pub gene_codes: Vec<String>,
    pub voucher_codes: Vec<String>,
    pub outgroup: Option<String>,
    pub minimum_number_of_genes: Option<usize>,
    #[serde(default)]
    pub aminoacids: bool,
    pub genes: Vec<GeneEntry>,
    #[serde(default)]
    pub vouchers: Vec<VoucherEntry>,
    #[serde(skip)]
    base_dir: PathBuf,
}

/// Highest NCBI genetic code id.
const MAX_GENETIC_CODE: u8 = 33;

impl DatasetConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let mut config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        config.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let request = self.request()?;
        resolve(request.codon_positions, request.partitioning)?;

        for gene in &self.genes {
            if let Some(frame) = gene.reading_frame {
                ReadingFrame::try_from(frame)
                    .with_context(|| format!("gene '{}'", gene.gene_code))?;
            }
            if let Some(code) = gene.genetic_code
                && !(1..=MAX_GENETIC_CODE).contains(&code)
            {
                bail!("gene '{}': invalid genetic code {code}", gene.gene_code);
            }
        }

        for code in &self.gene_codes {
            if !self.genes.iter().any(|g| &g.gene_code == code) {
                bail!("requested gene '{code}' has no entry in 'genes'");
            }
        }

        Ok(())
    }

    /// The dataset request described by this config.
    pub fn request(&self) -> Result<DatasetRequest> {
        let codon_positions = PositionRequest::from_tokens(&self.codon_positions)?;
        let partitioning: Partitioning = self.partition_by_positions.parse()?;
        let file_format: FileFormat = self.file_format.parse()?;
        if self.gene_codes.is_empty() {
            bail!("'geneCodes' is empty");
        }
        if self.voucher_codes.is_empty() {
            bail!("'voucherCodes' is empty");
        }
        Ok(DatasetRequest {
            codon_positions,
            partitioning,
            file_format,
            gene_codes: self.gene_codes.clone(),
            voucher_codes: self.voucher_codes.clone(),
            outgroup: self.outgroup.clone(),
            minimum_number_of_genes: self.minimum_number_of_genes,
            aminoacids: self.aminoacids,
        })
    }

    pub fn gene_table(&self) -> Result<GeneTable> {
        let genes = self
            .genes
            .iter()
            .map(|g| -> Result<GeneInfo> {
                Ok(GeneInfo {
                    gene_code: g.gene_code.clone(),
                    reading_frame: g.reading_frame.map(ReadingFrame::try_from).transpose()?,
                    genetic_code: g.genetic_code,
                    description: g.description.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(GeneTable::new(genes)?)
    }

    #[must_use]
    pub fn voucher_table(&self) -> Vec<VoucherInfo> {
        self.vouchers
            .iter()
            .map(|v| VoucherInfo {
                code: v.code.clone(),
                genus: v.genus.clone(),
                species: v.species.clone(),
            })
            .collect()
    }

    /// Resolve an alignment path against the config file's directory.
    #[must_use]
    pub fn alignment_path(&self, gene: &GeneEntry) -> PathBuf {
        self.base_dir.join(&gene.alignment)
    }

    /// Read the alignments of the requested genes.
    pub fn load_sequences(&self) -> Result<SeqObjs> {
        let mut seq_objs = SeqObjs::new();
        for gene in self.genes.iter().filter(|g| self.gene_codes.contains(&g.gene_code)) {
            let path = self.alignment_path(gene);
            let records = fasta::read_alignment(&path)
                .with_context(|| format!("failed to read alignment: {}", path.display()))?;
            seq_objs.add_gene(&gene.gene_code);
            for (voucher, seq) in records {
                seq_objs.push(
                    &gene.gene_code,
                    SequenceRecord::new(voucher, gene.gene_code.clone(), seq),
                )?;
            }
        }
        Ok(seq_objs)
    }
}

/// Flatten loaded sequences into rows for the amino-acid export.
#[must_use]
pub fn sequence_rows(seq_objs: &SeqObjs) -> Vec<SequenceRow> {
    seq_objs
        .iter()
        .flat_map(|(gene_code, records)| {
            records.iter().map(move |r| SequenceRow {
                voucher_code: r.id.clone(),
                gene_code: gene_code.clone(),
                sequence: r.seq.clone(),
                accession: None,
            })
        })
        .collect()
}
