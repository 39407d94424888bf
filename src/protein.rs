//! Amino-acid export: voucher DNA records as FASTA plus their protein translations.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::codon::{CodonTable, translate};
use crate::dataset::save;
use crate::error::Error;
use crate::genes::{GeneInfo, GeneTable};

/// A stored sequence for one (voucher, gene) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRow {
    pub voucher_code: String,
    pub gene_code: String,
    pub sequence: String,
    pub accession: Option<String>,
}

/// Taxonomy of a voucher, used to name exported records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoucherInfo {
    pub code: String,
    pub genus: String,
    pub species: String,
}

/// A sequence already deposited in GenBank, listed instead of exported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessionItem {
    pub voucher_code: String,
    pub gene_code: String,
    pub accession: String,
}

/// Turns a DNA sequence into a protein FASTA record.
pub trait Translator {
    fn translate(
        &self,
        gene: &GeneInfo,
        sequence: &str,
        description: &str,
        id: &str,
    ) -> Result<String, Error>;
}

/// Translates with the gene's reading frame and NCBI genetic code.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodonTableTranslator;

impl Translator for CodonTableTranslator {
    fn translate(
        &self,
        gene: &GeneInfo,
        sequence: &str,
        description: &str,
        id: &str,
    ) -> Result<String, Error> {
        let frame = gene.reading_frame.ok_or_else(|| {
            Error::Validation(format!("no reading frame for gene {}", gene.gene_code))
        })?;
        let genetic_code = gene.genetic_code.ok_or_else(|| {
            Error::Validation(format!("no genetic code for gene {}", gene.gene_code))
        })?;
        let table = CodonTable::for_genetic_code(genetic_code)?;

        let cds = sequence.as_bytes().get(frame.trim()..).unwrap_or_default();
        let protein = translate(cds, &table);
        Ok(format!(
            ">{id} {description}\n{}\n",
            String::from_utf8_lossy(&protein)
        ))
    }
}

/// Result of an amino-acid export.
#[derive(Debug, Clone, Default)]
pub struct ProteinExport {
    pub fasta: String,
    pub protein: String,
    pub items_with_accession: Vec<AccessionItem>,
    pub warnings: Vec<String>,
}

/// Strip placeholder `?` from both ends of a sequence.
#[must_use]
pub fn strip_question_marks(seq: &str) -> &str {
    seq.trim_matches('?')
}

fn record_description(voucher: &VoucherInfo, gene: &GeneInfo) -> String {
    format!(
        "[org={} {}] [Specimen-voucher={}] [note={} gene, partial cds.] [Lineage=]",
        voucher.genus, voucher.species, voucher.code, gene.description
    )
}

/// Export the rows belonging to the requested vouchers and genes.
pub fn export_aminoacids<T: Translator>(
    rows: &[SequenceRow],
    genes: &GeneTable,
    vouchers: &[VoucherInfo],
    voucher_codes: &[String],
    gene_codes: &[String],
    translator: &T,
) -> ProteinExport {
    let voucher_codes: HashSet<&str> = voucher_codes.iter().map(|v| v.as_str()).collect();
    let gene_codes: HashSet<&str> = gene_codes.iter().map(|g| g.as_str()).collect();
    let voucher_index: HashMap<&str, &VoucherInfo> =
        vouchers.iter().map(|v| (v.code.as_str(), v)).collect();
    let mut export = ProteinExport::default();

    for row in rows {
        if !voucher_codes.contains(row.voucher_code.as_str())
            || !gene_codes.contains(row.gene_code.as_str())
        {
            continue;
        }

        if let Some(accession) = row.accession.as_deref().map(str::trim)
            && !accession.is_empty()
        {
            export.items_with_accession.push(AccessionItem {
                voucher_code: row.voucher_code.clone(),
                gene_code: row.gene_code.clone(),
                accession: accession.to_string(),
            });
            continue;
        }

        let Some(voucher) = voucher_index.get(row.voucher_code.as_str()) else {
            warn!(voucher = %row.voucher_code, "no voucher metadata");
            export
                .warnings
                .push(format!("No voucher metadata for {}, skipped", row.voucher_code));
            continue;
        };
        let fallback;
        let gene = match genes.get(&row.gene_code) {
            Some(gene) => gene,
            None => {
                fallback = GeneInfo::new(row.gene_code.clone(), None);
                &fallback
            }
        };

        let id = format!("{}_{}_{}", voucher.genus, voucher.species, voucher.code);
        let description = record_description(voucher, gene);
        let dna = strip_question_marks(&row.sequence);
        export.fasta.push_str(&format!(">{id} {description}\n{dna}\n"));

        // the reading frame counts from the start of the stored sequence, placeholders included
        match translator.translate(gene, &row.sequence, &description, &id) {
            Ok(protein) => export.protein.push_str(&protein),
            Err(e) => export.warnings.push(format!("Could not translate {id}: {e}")),
        }
    }

    export
}

impl ProteinExport {
    /// Save the DNA and protein FASTA texts, returning their paths.
    pub fn save(&self, dir: &Path) -> Result<(PathBuf, PathBuf), Error> {
        let fasta = save(dir, "FASTA", &self.fasta)?;
        let protein = save(dir, "PROTEIN", &self.protein)?;
        Ok((fasta, protein))
    }
}
