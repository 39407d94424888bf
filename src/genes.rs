//! Read-only gene reference table (reading frames, genetic codes, descriptions).

use std::collections::HashMap;

use crate::codon::ReadingFrame;
use crate::error::Error;

/// Reference data for one gene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneInfo {
    pub gene_code: String,
    pub reading_frame: Option<ReadingFrame>,
    /// NCBI genetic code id used for translation.
    pub genetic_code: Option<u8>,
    pub description: String,
}

impl GeneInfo {
    pub fn new(gene_code: impl Into<String>, reading_frame: Option<ReadingFrame>) -> Self {
        Self {
            gene_code: gene_code.into(),
            reading_frame,
            genetic_code: None,
            description: String::new(),
        }
    }
}

/// Gene table indexed by gene code.
#[derive(Debug, Clone, Default)]
pub struct GeneTable {
    genes: HashMap<String, GeneInfo>,
}

impl GeneTable {
    pub fn new<I>(genes: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = GeneInfo>,
    {
        let mut table = HashMap::new();
        for gene in genes {
            if table.contains_key(&gene.gene_code) {
                return Err(Error::Validation(format!(
                    "duplicate gene code in gene table: {}",
                    gene.gene_code
                )));
            }
            table.insert(gene.gene_code.clone(), gene);
        }
        Ok(Self { genes: table })
    }

    #[must_use]
    pub fn get(&self, gene_code: &str) -> Option<&GeneInfo> {
        self.genes.get(gene_code)
    }

    /// Reading frame of a gene, `None` when the gene is unknown or has no frame.
    #[must_use]
    pub fn reading_frame(&self, gene_code: &str) -> Option<ReadingFrame> {
        self.genes.get(gene_code).and_then(|g| g.reading_frame)
    }

    /// Reading frames of the requested genes. Genes without a frame map to `None`.
    #[must_use]
    pub fn reading_frames(&self, gene_codes: &[String]) -> HashMap<String, Option<ReadingFrame>> {
        gene_codes
            .iter()
            .map(|code| (code.clone(), self.reading_frame(code)))
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }
}
