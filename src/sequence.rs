//! Aligned sequence records grouped by gene.

use std::collections::BTreeMap;
use std::collections::btree_map;

use crate::error::Error;

/// One voucher's aligned sequence for one gene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    /// Voucher (specimen) code.
    pub id: String,
    /// Gene code the sequence belongs to.
    pub name: String,
    pub seq: String,
}

impl SequenceRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>, seq: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            seq: seq.into(),
        }
    }
}

/// Sequence records indexed by gene code.
///
/// Genes iterate in sorted code order; records within a gene keep insertion order.
#[derive(Debug, Clone, Default)]
pub struct SeqObjs {
    genes: BTreeMap<String, Vec<SequenceRecord>>,
}

impl SeqObjs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from (gene code, records) pairs in any order.
    pub fn from_genes<I>(genes: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (String, Vec<SequenceRecord>)>,
    {
        let mut seq_objs = Self::new();
        for (gene_code, records) in genes {
            seq_objs.add_gene(&gene_code);
            for record in records {
                seq_objs.push(&gene_code, record)?;
            }
        }
        Ok(seq_objs)
    }

    /// Register a gene, even if it ends up with no records.
    pub fn add_gene(&mut self, gene_code: &str) {
        self.genes.entry(gene_code.to_string()).or_default();
    }

    /// Append a record to a gene. A voucher may appear only once per gene.
    pub fn push(&mut self, gene_code: &str, record: SequenceRecord) -> Result<(), Error> {
        let records = self.genes.entry(gene_code.to_string()).or_default();
        if records.iter().any(|r| r.id == record.id) {
            return Err(Error::Validation(format!(
                "duplicate voucher {} for gene {gene_code}",
                record.id
            )));
        }
        records.push(record);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, gene_code: &str) -> Option<&[SequenceRecord]> {
        self.genes.get(gene_code).map(|v| v.as_slice())
    }

    /// Genes in sorted code order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Vec<SequenceRecord>> {
        self.genes.iter()
    }

    pub fn gene_codes(&self) -> impl Iterator<Item = &str> {
        self.genes.keys().map(|k| k.as_str())
    }

    /// Total number of records over all genes.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.genes.values().map(|v| v.len()).sum()
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

impl<'a> IntoIterator for &'a SeqObjs {
    type Item = (&'a String, &'a Vec<SequenceRecord>);
    type IntoIter = btree_map::Iter<'a, String, Vec<SequenceRecord>>;

    fn into_iter(self) -> Self::IntoIter {
        self.genes.iter()
    }
}
