//! Dataset builder: strategy resolution, assembly, rendering and persistence.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;
use uuid::Uuid;

use crate::assemble::{Assembler, Assembly, Partition};
use crate::codon::ReadingFrame;
use crate::error::Error;
use crate::format::FileFormat;
use crate::genes::GeneTable;
use crate::metadata::Metadata;
use crate::sequence::SeqObjs;
use crate::strategy::{Partitioning, PositionRequest, Strategy, resolve};

/// Everything a caller chooses about a dataset.
#[derive(Debug, Clone)]
pub struct DatasetRequest {
    pub codon_positions: PositionRequest,
    pub partitioning: Partitioning,
    pub file_format: FileFormat,
    pub gene_codes: Vec<String>,
    pub voucher_codes: Vec<String>,
    pub outgroup: Option<String>,
    pub minimum_number_of_genes: Option<usize>,
    pub aminoacids: bool,
}

impl DatasetRequest {
    fn validate(&self) -> Result<(), Error> {
        if self.gene_codes.is_empty() {
            return Err(Error::Validation("no gene codes requested".to_string()));
        }
        if self.voucher_codes.is_empty() {
            return Err(Error::Validation("no voucher codes requested".to_string()));
        }
        if let Some(outgroup) = &self.outgroup
            && !self.voucher_codes.contains(outgroup)
        {
            return Err(Error::Validation(format!(
                "outgroup {outgroup} is not among the requested vouchers"
            )));
        }
        if self.minimum_number_of_genes == Some(0) {
            return Err(Error::Validation(
                "minimum number of genes must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// A rendered and saved dataset.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub text: String,
    pub path: PathBuf,
    pub file_format: FileFormat,
    pub strategy: Strategy,
    pub outgroup: Option<String>,
    pub warnings: Vec<String>,
    pub metadata: Metadata,
}

/// Builds one dataset from a request, a gene table and the sequences.
///
/// Reading frames for the requested genes are looked up once, at construction.
pub struct DatasetBuilder {
    request: DatasetRequest,
    strategy: Strategy,
    reading_frames: HashMap<String, Option<ReadingFrame>>,
    seq_objs: SeqObjs,
}

impl DatasetBuilder {
    pub fn new(request: DatasetRequest, genes: &GeneTable, seq_objs: SeqObjs) -> Result<Self, Error> {
        request.validate()?;
        let strategy = resolve(request.codon_positions, request.partitioning)?;
        let reading_frames = genes.reading_frames(&request.gene_codes);
        Ok(Self {
            request,
            strategy,
            reading_frames,
            seq_objs,
        })
    }

    #[must_use]
    pub fn request(&self) -> &DatasetRequest {
        &self.request
    }

    #[must_use]
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Distribute the sequences into partitions.
    #[must_use]
    pub fn assemble(&self) -> Assembly {
        Assembler::new(&self.seq_objs, &self.reading_frames)
            .with_vouchers(&self.request.voucher_codes)
            .assemble(&self.strategy.plan())
    }

    /// Assemble, render and save into `output_dir`. A failed write leaves no file behind.
    pub fn build(&self, output_dir: &Path) -> Result<Dataset, Error> {
        let Assembly {
            partitions,
            warnings,
        } = self.assemble();
        let format = self.request.file_format;
        let text = render(&partitions, format);
        let path = save(output_dir, &format.to_string(), &text)?;

        let first_blocks = partitions
            .first()
            .map(|p| p.blocks.as_slice())
            .unwrap_or_default();
        let metadata = Metadata::from_blocks(first_blocks, self.request.minimum_number_of_genes);

        Ok(Dataset {
            text,
            path,
            file_format: format,
            strategy: self.strategy,
            outgroup: self.request.outgroup.clone(),
            warnings,
            metadata,
        })
    }
}

/// Lines of one partition: a divider per gene block followed by its records.
#[must_use]
pub fn partition_lines(partition: &Partition, format: FileFormat) -> Vec<String> {
    let mut lines = Vec::new();
    for block in &partition.blocks {
        lines.push(format.gene_divider(&block.gene_code, block.suffix));
        for row in &block.rows {
            lines.push(format.record(&row.voucher, &row.seq));
        }
    }
    lines
}

/// Join partitions into the final text: each partition starts on a fresh line and the
/// whole result is trimmed.
#[must_use]
pub fn render(partitions: &[Partition], format: FileFormat) -> String {
    let mut out = String::new();
    for partition in partitions {
        out.push('\n');
        out.push_str(&partition_lines(partition, format).join("\n"));
    }
    out.trim().to_string()
}

/// Write `text` to `{dir}/{kind}_{uuid}.txt`, returning the path.
pub fn save(dir: &Path, kind: &str, text: &str) -> Result<PathBuf, Error> {
    let path = dir.join(format!("{kind}_{}.txt", Uuid::new_v4().simple()));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(text.as_bytes())?;
    tmp.flush()?;
    tmp.persist(&path).map_err(|e| e.error)?;
    debug!(path = %path.display(), bytes = text.len(), "dataset written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genes::GeneInfo;
    use crate::metadata::{first_partition, parse_rendered};
    use crate::sequence::SequenceRecord;

    fn frame(n: u8) -> Option<ReadingFrame> {
        Some(ReadingFrame::try_from(n).unwrap())
    }

    fn request(tokens: &[&str], partitioning: Partitioning, format: FileFormat) -> DatasetRequest {
        DatasetRequest {
            codon_positions: PositionRequest::from_tokens(tokens).unwrap(),
            partitioning,
            file_format: format,
            gene_codes: vec!["G1".to_string(), "G2".to_string()],
            voucher_codes: vec!["A".to_string(), "B".to_string()],
            outgroup: None,
            minimum_number_of_genes: None,
            aminoacids: false,
        }
    }

    fn genes() -> GeneTable {
        GeneTable::new([GeneInfo::new("G1", frame(1)), GeneInfo::new("G2", frame(2))]).unwrap()
    }

    fn two_genes() -> SeqObjs {
        SeqObjs::from_genes([
            (
                "G2".to_string(),
                vec![SequenceRecord::new("A", "G2", "CATGCGA")],
            ),
            (
                "G1".to_string(),
                vec![SequenceRecord::new("A", "G1", "ATGGGCTT")],
            ),
        ])
        .unwrap()
    }

    fn build(request: DatasetRequest, genes: &GeneTable, seq_objs: SeqObjs) -> Dataset {
        let dir = tempfile::tempdir().unwrap();
        let dataset = DatasetBuilder::new(request, genes, seq_objs)
            .unwrap()
            .build(dir.path())
            .unwrap();
        assert_eq!(std::fs::read_to_string(&dataset.path).unwrap(), dataset.text);
        dataset
    }

    #[test]
    fn all_one_keeps_full_sequences() {
        let dataset = build(
            request(&["ALL"], Partitioning::One, FileFormat::Fasta),
            &genes(),
            two_genes(),
        );
        assert_eq!(
            dataset.text,
            ">G1\n--------------------\n>A\nATGGGCTT\n>G2\n--------------------\n>A\nCATGCGA"
        );
        assert_eq!(dataset.strategy, Strategy::ThreePositionOne);
    }

    #[test]
    fn third_position_each() {
        let seq_objs = SeqObjs::from_genes([(
            "G1".to_string(),
            vec![SequenceRecord::new("A", "G1", "ATGCGATCG")],
        )])
        .unwrap();
        let fasta = build(
            request(&["3rd"], Partitioning::Each, FileFormat::Fasta),
            &genes(),
            seq_objs.clone(),
        );
        assert_eq!(fasta.text, ">G1_3rd_codon\n--------------------\n>A\nCAC");

        let phy = build(
            request(&["3rd"], Partitioning::Each, FileFormat::Phy),
            &genes(),
            seq_objs,
        );
        assert_eq!(phy.text, format!("[G1_3rd_codon]\n{:<55}CAC", "A"));
        assert_eq!(phy.metadata.gene_codes_and_lengths["G1"], 3);
    }

    #[test]
    fn first_position_each_and_one_identical() {
        for format in FileFormat::ALL {
            let each = DatasetBuilder::new(
                request(&["1st"], Partitioning::Each, format),
                &genes(),
                two_genes(),
            )
            .unwrap();
            let one = DatasetBuilder::new(
                request(&["1st"], Partitioning::One, format),
                &genes(),
                two_genes(),
            )
            .unwrap();
            assert_eq!(
                render(&each.assemble().partitions, format),
                render(&one.assemble().partitions, format)
            );
        }
    }

    #[test]
    fn genes_rendered_in_sorted_order() {
        let seq_objs = SeqObjs::from_genes(
            ["wingless", "COI", "EF1a"]
                .into_iter()
                .map(|g| (g.to_string(), vec![SequenceRecord::new("A", g, "ACGTAC")])),
        )
        .unwrap();
        let genes = GeneTable::new(
            ["wingless", "COI", "EF1a"]
                .into_iter()
                .map(|g| GeneInfo::new(g, frame(1))),
        )
        .unwrap();
        let mut req = request(&["1st", "2nd"], Partitioning::Each, FileFormat::Nexus);
        req.gene_codes = vec!["wingless".into(), "EF1a".into(), "COI".into()];

        let dataset = build(req, &genes, seq_objs);
        let dividers: Vec<&str> = dataset
            .text
            .lines()
            .filter(|l| l.starts_with('['))
            .collect();
        assert_eq!(
            dividers,
            [
                "[COI_1st_codon]",
                "[EF1a_1st_codon]",
                "[wingless_1st_codon]",
                "[COI_2nd_codon]",
                "[EF1a_2nd_codon]",
                "[wingless_2nd_codon]",
            ]
        );
    }

    #[test]
    fn render_trims_but_keeps_partition_separators() {
        let builder = DatasetBuilder::new(
            request(&["1st", "3rd"], Partitioning::Each, FileFormat::Tnt),
            &genes(),
            two_genes(),
        )
        .unwrap();
        let text = render(&builder.assemble().partitions, FileFormat::Tnt);
        assert!(text.starts_with("[&dna]"));
        assert!(!text.ends_with('\n'));
        // two genes in each of two partitions, each divider preceded by a blank line
        assert_eq!(text.matches("\n\n[&dna]").count(), 3);
    }

    #[test]
    fn missing_frame_warning_and_drop_set() {
        let genes = GeneTable::new([GeneInfo::new("G1", frame(1)), GeneInfo::new("G2", None)])
            .unwrap();
        let seq_objs = SeqObjs::from_genes([
            (
                "G1".to_string(),
                vec![
                    SequenceRecord::new("A", "G1", "ACGTAC"),
                    SequenceRecord::new("B", "G1", "??????"),
                ],
            ),
            (
                "G2".to_string(),
                vec![
                    SequenceRecord::new("A", "G2", "ACGTAC"),
                    SequenceRecord::new("B", "G2", "ACGTAC"),
                ],
            ),
        ])
        .unwrap();
        let mut req = request(&["ALL"], Partitioning::One, FileFormat::Phy);
        req.minimum_number_of_genes = Some(1);

        let dataset = build(req, &genes, seq_objs);
        assert_eq!(dataset.warnings.len(), 1);
        assert!(dataset.warnings[0].contains("G2"));
        assert!(!dataset.text.contains("[G2]"));
        assert_eq!(dataset.metadata.vouchers_to_drop.len(), 1);
        assert!(dataset.metadata.vouchers_to_drop.contains("B"));
    }

    #[test]
    fn request_validation() {
        let mut req = request(&["1st"], Partitioning::One, FileFormat::Fasta);
        req.outgroup = Some("Z".to_string());
        assert!(DatasetBuilder::new(req, &genes(), two_genes()).is_err());

        let mut req = request(&["1st"], Partitioning::One, FileFormat::Fasta);
        req.minimum_number_of_genes = Some(0);
        assert!(DatasetBuilder::new(req, &genes(), two_genes()).is_err());

        let req = DatasetRequest {
            codon_positions: PositionRequest::default(),
            ..request(&["1st"], Partitioning::One, FileFormat::Fasta)
        };
        let err = DatasetBuilder::new(req, &genes(), two_genes()).err().unwrap();
        assert!(matches!(err, Error::UnsupportedCombination { .. }));
    }

    #[test]
    fn save_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let builder = DatasetBuilder::new(
            request(&["1st"], Partitioning::One, FileFormat::Fasta),
            &genes(),
            two_genes(),
        )
        .unwrap();
        assert!(matches!(builder.build(&missing), Err(Error::Io(_))));
        assert!(!missing.exists());
    }

    #[test]
    fn saved_file_name_has_format_prefix() {
        let dataset = build(
            request(&["2nd"], Partitioning::Each, FileFormat::Nexus),
            &genes(),
            two_genes(),
        );
        let name = dataset.path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("NEXUS_"));
        assert!(name.ends_with(".txt"));
        assert_eq!(name.len(), "NEXUS_".len() + 32 + ".txt".len());
    }

    #[test]
    fn rendered_text_parses_back_with_empty_rows() {
        let genes = GeneTable::new([GeneInfo::new("G1", frame(3))]).unwrap();
        let seq_objs = SeqObjs::from_genes([(
            "G1".to_string(),
            vec![
                SequenceRecord::new("A", "G1", "ACGTAC"),
                SequenceRecord::new("B", "G1", "AC"),
            ],
        )])
        .unwrap();

        for format in FileFormat::ALL {
            let dataset = build(
                request(&["1st"], Partitioning::Each, format),
                &genes,
                seq_objs.clone(),
            );
            let blocks = parse_rendered(&dataset.text, format).unwrap();
            assert_eq!(blocks.len(), 1, "{format}");
            let rows: Vec<(&str, &str)> = blocks[0]
                .rows
                .iter()
                .map(|r| (r.voucher.as_str(), r.seq.as_str()))
                .collect();
            assert_eq!(rows, [("A", "GC"), ("B", "")], "{format}");
            if format != FileFormat::Tnt {
                assert_eq!(blocks[0].gene_code, "G1");
                assert_eq!(blocks[0].suffix, Some("_1st_codon"));
            }
        }
    }

    #[test]
    fn metadata_recomputed_from_rendered_text() {
        let seq_objs = SeqObjs::from_genes([
            (
                "G1".to_string(),
                vec![
                    SequenceRecord::new("A", "G1", "ATGGGCTTA"),
                    SequenceRecord::new("B", "G1", "ATGGGCTTA"),
                ],
            ),
            (
                "G2".to_string(),
                vec![SequenceRecord::new("A", "G2", "CATGCGATT")],
            ),
        ])
        .unwrap();

        for format in [FileFormat::Nexus, FileFormat::Phy, FileFormat::Fasta] {
            let mut req = request(&["ALL"], Partitioning::Each, format);
            req.minimum_number_of_genes = Some(2);
            let dataset = build(req, &genes(), seq_objs.clone());
            assert_eq!(
                dataset.metadata.vouchers_to_drop.iter().collect::<Vec<_>>(),
                ["B"]
            );

            let blocks = parse_rendered(&dataset.text, format).unwrap();
            assert_eq!(blocks.len(), 6);
            let first = first_partition(&blocks, format, None).unwrap();
            assert_eq!(Metadata::from_blocks(first, Some(2)), dataset.metadata, "{format}");
            let counted = first_partition(&blocks, format, Some(3)).unwrap();
            assert_eq!(counted.len(), first.len());
        }
    }
}
