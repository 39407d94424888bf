use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;

use genematrix::cli;
use genematrix::config::{DatasetConfig, sequence_rows};
use genematrix::dataset::DatasetBuilder;
use genematrix::protein::{CodonTableTranslator, export_aminoacids};

#[derive(Parser)]
#[command(name = "build_dataset", about = "Build a codon-partitioned multi-gene dataset")]
struct Cli {
    /// Path to the JSON dataset configuration
    #[arg(short = 'c', long = "config")]
    config: PathBuf,

    /// Output directory
    #[arg(short = 'o', long = "out")]
    out: PathBuf,

    /// Print the rendered dataset to stdout
    #[arg(long)]
    print: bool,
}

fn main() -> Result<()> {
    let start = Instant::now();
    let cli_args = Cli::parse();
    cli::init_logging();

    cli::banner("Build Dataset");

    // ── Configuration ────────────────────────────────────
    cli::section("Configuration");

    let config = DatasetConfig::from_file(&cli_args.config)?;
    let request = config.request()?;

    cli::kv("Config", &cli_args.config.display().to_string());
    cli::kv("Format", &request.file_format.to_string());
    cli::kv("Codon positions", &request.codon_positions.to_string());
    cli::kv("Partitioning", &request.partitioning.to_string());
    cli::kv("Genes", &request.gene_codes.len().to_string());
    cli::kv("Vouchers", &request.voucher_codes.len().to_string());
    if let Some(outgroup) = &request.outgroup {
        cli::kv("Outgroup", outgroup);
    }
    if let Some(minimum) = request.minimum_number_of_genes {
        cli::kv("Minimum genes", &minimum.to_string());
    }

    fs::create_dir_all(&cli_args.out)
        .with_context(|| format!("failed to create directory: {}", cli_args.out.display()))?;
    cli::kv("Output", &cli_args.out.display().to_string());

    eprintln!();

    // ── Alignments ───────────────────────────────────────
    cli::section("Alignments");

    let genes = config.gene_table()?;
    let seq_objs = config.load_sequences()?;
    for (gene_code, records) in &seq_objs {
        let frame = genes
            .reading_frame(gene_code)
            .map(|f| f.to_string())
            .unwrap_or_else(|| "none".yellow().to_string());
        cli::kv(
            gene_code,
            &format!("{} sequences, reading frame {frame}", records.len()),
        );
    }

    eprintln!();

    // ── Building ─────────────────────────────────────────
    cli::section("Building");

    let builder = DatasetBuilder::new(request.clone(), &genes, seq_objs.clone())?;
    cli::kv("Strategy", &builder.strategy().to_string());
    let dataset = builder.build(&cli_args.out)?;

    for warning in &dataset.warnings {
        cli::warning(warning);
    }
    cli::kv("Dataset", &dataset.path.display().to_string());
    cli::kv("Characters", &dataset.metadata.number_chars.to_string());
    for (gene_code, length) in &dataset.metadata.gene_codes_and_lengths {
        cli::kv(&format!("  {gene_code}"), &length.to_string());
    }
    if !dataset.metadata.vouchers_to_drop.is_empty() {
        let vouchers: Vec<&str> = dataset
            .metadata
            .vouchers_to_drop
            .iter()
            .map(|v| v.as_str())
            .collect();
        cli::warning(&format!(
            "{} vouchers below minimum gene count: {}",
            vouchers.len(),
            vouchers.join(", ")
        ));
    }
    cli::success(&format!(
        "{} dataset, {} bytes",
        dataset.file_format,
        dataset.text.len()
    ));

    if request.aminoacids {
        eprintln!();
        cli::section("Amino acids");
        let export = export_aminoacids(
            &sequence_rows(&seq_objs),
            &genes,
            &config.voucher_table(),
            &request.voucher_codes,
            &request.gene_codes,
            &CodonTableTranslator,
        );
        for warning in &export.warnings {
            cli::warning(warning);
        }
        let (fasta_path, protein_path) = export.save(&cli_args.out)?;
        cli::kv("DNA", &fasta_path.display().to_string());
        cli::kv("Protein", &protein_path.display().to_string());
        if !export.items_with_accession.is_empty() {
            cli::kv(
                "With accession",
                &export.items_with_accession.len().to_string(),
            );
        }
    }

    if cli_args.print {
        println!("{}", dataset.text);
    }

    cli::print_summary(start);
    Ok(())
}
