use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use genematrix::cli;
use genematrix::format::FileFormat;
use genematrix::metadata::{Metadata, first_partition, parse_rendered};

#[derive(Parser)]
#[command(
    name = "dataset_stats",
    about = "Report gene lengths and under-covered vouchers of a rendered dataset"
)]
struct Cli {
    /// Rendered dataset file
    #[arg(short = 'i', long = "input")]
    input: PathBuf,

    /// Dataset format (FASTA, NEXUS, PHY or TNT)
    #[arg(short = 'f', long = "format")]
    format: FileFormat,

    /// Minimum number of genes a voucher needs
    #[arg(short = 'm', long = "min-genes")]
    minimum_number_of_genes: Option<usize>,

    /// Number of partitions in the dataset; needed to find the first partition of a TNT file
    #[arg(short = 'p', long = "partitions")]
    partitions: Option<usize>,
}

fn main() -> Result<()> {
    let start = Instant::now();
    let cli_args = Cli::parse();
    cli::init_logging();

    cli::banner("Dataset Stats");
    cli::section("Input");
    cli::kv("Dataset", &cli_args.input.display().to_string());
    cli::kv("Format", &cli_args.format.to_string());

    let text = std::fs::read_to_string(&cli_args.input)
        .with_context(|| format!("failed to read dataset: {}", cli_args.input.display()))?;
    let blocks = parse_rendered(&text, cli_args.format)
        .with_context(|| format!("malformed dataset: {}", cli_args.input.display()))?;
    let first = first_partition(&blocks, cli_args.format, cli_args.partitions)?;
    cli::kv(
        "Blocks",
        &format!("{} parsed, {} in first partition", blocks.len(), first.len()),
    );
    let metadata = Metadata::from_blocks(first, cli_args.minimum_number_of_genes);

    eprintln!();
    cli::section("Blocks");
    for (gene_code, length) in &metadata.gene_codes_and_lengths {
        cli::kv(gene_code, &format!("{length} characters"));
    }
    cli::kv("Total", &format!("{} characters", metadata.number_chars));

    if cli_args.minimum_number_of_genes.is_some() {
        eprintln!();
        cli::section("Coverage");
        if metadata.vouchers_to_drop.is_empty() {
            cli::success("all vouchers meet the minimum gene count");
        }
        for voucher in &metadata.vouchers_to_drop {
            cli::warning(&format!("{voucher} below minimum gene count"));
            println!("{voucher}");
        }
    }

    cli::print_summary(start);
    Ok(())
}
