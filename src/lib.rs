//! genematrix: codon-partitioned multi-gene alignment datasets for phylogenetics.

pub mod error;

pub mod assemble;
pub mod cli;
pub mod codon;
pub mod config;
pub mod dataset;
pub mod fasta;
pub mod format;
pub mod genes;
pub mod metadata;
pub mod protein;
pub mod sequence;
pub mod strategy;
