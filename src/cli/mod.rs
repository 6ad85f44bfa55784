//! Command-line interface for sketch-index.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **build**: Sketch FASTA files and write an index
//! - **info**: Show the parameters, references, and hash bins of an index
//! - **query**: Report which indexed references share the most hashes with query sequences
//!
//! ## Usage
//!
//! ```text
//! # Index a set of genomes with k=21 and 1000 hashes per sequence
//! sketch-index build -o refs.idx genomes.fa.gz
//!
//! # Inspect the index
//! sketch-index info refs.idx --format json
//!
//! # Find the closest references for each read set sequence
//! sketch-index query refs.idx contigs.fa -n 3
//! ```

use clap::{Parser, Subcommand};

pub mod build;
pub mod info;
pub mod query;

#[derive(Parser)]
#[command(name = "sketch-index")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Build and query MinHash sketch indexes of sequences")]
#[command(
    long_about = "sketch-index keeps, for each input sequence, the smallest k-mer hashes (a bottom-k MinHash sketch) and merges them into one compressed index mapping each hash to where it occurs.\n\nThe number of hashes two sequences share approximates their k-mer Jaccard similarity."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build an index from FASTA files
    Build(build::BuildArgs),

    /// Describe an index
    Info(info::InfoArgs),

    /// Compare sequences against an index
    Query(query::QueryArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}
