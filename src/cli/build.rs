use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::cli::OutputFormat;
use crate::core::params::{
    IndexParams, DEFAULT_KMER_SIZE, DEFAULT_SEED, DEFAULT_SKETCH_SIZE, DEFAULT_STRIDE,
};
use crate::index::builder::IndexBuilder;
use crate::index::store::IndexStats;

#[derive(Args)]
pub struct BuildArgs {
    /// Input FASTA file(s), plain or gzip compressed. Use '-' for stdin
    #[arg(required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,

    /// Output index file
    #[arg(short, long, required = true)]
    pub output: PathBuf,

    /// K-mer size
    #[arg(short = 'k', long, default_value_t = DEFAULT_KMER_SIZE)]
    pub kmer_size: usize,

    /// Number of minimum hashes kept per sequence
    #[arg(short = 's', long, default_value_t = DEFAULT_SKETCH_SIZE)]
    pub sketch_size: usize,

    /// Step between k-mer start positions
    #[arg(long, default_value_t = DEFAULT_STRIDE)]
    pub stride: usize,

    /// Hash seed
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u32,
}

impl BuildArgs {
    fn params(&self) -> IndexParams {
        IndexParams::default()
            .with_kmer_size(self.kmer_size)
            .with_sketch_size(self.sketch_size)
            .with_stride(self.stride)
            .with_seed(self.seed)
    }
}

/// Execute build subcommand
///
/// # Errors
///
/// Returns an error if the parameters are invalid, an input cannot be read,
/// or the index cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: BuildArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let params = args.params();
    let mut builder = IndexBuilder::new(params)?;

    for input in &args.inputs {
        let added = builder
            .add_fasta(input)
            .with_context(|| format!("Failed to index {}", input.display()))?;
        if verbose {
            eprintln!("Indexed {added} sequences from {}", input.display());
        }
    }

    let index = builder.finish();
    index
        .save(&args.output)
        .with_context(|| format!("Failed to write index {}", args.output.display()))?;

    let stats = index.stats();
    match format {
        OutputFormat::Text => print_text_summary(&args, &params, &stats),
        OutputFormat::Json => print_json_summary(&args, &params, &stats)?,
        OutputFormat::Tsv => print_tsv_summary(&args, &stats),
    }

    Ok(())
}

fn print_text_summary(args: &BuildArgs, params: &IndexParams, stats: &IndexStats) {
    println!("Wrote {}", args.output.display());
    println!("  Parameters: {params}");
    println!("  Sequences: {}", stats.references);
    println!("  Total bases: {}", stats.total_bases);
    println!("  Hash bins: {}", stats.hash_bins);
    println!("  Loci: {}", stats.loci);
}

fn print_json_summary(
    args: &BuildArgs,
    params: &IndexParams,
    stats: &IndexStats,
) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "output": args.output.display().to_string(),
        "params": params,
        "stats": stats,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_summary(args: &BuildArgs, stats: &IndexStats) {
    println!("output\tsequences\ttotal_bases\thash_bins\tloci");
    println!(
        "{}\t{}\t{}\t{}\t{}",
        args.output.display(),
        stats.references,
        stats.total_bases,
        stats.hash_bins,
        stats.loci
    );
}
