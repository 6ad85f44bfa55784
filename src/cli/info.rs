use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::cli::OutputFormat;
use crate::core::types::{HashValue, Locus};
use crate::index::store::GlobalIndex;

#[derive(Args)]
pub struct InfoArgs {
    /// Index file
    #[arg(required = true)]
    pub index: PathBuf,

    /// Also list every hash bin and its loci
    #[arg(long)]
    pub dump: bool,
}

/// Execute info subcommand
///
/// # Errors
///
/// Returns an error if the index cannot be loaded.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: InfoArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let index = GlobalIndex::load(&args.index)
        .with_context(|| format!("Failed to load index {}", args.index.display()))?;

    if verbose {
        eprintln!(
            "Loaded {} references and {} hash bins",
            index.len(),
            index.bin_count()
        );
    }

    match format {
        OutputFormat::Text => print_text_info(&args, &index),
        OutputFormat::Json => print_json_info(&args, &index)?,
        OutputFormat::Tsv => print_tsv_info(&args, &index),
    }

    Ok(())
}

/// Bins sorted by hash so output is stable across runs
fn sorted_bins(index: &GlobalIndex) -> Vec<(HashValue, &[Locus])> {
    let mut bins: Vec<_> = index.bins().collect();
    bins.sort_unstable_by_key(|(hash, _)| *hash);
    bins
}

fn print_text_info(args: &InfoArgs, index: &GlobalIndex) {
    let stats = index.stats();

    println!("Index: {}", args.index.display());
    println!("{}", "=".repeat(60));
    if let Some(created_at) = index.created_at() {
        println!("  Created: {created_at}");
    }
    println!("  Parameters: {}", index.params());
    println!("  Sequences: {}", stats.references);
    println!("  Total bases: {}", stats.total_bases);
    println!("  Hash bins: {}", stats.hash_bins);
    println!("  Loci: {}", stats.loci);

    println!("\nReferences:");
    for reference in index.references() {
        println!("  {:>6}  {reference}", reference.id);
    }

    if args.dump {
        println!("\nHash bins:");
        for (hash, loci) in sorted_bins(index) {
            println!("  Hash {hash}:");
            for locus in loci {
                println!("    Seq: {}\tPos: {}", locus.sequence, locus.position);
            }
        }
    }
}

fn print_json_info(args: &InfoArgs, index: &GlobalIndex) -> anyhow::Result<()> {
    let mut output = serde_json::json!({
        "path": args.index.display().to_string(),
        "created_at": index.created_at(),
        "params": index.params(),
        "stats": index.stats(),
        "references": index.references(),
    });

    if args.dump {
        let bins: Vec<_> = sorted_bins(index)
            .into_iter()
            .map(|(hash, loci)| serde_json::json!({ "hash": hash, "loci": loci }))
            .collect();
        output["hash_bins"] = serde_json::Value::Array(bins);
    }

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_info(args: &InfoArgs, index: &GlobalIndex) {
    if args.dump {
        println!("hash\tsequence\tposition");
        for (hash, loci) in sorted_bins(index) {
            for locus in loci {
                println!("{hash}\t{}\t{}", locus.sequence, locus.position);
            }
        }
        return;
    }

    println!("id\tname\tlength\tcomment");
    for reference in index.references() {
        println!(
            "{}\t{}\t{}\t{}",
            reference.id, reference.name, reference.length, reference.comment
        );
    }
}
