use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::core::sketch::SketchBuilder;
use crate::index::store::GlobalIndex;
use crate::parsing::fasta;

#[derive(Args)]
pub struct QueryArgs {
    /// Index file
    #[arg(required = true)]
    pub index: PathBuf,

    /// Query FASTA file, plain or gzip compressed. Use '-' for stdin
    #[arg(required = true)]
    pub input: PathBuf,

    /// Number of matches to show per query sequence
    #[arg(short = 'n', long, default_value = "5")]
    pub max_matches: usize,
}

/// One reference hit for one query sequence
#[derive(Debug, Serialize)]
struct QueryHit {
    query: String,
    query_hashes: usize,
    reference: String,
    reference_id: u32,
    shared_hashes: usize,
    containment: f64,
}

/// Execute query subcommand
///
/// # Errors
///
/// Returns an error if the index or the query file cannot be read.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: QueryArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let index = GlobalIndex::load(&args.index)
        .with_context(|| format!("Failed to load index {}", args.index.display()))?;

    // Queries must be sketched exactly as the references were
    let sketcher = SketchBuilder::new(index.params())?;

    if verbose {
        eprintln!("Sketching queries with {}", index.params());
    }

    let mut hits = Vec::new();
    let mut ordinal = 0u32;
    fasta::for_each_record(&args.input, |record| {
        let sketch = sketcher.sketch(ordinal, &record.sequence);
        ordinal = ordinal.saturating_add(1);

        for shared in index
            .shared_hash_counts(&sketch)
            .into_iter()
            .take(args.max_matches)
        {
            let reference = index
                .reference(shared.sequence)
                .map_or_else(String::new, |r| r.name.clone());
            hits.push(QueryHit {
                query: record.name.clone(),
                query_hashes: sketch.len(),
                reference,
                reference_id: shared.sequence,
                shared_hashes: shared.shared,
                containment: shared.containment(sketch.len()),
            });
        }
        Ok(())
    })
    .with_context(|| format!("Failed to read queries from {}", args.input.display()))?;

    match format {
        OutputFormat::Text => print_text_hits(&hits),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&hits)?),
        OutputFormat::Tsv => print_tsv_hits(&hits),
    }

    Ok(())
}

fn print_text_hits(hits: &[QueryHit]) {
    if hits.is_empty() {
        println!("No shared hashes found");
        return;
    }

    let mut current: Option<&str> = None;
    for hit in hits {
        if current != Some(hit.query.as_str()) {
            println!("\nQuery: {} ({} hashes)", hit.query, hit.query_hashes);
            current = Some(hit.query.as_str());
        }
        println!(
            "  {:<30} {:>6} shared  {:>6.2}%",
            hit.reference,
            hit.shared_hashes,
            hit.containment * 100.0
        );
    }
}

fn print_tsv_hits(hits: &[QueryHit]) {
    println!("query\treference\treference_id\tshared_hashes\tquery_hashes\tcontainment");
    for hit in hits {
        println!(
            "{}\t{}\t{}\t{}\t{}\t{:.4}",
            hit.query,
            hit.reference,
            hit.reference_id,
            hit.shared_hashes,
            hit.query_hashes,
            hit.containment
        );
    }
}
