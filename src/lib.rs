//! # sketch-index
//!
//! A library for building compact MinHash similarity indexes over biological sequences.
//!
//! Each input sequence is reduced to a bottom-k sketch: the `sketch_size` smallest
//! distinct hashes of its k-mers, with the positions where they occur. Sketches are
//! merged into one index mapping each hash to every locus across all sequences.
//! Two sequences sharing a large fraction of their sketch hashes are likely to
//! share a large fraction of their k-mers.
//!
//! ## Features
//!
//! - **Bottom-k sketching**: Bounded, deterministic selection of minimum hashes
//! - **Inverted index**: O(1) lookup from hash to loci, plus reference metadata
//! - **Compressed persistence**: Streaming encode and zlib compression on separate threads
//! - **Validated loading**: Magic header checked up front, every payload count verified
//!
//! ## Example
//!
//! ```rust,no_run
//! use sketch_index::{GlobalIndex, IndexBuilder, IndexParams, SketchBuilder};
//! use std::path::Path;
//!
//! // Sketch every sequence in a FASTA file
//! let params = IndexParams::default().with_kmer_size(21).with_sketch_size(1000);
//! let mut builder = IndexBuilder::new(params).unwrap();
//! builder.add_fasta(Path::new("genomes.fa")).unwrap();
//! let index = builder.finish();
//!
//! // Persist and reload
//! index.save(Path::new("genomes.idx")).unwrap();
//! let index = GlobalIndex::load(Path::new("genomes.idx")).unwrap();
//!
//! // Which references share hashes with a query?
//! let sketcher = SketchBuilder::new(index.params()).unwrap();
//! let query = sketcher.sketch(0, b"ACGTTGCAACGTAGGCTAGCTAGGATCCA");
//! for hit in index.shared_hash_counts(&query) {
//!     println!("{}: {}", index.reference(hit.sequence).unwrap().name, hit.shared);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Sequence metadata, parameters, hashing, and sketching
//! - [`index`]: The merged hash-to-locus index and its builder
//! - [`codec`]: Index file format and the compression pipeline
//! - [`parsing`]: FASTA input
//! - [`cli`]: Command-line interface implementation

pub mod cli;
pub mod codec;
pub mod core;
pub mod index;
pub mod parsing;
pub mod utils;

// Re-export commonly used types for convenience
pub use codec::file::IndexFile;
pub use core::hasher::KmerHasher;
pub use core::params::IndexParams;
pub use core::sketch::{Sketch, SketchBuilder};
pub use core::types::*;
pub use index::builder::IndexBuilder;
pub use index::error::IndexError;
pub use index::store::{GlobalIndex, IndexStats, SharedHits};
