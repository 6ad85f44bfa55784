//! Core data types and sketching.
//!
//! - [`Reference`](types::Reference), [`Locus`](types::Locus): what the index records
//! - [`IndexParams`](params::IndexParams): k-mer size, sketch size, stride, and seed
//! - [`KmerHasher`](hasher::KmerHasher): seeded MurmurHash3 x86_32 over k-mer bytes
//! - [`SketchBuilder`](sketch::SketchBuilder), [`Sketch`](sketch::Sketch): bottom-k selection per sequence
//!
//! ## Bottom-k selection
//!
//! For each window start `0, s, 2s, ...` the k-mer is hashed and offered to the
//! sketch:
//!
//! | Situation | Action |
//! |-----------|--------|
//! | hash already kept | append the locus |
//! | sketch not full | insert |
//! | hash < current maximum | insert, evict the maximum and all its loci |
//! | otherwise | discard |
//!
//! The result is the `sketch_size` smallest distinct hashes of the sequence,
//! each with every position it occurred at.

pub mod hasher;
pub mod params;
pub mod sketch;
pub mod types;
