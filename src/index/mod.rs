//! The global hash-to-locus index.
//!
//! Sequences are sketched one at a time, in input order, and each finished
//! sketch is merged into a [`GlobalIndex`](store::GlobalIndex). The index maps
//! every selected hash to the loci where it was seen across all sequences and
//! keeps the ordered list of reference metadata.
//!
//! ## Example
//!
//! ```rust
//! use sketch_index::index::builder::IndexBuilder;
//! use sketch_index::parsing::SequenceRecord;
//! use sketch_index::IndexParams;
//!
//! let params = IndexParams::default().with_kmer_size(5).with_sketch_size(10);
//! let mut builder = IndexBuilder::new(params).unwrap();
//! builder
//!     .add_sequence(&SequenceRecord::new("seq1", "", b"ACGTACGTTTGACCA".to_vec()))
//!     .unwrap();
//!
//! let index = builder.finish();
//! assert_eq!(index.len(), 1);
//! ```

pub mod builder;
pub mod error;
pub mod store;
