//! Sequence sources feeding the indexer.
//!
//! Records are produced in file order as [`SequenceRecord`]s: a name, an
//! optional comment (empty when absent), and the raw sequence bytes.
//!
//! ## Example
//!
//! ```rust,no_run
//! use sketch_index::parsing::fasta::for_each_record;
//! use std::path::Path;
//!
//! let count = for_each_record(Path::new("genomes.fa.gz"), |record| {
//!     println!("{} {}", record.name, record.len());
//!     Ok(())
//! })
//! .unwrap();
//! ```

pub mod fasta;

/// One input sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    pub name: String,
    pub comment: String,
    pub sequence: Vec<u8>,
}

impl SequenceRecord {
    pub fn new(name: impl Into<String>, comment: impl Into<String>, sequence: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            comment: comment.into(),
            sequence,
        }
    }

    /// Sequence length in bases
    #[must_use]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}
