use std::path::Path;

use tracing::{debug, info, warn};

use crate::core::params::IndexParams;
use crate::core::sketch::SketchBuilder;
use crate::core::types::SequenceId;
use crate::index::error::IndexError;
use crate::index::store::GlobalIndex;
use crate::parsing::fasta;
use crate::parsing::SequenceRecord;

/// Drives sequences through sketching and merges them into a [`GlobalIndex`].
///
/// Sequences are processed strictly one at a time in the order they are added,
/// so sequence ids follow input order across every added file.
#[derive(Debug)]
pub struct IndexBuilder {
    sketcher: SketchBuilder,
    index: GlobalIndex,
}

impl IndexBuilder {
    /// Start an empty index.
    ///
    /// # Errors
    ///
    /// Returns `IndexError::Configuration` if `params` are invalid.
    pub fn new(params: IndexParams) -> Result<Self, IndexError> {
        let sketcher = SketchBuilder::new(&params)?;
        Ok(Self {
            sketcher,
            index: GlobalIndex::new(params),
        })
    }

    /// Register, sketch, and merge one sequence, returning its id.
    ///
    /// # Errors
    ///
    /// Returns `IndexError::Configuration` if no more sequence ids are available.
    pub fn add_sequence(&mut self, record: &SequenceRecord) -> Result<SequenceId, IndexError> {
        let id = self
            .index
            .register_reference(record.name.as_str(), record.comment.as_str())?;

        if record.sequence.is_empty() {
            warn!(name = %record.name, "Empty sequence");
        }

        let sketch = self.sketcher.sketch(id, &record.sequence);
        debug!(
            id,
            name = %record.name,
            length = record.len(),
            hashes = sketch.len(),
            "Indexed sequence"
        );
        self.index.merge(sketch)?;
        self.index.finalize_reference(id, record.len() as u64)?;

        Ok(id)
    }

    /// Add every record of a FASTA file (plain or gzip), returning how many were added.
    ///
    /// # Errors
    ///
    /// Returns `IndexError::Transport` if the file cannot be opened, or
    /// `IndexError::Sequence` if a record cannot be parsed.
    pub fn add_fasta(&mut self, path: &Path) -> Result<usize, IndexError> {
        if path.as_os_str() != "-" && !fasta::is_fasta_file(path) {
            warn!(path = %path.display(), "Input does not have a FASTA extension, reading anyway");
        }

        let added = fasta::for_each_record(path, |record| {
            self.add_sequence(&record)?;
            Ok(())
        })?;
        info!(
            path = %path.display(),
            sequences = added,
            total = self.index.len(),
            "Added FASTA"
        );
        Ok(added)
    }

    /// The index built so far
    #[must_use]
    pub fn index(&self) -> &GlobalIndex {
        &self.index
    }

    #[must_use]
    pub fn finish(self) -> GlobalIndex {
        self.index
    }
}
