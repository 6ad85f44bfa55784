//! Centralized validation and helper functions.

use crate::core::types::SequenceId;
use crate::index::error::IndexError;

/// Largest accepted k-mer length
pub const MAX_KMER_SIZE: usize = 1024;

/// Sequence id for the next reference given how many are already registered.
///
/// # Examples
///
/// ```
/// use sketch_index::utils::validation::next_sequence_id;
///
/// assert_eq!(next_sequence_id(0).unwrap(), 0);
/// assert_eq!(next_sequence_id(41).unwrap(), 41);
/// ```
///
/// # Errors
///
/// Returns `IndexError::Configuration` once the id space is exhausted.
pub fn next_sequence_id(count: usize) -> Result<SequenceId, IndexError> {
    SequenceId::try_from(count)
        .ok()
        .filter(|id| *id < SequenceId::MAX)
        .ok_or_else(|| {
            IndexError::Configuration(format!(
                "Too many sequences: at most {} can be indexed",
                SequenceId::MAX
            ))
        })
}
