use serde::{Deserialize, Serialize};

/// 32-bit k-mer hash value
pub type HashValue = u32;

/// Position of a sequence in processing order (0-based)
pub type SequenceId = u32;

/// Where a selected hash was observed: a sequence and an offset into it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Locus {
    /// Sequence the k-mer came from
    pub sequence: SequenceId,

    /// 0-based start of the k-mer within the sequence
    pub position: u64,
}

impl Locus {
    #[must_use]
    pub const fn new(sequence: SequenceId, position: u64) -> Self {
        Self { sequence, position }
    }
}

impl std::fmt::Display for Locus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.sequence, self.position)
    }
}

/// Metadata for one indexed sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// Sequence id, equal to this reference's position in the index
    pub id: SequenceId,

    /// Sequence name (first word of the FASTA definition line)
    pub name: String,

    /// Remainder of the definition line, empty when absent
    #[serde(default)]
    pub comment: String,

    /// Sequence length in bases
    pub length: u64,
}

impl Reference {
    pub fn new(id: SequenceId, name: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            comment: comment.into(),
            length: 0,
        }
    }

    #[must_use]
    pub fn with_length(mut self, length: u64) -> Self {
        self.length = length;
        self
    }
}

impl std::fmt::Display for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.comment.is_empty() {
            write!(f, "{} ({} bp)", self.name, self.length)
        } else {
            write!(f, "{} {} ({} bp)", self.name, self.comment, self.length)
        }
    }
}
