use thiserror::Error;

/// Failures while building, saving, or loading an index
#[derive(Error, Debug)]
pub enum IndexError {
    /// The file does not start with the index magic header
    #[error("Not a sketch index: {0}")]
    FormatMismatch(String),

    /// The underlying file or stream reported an I/O error
    #[error("I/O error: {0}")]
    Transport(#[from] std::io::Error),

    /// Compressed data is invalid or truncated, or the payload it carries is inconsistent
    #[error("Corrupt index data: {0}")]
    Compression(String),

    /// Caller-supplied parameters are unusable
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// A pipeline stage could not be started
    #[error("Failed to start pipeline stage: {0}")]
    ResourceAcquisition(String),

    /// The sequence source failed to produce a record
    #[error("Failed to read sequences: {0}")]
    Sequence(String),

    /// The other side of a pipeline channel went away
    #[error("Pipeline stage closed unexpectedly")]
    StageClosed,
}

impl IndexError {
    /// Name of the phase that failed, for user-facing reports
    #[must_use]
    pub fn phase(&self) -> &'static str {
        match self {
            Self::FormatMismatch(_) => "format check",
            Self::Transport(_) => "transport",
            Self::Compression(_) => "compression",
            Self::Configuration(_) => "configuration",
            Self::ResourceAcquisition(_) | Self::StageClosed => "pipeline setup",
            Self::Sequence(_) => "sequence input",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_names() {
        assert_eq!(
            IndexError::FormatMismatch("x".to_string()).phase(),
            "format check"
        );
        assert_eq!(
            IndexError::from(std::io::Error::other("disk")).phase(),
            "transport"
        );
        assert_eq!(
            IndexError::Compression("bad".to_string()).phase(),
            "compression"
        );
    }

    #[test]
    fn test_display() {
        let err = IndexError::Configuration("stride must be at least 1".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: stride must be at least 1"
        );
    }
}
