use serde::{Deserialize, Serialize};

use crate::index::error::IndexError;
use crate::utils::validation::MAX_KMER_SIZE;

/// Default k-mer length
pub const DEFAULT_KMER_SIZE: usize = 21;

/// Default number of minimum hashes kept per sequence
pub const DEFAULT_SKETCH_SIZE: usize = 1000;

/// Default step between k-mer start positions
pub const DEFAULT_STRIDE: usize = 1;

/// Default MurmurHash3 seed
pub const DEFAULT_SEED: u32 = 42;

/// Parameters controlling how sequences are sketched.
///
/// These are stored alongside the index so that a loaded index can sketch new
/// query sequences exactly the way its references were sketched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexParams {
    /// Length of each hashed window
    pub kmer_size: usize,

    /// Maximum number of distinct hashes kept per sequence
    pub sketch_size: usize,

    /// Step between consecutive window start positions
    pub stride: usize,

    /// Hash seed
    pub seed: u32,
}

impl IndexParams {
    #[must_use]
    pub fn with_kmer_size(mut self, kmer_size: usize) -> Self {
        self.kmer_size = kmer_size;
        self
    }

    #[must_use]
    pub fn with_sketch_size(mut self, sketch_size: usize) -> Self {
        self.sketch_size = sketch_size;
        self
    }

    #[must_use]
    pub fn with_stride(mut self, stride: usize) -> Self {
        self.stride = stride;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    /// Check the parameters describe a scan that can actually run.
    ///
    /// A sketch size of zero is allowed and yields empty sketches.
    ///
    /// # Errors
    ///
    /// Returns `IndexError::Configuration` if the k-mer size is zero or above
    /// [`MAX_KMER_SIZE`], or if the stride is zero.
    pub fn validate(&self) -> Result<(), IndexError> {
        if self.kmer_size == 0 {
            return Err(IndexError::Configuration(
                "k-mer size must be at least 1".to_string(),
            ));
        }
        if self.kmer_size > MAX_KMER_SIZE {
            return Err(IndexError::Configuration(format!(
                "k-mer size {} exceeds maximum of {MAX_KMER_SIZE}",
                self.kmer_size
            )));
        }
        if self.stride == 0 {
            return Err(IndexError::Configuration(
                "stride must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for IndexParams {
    fn default() -> Self {
        Self {
            kmer_size: DEFAULT_KMER_SIZE,
            sketch_size: DEFAULT_SKETCH_SIZE,
            stride: DEFAULT_STRIDE,
            seed: DEFAULT_SEED,
        }
    }
}

impl std::fmt::Display for IndexParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "k={} sketch_size={} stride={} seed={}",
            self.kmer_size, self.sketch_size, self.stride, self.seed
        )
    }
}
