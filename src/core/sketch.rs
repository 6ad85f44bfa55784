//! Bottom-k MinHash sketching of a single sequence.
//!
//! A [`Sketch`] keeps the `sketch_size` smallest distinct k-mer hashes seen in a
//! sequence, together with every position at which each kept hash occurred.
//! Hashes are offered in scan order; once the sketch is full a new hash only
//! enters by displacing the current largest one.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::core::hasher::KmerHasher;
use crate::core::params::IndexParams;
use crate::core::types::{HashValue, Locus, SequenceId};
use crate::index::error::IndexError;

/// Outcome of offering one hash to a sketch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offer {
    /// Hash already present; the locus was appended
    Appended,
    /// New hash inserted while the sketch had room
    Inserted,
    /// New hash inserted and the previous maximum evicted
    Replaced { evicted: HashValue },
    /// Hash not small enough to enter a full sketch
    Rejected,
}

/// The bounded set of minimum hashes selected from one sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sketch {
    sequence: SequenceId,
    capacity: usize,
    entries: BTreeMap<HashValue, Vec<Locus>>,
}

impl Sketch {
    #[must_use]
    pub fn new(sequence: SequenceId, capacity: usize) -> Self {
        Self {
            sequence,
            capacity,
            entries: BTreeMap::new(),
        }
    }

    /// Offer a hash observed at `locus`.
    pub fn offer(&mut self, hash: HashValue, locus: Locus) -> Offer {
        if let Some(loci) = self.entries.get_mut(&hash) {
            loci.push(locus);
            return Offer::Appended;
        }

        if self.entries.len() < self.capacity {
            self.entries.insert(hash, vec![locus]);
            return Offer::Inserted;
        }

        match self.max_hash() {
            Some(max) if hash < max => {
                self.entries.insert(hash, vec![locus]);
                self.entries.pop_last();
                Offer::Replaced { evicted: max }
            }
            _ => Offer::Rejected,
        }
    }

    /// Sequence this sketch was built from
    #[must_use]
    pub fn sequence(&self) -> SequenceId {
        self.sequence
    }

    /// Maximum number of distinct hashes
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of distinct hashes held
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// Largest hash currently kept
    #[must_use]
    pub fn max_hash(&self) -> Option<HashValue> {
        self.entries.last_key_value().map(|(&hash, _)| hash)
    }

    #[must_use]
    pub fn contains(&self, hash: HashValue) -> bool {
        self.entries.contains_key(&hash)
    }

    /// Loci recorded for `hash`, if it was kept
    #[must_use]
    pub fn loci(&self, hash: HashValue) -> Option<&[Locus]> {
        self.entries.get(&hash).map(Vec::as_slice)
    }

    /// Kept hashes in ascending order
    pub fn hashes(&self) -> impl Iterator<Item = HashValue> + '_ {
        self.entries.keys().copied()
    }

    /// Entries in ascending hash order
    pub fn iter(&self) -> impl Iterator<Item = (HashValue, &[Locus])> {
        self.entries
            .iter()
            .map(|(&hash, loci)| (hash, loci.as_slice()))
    }

    /// Total number of loci across all entries
    #[must_use]
    pub fn locus_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub(crate) fn into_entries(self) -> BTreeMap<HashValue, Vec<Locus>> {
        self.entries
    }
}

/// Scans sequences and produces their sketches
#[derive(Debug, Clone, Copy)]
pub struct SketchBuilder {
    hasher: KmerHasher,
    kmer_size: usize,
    sketch_size: usize,
    stride: usize,
}

impl SketchBuilder {
    /// Create a builder for the given parameters.
    ///
    /// # Errors
    ///
    /// Returns `IndexError::Configuration` if the parameters are invalid.
    pub fn new(params: &IndexParams) -> Result<Self, IndexError> {
        params.validate()?;
        Ok(Self {
            hasher: KmerHasher::new(params.seed),
            kmer_size: params.kmer_size,
            sketch_size: params.sketch_size,
            stride: params.stride,
        })
    }

    #[must_use]
    pub fn hasher(&self) -> KmerHasher {
        self.hasher
    }

    /// Sketch one sequence.
    ///
    /// Windows start at `0, stride, 2 * stride, ...` while a full k-mer fits.
    /// Sequences shorter than the k-mer size give an empty sketch.
    #[must_use]
    pub fn sketch(&self, sequence: SequenceId, bases: &[u8]) -> Sketch {
        let mut sketch = Sketch::new(sequence, self.sketch_size);

        if bases.len() < self.kmer_size {
            debug!(
                sequence,
                length = bases.len(),
                k = self.kmer_size,
                "Sequence shorter than k-mer size, sketch is empty"
            );
            return sketch;
        }

        for (position, window) in bases
            .windows(self.kmer_size)
            .enumerate()
            .step_by(self.stride)
        {
            let hash = self.hasher.hash(window);
            let offer = sketch.offer(hash, Locus::new(sequence, position as u64));
            trace!(sequence, position, hash, ?offer, "Hashed k-mer");
        }

        debug!(
            sequence,
            hashes = sketch.len(),
            loci = sketch.locus_count(),
            "Sketched sequence"
        );
        sketch
    }
}
