use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, trace};

use crate::codec::file::IndexFile;
use crate::core::params::IndexParams;
use crate::core::sketch::Sketch;
use crate::core::types::{HashValue, Locus, Reference, SequenceId};
use crate::index::error::IndexError;
use crate::utils::validation::next_sequence_id;

/// Number of distinct sketch hashes a reference shares with a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SharedHits {
    pub sequence: SequenceId,
    pub shared: usize,
}

impl SharedHits {
    /// Fraction of the query sketch found in this reference.
    ///
    /// This is containment of the query in the reference, not Jaccard
    /// similarity: a short query fully inside a long reference scores 1.0.
    #[must_use]
    pub fn containment(&self, sketch_len: usize) -> f64 {
        if sketch_len == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        {
            self.shared as f64 / sketch_len as f64
        }
    }
}

/// Summary counts for an index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub references: usize,
    pub hash_bins: usize,
    pub loci: usize,
    pub total_bases: u64,
}

/// Merged sketches of every indexed sequence
#[derive(Debug, Clone)]
pub struct GlobalIndex {
    params: IndexParams,

    /// References in processing order; position equals sequence id
    references: Vec<Reference>,

    /// Index: hash -> loci in merge order
    bins: HashMap<HashValue, Vec<Locus>>,

    /// When the index was written, if it came from a file
    created_at: Option<String>,
}

impl GlobalIndex {
    /// Create an empty index for sequences sketched with `params`
    #[must_use]
    pub fn new(params: IndexParams) -> Self {
        Self {
            params,
            references: Vec::new(),
            bins: HashMap::new(),
            created_at: None,
        }
    }

    /// Assemble an index from already validated parts
    pub(crate) fn from_parts(
        params: IndexParams,
        references: Vec<Reference>,
        bins: HashMap<HashValue, Vec<Locus>>,
        created_at: Option<String>,
    ) -> Self {
        Self {
            params,
            references,
            bins,
            created_at,
        }
    }

    /// Load an index file.
    ///
    /// # Errors
    ///
    /// See [`IndexFile::load`].
    pub fn load(path: &Path) -> Result<Self, IndexError> {
        IndexFile::load(path)
    }

    /// Save to an index file, replacing any existing file only on success.
    ///
    /// # Errors
    ///
    /// See [`IndexFile::save`].
    pub fn save(&self, path: &Path) -> Result<(), IndexError> {
        IndexFile::save(self, path)
    }

    #[must_use]
    pub fn params(&self) -> &IndexParams {
        &self.params
    }

    #[must_use]
    pub fn created_at(&self) -> Option<&str> {
        self.created_at.as_deref()
    }

    /// Append a reference for a sequence about to be scanned and return its id.
    ///
    /// The length is filled in by [`finalize_reference`](Self::finalize_reference)
    /// once the scan completes.
    ///
    /// # Errors
    ///
    /// Returns `IndexError::Configuration` if the sequence id space is exhausted.
    pub fn register_reference(
        &mut self,
        name: impl Into<String>,
        comment: impl Into<String>,
    ) -> Result<SequenceId, IndexError> {
        let id = next_sequence_id(self.references.len())?;
        self.references.push(Reference::new(id, name, comment));
        Ok(id)
    }

    /// Record the final length of a registered reference.
    ///
    /// # Errors
    ///
    /// Returns `IndexError::Configuration` if `id` was never registered.
    pub fn finalize_reference(&mut self, id: SequenceId, length: u64) -> Result<(), IndexError> {
        let count = self.references.len();
        let reference = self
            .references
            .get_mut(id as usize)
            .ok_or_else(|| unregistered(id, count))?;
        reference.length = length;
        Ok(())
    }

    /// Fold a finished sketch into the index.
    ///
    /// Loci are appended to each hash's bin in sketch order. Each sequence must
    /// be merged exactly once; merging twice duplicates its loci.
    ///
    /// # Errors
    ///
    /// Returns `IndexError::Configuration`, leaving the index unchanged, if the
    /// sketch or any of its loci names a sequence that was never registered.
    pub fn merge(&mut self, sketch: Sketch) -> Result<(), IndexError> {
        let sequence = sketch.sequence();
        let count = self.references.len();
        if sequence as usize >= count {
            return Err(unregistered(sequence, count));
        }
        if let Some(bad) = sketch
            .iter()
            .flat_map(|(_, loci)| loci)
            .find(|locus| locus.sequence as usize >= count)
        {
            return Err(unregistered(bad.sequence, count));
        }

        let mut created = 0usize;
        for (hash, loci) in sketch.into_entries() {
            let bin = self.bins.entry(hash).or_insert_with(|| {
                created += 1;
                Vec::new()
            });
            bin.extend(loci);
        }
        trace!(sequence, new_bins = created, total_bins = self.bins.len(), "Merged sketch");
        Ok(())
    }

    /// All references in processing order
    #[must_use]
    pub fn references(&self) -> &[Reference] {
        &self.references
    }

    /// Reference metadata by sequence id
    #[must_use]
    pub fn reference(&self, id: SequenceId) -> Option<&Reference> {
        self.references.get(id as usize)
    }

    /// Loci recorded for a hash
    #[must_use]
    pub fn loci(&self, hash: HashValue) -> Option<&[Locus]> {
        self.bins.get(&hash).map(Vec::as_slice)
    }

    /// Hash bins in internal iteration order
    pub fn bins(&self) -> impl Iterator<Item = (HashValue, &[Locus])> {
        self.bins.iter().map(|(&hash, loci)| (hash, loci.as_slice()))
    }

    /// Number of references
    #[must_use]
    pub fn len(&self) -> usize {
        self.references.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    #[must_use]
    pub fn bin_count(&self) -> usize {
        self.bins.len()
    }

    #[must_use]
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            references: self.references.len(),
            hash_bins: self.bins.len(),
            loci: self.bins.values().map(Vec::len).sum(),
            total_bases: self.references.iter().map(|r| r.length).sum(),
        }
    }

    /// Count, per reference, the distinct hashes of `sketch` it contains.
    ///
    /// Only references sharing at least one hash are returned, sorted by
    /// shared count (descending) then sequence id.
    #[must_use]
    pub fn shared_hash_counts(&self, sketch: &Sketch) -> Vec<SharedHits> {
        let mut counts = vec![0usize; self.references.len()];
        let mut last_hash: Vec<Option<HashValue>> = vec![None; self.references.len()];

        for hash in sketch.hashes() {
            let Some(loci) = self.bins.get(&hash) else {
                continue;
            };
            for locus in loci {
                let idx = locus.sequence as usize;
                if idx < counts.len() && last_hash[idx] != Some(hash) {
                    last_hash[idx] = Some(hash);
                    counts[idx] += 1;
                }
            }
        }

        let mut hits: Vec<SharedHits> = counts
            .into_iter()
            .enumerate()
            .filter(|(_, shared)| *shared > 0)
            .filter_map(|(idx, shared)| {
                Some(SharedHits {
                    sequence: SequenceId::try_from(idx).ok()?,
                    shared,
                })
            })
            .collect();
        hits.sort_by(|a, b| b.shared.cmp(&a.shared).then(a.sequence.cmp(&b.sequence)));

        debug!(
            query_hashes = sketch.len(),
            matching_references = hits.len(),
            "Counted shared hashes"
        );
        hits
    }
}

fn unregistered(id: SequenceId, count: usize) -> IndexError {
    IndexError::Configuration(format!(
        "sequence {id} is not registered ({count} references)"
    ))
}

impl PartialEq for GlobalIndex {
    fn eq(&self, other: &Self) -> bool {
        self.params == other.params
            && self.references == other.references
            && self.bins == other.bins
    }
}

impl Eq for GlobalIndex {}

impl Default for GlobalIndex {
    fn default() -> Self {
        Self::new(IndexParams::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sketch::SketchBuilder;

    fn sketch_with(sequence: SequenceId, entries: &[(HashValue, &[u64])]) -> Sketch {
        let mut sketch = Sketch::new(sequence, entries.len());
        for (hash, positions) in entries {
            for &position in *positions {
                sketch.offer(*hash, Locus::new(sequence, position));
            }
        }
        sketch
    }

    #[test]
    fn test_register_assigns_sequential_ids() {
        let mut index = GlobalIndex::default();
        assert_eq!(index.register_reference("a", "").unwrap(), 0);
        assert_eq!(index.register_reference("b", "second").unwrap(), 1);
        index.finalize_reference(1, 42).unwrap();

        assert_eq!(index.len(), 2);
        assert_eq!(index.reference(1).unwrap().name, "b");
        assert_eq!(index.reference(1).unwrap().comment, "second");
        assert_eq!(index.reference(1).unwrap().length, 42);
        assert_eq!(index.reference(0).unwrap().length, 0);
        assert!(index.reference(2).is_none());
    }

    #[test]
    fn test_merge_appends_in_processing_order() {
        let mut index = GlobalIndex::default();
        let a = index.register_reference("a", "").unwrap();
        let b = index.register_reference("b", "").unwrap();

        index.merge(sketch_with(a, &[(10, &[0, 5]), (20, &[3])])).unwrap();
        index.merge(sketch_with(b, &[(10, &[7]), (30, &[1])])).unwrap();

        assert_eq!(
            index.loci(10).unwrap(),
            &[Locus::new(0, 0), Locus::new(0, 5), Locus::new(1, 7)]
        );
        assert_eq!(index.loci(20).unwrap(), &[Locus::new(0, 3)]);
        assert_eq!(index.loci(30).unwrap(), &[Locus::new(1, 1)]);
        assert!(index.loci(40).is_none());
        assert_eq!(index.bin_count(), 3);
    }

    #[test]
    fn test_merge_completeness() {
        let params = IndexParams::default().with_kmer_size(4).with_sketch_size(8);
        let builder = SketchBuilder::new(&params).unwrap();
        let mut index = GlobalIndex::new(params);

        let seqs: [&[u8]; 3] = [b"ACGTTGCAACGTAGGCT", b"TTGCAACGTAGGA", b"GGGGCCCCAAAATTTT"];
        let mut sketches = Vec::new();
        for (i, seq) in seqs.iter().enumerate() {
            let id = index.register_reference(format!("s{i}"), "").unwrap();
            let sketch = builder.sketch(id, seq);
            sketches.push(sketch.clone());
            index.merge(sketch).unwrap();
            index.finalize_reference(id, seq.len() as u64).unwrap();
        }

        for sketch in &sketches {
            for (hash, loci) in sketch.iter() {
                let bin = index.loci(hash).unwrap();
                for locus in loci {
                    assert_eq!(bin.iter().filter(|l| *l == locus).count(), 1);
                }
            }
        }

        let merged: usize = sketches.iter().map(Sketch::locus_count).sum();
        assert_eq!(index.stats().loci, merged);
    }

    #[test]
    fn test_merge_twice_duplicates_loci() {
        let mut index = GlobalIndex::default();
        let a = index.register_reference("a", "").unwrap();
        let sketch = sketch_with(a, &[(10, &[0])]);
        index.merge(sketch.clone()).unwrap();
        index.merge(sketch).unwrap();
        assert_eq!(index.loci(10).unwrap().len(), 2);
        assert_eq!(index.bin_count(), 1);
    }

    #[test]
    fn test_merge_rejects_unregistered_sequence() {
        let mut index = GlobalIndex::default();
        index.register_reference("a", "").unwrap();

        let result = index.merge(sketch_with(5, &[(10, &[0])]));
        assert!(matches!(result, Err(IndexError::Configuration(_))));
        assert_eq!(index.bin_count(), 0);

        // Index is still writable and loadable after the rejected merge
        let mut bytes = Vec::new();
        IndexFile::write_to(&index, &mut bytes).unwrap();
        assert_eq!(IndexFile::read_from(bytes.as_slice()).unwrap(), index);
    }

    #[test]
    fn test_merge_rejects_foreign_locus() {
        let mut index = GlobalIndex::default();
        let a = index.register_reference("a", "").unwrap();

        let mut sketch = Sketch::new(a, 4);
        sketch.offer(10, Locus::new(a, 0));
        sketch.offer(20, Locus::new(3, 1));

        assert!(matches!(
            index.merge(sketch),
            Err(IndexError::Configuration(_))
        ));
        assert!(index.loci(10).is_none());
    }

    #[test]
    fn test_finalize_unregistered_reference() {
        let mut index = GlobalIndex::default();
        assert!(matches!(
            index.finalize_reference(0, 10),
            Err(IndexError::Configuration(_))
        ));
    }

    #[test]
    fn test_shared_hash_counts() {
        let mut index = GlobalIndex::default();
        let a = index.register_reference("a", "").unwrap();
        let b = index.register_reference("b", "").unwrap();
        let c = index.register_reference("c", "").unwrap();
        index.merge(sketch_with(a, &[(1, &[0, 9]), (2, &[1]), (3, &[2])])).unwrap();
        index.merge(sketch_with(b, &[(3, &[0]), (4, &[1])])).unwrap();
        index.merge(sketch_with(c, &[(99, &[0])])).unwrap();

        let query = sketch_with(7, &[(1, &[0]), (3, &[1]), (4, &[2]), (5, &[3])]);
        let hits = index.shared_hash_counts(&query);

        assert_eq!(
            hits,
            vec![
                SharedHits { sequence: 0, shared: 2 },
                SharedHits { sequence: 1, shared: 2 },
            ]
        );
        assert!((hits[0].containment(query.len()) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_index() {
        let index = GlobalIndex::default();
        assert!(index.is_empty());
        assert_eq!(index.bin_count(), 0);
        assert_eq!(
            index.stats(),
            IndexStats {
                references: 0,
                hash_bins: 0,
                loci: 0,
                total_bases: 0
            }
        );
        assert!(index.shared_hash_counts(&Sketch::new(0, 5)).is_empty());
    }

    #[test]
    fn test_equality_ignores_created_at() {
        let a = GlobalIndex::default();
        let b = GlobalIndex::from_parts(
            IndexParams::default(),
            Vec::new(),
            HashMap::new(),
            Some("2024-01-01T00:00:00+00:00".to_string()),
        );
        assert_eq!(a, b);
    }
}
