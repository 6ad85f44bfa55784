//! Seeded 32-bit k-mer hashing.
//!
//! Hashes are MurmurHash3 x86_32 over the raw k-mer bytes. The function is
//! fixed so that indexes written by one build can be queried by another.

use murmurhash3::murmurhash3_x86_32;

use crate::core::types::HashValue;

/// Hashes fixed-length windows with a fixed seed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KmerHasher {
    seed: u32,
}

impl KmerHasher {
    #[must_use]
    pub const fn new(seed: u32) -> Self {
        Self { seed }
    }

    #[must_use]
    pub const fn seed(&self) -> u32 {
        self.seed
    }

    /// Hash one k-mer. The caller supplies exactly `k` bytes.
    #[inline]
    #[must_use]
    pub fn hash(&self, kmer: &[u8]) -> HashValue {
        murmurhash3_x86_32(kmer, self.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_vectors() {
        // Published MurmurHash3_x86_32 values for the empty input
        assert_eq!(KmerHasher::new(0).hash(b""), 0);
        assert_eq!(KmerHasher::new(1).hash(b""), 0x514E_28B7);
        assert_eq!(KmerHasher::new(0xFFFF_FFFF).hash(b""), 0x81F1_6F39);
    }

    #[test]
    fn test_block_reference_vectors() {
        let hasher = KmerHasher::new(0);
        assert_eq!(hasher.hash(b"hello"), 0x248B_FA47);
        assert_eq!(
            hasher.hash(b"The quick brown fox jumps over the lazy dog"),
            0x2E4F_F723
        );
        assert_eq!(hasher.hash(&[0, 0, 0, 0]), 0x2362_F9DE);

        let hasher = KmerHasher::new(0x9747_B28C);
        assert_eq!(hasher.hash(b"aaaa"), 0x5A97_808A);
        assert_eq!(hasher.hash(b"abcd"), 0xF047_8627);
        assert_eq!(hasher.hash(b"Hello, world!"), 0x2488_4CBA);
    }

    #[test]
    fn test_tail_reference_vectors() {
        // One, two, and three trailing bytes after the 4-byte blocks
        let hasher = KmerHasher::new(0x9747_B28C);
        assert_eq!(hasher.hash(b"a"), 0x7FA0_9EA6);
        assert_eq!(hasher.hash(b"aa"), 0x5D21_1726);
        assert_eq!(hasher.hash(b"aaa"), 0x283E_0130);
        assert_eq!(hasher.hash(b"ab"), 0x7487_5592);
        assert_eq!(hasher.hash(b"abc"), 0xC84A_62DD);
    }

    #[test]
    fn test_deterministic() {
        let hasher = KmerHasher::new(42);
        assert_eq!(hasher.hash(b"ACGTACGTACGT"), hasher.hash(b"ACGTACGTACGT"));
    }

    #[test]
    fn test_seed_changes_hash() {
        let a = KmerHasher::new(42).hash(b"ACGTACGTACGT");
        let b = KmerHasher::new(43).hash(b"ACGTACGTACGT");
        assert_ne!(a, b);
    }

    #[test]
    fn test_case_sensitive() {
        let hasher = KmerHasher::new(42);
        assert_ne!(hasher.hash(b"ACGT"), hasher.hash(b"acgt"));
    }
}
