//! Persistence of a [`GlobalIndex`](crate::index::store::GlobalIndex).
//!
//! An index file is a fixed magic header followed by a zlib-compressed,
//! bincode-encoded payload:
//!
//! ```text
//! IndexFile
//! ├─ magic: "SKIDX\0\0\x01" (8 bytes, uncompressed)
//! └─ zlib stream
//!    ├─ PayloadHeader (format version, created_at, params, reference and bin counts)
//!    ├─ ReferenceRecord × reference_count (name, comment, length)
//!    └─ HashBinRecord × bin_count (hash, loci)
//! ```
//!
//! Encoding and compression run as two threads joined by a bounded channel of
//! byte chunks, as do decompression and decoding, so neither the full payload
//! nor the full compressed stream is ever held in memory at once.

pub mod file;
pub mod message;
pub mod pipeline;

/// Magic bytes at the start of every index file
pub const MAGIC: &[u8; 8] = b"SKIDX\0\0\x01";

/// Version of the payload layout following the magic header
pub const FORMAT_VERSION: u32 = 1;

/// Size of each chunk passed between pipeline stages and fed to zlib
pub const CHUNK_SIZE: usize = 16 * 1024;

/// Number of chunks the channel between stages can hold before the producer blocks
pub const CHANNEL_CAPACITY: usize = 8;

/// Upper bound on the encoded size of a single payload record
pub const MAX_RECORD_BYTES: u64 = 1 << 30;
