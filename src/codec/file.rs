use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use flate2::Compression;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::pipeline::{self, ChunkReader, ChunkWriter};
use super::{message, MAGIC};
use crate::index::error::IndexError;
use crate::index::store::GlobalIndex;

/// The on-disk index container: magic header followed by the compressed payload
pub struct IndexFile;

impl IndexFile {
    /// Write `index` to `path`.
    ///
    /// The file is written to a temporary file in the same directory and moved
    /// into place only once everything has been written, so a failed save never
    /// leaves a complete-looking index behind.
    ///
    /// # Errors
    ///
    /// Returns `IndexError::Transport` on I/O failure, `IndexError::Compression`
    /// if compression fails, or `IndexError::ResourceAcquisition` if the
    /// pipeline cannot be started.
    pub fn save(index: &GlobalIndex, path: &Path) -> Result<(), IndexError> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut writer = BufWriter::new(NamedTempFile::new_in(dir)?);
        let compressed = Self::write_to(index, &mut writer)?;
        let temp = writer.into_inner().map_err(|e| e.into_error())?;
        temp.persist(path).map_err(|e| IndexError::Transport(e.error))?;

        info!(
            path = %path.display(),
            references = index.len(),
            bins = index.bin_count(),
            compressed_bytes = compressed,
            "Saved index"
        );
        Ok(())
    }

    /// Write the magic header and compressed payload to `sink`.
    ///
    /// Returns the number of compressed payload bytes written.
    ///
    /// # Errors
    ///
    /// As for [`save`](Self::save).
    pub fn write_to<W: Write>(index: &GlobalIndex, mut sink: W) -> Result<u64, IndexError> {
        // The header is written by the consumer so nothing reaches `sink` unless
        // both stages are running
        pipeline::run(
            "encode",
            |tx| {
                let mut writer = ChunkWriter::new(tx);
                message::encode(index, &mut writer)?;
                writer.finish()
            },
            |rx| {
                sink.write_all(MAGIC)?;
                pipeline::deflate_stage(&rx, &mut sink, Compression::default())
            },
        )
    }

    /// Load an index from `path`.
    ///
    /// # Errors
    ///
    /// Returns `IndexError::FormatMismatch` if the file does not start with the
    /// index header, `IndexError::Transport` on I/O failure,
    /// `IndexError::Compression` if the payload is corrupt or truncated, or
    /// `IndexError::ResourceAcquisition` if the pipeline cannot be started.
    pub fn load(path: &Path) -> Result<GlobalIndex, IndexError> {
        let file = File::open(path)?;
        let index = Self::read_from(BufReader::new(file))?;
        info!(
            path = %path.display(),
            references = index.len(),
            bins = index.bin_count(),
            "Loaded index"
        );
        Ok(index)
    }

    /// Load an index from any byte source.
    ///
    /// The header is checked before any decompression starts.
    ///
    /// # Errors
    ///
    /// As for [`load`](Self::load).
    pub fn read_from<R: Read + Send>(mut source: R) -> Result<GlobalIndex, IndexError> {
        Self::check_header(&mut source)?;
        debug!("Index header accepted");

        pipeline::run(
            "decode",
            move |tx| pipeline::inflate_stage(source, &tx),
            |rx| message::decode(&mut ChunkReader::new(rx)),
        )
    }

    /// Read and verify the magic header, leaving `source` at the payload.
    ///
    /// # Errors
    ///
    /// Returns `IndexError::FormatMismatch` if the source is shorter than the
    /// header or the bytes differ, or `IndexError::Transport` on I/O failure.
    pub fn check_header<R: Read>(source: &mut R) -> Result<(), IndexError> {
        let mut magic = [0u8; MAGIC.len()];
        match source.read_exact(&mut magic) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                return Err(IndexError::FormatMismatch(
                    "input is shorter than the index header".to_string(),
                ));
            }
            Err(e) => return Err(e.into()),
        }

        if &magic != MAGIC {
            return Err(IndexError::FormatMismatch(format!(
                "unexpected header bytes {}",
                String::from_utf8_lossy(&magic).escape_debug()
            )));
        }
        Ok(())
    }
}
