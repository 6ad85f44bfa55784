//! Structured payload encoding.
//!
//! Records are written one at a time with bincode so the encoder can stream
//! into the compression stage. The decoder trusts none of the embedded counts:
//! every record is checked against the header as it is read.

use std::borrow::Cow;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::io::{self, Read, Write};

use bincode::Options;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use super::{FORMAT_VERSION, MAX_RECORD_BYTES};
use crate::core::params::IndexParams;
use crate::core::types::{HashValue, Locus, Reference, SequenceId};
use crate::index::error::IndexError;
use crate::index::store::GlobalIndex;

/// Leading record of the payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadHeader {
    pub format_version: u32,
    pub created_at: String,
    pub params: IndexParams,
    pub reference_count: u64,
    pub bin_count: u64,
}

#[derive(Debug, Serialize, Deserialize)]
struct ReferenceRecord<'a> {
    name: Cow<'a, str>,
    comment: Cow<'a, str>,
    length: u64,
}

#[derive(Debug, Serialize, Deserialize)]
struct HashBinRecord<'a> {
    hash: HashValue,
    loci: Cow<'a, [Locus]>,
}

fn wire_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
        .with_limit(MAX_RECORD_BYTES)
}

fn write_record<W: Write, T: Serialize>(writer: &mut W, record: &T) -> Result<(), IndexError> {
    wire_options()
        .serialize_into(writer, record)
        .map_err(|e| match *e {
            // The only sink is the pipeline channel, so a broken pipe is the consumer going away
            bincode::ErrorKind::Io(io) if io.kind() == io::ErrorKind::BrokenPipe => {
                IndexError::StageClosed
            }
            bincode::ErrorKind::Io(io) => IndexError::Transport(io),
            other => IndexError::Compression(format!("failed to encode record: {other}")),
        })
}

fn read_record<R: Read, T: DeserializeOwned>(reader: &mut R, what: &str) -> Result<T, IndexError> {
    wire_options().deserialize_from(reader).map_err(|e| match *e {
        bincode::ErrorKind::Io(io) if io.kind() == io::ErrorKind::UnexpectedEof => {
            IndexError::Compression(format!("payload ended inside {what}"))
        }
        bincode::ErrorKind::Io(io) => IndexError::Transport(io),
        other => IndexError::Compression(format!("invalid {what}: {other}")),
    })
}

/// Write the whole index as a payload.
///
/// # Errors
///
/// Returns `IndexError::StageClosed` if the downstream stage went away, or
/// `IndexError::Compression` if a record cannot be encoded.
pub fn encode<W: Write>(index: &GlobalIndex, writer: &mut W) -> Result<(), IndexError> {
    let header = PayloadHeader {
        format_version: FORMAT_VERSION,
        created_at: chrono::Utc::now().to_rfc3339(),
        params: *index.params(),
        reference_count: index.len() as u64,
        bin_count: index.bin_count() as u64,
    };
    write_record(writer, &header)?;

    for reference in index.references() {
        write_record(
            writer,
            &ReferenceRecord {
                name: Cow::Borrowed(reference.name.as_str()),
                comment: Cow::Borrowed(reference.comment.as_str()),
                length: reference.length,
            },
        )?;
    }

    for (hash, loci) in index.bins() {
        write_record(
            writer,
            &HashBinRecord {
                hash,
                loci: Cow::Borrowed(loci),
            },
        )?;
    }

    debug!(
        references = header.reference_count,
        bins = header.bin_count,
        "Encoded payload"
    );
    Ok(())
}

/// Read a payload back into an index.
///
/// # Errors
///
/// Returns `IndexError::Compression` if the payload is malformed: wrong format
/// version, invalid parameters, records missing or left over, an empty or
/// duplicated hash bin, or a locus naming an unknown sequence.
pub fn decode<R: Read>(reader: &mut R) -> Result<GlobalIndex, IndexError> {
    let header: PayloadHeader = read_record(reader, "payload header")?;

    if header.format_version != FORMAT_VERSION {
        return Err(IndexError::Compression(format!(
            "unsupported payload version {} (expected {FORMAT_VERSION})",
            header.format_version
        )));
    }
    header
        .params
        .validate()
        .map_err(|e| IndexError::Compression(format!("stored parameters are invalid: {e}")))?;

    let reference_count = SequenceId::try_from(header.reference_count).map_err(|_| {
        IndexError::Compression(format!(
            "reference count {} is out of range",
            header.reference_count
        ))
    })?;

    let mut references = Vec::with_capacity(capacity_hint(header.reference_count));
    for id in 0..reference_count {
        let record: ReferenceRecord<'static> = read_record(reader, "reference record")?;
        references.push(
            Reference::new(id, record.name.into_owned(), record.comment.into_owned())
                .with_length(record.length),
        );
    }

    let mut bins: HashMap<HashValue, Vec<Locus>> =
        HashMap::with_capacity(capacity_hint(header.bin_count));
    for _ in 0..header.bin_count {
        let record: HashBinRecord<'static> = read_record(reader, "hash bin record")?;
        let loci = record.loci.into_owned();

        if loci.is_empty() {
            return Err(IndexError::Compression(format!(
                "hash bin {} has no loci",
                record.hash
            )));
        }
        if let Some(bad) = loci.iter().find(|l| l.sequence >= reference_count) {
            return Err(IndexError::Compression(format!(
                "hash bin {} refers to sequence {} but only {reference_count} references exist",
                record.hash, bad.sequence
            )));
        }

        match bins.entry(record.hash) {
            Entry::Occupied(_) => {
                return Err(IndexError::Compression(format!(
                    "hash bin {} appears more than once",
                    record.hash
                )));
            }
            Entry::Vacant(slot) => {
                slot.insert(loci);
            }
        }
    }

    let mut probe = [0u8; 1];
    if reader.read(&mut probe)? != 0 {
        return Err(IndexError::Compression(
            "unexpected data after the last hash bin".to_string(),
        ));
    }

    debug!(
        references = references.len(),
        bins = bins.len(),
        created_at = %header.created_at,
        "Decoded payload"
    );
    Ok(GlobalIndex::from_parts(
        header.params,
        references,
        bins,
        Some(header.created_at),
    ))
}

/// Preallocation size that a corrupt count cannot blow up
fn capacity_hint(count: u64) -> usize {
    usize::try_from(count.min(4096)).unwrap_or(0)
}
