//! Reader for FASTA files using noodles.
//!
//! Supports both uncompressed and gzip/bgzip compressed files, and `-` for stdin.
//!
//! Supported extensions:
//! - `.fa`, `.fasta`, `.fna` (uncompressed)
//! - `.fa.gz`, `.fasta.gz`, `.fna.gz` (gzip compressed)
//! - `.fa.bgz`, `.fasta.bgz`, `.fna.bgz` (bgzip compressed)

use std::ffi::OsStr;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use noodles::fasta;

use crate::index::error::IndexError;
use crate::parsing::SequenceRecord;

/// Check if the path has a FASTA extension
pub fn is_fasta_file(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();

    if path_str.ends_with(".fa.gz")
        || path_str.ends_with(".fasta.gz")
        || path_str.ends_with(".fna.gz")
        || path_str.ends_with(".fa.bgz")
        || path_str.ends_with(".fasta.bgz")
        || path_str.ends_with(".fna.bgz")
    {
        return true;
    }

    matches!(
        path.extension()
            .and_then(OsStr::to_str)
            .map(str::to_lowercase)
            .as_deref(),
        Some("fa" | "fasta" | "fna")
    )
}

/// Check if the path is a gzipped file
#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-"
}

/// Open a path for buffered reading, decompressing gzip input
fn open(path: &Path) -> Result<Box<dyn BufRead>, IndexError> {
    if is_stdin(path) {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }

    let file = std::fs::File::open(path)?;
    if is_gzipped(path) {
        // bgzip is a series of gzip members
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Call `f` with every record in the file, in order, returning the record count.
///
/// # Errors
///
/// Returns `IndexError::Transport` if the file cannot be opened,
/// `IndexError::Sequence` if a record cannot be parsed, or any error returned
/// by `f` (processing stops at the first error).
pub fn for_each_record<F>(path: &Path, f: F) -> Result<usize, IndexError>
where
    F: FnMut(SequenceRecord) -> Result<(), IndexError>,
{
    let mut reader = fasta::io::Reader::new(open(path)?);
    read_records(&mut reader, f)
}

/// Call `f` with every record from a noodles FASTA reader
pub fn read_records<R, F>(reader: &mut fasta::io::Reader<R>, mut f: F) -> Result<usize, IndexError>
where
    R: BufRead,
    F: FnMut(SequenceRecord) -> Result<(), IndexError>,
{
    let mut count = 0;

    for result in reader.records() {
        let record = result
            .map_err(|e| IndexError::Sequence(format!("Failed to parse FASTA record: {e}")))?;

        let name = String::from_utf8_lossy(record.name()).to_string();
        let comment = record
            .description()
            .map(|d| String::from_utf8_lossy(d).to_string())
            .unwrap_or_default();
        let sequence = record.sequence().as_ref().to_vec();

        f(SequenceRecord::new(name, comment, sequence))?;
        count += 1;
    }

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn collect(path: &Path) -> Vec<SequenceRecord> {
        let mut records = Vec::new();
        for_each_record(path, |record| {
            records.push(record);
            Ok(())
        })
        .unwrap();
        records
    }

    #[test]
    fn test_is_fasta_file() {
        assert!(is_fasta_file(Path::new("test.fa")));
        assert!(is_fasta_file(Path::new("test.fasta")));
        assert!(is_fasta_file(Path::new("test.fna")));
        assert!(is_fasta_file(Path::new("test.fa.gz")));
        assert!(is_fasta_file(Path::new("test.fna.bgz")));
        assert!(is_fasta_file(Path::new("/path/to/Reference.FA")));

        assert!(!is_fasta_file(Path::new("test.bam")));
        assert!(!is_fasta_file(Path::new("test.idx")));
    }

    #[test]
    fn test_read_records() {
        let mut temp = NamedTempFile::with_suffix(".fa").unwrap();
        temp.write_all(b">chr1 description here\nACGTACGT\nACGT\n>chr2\nGGGG\n")
            .unwrap();
        temp.flush().unwrap();

        let records = collect(temp.path());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "chr1");
        assert_eq!(records[0].comment, "description here");
        assert_eq!(records[0].sequence, b"ACGTACGTACGT");
        assert_eq!(records[1].name, "chr2");
        assert_eq!(records[1].comment, "");
        assert_eq!(records[1].len(), 4);
    }

    #[test]
    fn test_read_gzipped() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b">seq\nGATTACA\n").unwrap();
        let compressed = encoder.finish().unwrap();

        let mut temp = NamedTempFile::with_suffix(".fa.gz").unwrap();
        temp.write_all(&compressed).unwrap();
        temp.flush().unwrap();

        let records = collect(temp.path());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sequence, b"GATTACA");
    }

    #[test]
    fn test_empty_file_has_no_records() {
        let temp = NamedTempFile::with_suffix(".fa").unwrap();
        assert!(collect(temp.path()).is_empty());
    }

    #[test]
    fn test_callback_error_stops_iteration() {
        let mut temp = NamedTempFile::with_suffix(".fa").unwrap();
        temp.write_all(b">a\nAC\n>b\nGT\n").unwrap();
        temp.flush().unwrap();

        let mut seen = 0;
        let result = for_each_record(temp.path(), |_| {
            seen += 1;
            Err(IndexError::Configuration("stop".to_string()))
        });
        assert!(matches!(result, Err(IndexError::Configuration(_))));
        assert_eq!(seen, 1);
    }

    #[test]
    fn test_malformed_fasta() {
        let mut temp = NamedTempFile::with_suffix(".fa").unwrap();
        temp.write_all(b"not a fasta file\n").unwrap();
        temp.flush().unwrap();

        let result = for_each_record(temp.path(), |_| Ok(()));
        assert!(matches!(result, Err(IndexError::Sequence(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = for_each_record(Path::new("/nonexistent/x.fa"), |_| Ok(()));
        assert!(matches!(result, Err(IndexError::Transport(_))));
    }
}
