//! Two-stage producer/consumer pipeline over a bounded byte channel.
//!
//! The producer runs on its own thread and the consumer on the calling thread.
//! A full channel blocks the producer and an empty one blocks the consumer.
//! When either side fails it drops its end of the channel, which wakes the
//! other side, and the first root-cause error is the one reported.

use std::io::{self, Read, Write};
use std::thread;

use crossbeam_channel::{bounded, Receiver, Sender};
use flate2::{Compress, Compression, Decompress, FlushCompress, FlushDecompress, Status};
use tracing::{debug, trace, warn};

use super::{CHANNEL_CAPACITY, CHUNK_SIZE};
use crate::index::error::IndexError;

pub type Chunk = Vec<u8>;

/// Run `producer` on a new thread and `consumer` on this one, connected by a
/// bounded channel.
///
/// # Errors
///
/// Returns `IndexError::ResourceAcquisition` if the producer thread cannot be
/// spawned, otherwise the producer's error if it failed for a reason other than
/// the consumer hanging up, otherwise the consumer's error.
pub fn run<T, P, C>(label: &str, producer: P, consumer: C) -> Result<T, IndexError>
where
    P: FnOnce(Sender<Chunk>) -> Result<(), IndexError> + Send,
    C: FnOnce(Receiver<Chunk>) -> Result<T, IndexError>,
{
    let (tx, rx) = bounded::<Chunk>(CHANNEL_CAPACITY);

    thread::scope(|scope| {
        let handle = thread::Builder::new()
            .name(format!("{label}-producer"))
            .spawn_scoped(scope, move || producer(tx))
            .map_err(|e| IndexError::ResourceAcquisition(format!("{label} stage: {e}")))?;

        let consumed = consumer(rx);
        let produced = match handle.join() {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        };

        debug!(
            stage = label,
            producer_ok = produced.is_ok(),
            consumer_ok = consumed.is_ok(),
            "Pipeline finished"
        );
        resolve(produced, consumed)
    })
}

fn resolve<T>(
    produced: Result<(), IndexError>,
    consumed: Result<T, IndexError>,
) -> Result<T, IndexError> {
    match (produced, consumed) {
        (Ok(()), consumed) => consumed,
        (Err(IndexError::StageClosed), Err(e)) => Err(e),
        (Err(e), _) => Err(e),
    }
}

/// `Write` adapter that batches bytes into chunks and sends them down the channel
pub struct ChunkWriter {
    tx: Sender<Chunk>,
    buf: Vec<u8>,
}

impl ChunkWriter {
    #[must_use]
    pub fn new(tx: Sender<Chunk>) -> Self {
        Self {
            tx,
            buf: Vec::with_capacity(CHUNK_SIZE),
        }
    }

    fn send_buffered(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let chunk = std::mem::replace(&mut self.buf, Vec::with_capacity(CHUNK_SIZE));
        self.tx
            .send(chunk)
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "pipeline consumer closed"))
    }

    /// Send any buffered bytes and close this end of the channel
    ///
    /// # Errors
    ///
    /// Returns `IndexError::StageClosed` if the consumer has gone away.
    pub fn finish(mut self) -> Result<(), IndexError> {
        self.send_buffered().map_err(|_| IndexError::StageClosed)
    }
}

impl Write for ChunkWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let room = CHUNK_SIZE - self.buf.len();
        let take = room.min(data.len());
        self.buf.extend_from_slice(&data[..take]);
        if self.buf.len() == CHUNK_SIZE {
            self.send_buffered()?;
        }
        Ok(take)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.send_buffered()
    }
}

/// `Read` adapter over the receiving end; end of stream is the sender closing
pub struct ChunkReader {
    rx: Receiver<Chunk>,
    current: Chunk,
    pos: usize,
}

impl ChunkReader {
    #[must_use]
    pub fn new(rx: Receiver<Chunk>) -> Self {
        Self {
            rx,
            current: Vec::new(),
            pos: 0,
        }
    }
}

impl Read for ChunkReader {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if out.is_empty() {
            return Ok(0);
        }
        while self.pos == self.current.len() {
            match self.rx.recv() {
                Ok(chunk) => {
                    self.current = chunk;
                    self.pos = 0;
                }
                Err(_) => return Ok(0),
            }
        }
        let n = out.len().min(self.current.len() - self.pos);
        out[..n].copy_from_slice(&self.current[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

/// Compress every chunk received into `sink` as one zlib stream.
///
/// Returns the number of compressed bytes written.
///
/// # Errors
///
/// Returns `IndexError::Transport` if writing fails, or
/// `IndexError::Compression` if the compressor reports an error.
pub fn deflate_stage<W: Write>(
    rx: &Receiver<Chunk>,
    sink: &mut W,
    level: Compression,
) -> Result<u64, IndexError> {
    let mut compress = Compress::new(level, true);
    let mut out = vec![0u8; CHUNK_SIZE];

    for chunk in rx {
        deflate_chunk(&mut compress, &chunk, false, &mut out, sink)?;
    }
    deflate_chunk(&mut compress, &[], true, &mut out, sink)?;
    sink.flush()?;

    debug!(
        raw = compress.total_in(),
        compressed = compress.total_out(),
        "Compressed payload"
    );
    Ok(compress.total_out())
}

fn deflate_chunk<W: Write>(
    compress: &mut Compress,
    mut input: &[u8],
    finish: bool,
    out: &mut [u8],
    sink: &mut W,
) -> Result<(), IndexError> {
    let flush = if finish {
        FlushCompress::Finish
    } else {
        FlushCompress::None
    };

    loop {
        let before_in = compress.total_in();
        let before_out = compress.total_out();
        let status = compress
            .compress(input, out, flush)
            .map_err(|e| IndexError::Compression(format!("deflate failed: {e}")))?;
        let consumed = usize::try_from(compress.total_in() - before_in).unwrap_or(input.len());
        let produced = usize::try_from(compress.total_out() - before_out).unwrap_or(out.len());

        input = &input[consumed..];
        sink.write_all(&out[..produced])?;

        if matches!(status, Status::StreamEnd) {
            return Ok(());
        }
        if !finish && input.is_empty() && produced < out.len() {
            return Ok(());
        }
        if consumed == 0 && produced == 0 {
            return Err(IndexError::Compression(
                "deflate made no progress".to_string(),
            ));
        }
    }
}

/// Decompress a zlib stream from `source`, sending the raw bytes down the channel.
///
/// # Errors
///
/// Returns `IndexError::Transport` if reading fails, `IndexError::Compression`
/// if the data is invalid or ends before the stream does, or
/// `IndexError::StageClosed` if the consumer hangs up.
pub fn inflate_stage<R: Read>(mut source: R, tx: &Sender<Chunk>) -> Result<(), IndexError> {
    let mut decompress = Decompress::new(true);
    let mut input = vec![0u8; CHUNK_SIZE];

    loop {
        let n = read_some(&mut source, &mut input)?;
        if n == 0 {
            return Err(IndexError::Compression(
                "compressed payload is truncated".to_string(),
            ));
        }

        let mut pending = &input[..n];
        loop {
            let mut out = vec![0u8; CHUNK_SIZE];
            let before_in = decompress.total_in();
            let before_out = decompress.total_out();
            let status = decompress
                .decompress(pending, &mut out, FlushDecompress::None)
                .map_err(|e| IndexError::Compression(format!("invalid deflate data: {e}")))?;
            let consumed =
                usize::try_from(decompress.total_in() - before_in).unwrap_or(pending.len());
            let produced = usize::try_from(decompress.total_out() - before_out).unwrap_or(0);
            pending = &pending[consumed..];

            if produced > 0 {
                out.truncate(produced);
                tx.send(out).map_err(|_| IndexError::StageClosed)?;
            }

            if matches!(status, Status::StreamEnd) {
                if !pending.is_empty() {
                    warn!(bytes = pending.len(), "Ignoring data after compressed payload");
                }
                trace!(
                    compressed = decompress.total_in(),
                    raw = decompress.total_out(),
                    "Decompressed payload"
                );
                return Ok(());
            }
            if pending.is_empty() && produced < CHUNK_SIZE {
                break;
            }
            if consumed == 0 && produced == 0 && !pending.is_empty() {
                return Err(IndexError::Compression(
                    "inflate made no progress".to_string(),
                ));
            }
        }
    }
}

/// Read into `buf`, retrying on interruption
fn read_some<R: Read>(source: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match source.read(buf) {
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            result => return result,
        }
    }
}
