//! # Byte Stream Cursor
//!
//! This module provides the `ByteSource` trait that decouples the decoder
//! from the device supplying machine code, and `ByteStream`, the buffered
//! cursor the decoder pulls bytes through.
//!
//! ## Design
//!
//! The cursor owns a fixed internal buffer and refills it transparently:
//! callers only observe the logical byte sequence and an absolute stream
//! position. A refill may block until the source produces bytes; a refill
//! that yields zero bytes marks the end of the stream permanently. Reads
//! past the end return a `0x00` sentinel rather than an error — callers
//! check `at_end()` between instructions.

use std::io::{ErrorKind, Read};

use log::trace;

/// Size of the cursor's internal buffer in bytes.
pub const BUFFER_SIZE: usize = 1024;

/// A device supplying chunks of machine code to the cursor.
///
/// Implementations fill as much of `buf` as they can and return the number
/// of bytes written. Returning `0` signals end-of-stream. The call may
/// block until bytes are available; there is no error channel — a source
/// that fails is indistinguishable from one that ended.
pub trait ByteSource {
    /// Fills `buf` with the next chunk of input, returning the byte count.
    fn fill(&mut self, buf: &mut [u8]) -> usize;
}

/// Byte source over an in-memory slice. Used by the slice-level decode API
/// and throughout the tests.
impl ByteSource for &[u8] {
    fn fill(&mut self, buf: &mut [u8]) -> usize {
        let n = self.len().min(buf.len());
        let (head, tail) = self.split_at(n);
        buf[..n].copy_from_slice(head);
        *self = tail;
        n
    }
}

/// Adapts any `std::io::Read` into a `ByteSource`.
///
/// `Interrupted` reads are retried; any other read error is treated as
/// end-of-stream, matching the trait's no-error contract.
pub struct ReaderSource<R: Read> {
    reader: R,
}

impl<R: Read> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: Read> ByteSource for ReaderSource<R> {
    fn fill(&mut self, buf: &mut [u8]) -> usize {
        loop {
            match self.reader.read(buf) {
                Ok(n) => return n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(_) => return 0,
            }
        }
    }
}

/// Buffered cursor over a `ByteSource`.
///
/// The cursor exposes the current byte without consuming it, an explicit
/// `advance()` that consumes it, and the absolute position of the current
/// byte counted from the start of the stream.
///
/// # Examples
///
/// ```
/// use disasm8086::stream::ByteStream;
///
/// let bytes: &[u8] = &[0x8B, 0xD8];
/// let mut stream = ByteStream::new(bytes);
///
/// stream.advance();
/// assert_eq!(stream.current(), 0x8B);
/// assert_eq!(stream.position(), 0);
/// assert_eq!(stream.read_next(), 0xD8);
/// assert_eq!(stream.position(), 1);
///
/// stream.advance();
/// assert!(stream.at_end());
/// ```
pub struct ByteStream<S: ByteSource> {
    source: S,
    buffer: [u8; BUFFER_SIZE],
    /// Valid bytes currently in `buffer`.
    len: usize,
    /// Index of the current byte within `buffer`.
    index: usize,
    /// Count of advance() calls; position of the current byte is one less.
    consumed: u64,
    /// Set once a refill yields zero bytes; never cleared.
    eof: bool,
}

impl<S: ByteSource> ByteStream<S> {
    /// Creates a cursor over `source`. No bytes are read until the first
    /// `advance()`.
    pub fn new(source: S) -> Self {
        Self {
            source,
            buffer: [0; BUFFER_SIZE],
            len: 0,
            index: 0,
            consumed: 0,
            eof: false,
        }
    }

    /// Returns the byte at the current position without consuming it, or
    /// `0x00` once the stream is exhausted.
    pub fn current(&self) -> u8 {
        if self.index < self.len {
            self.buffer[self.index]
        } else {
            0
        }
    }

    /// Consumes the current byte, refilling the internal buffer from the
    /// source when it is exhausted. May block on the source.
    ///
    /// Chunk boundaries are invisible: only a refill that yields zero
    /// bytes ends the stream.
    pub fn advance(&mut self) {
        self.index += 1;
        if self.index >= self.len && !self.eof {
            self.len = self.source.fill(&mut self.buffer);
            self.index = 0;
            if self.len == 0 {
                self.eof = true;
            } else {
                trace!("refilled stream buffer with {} bytes", self.len);
            }
        }
        self.consumed += 1;
    }

    /// Consumes the current byte and returns the one after it. Used when a
    /// decoded field announces that further bytes follow.
    pub fn read_next(&mut self) -> u8 {
        self.advance();
        self.current()
    }

    /// Reports whether all available input has been consumed.
    pub fn at_end(&self) -> bool {
        self.index >= self.len
    }

    /// Absolute position of the current byte, counted from the start of
    /// the stream. Monotonic and independent of buffer refills.
    pub fn position(&self) -> u64 {
        self.consumed.saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Source that hands out its bytes one at a time, forcing a refill on
    /// every advance.
    struct TrickleSource {
        data: Vec<u8>,
        cursor: usize,
    }

    impl ByteSource for TrickleSource {
        fn fill(&mut self, buf: &mut [u8]) -> usize {
            if self.cursor == self.data.len() {
                return 0;
            }
            buf[0] = self.data[self.cursor];
            self.cursor += 1;
            1
        }
    }

    #[test]
    fn test_empty_stream_is_at_end() {
        let bytes: &[u8] = &[];
        let mut stream = ByteStream::new(bytes);
        stream.advance();
        assert!(stream.at_end());
        assert_eq!(stream.current(), 0);
    }

    #[test]
    fn test_sequential_reads_track_position() {
        let bytes: &[u8] = &[0x10, 0x20, 0x30];
        let mut stream = ByteStream::new(bytes);

        stream.advance();
        assert_eq!(stream.current(), 0x10);
        assert_eq!(stream.position(), 0);

        assert_eq!(stream.read_next(), 0x20);
        assert_eq!(stream.position(), 1);

        assert_eq!(stream.read_next(), 0x30);
        assert_eq!(stream.position(), 2);
        assert!(!stream.at_end());

        stream.advance();
        assert!(stream.at_end());
    }

    #[test]
    fn test_current_does_not_consume() {
        let bytes: &[u8] = &[0xAB];
        let mut stream = ByteStream::new(bytes);
        stream.advance();
        assert_eq!(stream.current(), 0xAB);
        assert_eq!(stream.current(), 0xAB);
        assert_eq!(stream.position(), 0);
    }

    #[test]
    fn test_chunk_boundaries_are_invisible() {
        let data: Vec<u8> = (0..20).collect();
        let mut stream = ByteStream::new(TrickleSource {
            data: data.clone(),
            cursor: 0,
        });

        let mut seen = Vec::new();
        stream.advance();
        while !stream.at_end() {
            seen.push(stream.current());
            stream.advance();
        }
        assert_eq!(seen, data);
    }

    #[test]
    fn test_end_of_stream_is_permanent() {
        let bytes: &[u8] = &[0x01];
        let mut stream = ByteStream::new(bytes);
        stream.advance();
        stream.advance();
        assert!(stream.at_end());
        stream.advance();
        assert!(stream.at_end());
        assert_eq!(stream.current(), 0);
    }

    #[test]
    fn test_reader_source_adapts_io_read() {
        let data = vec![0x74, 0x05];
        let mut stream = ByteStream::new(ReaderSource::new(data.as_slice()));
        stream.advance();
        assert_eq!(stream.current(), 0x74);
        assert_eq!(stream.read_next(), 0x05);
        stream.advance();
        assert!(stream.at_end());
    }
}
