use crate::copy::copy_exact;
use crate::error::{MetastripError, Result};
use crate::ext::io_ext::{ArrayReadExt, ReadExt, SeekExt};
use byteorder::{BigEndian, ReadBytesExt};
use std::{
    fs::File,
    io::{self, BufReader, ErrorKind, Read, Seek, SeekFrom, Write},
    path::Path,
};

/// Bytes left over after the terminal segment of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrailingData {
    /// Where parsing stopped.
    pub position: u64,
    /// The length of the source.
    pub end: u64,
}

impl TrailingData {
    /// The number of unread bytes.
    pub fn len(&self) -> u64 {
        self.end - self.position
    }

    /// Always false for a report produced by parsing, which only exists when bytes remain.
    pub fn is_empty(&self) -> bool {
        self.end <= self.position
    }
}

impl From<TrailingData> for MetastripError {
    fn from(trailing: TrailingData) -> Self {
        MetastripError::TrailingData {
            position: trailing.position,
            end: trailing.end,
        }
    }
}

/// A buffered, seekable byte stream that tracks its own position.
///
/// Reads that run out of data fail with [`MetastripError::ShortRead`], and every operation
/// after [`ByteSource::close`] fails with [`MetastripError::SourceClosed`].
pub struct ByteSource<R: Read + Seek = File> {
    /// The underlying reader, `None` once closed.
    reader: Option<BufReader<R>>,
    /// Absolute offset of the next byte to read.
    position: u64,
}

impl ByteSource<File> {
    /// Opens the file at `path` for reading.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => MetastripError::NotFound(path.to_path_buf()),
            ErrorKind::PermissionDenied => MetastripError::PermissionDenied(path.to_path_buf()),
            _ => MetastripError::Io(err),
        })?;
        Ok(Self::from_reader(file))
    }
}

impl<R: Read + Seek> ByteSource<R> {
    /// Wraps an already open reader. The reader is assumed to be at offset 0.
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader: Some(BufReader::new(reader)),
            position: 0,
        }
    }

    fn reader(&mut self) -> Result<&mut BufReader<R>> {
        self.reader.as_mut().ok_or(MetastripError::SourceClosed)
    }

    /// Maps an end-of-file condition onto a short read at `offset`.
    fn short_read(offset: u64) -> impl FnOnce(io::Error) -> MetastripError {
        move |err| match err.kind() {
            ErrorKind::UnexpectedEof => MetastripError::ShortRead { offset },
            _ => MetastripError::Io(err),
        }
    }

    /// Returns the absolute offset of the next byte to be read.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Whether [`ByteSource::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.reader.is_none()
    }

    /// Seeks to an absolute offset.
    pub fn seek_abs(&mut self, offset: u64) -> Result<u64> {
        self.position = self.reader()?.seek(SeekFrom::Start(offset))?;
        Ok(self.position)
    }

    /// Seeks relative to the current position, keeping the read buffer when possible.
    pub fn seek_rel(&mut self, delta: i64) -> Result<u64> {
        let target = self.position.checked_add_signed(delta).ok_or_else(|| {
            io::Error::new(ErrorKind::InvalidInput, "seek before the start of the source")
        })?;
        self.reader()?.seek_relative(delta)?;
        self.position = target;
        Ok(self.position)
    }

    /// Moves forward by `count` bytes. Skipping past the end is allowed; the next read fails.
    pub fn skip(&mut self, count: u64) -> Result<u64> {
        self.position = self.reader()?.skip(count)?;
        Ok(self.position)
    }

    /// Seeks to the end of the source and returns its length.
    pub fn seek_end(&mut self) -> Result<u64> {
        self.position = self.reader()?.seek_end()?;
        Ok(self.position)
    }

    /// Reads exactly `count` bytes.
    pub fn read_exact(&mut self, count: usize) -> Result<Vec<u8>> {
        let offset = self.position;
        let mut buf = vec![0u8; count];
        self.reader()?
            .read_exact(&mut buf)
            .map_err(Self::short_read(offset))?;
        self.position += count as u64;
        Ok(buf)
    }

    /// Reads exactly `N` bytes into an array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let offset = self.position;
        let buf = self
            .reader()?
            .read_bytes_array::<N>()
            .map_err(Self::short_read(offset))?;
        self.position += N as u64;
        Ok(buf)
    }

    /// Reads a single byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        let offset = self.position;
        let value = self.reader()?.read_u8().map_err(Self::short_read(offset))?;
        self.position += 1;
        Ok(value)
    }

    /// Reads a big-endian `u16`.
    pub fn read_u16(&mut self) -> Result<u16> {
        let offset = self.position;
        let value = self
            .reader()?
            .read_u16::<BigEndian>()
            .map_err(Self::short_read(offset))?;
        self.position += 2;
        Ok(value)
    }

    /// Reads a big-endian `u32`.
    pub fn read_u32(&mut self) -> Result<u32> {
        let offset = self.position;
        let value = self
            .reader()?
            .read_u32::<BigEndian>()
            .map_err(Self::short_read(offset))?;
        self.position += 4;
        Ok(value)
    }

    /// Returns up to `count` bytes from the current position without consuming them.
    pub fn peek(&mut self, count: usize) -> Result<Vec<u8>> {
        Ok(self.reader()?.peek_bytes(count)?)
    }

    /// Copies `count` bytes from the current position into `sink`.
    ///
    /// On failure the position is resynchronised with wherever the reader stopped.
    pub fn copy_to<W: Write + ?Sized>(&mut self, sink: &mut W, count: u64) -> Result<u64> {
        let reader = self.reader.as_mut().ok_or(MetastripError::SourceClosed)?;
        match copy_exact(reader, sink, count) {
            Ok(copied) => {
                self.position += copied;
                Ok(copied)
            }
            Err(err) => {
                self.position = reader.stream_position()?;
                Err(err)
            }
        }
    }

    /// Compares the position parsing stopped at with the end of the source.
    ///
    /// A position past the end means the last segment claimed more bytes than exist.
    pub fn finish(&mut self) -> Result<Option<TrailingData>> {
        let position = self.position;
        let end = self.seek_end()?;
        if position > end {
            return Err(MetastripError::ShortRead { offset: end });
        }
        Ok((position < end).then_some(TrailingData { position, end }))
    }

    /// Releases the underlying reader. Closing twice is a no-op.
    pub fn close(&mut self) {
        self.reader = None;
    }
}
