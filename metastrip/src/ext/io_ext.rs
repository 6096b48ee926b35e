use std::io;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;

pub trait ReadExt: Read + Seek {
    fn peek_bytes(&mut self, count: usize) -> io::Result<Vec<u8>>;
}

impl<T> ReadExt for T
where
    T: Read + Seek,
{
    /// Reads up to `count` bytes without advancing the reader.
    ///
    /// Returns fewer bytes when the stream ends first.
    fn peek_bytes(&mut self, count: usize) -> io::Result<Vec<u8>> {
        let pos = self.stream_position()?;
        let mut buf = Vec::with_capacity(count);
        self.by_ref().take(count as u64).read_to_end(&mut buf)?;
        self.seek(SeekFrom::Start(pos))?;
        Ok(buf)
    }
}

/// A trait that reads fixed size arrays from any `Read` type.
pub trait ArrayReadExt: Read {
    /// Reads exactly `N` bytes.
    fn read_bytes_array<const N: usize>(&mut self) -> io::Result<[u8; N]>;
}

impl<T> ArrayReadExt for T
where
    T: Read,
{
    fn read_bytes_array<const N: usize>(&mut self) -> io::Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }
}

/// Utility methods for working with seekable streams.
pub trait SeekExt: Seek {
    /// Skips over the given number of bytes from the current position.
    fn skip<P: Copy + 'static>(&mut self, size: P) -> io::Result<u64>
    where
        i64: TryFrom<P>;

    /// Returns the length of the stream, leaving the cursor at its end.
    fn seek_end(&mut self) -> io::Result<u64>;
}

impl<T> SeekExt for T
where
    T: Seek,
{
    fn skip<P: Copy + 'static>(&mut self, size: P) -> io::Result<u64>
    where
        i64: TryFrom<P>,
    {
        let size = i64::try_from(size).map_err(|_| io::Error::from(io::ErrorKind::InvalidInput))?;

        self.seek(SeekFrom::Current(size))
    }

    fn seek_end(&mut self) -> io::Result<u64> {
        self.seek(SeekFrom::End(0))
    }
}
