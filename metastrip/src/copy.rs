use crate::error::{MetastripError, Result};
use std::io::{ErrorKind, Read, Write};

/// Size of the staging buffer used by [`copy_exact`].
pub const BLOCK_SIZE: usize = 1024;

/// Copies exactly `len` bytes from the current position of `source` into `sink`.
///
/// Data moves through a fixed 1 KiB buffer; the last block is shortened to fit. If the source
/// runs dry or the sink stops accepting bytes, the copy fails with
/// [`MetastripError::TruncatedCopy`] reporting how far it got. The caller positions the source.
pub fn copy_exact<R, W>(source: &mut R, sink: &mut W, len: u64) -> Result<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut buf = [0u8; BLOCK_SIZE];
    let mut copied = 0u64;

    while copied < len {
        let block = (len - copied).min(BLOCK_SIZE as u64) as usize;
        let truncated = |err: std::io::Error| match err.kind() {
            ErrorKind::UnexpectedEof | ErrorKind::WriteZero => MetastripError::TruncatedCopy {
                expected: len,
                copied,
            },
            _ => MetastripError::Io(err),
        };

        source.read_exact(&mut buf[..block]).map_err(truncated)?;
        sink.write_all(&buf[..block]).map_err(truncated)?;
        copied += block as u64;
    }

    Ok(copied)
}
