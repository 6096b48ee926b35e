use std::path::PathBuf;
use thiserror::Error;

/// Represents all possible errors that can occur while parsing or stripping an image.
///
/// Every variant except [`MetastripError::TrailingData`] aborts parsing. Trailing data is
/// reported on the parsed record instead, see [`crate::png_file::PngFile::trailing_data`].
#[derive(Debug, Error)]
pub enum MetastripError {
    /// The source path does not exist.
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// The source path exists but can not be read.
    #[error("permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),
    /// The first 8 bytes are not the PNG signature.
    #[error("file does not contain a PNG signature")]
    BadSignature,
    /// The first chunk is not a 13 byte IHDR, or the first marker is not SOI.
    #[error("incorrect header: {0}")]
    BadHeader(String),
    /// A JPEG segment does not start with 0xFF or carries an impossible length.
    #[error("framing error at offset {offset}: {reason}")]
    Framing { offset: u64, reason: String },
    /// The source ended in the middle of a structure.
    #[error("unexpected end of data at offset {offset}")]
    ShortRead { offset: u64 },
    /// Bytes remain after the terminal chunk or segment.
    #[error("data left after the last segment, offset {position}/{end}")]
    TrailingData { position: u64, end: u64 },
    /// The copy primitive could not move the requested byte count.
    #[error("truncated copy: {copied} of {expected} bytes")]
    TruncatedCopy { expected: u64, copied: u64 },
    /// The source was closed before the operation.
    #[error("source is closed")]
    SourceClosed,
    /// `close` was called on an already closed record.
    #[error("source is already closed")]
    AlreadyClosed,
    /// The data is neither PNG nor JPEG.
    #[error("unsupported file format")]
    UnsupportedFormat,
    /// A retention policy could not be loaded.
    #[error("invalid policy: {0}")]
    InvalidPolicy(String),
    /// Any other I/O error.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl MetastripError {
    /// Returns `true` for errors that leave a usable record behind.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, MetastripError::TrailingData { .. })
    }
}

pub type Result<T> = std::result::Result<T, MetastripError>;
