use crate::byte_source::ByteSource;
use crate::error::{MetastripError, Result};
use std::cell::RefCell;
use std::fmt;
use std::fs::File;
use std::io::{Read, Seek, Write};
use std::ops::Deref;
use std::str::FromStr;

/// The 4 byte type tag of a PNG chunk, kept exactly as it appears in the file.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChunkKind(pub [u8; 4]);

impl ChunkKind {
    pub const IHDR: Self = Self(*b"IHDR");
    pub const PLTE: Self = Self(*b"PLTE");
    pub const IDAT: Self = Self(*b"IDAT");
    pub const IEND: Self = Self(*b"IEND");
    pub const TRNS: Self = Self(*b"tRNS");
    pub const PHYS: Self = Self(*b"pHYs");

    /// Critical chunks have an uppercase first letter (bit 5 of the first byte clear).
    pub fn is_critical(self) -> bool {
        self.0[0] & 0x20 == 0
    }

    /// Returns the tag as text when every byte is an ASCII letter.
    pub fn as_str(&self) -> Option<&str> {
        if self.0.iter().all(u8::is_ascii_alphabetic) {
            std::str::from_utf8(&self.0).ok()
        } else {
            None
        }
    }
}

impl fmt::Display for ChunkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_str() {
            Some(name) => f.write_str(name),
            None => write!(f, "0x{}", hex::encode(self.0)),
        }
    }
}

impl fmt::Debug for ChunkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_string())
    }
}

impl FromStr for ChunkKind {
    type Err = MetastripError;

    /// Parses a 4 letter tag such as `tEXt`, or the `0x` hex form used by `Display`.
    fn from_str(s: &str) -> Result<Self> {
        if let Some(digits) = s.strip_prefix("0x") {
            let mut tag = [0u8; 4];
            hex::decode_to_slice(digits, &mut tag)
                .map_err(|err| MetastripError::InvalidPolicy(format!("chunk type {s:?}: {err}")))?;
            return Ok(Self(tag));
        }
        let tag: [u8; 4] = s
            .as_bytes()
            .try_into()
            .map_err(|_| MetastripError::InvalidPolicy(format!("chunk type {s:?} is not 4 bytes")))?;
        let kind = Self(tag);
        kind.as_str().map(|_| kind).ok_or_else(|| {
            MetastripError::InvalidPolicy(format!("chunk type {s:?} is not ASCII letters"))
        })
    }
}

/// Describes one chunk of a PNG file.
///
/// On disk a chunk is `length(4) | type(4) | data(len) | crc(4)`, so it occupies `12 + len`
/// bytes starting at `data_offset - 8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PngChunk {
    /// The chunk type tag.
    pub kind: ChunkKind,
    /// Length of the chunk data, excluding the length field, tag and CRC.
    pub len: u32,
    /// Absolute offset of the chunk data, right after the type tag.
    pub data_offset: u64,
}

impl PngChunk {
    /// Absolute offset of the length field that starts the chunk.
    pub fn start(&self) -> u64 {
        self.data_offset - 8
    }

    /// The number of bytes the chunk occupies, CRC included.
    pub fn footprint(&self) -> u64 {
        self.len as u64 + 12
    }

    pub(crate) fn write_to<R, W>(&self, source: &mut ByteSource<R>, sink: &mut W) -> Result<u64>
    where
        R: Read + Seek,
        W: Write + ?Sized,
    {
        source.seek_abs(self.start())?;
        source.copy_to(sink, self.footprint())
    }
}

impl fmt::Display for PngChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: len: {}, offset: {}", self.kind, self.len, self.data_offset)
    }
}

/// A chunk borrowed from its [`crate::png_file::PngFile`], able to copy itself out.
pub struct PngChunkRef<'a, R: Read + Seek = File> {
    chunk: &'a PngChunk,
    source: &'a RefCell<ByteSource<R>>,
}

impl<'a, R: Read + Seek> PngChunkRef<'a, R> {
    pub(crate) fn new(chunk: &'a PngChunk, source: &'a RefCell<ByteSource<R>>) -> Self {
        Self { chunk, source }
    }

    /// The plain descriptor.
    pub fn chunk(&self) -> &'a PngChunk {
        self.chunk
    }

    /// Writes the chunk to `sink` exactly as stored, length field and CRC included.
    pub fn write_to<W: Write + ?Sized>(&self, sink: &mut W) -> Result<u64> {
        self.chunk.write_to(&mut self.source.borrow_mut(), sink)
    }
}

impl<R: Read + Seek> Deref for PngChunkRef<'_, R> {
    type Target = PngChunk;

    fn deref(&self) -> &PngChunk {
        self.chunk
    }
}
