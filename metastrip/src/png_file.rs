use crate::byte_source::{ByteSource, TrailingData};
use crate::error::{MetastripError, Result};
use crate::png_chunk::{ChunkKind, PngChunk, PngChunkRef};
use std::{
    cell::RefCell,
    fmt,
    fs::File,
    io::{Read, Seek, Write},
    path::{Path, PathBuf},
};
use tracing::{trace, warn};

/// The 8 byte signature every PNG file starts with.
pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Length of the IHDR chunk data.
const IHDR_LEN: u32 = 13;

/// Writes the PNG signature to `sink`.
pub fn write_signature<W: Write + ?Sized>(sink: &mut W) -> Result<()> {
    sink.write_all(&PNG_SIGNATURE)?;
    Ok(())
}

/// A parsed PNG file: its chunk directory plus the open source the chunks are copied from.
///
/// ```no_run
/// use metastrip::png_file::{write_signature, PngFile};
/// use std::fs::File;
///
/// let png = PngFile::open("image.png").unwrap();
/// let mut output = File::create("image.stripped.png").unwrap();
/// write_signature(&mut output).unwrap();
/// for chunk in png.chunks() {
///     if chunk.kind.is_critical() {
///         chunk.write_to(&mut output).unwrap();
///     }
/// }
/// ```
pub struct PngFile<R: Read + Seek = File> {
    /// Path the file was opened from.
    file_path: PathBuf,
    /// The source shared by every chunk view.
    source: RefCell<ByteSource<R>>,
    /// Chunks in file order, ending with IEND.
    chunks: Vec<PngChunk>,
    /// Bytes found after IEND, if any.
    trailing: Option<TrailingData>,
}

impl PngFile<File> {
    /// Opens and parses the PNG file at `path`.
    ///
    /// Data after the IEND chunk does not fail the call; it is reported through
    /// [`PngFile::trailing_data`].
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let source = ByteSource::open(path)?;
        Self::parse(path.to_path_buf(), source)
    }
}

impl<R: Read + Seek> PngFile<R> {
    /// Parses a PNG from any seekable reader positioned at its start.
    pub fn from_reader<P: Into<PathBuf>>(reader: R, name: P) -> Result<Self> {
        Self::parse(name.into(), ByteSource::from_reader(reader))
    }

    pub(crate) fn parse(file_path: PathBuf, mut source: ByteSource<R>) -> Result<Self> {
        Self::check_signature(&mut source)?;

        let header = Self::read_chunk(&mut source)?;
        if header.kind != ChunkKind::IHDR || header.len != IHDR_LEN {
            return Err(MetastripError::BadHeader(format!(
                "expected a {IHDR_LEN} byte IHDR chunk, found {:?} with length {}",
                header.kind, header.len
            )));
        }

        let mut chunks = vec![header];
        loop {
            let chunk = Self::read_chunk(&mut source)?;
            chunks.push(chunk);
            if chunk.kind == ChunkKind::IEND {
                break;
            }
        }

        let trailing = source.finish()?;
        if let Some(trailing) = &trailing {
            warn!(
                path = %file_path.display(),
                position = trailing.position,
                end = trailing.end,
                "data left after the IEND chunk"
            );
        }

        Ok(PngFile {
            file_path,
            source: RefCell::new(source),
            chunks,
            trailing,
        })
    }

    fn check_signature(source: &mut ByteSource<R>) -> Result<()> {
        let signature = source.read_array::<8>()?;
        if signature != PNG_SIGNATURE {
            return Err(MetastripError::BadSignature);
        }
        Ok(())
    }

    /// Reads a chunk header and skips over its data and CRC.
    fn read_chunk(source: &mut ByteSource<R>) -> Result<PngChunk> {
        let len = source.read_u32()?;
        let kind = ChunkKind(source.read_array::<4>()?);
        let data_offset = source.position();
        // CRC is skipped, never checked
        source.skip(len as u64 + 4)?;

        let chunk = PngChunk {
            kind,
            len,
            data_offset,
        };
        trace!(%chunk, "png chunk");
        Ok(chunk)
    }

    /// Returns the path the file was opened from.
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Returns the parsed chunk descriptors in file order.
    pub fn descriptors(&self) -> &[PngChunk] {
        &self.chunks
    }

    /// Iterates the chunks as views that can copy themselves out of the source.
    pub fn chunks(&self) -> impl ExactSizeIterator<Item = PngChunkRef<'_, R>> {
        self.chunks
            .iter()
            .map(|chunk| PngChunkRef::new(chunk, &self.source))
    }

    /// Reports bytes found after the IEND chunk.
    pub fn trailing_data(&self) -> Option<TrailingData> {
        self.trailing
    }

    /// Turns trailing data into an error.
    pub fn into_strict(self) -> Result<Self> {
        match self.trailing {
            Some(trailing) => Err(trailing.into()),
            None => Ok(self),
        }
    }

    /// Whether [`PngFile::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.source.borrow().is_closed()
    }

    /// Releases the source. Chunk copies made afterwards fail with
    /// [`MetastripError::SourceClosed`].
    pub fn close(&mut self) -> Result<()> {
        let source = self.source.get_mut();
        if source.is_closed() {
            return Err(MetastripError::AlreadyClosed);
        }
        source.close();
        Ok(())
    }
}

impl<R: Read + Seek> fmt::Display for PngFile<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.file_path.display())?;
        for chunk in &self.chunks {
            writeln!(f, "{chunk}")?;
        }
        Ok(())
    }
}
