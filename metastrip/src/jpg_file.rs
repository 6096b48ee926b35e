use crate::byte_source::{ByteSource, TrailingData};
use crate::error::{MetastripError, Result};
use crate::jpg_marker::Marker;
use crate::jpg_segment::{JpgSegment, JpgSegmentRef};
use std::{
    cell::RefCell,
    fmt,
    fs::File,
    io::{Read, Seek},
    ops::Range,
    path::{Path, PathBuf},
};
use tracing::{trace, warn};

/// The two bytes every JPEG file starts with.
pub const SOI_BYTES: [u8; 2] = [0xFF, 0xD8];

/// Byte that introduces every marker.
const MARKER_PREFIX: u8 = 0xFF;

/// A parsed JPEG file: its segment directory plus the open source the segments are copied from.
///
/// Parsing walks the top-level segments from SOI to EOI without decoding anything. The
/// entropy-coded data after each SOS header is located by scanning for the next marker that is
/// not a stuffed `0xFF 0x00`, a restart marker or DNL.
pub struct JpgFile<R: Read + Seek = File> {
    /// Path the file was opened from.
    file_path: PathBuf,
    /// The source shared by every segment view.
    source: RefCell<ByteSource<R>>,
    /// Segments in file order, from SOI to EOI.
    segments: Vec<JpgSegment>,
    /// Bytes found after EOI, if any.
    trailing: Option<TrailingData>,
}

impl JpgFile<File> {
    /// Opens and parses the JPEG file at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let source = ByteSource::open(path)?;
        Self::parse(path.to_path_buf(), source)
    }
}

impl<R: Read + Seek> JpgFile<R> {
    /// Parses a JPEG from any seekable reader positioned at its start.
    pub fn from_reader<P: Into<PathBuf>>(reader: R, name: P) -> Result<Self> {
        Self::parse(name.into(), ByteSource::from_reader(reader))
    }

    pub(crate) fn parse(file_path: PathBuf, mut source: ByteSource<R>) -> Result<Self> {
        let head = source.peek(2)?;
        if head != SOI_BYTES {
            return Err(MetastripError::BadHeader(format!(
                "expected SOI, found {}",
                describe_head(&head)
            )));
        }

        let mut segments = Vec::new();
        loop {
            let segment = Self::read_segment(&mut source)?;
            let marker = segment.marker;
            segments.push(segment);
            if marker == Marker::EOI {
                break;
            }
        }

        let trailing = source.finish()?;
        if let Some(trailing) = &trailing {
            warn!(
                path = %file_path.display(),
                position = trailing.position,
                end = trailing.end,
                "data left after the EOI marker"
            );
        }

        Ok(JpgFile {
            file_path,
            source: RefCell::new(source),
            segments,
            trailing,
        })
    }

    /// Reads one segment header and skips its payload. SOS segments also get their scan located.
    fn read_segment(source: &mut ByteSource<R>) -> Result<JpgSegment> {
        let offset = source.position();
        let prefix = source.read_u8()?;
        if prefix != MARKER_PREFIX {
            return Err(MetastripError::Framing {
                offset,
                reason: format!("segment starts with {prefix:#04x} instead of 0xff"),
            });
        }
        let marker = Marker(source.read_u8()?);

        let mut segment = JpgSegment {
            marker,
            len: 0,
            offset,
            scan: None,
        };
        if !marker.is_standalone() {
            let len = source.read_u16()?;
            if len < 2 {
                return Err(MetastripError::Framing {
                    offset,
                    reason: format!("{marker} segment has length {len}"),
                });
            }
            source.skip(len as u64 - 2)?;
            segment.len = len;

            if marker == Marker::SOS {
                segment.scan = Some(Self::read_scan(source)?);
            }
        }

        trace!(%segment, "jpeg segment");
        Ok(segment)
    }

    /// Finds the end of the entropy-coded data that starts at the current position.
    ///
    /// Leaves the source on the `0xFF` of the marker that ended the scan.
    fn read_scan(source: &mut ByteSource<R>) -> Result<Range<u64>> {
        let start = source.position();
        loop {
            if source.read_u8()? != MARKER_PREFIX {
                continue;
            }
            let next = Marker(source.read_u8()?);
            if next.0 == 0x00 || next == Marker::DNL || next.is_rst() {
                continue;
            }
            source.seek_rel(-2)?;
            break;
        }
        Ok(start..source.position())
    }

    /// Returns the path the file was opened from.
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Returns the parsed segment descriptors in file order.
    pub fn descriptors(&self) -> &[JpgSegment] {
        &self.segments
    }

    /// Iterates the segments as views that can copy themselves out of the source.
    pub fn segments(&self) -> impl ExactSizeIterator<Item = JpgSegmentRef<'_, R>> {
        self.segments
            .iter()
            .map(|segment| JpgSegmentRef::new(segment, &self.source))
    }

    /// Reports bytes found after the EOI marker.
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

    /// Whether [`JpgFile::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.source.borrow().is_closed()
    }

    /// Releases the source. Segment copies made afterwards fail with
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

fn describe_head(head: &[u8]) -> String {
    match head {
        [MARKER_PREFIX, marker] => Marker(*marker).to_string(),
        [] => "empty file".to_string(),
        bytes => format!("0x{}", hex::encode(bytes)),
    }
}

impl<R: Read + Seek> fmt::Display for JpgFile<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.file_path.display())?;
        for segment in &self.segments {
            writeln!(f, "{segment}")?;
        }
        Ok(())
    }
}
