use crate::byte_source::ByteSource;
use crate::error::Result;
use crate::jpg_marker::Marker;
use std::{
    cell::RefCell,
    fmt,
    fs::File,
    io::{Read, Seek, Write},
    ops::{Deref, Range},
};

/// Describes one top-level segment of a JPEG file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JpgSegment {
    /// The marker identifying the segment.
    pub marker: Marker,
    /// The value of the length field, which counts itself but not the marker.
    /// Zero for standalone markers.
    pub len: u16,
    /// Absolute offset of the `0xFF` that starts the segment.
    pub offset: u64,
    /// The entropy-coded data following an SOS header, as absolute offsets.
    pub scan: Option<Range<u64>>,
}

impl JpgSegment {
    /// Bytes taken by the marker and, when present, the length-prefixed header.
    pub fn header_len(&self) -> u64 {
        if self.marker.is_standalone() {
            2
        } else {
            self.len as u64 + 2
        }
    }

    /// Length of the entropy-coded data after the header, zero if there is none.
    pub fn scan_len(&self) -> u64 {
        self.scan
            .as_ref()
            .map_or(0, |scan| scan.end - scan.start)
    }

    /// Total bytes emitted when the segment is copied.
    pub fn footprint(&self) -> u64 {
        self.header_len() + self.scan_len()
    }

    pub(crate) fn write_to<R, W>(&self, source: &mut ByteSource<R>, sink: &mut W) -> Result<u64>
    where
        R: Read + Seek,
        W: Write + ?Sized,
    {
        source.seek_abs(self.offset)?;
        let mut written = source.copy_to(sink, self.header_len())?;
        // The scan starts right where the header ends, so no seek is needed.
        if self.scan.is_some() {
            written += source.copy_to(sink, self.scan_len())?;
        }
        Ok(written)
    }
}

impl fmt::Display for JpgSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: len: {}, offset: {}", self.marker, self.len, self.offset)?;
        if let Some(scan) = &self.scan {
            write!(f, ", image: {}..{}", scan.start, scan.end)?;
        }
        Ok(())
    }
}

/// A segment borrowed from its [`crate::jpg_file::JpgFile`], able to copy itself out.
pub struct JpgSegmentRef<'a, R: Read + Seek = File> {
    segment: &'a JpgSegment,
    source: &'a RefCell<ByteSource<R>>,
}

impl<'a, R: Read + Seek> JpgSegmentRef<'a, R> {
    pub(crate) fn new(segment: &'a JpgSegment, source: &'a RefCell<ByteSource<R>>) -> Self {
        Self { segment, source }
    }

    /// The plain descriptor.
    pub fn segment(&self) -> &'a JpgSegment {
        self.segment
    }

    /// Writes the segment to `sink` exactly as stored. An SOS segment is followed by its
    /// entropy-coded data.
    pub fn write_to<W: Write + ?Sized>(&self, sink: &mut W) -> Result<u64> {
        self.segment.write_to(&mut self.source.borrow_mut(), sink)
    }
}

impl<R: Read + Seek> Deref for JpgSegmentRef<'_, R> {
    type Target = JpgSegment;

    fn deref(&self) -> &JpgSegment {
        self.segment
    }
}
