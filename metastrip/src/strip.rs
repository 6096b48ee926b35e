use crate::error::Result;
use crate::image_file::ImageFile;
use crate::jpg_file::JpgFile;
use crate::png_file::{write_signature, PngFile, PNG_SIGNATURE};
use crate::strip_policy::StripPolicy;
use std::io::{Read, Seek, Write};
use tracing::debug;

/// What a strip wrote and left out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StripReport {
    /// Number of chunks or segments written.
    pub kept: usize,
    /// Names of the chunks or segments left out, in file order.
    pub dropped: Vec<String>,
    /// Bytes written to the sink, PNG signature included.
    pub bytes_written: u64,
}

/// Writes the parts of `image` that `policy` keeps to `sink`.
pub fn strip<R, W>(image: &ImageFile<R>, policy: &StripPolicy, sink: &mut W) -> Result<StripReport>
where
    R: Read + Seek,
    W: Write + ?Sized,
{
    match image {
        ImageFile::Png(png) => strip_png(png, policy, sink),
        ImageFile::Jpeg(jpg) => strip_jpg(jpg, policy, sink),
    }
}

/// Writes the PNG signature followed by every chunk the policy keeps.
pub fn strip_png<R, W>(png: &PngFile<R>, policy: &StripPolicy, sink: &mut W) -> Result<StripReport>
where
    R: Read + Seek,
    W: Write + ?Sized,
{
    let mut report = StripReport::default();
    write_signature(sink)?;
    report.bytes_written += PNG_SIGNATURE.len() as u64;

    for chunk in png.chunks() {
        if policy.keeps_chunk(chunk.kind) {
            report.bytes_written += chunk.write_to(sink)?;
            report.kept += 1;
        } else {
            debug!(kind = %chunk.kind, offset = chunk.start(), len = chunk.len, "dropping png chunk");
            report.dropped.push(chunk.kind.to_string());
        }
    }
    Ok(report)
}

/// Writes every JPEG segment the policy does not drop.
pub fn strip_jpg<R, W>(jpg: &JpgFile<R>, policy: &StripPolicy, sink: &mut W) -> Result<StripReport>
where
    R: Read + Seek,
    W: Write + ?Sized,
{
    let mut report = StripReport::default();

    for segment in jpg.segments() {
        if policy.keeps_marker(segment.marker) {
            report.bytes_written += segment.write_to(sink)?;
            report.kept += 1;
        } else {
            debug!(
                marker = %segment.marker,
                offset = segment.offset,
                len = segment.len,
                "dropping jpeg segment"
            );
            report.dropped.push(segment.marker.to_string());
        }
    }
    Ok(report)
}
