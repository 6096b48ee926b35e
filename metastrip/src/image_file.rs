use crate::byte_source::{ByteSource, TrailingData};
use crate::error::{MetastripError, Result};
use crate::jpg_file::{JpgFile, SOI_BYTES};
use crate::png_file::{PngFile, PNG_SIGNATURE};
use std::{
    fmt,
    fs::File,
    io::{Read, Seek},
    path::{Path, PathBuf},
};

/// The container formats metastrip understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    /// Guesses the format from the first bytes of a file.
    pub fn detect(head: &[u8]) -> Option<Self> {
        if head.starts_with(&PNG_SIGNATURE) {
            Some(ImageFormat::Png)
        } else if head.starts_with(&SOI_BYTES) {
            Some(ImageFormat::Jpeg)
        } else {
            None
        }
    }

    /// The usual file extension.
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
        }
    }
}

/// A parsed image of either supported format.
pub enum ImageFile<R: Read + Seek = File> {
    Png(PngFile<R>),
    Jpeg(JpgFile<R>),
}

impl ImageFile<File> {
    /// Opens the file at `path` and parses it with the parser matching its leading bytes.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        Self::parse(path.to_path_buf(), ByteSource::open(path)?)
    }
}

impl<R: Read + Seek> ImageFile<R> {
    /// Parses an image from any seekable reader positioned at its start.
    pub fn from_reader<P: Into<PathBuf>>(reader: R, name: P) -> Result<Self> {
        Self::parse(name.into(), ByteSource::from_reader(reader))
    }

    fn parse(file_path: PathBuf, mut source: ByteSource<R>) -> Result<Self> {
        let head = source.peek(PNG_SIGNATURE.len())?;
        match ImageFormat::detect(&head) {
            Some(ImageFormat::Png) => Ok(ImageFile::Png(PngFile::parse(file_path, source)?)),
            Some(ImageFormat::Jpeg) => Ok(ImageFile::Jpeg(JpgFile::parse(file_path, source)?)),
            None => Err(MetastripError::UnsupportedFormat),
        }
    }

    pub fn format(&self) -> ImageFormat {
        match self {
            ImageFile::Png(_) => ImageFormat::Png,
            ImageFile::Jpeg(_) => ImageFormat::Jpeg,
        }
    }

    pub fn file_path(&self) -> &Path {
        match self {
            ImageFile::Png(png) => png.file_path(),
            ImageFile::Jpeg(jpg) => jpg.file_path(),
        }
    }

    /// Number of chunks or segments.
    pub fn len(&self) -> usize {
        match self {
            ImageFile::Png(png) => png.descriptors().len(),
            ImageFile::Jpeg(jpg) => jpg.descriptors().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn trailing_data(&self) -> Option<TrailingData> {
        match self {
            ImageFile::Png(png) => png.trailing_data(),
            ImageFile::Jpeg(jpg) => jpg.trailing_data(),
        }
    }

    /// Turns trailing data into an error.
    pub fn into_strict(self) -> Result<Self> {
        Ok(match self {
            ImageFile::Png(png) => ImageFile::Png(png.into_strict()?),
            ImageFile::Jpeg(jpg) => ImageFile::Jpeg(jpg.into_strict()?),
        })
    }

    pub fn close(&mut self) -> Result<()> {
        match self {
            ImageFile::Png(png) => png.close(),
            ImageFile::Jpeg(jpg) => jpg.close(),
        }
    }
}

impl<R: Read + Seek> fmt::Display for ImageFile<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageFile::Png(png) => fmt::Display::fmt(png, f),
            ImageFile::Jpeg(jpg) => fmt::Display::fmt(jpg, f),
        }
    }
}
