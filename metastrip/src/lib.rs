//! # metastrip
//!
//! `metastrip` removes metadata from PNG and JPEG files without touching the image data.
//! It walks the container structure of a file, records where every chunk or segment lives,
//! and copies the ones you want to keep into a new file byte for byte.
//!
//! ## Features
//! - PNG chunk directory (signature check, IHDR/IEND boundaries, CRCs copied verbatim)
//! - JPEG segment directory, including the location of entropy-coded scan data
//! - Named JPEG markers ([`jpg_marker::Marker`])
//! - A retention policy with sensible defaults, loadable from a text file
//! - No pixel decoding, no re-encoding
//!
//! ## Usage
//! Add to your `Cargo.toml`:
//! ```toml
//! [dependencies]
//! metastrip = "0.1"
//! ```
//!
//! ### Example: Stripping a file
//! ```no_run
//! use metastrip::image_file::ImageFile;
//! use metastrip::strip::strip;
//! use metastrip::strip_policy::StripPolicy;
//! use std::fs::File;
//!
//! let image = ImageFile::open("photo.jpg").unwrap();
//!
//! // List the segments
//! print!("{image}");
//!
//! // Write everything except comments and APPn metadata
//! let mut output = File::create("photo.stripped.jpg").unwrap();
//! let report = strip(&image, &StripPolicy::default(), &mut output).unwrap();
//! println!("dropped {:?}", report.dropped);
//! ```

pub mod byte_source;
pub mod copy;
pub mod error;
mod ext;
pub mod image_file;
pub mod jpg_file;
pub mod jpg_marker;
pub mod jpg_segment;
pub mod png_chunk;
pub mod png_file;
pub mod strip;
pub mod strip_policy;

pub use error::{MetastripError, Result};
