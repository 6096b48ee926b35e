use crate::error::{MetastripError, Result};
use crate::jpg_marker::Marker;
use crate::png_chunk::ChunkKind;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind, Read};
use std::path::Path;
use std::str::FromStr;

/// Decides which chunks and segments survive a strip.
///
/// PNG works as a whitelist: a chunk is kept when its type is listed, and critical chunks
/// (uppercase first letter, e.g. IHDR, PLTE, IDAT, IEND) are always kept. JPEG works as a
/// blacklist: a segment is kept unless its marker is listed. Markers the image data depends on
/// can never be listed. `png.keep = *` keeps every PNG chunk.
///
/// Policies can be loaded from a plain text file:
///
/// ```text
/// # keep transparency and physical size, drop everything else
/// png.keep = IHDR PLTE tRNS pHYs IDAT IEND
/// jpeg.drop = COM APP1 APP2 APP13
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StripPolicy {
    /// Set by `png.keep = *`.
    png_keep_all: bool,
    png_keep: BTreeSet<ChunkKind>,
    jpeg_drop: BTreeSet<Marker>,
}

/// A `name = value value ...` line from a policy file.
#[derive(Debug, Eq, PartialEq)]
struct Variable {
    name: String,
    values: Vec<String>,
}

impl Default for StripPolicy {
    /// Keeps only what is needed to render a PNG, and drops comments plus every APPn segment
    /// except APP0 (JFIF) and APP14 (Adobe color transform) from a JPEG.
    fn default() -> Self {
        let png_keep = [
            ChunkKind::IHDR,
            ChunkKind::PLTE,
            ChunkKind::TRNS,
            ChunkKind::PHYS,
            ChunkKind::IDAT,
            ChunkKind::IEND,
        ]
        .into_iter()
        .collect();
        let jpeg_drop = (Marker::APP1.0..=Marker::APP13.0)
            .map(Marker)
            .chain([Marker::APP15, Marker::COM])
            .collect();
        StripPolicy {
            png_keep_all: false,
            png_keep,
            jpeg_drop,
        }
    }
}

impl StripPolicy {
    /// A policy that keeps every chunk and segment.
    pub fn keep_all() -> Self {
        StripPolicy {
            png_keep_all: true,
            png_keep: BTreeSet::new(),
            jpeg_drop: BTreeSet::new(),
        }
    }

    /// Whether a PNG chunk of this type is written out.
    pub fn keeps_chunk(&self, kind: ChunkKind) -> bool {
        self.png_keep_all || kind.is_critical() || self.png_keep.contains(&kind)
    }

    /// Whether a JPEG segment with this marker is written out.
    pub fn keeps_marker(&self, marker: Marker) -> bool {
        !self.jpeg_drop.contains(&marker)
    }

    /// Adds a chunk type to the PNG whitelist.
    pub fn keep_chunk(&mut self, kind: ChunkKind) {
        self.png_keep.insert(kind);
    }

    /// Adds a marker to the JPEG blacklist.
    pub fn drop_marker(&mut self, marker: Marker) -> Result<()> {
        if is_structural(marker) {
            return Err(MetastripError::InvalidPolicy(format!(
                "{marker} segments are required to decode the image"
            )));
        }
        self.jpeg_drop.insert(marker);
        Ok(())
    }

    /// Loads a policy file. Keys missing from the file keep their default value.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => MetastripError::NotFound(path.to_path_buf()),
            ErrorKind::PermissionDenied => MetastripError::PermissionDenied(path.to_path_buf()),
            _ => MetastripError::Io(err),
        })?;
        Self::load(file)
    }

    /// Loads policy variables from a reader.
    pub fn load<R: Read>(reader: R) -> Result<Self> {
        let mut policy = StripPolicy::default();
        for variable in read_variables(reader)? {
            policy.apply(variable)?;
        }
        Ok(policy)
    }

    fn apply(&mut self, variable: Variable) -> Result<()> {
        match variable.name.as_str() {
            "png.keep" => {
                self.png_keep.clear();
                self.png_keep_all = variable.values.iter().any(|v| v == "*");
                for value in variable.values.iter().filter(|v| *v != "*") {
                    self.keep_chunk(ChunkKind::from_str(value)?);
                }
            }
            "jpeg.drop" => {
                self.jpeg_drop.clear();
                for value in &variable.values {
                    self.drop_marker(Marker::from_str(value)?)?;
                }
            }
            other => {
                return Err(MetastripError::InvalidPolicy(format!(
                    "unknown key {other:?}"
                )))
            }
        }
        Ok(())
    }
}

impl FromStr for StripPolicy {
    type Err = MetastripError;

    fn from_str(s: &str) -> Result<Self> {
        Self::load(s.as_bytes())
    }
}

/// Markers whose segments the decoder needs, or that only occur inside scans.
fn is_structural(marker: Marker) -> bool {
    marker.is_standalone()
        || marker.is_sof()
        || matches!(
            marker,
            Marker::SOS | Marker::DHT | Marker::DQT | Marker::DRI | Marker::DAC | Marker::DNL
        )
}

fn read_variables<R: Read>(reader: R) -> Result<Vec<Variable>> {
    let reader = BufReader::new(reader);
    let mut variables = Vec::new();

    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();

        // Ignore empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (name, value) = line.split_once('=').ok_or_else(|| {
            MetastripError::InvalidPolicy(format!("line {}: expected `key = values`", number + 1))
        })?;
        variables.push(Variable {
            name: name.trim().to_string(),
            values: value.split_whitespace().map(|v| v.to_string()).collect(),
        });
    }

    Ok(variables)
}
