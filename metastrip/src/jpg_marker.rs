use crate::error::MetastripError;
use std::fmt;
use std::str::FromStr;

/// A JPEG marker: the byte that follows `0xFF` at the start of a segment.
///
/// Named markers cover `0xC0..=0xFE`; any other byte is still a valid `Marker` and renders
/// as `Marker(<decimal>)`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Marker(pub u8);

impl Marker {
    pub const SOF0: Self = Self(0xC0);
    pub const SOF1: Self = Self(0xC1);
    pub const SOF2: Self = Self(0xC2);
    pub const SOF3: Self = Self(0xC3);
    pub const DHT: Self = Self(0xC4);
    pub const SOF5: Self = Self(0xC5);
    pub const SOF6: Self = Self(0xC6);
    pub const SOF7: Self = Self(0xC7);
    pub const JPG: Self = Self(0xC8);
    pub const SOF9: Self = Self(0xC9);
    pub const SOF10: Self = Self(0xCA);
    pub const SOF11: Self = Self(0xCB);
    pub const DAC: Self = Self(0xCC);
    pub const SOF13: Self = Self(0xCD);
    pub const SOF14: Self = Self(0xCE);
    pub const SOF15: Self = Self(0xCF);

    pub const RST0: Self = Self(0xD0);
    pub const RST1: Self = Self(0xD1);
    pub const RST2: Self = Self(0xD2);
    pub const RST3: Self = Self(0xD3);
    pub const RST4: Self = Self(0xD4);
    pub const RST5: Self = Self(0xD5);
    pub const RST6: Self = Self(0xD6);
    pub const RST7: Self = Self(0xD7);
    pub const SOI: Self = Self(0xD8);
    pub const EOI: Self = Self(0xD9);
    pub const SOS: Self = Self(0xDA);
    pub const DQT: Self = Self(0xDB);
    pub const DNL: Self = Self(0xDC);
    pub const DRI: Self = Self(0xDD);
    pub const DHP: Self = Self(0xDE);
    pub const EXP: Self = Self(0xDF);

    pub const APP0: Self = Self(0xE0);
    pub const APP1: Self = Self(0xE1);
    pub const APP2: Self = Self(0xE2);
    pub const APP3: Self = Self(0xE3);
    pub const APP4: Self = Self(0xE4);
    pub const APP5: Self = Self(0xE5);
    pub const APP6: Self = Self(0xE6);
    pub const APP7: Self = Self(0xE7);
    pub const APP8: Self = Self(0xE8);
    pub const APP9: Self = Self(0xE9);
    pub const APP10: Self = Self(0xEA);
    pub const APP11: Self = Self(0xEB);
    pub const APP12: Self = Self(0xEC);
    pub const APP13: Self = Self(0xED);
    pub const APP14: Self = Self(0xEE);
    pub const APP15: Self = Self(0xEF);

    pub const JPG0: Self = Self(0xF0);
    pub const JPG13: Self = Self(0xFD);
    pub const COM: Self = Self(0xFE);

    /// Returns the symbolic name, or `None` outside the catalog.
    pub const fn name(self) -> Option<&'static str> {
        match self.0.checked_sub(FIRST_NAMED) {
            Some(index) if (index as usize) < NAMES.len() => Some(NAMES[index as usize]),
            _ => None,
        }
    }

    /// Start Of Frame markers, excluding DHT, JPG and DAC which share the range.
    pub const fn is_sof(self) -> bool {
        matches!(self.0, 0xC0..=0xCF) && !matches!(self.0, 0xC4 | 0xC8 | 0xCC)
    }

    pub const fn is_rst(self) -> bool {
        matches!(self.0, 0xD0..=0xD7)
    }

    pub const fn is_app(self) -> bool {
        matches!(self.0, 0xE0..=0xEF)
    }

    /// Markers that carry no length field and no payload.
    pub const fn is_standalone(self) -> bool {
        matches!(self.0, 0xD8 | 0xD9) || self.is_rst()
    }
}

const FIRST_NAMED: u8 = 0xC0;

#[rustfmt::skip]
const NAMES: [&str; 63] = [
    "SOF0", "SOF1", "SOF2", "SOF3", "DHT", "SOF5", "SOF6", "SOF7",
    "JPG", "SOF9", "SOF10", "SOF11", "DAC", "SOF13", "SOF14", "SOF15",
    "RST0", "RST1", "RST2", "RST3", "RST4", "RST5", "RST6", "RST7",
    "SOI", "EOI", "SOS", "DQT", "DNL", "DRI", "DHP", "EXP",
    "APP0", "APP1", "APP2", "APP3", "APP4", "APP5", "APP6", "APP7",
    "APP8", "APP9", "APP10", "APP11", "APP12", "APP13", "APP14", "APP15",
    "JPG0", "JPG1", "JPG2", "JPG3", "JPG4", "JPG5", "JPG6", "JPG7",
    "JPG8", "JPG9", "JPG10", "JPG11", "JPG12", "JPG13", "COM",
];

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "Marker({})", self.0),
        }
    }
}

impl fmt::Debug for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl From<u8> for Marker {
    fn from(byte: u8) -> Self {
        Marker(byte)
    }
}

impl FromStr for Marker {
    type Err = MetastripError;

    /// Parses a catalog name (any case) or the `Marker(N)` fallback form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(index) = NAMES.iter().position(|name| name.eq_ignore_ascii_case(s)) {
            return Ok(Marker(FIRST_NAMED + index as u8));
        }
        s.strip_prefix("Marker(")
            .and_then(|rest| rest.strip_suffix(')'))
            .and_then(|digits| digits.parse::<u8>().ok())
            .map(Marker)
            .ok_or_else(|| MetastripError::InvalidPolicy(format!("unknown JPEG marker {s:?}")))
    }
}
