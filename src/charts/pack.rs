use serde::{Deserialize, Serialize};
use std::fmt;

/// One loadable chart tile source, as discovered by the chart inventory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChartPackRef {
    pub id: String,
    /// Path or URL the tile service resolves the pack from
    pub locator: String,
}

impl ChartPackRef {
    pub fn new(id: impl Into<String>, locator: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            locator: locator.into(),
        }
    }

    pub fn scale_band(&self) -> Option<ScaleBand> {
        ScaleBand::parse(&self.id)
    }
}

/// ENC navigational purpose ("usage band"), broadest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ScaleBand {
    Overview = 1,
    General = 2,
    Coastal = 3,
    Approach = 4,
    Harbour = 5,
    Berthing = 6,
}

impl ScaleBand {
    pub const ALL: [ScaleBand; 6] = [
        ScaleBand::Overview,
        ScaleBand::General,
        ScaleBand::Coastal,
        ScaleBand::Approach,
        ScaleBand::Harbour,
        ScaleBand::Berthing,
    ];

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::Overview),
            2 => Some(Self::General),
            3 => Some(Self::Coastal),
            4 => Some(Self::Approach),
            5 => Some(Self::Harbour),
            6 => Some(Self::Berthing),
            _ => None,
        }
    }

    pub fn number(&self) -> u8 {
        *self as u8
    }

    /// Parses the band out of a pack id.
    ///
    /// Accepts an optional producer code of up to two ASCII letters followed
    /// by the band digit, as in ENC cell names (`US5MA12M`, `GB4X0000`) or bare
    /// ids like `3_coastal`. Anything else has no band.
    pub fn parse(pack_id: &str) -> Option<Self> {
        let bytes = pack_id.as_bytes();
        let prefix = bytes
            .iter()
            .take_while(|b| b.is_ascii_alphabetic())
            .count();
        if prefix > 2 {
            return None;
        }
        let digit = *bytes.get(prefix)?;
        if !digit.is_ascii_digit() {
            return None;
        }
        Self::from_number(digit - b'0')
    }

    /// Zoom levels this band is designed to be viewed at, inclusive.
    pub fn design_zoom_range(&self) -> (f64, f64) {
        match self {
            Self::Overview => (0.0, 8.0),
            Self::General => (6.0, 10.0),
            Self::Coastal => (9.0, 13.0),
            Self::Approach => (11.0, 15.0),
            Self::Harbour => (13.0, 18.0),
            Self::Berthing => (15.0, 22.0),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Overview => "Overview",
            Self::General => "General",
            Self::Coastal => "Coastal",
            Self::Approach => "Approach",
            Self::Harbour => "Harbour",
            Self::Berthing => "Berthing",
        }
    }
}

impl fmt::Display for ScaleBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label(), self.number())
    }
}
