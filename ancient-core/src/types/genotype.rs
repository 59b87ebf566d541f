//! Genotype codes and the encoding choices that operate on them

use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete zygosity class of one sample at one variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum GenotypeCode {
    /// Homozygous reference (0)
    HomRef = 0,
    /// Heterozygous (1)
    Het = 1,
    /// Homozygous alternate (2)
    HomAlt = 2,
}

impl Default for GenotypeCode {
    fn default() -> Self {
        Self::HomRef
    }
}

impl GenotypeCode {
    pub const ALL: [GenotypeCode; 3] = [Self::HomRef, Self::Het, Self::HomAlt];

    /// Convert a raw code, returning `None` outside {0, 1, 2}
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::HomRef),
            1 => Some(Self::Het),
            2 => Some(Self::HomAlt),
            _ => None,
        }
    }

    /// Parse one genotype call field as an integer code. Only whole integers
    /// are accepted: forms with a fractional part or trailing text, such as
    /// `1.0` or `2/2`, are invalid rather than truncated to their leading digits.
    pub fn parse_call(field: &str) -> Option<Self> {
        field.trim().parse::<i64>().ok().and_then(Self::from_code)
    }

    /// Parse a call, applying the allele flip first and clamping anything outside
    /// the domain to `HomRef`. The flag reports whether clamping happened.
    pub fn normalize_call(field: &str, flip: bool) -> (Self, bool) {
        match Self::parse_call(field) {
            Some(code) if flip => (code.flipped(), false),
            Some(code) => (code, false),
            None => (Self::HomRef, true),
        }
    }

    /// Swap reference and alternate homozygotes (0 <-> 2, 1 unchanged)
    pub fn flipped(self) -> Self {
        match self {
            Self::HomRef => Self::HomAlt,
            Self::Het => Self::Het,
            Self::HomAlt => Self::HomRef,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn is_non_reference(self) -> bool {
        self != Self::HomRef
    }
}

impl fmt::Display for GenotypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// Pixel/value encoding scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Single intensity per cell (reference is white)
    Grayscale,
    /// One RGB channel per genotype code
    Categorical,
}

impl Default for ColorMode {
    fn default() -> Self {
        Self::Grayscale
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grayscale => write!(f, "grayscale"),
            Self::Categorical => write!(f, "categorical"),
        }
    }
}

/// Reduction applied to each chunk when binning a genotype vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ResampleStrategy {
    /// Highest code in the chunk, so a hom-alt call dominates its bin
    Max,
    /// Lowest code in the chunk
    Min,
    /// Most frequent code; ties go to the higher code
    Mode,
}

impl Default for ResampleStrategy {
    fn default() -> Self {
        Self::Max
    }
}

impl fmt::Display for ResampleStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Max => write!(f, "max"),
            Self::Min => write!(f, "min"),
            Self::Mode => write!(f, "mode"),
        }
    }
}
