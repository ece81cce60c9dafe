//! RFC 4122 identifiers: version 1 (simplified, time-based) and version 4
//! (random) generation, validation and textual encodings.

pub mod batch;
pub mod entropy;
pub mod format;
pub mod generate;
pub mod validate;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CalcKitError;

pub use batch::{generate_batch, GeneratedIdentifier, UuidRequest};
pub use entropy::{EntropyQuality, EntropySource};
pub use format::{format, parse};
pub use generate::{generate_v1_simplified, generate_v4};
pub use validate::validate;

/// A raw 128-bit identifier
pub type UuidBytes = [u8; 16];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UuidVersion {
    #[serde(rename = "v1")]
    V1,
    #[default]
    #[serde(rename = "v4")]
    V4,
}

impl UuidVersion {
    /// Value of the high nibble of byte 6
    pub fn number(self) -> u8 {
        match self {
            UuidVersion::V1 => 1,
            UuidVersion::V4 => 4,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(UuidVersion::V1),
            4 => Some(UuidVersion::V4),
            _ => None,
        }
    }
}

impl fmt::Display for UuidVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.number())
    }
}

impl FromStr for UuidVersion {
    type Err = CalcKitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v1" | "1" => Ok(UuidVersion::V1),
            "v4" | "4" => Ok(UuidVersion::V4),
            other => Err(CalcKitError::InvalidInput {
                field: "version".into(),
                reason: format!("expected v1 or v4, got '{other}'"),
            }),
        }
    }
}

/// Textual rendering of an identifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `8-4-4-4-12` lowercase hex
    #[default]
    Standard,
    /// 32 hex digits, no hyphens
    Compact,
    /// `urn:uuid:` prefix
    Urn,
    /// Unpadded standard base64, 22 characters
    Base64,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Standard => "standard",
            OutputFormat::Compact => "compact",
            OutputFormat::Urn => "urn",
            OutputFormat::Base64 => "base64",
        };
        f.write_str(name)
    }
}

impl FromStr for OutputFormat {
    type Err = CalcKitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(OutputFormat::Standard),
            "compact" => Ok(OutputFormat::Compact),
            "urn" => Ok(OutputFormat::Urn),
            "base64" => Ok(OutputFormat::Base64),
            other => Err(CalcKitError::InvalidInput {
                field: "output_format".into(),
                reason: format!("expected standard, compact, urn or base64, got '{other}'"),
            }),
        }
    }
}
