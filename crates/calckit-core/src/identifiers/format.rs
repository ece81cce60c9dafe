use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use uuid::Uuid;

use super::generate::v1_timestamp;
use super::validate::{detect_version, has_rfc4122_variant};
use super::{OutputFormat, UuidBytes, UuidVersion};
use crate::error::CalcKitError;
use crate::types::*;
use crate::CalcKitResult;

/// Length of 16 bytes in unpadded base64
pub const BASE64_LEN: usize = 22;

/// Render 16 bytes in the requested encoding.
///
/// `include_hyphens` only affects `Standard`.
pub fn format(bytes: &UuidBytes, output_format: OutputFormat, include_hyphens: bool) -> String {
    let id = Uuid::from_bytes(*bytes);
    match output_format {
        OutputFormat::Standard if include_hyphens => id.hyphenated().to_string(),
        OutputFormat::Standard | OutputFormat::Compact => id.simple().to_string(),
        OutputFormat::Urn => id.urn().to_string(),
        OutputFormat::Base64 => {
            let mut encoded = STANDARD_NO_PAD.encode(bytes);
            encoded.truncate(BASE64_LEN);
            encoded
        }
    }
}

/// Parse any textual form back to bytes.
///
/// Hyphenated, compact, `urn:uuid:` and braced forms are accepted in any
/// case, as is the 22 character base64 form.
pub fn parse(text: &str) -> CalcKitResult<UuidBytes> {
    let trimmed = text.trim();

    if trimmed.len() == BASE64_LEN {
        let decoded = STANDARD_NO_PAD
            .decode(trimmed)
            .map_err(|e| CalcKitError::InvalidInput {
                field: "uuid".into(),
                reason: format!("not valid base64: {e}"),
            })?;
        return UuidBytes::try_from(decoded.as_slice()).map_err(|_| CalcKitError::InvalidInput {
            field: "uuid".into(),
            reason: format!("base64 decodes to {} bytes, expected 16", decoded.len()),
        });
    }

    Uuid::parse_str(trimmed)
        .map(|id| *id.as_bytes())
        .map_err(|e| CalcKitError::InvalidInput {
            field: "uuid".into(),
            reason: e.to_string(),
        })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionInput {
    pub text: String,
    #[serde(default)]
    pub output_format: OutputFormat,
    #[serde(default = "default_hyphens")]
    pub include_hyphens: bool,
}

fn default_hyphens() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    pub formatted: String,
    pub standard: String,
    pub detected_version: Option<UuidVersion>,
    pub rfc4122_variant: bool,
    /// Embedded creation time, version 1 only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedded_time: Option<DateTime<Utc>>,
    pub bytes: UuidBytes,
}

/// Re-encode an identifier and report what its bits say about it.
pub fn convert_identifier(
    input: &ConversionInput,
) -> CalcKitResult<ComputationOutput<ConversionOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let bytes = parse(&input.text)?;
    let detected_version = detect_version(&bytes);
    let rfc4122_variant = has_rfc4122_variant(&bytes);

    if !rfc4122_variant {
        warnings.push("Variant bits are not RFC 4122 (10xxxxxx)".into());
    } else if detected_version.is_none() {
        warnings.push(format!(
            "Version {} is not one this tool generates",
            bytes[6] >> 4
        ));
    }

    let output = ConversionOutput {
        formatted: format(&bytes, input.output_format, input.include_hyphens),
        standard: format(&bytes, OutputFormat::Standard, true),
        detected_version,
        rfc4122_variant,
        embedded_time: match detected_version {
            Some(UuidVersion::V1) => v1_timestamp(&bytes),
            _ => None,
        },
        bytes,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "RFC 4122 identifier re-encoding",
        &serde_json::json!({
            "output_format": input.output_format.to_string(),
            "include_hyphens": input.include_hyphens,
        }),
        warnings,
        elapsed,
        output,
    ))
}
