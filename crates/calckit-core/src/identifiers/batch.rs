use chrono::Utc;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use super::entropy::{EntropyQuality, EntropySource};
use super::format::format;
use super::generate::{generate_v1_at, generate_v4_with};
use super::validate::validate;
use super::{OutputFormat, UuidBytes, UuidVersion};
use crate::error::CalcKitError;
use crate::types::*;
use crate::CalcKitResult;

/// Largest batch a single request may ask for
pub const MAX_BATCH_SIZE: u32 = 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UuidRequest {
    #[serde(default)]
    pub version: UuidVersion,
    #[serde(default)]
    pub output_format: OutputFormat,
    pub count: u32,
    /// Only meaningful for `OutputFormat::Standard`
    #[serde(default = "default_hyphens")]
    pub include_hyphens: bool,
}

fn default_hyphens() -> bool {
    true
}

impl UuidRequest {
    pub fn new(version: UuidVersion, output_format: OutputFormat, count: u32) -> Self {
        UuidRequest {
            version,
            output_format,
            count,
            include_hyphens: true,
        }
    }
}

/// One identifier of a batch. Field order is the export column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedIdentifier {
    pub formatted: String,
    pub is_valid: bool,
    pub bytes: UuidBytes,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutput {
    pub version: UuidVersion,
    pub output_format: OutputFormat,
    pub entropy: EntropyQuality,
    pub invalid_count: usize,
    pub identifiers: Vec<GeneratedIdentifier>,
}

fn check_count(count: u32) -> CalcKitResult<()> {
    if count == 0 || count > MAX_BATCH_SIZE {
        return Err(CalcKitError::InvalidInput {
            field: "count".into(),
            reason: format!("Count must be between 1 and {MAX_BATCH_SIZE}"),
        });
    }
    Ok(())
}

/// Generate `request.count` identifiers from the operating system CSPRNG.
pub fn generate_batch(request: &UuidRequest) -> CalcKitResult<ComputationOutput<BatchOutput>> {
    generate_batch_with(request, &mut EntropySource::os())
}

/// Generate a batch from an explicit entropy source.
pub fn generate_batch_with<R: RngCore>(
    request: &UuidRequest,
    source: &mut EntropySource<R>,
) -> CalcKitResult<ComputationOutput<BatchOutput>> {
    assemble_batch(request, || match request.version {
        UuidVersion::V4 => generate_v4_with(source),
        UuidVersion::V1 => generate_v1_at(Utc::now().timestamp_millis(), source),
    })
}

/// Draw `request.count` identifiers from `next` and check each against the
/// requested version as soon as it is built. Failures are kept in the batch
/// with `is_valid: false` and counted; nothing is retried.
fn assemble_batch<F>(
    request: &UuidRequest,
    mut next: F,
) -> CalcKitResult<ComputationOutput<BatchOutput>>
where
    F: FnMut() -> (UuidBytes, EntropyQuality),
{
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    check_count(request.count)?;

    let mut entropy = EntropyQuality::Secure;
    let mut identifiers = Vec::with_capacity(request.count as usize);

    for _ in 0..request.count {
        let (bytes, quality) = next();
        if quality == EntropyQuality::Degraded {
            entropy = EntropyQuality::Degraded;
        }

        let is_valid = validate(&bytes, request.version);
        if !is_valid {
            warn!(version = %request.version, "generated identifier failed validation");
        }

        identifiers.push(GeneratedIdentifier {
            formatted: format(&bytes, request.output_format, request.include_hyphens),
            is_valid,
            bytes,
        });
    }

    let invalid_count = identifiers.iter().filter(|id| !id.is_valid).count();

    if entropy == EntropyQuality::Degraded {
        warnings.push(
            "Secure random source unavailable; \
             identifiers use a clock-seeded PRNG and are predictable"
                .into(),
        );
    }
    if invalid_count > 0 {
        warnings.push(format!(
            "{invalid_count} of {} identifiers failed {} validation",
            request.count, request.version
        ));
    }
    if request.version == UuidVersion::V1 {
        warnings.push(
            "Version 1 identifiers use a random node and clock sequence, not a MAC address".into(),
        );
    }

    debug!(
        version = %request.version,
        format = %request.output_format,
        count = request.count,
        invalid = invalid_count,
        "generated identifier batch"
    );

    let output = BatchOutput {
        version: request.version,
        output_format: request.output_format,
        entropy,
        invalid_count,
        identifiers,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "RFC 4122 identifier generation",
        request,
        warnings,
        elapsed,
        output,
    ))
}
