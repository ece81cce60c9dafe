use chrono::{DateTime, Utc};
use rand::RngCore;

use super::entropy::{EntropyQuality, EntropySource};
use super::{UuidBytes, UuidVersion};

/// 100 ns intervals between 1582-10-15 and 1970-01-01
pub const GREGORIAN_OFFSET_TICKS: u64 = 122_192_928_000_000_000;

const TIMESTAMP_MASK: u64 = 0x0FFF_FFFF_FFFF_FFFF;

/// Stamp the version nibble (byte 6) and the RFC 4122 variant (byte 8).
pub fn apply_version_and_variant(bytes: &mut UuidBytes, version: UuidVersion) {
    bytes[6] = (bytes[6] & 0x0F) | (version.number() << 4);
    bytes[8] = (bytes[8] & 0x3F) | 0x80;
}

/// 60-bit count of 100 ns intervals since the Gregorian reform.
///
/// Instants before 1582-10-15 clamp to zero.
pub fn gregorian_timestamp(unix_millis: i64) -> u64 {
    let ticks = i128::from(unix_millis) * 10_000 + i128::from(GREGORIAN_OFFSET_TICKS);
    (ticks.max(0) as u64) & TIMESTAMP_MASK
}

/// Random identifier drawn from `source`.
pub fn generate_v4_with<R: RngCore>(source: &mut EntropySource<R>) -> (UuidBytes, EntropyQuality) {
    let mut bytes = [0u8; 16];
    let quality = source.fill(&mut bytes);
    apply_version_and_variant(&mut bytes, UuidVersion::V4);
    (bytes, quality)
}

/// Time-based identifier for `unix_millis`.
///
/// Simplified: the clock sequence and node are random on every call. There
/// is no MAC address and no persisted clock sequence, so two calls in the
/// same millisecond are kept apart only by those 62 random bits.
pub fn generate_v1_at<R: RngCore>(
    unix_millis: i64,
    source: &mut EntropySource<R>,
) -> (UuidBytes, EntropyQuality) {
    let timestamp = gregorian_timestamp(unix_millis);
    let time_low = (timestamp & 0xFFFF_FFFF) as u32;
    let time_mid = ((timestamp >> 32) & 0xFFFF) as u16;
    let time_hi = ((timestamp >> 48) & 0x0FFF) as u16;

    let mut bytes = [0u8; 16];
    bytes[0..4].copy_from_slice(&time_low.to_be_bytes());
    bytes[4..6].copy_from_slice(&time_mid.to_be_bytes());
    bytes[6..8].copy_from_slice(&time_hi.to_be_bytes());

    // clock_seq (14 bits after the variant) and node (48 bits)
    let quality = source.fill(&mut bytes[8..16]);
    apply_version_and_variant(&mut bytes, UuidVersion::V1);
    (bytes, quality)
}

/// Recover the embedded instant from a version 1 identifier.
pub fn v1_timestamp(bytes: &UuidBytes) -> Option<DateTime<Utc>> {
    if bytes[6] >> 4 != UuidVersion::V1.number() {
        return None;
    }
    let time_low = u64::from(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]));
    let time_mid = u64::from(u16::from_be_bytes([bytes[4], bytes[5]]));
    let time_hi = u64::from(u16::from_be_bytes([bytes[6], bytes[7]]) & 0x0FFF);
    let ticks = (time_hi << 48) | (time_mid << 32) | time_low;

    let unix_ticks = i64::try_from(ticks).ok()? - GREGORIAN_OFFSET_TICKS as i64;
    DateTime::<Utc>::from_timestamp_millis(unix_ticks.div_euclid(10_000))
}

/// Version 4 identifier from the operating system CSPRNG.
pub fn generate_v4() -> (UuidBytes, EntropyQuality) {
    generate_v4_with(&mut EntropySource::os())
}

/// Version 1 identifier stamped with the current wall-clock time.
pub fn generate_v1_simplified() -> (UuidBytes, EntropyQuality) {
    generate_v1_at(Utc::now().timestamp_millis(), &mut EntropySource::os())
}
