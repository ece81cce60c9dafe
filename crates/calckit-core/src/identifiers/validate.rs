use uuid::{Uuid, Variant};

use super::{UuidBytes, UuidVersion};

/// Whether byte 8 carries the `10xxxxxx` RFC 4122 variant.
pub fn has_rfc4122_variant(bytes: &UuidBytes) -> bool {
    Uuid::from_bytes(*bytes).get_variant() == Variant::RFC4122
}

/// Version this crate knows how to generate, if the bits say so.
pub fn detect_version(bytes: &UuidBytes) -> Option<UuidVersion> {
    if !has_rfc4122_variant(bytes) {
        return None;
    }
    u8::try_from(Uuid::from_bytes(*bytes).get_version_num())
        .ok()
        .and_then(UuidVersion::from_number)
}

/// Structural check of version nibble and variant bits. Never fails.
pub fn validate(bytes: &UuidBytes, expected: UuidVersion) -> bool {
    detect_version(bytes) == Some(expected)
}
