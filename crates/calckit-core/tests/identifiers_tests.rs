#![cfg(feature = "identifiers")]

use std::collections::HashSet;

use calckit_core::identifiers::batch::{
    generate_batch, generate_batch_with, UuidRequest, MAX_BATCH_SIZE,
};
use calckit_core::identifiers::format::{convert_identifier, ConversionInput};
use calckit_core::identifiers::generate::{
    apply_version_and_variant, generate_v1_at, generate_v4_with,
};
use calckit_core::identifiers::{
    format, generate_v1_simplified, generate_v4, parse, validate, EntropyQuality, EntropySource,
    OutputFormat, UuidVersion,
};
use calckit_core::CalcKitError;
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;

// ===========================================================================
// Version and variant bits
// ===========================================================================

#[test]
fn test_v4_bits_on_every_identifier() {
    let request = UuidRequest::new(UuidVersion::V4, OutputFormat::Standard, 500);
    let output = generate_batch(&request).unwrap();
    for id in &output.result.identifiers {
        assert_eq!(id.bytes[6] >> 4, 0x4);
        assert_eq!(id.bytes[8] & 0xC0, 0x80);
        assert!(id.is_valid);
    }
}

#[test]
fn test_v1_bits() {
    let (bytes, quality) = generate_v1_simplified();
    assert_eq!(bytes[6] >> 4, 0x1);
    assert_eq!(bytes[8] & 0xC0, 0x80);
    assert_eq!(quality, EntropyQuality::Secure);
    assert!(validate(&bytes, UuidVersion::V1));
    assert!(!validate(&bytes, UuidVersion::V4));
}

#[test]
fn test_v1_clock_sequence_and_node_vary() {
    let mut source = EntropySource::new(StdRng::seed_from_u64(3));
    let (a, _) = generate_v1_at(1_700_000_000_000, &mut source);
    let (b, _) = generate_v1_at(1_700_000_000_000, &mut source);
    // Same instant, same time fields
    assert_eq!(&a[..8], &b[..8]);
    assert_ne!(&a[8..], &b[8..]);
}

// ===========================================================================
// Formatting
// ===========================================================================

#[test]
fn test_known_uuid_example() {
    let mut bytes = [
        0x12, 0x3e, 0x45, 0x67, 0xe8, 0x9b, 0x42, 0xd3, 0xa4, 0x56, 0x42, 0x66, 0x14, 0x17, 0x40,
        0x00,
    ];
    apply_version_and_variant(&mut bytes, UuidVersion::V4);
    assert_eq!(
        format(&bytes, OutputFormat::Standard, true),
        "123e4567-e89b-42d3-a456-426614174000"
    );
}

#[test]
fn test_format_round_trip() {
    let mut source = EntropySource::new(StdRng::seed_from_u64(11));
    for _ in 0..100 {
        let (bytes, _) = generate_v4_with(&mut source);
        let standard = parse(&format(&bytes, OutputFormat::Standard, true)).unwrap();
        let compact = parse(&format(&bytes, OutputFormat::Compact, true)).unwrap();
        let urn = parse(&format(&bytes, OutputFormat::Urn, true)).unwrap();
        assert_eq!(standard, bytes);
        assert_eq!(compact, bytes);
        assert_eq!(urn, bytes);
    }
}

#[test]
fn test_output_lengths() {
    let (bytes, _) = generate_v4();
    assert_eq!(format(&bytes, OutputFormat::Standard, true).len(), 36);
    assert_eq!(format(&bytes, OutputFormat::Standard, false).len(), 32);
    assert_eq!(format(&bytes, OutputFormat::Compact, true).len(), 32);
    assert_eq!(format(&bytes, OutputFormat::Urn, true).len(), 45);
    assert_eq!(format(&bytes, OutputFormat::Base64, true).len(), 22);
}

#[test]
fn test_parse_error_is_invalid_input() {
    match parse("zzzz") {
        Err(CalcKitError::InvalidInput { field, .. }) => assert_eq!(field, "uuid"),
        other => panic!("expected InvalidInput, got {other:?}"),
    }
}

// ===========================================================================
// Batches
// ===========================================================================

#[test]
fn test_ten_thousand_v4_are_unique() {
    let mut seen = HashSet::new();
    for _ in 0..10_000 {
        let (bytes, _) = generate_v4();
        assert!(seen.insert(bytes), "duplicate identifier generated");
    }
}

#[test]
fn test_max_batch() {
    let request = UuidRequest::new(UuidVersion::V4, OutputFormat::Base64, MAX_BATCH_SIZE);
    let output = generate_batch(&request).unwrap();
    assert_eq!(output.result.identifiers.len(), 1000);
    let unique: HashSet<_> = output.result.identifiers.iter().map(|id| id.bytes).collect();
    assert_eq!(unique.len(), 1000);
}

#[test]
fn test_out_of_range_counts_rejected() {
    for count in [0, 1001] {
        let request = UuidRequest::new(UuidVersion::V1, OutputFormat::Standard, count);
        assert!(matches!(
            generate_batch(&request),
            Err(CalcKitError::InvalidInput { .. })
        ));
    }
}

#[test]
fn test_request_defaults_from_json() {
    let request: UuidRequest = serde_json::from_str(r#"{ "count": 3 }"#).unwrap();
    assert_eq!(request.version, UuidVersion::V4);
    assert_eq!(request.output_format, OutputFormat::Standard);
    assert!(request.include_hyphens);

    let request: UuidRequest =
        serde_json::from_str(r#"{ "version": "v1", "output_format": "urn", "count": 2 }"#).unwrap();
    assert_eq!(request.version, UuidVersion::V1);
    assert_eq!(request.output_format, OutputFormat::Urn);
}

#[test]
fn test_hyphen_flag_only_affects_standard() {
    let mut request = UuidRequest::new(UuidVersion::V4, OutputFormat::Standard, 1);
    request.include_hyphens = false;
    let seeded = || EntropySource::new(StdRng::seed_from_u64(99));

    let bare = generate_batch_with(&request, &mut seeded()).unwrap();
    assert!(!bare.result.identifiers[0].formatted.contains('-'));

    request.output_format = OutputFormat::Urn;
    let urn = generate_batch_with(&request, &mut seeded()).unwrap();
    assert_eq!(urn.result.identifiers[0].formatted.matches('-').count(), 4);
}

// ===========================================================================
// Conversion
// ===========================================================================

#[test]
fn test_convert_v1_exposes_time() {
    let millis = 1_720_000_000_000;
    let (bytes, _) = generate_v1_at(millis, &mut EntropySource::new(StdRng::seed_from_u64(5)));
    let input = ConversionInput {
        text: format(&bytes, OutputFormat::Urn, true),
        output_format: OutputFormat::Base64,
        include_hyphens: true,
    };
    let output = convert_identifier(&input).unwrap();
    assert_eq!(output.result.detected_version, Some(UuidVersion::V1));
    assert_eq!(output.result.embedded_time.unwrap().timestamp_millis(), millis);
    assert_eq!(parse(&output.result.formatted).unwrap(), bytes);
}

#[test]
fn test_convert_flags_foreign_variant() {
    let input = ConversionInput {
        text: "123e4567-e89b-42d3-c456-426614174000".into(),
        output_format: OutputFormat::Standard,
        include_hyphens: true,
    };
    let output = convert_identifier(&input).unwrap();
    assert!(!output.result.rfc4122_variant);
    assert_eq!(output.result.detected_version, None);
    assert_eq!(output.warnings.len(), 1);
}
