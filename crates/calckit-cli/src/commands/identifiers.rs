use clap::Args;
use serde_json::{json, Value};

use calckit_core::identifiers::batch::{self, UuidRequest};
use calckit_core::identifiers::format::{self as id_format, ConversionInput};
use calckit_core::identifiers::validate::detect_version;
use calckit_core::identifiers::{self, OutputFormat as IdFormat, UuidVersion};

use crate::input;

/// Arguments for UUID generation
#[derive(Args)]
pub struct UuidArgs {
    /// Path to JSON or YAML request file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// UUID version: v1 (time-based) or v4 (random)
    #[arg(long = "uuid-version", default_value = "v4")]
    pub uuid_version: UuidVersion,

    /// Encoding: standard, compact, urn or base64
    #[arg(long, default_value = "standard")]
    pub format: IdFormat,

    /// How many to generate (1 to 1000)
    #[arg(long, default_value_t = 1)]
    pub count: u32,

    /// Drop hyphens from the standard encoding
    #[arg(long)]
    pub no_hyphens: bool,
}

pub fn run_uuid(args: UuidArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: UuidRequest = match input::document(args.input.as_deref())? {
        Some(doc) => doc,
        None => UuidRequest {
            version: args.uuid_version,
            output_format: args.format,
            count: args.count,
            include_hyphens: !args.no_hyphens,
        },
    };

    let result = batch::generate_batch(&request)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for UUID validation
#[derive(Args)]
pub struct UuidValidateArgs {
    /// UUID in standard, compact, urn, braced or base64 form
    pub value: String,

    /// Version the identifier is expected to carry
    #[arg(long, default_value = "v4")]
    pub expect: UuidVersion,
}

/// Unparseable text is reported as invalid rather than as an error.
pub fn run_uuid_validate(args: UuidValidateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let result = match identifiers::parse(&args.value) {
        Ok(bytes) => json!({
            "input": args.value,
            "standard": identifiers::format(&bytes, IdFormat::Standard, true),
            "expected_version": args.expect,
            "detected_version": detect_version(&bytes),
            "is_valid": identifiers::validate(&bytes, args.expect),
        }),
        Err(e) => json!({
            "input": args.value,
            "expected_version": args.expect,
            "is_valid": false,
            "reason": e.to_string(),
        }),
    };
    Ok(json!({ "result": result }))
}

/// Arguments for UUID re-encoding
#[derive(Args)]
pub struct UuidConvertArgs {
    /// UUID in standard, compact, urn, braced or base64 form
    pub value: String,

    /// Target encoding: standard, compact, urn or base64
    #[arg(long, default_value = "standard")]
    pub to: IdFormat,

    /// Drop hyphens from the standard encoding
    #[arg(long)]
    pub no_hyphens: bool,
}

pub fn run_uuid_convert(args: UuidConvertArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let conversion = ConversionInput {
        text: args.value,
        output_format: args.to,
        include_hyphens: !args.no_hyphens,
    };
    let result = id_format::convert_identifier(&conversion)?;
    Ok(serde_json::to_value(result)?)
}
