use napi::Result as NapiResult;
use napi_derive::napi;

use calckit_core::identifiers::{self, OutputFormat, UuidVersion};
use calckit_core::loans::LoanParameters;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Loans
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_loan_schedule(input_json: String) -> NapiResult<String> {
    let params: LoanParameters = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = calckit_core::loans::amortization::build_loan_schedule(&params)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Payment only; never fails for well-formed input, returns "0" when incomplete.
#[napi]
pub fn current_periodic_payment(input_json: String) -> NapiResult<String> {
    let params: LoanParameters = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    Ok(calckit_core::loans::current_periodic_payment(&params).to_string())
}

#[napi]
pub fn yearly_summary(input_json: String) -> NapiResult<String> {
    let params: LoanParameters = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = calckit_core::loans::amortization::build_yearly_summary(&params)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn analyze_mortgage(input_json: String) -> NapiResult<String> {
    let input: calckit_core::loans::mortgage::MortgageInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        calckit_core::loans::mortgage::analyze_mortgage(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn rate_sensitivity(input_json: String) -> NapiResult<String> {
    let input: calckit_core::loans::sensitivity::RateSensitivityInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        calckit_core::loans::sensitivity::rate_sensitivity(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn compare_frequencies(input_json: String) -> NapiResult<String> {
    let params: LoanParameters = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        calckit_core::loans::sensitivity::compare_frequencies(&params).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

#[napi]
pub fn generate_uuids(input_json: String) -> NapiResult<String> {
    let request: identifiers::UuidRequest =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = identifiers::generate_batch(&request).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Structural check only. Text that does not parse is reported invalid.
#[napi]
pub fn validate_uuid(value: String, expected_version: String) -> NapiResult<bool> {
    let expected: UuidVersion = expected_version.parse().map_err(to_napi_error)?;
    Ok(identifiers::parse(&value)
        .map(|bytes| identifiers::validate(&bytes, expected))
        .unwrap_or(false))
}

#[napi]
pub fn convert_uuid(input_json: String) -> NapiResult<String> {
    let input: identifiers::format::ConversionInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = identifiers::format::convert_identifier(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn format_uuid(
    value: String,
    output_format: String,
    include_hyphens: bool,
) -> NapiResult<String> {
    let bytes = identifiers::parse(&value).map_err(to_napi_error)?;
    let target: OutputFormat = output_format.parse().map_err(to_napi_error)?;
    Ok(identifiers::format(&bytes, target, include_hyphens))
}
