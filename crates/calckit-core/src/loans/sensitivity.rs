use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::amortization::{
    compute_schedule, current_periodic_payment, validate_parameters, LoanParameters,
    PaymentFrequency, TermUnit,
};
use crate::error::CalcKitError;
use crate::types::*;
use crate::CalcKitResult;

/// Upper bound on the number of rates in one comparison
const MAX_RATE_POINTS: usize = 200;

/// Evenly spaced annual rates, both ends included
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateSweep {
    pub min: Percent,
    pub max: Percent,
    pub step: Percent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateSensitivityInput {
    pub loan: LoanParameters,
    /// Explicit list of annual rates to compare
    #[serde(default)]
    pub rates: Vec<Percent>,
    /// Alternative to `rates`; appended when both are given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sweep: Option<RateSweep>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateSensitivityRow {
    pub annual_interest_rate_percent: Percent,
    pub periodic_payment: Money,
    /// Level payment times the number of periods
    pub total_payment: Money,
    pub total_interest: Money,
    /// Against the base loan's rate
    pub payment_delta: Money,
    pub interest_delta: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateSensitivityOutput {
    pub base_rate_percent: Percent,
    pub base_periodic_payment: Money,
    pub base_total_interest: Money,
    pub comparisons: Vec<RateSensitivityRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrequencyComparisonRow {
    pub frequency: PaymentFrequency,
    pub payments_per_year: u32,
    pub number_of_payments: u32,
    pub periodic_payment: Money,
    pub total_payment: Money,
    pub total_interest: Money,
    pub interest_saved_vs_monthly: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrequencyComparisonOutput {
    pub principal: Money,
    pub comparisons: Vec<FrequencyComparisonRow>,
}

fn sweep_values(sweep: &RateSweep) -> CalcKitResult<Vec<Percent>> {
    if sweep.step <= Decimal::ZERO {
        return Err(CalcKitError::InvalidInput {
            field: "sweep.step".into(),
            reason: "Step must be positive".into(),
        });
    }
    if sweep.min > sweep.max {
        return Err(CalcKitError::InvalidInput {
            field: "sweep.min".into(),
            reason: "Min must be <= max".into(),
        });
    }

    let mut values = Vec::new();
    let mut current = sweep.min;
    while current <= sweep.max {
        if values.len() >= MAX_RATE_POINTS {
            return Err(CalcKitError::InvalidInput {
                field: "sweep".into(),
                reason: format!("Sweep produces more than {MAX_RATE_POINTS} rates"),
            });
        }
        values.push(current);
        match current.checked_add(sweep.step) {
            Some(next) => current = next,
            None => break,
        }
    }
    if values.last().is_some_and(|last| *last < sweep.max) {
        values.push(sweep.max);
    }

    Ok(values)
}

/// Closed-form totals for a level payment, no schedule built.
///
/// All zero when the loan is incomplete or its totals leave Decimal range.
fn level_totals(params: &LoanParameters) -> (Money, Money, Money) {
    let payment = current_periodic_payment(params);
    match payment.checked_mul(Decimal::from(params.total_periods())) {
        Some(total) if !payment.is_zero() => (payment, total, total - params.principal),
        _ => (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO),
    }
}

/// Periodic payment and total interest of the same loan at several rates.
pub fn rate_sensitivity(
    input: &RateSensitivityInput,
) -> CalcKitResult<ComputationOutput<RateSensitivityOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_parameters(&input.loan)?;

    let mut rates = input.rates.clone();
    if let Some(sweep) = &input.sweep {
        rates.extend(sweep_values(sweep)?);
    }
    if rates.is_empty() {
        return Err(CalcKitError::InvalidInput {
            field: "rates".into(),
            reason: "Provide at least one rate or a sweep".into(),
        });
    }
    if rates.len() > MAX_RATE_POINTS {
        return Err(CalcKitError::InvalidInput {
            field: "rates".into(),
            reason: format!("At most {MAX_RATE_POINTS} rates can be compared"),
        });
    }

    let (base_payment, _, base_interest) = level_totals(&input.loan);
    if base_payment.is_zero() {
        warnings.push("Base loan is incomplete; deltas are against zero".into());
    }

    let mut scenario = input.loan.clone();
    let comparisons = rates
        .into_iter()
        .map(|rate| {
            scenario.annual_interest_rate_percent = rate;
            let (payment, total, interest) = level_totals(&scenario);
            if payment.is_zero() {
                warnings.push(format!("Rate {rate}% gives no payment; check the loan inputs"));
            }
            RateSensitivityRow {
                annual_interest_rate_percent: rate,
                periodic_payment: payment,
                total_payment: total,
                total_interest: interest,
                payment_delta: payment.saturating_sub(base_payment),
                interest_delta: interest.saturating_sub(base_interest),
            }
        })
        .collect();

    let output = RateSensitivityOutput {
        base_rate_percent: input.loan.annual_interest_rate_percent,
        base_periodic_payment: base_payment,
        base_total_interest: base_interest,
        comparisons,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Annuity payment sensitivity to the annual rate",
        &serde_json::json!({
            "principal": input.loan.principal.to_string(),
            "periods": input.loan.total_periods(),
            "frequency": input.loan.frequency.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Payments needed to cover the loan's calendar term at `frequency`.
fn periods_for(loan: &LoanParameters, frequency: PaymentFrequency) -> u32 {
    let per_year = frequency.payments_per_year();
    match loan.term_unit {
        TermUnit::Years => loan.term_value.saturating_mul(per_year),
        // Month count rounded up to whole payments
        TermUnit::Months => loan
            .term_value
            .saturating_mul(per_year)
            .div_ceil(12),
    }
}

/// The same loan and calendar term paid monthly, biweekly and weekly.
pub fn compare_frequencies(
    loan: &LoanParameters,
) -> CalcKitResult<ComputationOutput<FrequencyComparisonOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_parameters(loan)?;
    if !loan.is_computable() {
        warnings.push("Principal, interest rate and term must all be positive".into());
    }

    let plans = PaymentFrequency::ALL
        .into_iter()
        .map(|frequency| {
            let params = LoanParameters {
                term_value: periods_for(loan, frequency),
                term_unit: TermUnit::Months,
                frequency,
                ..loan.clone()
            };
            // Weekly payments of a long monthly term can pass the period cap
            validate_parameters(&params).map(|_| params)
        })
        .collect::<CalcKitResult<Vec<LoanParameters>>>()?;

    let mut comparisons: Vec<FrequencyComparisonRow> = plans
        .iter()
        .map(|params| {
            let frequency = params.frequency;
            let schedule = compute_schedule(params);
            FrequencyComparisonRow {
                frequency,
                payments_per_year: frequency.payments_per_year(),
                number_of_payments: schedule.rows.len() as u32,
                periodic_payment: schedule.periodic_payment,
                total_payment: schedule.total_payment,
                total_interest: schedule.total_interest,
                interest_saved_vs_monthly: Decimal::ZERO,
            }
        })
        .collect();

    let monthly_interest = comparisons
        .iter()
        .find(|c| c.frequency == PaymentFrequency::Monthly)
        .map(|c| c.total_interest)
        .unwrap_or(Decimal::ZERO);
    for row in &mut comparisons {
        row.interest_saved_vs_monthly = monthly_interest - row.total_interest;
    }

    let output = FrequencyComparisonOutput {
        principal: loan.principal,
        comparisons,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Annuity amortisation across payment frequencies",
        &serde_json::json!({
            "principal": loan.principal.to_string(),
            "annual_rate_percent": loan.annual_interest_rate_percent.to_string(),
            "term_value": loan.term_value,
        }),
        warnings,
        elapsed,
        output,
    ))
}
