use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Instant;
use tracing::{debug, warn};

use crate::error::CalcKitError;
use crate::types::*;
use crate::CalcKitResult;

/// Schedules longer than this are still computed but flagged as unusual.
pub const TYPICAL_MAX_PERIODS: u32 = 600;

/// Hard ceiling on schedule length (100 years of weekly payments).
pub const MAX_PERIODS: u32 = 5_200;

/// Largest principal or extra cost accepted by the envelope builders.
pub const MAX_AMOUNT: Money = dec!(100_000_000_000_000_000_000);

/// Highest rounding precision accepted for payment figures.
const MAX_ROUNDING_DP: u32 = 12;

/// How often a payment falls due
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentFrequency {
    #[default]
    Monthly,
    Biweekly,
    Weekly,
}

impl PaymentFrequency {
    pub const ALL: [PaymentFrequency; 3] = [
        PaymentFrequency::Monthly,
        PaymentFrequency::Biweekly,
        PaymentFrequency::Weekly,
    ];

    pub fn payments_per_year(self) -> u32 {
        match self {
            PaymentFrequency::Monthly => 12,
            PaymentFrequency::Biweekly => 26,
            PaymentFrequency::Weekly => 52,
        }
    }

    pub fn from_payments_per_year(n: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.payments_per_year() == n)
    }
}

impl fmt::Display for PaymentFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PaymentFrequency::Monthly => "monthly",
            PaymentFrequency::Biweekly => "biweekly",
            PaymentFrequency::Weekly => "weekly",
        };
        f.write_str(name)
    }
}

impl FromStr for PaymentFrequency {
    type Err = CalcKitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" | "12" => Ok(PaymentFrequency::Monthly),
            "biweekly" | "bi-weekly" | "26" => Ok(PaymentFrequency::Biweekly),
            "weekly" | "52" => Ok(PaymentFrequency::Weekly),
            other => Err(CalcKitError::InvalidInput {
                field: "frequency".into(),
                reason: format!("expected monthly, biweekly or weekly, got '{other}'"),
            }),
        }
    }
}

/// Unit of `LoanParameters::term_value`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermUnit {
    /// Term is already a count of payments
    Months,
    #[default]
    Years,
}

impl FromStr for TermUnit {
    type Err = CalcKitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "months" | "month" | "m" | "payments" => Ok(TermUnit::Months),
            "years" | "year" | "y" => Ok(TermUnit::Years),
            other => Err(CalcKitError::InvalidInput {
                field: "term_unit".into(),
                reason: format!("expected months or years, got '{other}'"),
            }),
        }
    }
}

/// Escrow-style costs shown alongside the payment but never amortised
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentExtras {
    #[serde(default)]
    pub annual_property_tax: Money,
    #[serde(default)]
    pub annual_insurance: Money,
    #[serde(default)]
    pub monthly_pmi: Money,
    #[serde(default)]
    pub monthly_hoa: Money,
}

impl PaymentExtras {
    pub fn is_empty(&self) -> bool {
        self.annual_property_tax.is_zero()
            && self.annual_insurance.is_zero()
            && self.monthly_pmi.is_zero()
            && self.monthly_hoa.is_zero()
    }

    fn named(&self) -> [(&'static str, Money); 4] {
        [
            ("annual_property_tax", self.annual_property_tax),
            ("annual_insurance", self.annual_insurance),
            ("monthly_pmi", self.monthly_pmi),
            ("monthly_hoa", self.monthly_hoa),
        ]
    }

    fn first_negative(&self) -> Option<&'static str> {
        self.named()
            .into_iter()
            .find(|(_, v)| *v < Decimal::ZERO)
            .map(|(name, _)| name)
    }

    fn first_above(&self, ceiling: Money) -> Option<&'static str> {
        self.named()
            .into_iter()
            .find(|(_, v)| *v > ceiling)
            .map(|(name, _)| name)
    }

    /// Spread the extras over one payment period of the given frequency.
    ///
    /// Saturates at `Decimal::MAX` rather than overflowing.
    pub fn per_period(
        &self,
        frequency: PaymentFrequency,
        rounding_dp: Option<u32>,
    ) -> PeriodicExtras {
        let per_year = Decimal::from(frequency.payments_per_year());
        let months = dec!(12);
        let property_tax = round_to(self.annual_property_tax / per_year, rounding_dp);
        let insurance = round_to(self.annual_insurance / per_year, rounding_dp);
        let pmi = round_to(self.monthly_pmi.saturating_mul(months) / per_year, rounding_dp);
        let hoa = round_to(self.monthly_hoa.saturating_mul(months) / per_year, rounding_dp);
        PeriodicExtras {
            property_tax,
            insurance,
            pmi,
            hoa,
            total: property_tax
                .saturating_add(insurance)
                .saturating_add(pmi)
                .saturating_add(hoa),
        }
    }
}

/// Extras for a single payment period
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodicExtras {
    pub property_tax: Money,
    pub insurance: Money,
    pub pmi: Money,
    pub hoa: Money,
    pub total: Money,
}

/// Input for a fixed-rate amortising loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanParameters {
    pub principal: Money,
    /// Nominal annual rate as a percentage (6 = 6% p.a.)
    pub annual_interest_rate_percent: Percent,
    pub term_value: u32,
    #[serde(default)]
    pub term_unit: TermUnit,
    #[serde(default)]
    pub frequency: PaymentFrequency,
    #[serde(default)]
    pub extras: PaymentExtras,
    /// Round payment and interest to this many decimal places
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rounding_dp: Option<u32>,
}

impl LoanParameters {
    /// Monthly loan with no extras and full precision.
    pub fn new(
        principal: Money,
        annual_interest_rate_percent: Percent,
        term_value: u32,
        term_unit: TermUnit,
    ) -> Self {
        LoanParameters {
            principal,
            annual_interest_rate_percent,
            term_value,
            term_unit,
            frequency: PaymentFrequency::Monthly,
            extras: PaymentExtras::default(),
            rounding_dp: None,
        }
    }

    pub fn payments_per_year(&self) -> u32 {
        self.frequency.payments_per_year()
    }

    pub fn total_periods(&self) -> u32 {
        match self.term_unit {
            TermUnit::Years => self.term_value.saturating_mul(self.payments_per_year()),
            TermUnit::Months => self.term_value,
        }
    }

    pub fn periodic_rate(&self) -> Rate {
        self.annual_interest_rate_percent / dec!(100) / Decimal::from(self.payments_per_year())
    }

    /// Whether there is enough input for a schedule.
    pub fn is_computable(&self) -> bool {
        self.principal > Decimal::ZERO
            && self.annual_interest_rate_percent > Decimal::ZERO
            && self.term_value > 0
    }

    fn round(&self, value: Decimal) -> Decimal {
        round_to(value, self.rounding_dp)
    }
}

/// One payment period. Field order is the column order for tabular exports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentScheduleRow {
    pub payment_number: u32,
    pub payment_amount: Money,
    pub principal_portion: Money,
    pub interest_portion: Money,
    pub remaining_balance: Money,
    pub cumulative_principal: Money,
    pub cumulative_interest: Money,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentSchedule {
    /// Periods implied by the term; `rows` may stop earlier
    pub total_periods: u32,
    pub periodic_payment: Money,
    pub total_payment: Money,
    pub total_interest: Money,
    pub periodic_extras: PeriodicExtras,
    /// Periodic payment plus extras
    pub total_periodic_outlay: Money,
    pub rows: Vec<PaymentScheduleRow>,
}

impl PaymentSchedule {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn final_balance(&self) -> Money {
        self.rows
            .last()
            .map(|r| r.remaining_balance)
            .unwrap_or(Decimal::ZERO)
    }
}

/// Totals for one loan year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearSummary {
    pub year: u32,
    pub payments: u32,
    pub principal_paid: Money,
    pub interest_paid: Money,
    pub total_paid: Money,
    pub closing_balance: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearlySummaryOutput {
    pub periodic_payment: Money,
    pub total_payment: Money,
    pub total_interest: Money,
    pub years: Vec<YearSummary>,
}

fn round_to(value: Decimal, rounding_dp: Option<u32>) -> Decimal {
    match rounding_dp {
        Some(dp) => value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero),
        None => value,
    }
}

/// Level payment that retires `principal` over `periods` at `rate` per period.
///
/// Computed as `P * r * g / (g - 1)` with `g = (1 + r)^n`. When `g` is too
/// large for a Decimal the ratio `g / (g - 1)` is 1 and the payment is `P * r`.
/// None when the payment itself does not fit in a Decimal.
pub fn annuity_payment(principal: Money, rate: Rate, periods: u32) -> Option<Money> {
    if periods == 0 {
        return Some(Decimal::ZERO);
    }
    if rate.is_zero() {
        return Some(principal / Decimal::from(periods));
    }

    let interest_only = principal.checked_mul(rate)?;
    match Decimal::ONE
        .checked_add(rate)
        .and_then(|base| base.checked_powu(u64::from(periods)))
    {
        Some(growth) if growth > Decimal::ONE => {
            let ratio = growth.checked_div(growth - Decimal::ONE)?;
            interest_only.checked_mul(ratio)
        }
        _ => Some(interest_only),
    }
}

/// Periodic payment alone, without building the schedule.
///
/// Returns zero when the parameters are incomplete or the payment is out of
/// Decimal range.
pub fn current_periodic_payment(params: &LoanParameters) -> Money {
    if !params.is_computable() {
        return Decimal::ZERO;
    }
    annuity_payment(params.principal, params.periodic_rate(), params.total_periods())
        .map(|payment| params.round(payment))
        .unwrap_or(Decimal::ZERO)
}

/// Build the payment-by-payment amortisation schedule.
///
/// Incomplete input (non-positive principal, rate or term) yields an empty
/// schedule with zero totals rather than an error, as do loans whose totals
/// would leave Decimal range.
pub fn compute_schedule(params: &LoanParameters) -> PaymentSchedule {
    if !params.is_computable() {
        return PaymentSchedule::default();
    }

    match checked_schedule(params) {
        Some(schedule) => schedule,
        None => {
            warn!(
                principal = %params.principal,
                rate_percent = %params.annual_interest_rate_percent,
                "schedule totals overflow Decimal range, returning empty schedule"
            );
            PaymentSchedule::default()
        }
    }
}

fn checked_schedule(params: &LoanParameters) -> Option<PaymentSchedule> {
    let total_periods = params.total_periods();
    let rate = params.periodic_rate();
    let payment = params.round(annuity_payment(params.principal, rate, total_periods)?);

    let mut rows = Vec::with_capacity(total_periods.min(TYPICAL_MAX_PERIODS) as usize);
    let mut balance = params.principal;
    let mut cumulative_principal = Decimal::ZERO;
    let mut cumulative_interest = Decimal::ZERO;
    let mut total_payment = Decimal::ZERO;

    for payment_number in 1..=total_periods {
        let interest = params.round(balance.checked_mul(rate)?);

        // The last scheduled period settles whatever drift remains
        let principal_portion = if payment_number == total_periods {
            balance
        } else {
            payment.checked_sub(interest)?.min(balance).max(Decimal::ZERO)
        };
        let payment_amount = principal_portion.checked_add(interest)?;

        balance -= principal_portion;
        cumulative_principal += principal_portion;
        cumulative_interest = cumulative_interest.checked_add(interest)?;
        total_payment = total_payment.checked_add(payment_amount)?;

        rows.push(PaymentScheduleRow {
            payment_number,
            payment_amount,
            principal_portion,
            interest_portion: interest,
            remaining_balance: balance,
            cumulative_principal,
            cumulative_interest,
        });

        if balance <= Decimal::ZERO {
            break;
        }
    }

    let periodic_extras = params
        .extras
        .per_period(params.frequency, params.rounding_dp);

    debug!(
        principal = %params.principal,
        rate_percent = %params.annual_interest_rate_percent,
        periods = total_periods,
        rows = rows.len(),
        "computed amortisation schedule"
    );

    Some(PaymentSchedule {
        total_periods,
        periodic_payment: payment,
        total_payment,
        total_interest: total_payment - params.principal,
        total_periodic_outlay: payment.checked_add(periodic_extras.total)?,
        periodic_extras,
        rows,
    })
}

/// Fold a schedule into calendar-year totals.
pub fn summarize_by_year(
    schedule: &PaymentSchedule,
    frequency: PaymentFrequency,
) -> Vec<YearSummary> {
    let per_year = frequency.payments_per_year() as usize;

    schedule
        .rows
        .chunks(per_year)
        .enumerate()
        .map(|(i, chunk)| {
            let principal_paid: Money = chunk.iter().map(|r| r.principal_portion).sum();
            let interest_paid: Money = chunk.iter().map(|r| r.interest_portion).sum();
            YearSummary {
                year: i as u32 + 1,
                payments: chunk.len() as u32,
                principal_paid,
                interest_paid,
                total_paid: principal_paid + interest_paid,
                closing_balance: chunk
                    .last()
                    .map(|r| r.remaining_balance)
                    .unwrap_or(Decimal::ZERO),
            }
        })
        .collect()
}

pub(crate) fn validate_parameters(params: &LoanParameters) -> CalcKitResult<()> {
    if params.principal > MAX_AMOUNT {
        return Err(CalcKitError::InvalidInput {
            field: "principal".into(),
            reason: format!("Principal cannot exceed {MAX_AMOUNT}"),
        });
    }
    if params.total_periods() > MAX_PERIODS {
        return Err(CalcKitError::TermTooLong {
            periods: params.total_periods(),
            max: MAX_PERIODS,
        });
    }
    if let Some(field) = params.extras.first_negative() {
        return Err(CalcKitError::InvalidInput {
            field: field.into(),
            reason: "Extra costs cannot be negative".into(),
        });
    }
    if let Some(field) = params.extras.first_above(MAX_AMOUNT) {
        return Err(CalcKitError::InvalidInput {
            field: field.into(),
            reason: format!("Extra costs cannot exceed {MAX_AMOUNT}"),
        });
    }
    if let Some(dp) = params.rounding_dp {
        if dp > MAX_ROUNDING_DP {
            return Err(CalcKitError::InvalidInput {
                field: "rounding_dp".into(),
                reason: format!("At most {MAX_ROUNDING_DP} decimal places are supported"),
            });
        }
    }
    Ok(())
}

pub(crate) fn schedule_warnings(params: &LoanParameters, warnings: &mut Vec<String>) {
    if !params.is_computable() {
        warnings.push(
            "Principal, interest rate and term must all be positive; schedule is empty".into(),
        );
    } else if params.total_periods() > TYPICAL_MAX_PERIODS {
        warnings.push(format!(
            "Schedule spans {} payments, beyond the typical {} for consumer loans",
            params.total_periods(),
            TYPICAL_MAX_PERIODS
        ));
    }
}

fn loan_assumptions(params: &LoanParameters) -> serde_json::Value {
    serde_json::json!({
        "principal": params.principal.to_string(),
        "annual_rate_percent": params.annual_interest_rate_percent.to_string(),
        "periodic_rate": params.periodic_rate().to_string(),
        "periods": params.total_periods(),
        "frequency": params.frequency.to_string(),
        "rounding_dp": params.rounding_dp,
    })
}

/// Amortisation schedule wrapped in the standard output envelope.
pub fn build_loan_schedule(
    params: &LoanParameters,
) -> CalcKitResult<ComputationOutput<PaymentSchedule>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_parameters(params)?;
    schedule_warnings(params, &mut warnings);

    let schedule = compute_schedule(params);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fixed-rate annuity amortisation",
        &loan_assumptions(params),
        warnings,
        elapsed,
        schedule,
    ))
}

/// Year-by-year view of the schedule wrapped in the output envelope.
pub fn build_yearly_summary(
    params: &LoanParameters,
) -> CalcKitResult<ComputationOutput<YearlySummaryOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_parameters(params)?;
    schedule_warnings(params, &mut warnings);

    let schedule = compute_schedule(params);
    let output = YearlySummaryOutput {
        periodic_payment: schedule.periodic_payment,
        total_payment: schedule.total_payment,
        total_interest: schedule.total_interest,
        years: summarize_by_year(&schedule, params.frequency),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fixed-rate annuity amortisation, aggregated by year",
        &loan_assumptions(params),
        warnings,
        elapsed,
        output,
    ))
}
