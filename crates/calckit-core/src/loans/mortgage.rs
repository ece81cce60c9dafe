use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::amortization::{
    compute_schedule, schedule_warnings, validate_parameters, LoanParameters, PaymentExtras,
    PaymentFrequency, PaymentSchedule, PeriodicExtras, TermUnit, MAX_AMOUNT,
};
use crate::error::CalcKitError;
use crate::types::*;
use crate::CalcKitResult;

/// Above this loan-to-value lenders normally require PMI.
const PMI_LTV_THRESHOLD: Decimal = dec!(0.80);

/// Input for a home purchase financed with a fixed-rate mortgage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MortgageInput {
    pub home_price: Money,
    #[serde(default)]
    pub down_payment: Money,
    pub annual_interest_rate_percent: Percent,
    pub term_years: u32,
    #[serde(default)]
    pub frequency: PaymentFrequency,
    #[serde(default)]
    pub extras: PaymentExtras,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rounding_dp: Option<u32>,
}

impl MortgageInput {
    pub fn loan_amount(&self) -> Money {
        (self.home_price - self.down_payment).max(Decimal::ZERO)
    }

    pub fn loan_parameters(&self) -> LoanParameters {
        LoanParameters {
            principal: self.loan_amount(),
            annual_interest_rate_percent: self.annual_interest_rate_percent,
            term_value: self.term_years,
            term_unit: TermUnit::Years,
            frequency: self.frequency,
            extras: self.extras.clone(),
            rounding_dp: self.rounding_dp,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MortgageOutput {
    pub loan_amount: Money,
    pub down_payment_percent: Decimal,
    pub loan_to_value: Decimal,
    /// Principal and interest per period
    pub principal_and_interest: Money,
    pub periodic_extras: PeriodicExtras,
    pub total_periodic_payment: Money,
    pub number_of_payments: u32,
    pub total_interest: Money,
    /// Extras over the life of the loan
    pub total_extras: Money,
    /// Down payment, every loan payment and every extra
    pub total_cost_of_ownership: Money,
    pub schedule: PaymentSchedule,
}

/// Mortgage payment breakdown and schedule.
///
/// A non-positive home price gives an empty result with a warning, mirroring
/// how incomplete loan input is treated. A down payment outside
/// `0..=home_price` is rejected.
pub fn analyze_mortgage(input: &MortgageInput) -> CalcKitResult<ComputationOutput<MortgageOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.down_payment < Decimal::ZERO {
        return Err(CalcKitError::InvalidInput {
            field: "down_payment".into(),
            reason: "Down payment cannot be negative".into(),
        });
    }
    if input.home_price > MAX_AMOUNT {
        return Err(CalcKitError::InvalidInput {
            field: "home_price".into(),
            reason: format!("Home price cannot exceed {MAX_AMOUNT}"),
        });
    }
    if input.home_price > Decimal::ZERO && input.down_payment > input.home_price {
        return Err(CalcKitError::InvalidInput {
            field: "down_payment".into(),
            reason: "Down payment cannot exceed the home price".into(),
        });
    }

    let params = input.loan_parameters();
    validate_parameters(&params)?;
    schedule_warnings(&params, &mut warnings);

    let (down_payment_percent, loan_to_value) = if input.home_price > Decimal::ZERO {
        (
            input.down_payment / input.home_price * dec!(100),
            params.principal / input.home_price,
        )
    } else {
        (Decimal::ZERO, Decimal::ZERO)
    };

    if loan_to_value > PMI_LTV_THRESHOLD && input.extras.monthly_pmi.is_zero() {
        warnings.push(format!(
            "LTV of {:.1}% exceeds 80% but no PMI was supplied",
            loan_to_value * dec!(100)
        ));
    }

    let schedule = compute_schedule(&params);
    let payments_made = Decimal::from(schedule.rows.len() as u64);
    let total_extras = schedule.periodic_extras.total * payments_made;

    let output = MortgageOutput {
        loan_amount: params.principal,
        down_payment_percent,
        loan_to_value,
        principal_and_interest: schedule.periodic_payment,
        periodic_extras: schedule.periodic_extras.clone(),
        total_periodic_payment: schedule.total_periodic_outlay,
        number_of_payments: schedule.rows.len() as u32,
        total_interest: schedule.total_interest,
        total_extras,
        total_cost_of_ownership: input.down_payment + schedule.total_payment + total_extras,
        schedule,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fixed-rate mortgage amortisation with escrow extras",
        &serde_json::json!({
            "home_price": input.home_price.to_string(),
            "down_payment": input.down_payment.to_string(),
            "annual_rate_percent": input.annual_interest_rate_percent.to_string(),
            "term_years": input.term_years,
            "frequency": input.frequency.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn starter_home() -> MortgageInput {
        MortgageInput {
            home_price: dec!(400000),
            down_payment: dec!(80000),
            annual_interest_rate_percent: dec!(6.5),
            term_years: 30,
            frequency: PaymentFrequency::Monthly,
            extras: PaymentExtras {
                annual_property_tax: dec!(4800),
                annual_insurance: dec!(1200),
                monthly_pmi: Decimal::ZERO,
                monthly_hoa: dec!(150),
            },
            rounding_dp: Some(2),
        }
    }

    #[test]
    fn test_thirty_year_payment() {
        let result = analyze_mortgage(&starter_home()).unwrap();
        let out = &result.result;
        assert_eq!(out.loan_amount, dec!(320000));
        assert_eq!(out.loan_to_value, dec!(0.8));
        assert_eq!(out.down_payment_percent, dec!(20));
        // 320k at 6.5% over 360 months
        assert!(
            (out.principal_and_interest - dec!(2022.62)).abs() < dec!(0.01),
            "Expected ~2022.62, got {}",
            out.principal_and_interest
        );
        assert_eq!(out.periodic_extras.total, dec!(650));
        assert_eq!(out.total_periodic_payment, out.principal_and_interest + dec!(650));
        assert_eq!(out.number_of_payments, 360);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_total_cost_of_ownership() {
        let result = analyze_mortgage(&starter_home()).unwrap();
        let out = &result.result;
        assert_eq!(out.total_extras, dec!(650) * dec!(360));
        assert_eq!(
            out.total_cost_of_ownership,
            dec!(80000) + out.schedule.total_payment + out.total_extras
        );
    }

    #[test]
    fn test_high_ltv_without_pmi_warns() {
        let mut input = starter_home();
        input.down_payment = dec!(20000);
        let result = analyze_mortgage(&input).unwrap();
        assert!(result.warnings.iter().any(|w| w.contains("exceeds 80%")));

        input.extras.monthly_pmi = dec!(120);
        let result = analyze_mortgage(&input).unwrap();
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_down_payment_above_price_rejected() {
        let mut input = starter_home();
        input.down_payment = dec!(500000);
        assert!(analyze_mortgage(&input).is_err());
    }

    #[test]
    fn test_fully_paid_home_is_degenerate() {
        let mut input = starter_home();
        input.down_payment = input.home_price;
        let result = analyze_mortgage(&input).unwrap();
        assert!(result.result.schedule.is_empty());
        assert_eq!(result.result.total_interest, Decimal::ZERO);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_price_beyond_decimal_headroom_rejected() {
        let input = MortgageInput {
            home_price: Decimal::MAX,
            down_payment: Decimal::MAX - dec!(1000000),
            ..starter_home()
        };
        assert!(matches!(
            analyze_mortgage(&input),
            Err(CalcKitError::InvalidInput { field, .. }) if field == "home_price"
        ));
    }
}
