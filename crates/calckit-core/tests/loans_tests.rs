#![cfg(feature = "loans")]

use calckit_core::loans::amortization::{build_loan_schedule, build_yearly_summary};
use calckit_core::loans::mortgage::{analyze_mortgage, MortgageInput};
use calckit_core::loans::sensitivity::{
    compare_frequencies, rate_sensitivity, RateSensitivityInput, RateSweep,
};
use calckit_core::loans::{
    compute_schedule, current_periodic_payment, LoanParameters, PaymentExtras, PaymentFrequency,
    PaymentSchedule, TermUnit,
};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Schedule invariants across a spread of realistic loans
// ===========================================================================

fn sample_loans() -> Vec<LoanParameters> {
    let mut loans = vec![
        LoanParameters::new(dec!(100000), dec!(6), 2, TermUnit::Years),
        LoanParameters::new(dec!(25000), dec!(9.75), 60, TermUnit::Months),
        LoanParameters::new(dec!(350000), dec!(4.25), 30, TermUnit::Years),
        LoanParameters::new(dec!(1500.50), dec!(19.99), 12, TermUnit::Months),
        LoanParameters::new(dec!(5000), dec!(0.01), 3, TermUnit::Years),
    ];

    let mut biweekly = LoanParameters::new(dec!(180000), dec!(5.5), 15, TermUnit::Years);
    biweekly.frequency = PaymentFrequency::Biweekly;
    loans.push(biweekly);

    let mut weekly_rounded = LoanParameters::new(dec!(32000), dec!(7.2), 5, TermUnit::Years);
    weekly_rounded.frequency = PaymentFrequency::Weekly;
    weekly_rounded.rounding_dp = Some(2);
    loans.push(weekly_rounded);

    let mut rounded_mortgage =
        LoanParameters::new(dec!(412345.67), dec!(6.875), 30, TermUnit::Years);
    rounded_mortgage.rounding_dp = Some(2);
    loans.push(rounded_mortgage);

    loans
}

fn assert_invariants(params: &LoanParameters, schedule: &PaymentSchedule) {
    let rows = &schedule.rows;
    assert!(!rows.is_empty());
    assert!(rows.len() as u32 <= params.total_periods());

    // Closes to exactly zero
    assert_eq!(rows.last().unwrap().remaining_balance, Decimal::ZERO);

    let mut previous = params.principal;
    for (i, row) in rows.iter().enumerate() {
        assert_eq!(row.payment_number, i as u32 + 1);
        assert_eq!(row.principal_portion + row.interest_portion, row.payment_amount);
        assert!(row.principal_portion >= Decimal::ZERO);
        assert!(row.interest_portion >= Decimal::ZERO);
        assert!(row.remaining_balance >= Decimal::ZERO);
        assert!(
            row.remaining_balance <= previous,
            "balance rose at payment {}",
            row.payment_number
        );
        previous = row.remaining_balance;
    }

    let summed: Decimal = rows.iter().map(|r| r.payment_amount).sum();
    assert_eq!(schedule.total_payment, summed);
    assert_eq!(schedule.total_interest, schedule.total_payment - params.principal);
}

#[test]
fn test_schedule_invariants_hold() {
    for params in sample_loans() {
        let schedule = compute_schedule(&params);
        assert_invariants(&params, &schedule);
    }
}

#[test]
fn test_cumulative_columns_track_sums() {
    let params = LoanParameters::new(dec!(25000), dec!(9.75), 60, TermUnit::Months);
    let schedule = compute_schedule(&params);
    let last = schedule.rows.last().unwrap();
    let interest: Decimal = schedule.rows.iter().map(|r| r.interest_portion).sum();
    assert_eq!(last.cumulative_interest, interest);
    assert!((last.cumulative_principal - dec!(25000)).abs() < dec!(0.000001));
}

// ===========================================================================
// Known answers
// ===========================================================================

#[test]
fn test_known_24_month_loan() {
    let params = LoanParameters::new(dec!(100000), dec!(6), 2, TermUnit::Years);
    let schedule = compute_schedule(&params);
    assert_eq!(schedule.rows.len(), 24);
    assert!(
        (schedule.periodic_payment - dec!(4432.06)).abs() < dec!(0.01),
        "Expected ~4432.06, got {}",
        schedule.periodic_payment
    );
    assert!((schedule.total_interest - dec!(6369.49)).abs() < dec!(0.05));
}

#[test]
fn test_payment_helper_matches_schedule() {
    for params in sample_loans() {
        assert_eq!(current_periodic_payment(&params), compute_schedule(&params).periodic_payment);
    }
}

// ===========================================================================
// Degenerate input
// ===========================================================================

#[test]
fn test_degenerate_inputs_give_empty_schedule() {
    let base = LoanParameters::new(dec!(10000), dec!(5), 5, TermUnit::Years);
    let cases = [
        LoanParameters {
            principal: Decimal::ZERO,
            ..base.clone()
        },
        LoanParameters {
            principal: dec!(-10),
            ..base.clone()
        },
        LoanParameters {
            annual_interest_rate_percent: Decimal::ZERO,
            ..base.clone()
        },
        LoanParameters {
            annual_interest_rate_percent: dec!(-1),
            ..base.clone()
        },
        LoanParameters {
            term_value: 0,
            ..base.clone()
        },
    ];

    for params in &cases {
        let schedule = compute_schedule(params);
        assert_eq!(schedule, PaymentSchedule::default());
        assert_eq!(schedule.total_payment, Decimal::ZERO);
        assert_eq!(schedule.total_interest, Decimal::ZERO);
        assert_eq!(schedule.periodic_payment, Decimal::ZERO);
    }
}

// ===========================================================================
// Envelopes
// ===========================================================================

#[test]
fn test_long_schedule_warns() {
    let mut params = LoanParameters::new(dec!(300000), dec!(5), 40, TermUnit::Years);
    params.frequency = PaymentFrequency::Biweekly;
    let output = build_loan_schedule(&params).unwrap();
    assert_eq!(output.result.rows.len(), 1040);
    assert!(output.warnings.iter().any(|w| w.contains("1040")));
}

#[test]
fn test_yearly_summary_envelope() {
    let params = LoanParameters::new(dec!(350000), dec!(4.25), 30, TermUnit::Years);
    let output = build_yearly_summary(&params).unwrap();
    let years = &output.result.years;
    assert_eq!(years.len(), 30);
    assert_eq!(years.last().unwrap().closing_balance, Decimal::ZERO);
    // Interest share falls as the loan matures
    assert!(years[0].interest_paid > years[29].interest_paid);
}

#[test]
fn test_mortgage_from_json() {
    let input: MortgageInput = serde_json::from_str(
        r#"{
            "home_price": "500000",
            "down_payment": "100000",
            "annual_interest_rate_percent": "7",
            "term_years": 30,
            "extras": { "annual_property_tax": "6000", "monthly_hoa": "200" },
            "rounding_dp": 2
        }"#,
    )
    .unwrap();
    let output = analyze_mortgage(&input).unwrap();
    let out = &output.result;
    assert_eq!(out.loan_amount, dec!(400000));
    assert!((out.principal_and_interest - dec!(2661.21)).abs() < dec!(0.01));
    assert_eq!(out.periodic_extras.total, dec!(700));
    assert_eq!(out.schedule.rows.len(), 360);
}

#[test]
fn test_mortgage_extras_field_defaults() {
    let extras: PaymentExtras = serde_json::from_str("{}").unwrap();
    assert!(extras.is_empty());
}

#[test]
fn test_rate_sweep_end_to_end() {
    let input = RateSensitivityInput {
        loan: LoanParameters::new(dec!(200000), dec!(6), 30, TermUnit::Years),
        rates: vec![],
        sweep: Some(RateSweep {
            min: dec!(5),
            max: dec!(7),
            step: dec!(0.5),
        }),
    };
    let output = rate_sensitivity(&input).unwrap();
    let rows = &output.result.comparisons;
    assert_eq!(rows.len(), 5);
    let base = rows.iter().find(|r| r.annual_interest_rate_percent == dec!(6)).unwrap();
    assert_eq!(base.payment_delta, Decimal::ZERO);
    assert!((base.periodic_payment - dec!(1199.10)).abs() < dec!(0.01));
}

#[test]
fn test_frequency_comparison_uses_same_calendar_term() {
    let loan = LoanParameters::new(dec!(20000), dec!(8), 36, TermUnit::Months);
    let output = compare_frequencies(&loan).unwrap();
    let payments: Vec<u32> = output
        .result
        .comparisons
        .iter()
        .map(|c| c.number_of_payments)
        .collect();
    assert_eq!(payments, vec![36, 78, 156]);
}
