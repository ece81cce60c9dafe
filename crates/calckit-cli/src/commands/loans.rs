use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use calckit_core::loans::amortization::{build_loan_schedule, build_yearly_summary};
use calckit_core::loans::mortgage::{self, MortgageInput};
use calckit_core::loans::sensitivity::{self, RateSensitivityInput, RateSweep};
use calckit_core::loans::{LoanParameters, PaymentExtras, PaymentFrequency, TermUnit};

use crate::input;

/// Loan terms given as individual flags
#[derive(Args)]
pub struct LoanFlags {
    /// Amount borrowed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (6 = 6%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Loan term, in --term-unit
    #[arg(long)]
    pub term: Option<u32>,

    /// Unit of --term: years or months
    #[arg(long, default_value = "years")]
    pub term_unit: TermUnit,

    /// Payment frequency: monthly, biweekly or weekly
    #[arg(long, default_value = "monthly")]
    pub frequency: PaymentFrequency,

    /// Round payments and interest to this many decimal places
    #[arg(long)]
    pub round: Option<u32>,
}

impl LoanFlags {
    fn to_parameters(&self) -> Result<LoanParameters, Box<dyn std::error::Error>> {
        let principal = self
            .principal
            .ok_or("--principal is required (or provide --input)")?;
        let rate = self.rate.ok_or("--rate is required (or provide --input)")?;
        let term = self.term.ok_or("--term is required (or provide --input)")?;

        Ok(LoanParameters {
            principal,
            annual_interest_rate_percent: rate,
            term_value: term,
            term_unit: self.term_unit,
            frequency: self.frequency,
            extras: PaymentExtras::default(),
            rounding_dp: self.round,
        })
    }
}

/// Arguments for a single loan
#[derive(Args)]
pub struct LoanArgs {
    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub loan: LoanFlags,
}

fn loan_parameters(args: &LoanArgs) -> Result<LoanParameters, Box<dyn std::error::Error>> {
    match input::document(args.input.as_deref())? {
        Some(params) => Ok(params),
        None => args.loan.to_parameters(),
    }
}

pub fn run_loan(args: LoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let params = loan_parameters(&args)?;
    let result = build_loan_schedule(&params)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_yearly_summary(args: LoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let params = loan_parameters(&args)?;
    let result = build_yearly_summary(&params)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_frequency_compare(args: LoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let params = loan_parameters(&args)?;
    let result = sensitivity::compare_frequencies(&params)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for a mortgage
#[derive(Args)]
pub struct MortgageArgs {
    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Purchase price of the home
    #[arg(long)]
    pub price: Option<Decimal>,

    /// Down payment
    #[arg(long, default_value = "0")]
    pub down: Decimal,

    /// Annual interest rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Term in years
    #[arg(long, default_value_t = 30)]
    pub years: u32,

    /// Payment frequency: monthly, biweekly or weekly
    #[arg(long, default_value = "monthly")]
    pub frequency: PaymentFrequency,

    /// Annual property tax
    #[arg(long, default_value = "0")]
    pub property_tax: Decimal,

    /// Annual homeowner's insurance
    #[arg(long, default_value = "0")]
    pub insurance: Decimal,

    /// Monthly private mortgage insurance
    #[arg(long, default_value = "0")]
    pub pmi: Decimal,

    /// Monthly HOA dues
    #[arg(long, default_value = "0")]
    pub hoa: Decimal,

    /// Round payments and interest to this many decimal places
    #[arg(long)]
    pub round: Option<u32>,
}

pub fn run_mortgage(args: MortgageArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mortgage_input: MortgageInput = match input::document(args.input.as_deref())? {
        Some(doc) => doc,
        None => MortgageInput {
            home_price: args.price.ok_or("--price is required (or provide --input)")?,
            down_payment: args.down,
            annual_interest_rate_percent: args
                .rate
                .ok_or("--rate is required (or provide --input)")?,
            term_years: args.years,
            frequency: args.frequency,
            extras: PaymentExtras {
                annual_property_tax: args.property_tax,
                annual_insurance: args.insurance,
                monthly_pmi: args.pmi,
                monthly_hoa: args.hoa,
            },
            rounding_dp: args.round,
        },
    };

    let result = mortgage::analyze_mortgage(&mortgage_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for rate sensitivity
#[derive(Args)]
pub struct RateSensitivityArgs {
    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub loan: LoanFlags,

    /// Annual rates to compare (comma-separated, e.g. "5,5.5,6")
    #[arg(long, value_delimiter = ',')]
    pub rates: Option<Vec<Decimal>>,

    /// Rate sweep in format min:max:step (e.g. "4:7:0.25")
    #[arg(long)]
    pub sweep: Option<String>,
}

fn parse_sweep(text: &str) -> Result<RateSweep, Box<dyn std::error::Error>> {
    let parts: Vec<&str> = text.split(':').collect();
    if parts.len() != 3 {
        return Err(format!("Sweep must be min:max:step, got '{}'", text).into());
    }
    Ok(RateSweep {
        min: parts[0].trim().parse()?,
        max: parts[1].trim().parse()?,
        step: parts[2].trim().parse()?,
    })
}

pub fn run_rate_sensitivity(
    args: RateSensitivityArgs,
) -> Result<Value, Box<dyn std::error::Error>> {
    let sens_input: RateSensitivityInput = match input::document(args.input.as_deref())? {
        Some(doc) => doc,
        None => {
            if args.rates.is_none() && args.sweep.is_none() {
                return Err("--rates or --sweep is required (or provide --input)".into());
            }
            RateSensitivityInput {
                loan: args.loan.to_parameters()?,
                rates: args.rates.unwrap_or_default(),
                sweep: args.sweep.as_deref().map(parse_sweep).transpose()?,
            }
        }
    };

    let result = sensitivity::rate_sensitivity(&sens_input)?;
    Ok(serde_json::to_value(result)?)
}
