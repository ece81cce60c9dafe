mod commands;
mod input;
mod logging;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::identifiers::{UuidArgs, UuidConvertArgs, UuidValidateArgs};
use commands::loans::{LoanArgs, MortgageArgs, RateSensitivityArgs};

/// Loan amortisation and UUID utilities
#[derive(Parser)]
#[command(
    name = "calckit",
    version,
    about = "Loan amortisation and UUID utilities",
    long_about = "Calculators behind everyday utility pages, with decimal precision: \
                  loan and EMI schedules, mortgages with escrow extras, rate and \
                  frequency comparisons, and RFC 4122 identifier generation, \
                  validation and conversion."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log computation details to stderr
    #[arg(long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a payment-by-payment amortisation schedule
    Loan(LoanArgs),
    /// Amortisation schedule totalled by loan year
    YearlySummary(LoanArgs),
    /// Mortgage payment with tax, insurance, PMI and HOA
    Mortgage(MortgageArgs),
    /// Compare the periodic payment across interest rates
    RateSensitivity(RateSensitivityArgs),
    /// Compare monthly, biweekly and weekly payment plans
    FrequencyCompare(LoanArgs),
    /// Generate version 1 or version 4 UUIDs
    Uuid(UuidArgs),
    /// Check a UUID's version and variant bits
    UuidValidate(UuidValidateArgs),
    /// Re-encode a UUID as standard, compact, urn or base64
    UuidConvert(UuidConvertArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Loan(args) => commands::loans::run_loan(args),
        Commands::YearlySummary(args) => commands::loans::run_yearly_summary(args),
        Commands::Mortgage(args) => commands::loans::run_mortgage(args),
        Commands::RateSensitivity(args) => commands::loans::run_rate_sensitivity(args),
        Commands::FrequencyCompare(args) => commands::loans::run_frequency_compare(args),
        Commands::Uuid(args) => commands::identifiers::run_uuid(args),
        Commands::UuidValidate(args) => commands::identifiers::run_uuid_validate(args),
        Commands::UuidConvert(args) => commands::identifiers::run_uuid_convert(args),
        Commands::Version => {
            println!("calckit {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
