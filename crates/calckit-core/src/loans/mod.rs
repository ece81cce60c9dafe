//! Fixed-rate loan amortisation: personal, auto and home loans, mortgages
//! with escrow extras, and rate/frequency comparisons.

pub mod amortization;
pub mod mortgage;
pub mod sensitivity;

pub use amortization::{
    compute_schedule, current_periodic_payment, LoanParameters, PaymentExtras, PaymentFrequency,
    PaymentSchedule, PaymentScheduleRow, TermUnit,
};
