pub mod error;
pub mod types;

#[cfg(feature = "loans")]
pub mod loans;

#[cfg(feature = "identifiers")]
pub mod identifiers;

pub use error::CalcKitError;
pub use types::*;

/// Standard result type for all calckit operations
pub type CalcKitResult<T> = Result<T, CalcKitError>;
