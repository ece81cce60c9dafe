pub mod identifiers;
pub mod loans;
