use thiserror::Error;

#[derive(Debug, Error)]
pub enum CalcKitError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Term too long: {periods} payments requested, at most {max} supported")]
    TermTooLong { periods: u32, max: u32 },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for CalcKitError {
    fn from(e: serde_json::Error) -> Self {
        CalcKitError::SerializationError(e.to_string())
    }
}
