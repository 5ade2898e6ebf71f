pub type Result<T, E = ValidationError> = std::result::Result<T, E>;

/// Field level invariant violation.
///
/// Carries the name of the offending field, so it can be reported back to the user
/// (import warnings, API responses) without further context.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Field {field} is required")]
    RequiredFieldMissing { field: &'static str },

    #[error("Field {field} has invalid format: {reason}")]
    InvalidFormat {
        field: &'static str,
        reason: &'static str,
    },

    #[error("ISBN must be 13 symbols long, got {length}")]
    InvalidIsbn { length: usize },

    #[error("ISBN must have only numbers")]
    NonNumericIsbn,
}

impl ValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::RequiredFieldMissing { field } => field,
            ValidationError::InvalidFormat { field, .. } => field,
            ValidationError::InvalidIsbn { .. } | ValidationError::NonNumericIsbn => "isbn",
        }
    }
}
