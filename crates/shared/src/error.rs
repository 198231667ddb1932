//! Application-wide error taxonomy.
//!
//! Every service error in the engine converts into `AppError` so the
//! (out-of-process) API layer can map failures to HTTP responses without
//! string-matching messages.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error taxonomy.
#[derive(Debug, Error)]
pub enum AppError {
    /// Referenced entity does not exist for the tenant.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Required parameter missing or malformed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Operation not permitted in the entity's current state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Delete blocked by existing dependent records.
    #[error("Integrity violation: {0}")]
    IntegrityViolation(String),

    /// Concurrent modification detected.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Entity store error.
    #[error("Store error: {0}")]
    Store(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Validation(_) | Self::InvalidState(_) | Self::IntegrityViolation(_) => 400,
            Self::Conflict(_) => 409,
            Self::Store(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidState(_) => "INVALID_STATE",
            Self::IntegrityViolation(_) => "INTEGRITY_VIOLATION",
            Self::Conflict(_) => "CONFLICT",
            Self::Store(_) => "STORE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(AppError::NotFound(String::new()).status_code(), 404);
        assert_eq!(AppError::Validation(String::new()).status_code(), 400);
        assert_eq!(AppError::InvalidState(String::new()).status_code(), 400);
        assert_eq!(AppError::IntegrityViolation(String::new()).status_code(), 400);
        assert_eq!(AppError::Conflict(String::new()).status_code(), 409);
        assert_eq!(AppError::Store(String::new()).status_code(), 500);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(AppError::NotFound(String::new()).error_code(), "NOT_FOUND");
        assert_eq!(
            AppError::Validation(String::new()).error_code(),
            "VALIDATION_ERROR"
        );
        assert_eq!(
            AppError::InvalidState(String::new()).error_code(),
            "INVALID_STATE"
        );
        assert_eq!(
            AppError::IntegrityViolation(String::new()).error_code(),
            "INTEGRITY_VIOLATION"
        );
        assert_eq!(AppError::Conflict(String::new()).error_code(), "CONFLICT");
        assert_eq!(AppError::Store(String::new()).error_code(), "STORE_ERROR");
    }

    #[test]
    fn test_error_display() {
        let err = AppError::IntegrityViolation("supplier has 3 invoices".to_string());
        assert_eq!(
            err.to_string(),
            "Integrity violation: supplier has 3 invoices"
        );
    }
}
