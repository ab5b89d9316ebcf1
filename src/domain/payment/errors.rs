//! Payment-specific error types.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCategory, ErrorCode, ValidationError};

/// Errors raised while recording or correcting payments.
#[derive(Debug, Clone, Error)]
pub enum PaymentError {
    /// The payment, membership period or rental referenced does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Repository error: {0}")]
    Repository(DomainError),
}

impl PaymentError {
    pub fn code(&self) -> ErrorCode {
        match self {
            PaymentError::NotFound(_) => ErrorCode::PaymentNotFound,
            PaymentError::Validation(_) => ErrorCode::ValidationFailed,
            PaymentError::Repository(err) => err.code,
        }
    }
}

impl From<DomainError> for PaymentError {
    fn from(err: DomainError) -> Self {
        match err.category() {
            ErrorCategory::NotFound => PaymentError::NotFound(err.message),
            _ => PaymentError::Repository(err),
        }
    }
}
