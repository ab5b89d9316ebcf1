//! Rental and waiting-list error types.

use thiserror::Error;

use crate::domain::foundation::{
    DomainError, ErrorCategory, ErrorCode, FacilityId, FacilityTypeId, RentedFacilityId,
    ValidationError,
};

/// Errors raised by rental and waiting-list operations.
#[derive(Debug, Clone, Error)]
pub enum RentalError {
    /// The facility already has an active rental.
    #[error("Facility {0} is already rented")]
    FacilityAlreadyRented(FacilityId),

    #[error("Rented facility not found: {0}")]
    RentedFacilityNotFound(RentedFacilityId),

    #[error("Waiting list entry not found: {0}")]
    WaitingListEntryNotFound(String),

    #[error("Waiting list for facility type {0} is empty")]
    WaitingListEmpty(FacilityTypeId),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Repository error: {0}")]
    Repository(DomainError),
}

impl RentalError {
    pub fn code(&self) -> ErrorCode {
        match self {
            RentalError::FacilityAlreadyRented(_) => ErrorCode::FacilityAlreadyRented,
            RentalError::RentedFacilityNotFound(_) => ErrorCode::RentedFacilityNotFound,
            RentalError::WaitingListEntryNotFound(_) | RentalError::WaitingListEmpty(_) => {
                ErrorCode::WaitingListEntryNotFound
            }
            RentalError::Validation(_) => ErrorCode::ValidationFailed,
            RentalError::Repository(err) => err.code,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        self.code().category()
    }

    pub fn is_not_found(&self) -> bool {
        self.category() == ErrorCategory::NotFound
    }
}

impl From<DomainError> for RentalError {
    fn from(err: DomainError) -> Self {
        let id_detail = |key: &str| err.details.get(key).and_then(|v| v.parse::<i64>().ok());
        match err.code {
            ErrorCode::FacilityAlreadyRented => match id_detail("facility_id") {
                Some(id) => RentalError::FacilityAlreadyRented(FacilityId::new(id)),
                None => RentalError::Repository(err),
            },
            ErrorCode::RentedFacilityNotFound => match id_detail("rented_facility_id") {
                Some(id) => RentalError::RentedFacilityNotFound(RentedFacilityId::new(id)),
                None => RentalError::Repository(err),
            },
            ErrorCode::WaitingListEntryNotFound => RentalError::WaitingListEntryNotFound(err.message),
            _ => RentalError::Repository(err),
        }
    }
}

impl From<RentalError> for DomainError {
    fn from(err: RentalError) -> Self {
        match err {
            RentalError::Repository(inner) => inner,
            other => DomainError::new(other.code(), other.to_string()),
        }
    }
}
