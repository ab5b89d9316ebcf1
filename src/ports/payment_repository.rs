//! Payment repository port.
//!
//! Payments are recorded against either a membership period or a rental.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, MembershipId, PaymentId, RentedFacilityId};
use crate::domain::payment::PaymentDetails;

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// # Errors
    ///
    /// - `MembershipNotFound` if the period doesn't exist
    /// - `DatabaseError` on persistence failure
    async fn create_payment_for_membership_period(
        &self,
        membership_id: MembershipId,
        details: &PaymentDetails,
    ) -> Result<PaymentId, DomainError>;

    /// # Errors
    ///
    /// - `RentedFacilityNotFound` if the rental doesn't exist
    /// - `DatabaseError` on persistence failure
    async fn create_payment_for_rented_facility(
        &self,
        rented_facility_id: RentedFacilityId,
        details: &PaymentDetails,
    ) -> Result<PaymentId, DomainError>;

    /// Returns `false` if no payment has this id.
    async fn update_payment(
        &self,
        id: PaymentId,
        details: &PaymentDetails,
    ) -> Result<bool, DomainError>;

    /// Returns `false` if no payment has this id.
    async fn delete_payment(&self, id: PaymentId) -> Result<bool, DomainError>;
}
