//! PaymentManagementService - recording and correcting payments.

use std::sync::Arc;

use tracing::info;

use crate::domain::foundation::{MembershipId, PaymentId, RentedFacilityId};
use crate::domain::payment::{PaymentDetails, PaymentError};
use crate::ports::PaymentRepository;

#[derive(Clone)]
pub struct PaymentManagementService {
    repository: Arc<dyn PaymentRepository>,
}

impl PaymentManagementService {
    pub fn new(repository: Arc<dyn PaymentRepository>) -> Self {
        Self { repository }
    }

    pub async fn create_payment_for_membership_period(
        &self,
        membership_id: MembershipId,
        details: &PaymentDetails,
    ) -> Result<PaymentId, PaymentError> {
        let id = self
            .repository
            .create_payment_for_membership_period(membership_id, details)
            .await?;

        info!(
            payment_id = %id,
            membership_id = %membership_id,
            amount = %details.amount(),
            method = %details.method(),
            "Membership payment recorded"
        );
        Ok(id)
    }

    pub async fn create_payment_for_rented_facility(
        &self,
        rented_facility_id: RentedFacilityId,
        details: &PaymentDetails,
    ) -> Result<PaymentId, PaymentError> {
        let id = self
            .repository
            .create_payment_for_rented_facility(rented_facility_id, details)
            .await?;

        info!(
            payment_id = %id,
            rented_facility_id = %rented_facility_id,
            amount = %details.amount(),
            method = %details.method(),
            "Rental payment recorded"
        );
        Ok(id)
    }

    pub async fn update_payment(
        &self,
        id: PaymentId,
        details: &PaymentDetails,
    ) -> Result<(), PaymentError> {
        if !self.repository.update_payment(id, details).await? {
            return Err(PaymentError::NotFound(format!("payment {}", id)));
        }
        info!(payment_id = %id, amount = %details.amount(), "Payment updated");
        Ok(())
    }

    pub async fn delete_payment(&self, id: PaymentId) -> Result<(), PaymentError> {
        if !self.repository.delete_payment(id).await? {
            return Err(PaymentError::NotFound(format!("payment {}", id)));
        }
        info!(payment_id = %id, "Payment deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{DomainError, ErrorCode, Money};
    use crate::domain::payment::PaymentMethod;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;

    struct MockPaymentRepository {
        memberships: HashSet<MembershipId>,
        payments: Mutex<HashSet<PaymentId>>,
        fail: bool,
    }

    impl MockPaymentRepository {
        fn new() -> Self {
            Self {
                memberships: [MembershipId::new(1)].into_iter().collect(),
                payments: Mutex::new([PaymentId::new(5)].into_iter().collect()),
                fail: false,
            }
        }
    }

    #[async_trait]
    impl PaymentRepository for MockPaymentRepository {
        async fn create_payment_for_membership_period(
            &self,
            membership_id: MembershipId,
            _details: &PaymentDetails,
        ) -> Result<PaymentId, DomainError> {
            if self.fail {
                return Err(DomainError::database("Simulated insert failure"));
            }
            if !self.memberships.contains(&membership_id) {
                return Err(DomainError::new(
                    ErrorCode::MembershipNotFound,
                    format!("membership {}", membership_id),
                ));
            }
            self.payments.lock().unwrap().insert(PaymentId::new(6));
            Ok(PaymentId::new(6))
        }

        async fn create_payment_for_rented_facility(
            &self,
            rented_facility_id: RentedFacilityId,
            _details: &PaymentDetails,
        ) -> Result<PaymentId, DomainError> {
            Err(DomainError::new(
                ErrorCode::RentedFacilityNotFound,
                format!("rented facility {}", rented_facility_id),
            ))
        }

        async fn update_payment(
            &self,
            id: PaymentId,
            _details: &PaymentDetails,
        ) -> Result<bool, DomainError> {
            Ok(self.payments.lock().unwrap().contains(&id))
        }

        async fn delete_payment(&self, id: PaymentId) -> Result<bool, DomainError> {
            Ok(self.payments.lock().unwrap().remove(&id))
        }
    }

    fn details() -> PaymentDetails {
        PaymentDetails::new(Money::from_units(130), "eur", PaymentMethod::Cash, None).unwrap()
    }

    #[tokio::test]
    async fn records_membership_payment() {
        let service = PaymentManagementService::new(Arc::new(MockPaymentRepository::new()));
        let id = service
            .create_payment_for_membership_period(MembershipId::new(1), &details())
            .await
            .unwrap();
        assert_eq!(id, PaymentId::new(6));
    }

    #[tokio::test]
    async fn unknown_membership_is_not_found() {
        let service = PaymentManagementService::new(Arc::new(MockPaymentRepository::new()));
        let err = service
            .create_payment_for_membership_period(MembershipId::new(2), &details())
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::NotFound(_)));
    }

    #[tokio::test]
    async fn unknown_rental_is_not_found() {
        let service = PaymentManagementService::new(Arc::new(MockPaymentRepository::new()));
        let err = service
            .create_payment_for_rented_facility(RentedFacilityId::new(2), &details())
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::PaymentNotFound);
    }

    #[tokio::test]
    async fn repository_failure_is_passed_through() {
        let repo = MockPaymentRepository {
            fail: true,
            ..MockPaymentRepository::new()
        };
        let service = PaymentManagementService::new(Arc::new(repo));
        let err = service
            .create_payment_for_membership_period(MembershipId::new(1), &details())
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::DatabaseError);
    }

    #[tokio::test]
    async fn update_and_delete_existing_payment() {
        let service = PaymentManagementService::new(Arc::new(MockPaymentRepository::new()));
        service.update_payment(PaymentId::new(5), &details()).await.unwrap();
        service.delete_payment(PaymentId::new(5)).await.unwrap();

        let err = service.delete_payment(PaymentId::new(5)).await.unwrap_err();
        assert!(matches!(err, PaymentError::NotFound(_)));
    }
}
