//! In-memory `PaymentRepository`.
//!
//! Recording a payment settles its target; deleting it puts the target
//! back to unpaid for the same amount. A target holds at most one payment.

use async_trait::async_trait;

use super::store::{ClubState, InMemoryClubStore, PaymentRecord, PaymentTarget};
use crate::domain::foundation::{
    DomainError, ErrorCode, MembershipId, PaymentId, RentedFacilityId, Timestamp,
};
use crate::domain::payment::{Payment, PaymentDetails};
use crate::ports::PaymentRepository;

impl ClubState {
    /// Replaces the payment held by `target`.
    fn settle(&mut self, target: PaymentTarget, payment: Payment) -> Result<(), DomainError> {
        match target {
            PaymentTarget::Membership(id) => {
                let record = self
                    .memberships
                    .iter_mut()
                    .find(|r| r.membership.id == id)
                    .ok_or_else(|| {
                        DomainError::new(
                            ErrorCode::MembershipNotFound,
                            format!("Membership {} not found", id),
                        )
                    })?;
                record.membership = record.membership.with_payment(payment);
            }
            PaymentTarget::Rental(id) => {
                let record = self
                    .rentals
                    .iter_mut()
                    .find(|r| r.rental.id() == id)
                    .ok_or_else(|| {
                        DomainError::new(
                            ErrorCode::RentedFacilityNotFound,
                            format!("Rented facility {} not found", id),
                        )
                        .with_detail("rented_facility_id", id.to_string())
                    })?;
                record.rental = record.rental.clone().with_payment(payment);
            }
        }
        Ok(())
    }

    /// The outstanding payment a target falls back to once its payment is removed.
    fn outstanding(&self, target: PaymentTarget) -> Option<Payment> {
        match target {
            PaymentTarget::Membership(id) => self
                .memberships
                .iter()
                .find(|r| r.membership.id == id)
                .map(|r| {
                    let m = &r.membership;
                    Payment::unpaid(m.payment.amount(), m.status.valid_from())
                }),
            PaymentTarget::Rental(id) => self
                .rentals
                .iter()
                .find(|r| r.rental.id() == id)
                .map(|r| Payment::unpaid(r.rental.price(), None)),
        }
    }

    fn record_payment(
        &mut self,
        target: PaymentTarget,
        details: &PaymentDetails,
    ) -> Result<PaymentId, DomainError> {
        self.settle(target, details.clone().into_paid(Timestamp::now()))?;

        // One payment per target: recording again replaces the previous one.
        if let Some((id, record)) = self.payments.iter_mut().find(|(_, p)| p.target == target) {
            record.details = details.clone();
            return Ok(*id);
        }

        let id = PaymentId::new(self.next_id());
        self.payments.insert(
            id,
            PaymentRecord {
                target,
                details: details.clone(),
            },
        );
        Ok(id)
    }
}

#[async_trait]
impl PaymentRepository for InMemoryClubStore {
    async fn create_payment_for_membership_period(
        &self,
        membership_id: MembershipId,
        details: &PaymentDetails,
    ) -> Result<PaymentId, DomainError> {
        self.state
            .write()
            .await
            .record_payment(PaymentTarget::Membership(membership_id), details)
    }

    async fn create_payment_for_rented_facility(
        &self,
        rented_facility_id: RentedFacilityId,
        details: &PaymentDetails,
    ) -> Result<PaymentId, DomainError> {
        self.state
            .write()
            .await
            .record_payment(PaymentTarget::Rental(rented_facility_id), details)
    }

    async fn update_payment(
        &self,
        id: PaymentId,
        details: &PaymentDetails,
    ) -> Result<bool, DomainError> {
        let mut state = self.state.write().await;
        let Some(target) = state.payments.get(&id).map(|p| p.target) else {
            return Ok(false);
        };

        state.settle(target, details.clone().into_paid(Timestamp::now()))?;
        if let Some(record) = state.payments.get_mut(&id) {
            record.details = details.clone();
        }
        Ok(true)
    }

    async fn delete_payment(&self, id: PaymentId) -> Result<bool, DomainError> {
        let mut state = self.state.write().await;
        let Some(record) = state.payments.remove(&id) else {
            return Ok(false);
        };

        if let Some(unpaid) = state.outstanding(record.target) {
            state.settle(record.target, unpaid)?;
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::club::Season;
    use crate::domain::foundation::{MemberId, Money, SeasonId};
    use crate::domain::membership::{EmailAddress, NewUser};
    use crate::domain::payment::PaymentMethod;
    use crate::ports::{MemberRepository, NewMembershipPeriod};
    use chrono::NaiveDate;

    async fn store_with_member() -> (InMemoryClubStore, MemberId, MembershipId) {
        let store = InMemoryClubStore::new();
        let season = Season::new(
            SeasonId::new(2025),
            "2025",
            "Season 2025",
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
        )
        .unwrap();
        store.insert_season(season.clone()).await;

        let user = NewUser {
            first_name: "Anna".to_string(),
            last_name: "Verdi".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1979, 9, 9).unwrap(),
            email: EmailAddress::new("anna@example.com").unwrap(),
            tax_code: "VRDNNA79".to_string(),
            addresses: vec![],
            phone_numbers: vec![],
        };
        let details = store
            .create_member(
                user,
                Some(NewMembershipPeriod::for_season(&season, Money::from_units(130))),
            )
            .await
            .unwrap();
        let membership_id = details.memberships[0].id;
        (store, MemberId::from(details.user.id), membership_id)
    }

    fn cash(units: i64) -> PaymentDetails {
        PaymentDetails::new(Money::from_units(units), "EUR", PaymentMethod::Cash, None).unwrap()
    }

    #[tokio::test]
    async fn paying_the_fee_settles_the_membership() {
        let (store, member_id, membership_id) = store_with_member().await;

        store
            .create_payment_for_membership_period(membership_id, &cash(130))
            .await
            .unwrap();

        let details = store.get_member_by_id(member_id, None).await.unwrap().unwrap();
        assert!(details.memberships[0].payment.is_paid());
        assert!(store
            .get_members_who_did_not_pay_for_membership()
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn deleting_the_payment_restores_the_debt() {
        let (store, member_id, membership_id) = store_with_member().await;
        let payment_id = store
            .create_payment_for_membership_period(membership_id, &cash(130))
            .await
            .unwrap();

        assert!(store.delete_payment(payment_id).await.unwrap());
        assert!(!store.delete_payment(payment_id).await.unwrap());

        let details = store.get_member_by_id(member_id, None).await.unwrap().unwrap();
        let payment = &details.memberships[0].payment;
        assert!(!payment.is_paid());
        assert_eq!(payment.amount(), Money::from_units(130));
    }

    #[tokio::test]
    async fn update_changes_the_recorded_amount() {
        let (store, member_id, membership_id) = store_with_member().await;
        let payment_id = store
            .create_payment_for_membership_period(membership_id, &cash(100))
            .await
            .unwrap();

        assert!(store.update_payment(payment_id, &cash(130)).await.unwrap());
        assert!(!store.update_payment(PaymentId::new(999), &cash(130)).await.unwrap());

        let details = store.get_member_by_id(member_id, None).await.unwrap().unwrap();
        assert_eq!(details.memberships[0].payment.amount(), Money::from_units(130));
    }

    #[tokio::test]
    async fn paying_twice_replaces_the_payment() {
        let (store, _, membership_id) = store_with_member().await;
        let first = store
            .create_payment_for_membership_period(membership_id, &cash(100))
            .await
            .unwrap();
        let second = store
            .create_payment_for_membership_period(membership_id, &cash(130))
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(store.state.read().await.payments.len(), 1);
    }

    #[tokio::test]
    async fn unknown_targets_are_not_found() {
        let (store, _, _) = store_with_member().await;

        let err = store
            .create_payment_for_membership_period(MembershipId::new(999), &cash(1))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::MembershipNotFound);

        let err = store
            .create_payment_for_rented_facility(RentedFacilityId::new(999), &cash(1))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::RentedFacilityNotFound);
    }
}
