//! In-memory `FacilityRepository`.
//!
//! The write lock is held across the availability check and the insert,
//! which makes `rent_facility` atomic with respect to concurrent callers.

use async_trait::async_trait;

use super::store::{InMemoryClubStore, RentalRecord};
use crate::domain::facility_rental::{
    FacilityTenant, FacilityType, FacilityWithStatus, PricingRule, RentalDetails, RentalRequest,
    RentalValidity, RentedFacility,
};
use crate::domain::foundation::{
    DomainError, ErrorCode, FacilityTypeId, MemberId, RentedFacilityId, SeasonId, Timestamp,
    UserId,
};
use crate::domain::payment::Payment;
use crate::ports::FacilityRepository;

#[async_trait]
impl FacilityRepository for InMemoryClubStore {
    async fn get_facilities_catalog(&self) -> Result<Vec<FacilityType>, DomainError> {
        Ok(self.state.read().await.facility_types.values().cloned().collect())
    }

    async fn get_facilities_by_type(
        &self,
        facility_type_id: FacilityTypeId,
        season_id: SeasonId,
    ) -> Result<Vec<FacilityWithStatus>, DomainError> {
        let state = self.state.read().await;
        let facilities = state
            .facilities
            .values()
            .filter(|f| f.facility_type.id == facility_type_id)
            .map(|facility| {
                let rented_by = state
                    .rentals
                    .iter()
                    .find(|r| {
                        r.is_active()
                            && r.season_id == season_id
                            && r.rental.facility().id == facility.id
                    })
                    .and_then(|r| {
                        let user = state.users.get(&UserId::from(r.rental.member_id()))?;
                        Some(FacilityTenant {
                            member_id: r.rental.member_id(),
                            first_name: user.first_name.clone(),
                            last_name: user.last_name.clone(),
                            expires_at: r.rental.validity().to,
                        })
                    });
                FacilityWithStatus {
                    facility: facility.clone(),
                    rented_by,
                }
            })
            .collect();
        Ok(facilities)
    }

    async fn get_facilities_rented_by_member(
        &self,
        member_id: MemberId,
        season_id: SeasonId,
    ) -> Result<Vec<RentedFacility>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .rentals
            .iter()
            .filter(|r| {
                r.is_active() && r.season_id == season_id && r.rental.member_id() == member_id
            })
            .map(|r| r.rental.clone())
            .collect())
    }

    async fn get_pricing_rules(&self) -> Result<Vec<PricingRule>, DomainError> {
        Ok(self.state.read().await.pricing_rules.clone())
    }

    async fn rent_facility(&self, request: &RentalRequest) -> Result<RentedFacility, DomainError> {
        let mut state = self.state.write().await;

        let facility = state
            .facilities
            .get(&request.facility_id)
            .cloned()
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::FacilityNotFound,
                    format!("Facility not found: {}", request.facility_id),
                )
                .with_detail("facility_id", request.facility_id.to_string())
            })?;
        let season = state.season(request.season_id)?;
        let validity = RentalValidity {
            from: season.starts_at,
            to: season.ends_at,
        };
        state.user(request.member_id)?;

        if state.rentals.iter().any(|r| {
            r.is_active()
                && r.season_id == request.season_id
                && r.rental.facility().id == request.facility_id
        }) {
            return Err(DomainError::new(
                ErrorCode::FacilityAlreadyRented,
                format!("Facility {} is already rented", request.facility_id),
            )
            .with_detail("facility_id", request.facility_id.to_string()));
        }

        let details = RentalDetails {
            id: RentedFacilityId::new(state.next_id()),
            member_id: request.member_id,
            facility,
            validity,
            price: request.price,
            payment: Payment::unpaid(request.price, None),
        };
        let rental = RentedFacility::new(details, request.boat.clone());
        state.rentals.push(RentalRecord {
            rental: rental.clone(),
            season_id: request.season_id,
            freed_at: None,
        });
        Ok(rental)
    }

    async fn free_facility(&self, id: RentedFacilityId) -> Result<bool, DomainError> {
        let mut state = self.state.write().await;
        match state
            .rentals
            .iter_mut()
            .find(|r| r.is_active() && r.rental.id() == id)
        {
            Some(record) => {
                record.freed_at = Some(Timestamp::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::club::Season;
    use crate::domain::facility_rental::{BoatInfo, FacilityName, InsuranceInfo};
    use crate::domain::foundation::{FacilityId, Money};
    use crate::domain::membership::{EmailAddress, NewUser};
    use crate::ports::MemberRepository;
    use chrono::NaiveDate;

    const SEASON: SeasonId = SeasonId::new(2025);
    const LOCKER: FacilityTypeId = FacilityTypeId::new(1);
    const BOAT_SPACE: FacilityTypeId = FacilityTypeId::new(2);

    struct Fixture {
        store: InMemoryClubStore,
        member: MemberId,
        locker: FacilityId,
        boat_space: FacilityId,
    }

    async fn fixture() -> Fixture {
        let store = InMemoryClubStore::new();
        store
            .insert_season(
                Season::new(
                    SEASON,
                    "2025",
                    "Season 2025",
                    NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                    NaiveDate::from_ymd_opt(2025, 10, 31).unwrap(),
                )
                .unwrap(),
            )
            .await;
        for (id, name, has_boat) in [
            (LOCKER, FacilityName::StandardLocker, false),
            (BOAT_SPACE, FacilityName::BoatSpaceVentena, true),
        ] {
            store
                .insert_facility_type(FacilityType {
                    id,
                    name,
                    description: String::new(),
                    suggested_price: Money::from_units(100),
                    has_boat,
                })
                .await;
        }
        let locker = store.insert_facility("L-01", LOCKER).await.unwrap().id;
        let boat_space = store.insert_facility("V-07", BOAT_SPACE).await.unwrap().id;

        let user = NewUser {
            first_name: "Marco".to_string(),
            last_name: "Bianchi".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1985, 2, 3).unwrap(),
            email: EmailAddress::new("marco@example.com").unwrap(),
            tax_code: "BNCMRC85".to_string(),
            addresses: vec![],
            phone_numbers: vec![],
        };
        let member = MemberId::from(store.create_member(user, None).await.unwrap().user.id);

        Fixture {
            store,
            member,
            locker,
            boat_space,
        }
    }

    fn request(f: &Fixture, facility_id: FacilityId, boat: Option<BoatInfo>) -> RentalRequest {
        RentalRequest {
            member_id: f.member,
            facility_id,
            season_id: SEASON,
            price: Money::from_units(60),
            boat,
        }
    }

    #[tokio::test]
    async fn rent_marks_facility_as_rented_for_the_season() {
        let f = fixture().await;
        let rental = f.store.rent_facility(&request(&f, f.locker, None)).await.unwrap();

        assert_eq!(rental.validity().to, NaiveDate::from_ymd_opt(2025, 10, 31).unwrap());
        assert_eq!(rental.payment(), &Payment::unpaid(Money::from_units(60), None));

        let lockers = f.store.get_facilities_by_type(LOCKER, SEASON).await.unwrap();
        let tenant = lockers[0].rented_by.as_ref().unwrap();
        assert_eq!(tenant.member_id, f.member);
        assert_eq!(tenant.last_name, "Bianchi");
    }

    #[tokio::test]
    async fn second_rental_of_same_facility_conflicts() {
        let f = fixture().await;
        f.store.rent_facility(&request(&f, f.locker, None)).await.unwrap();

        let err = f.store.rent_facility(&request(&f, f.locker, None)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::FacilityAlreadyRented);
        assert_eq!(
            err.details.get("facility_id"),
            Some(&f.locker.to_string())
        );
    }

    #[tokio::test]
    async fn freed_facility_can_be_rented_again() {
        let f = fixture().await;
        let first = f.store.rent_facility(&request(&f, f.locker, None)).await.unwrap();

        assert!(f.store.free_facility(first.id()).await.unwrap());
        assert!(!f.store.free_facility(first.id()).await.unwrap());

        let second = f.store.rent_facility(&request(&f, f.locker, None)).await.unwrap();
        assert_ne!(first.id(), second.id());
        assert_eq!(
            f.store
                .get_facilities_rented_by_member(f.member, SEASON)
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn boat_details_are_kept_with_the_rental() {
        let f = fixture().await;
        let boat = BoatInfo::new("Aurora", 6.5, 2.4, InsuranceInfo::Uninsured).unwrap();

        let rental = f
            .store
            .rent_facility(&request(&f, f.boat_space, Some(boat.clone())))
            .await
            .unwrap();
        assert_eq!(rental.boat(), Some(&boat));
    }

    #[tokio::test]
    async fn unknown_references_are_not_found() {
        let f = fixture().await;

        let err = f
            .store
            .rent_facility(&request(&f, FacilityId::new(999), None))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::FacilityNotFound);

        let mut bad_season = request(&f, f.locker, None);
        bad_season.season_id = SeasonId::new(1999);
        let err = f.store.rent_facility(&bad_season).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::SeasonNotFound);

        let mut bad_member = request(&f, f.locker, None);
        bad_member.member_id = MemberId::new(999);
        let err = f.store.rent_facility(&bad_member).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::MemberNotFound);
    }

    #[tokio::test]
    async fn unpaid_rental_flags_the_member() {
        let f = fixture().await;
        f.store.rent_facility(&request(&f, f.locker, None)).await.unwrap();
        assert!(f.store.state.read().await.has_unpaid_facilities(f.member));
    }
}
