//! Facility repository port.
//!
//! Catalog reads, pricing rules and the atomic rent/free operations.

use async_trait::async_trait;

use crate::domain::facility_rental::{
    FacilityType, FacilityWithStatus, PricingRule, RentalRequest, RentedFacility,
};
use crate::domain::foundation::{DomainError, FacilityTypeId, MemberId, RentedFacilityId, SeasonId};

/// Repository port for facilities and rentals.
///
/// Implementations must guarantee at most one active rental per facility.
#[async_trait]
pub trait FacilityRepository: Send + Sync {
    /// All facility types.
    async fn get_facilities_catalog(&self) -> Result<Vec<FacilityType>, DomainError>;

    /// Facilities of a type with their rental state in `season_id`.
    async fn get_facilities_by_type(
        &self,
        facility_type_id: FacilityTypeId,
        season_id: SeasonId,
    ) -> Result<Vec<FacilityWithStatus>, DomainError>;

    /// Active rentals held by a member in `season_id`.
    async fn get_facilities_rented_by_member(
        &self,
        member_id: MemberId,
        season_id: SeasonId,
    ) -> Result<Vec<RentedFacility>, DomainError>;

    /// Every pricing rule, active or not, in registration order.
    async fn get_pricing_rules(&self) -> Result<Vec<PricingRule>, DomainError>;

    /// Allocates a facility to a member.
    ///
    /// Atomic: the rental and its boat and insurance details are stored
    /// together or not at all.
    ///
    /// # Errors
    ///
    /// - `FacilityAlreadyRented` if the facility has an active rental
    ///   (detail `facility_id`)
    /// - `FacilityNotFound` / `SeasonNotFound` for unknown references
    /// - `DatabaseError` on persistence failure
    async fn rent_facility(&self, request: &RentalRequest) -> Result<RentedFacility, DomainError>;

    /// Soft-deletes an active rental, keeping its history.
    ///
    /// Returns `false` if no active rental has this id.
    async fn free_facility(&self, id: RentedFacilityId) -> Result<bool, DomainError>;
}
