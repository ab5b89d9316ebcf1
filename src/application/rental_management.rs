//! RentalManagementService - facility allocation, pricing and freeing.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::facility_rental::{
    FacilityType, FacilityWithStatus, PricingRule, RentalError, RentalRequest, RentedFacility,
    SuggestedPriceCalculator,
};
use crate::domain::foundation::{
    FacilityTypeId, MemberId, Money, RentedFacilityId, SeasonId, ValidationError,
};
use crate::ports::{FacilityRepository, WaitingListRepository};

/// Orchestrates rentals, discount pricing and waiting-list bookkeeping.
///
/// Cheap to clone; the pricing index is shared and never mutated.
#[derive(Clone)]
pub struct RentalManagementService {
    facilities: Arc<dyn FacilityRepository>,
    waiting_list: Arc<dyn WaitingListRepository>,
    price_calculator: Arc<SuggestedPriceCalculator>,
}

impl RentalManagementService {
    /// Builds the service, reading the pricing rules once.
    pub async fn new(
        facilities: Arc<dyn FacilityRepository>,
        waiting_list: Arc<dyn WaitingListRepository>,
    ) -> Result<Self, RentalError> {
        let rules = facilities.get_pricing_rules().await?;
        let price_calculator = SuggestedPriceCalculator::new(rules);

        info!(
            active_rules = price_calculator.rule_count(),
            "Pricing rules loaded"
        );

        Ok(Self {
            facilities,
            waiting_list,
            price_calculator: Arc::new(price_calculator),
        })
    }

    pub fn price_calculator(&self) -> &SuggestedPriceCalculator {
        &self.price_calculator
    }

    /// Rents a facility to a member.
    ///
    /// The allocation is delegated atomically to the repository and its
    /// errors are returned unchanged. Afterwards the member is dropped
    /// from the waiting list for the facility's type on a best-effort basis.
    pub async fn rent_facility(&self, request: RentalRequest) -> Result<RentedFacility, RentalError> {
        if request.price.is_negative() {
            return Err(ValidationError::out_of_range(
                "price",
                0,
                i64::MAX,
                request.price.cents(),
            )
            .into());
        }

        let rented = self.facilities.rent_facility(&request).await?;

        info!(
            rented_facility_id = %rented.id(),
            facility_id = %request.facility_id,
            member_id = %request.member_id,
            season_id = %request.season_id,
            price = %request.price,
            kind = %rented.kind(),
            "Facility rented"
        );

        // Best effort, result discarded: the rental above is committed and
        // stays valid whatever happens to the queue.
        let facility_type_id = rented.facility_type_id();
        match self
            .waiting_list
            .remove_entry_by_member_and_type(facility_type_id, request.member_id)
            .await
        {
            Ok(Some(entry)) => info!(
                entry_id = %entry.id,
                member_id = %request.member_id,
                facility_type_id = %facility_type_id,
                "Removed member from waiting list after rental"
            ),
            Ok(None) => {}
            Err(err) => warn!(
                error = %err,
                member_id = %request.member_id,
                facility_type_id = %facility_type_id,
                "Waiting list cleanup failed after rental"
            ),
        }

        Ok(rented)
    }

    /// Marks a rental inactive, keeping its history.
    pub async fn free_facility(&self, id: RentedFacilityId) -> Result<(), RentalError> {
        if !self.facilities.free_facility(id).await? {
            return Err(RentalError::RentedFacilityNotFound(id));
        }
        info!(rented_facility_id = %id, "Facility freed");
        Ok(())
    }

    /// Price for `facility_type_id` after the member's discounts for the season.
    pub async fn get_suggested_price_for_member(
        &self,
        facility_type_id: FacilityTypeId,
        base_price: Money,
        member_id: MemberId,
        season_id: SeasonId,
    ) -> Result<Money, RentalError> {
        let held = self.rented_type_ids(member_id, season_id).await?;
        let price = self
            .price_calculator
            .calculate_suggested_price(facility_type_id, base_price, &held);

        debug!(
            facility_type_id = %facility_type_id,
            member_id = %member_id,
            base_price = %base_price,
            price = %price,
            "Suggested price computed"
        );
        Ok(price)
    }

    /// Pricing rules the member qualifies for, in registration order.
    pub async fn get_applicable_discounts_for_member(
        &self,
        facility_type_id: FacilityTypeId,
        member_id: MemberId,
        season_id: SeasonId,
    ) -> Result<Vec<PricingRule>, RentalError> {
        let held = self.rented_type_ids(member_id, season_id).await?;
        Ok(self
            .price_calculator
            .applicable_pricing_rules(facility_type_id, &held))
    }

    pub async fn get_facilities_catalog(&self) -> Result<Vec<FacilityType>, RentalError> {
        Ok(self.facilities.get_facilities_catalog().await?)
    }

    pub async fn get_facilities_by_type(
        &self,
        facility_type_id: FacilityTypeId,
        season_id: SeasonId,
    ) -> Result<Vec<FacilityWithStatus>, RentalError> {
        Ok(self
            .facilities
            .get_facilities_by_type(facility_type_id, season_id)
            .await?)
    }

    pub async fn get_facilities_rented_by_member(
        &self,
        member_id: MemberId,
        season_id: SeasonId,
    ) -> Result<Vec<RentedFacility>, RentalError> {
        Ok(self
            .facilities
            .get_facilities_rented_by_member(member_id, season_id)
            .await?)
    }

    async fn rented_type_ids(
        &self,
        member_id: MemberId,
        season_id: SeasonId,
    ) -> Result<Vec<FacilityTypeId>, RentalError> {
        let rented = self
            .facilities
            .get_facilities_rented_by_member(member_id, season_id)
            .await?;
        Ok(rented.iter().map(RentedFacility::facility_type_id).collect())
    }
}
