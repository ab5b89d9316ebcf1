//! ClubServices - wires the application services to a set of repositories.

use std::sync::Arc;

use crate::domain::facility_rental::RentalError;
use crate::domain::foundation::Money;
use crate::ports::{
    FacilityRepository, MemberRepository, PaymentRepository, SeasonRepository,
    WaitingListRepository,
};

use super::{
    MemberManagementService, PaymentManagementService, RentalManagementService,
    WaitingListManagementService,
};

/// Every port the club services depend on.
#[derive(Clone)]
pub struct ClubRepositories {
    pub members: Arc<dyn MemberRepository>,
    pub seasons: Arc<dyn SeasonRepository>,
    pub facilities: Arc<dyn FacilityRepository>,
    pub waiting_list: Arc<dyn WaitingListRepository>,
    pub payments: Arc<dyn PaymentRepository>,
}

/// The application services sharing one set of repositories.
///
/// Cloned freely; every service holds `Arc`s only.
#[derive(Clone)]
pub struct ClubServices {
    pub members: MemberManagementService,
    pub rentals: RentalManagementService,
    pub waiting_list: WaitingListManagementService,
    pub payments: PaymentManagementService,
}

impl ClubServices {
    /// Builds the services. Fails only if the pricing rules cannot be read.
    pub async fn new(
        repositories: ClubRepositories,
        membership_fee: Money,
    ) -> Result<Self, RentalError> {
        let rentals = RentalManagementService::new(
            repositories.facilities.clone(),
            repositories.waiting_list.clone(),
        )
        .await?;

        Ok(Self {
            members: MemberManagementService::new(
                repositories.members,
                repositories.seasons,
                membership_fee,
            ),
            rentals,
            waiting_list: WaitingListManagementService::new(repositories.waiting_list),
            payments: PaymentManagementService::new(repositories.payments),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryClubStore;
    use crate::domain::facility_rental::PricingRule;
    use crate::domain::foundation::{FacilityTypeId, PricingRuleId};

    fn rule(id: i64, active: bool) -> PricingRule {
        PricingRule {
            id: PricingRuleId::new(id),
            facility_type_id: FacilityTypeId::new(1),
            required_facility_type_id: FacilityTypeId::new(2),
            special_price: Money::from_units(60),
            description: "Locker discount for boat owners".to_string(),
            active,
        }
    }

    #[tokio::test]
    async fn services_share_the_loaded_pricing_rules() {
        let store = InMemoryClubStore::new();
        store.insert_pricing_rule(rule(1, true)).await;
        store.insert_pricing_rule(rule(2, false)).await;

        let services = ClubServices::new(store.repositories(), Money::from_units(130))
            .await
            .unwrap();

        assert_eq!(services.rentals.price_calculator().rule_count(), 1);
        assert_eq!(services.members.membership_fee(), Money::from_units(130));
        let cloned = services.clone();
        assert_eq!(cloned.rentals.price_calculator().rule_count(), 1);
    }
}
