//! Facility rental module - catalog, rentals, discount pricing and waiting lists.

mod boat;
mod errors;
mod facility;
mod pricing;
mod rental;
mod waiting_list;

pub use boat::{BoatInfo, BoatInsurance, InsuranceInfo};
pub use errors::RentalError;
pub use facility::{Facility, FacilityName, FacilityTenant, FacilityType, FacilityWithStatus};
pub use pricing::{PricingRule, SuggestedPriceCalculator};
pub use rental::{RentalDetails, RentalRequest, RentalValidity, RentedFacility, RentedFacilityKind};
pub use waiting_list::{NewWaitingListEntry, WaitingList, WaitingListEntry};
