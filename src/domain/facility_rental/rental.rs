//! Rented facilities.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{
    FacilityId, FacilityTypeId, MemberId, Money, RentedFacilityId, SeasonId,
};
use crate::domain::payment::Payment;

use super::{BoatInfo, Facility};

/// Dates a rental is valid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentalValidity {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// Fields shared by every rental variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentalDetails {
    pub id: RentedFacilityId,
    pub member_id: MemberId,
    pub facility: Facility,
    pub validity: RentalValidity,
    pub price: Money,
    pub payment: Payment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RentedFacilityKind {
    SimpleFacility,
    BoatFacility,
}

impl fmt::Display for RentedFacilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RentedFacilityKind::SimpleFacility => write!(f, "SIMPLE_FACILITY"),
            RentedFacilityKind::BoatFacility => write!(f, "BOAT_FACILITY"),
        }
    }
}

/// A facility occupied by a member for a validity window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RentedFacility {
    Simple(RentalDetails),
    WithBoat {
        rental: RentalDetails,
        boat: BoatInfo,
    },
}

impl RentedFacility {
    /// Builds the variant matching the presence of boat details.
    pub fn new(rental: RentalDetails, boat: Option<BoatInfo>) -> Self {
        match boat {
            Some(boat) => RentedFacility::WithBoat { rental, boat },
            None => RentedFacility::Simple(rental),
        }
    }

    pub fn details(&self) -> &RentalDetails {
        match self {
            RentedFacility::Simple(rental) | RentedFacility::WithBoat { rental, .. } => rental,
        }
    }

    pub fn id(&self) -> RentedFacilityId {
        self.details().id
    }

    pub fn member_id(&self) -> MemberId {
        self.details().member_id
    }

    pub fn facility(&self) -> &Facility {
        &self.details().facility
    }

    pub fn facility_type_id(&self) -> FacilityTypeId {
        self.details().facility.facility_type.id
    }

    pub fn validity(&self) -> RentalValidity {
        self.details().validity
    }

    pub fn price(&self) -> Money {
        self.details().price
    }

    pub fn payment(&self) -> &Payment {
        &self.details().payment
    }

    pub fn kind(&self) -> RentedFacilityKind {
        match self {
            RentedFacility::Simple(_) => RentedFacilityKind::SimpleFacility,
            RentedFacility::WithBoat { .. } => RentedFacilityKind::BoatFacility,
        }
    }

    pub fn boat(&self) -> Option<&BoatInfo> {
        match self {
            RentedFacility::Simple(_) => None,
            RentedFacility::WithBoat { boat, .. } => Some(boat),
        }
    }

    /// Replaces the payment, keeping the variant and everything else.
    pub fn with_payment(self, payment: Payment) -> Self {
        match self {
            RentedFacility::Simple(rental) => {
                RentedFacility::Simple(RentalDetails { payment, ..rental })
            }
            RentedFacility::WithBoat { rental, boat } => RentedFacility::WithBoat {
                rental: RentalDetails { payment, ..rental },
                boat,
            },
        }
    }
}

/// Everything the facility repository needs to allocate a facility atomically.
#[derive(Debug, Clone, PartialEq)]
pub struct RentalRequest {
    pub member_id: MemberId,
    pub facility_id: FacilityId,
    pub season_id: SeasonId,
    pub price: Money,
    pub boat: Option<BoatInfo>,
}
