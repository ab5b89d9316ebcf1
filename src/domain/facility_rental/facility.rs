//! Facility catalog: types, physical facilities and their rental status.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{FacilityId, FacilityTypeId, MemberId, Money};

/// Catalog name of a facility type.
///
/// Names outside the known set are kept as `Other` so catalog rows
/// added by the club never fail to load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FacilityName {
    OpenBoardRack,
    BoatSpaceInDriftsArea,
    Box,
    ClosedBoardRack,
    LargeLocker,
    StandardLocker,
    SurfBoardStorageWorkshopArea,
    ClosedSupStorage,
    OutdoorCanoeRack,
    BoatSpaceVentena,
    BoatSpaceTavollo,
    Other(String),
}

impl FacilityName {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "OPEN_BOARD_RACK" => FacilityName::OpenBoardRack,
            "BOAT_SPACE_IN_DRIFTS_AREA" => FacilityName::BoatSpaceInDriftsArea,
            "BOX" => FacilityName::Box,
            "CLOSED_BOARD_RACK" => FacilityName::ClosedBoardRack,
            "LARGE_LOCKER" => FacilityName::LargeLocker,
            "STANDARD_LOCKER" => FacilityName::StandardLocker,
            "SURF_BOARD_STORAGE_WORKSHOP_AREA" => FacilityName::SurfBoardStorageWorkshopArea,
            "CLOSED_SUP_STORAGE" => FacilityName::ClosedSupStorage,
            "OUTDOOR_CANOE_RACK" => FacilityName::OutdoorCanoeRack,
            "BOAT_SPACE_VENTENA" => FacilityName::BoatSpaceVentena,
            "BOAT_SPACE_TAVOLLO" => FacilityName::BoatSpaceTavollo,
            other => FacilityName::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FacilityName::OpenBoardRack => "OPEN_BOARD_RACK",
            FacilityName::BoatSpaceInDriftsArea => "BOAT_SPACE_IN_DRIFTS_AREA",
            FacilityName::Box => "BOX",
            FacilityName::ClosedBoardRack => "CLOSED_BOARD_RACK",
            FacilityName::LargeLocker => "LARGE_LOCKER",
            FacilityName::StandardLocker => "STANDARD_LOCKER",
            FacilityName::SurfBoardStorageWorkshopArea => "SURF_BOARD_STORAGE_WORKSHOP_AREA",
            FacilityName::ClosedSupStorage => "CLOSED_SUP_STORAGE",
            FacilityName::OutdoorCanoeRack => "OUTDOOR_CANOE_RACK",
            FacilityName::BoatSpaceVentena => "BOAT_SPACE_VENTENA",
            FacilityName::BoatSpaceTavollo => "BOAT_SPACE_TAVOLLO",
            FacilityName::Other(name) => name,
        }
    }
}

impl fmt::Display for FacilityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for FacilityName {
    fn from(value: String) -> Self {
        FacilityName::parse(&value)
    }
}

impl From<FacilityName> for String {
    fn from(name: FacilityName) -> Self {
        name.as_str().to_string()
    }
}

/// Catalog entry a physical facility belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacilityType {
    pub id: FacilityTypeId,
    pub name: FacilityName,
    pub description: String,
    pub suggested_price: Money,

    /// Rentals of this type carry boat details.
    pub has_boat: bool,
}

/// One physical rentable asset, e.g. a rack slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facility {
    pub id: FacilityId,
    pub identifier: String,
    pub facility_type: FacilityType,
}

/// Who currently rents a facility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacilityTenant {
    pub member_id: MemberId,
    pub first_name: String,
    pub last_name: String,
    pub expires_at: NaiveDate,
}

/// Catalog row for a facility together with its rental state in a season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacilityWithStatus {
    pub facility: Facility,
    pub rented_by: Option<FacilityTenant>,
}

impl FacilityWithStatus {
    pub fn is_rented(&self) -> bool {
        self.rented_by.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_names_parse_and_render() {
        for raw in [
            "OPEN_BOARD_RACK",
            "BOAT_SPACE_IN_DRIFTS_AREA",
            "BOX",
            "CLOSED_BOARD_RACK",
            "LARGE_LOCKER",
            "STANDARD_LOCKER",
            "SURF_BOARD_STORAGE_WORKSHOP_AREA",
            "CLOSED_SUP_STORAGE",
            "OUTDOOR_CANOE_RACK",
            "BOAT_SPACE_VENTENA",
            "BOAT_SPACE_TAVOLLO",
        ] {
            let name = FacilityName::parse(raw);
            assert!(!matches!(name, FacilityName::Other(_)), "{} should be known", raw);
            assert_eq!(name.to_string(), raw);
        }
    }

    #[test]
    fn unknown_name_is_kept() {
        let name = FacilityName::parse("KAYAK_SHED");
        assert_eq!(name, FacilityName::Other("KAYAK_SHED".to_string()));
        assert_eq!(name.as_str(), "KAYAK_SHED");
    }

    #[test]
    fn name_serializes_as_plain_string() {
        let json = serde_json::to_string(&FacilityName::LargeLocker).unwrap();
        assert_eq!(json, "\"LARGE_LOCKER\"");
        let back: FacilityName = serde_json::from_str(&json).unwrap();
        assert_eq!(back, FacilityName::LargeLocker);
    }

    #[test]
    fn facility_without_tenant_is_free() {
        let facility = Facility {
            id: FacilityId::new(1),
            identifier: "A-01".to_string(),
            facility_type: FacilityType {
                id: FacilityTypeId::new(1),
                name: FacilityName::Box,
                description: "Box".to_string(),
                suggested_price: Money::from_units(100),
                has_boat: false,
            },
        };
        let row = FacilityWithStatus {
            facility,
            rented_by: None,
        };
        assert!(!row.is_rented());
    }
}
