//! Strongly-typed identifier value objects.
//!
//! Identifiers are assigned by the persistence layer (database sequences),
//! so every id wraps the `i64` value it is stored under.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declares an `i64`-backed identifier newtype with the shared conversions.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw persisted value.
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the raw persisted value.
            pub const fn value(&self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.trim().parse()?))
            }
        }
    };
}

define_id!(
    /// Identity of a person registered with the club.
    UserId
);

define_id!(
    /// Identity of a club member.
    ///
    /// A member is a user seen through their memberships, so both ids share
    /// the same underlying value.
    MemberId
);

define_id!(
    /// Identity of one membership period row.
    MembershipId
);

define_id!(
    /// Club membership number, stable across renewals.
    MembershipNumber
);

define_id!(
    /// Identity of a club season.
    SeasonId
);

define_id!(
    /// Identity of a facility catalog entry.
    FacilityTypeId
);

define_id!(
    /// Identity of one physical facility.
    FacilityId
);

define_id!(
    /// Identity of a rental record.
    RentedFacilityId
);

define_id!(
    /// Identity of a waiting list entry.
    WaitingListEntryId
);

define_id!(
    /// Identity of a pricing rule.
    PricingRuleId
);

define_id!(
    /// Identity of a recorded payment.
    PaymentId
);

impl From<UserId> for MemberId {
    fn from(id: UserId) -> Self {
        MemberId(id.0)
    }
}

impl From<MemberId> for UserId {
    fn from(id: MemberId) -> Self {
        UserId(id.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_raw_value() {
        let id = FacilityTypeId::new(42);
        assert_eq!(id.value(), 42);
        assert_eq!(FacilityTypeId::from(42), id);
    }

    #[test]
    fn ids_display_raw_value() {
        assert_eq!(MemberId::new(7).to_string(), "7");
    }

    #[test]
    fn ids_parse_from_string() {
        let id: SeasonId = " 2025 ".parse().unwrap();
        assert_eq!(id, SeasonId::new(2025));
        assert!("abc".parse::<SeasonId>().is_err());
    }

    #[test]
    fn user_and_member_ids_share_value() {
        let user = UserId::new(11);
        let member: MemberId = user.into();
        assert_eq!(member.value(), 11);
        assert_eq!(UserId::from(member), user);
    }

    #[test]
    fn ids_serialize_transparently() {
        let json = serde_json::to_string(&PaymentId::new(5)).unwrap();
        assert_eq!(json, "5");
    }
}
