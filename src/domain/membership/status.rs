//! Membership status state machine.
//!
//! A membership period moves along
//! `Active → Unpaid → ExclusionDeliberated → Excluded`, with
//! `Active → Active` (renewal) as the only cycle. `Expired` and `None`
//! are informational placeholders for members without a current period.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{StateMachine, ValidationError};

/// Dates a membership period is valid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipValidity {
    pub valid_from: NaiveDate,
    pub valid_until: NaiveDate,
}

impl MembershipValidity {
    pub fn new(valid_from: NaiveDate, valid_until: NaiveDate) -> Self {
        Self {
            valid_from,
            valid_until,
        }
    }

    /// True if `date` falls within the period, bounds included.
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.valid_from <= date && date <= self.valid_until
    }
}

/// Data-less discriminant of [`MembershipStatus`], used for the transition graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MembershipStatusKind {
    /// In good standing.
    Active,

    /// Payment lapsed, not yet excluded.
    Unpaid,

    /// The board decided to exclude the member; formal exclusion pending.
    ExclusionDeliberated,

    /// Excluded from the club. Terminal.
    Excluded,

    /// Period ended without renewal.
    Expired,

    /// No membership period on record.
    None,
}

impl MembershipStatusKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipStatusKind::Active => "ACTIVE",
            MembershipStatusKind::Unpaid => "UNPAID",
            MembershipStatusKind::ExclusionDeliberated => "EXCLUSION_DELIBERATED",
            MembershipStatusKind::Excluded => "EXCLUDED",
            MembershipStatusKind::Expired => "EXPIRED",
            MembershipStatusKind::None => "NONE",
        }
    }
}

impl fmt::Display for MembershipStatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MembershipStatusKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ACTIVE" => Ok(MembershipStatusKind::Active),
            "UNPAID" => Ok(MembershipStatusKind::Unpaid),
            "EXCLUSION_DELIBERATED" => Ok(MembershipStatusKind::ExclusionDeliberated),
            "EXCLUDED" => Ok(MembershipStatusKind::Excluded),
            "EXPIRED" => Ok(MembershipStatusKind::Expired),
            "NONE" => Ok(MembershipStatusKind::None),
            other => Err(ValidationError::invalid_format(
                "membership_status",
                format!("unknown status '{}'", other),
            )),
        }
    }
}

impl StateMachine for MembershipStatusKind {
    fn can_transition_to(&self, target: &Self) -> bool {
        use MembershipStatusKind::*;
        matches!(
            (self, target),
            (Active, Active) // Renewal
                | (Active, Unpaid)
                | (Unpaid, ExclusionDeliberated)
                | (ExclusionDeliberated, Excluded)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use MembershipStatusKind::*;
        match self {
            Active => vec![Active, Unpaid],
            Unpaid => vec![ExclusionDeliberated],
            ExclusionDeliberated => vec![Excluded],
            Excluded | Expired | None => vec![],
        }
    }
}

/// Status of a membership period together with the data each state carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MembershipStatus {
    Active {
        validity: MembershipValidity,
    },
    Unpaid {
        validity: MembershipValidity,
    },
    ExclusionDeliberated {
        validity: MembershipValidity,
        decision_date: NaiveDate,
    },
    Excluded {
        validity: MembershipValidity,
        decision_date: NaiveDate,
    },
    Expired {
        validity: MembershipValidity,
    },
    None,
}

impl MembershipStatus {
    pub fn active(valid_from: NaiveDate, valid_until: NaiveDate) -> Self {
        MembershipStatus::Active {
            validity: MembershipValidity::new(valid_from, valid_until),
        }
    }

    pub fn kind(&self) -> MembershipStatusKind {
        match self {
            MembershipStatus::Active { .. } => MembershipStatusKind::Active,
            MembershipStatus::Unpaid { .. } => MembershipStatusKind::Unpaid,
            MembershipStatus::ExclusionDeliberated { .. } => {
                MembershipStatusKind::ExclusionDeliberated
            }
            MembershipStatus::Excluded { .. } => MembershipStatusKind::Excluded,
            MembershipStatus::Expired { .. } => MembershipStatusKind::Expired,
            MembershipStatus::None => MembershipStatusKind::None,
        }
    }

    /// Validity window; `None` only for the `None` placeholder.
    pub fn validity(&self) -> Option<MembershipValidity> {
        match self {
            MembershipStatus::Active { validity }
            | MembershipStatus::Unpaid { validity }
            | MembershipStatus::ExclusionDeliberated { validity, .. }
            | MembershipStatus::Excluded { validity, .. }
            | MembershipStatus::Expired { validity } => Some(*validity),
            MembershipStatus::None => None,
        }
    }

    pub fn valid_from(&self) -> Option<NaiveDate> {
        self.validity().map(|v| v.valid_from)
    }

    pub fn valid_until(&self) -> Option<NaiveDate> {
        self.validity().map(|v| v.valid_until)
    }

    /// Board decision date for exclusion states.
    pub fn decision_date(&self) -> Option<NaiveDate> {
        match self {
            MembershipStatus::ExclusionDeliberated { decision_date, .. }
            | MembershipStatus::Excluded { decision_date, .. } => Some(*decision_date),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use MembershipStatusKind::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn active_can_renew_to_active() {
        assert_eq!(Active.transition_to(Active), Ok(Active));
    }

    #[test]
    fn active_can_lapse_to_unpaid() {
        assert_eq!(Active.transition_to(Unpaid), Ok(Unpaid));
    }

    #[test]
    fn unpaid_can_move_to_exclusion_deliberated() {
        assert_eq!(
            Unpaid.transition_to(ExclusionDeliberated),
            Ok(ExclusionDeliberated)
        );
    }

    #[test]
    fn exclusion_deliberated_can_be_excluded() {
        assert_eq!(ExclusionDeliberated.transition_to(Excluded), Ok(Excluded));
    }

    #[test]
    fn exclusion_requires_deliberation_first() {
        assert!(!Active.can_transition_to(&Excluded));
        assert!(!Unpaid.can_transition_to(&Excluded));
        assert!(Active.transition_to(Excluded).is_err());
    }

    #[test]
    fn deliberation_requires_unpaid() {
        assert!(!Active.can_transition_to(&ExclusionDeliberated));
    }

    #[test]
    fn excluded_is_terminal() {
        assert!(Excluded.is_terminal());
        for target in [Active, Unpaid, ExclusionDeliberated, Excluded, Expired, None] {
            assert!(!Excluded.can_transition_to(&target));
        }
    }

    #[test]
    fn placeholders_have_no_transitions() {
        assert!(Expired.is_terminal());
        assert!(None.is_terminal());
    }

    #[test]
    fn valid_transitions_are_consistent_with_can_transition_to() {
        for status in [Active, Unpaid, ExclusionDeliberated, Excluded, Expired, None] {
            for target in status.valid_transitions() {
                assert!(status.can_transition_to(&target), "{:?} -> {:?}", status, target);
            }
        }
    }

    #[test]
    fn kind_parses_from_display() {
        for status in [Active, Unpaid, ExclusionDeliberated, Excluded, Expired, None] {
            assert_eq!(status.to_string().parse::<MembershipStatusKind>(), Ok(status));
        }
        assert!("SUSPENDED".parse::<MembershipStatusKind>().is_err());
    }

    #[test]
    fn status_exposes_validity_and_decision_date() {
        let validity = MembershipValidity::new(date(2025, 1, 1), date(2025, 12, 31));
        let status = MembershipStatus::Excluded {
            validity,
            decision_date: date(2025, 6, 15),
        };
        assert_eq!(status.kind(), Excluded);
        assert_eq!(status.valid_until(), Some(date(2025, 12, 31)));
        assert_eq!(status.decision_date(), Some(date(2025, 6, 15)));

        assert_eq!(MembershipStatus::None.validity(), Option::None);
    }

    #[test]
    fn validity_covers_inclusive_range() {
        let validity = MembershipValidity::new(date(2025, 1, 1), date(2025, 12, 31));
        assert!(validity.covers(date(2025, 12, 31)));
        assert!(!validity.covers(date(2026, 1, 1)));
    }
}
