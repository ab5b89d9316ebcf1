//! Member views: a user together with their membership periods.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{MemberId, Money};

use super::{Membership, MembershipError, User};

/// A user seen through one membership period (usually the current season's).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub user: User,
    pub membership: Membership,

    /// True if any rental in the period is still unpaid.
    pub has_unpaid_facilities: bool,
}

impl Member {
    pub fn id(&self) -> MemberId {
        MemberId::from(self.user.id)
    }

    pub fn is_active(&self) -> bool {
        self.membership.is_active()
    }

    /// Only members in good standing may rent facilities.
    pub fn can_rent_facilities(&self) -> bool {
        self.is_active()
    }

    pub fn renew_membership(&self, fee: Money) -> Result<Self, MembershipError> {
        Ok(self.with_membership(self.membership.renew(fee)?))
    }

    pub fn mark_membership_unpaid(&self) -> Result<Self, MembershipError> {
        Ok(self.with_membership(self.membership.mark_unpaid()?))
    }

    pub fn deliberate_exclusion(&self, decision_date: NaiveDate) -> Result<Self, MembershipError> {
        Ok(self.with_membership(self.membership.deliberate_exclusion(decision_date)?))
    }

    pub fn exclude(&self, decision_date: NaiveDate) -> Result<Self, MembershipError> {
        Ok(self.with_membership(self.membership.exclude(decision_date)?))
    }

    fn with_membership(&self, membership: Membership) -> Self {
        Self {
            user: self.user.clone(),
            membership,
            has_unpaid_facilities: self.has_unpaid_facilities,
        }
    }
}

/// A user with the full history of their membership periods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDetails {
    pub user: User,
    pub memberships: Vec<Membership>,
}

impl MemberDetails {
    /// The period with the latest `valid_until`, if any.
    pub fn current_membership(&self) -> Option<&Membership> {
        self.memberships
            .iter()
            .filter(|m| m.status.valid_until().is_some())
            .max_by_key(|m| m.status.valid_until())
    }
}
