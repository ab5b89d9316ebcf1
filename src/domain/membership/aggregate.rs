//! Membership aggregate.
//!
//! A `Membership` is one season's period for a member. Transitions are pure:
//! each returns a new value and leaves the receiver untouched, so the
//! previous period stays available for history.
//!
//! # Invariants
//!
//! - `number` never changes across transitions
//! - In-place transitions keep `id`; a renewal is stored as a new period
//!   and gets its own `id` from the repository
//! - Status changes follow [`MembershipStatusKind`]'s state machine
//! - Renewal anchors on the previous `valid_until`, never on "today"

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{MembershipId, MembershipNumber, Money, StateMachine};
use crate::domain::payment::Payment;

use super::{MembershipError, MembershipStatus, MembershipStatusKind, MembershipValidity};

/// Standard yearly membership fee.
pub const SUGGESTED_MEMBERSHIP_FEE: Money = Money::from_units(130);

const MEMBERSHIP_PERIOD: Months = Months::new(12);

/// One membership period with its status and payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub id: MembershipId,

    /// Club membership number, stable across renewals.
    pub number: MembershipNumber,

    pub status: MembershipStatus,

    pub payment: Payment,
}

impl Membership {
    /// Opens a new active period with an outstanding payment of `fee`.
    pub fn open(
        id: MembershipId,
        number: MembershipNumber,
        valid_from: NaiveDate,
        valid_until: NaiveDate,
        fee: Money,
    ) -> Self {
        Self {
            id,
            number,
            status: MembershipStatus::active(valid_from, valid_until),
            payment: Payment::unpaid(fee, Some(valid_from)),
        }
    }

    pub fn kind(&self) -> MembershipStatusKind {
        self.status.kind()
    }

    pub fn is_active(&self) -> bool {
        self.kind() == MembershipStatusKind::Active
    }

    /// Renews for the next yearly period.
    ///
    /// The new period starts at the previous `valid_until` and ends exactly
    /// one calendar year later (Feb 29 clamps to Feb 28). The payment is
    /// reset to `Unpaid` for `fee`, due on the previous end date.
    ///
    /// The receiver is the previous period and stays untouched.
    ///
    /// # Errors
    ///
    /// `InvalidState` unless the membership is `Active`.
    pub fn renew(&self, fee: Money) -> Result<Self, MembershipError> {
        let validity = self.require(MembershipStatusKind::Active, "renew")?;
        let previous_end = validity.valid_until;
        let next_end = previous_end
            .checked_add_months(MEMBERSHIP_PERIOD)
            .ok_or_else(|| {
                MembershipError::validation("valid_until", "renewal date out of range")
            })?;

        Ok(Self {
            id: self.id,
            number: self.number,
            status: MembershipStatus::active(previous_end, next_end),
            payment: Payment::unpaid(fee, Some(previous_end)),
        })
    }

    /// Records that the period's payment has lapsed.
    ///
    /// # Errors
    ///
    /// `InvalidState` unless the membership is `Active`.
    pub fn mark_unpaid(&self) -> Result<Self, MembershipError> {
        let validity = self.require(MembershipStatusKind::Unpaid, "mark unpaid")?;
        Ok(self.with_status(MembershipStatus::Unpaid { validity }))
    }

    /// Records the board's decision to exclude the member.
    ///
    /// # Errors
    ///
    /// `InvalidState` unless the membership is `Unpaid`.
    pub fn deliberate_exclusion(&self, decision_date: NaiveDate) -> Result<Self, MembershipError> {
        let validity = self.require(
            MembershipStatusKind::ExclusionDeliberated,
            "deliberate exclusion of",
        )?;
        Ok(self.with_status(MembershipStatus::ExclusionDeliberated {
            validity,
            decision_date,
        }))
    }

    /// Formally excludes the member. Payment history is kept as recorded.
    ///
    /// # Errors
    ///
    /// `InvalidState` unless the membership is `ExclusionDeliberated`.
    pub fn exclude(&self, decision_date: NaiveDate) -> Result<Self, MembershipError> {
        let validity = self.require(MembershipStatusKind::Excluded, "exclude")?;
        Ok(self.with_status(MembershipStatus::Excluded {
            validity,
            decision_date,
        }))
    }

    /// Replaces the payment, e.g. once the fee has been collected.
    pub fn with_payment(&self, payment: Payment) -> Self {
        Self {
            payment,
            ..self.clone()
        }
    }

    /// Checks the edge to `target` and returns the current validity window.
    fn require(
        &self,
        target: MembershipStatusKind,
        action: &str,
    ) -> Result<MembershipValidity, MembershipError> {
        let current = self.kind();
        current
            .transition_to(target)
            .map_err(|_| MembershipError::invalid_state(current, action))?;
        self.status
            .validity()
            .ok_or_else(|| MembershipError::invalid_state(current, action))
    }

    fn with_status(&self, status: MembershipStatus) -> Self {
        Self {
            id: self.id,
            number: self.number,
            status,
            payment: self.payment.clone(),
        }
    }
}
