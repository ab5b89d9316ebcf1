//! Shared in-memory state behind every in-memory repository.
//!
//! One store implements all club ports so that cross-aggregate reads
//! (member views needing rental payment state, payments updating the
//! period they settle) see a single consistent snapshot.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::club::Season;
use crate::domain::facility_rental::{Facility, FacilityType, PricingRule, RentedFacility, WaitingListEntry};
use crate::domain::foundation::{
    DomainError, ErrorCode, FacilityId, FacilityTypeId, MemberId, MembershipId, PaymentId,
    RentedFacilityId, SeasonId, Timestamp, UserId,
};
use crate::domain::membership::{Member, Membership, User};
use crate::domain::payment::PaymentDetails;
use crate::ports::SeasonRepository;

/// In-memory implementation of every club repository.
///
/// Cloning is cheap and clones share state, so the same store can be
/// handed to several services as different `Arc<dyn Port>`s.
#[derive(Debug, Clone, Default)]
pub struct InMemoryClubStore {
    pub(super) state: Arc<RwLock<ClubState>>,
}

/// A membership period together with the member and season it belongs to.
#[derive(Debug, Clone)]
pub(super) struct MembershipRecord {
    pub member_id: MemberId,
    pub season_id: SeasonId,
    pub membership: Membership,
}

/// A rental row. `freed_at` is set instead of deleting the row.
#[derive(Debug, Clone)]
pub(super) struct RentalRecord {
    pub rental: RentedFacility,
    pub season_id: SeasonId,
    pub freed_at: Option<Timestamp>,
}

impl RentalRecord {
    pub fn is_active(&self) -> bool {
        self.freed_at.is_none()
    }
}

/// What a recorded payment settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum PaymentTarget {
    Membership(MembershipId),
    Rental(RentedFacilityId),
}

#[derive(Debug, Clone)]
pub(super) struct PaymentRecord {
    pub target: PaymentTarget,
    pub details: PaymentDetails,
}

#[derive(Debug, Default)]
pub(super) struct ClubState {
    pub seasons: BTreeMap<SeasonId, Season>,
    pub users: BTreeMap<UserId, User>,
    pub memberships: Vec<MembershipRecord>,
    pub facility_types: BTreeMap<FacilityTypeId, FacilityType>,
    pub facilities: BTreeMap<FacilityId, Facility>,
    pub rentals: Vec<RentalRecord>,
    pub pricing_rules: Vec<PricingRule>,
    pub waiting_list: Vec<WaitingListEntry>,
    pub payments: BTreeMap<PaymentId, PaymentRecord>,
    last_id: i64,
    last_membership_number: i64,
}

impl ClubState {
    /// Next value of the store-wide id sequence.
    pub fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    pub fn next_membership_number(&mut self) -> i64 {
        self.last_membership_number += 1;
        self.last_membership_number
    }

    pub fn season(&self, id: SeasonId) -> Result<&Season, DomainError> {
        self.seasons.get(&id).ok_or_else(|| {
            DomainError::new(ErrorCode::SeasonNotFound, format!("Season not found: {}", id))
                .with_detail("season_id", id.to_string())
        })
    }

    pub fn user(&self, id: MemberId) -> Result<&User, DomainError> {
        self.users.get(&UserId::from(id)).ok_or_else(|| {
            DomainError::new(ErrorCode::MemberNotFound, format!("Member not found: {}", id))
                .with_detail("member_id", id.to_string())
        })
    }

    /// True if the member holds an active rental whose payment is outstanding.
    pub fn has_unpaid_facilities(&self, member_id: MemberId) -> bool {
        self.rentals.iter().any(|r| {
            r.is_active() && r.rental.member_id() == member_id && !r.rental.payment().is_paid()
        })
    }

    pub fn member_view(&self, user: &User, membership: &Membership) -> Member {
        Member {
            user: user.clone(),
            membership: membership.clone(),
            has_unpaid_facilities: self.has_unpaid_facilities(MemberId::from(user.id)),
        }
    }

    /// The member's period with the latest `valid_until`.
    pub fn current_membership(&self, member_id: MemberId) -> Option<&Membership> {
        self.memberships
            .iter()
            .filter(|r| r.member_id == member_id)
            .map(|r| &r.membership)
            .max_by_key(|m| m.status.valid_until())
    }

    /// Every member that holds at least one period, seen through their current one.
    pub fn current_members(&self) -> Vec<Member> {
        self.users
            .values()
            .filter_map(|user| {
                self.current_membership(MemberId::from(user.id))
                    .map(|membership| self.member_view(user, membership))
            })
            .collect()
    }
}

impl InMemoryClubStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a season.
    pub async fn insert_season(&self, season: Season) {
        self.state.write().await.seasons.insert(season.id, season);
    }

    /// Registers a catalog entry.
    pub async fn insert_facility_type(&self, facility_type: FacilityType) {
        self.state
            .write()
            .await
            .facility_types
            .insert(facility_type.id, facility_type);
    }

    /// Adds a physical facility of an already registered type.
    ///
    /// # Errors
    ///
    /// `FacilityNotFound` if the type is unknown.
    pub async fn insert_facility(
        &self,
        identifier: impl Into<String>,
        facility_type_id: FacilityTypeId,
    ) -> Result<Facility, DomainError> {
        let mut state = self.state.write().await;
        let facility_type = state
            .facility_types
            .get(&facility_type_id)
            .cloned()
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::FacilityNotFound,
                    format!("Facility type not found: {}", facility_type_id),
                )
            })?;
        let facility = Facility {
            id: FacilityId::new(state.next_id()),
            identifier: identifier.into(),
            facility_type,
        };
        state.facilities.insert(facility.id, facility.clone());
        Ok(facility)
    }

    /// Appends a pricing rule; rules keep their registration order.
    pub async fn insert_pricing_rule(&self, rule: PricingRule) {
        self.state.write().await.pricing_rules.push(rule);
    }
}

#[async_trait]
impl SeasonRepository for InMemoryClubStore {
    async fn get_season_by_id(&self, id: SeasonId) -> Result<Option<Season>, DomainError> {
        Ok(self.state.read().await.seasons.get(&id).cloned())
    }
}
