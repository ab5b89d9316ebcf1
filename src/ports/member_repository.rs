//! Member repository port.
//!
//! Defines the contract for persisting users and their membership periods.
//! Implementations assign ids and membership numbers.
//!
//! # Example
//!
//! ```ignore
//! async fn open_season(
//!     repo: &dyn MemberRepository,
//!     member_id: MemberId,
//!     season: &Season,
//! ) -> Result<MemberDetails, DomainError> {
//!     let period = NewMembershipPeriod::for_season(season, SUGGESTED_MEMBERSHIP_FEE);
//!     repo.add_membership(member_id, &period).await
//! }
//! ```

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::club::Season;
use crate::domain::foundation::{DomainError, MemberId, Money, SeasonId};
use crate::domain::membership::{Member, MemberDetails, Membership, NewUser};

/// A membership period to open, spanning one season.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMembershipPeriod {
    pub season_id: SeasonId,
    pub valid_from: NaiveDate,
    pub valid_until: NaiveDate,

    /// Amount due; the period starts `Active` with an `Unpaid` payment.
    pub fee: Money,
}

impl NewMembershipPeriod {
    pub fn for_season(season: &Season, fee: Money) -> Self {
        Self {
            season_id: season.id,
            valid_from: season.starts_at,
            valid_until: season.ends_at,
            fee,
        }
    }
}

/// Repository port for members and membership periods.
#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// All members, each with their most recent membership period.
    async fn get_all_members(&self) -> Result<Vec<Member>, DomainError>;

    /// Members holding a membership period in `season_id`.
    async fn get_members_by_season(&self, season_id: SeasonId) -> Result<Vec<Member>, DomainError>;

    /// A member with their periods, restricted to `season_id` when given.
    ///
    /// Returns `None` if the member does not exist.
    async fn get_member_by_id(
        &self,
        id: MemberId,
        season_id: Option<SeasonId>,
    ) -> Result<Option<MemberDetails>, DomainError>;

    /// Registers a user, optionally opening their first membership period.
    ///
    /// # Errors
    ///
    /// - `MemberAlreadyExists` if the email or tax code is taken
    /// - `DatabaseError` on persistence failure
    async fn create_member(
        &self,
        user: NewUser,
        membership: Option<NewMembershipPeriod>,
    ) -> Result<MemberDetails, DomainError>;

    /// Opens a new membership period, keeping the member's number.
    ///
    /// # Errors
    ///
    /// - `MemberNotFound` if the member doesn't exist
    /// - `DatabaseError` on persistence failure
    async fn add_membership(
        &self,
        member_id: MemberId,
        period: &NewMembershipPeriod,
    ) -> Result<MemberDetails, DomainError>;

    /// Stores a renewed period in `season_id` as a new row with a fresh id,
    /// keeping `membership.number`. Earlier periods and their payments are
    /// left as they are.
    ///
    /// # Errors
    ///
    /// - `MemberNotFound` if the member doesn't exist
    /// - `SeasonNotFound` if the season doesn't exist
    /// - `MembershipAlreadyExists` if the member already holds a period in `season_id`
    /// - `DatabaseError` on persistence failure
    async fn insert_renewed_period(
        &self,
        member_id: MemberId,
        season_id: SeasonId,
        membership: &Membership,
    ) -> Result<Membership, DomainError>;

    /// Stores a transitioned membership period in place (matched by its id).
    ///
    /// # Errors
    ///
    /// - `MembershipNotFound` if the period doesn't exist
    /// - `DatabaseError` on persistence failure
    async fn update_membership(
        &self,
        member_id: MemberId,
        membership: &Membership,
    ) -> Result<(), DomainError>;

    /// Members with at least one unpaid rental.
    async fn get_members_who_did_not_pay_for_services(&self) -> Result<Vec<Member>, DomainError>;

    /// Members whose current membership fee is unpaid.
    async fn get_members_who_did_not_pay_for_membership(&self) -> Result<Vec<Member>, DomainError>;
}
