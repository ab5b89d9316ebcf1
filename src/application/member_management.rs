//! MemberManagementService - member registration and membership lifecycle.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::domain::club::Season;
use crate::domain::foundation::{MemberId, Money, SeasonId};
use crate::domain::membership::{
    Member, MemberDetails, Membership, MembershipError, NewUser,
};
use crate::ports::{MemberRepository, NewMembershipPeriod, SeasonRepository};

/// Season and fee for a member's first membership period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitialMembership {
    pub season_id: SeasonId,
    pub price: Money,
}

#[derive(Clone)]
pub struct MemberManagementService {
    members: Arc<dyn MemberRepository>,
    seasons: Arc<dyn SeasonRepository>,
    membership_fee: Money,
}

impl MemberManagementService {
    /// `membership_fee` is charged on renewal.
    pub fn new(
        members: Arc<dyn MemberRepository>,
        seasons: Arc<dyn SeasonRepository>,
        membership_fee: Money,
    ) -> Self {
        Self {
            members,
            seasons,
            membership_fee,
        }
    }

    pub fn membership_fee(&self) -> Money {
        self.membership_fee
    }

    pub async fn get_all_members(&self) -> Result<Vec<Member>, MembershipError> {
        Ok(self.members.get_all_members().await?)
    }

    pub async fn get_members_by_season(
        &self,
        season_id: SeasonId,
    ) -> Result<Vec<Member>, MembershipError> {
        Ok(self.members.get_members_by_season(season_id).await?)
    }

    pub async fn get_member_by_id(
        &self,
        id: MemberId,
        season_id: Option<SeasonId>,
    ) -> Result<MemberDetails, MembershipError> {
        self.members
            .get_member_by_id(id, season_id)
            .await?
            .ok_or(MembershipError::MemberNotFound(id))
    }

    pub async fn get_members_who_did_not_pay_for_services(
        &self,
    ) -> Result<Vec<Member>, MembershipError> {
        Ok(self.members.get_members_who_did_not_pay_for_services().await?)
    }

    pub async fn get_members_who_did_not_pay_for_membership(
        &self,
    ) -> Result<Vec<Member>, MembershipError> {
        Ok(self.members.get_members_who_did_not_pay_for_membership().await?)
    }

    /// Registers a user, optionally opening their first membership period.
    pub async fn create_member(
        &self,
        user: NewUser,
        membership: Option<InitialMembership>,
    ) -> Result<MemberDetails, MembershipError> {
        let period = match membership {
            Some(initial) => {
                let season = self.season(initial.season_id).await?;
                Some(NewMembershipPeriod::for_season(&season, initial.price))
            }
            None => None,
        };

        let created = self.members.create_member(user, period).await?;

        info!(
            member_id = %created.user.id,
            with_membership = !created.memberships.is_empty(),
            "Member created"
        );
        Ok(created)
    }

    /// Opens a membership period spanning the season.
    pub async fn add_membership(
        &self,
        member_id: MemberId,
        season_id: SeasonId,
        price: Money,
    ) -> Result<MemberDetails, MembershipError> {
        let season = self.season(season_id).await?;
        let period = NewMembershipPeriod::for_season(&season, price);
        let details = self.members.add_membership(member_id, &period).await?;

        info!(
            member_id = %member_id,
            season_id = %season_id,
            price = %price,
            "Membership added"
        );
        Ok(details)
    }

    /// Renews the period held in `season_id` into `next_season_id`.
    ///
    /// The renewed period is stored as a new row; the previous period and
    /// its payment stay as they were.
    ///
    /// # Errors
    ///
    /// - `SeasonNotFound` if `next_season_id` is unknown
    /// - `InvalidState` unless the current period is `Active`
    /// - `PeriodAlreadyExists` if the period was already renewed or the
    ///   member already holds a period in `next_season_id`
    pub async fn renew_membership(
        &self,
        member_id: MemberId,
        season_id: SeasonId,
        next_season_id: SeasonId,
    ) -> Result<Membership, MembershipError> {
        self.season(next_season_id).await?;

        let details = self.get_member_by_id(member_id, Some(season_id)).await?;
        let current = details
            .current_membership()
            .ok_or(MembershipError::membership_not_found(member_id, Some(season_id)))?;

        let renewed = match current.renew(self.membership_fee) {
            Ok(renewed) => renewed,
            Err(err) => {
                debug!(
                    member_id = %member_id,
                    status = %current.kind(),
                    error = %err,
                    "Membership renewal rejected"
                );
                return Err(err);
            }
        };

        let history = self.get_member_by_id(member_id, None).await?;
        let superseded = history
            .memberships
            .iter()
            .any(|m| m.status.valid_until() > current.status.valid_until());
        if superseded {
            return Err(MembershipError::period_already_exists(member_id, next_season_id));
        }

        let stored = self
            .members
            .insert_renewed_period(member_id, next_season_id, &renewed)
            .await?;

        info!(
            member_id = %member_id,
            previous_membership_id = %current.id,
            membership_id = %stored.id,
            season_id = %next_season_id,
            "Membership renewed"
        );
        Ok(stored)
    }

    pub async fn mark_membership_unpaid(
        &self,
        member_id: MemberId,
        season_id: SeasonId,
    ) -> Result<Membership, MembershipError> {
        self.transition(member_id, season_id, "marked unpaid", Membership::mark_unpaid)
            .await
    }

    pub async fn deliberate_exclusion(
        &self,
        member_id: MemberId,
        season_id: SeasonId,
        decision_date: NaiveDate,
    ) -> Result<Membership, MembershipError> {
        self.transition(member_id, season_id, "exclusion deliberated", |m| {
            m.deliberate_exclusion(decision_date)
        })
        .await
    }

    pub async fn exclude_member(
        &self,
        member_id: MemberId,
        season_id: SeasonId,
        decision_date: NaiveDate,
    ) -> Result<Membership, MembershipError> {
        self.transition(member_id, season_id, "excluded", |m| m.exclude(decision_date))
            .await
    }

    async fn season(&self, id: SeasonId) -> Result<Season, MembershipError> {
        self.seasons
            .get_season_by_id(id)
            .await?
            .ok_or(MembershipError::SeasonNotFound(id))
    }

    /// Loads the season's membership, applies `apply` and stores the result.
    /// Nothing is written when the transition is rejected.
    async fn transition<F>(
        &self,
        member_id: MemberId,
        season_id: SeasonId,
        outcome: &str,
        apply: F,
    ) -> Result<Membership, MembershipError>
    where
        F: FnOnce(&Membership) -> Result<Membership, MembershipError>,
    {
        let details = self.get_member_by_id(member_id, Some(season_id)).await?;
        let current = details
            .current_membership()
            .ok_or(MembershipError::membership_not_found(member_id, Some(season_id)))?;

        let next = match apply(current) {
            Ok(next) => next,
            Err(err) => {
                debug!(
                    member_id = %member_id,
                    status = %current.kind(),
                    error = %err,
                    "Membership transition rejected"
                );
                return Err(err);
            }
        };

        self.members.update_membership(member_id, &next).await?;

        info!(
            member_id = %member_id,
            membership_id = %next.id,
            from = %current.kind(),
            to = %next.kind(),
            "Membership {}",
            outcome
        );
        Ok(next)
    }
}
