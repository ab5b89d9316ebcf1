//! In-memory `MemberRepository`.

use async_trait::async_trait;

use super::store::{InMemoryClubStore, MembershipRecord};
use crate::domain::foundation::{
    DomainError, ErrorCode, MemberId, MembershipId, MembershipNumber, SeasonId, UserId,
};
use crate::domain::membership::{Member, MemberDetails, Membership, NewUser};
use crate::ports::{MemberRepository, NewMembershipPeriod};

#[async_trait]
impl MemberRepository for InMemoryClubStore {
    async fn get_all_members(&self) -> Result<Vec<Member>, DomainError> {
        Ok(self.state.read().await.current_members())
    }

    async fn get_members_by_season(&self, season_id: SeasonId) -> Result<Vec<Member>, DomainError> {
        let state = self.state.read().await;
        let members = state
            .memberships
            .iter()
            .filter(|r| r.season_id == season_id)
            .filter_map(|r| {
                state
                    .users
                    .get(&UserId::from(r.member_id))
                    .map(|user| state.member_view(user, &r.membership))
            })
            .collect();
        Ok(members)
    }

    async fn get_member_by_id(
        &self,
        id: MemberId,
        season_id: Option<SeasonId>,
    ) -> Result<Option<MemberDetails>, DomainError> {
        let state = self.state.read().await;
        let Some(user) = state.users.get(&UserId::from(id)) else {
            return Ok(None);
        };

        let mut memberships: Vec<Membership> = state
            .memberships
            .iter()
            .filter(|r| r.member_id == id && season_id.map_or(true, |s| r.season_id == s))
            .map(|r| r.membership.clone())
            .collect();
        memberships.sort_by_key(|m| m.status.valid_from());

        Ok(Some(MemberDetails {
            user: user.clone(),
            memberships,
        }))
    }

    async fn create_member(
        &self,
        user: NewUser,
        membership: Option<NewMembershipPeriod>,
    ) -> Result<MemberDetails, DomainError> {
        let mut state = self.state.write().await;

        if let Some(existing) = state
            .users
            .values()
            .find(|u| u.email == user.email || u.tax_code == user.tax_code)
        {
            return Err(DomainError::new(
                ErrorCode::MemberAlreadyExists,
                format!("{} <{}>", existing.full_name(), existing.email),
            ));
        }
        if let Some(period) = &membership {
            state.season(period.season_id)?;
        }

        let user = user.with_id(UserId::new(state.next_id()));
        let member_id = MemberId::from(user.id);
        state.users.insert(user.id, user.clone());

        let mut memberships = Vec::new();
        if let Some(period) = membership {
            let opened = Membership::open(
                MembershipId::new(state.next_id()),
                MembershipNumber::new(state.next_membership_number()),
                period.valid_from,
                period.valid_until,
                period.fee,
            );
            state.memberships.push(MembershipRecord {
                member_id,
                season_id: period.season_id,
                membership: opened.clone(),
            });
            memberships.push(opened);
        }

        Ok(MemberDetails { user, memberships })
    }

    async fn add_membership(
        &self,
        member_id: MemberId,
        period: &NewMembershipPeriod,
    ) -> Result<MemberDetails, DomainError> {
        let mut state = self.state.write().await;
        let user = state.user(member_id)?.clone();
        state.season(period.season_id)?;

        if state
            .memberships
            .iter()
            .any(|r| r.member_id == member_id && r.season_id == period.season_id)
        {
            return Err(DomainError::new(
                ErrorCode::MembershipAlreadyExists,
                format!(
                    "Member {} already has a membership in season {}",
                    member_id, period.season_id
                ),
            )
            .with_detail("member_id", member_id.to_string())
            .with_detail("season_id", period.season_id.to_string()));
        }

        let number = match state.current_membership(member_id) {
            Some(current) => current.number,
            None => MembershipNumber::new(state.next_membership_number()),
        };
        let opened = Membership::open(
            MembershipId::new(state.next_id()),
            number,
            period.valid_from,
            period.valid_until,
            period.fee,
        );
        state.memberships.push(MembershipRecord {
            member_id,
            season_id: period.season_id,
            membership: opened,
        });

        let memberships = state
            .memberships
            .iter()
            .filter(|r| r.member_id == member_id)
            .map(|r| r.membership.clone())
            .collect();
        Ok(MemberDetails { user, memberships })
    }

    async fn insert_renewed_period(
        &self,
        member_id: MemberId,
        season_id: SeasonId,
        membership: &Membership,
    ) -> Result<Membership, DomainError> {
        let mut state = self.state.write().await;
        state.user(member_id)?;
        state.season(season_id)?;

        if state
            .memberships
            .iter()
            .any(|r| r.member_id == member_id && r.season_id == season_id)
        {
            return Err(DomainError::new(
                ErrorCode::MembershipAlreadyExists,
                format!(
                    "Member {} already has a membership in season {}",
                    member_id, season_id
                ),
            )
            .with_detail("member_id", member_id.to_string())
            .with_detail("season_id", season_id.to_string()));
        }

        let stored = Membership {
            id: MembershipId::new(state.next_id()),
            ..membership.clone()
        };
        state.memberships.push(MembershipRecord {
            member_id,
            season_id,
            membership: stored.clone(),
        });
        Ok(stored)
    }

    async fn update_membership(
        &self,
        member_id: MemberId,
        membership: &Membership,
    ) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        let record = state
            .memberships
            .iter_mut()
            .find(|r| r.member_id == member_id && r.membership.id == membership.id)
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::MembershipNotFound,
                    format!("Membership {} not found", membership.id),
                )
                .with_detail("member_id", member_id.to_string())
            })?;
        record.membership = membership.clone();
        Ok(())
    }

    async fn get_members_who_did_not_pay_for_services(&self) -> Result<Vec<Member>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .current_members()
            .into_iter()
            .filter(|m| m.has_unpaid_facilities)
            .collect())
    }

    async fn get_members_who_did_not_pay_for_membership(&self) -> Result<Vec<Member>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .current_members()
            .into_iter()
            .filter(|m| !m.membership.payment.is_paid())
            .collect())
    }
}
