//! In-memory `WaitingListRepository`.

use async_trait::async_trait;

use super::store::InMemoryClubStore;
use crate::domain::facility_rental::{NewWaitingListEntry, WaitingList, WaitingListEntry};
use crate::domain::foundation::{DomainError, FacilityTypeId, MemberId, WaitingListEntryId};
use crate::ports::WaitingListRepository;

#[async_trait]
impl WaitingListRepository for InMemoryClubStore {
    async fn get_waiting_list(
        &self,
        facility_type_id: FacilityTypeId,
    ) -> Result<WaitingList, DomainError> {
        let state = self.state.read().await;
        let entries = state
            .waiting_list
            .iter()
            .filter(|e| e.facility_type_id == facility_type_id)
            .cloned()
            .collect();
        Ok(WaitingList::new(facility_type_id, entries))
    }

    async fn get_next_entry(
        &self,
        facility_type_id: FacilityTypeId,
    ) -> Result<Option<WaitingListEntry>, DomainError> {
        let list = self.get_waiting_list(facility_type_id).await?;
        Ok(list.head().cloned())
    }

    /// A member already queued for the type gets their existing entry back,
    /// mirroring the unique (member, type) constraint of the SQL schema.
    async fn add_entry(&self, entry: NewWaitingListEntry) -> Result<WaitingListEntry, DomainError> {
        let mut state = self.state.write().await;
        if let Some(existing) = state
            .waiting_list
            .iter()
            .find(|e| e.facility_type_id == entry.facility_type_id && e.member_id == entry.member_id)
        {
            return Ok(existing.clone());
        }

        let stored = entry.with_id(WaitingListEntryId::new(state.next_id()));
        state.waiting_list.push(stored.clone());
        Ok(stored)
    }

    async fn remove_entry(
        &self,
        id: WaitingListEntryId,
    ) -> Result<Option<WaitingListEntry>, DomainError> {
        let mut state = self.state.write().await;
        let idx = state.waiting_list.iter().position(|e| e.id == id);
        Ok(idx.map(|i| state.waiting_list.remove(i)))
    }

    async fn remove_entry_by_member_and_type(
        &self,
        facility_type_id: FacilityTypeId,
        member_id: MemberId,
    ) -> Result<Option<WaitingListEntry>, DomainError> {
        let mut state = self.state.write().await;
        let idx = state
            .waiting_list
            .iter()
            .position(|e| e.facility_type_id == facility_type_id && e.member_id == member_id);
        Ok(idx.map(|i| state.waiting_list.remove(i)))
    }

    async fn get_member_entry(
        &self,
        facility_type_id: FacilityTypeId,
        member_id: MemberId,
    ) -> Result<Option<WaitingListEntry>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .waiting_list
            .iter()
            .find(|e| e.facility_type_id == facility_type_id && e.member_id == member_id)
            .cloned())
    }
}
