//! Waiting list repository port.

use async_trait::async_trait;

use crate::domain::facility_rental::{NewWaitingListEntry, WaitingList, WaitingListEntry};
use crate::domain::foundation::{DomainError, FacilityTypeId, MemberId, WaitingListEntryId};

/// Repository port for per-facility-type waiting lists.
#[async_trait]
pub trait WaitingListRepository: Send + Sync {
    /// Entries for a facility type, oldest first.
    async fn get_waiting_list(&self, facility_type_id: FacilityTypeId)
        -> Result<WaitingList, DomainError>;

    /// Oldest entry, or `None` if the list is empty.
    async fn get_next_entry(
        &self,
        facility_type_id: FacilityTypeId,
    ) -> Result<Option<WaitingListEntry>, DomainError>;

    /// Stores a new entry and returns it with its assigned id.
    async fn add_entry(&self, entry: NewWaitingListEntry) -> Result<WaitingListEntry, DomainError>;

    /// Removes an entry by id. Returns the removed entry, or `None`.
    async fn remove_entry(
        &self,
        id: WaitingListEntryId,
    ) -> Result<Option<WaitingListEntry>, DomainError>;

    /// Removes a member's entry for a facility type. Returns it, or `None`.
    async fn remove_entry_by_member_and_type(
        &self,
        facility_type_id: FacilityTypeId,
        member_id: MemberId,
    ) -> Result<Option<WaitingListEntry>, DomainError>;

    /// A member's entry for a facility type, if queued.
    async fn get_member_entry(
        &self,
        facility_type_id: FacilityTypeId,
        member_id: MemberId,
    ) -> Result<Option<WaitingListEntry>, DomainError>;
}
