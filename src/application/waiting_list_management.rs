//! WaitingListManagementService - per-facility-type queues.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::facility_rental::{
    NewWaitingListEntry, RentalError, WaitingList, WaitingListEntry,
};
use crate::domain::foundation::{FacilityTypeId, MemberId, WaitingListEntryId};
use crate::ports::WaitingListRepository;

#[derive(Clone)]
pub struct WaitingListManagementService {
    repository: Arc<dyn WaitingListRepository>,
}

impl WaitingListManagementService {
    pub fn new(repository: Arc<dyn WaitingListRepository>) -> Self {
        Self { repository }
    }

    /// Queues a member for a facility type.
    ///
    /// Idempotent: if the member is already queued for the type, the
    /// existing entry is returned unchanged.
    pub async fn add_to_waiting_list(
        &self,
        member_id: MemberId,
        facility_type_id: FacilityTypeId,
        notes: &str,
    ) -> Result<WaitingListEntry, RentalError> {
        if let Some(existing) = self
            .repository
            .get_member_entry(facility_type_id, member_id)
            .await?
        {
            debug!(
                entry_id = %existing.id,
                member_id = %member_id,
                facility_type_id = %facility_type_id,
                "Member already on waiting list"
            );
            return Ok(existing);
        }

        let entry = self
            .repository
            .add_entry(NewWaitingListEntry::new(member_id, facility_type_id, notes))
            .await?;

        info!(
            entry_id = %entry.id,
            member_id = %member_id,
            facility_type_id = %facility_type_id,
            "Member added to waiting list"
        );
        Ok(entry)
    }

    pub async fn remove_from_waiting_list(
        &self,
        id: WaitingListEntryId,
    ) -> Result<WaitingListEntry, RentalError> {
        let removed = self
            .repository
            .remove_entry(id)
            .await?
            .ok_or_else(|| RentalError::WaitingListEntryNotFound(format!("entry {}", id)))?;

        info!(entry_id = %id, member_id = %removed.member_id, "Waiting list entry removed");
        Ok(removed)
    }

    pub async fn remove_from_waiting_list_by_member_and_type(
        &self,
        member_id: MemberId,
        facility_type_id: FacilityTypeId,
    ) -> Result<WaitingListEntry, RentalError> {
        let removed = self
            .repository
            .remove_entry_by_member_and_type(facility_type_id, member_id)
            .await?
            .ok_or_else(|| not_queued(member_id, facility_type_id))?;

        info!(
            entry_id = %removed.id,
            member_id = %member_id,
            facility_type_id = %facility_type_id,
            "Waiting list entry removed"
        );
        Ok(removed)
    }

    /// Entries for a facility type, oldest first.
    pub async fn get_waiting_list(
        &self,
        facility_type_id: FacilityTypeId,
    ) -> Result<WaitingList, RentalError> {
        Ok(self.repository.get_waiting_list(facility_type_id).await?)
    }

    /// Oldest entry for a facility type.
    pub async fn get_next_in_line(
        &self,
        facility_type_id: FacilityTypeId,
    ) -> Result<WaitingListEntry, RentalError> {
        self.repository
            .get_next_entry(facility_type_id)
            .await?
            .ok_or(RentalError::WaitingListEmpty(facility_type_id))
    }

    pub async fn get_member_entry(
        &self,
        member_id: MemberId,
        facility_type_id: FacilityTypeId,
    ) -> Result<WaitingListEntry, RentalError> {
        self.repository
            .get_member_entry(facility_type_id, member_id)
            .await?
            .ok_or_else(|| not_queued(member_id, facility_type_id))
    }
}

fn not_queued(member_id: MemberId, facility_type_id: FacilityTypeId) -> RentalError {
    RentalError::WaitingListEntryNotFound(format!(
        "member {} is not queued for facility type {}",
        member_id, facility_type_id
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{DomainError, Timestamp};
    use async_trait::async_trait;
    use std::sync::Mutex;

    // ════════════════════════════════════════════════════════════════════════════
    // Mock Implementations
    // ════════════════════════════════════════════════════════════════════════════

    struct MockWaitingListRepository {
        entries: Mutex<Vec<WaitingListEntry>>,
        next_id: Mutex<i64>,
        add_calls: Mutex<usize>,
    }

    impl MockWaitingListRepository {
        fn new() -> Self {
            Self {
                entries: Mutex::new(Vec::new()),
                next_id: Mutex::new(1),
                add_calls: Mutex::new(0),
            }
        }

        fn add_calls(&self) -> usize {
            *self.add_calls.lock().unwrap()
        }

        fn find(&self, facility_type_id: FacilityTypeId, member_id: MemberId) -> Option<usize> {
            self.entries
                .lock()
                .unwrap()
                .iter()
                .position(|e| e.facility_type_id == facility_type_id && e.member_id == member_id)
        }
    }

    #[async_trait]
    impl WaitingListRepository for MockWaitingListRepository {
        async fn get_waiting_list(
            &self,
            facility_type_id: FacilityTypeId,
        ) -> Result<WaitingList, DomainError> {
            let entries = self
                .entries
                .lock()
                .unwrap()
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

        async fn add_entry(&self, entry: NewWaitingListEntry) -> Result<WaitingListEntry, DomainError> {
            *self.add_calls.lock().unwrap() += 1;
            let mut next_id = self.next_id.lock().unwrap();
            let stored = entry.with_id(WaitingListEntryId::new(*next_id));
            *next_id += 1;
            self.entries.lock().unwrap().push(stored.clone());
            Ok(stored)
        }

        async fn remove_entry(
            &self,
            id: WaitingListEntryId,
        ) -> Result<Option<WaitingListEntry>, DomainError> {
            let mut entries = self.entries.lock().unwrap();
            let idx = entries.iter().position(|e| e.id == id);
            Ok(idx.map(|i| entries.remove(i)))
        }

        async fn remove_entry_by_member_and_type(
            &self,
            facility_type_id: FacilityTypeId,
            member_id: MemberId,
        ) -> Result<Option<WaitingListEntry>, DomainError> {
            let idx = self.find(facility_type_id, member_id);
            Ok(idx.map(|i| self.entries.lock().unwrap().remove(i)))
        }

        async fn get_member_entry(
            &self,
            facility_type_id: FacilityTypeId,
            member_id: MemberId,
        ) -> Result<Option<WaitingListEntry>, DomainError> {
            let idx = self.find(facility_type_id, member_id);
            Ok(idx.map(|i| self.entries.lock().unwrap()[i].clone()))
        }
    }

    const TYPE: FacilityTypeId = FacilityTypeId::new(3);

    fn service() -> (WaitingListManagementService, Arc<MockWaitingListRepository>) {
        let repo = Arc::new(MockWaitingListRepository::new());
        (WaitingListManagementService::new(repo.clone()), repo)
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn add_twice_returns_same_entry() {
        let (service, repo) = service();

        let first = service
            .add_to_waiting_list(MemberId::new(1), TYPE, "")
            .await
            .unwrap();
        let second = service
            .add_to_waiting_list(MemberId::new(1), TYPE, "changed my mind")
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.notes, "");
        assert_eq!(repo.add_calls(), 1);
    }

    #[tokio::test]
    async fn same_member_can_queue_for_different_types() {
        let (service, _) = service();
        let a = service.add_to_waiting_list(MemberId::new(1), TYPE, "").await.unwrap();
        let b = service
            .add_to_waiting_list(MemberId::new(1), FacilityTypeId::new(4), "")
            .await
            .unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn waiting_list_is_ordered_by_queued_at() {
        let (service, repo) = service();
        let base = Timestamp::from_unix_secs(1_700_000_000).unwrap();
        for (member, offset) in [(1, 30), (2, 10), (3, 20)] {
            let mut entry = NewWaitingListEntry::new(MemberId::new(member), TYPE, "");
            entry.queued_at = base.plus_secs(offset);
            repo.add_entry(entry).await.unwrap();
        }

        let list = service.get_waiting_list(TYPE).await.unwrap();
        let members: Vec<_> = list.entries().iter().map(|e| e.member_id.value()).collect();
        assert_eq!(members, vec![2, 3, 1]);

        let next = service.get_next_in_line(TYPE).await.unwrap();
        assert_eq!(next.member_id, MemberId::new(2));
    }

    #[tokio::test]
    async fn next_in_line_on_empty_list_is_not_found() {
        let (service, _) = service();
        let err = service.get_next_in_line(TYPE).await.unwrap_err();
        assert!(matches!(err, RentalError::WaitingListEmpty(t) if t == TYPE));
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn remove_by_id_removes_exactly_one() {
        let (service, _) = service();
        let a = service.add_to_waiting_list(MemberId::new(1), TYPE, "").await.unwrap();
        service.add_to_waiting_list(MemberId::new(2), TYPE, "").await.unwrap();

        let removed = service.remove_from_waiting_list(a.id).await.unwrap();
        assert_eq!(removed.id, a.id);
        assert_eq!(service.get_waiting_list(TYPE).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn remove_missing_entry_is_not_found() {
        let (service, _) = service();
        let err = service
            .remove_from_waiting_list(WaitingListEntryId::new(42))
            .await
            .unwrap_err();
        assert!(matches!(err, RentalError::WaitingListEntryNotFound(_)));
    }

    #[tokio::test]
    async fn remove_by_member_and_type() {
        let (service, _) = service();
        service.add_to_waiting_list(MemberId::new(1), TYPE, "").await.unwrap();

        service
            .remove_from_waiting_list_by_member_and_type(MemberId::new(1), TYPE)
            .await
            .unwrap();

        let err = service
            .remove_from_waiting_list_by_member_and_type(MemberId::new(1), TYPE)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn member_entry_lookup() {
        let (service, _) = service();
        assert!(service.get_member_entry(MemberId::new(1), TYPE).await.is_err());

        let entry = service.add_to_waiting_list(MemberId::new(1), TYPE, "").await.unwrap();
        let found = service.get_member_entry(MemberId::new(1), TYPE).await.unwrap();
        assert_eq!(found, entry);
    }
}
