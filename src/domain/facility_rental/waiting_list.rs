//! Per-facility-type FIFO waiting list.
//!
//! The list is a passive queue: nothing here promotes the head to a rental.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{FacilityTypeId, MemberId, Timestamp, WaitingListEntryId};

/// A member queued for a facility type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitingListEntry {
    pub id: WaitingListEntryId,
    pub member_id: MemberId,
    pub facility_type_id: FacilityTypeId,
    pub queued_at: Timestamp,
    pub notes: String,
}

/// Entry data before persistence assigns an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWaitingListEntry {
    pub member_id: MemberId,
    pub facility_type_id: FacilityTypeId,
    pub queued_at: Timestamp,
    pub notes: String,
}

impl NewWaitingListEntry {
    /// Stamps the entry with the current time.
    pub fn new(member_id: MemberId, facility_type_id: FacilityTypeId, notes: impl Into<String>) -> Self {
        Self {
            member_id,
            facility_type_id,
            queued_at: Timestamp::now(),
            notes: notes.into(),
        }
    }

    pub fn with_id(self, id: WaitingListEntryId) -> WaitingListEntry {
        WaitingListEntry {
            id,
            member_id: self.member_id,
            facility_type_id: self.facility_type_id,
            queued_at: self.queued_at,
            notes: self.notes,
        }
    }
}

/// All entries for one facility type, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitingList {
    facility_type_id: FacilityTypeId,
    entries: Vec<WaitingListEntry>,
}

impl WaitingList {
    /// Orders `entries` by `queued_at`, breaking ties by id.
    pub fn new(facility_type_id: FacilityTypeId, mut entries: Vec<WaitingListEntry>) -> Self {
        entries.sort_by_key(|e| (e.queued_at, e.id));
        Self {
            facility_type_id,
            entries,
        }
    }

    pub fn facility_type_id(&self) -> FacilityTypeId {
        self.facility_type_id
    }

    pub fn entries(&self) -> &[WaitingListEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<WaitingListEntry> {
        self.entries
    }

    /// Oldest entry.
    pub fn head(&self) -> Option<&WaitingListEntry> {
        self.entries.first()
    }

    /// 1-based queue position of `member_id`.
    pub fn position_of(&self, member_id: MemberId) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.member_id == member_id)
            .map(|idx| idx + 1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
