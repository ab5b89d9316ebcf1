//! PostgreSQL implementation of WaitingListRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::database_error;
use crate::domain::facility_rental::{NewWaitingListEntry, WaitingList, WaitingListEntry};
use crate::domain::foundation::{
    DomainError, ErrorCode, FacilityTypeId, MemberId, Timestamp, WaitingListEntryId,
};
use crate::ports::WaitingListRepository;

pub struct PostgresWaitingListRepository {
    pool: PgPool,
}

impl PostgresWaitingListRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct WaitingListRow {
    id: i64,
    member_id: i64,
    facility_type_id: i64,
    queued_at: DateTime<Utc>,
    notes: String,
}

impl From<WaitingListRow> for WaitingListEntry {
    fn from(row: WaitingListRow) -> Self {
        WaitingListEntry {
            id: WaitingListEntryId::new(row.id),
            member_id: MemberId::new(row.member_id),
            facility_type_id: FacilityTypeId::new(row.facility_type_id),
            queued_at: Timestamp::from_datetime(row.queued_at),
            notes: row.notes,
        }
    }
}

#[async_trait]
impl WaitingListRepository for PostgresWaitingListRepository {
    async fn get_waiting_list(
        &self,
        facility_type_id: FacilityTypeId,
    ) -> Result<WaitingList, DomainError> {
        let rows: Vec<WaitingListRow> = sqlx::query_as(
            r#"
            SELECT id, member_id, facility_type_id, queued_at, notes
            FROM waiting_list
            WHERE facility_type_id = $1
            ORDER BY queued_at, id
            "#,
        )
        .bind(facility_type_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(database_error("load waiting list"))?;

        Ok(WaitingList::new(
            facility_type_id,
            rows.into_iter().map(WaitingListEntry::from).collect(),
        ))
    }

    async fn get_next_entry(
        &self,
        facility_type_id: FacilityTypeId,
    ) -> Result<Option<WaitingListEntry>, DomainError> {
        let row: Option<WaitingListRow> = sqlx::query_as(
            r#"
            SELECT id, member_id, facility_type_id, queued_at, notes
            FROM waiting_list
            WHERE facility_type_id = $1
            ORDER BY queued_at, id
            LIMIT 1
            "#,
        )
        .bind(facility_type_id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error("load next waiting list entry"))?;

        Ok(row.map(WaitingListEntry::from))
    }

    async fn add_entry(&self, entry: NewWaitingListEntry) -> Result<WaitingListEntry, DomainError> {
        let inserted: Option<WaitingListRow> = sqlx::query_as(
            r#"
            INSERT INTO waiting_list (member_id, facility_type_id, queued_at, notes)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (member_id, facility_type_id) DO NOTHING
            RETURNING id, member_id, facility_type_id, queued_at, notes
            "#,
        )
        .bind(entry.member_id.value())
        .bind(entry.facility_type_id.value())
        .bind(entry.queued_at.as_datetime())
        .bind(&entry.notes)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error("insert waiting list entry"))?;

        if let Some(row) = inserted {
            return Ok(row.into());
        }

        // Already queued: hand back the original entry so its position is kept.
        self.get_member_entry(entry.facility_type_id, entry.member_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::WaitingListEntryNotFound,
                    format!(
                        "Waiting list entry for member {} vanished during insert",
                        entry.member_id
                    ),
                )
                .with_detail("member_id", entry.member_id.to_string())
            })
    }

    async fn remove_entry(
        &self,
        id: WaitingListEntryId,
    ) -> Result<Option<WaitingListEntry>, DomainError> {
        let row: Option<WaitingListRow> = sqlx::query_as(
            r#"
            DELETE FROM waiting_list
            WHERE id = $1
            RETURNING id, member_id, facility_type_id, queued_at, notes
            "#,
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error("remove waiting list entry"))?;

        Ok(row.map(WaitingListEntry::from))
    }

    async fn remove_entry_by_member_and_type(
        &self,
        facility_type_id: FacilityTypeId,
        member_id: MemberId,
    ) -> Result<Option<WaitingListEntry>, DomainError> {
        let row: Option<WaitingListRow> = sqlx::query_as(
            r#"
            DELETE FROM waiting_list
            WHERE facility_type_id = $1 AND member_id = $2
            RETURNING id, member_id, facility_type_id, queued_at, notes
            "#,
        )
        .bind(facility_type_id.value())
        .bind(member_id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error("remove waiting list entry"))?;

        Ok(row.map(WaitingListEntry::from))
    }

    async fn get_member_entry(
        &self,
        facility_type_id: FacilityTypeId,
        member_id: MemberId,
    ) -> Result<Option<WaitingListEntry>, DomainError> {
        let row: Option<WaitingListRow> = sqlx::query_as(
            r#"
            SELECT id, member_id, facility_type_id, queued_at, notes
            FROM waiting_list
            WHERE facility_type_id = $1 AND member_id = $2
            "#,
        )
        .bind(facility_type_id.value())
        .bind(member_id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error("find waiting list entry"))?;

        Ok(row.map(WaitingListEntry::from))
    }
}
