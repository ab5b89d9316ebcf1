//! PostgreSQL implementation of SeasonRepository.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

use super::database_error;
use crate::domain::club::Season;
use crate::domain::foundation::{DomainError, ErrorCode, SeasonId};
use crate::ports::SeasonRepository;

pub struct PostgresSeasonRepository {
    pool: PgPool,
}

impl PostgresSeasonRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SeasonRow {
    id: i64,
    code: String,
    name: String,
    starts_at: NaiveDate,
    ends_at: NaiveDate,
}

impl TryFrom<SeasonRow> for Season {
    type Error = DomainError;

    fn try_from(row: SeasonRow) -> Result<Self, Self::Error> {
        Season::new(SeasonId::new(row.id), row.code, row.name, row.starts_at, row.ends_at).map_err(
            |e| DomainError::new(ErrorCode::DatabaseError, format!("Invalid season row: {}", e)),
        )
    }
}

#[async_trait]
impl SeasonRepository for PostgresSeasonRepository {
    async fn get_season_by_id(&self, id: SeasonId) -> Result<Option<Season>, DomainError> {
        let row: Option<SeasonRow> = sqlx::query_as(
            r#"
            SELECT id, code, name, starts_at, ends_at
            FROM seasons
            WHERE id = $1
            "#,
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error("find season"))?;

        row.map(Season::try_from).transpose()
    }
}
