//! Season repository port.

use async_trait::async_trait;

use crate::domain::club::Season;
use crate::domain::foundation::{DomainError, SeasonId};

#[async_trait]
pub trait SeasonRepository: Send + Sync {
    /// Returns `None` if the season doesn't exist.
    async fn get_season_by_id(&self, id: SeasonId) -> Result<Option<Season>, DomainError>;
}
