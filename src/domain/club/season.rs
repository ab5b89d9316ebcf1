//! Club season.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{SeasonId, ValidationError};

/// A club season; memberships and rentals are booked per season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Season {
    pub id: SeasonId,
    /// Short code, e.g. `"2025"`.
    pub code: String,
    pub name: String,
    pub starts_at: NaiveDate,
    pub ends_at: NaiveDate,
}

impl Season {
    /// Creates a season, rejecting an end date before the start date.
    pub fn new(
        id: SeasonId,
        code: impl Into<String>,
        name: impl Into<String>,
        starts_at: NaiveDate,
        ends_at: NaiveDate,
    ) -> Result<Self, ValidationError> {
        if ends_at < starts_at {
            return Err(ValidationError::invalid_format(
                "ends_at",
                "season cannot end before it starts",
            ));
        }
        Ok(Self {
            id,
            code: code.into(),
            name: name.into(),
            starts_at,
            ends_at,
        })
    }

    /// True if `date` falls within the season, bounds included.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.starts_at <= date && date <= self.ends_at
    }
}
