//! Award category and year-activation models.

use fanfare_core::nomination::AwardFields;
use fanfare_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `awards` table. Immutable within a year once
/// nominations for it exist.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Award {
    pub id: DbId,
    pub name: String,
    pub category: String,
    pub has_person: bool,
    pub has_fic: bool,
    pub has_detail: bool,
    pub has_samples: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Award {
    /// The subset of nomination fields this award uses.
    pub fn fields(&self) -> AwardFields {
        AwardFields {
            has_person: self.has_person,
            has_fic: self.has_fic,
            has_detail: self.has_detail,
            has_samples: self.has_samples,
        }
    }
}

/// A row from the `year_awards` table: the award is active that year.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct YearAward {
    pub id: DbId,
    pub year: i32,
    pub award_id: DbId,
}

/// Request body for the year-award activation batch.
#[derive(Debug, Clone, Deserialize)]
pub struct SetYearAwards {
    pub award_ids: Vec<DbId>,
}
