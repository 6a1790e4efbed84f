//! Nomination models.

use fanfare_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `nominations` table. Uniqueness within an award is
/// semantic (compared field-by-field by the validator), not enforced
/// by a key.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Nomination {
    pub id: DbId,
    pub year: i32,
    pub member_id: DbId,
    pub award_id: DbId,
    pub nominee_id: Option<DbId>,
    pub fic_id: Option<DbId>,
    pub detail: Option<String>,
    pub link: Option<String>,
    pub comment: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// One slot of a submitted nomination batch, before identity
/// resolution. `nominee` and `fic` may be existing ids or links.
#[derive(Debug, Clone, Deserialize)]
pub struct NominationSlotRequest {
    pub award_id: DbId,
    #[serde(default)]
    pub nominee_id: Option<DbId>,
    #[serde(default)]
    pub nominee_link: Option<String>,
    #[serde(default)]
    pub fic_id: Option<DbId>,
    #[serde(default)]
    pub fic_link: Option<String>,
    /// Profile links of the fic's authors, recorded on resolution so
    /// the per-person cap counts them.
    #[serde(default)]
    pub fic_author_links: Vec<String>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}
