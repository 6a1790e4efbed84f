//! Vote models.

use fanfare_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `votes` table. One vote per member per award per
/// year, upserted on resubmission.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Vote {
    pub id: DbId,
    pub year: i32,
    pub member_id: DbId,
    pub award_id: DbId,
    pub nomination_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request body for a vote submission: chosen nomination per award.
#[derive(Debug, Clone, Deserialize)]
pub struct VoteRequest {
    pub choices: Vec<VoteChoiceRequest>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VoteChoiceRequest {
    pub award_id: DbId,
    pub nomination_id: DbId,
}
