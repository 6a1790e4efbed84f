//! Repository for the `votes` table.

use fanfare_core::types::DbId;
use sqlx::PgPool;

use crate::models::vote::Vote;

/// Column list for `votes` queries.
const VOTE_COLUMNS: &str = "id, year, member_id, award_id, nomination_id, created_at, updated_at";

/// Provides read/write operations for votes.
pub struct VoteRepo;

impl VoteRepo {
    /// A member's votes for a year.
    pub async fn list_for_member_year(
        pool: &PgPool,
        year: i32,
        member_id: DbId,
    ) -> Result<Vec<Vote>, sqlx::Error> {
        let query = format!(
            "SELECT {VOTE_COLUMNS} FROM votes \
             WHERE year = $1 AND member_id = $2 ORDER BY award_id"
        );
        sqlx::query_as::<_, Vote>(&query)
            .bind(year)
            .bind(member_id)
            .fetch_all(pool)
            .await
    }

    /// Upsert a vote keyed by (year, member, award). Resubmitting the
    /// same choice is a no-op update, never a duplicate row.
    pub async fn upsert(
        pool: &PgPool,
        year: i32,
        member_id: DbId,
        award_id: DbId,
        nomination_id: DbId,
    ) -> Result<Vote, sqlx::Error> {
        let query = format!(
            "INSERT INTO votes (year, member_id, award_id, nomination_id) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (year, member_id, award_id) \
             DO UPDATE SET nomination_id = EXCLUDED.nomination_id, updated_at = now() \
             RETURNING {VOTE_COLUMNS}"
        );
        sqlx::query_as::<_, Vote>(&query)
            .bind(year)
            .bind(member_id)
            .bind(award_id)
            .bind(nomination_id)
            .fetch_one(pool)
            .await
    }
}
