//! Repository for the `nominations` table.

use fanfare_core::types::DbId;
use sqlx::PgPool;

use crate::models::nomination::Nomination;

/// Column list for `nominations` queries.
const NOMINATION_COLUMNS: &str = "id, year, member_id, award_id, nominee_id, fic_id, \
                                  detail, link, comment, created_at, updated_at";

/// Values for one nomination insert or update.
#[derive(Debug, Clone)]
pub struct NominationValues {
    pub nominee_id: Option<DbId>,
    pub fic_id: Option<DbId>,
    pub detail: Option<String>,
    pub link: Option<String>,
    pub comment: Option<String>,
}

/// Provides read/write operations for nominations.
pub struct NominationRepo;

impl NominationRepo {
    /// A member's nominations for a year, in creation order (slot
    /// order within each award follows insertion).
    pub async fn list_for_member_year(
        pool: &PgPool,
        year: i32,
        member_id: DbId,
    ) -> Result<Vec<Nomination>, sqlx::Error> {
        let query = format!(
            "SELECT {NOMINATION_COLUMNS} FROM nominations \
             WHERE year = $1 AND member_id = $2 ORDER BY id"
        );
        sqlx::query_as::<_, Nomination>(&query)
            .bind(year)
            .bind(member_id)
            .fetch_all(pool)
            .await
    }

    /// All nominations recorded for an award in a year: the award's
    /// vote pool.
    pub async fn list_for_award_year(
        pool: &PgPool,
        year: i32,
        award_id: DbId,
    ) -> Result<Vec<Nomination>, sqlx::Error> {
        let query = format!(
            "SELECT {NOMINATION_COLUMNS} FROM nominations \
             WHERE year = $1 AND award_id = $2 ORDER BY id"
        );
        sqlx::query_as::<_, Nomination>(&query)
            .bind(year)
            .bind(award_id)
            .fetch_all(pool)
            .await
    }

    /// Insert a new nomination row.
    pub async fn insert(
        pool: &PgPool,
        year: i32,
        member_id: DbId,
        award_id: DbId,
        values: &NominationValues,
    ) -> Result<Nomination, sqlx::Error> {
        let query = format!(
            "INSERT INTO nominations \
                (year, member_id, award_id, nominee_id, fic_id, detail, link, comment) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {NOMINATION_COLUMNS}"
        );
        sqlx::query_as::<_, Nomination>(&query)
            .bind(year)
            .bind(member_id)
            .bind(award_id)
            .bind(values.nominee_id)
            .bind(values.fic_id)
            .bind(&values.detail)
            .bind(&values.link)
            .bind(&values.comment)
            .fetch_one(pool)
            .await
    }

    /// Overwrite an existing nomination row in place.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        values: &NominationValues,
    ) -> Result<Nomination, sqlx::Error> {
        let query = format!(
            "UPDATE nominations SET nominee_id = $2, fic_id = $3, detail = $4, \
                link = $5, comment = $6, updated_at = now() \
             WHERE id = $1 \
             RETURNING {NOMINATION_COLUMNS}"
        );
        sqlx::query_as::<_, Nomination>(&query)
            .bind(id)
            .bind(values.nominee_id)
            .bind(values.fic_id)
            .bind(&values.detail)
            .bind(&values.link)
            .bind(&values.comment)
            .fetch_one(pool)
            .await
    }

    /// Delete a nomination row (an emptied slot).
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM nominations WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
