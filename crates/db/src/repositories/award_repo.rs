//! Repository for the `awards` and `year_awards` tables.

use fanfare_core::types::DbId;
use sqlx::PgPool;

use crate::models::award::{Award, YearAward};

/// Column list for `awards` queries.
const AWARD_COLUMNS: &str =
    "id, name, category, has_person, has_fic, has_detail, has_samples, created_at, updated_at";

/// Provides read/write operations for awards and their per-year
/// activations.
pub struct AwardRepo;

impl AwardRepo {
    /// List every award, ordered by category then name.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Award>, sqlx::Error> {
        let query = format!("SELECT {AWARD_COLUMNS} FROM awards ORDER BY category, name");
        sqlx::query_as::<_, Award>(&query).fetch_all(pool).await
    }

    /// Find an award by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Award>, sqlx::Error> {
        let query = format!("SELECT {AWARD_COLUMNS} FROM awards WHERE id = $1");
        sqlx::query_as::<_, Award>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Awards active for the given year, ordered by category then name.
    pub async fn active_for_year(pool: &PgPool, year: i32) -> Result<Vec<Award>, sqlx::Error> {
        let query = "SELECT a.id, a.name, a.category, a.has_person, a.has_fic, \
                     a.has_detail, a.has_samples, a.created_at, a.updated_at \
                     FROM awards a \
                     JOIN year_awards ya ON ya.award_id = a.id \
                     WHERE ya.year = $1 \
                     ORDER BY a.category, a.name";
        sqlx::query_as::<_, Award>(query)
            .bind(year)
            .fetch_all(pool)
            .await
    }

    /// The awards to pre-select when setting up a year: its own
    /// activations, or the previous year's set when none exist yet.
    pub async fn default_awards_for_year(
        pool: &PgPool,
        year: i32,
    ) -> Result<Vec<Award>, sqlx::Error> {
        let current = Self::active_for_year(pool, year).await?;
        if !current.is_empty() {
            return Ok(current);
        }
        Self::active_for_year(pool, year - 1).await
    }

    /// List the year-award activations for a year.
    pub async fn year_awards(pool: &PgPool, year: i32) -> Result<Vec<YearAward>, sqlx::Error> {
        sqlx::query_as::<_, YearAward>(
            "SELECT id, year, award_id FROM year_awards WHERE year = $1 ORDER BY award_id",
        )
        .bind(year)
        .fetch_all(pool)
        .await
    }

    /// Replace a year's activation set: activate the given awards,
    /// deactivate everything else. Runs in one transaction.
    pub async fn set_year_awards(
        pool: &PgPool,
        year: i32,
        award_ids: &[DbId],
    ) -> Result<Vec<YearAward>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM year_awards WHERE year = $1 AND award_id != ALL($2)")
            .bind(year)
            .bind(award_ids)
            .execute(&mut *tx)
            .await?;

        for award_id in award_ids {
            sqlx::query(
                "INSERT INTO year_awards (year, award_id) VALUES ($1, $2) \
                 ON CONFLICT (year, award_id) DO NOTHING",
            )
            .bind(year)
            .bind(award_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Self::year_awards(pool, year).await
    }
}
