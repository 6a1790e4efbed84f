//! Repository for the `blitz_reviews` and `review_chapter_links`
//! tables.
//!
//! The submission path reads aggregate history and then writes, so it
//! must be serialized per (blitz, fic, author) key: callers open a
//! transaction, take the advisory lock for the key, and run the reads
//! and writes on that transaction. Methods on this repo therefore
//! accept `&mut PgConnection` where they participate in that path.

use fanfare_core::types::{DbId, Timestamp};
use sqlx::{PgConnection, PgPool};

use crate::models::blitz::{BlitzReview, ReviewChapterLink};

/// Column list for `blitz_reviews` queries.
const REVIEW_COLUMNS: &str = "id, blitz_id, fic_id, author_id, posted_at, week_index, \
                              chapters, score, theme, heat_bonus, approved, created_at, updated_at";

/// Values persisted for a scored submission.
#[derive(Debug, Clone)]
pub struct ScoredReviewValues {
    pub posted_at: Timestamp,
    pub week_index: i32,
    pub chapters: i64,
    pub score: i64,
    pub theme: bool,
    pub heat_bonus: i64,
}

/// Provides read/write operations for blitz reviews and their
/// long-chapter rosters.
pub struct BlitzReviewRepo;

impl BlitzReviewRepo {
    /// Serialize submissions for one (blitz, fic, author) key within
    /// the current transaction. Released automatically at commit or
    /// rollback.
    pub async fn lock_submission_key(
        conn: &mut PgConnection,
        blitz_id: DbId,
        fic_id: DbId,
        author_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(format!("blitz_review:{blitz_id}:{fic_id}:{author_id}"))
            .execute(conn)
            .await?;
        Ok(())
    }

    /// Find a review by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<BlitzReview>, sqlx::Error> {
        let query = format!("SELECT {REVIEW_COLUMNS} FROM blitz_reviews WHERE id = $1");
        sqlx::query_as::<_, BlitzReview>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The existing record for a (blitz, fic, author) key, if any.
    pub async fn find_by_key(
        conn: &mut PgConnection,
        blitz_id: DbId,
        fic_id: DbId,
        author_id: DbId,
    ) -> Result<Option<BlitzReview>, sqlx::Error> {
        let query = format!(
            "SELECT {REVIEW_COLUMNS} FROM blitz_reviews \
             WHERE blitz_id = $1 AND fic_id = $2 AND author_id = $3 \
             ORDER BY id LIMIT 1"
        );
        sqlx::query_as::<_, BlitzReview>(&query)
            .bind(blitz_id)
            .bind(fic_id)
            .bind(author_id)
            .fetch_optional(conn)
            .await
    }

    /// Prior reviews of the same fic by the same author, oldest first.
    /// When `before_id` is set (a resubmission), only records created
    /// before it count as history.
    pub async fn list_prior(
        conn: &mut PgConnection,
        blitz_id: DbId,
        fic_id: DbId,
        author_id: DbId,
        before_id: Option<DbId>,
    ) -> Result<Vec<BlitzReview>, sqlx::Error> {
        let query = format!(
            "SELECT {REVIEW_COLUMNS} FROM blitz_reviews \
             WHERE blitz_id = $1 AND fic_id = $2 AND author_id = $3 \
               AND ($4::BIGINT IS NULL OR id < $4) \
             ORDER BY id"
        );
        sqlx::query_as::<_, BlitzReview>(&query)
            .bind(blitz_id)
            .bind(fic_id)
            .bind(author_id)
            .bind(before_id)
            .fetch_all(conn)
            .await
    }

    /// Theme-claimed reviews by this author across all fics this
    /// blitz, excluding the record being resubmitted.
    pub async fn count_author_theme_claims(
        conn: &mut PgConnection,
        blitz_id: DbId,
        author_id: DbId,
        exclude_id: Option<DbId>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM blitz_reviews \
             WHERE blitz_id = $1 AND author_id = $2 AND theme \
               AND ($3::BIGINT IS NULL OR id != $3)",
        )
        .bind(blitz_id)
        .bind(author_id)
        .bind(exclude_id)
        .fetch_one(conn)
        .await
    }

    /// Reviews this author submitted to the blitz since the given
    /// instant (input to the default heat policy).
    pub async fn count_recent_by_author(
        conn: &mut PgConnection,
        blitz_id: DbId,
        author_id: DbId,
        since: Timestamp,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM blitz_reviews \
             WHERE blitz_id = $1 AND author_id = $2 AND created_at >= $3",
        )
        .bind(blitz_id)
        .bind(author_id)
        .bind(since)
        .fetch_one(conn)
        .await
    }

    /// Insert the first record for a key. `approved` starts false.
    pub async fn insert_scored(
        conn: &mut PgConnection,
        blitz_id: DbId,
        fic_id: DbId,
        author_id: DbId,
        values: &ScoredReviewValues,
    ) -> Result<BlitzReview, sqlx::Error> {
        let query = format!(
            "INSERT INTO blitz_reviews \
                (blitz_id, fic_id, author_id, posted_at, week_index, chapters, \
                 score, theme, heat_bonus, approved) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, FALSE) \
             RETURNING {REVIEW_COLUMNS}"
        );
        sqlx::query_as::<_, BlitzReview>(&query)
            .bind(blitz_id)
            .bind(fic_id)
            .bind(author_id)
            .bind(values.posted_at)
            .bind(values.week_index)
            .bind(values.chapters)
            .bind(values.score)
            .bind(values.theme)
            .bind(values.heat_bonus)
            .fetch_one(conn)
            .await
    }

    /// Overwrite a resubmitted record. Resets `approved` to false; the
    /// stored heat bonus is carried in `values` unchanged.
    pub async fn update_scored(
        conn: &mut PgConnection,
        id: DbId,
        values: &ScoredReviewValues,
    ) -> Result<BlitzReview, sqlx::Error> {
        let query = format!(
            "UPDATE blitz_reviews SET posted_at = $2, week_index = $3, chapters = $4, \
                score = $5, theme = $6, heat_bonus = $7, approved = FALSE, \
                updated_at = now() \
             WHERE id = $1 \
             RETURNING {REVIEW_COLUMNS}"
        );
        sqlx::query_as::<_, BlitzReview>(&query)
            .bind(id)
            .bind(values.posted_at)
            .bind(values.week_index)
            .bind(values.chapters)
            .bind(values.score)
            .bind(values.theme)
            .bind(values.heat_bonus)
            .fetch_one(conn)
            .await
    }

    /// Replace the long-chapter roster for a review.
    pub async fn replace_chapter_links(
        conn: &mut PgConnection,
        review_id: DbId,
        chapter_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM review_chapter_links WHERE review_id = $1")
            .bind(review_id)
            .execute(&mut *conn)
            .await?;
        for chapter_id in chapter_ids {
            sqlx::query(
                "INSERT INTO review_chapter_links (review_id, chapter_id) VALUES ($1, $2)",
            )
            .bind(review_id)
            .bind(chapter_id)
            .execute(&mut *conn)
            .await?;
        }
        Ok(())
    }

    /// The long-chapter roster for a review.
    pub async fn chapter_links(
        pool: &PgPool,
        review_id: DbId,
    ) -> Result<Vec<ReviewChapterLink>, sqlx::Error> {
        sqlx::query_as::<_, ReviewChapterLink>(
            "SELECT id, review_id, chapter_id FROM review_chapter_links \
             WHERE review_id = $1 ORDER BY chapter_id",
        )
        .bind(review_id)
        .fetch_all(pool)
        .await
    }

    /// Reviews awaiting moderation for a blitz, oldest first.
    pub async fn list_pending(pool: &PgPool, blitz_id: DbId) -> Result<Vec<BlitzReview>, sqlx::Error> {
        let query = format!(
            "SELECT {REVIEW_COLUMNS} FROM blitz_reviews \
             WHERE blitz_id = $1 AND NOT approved ORDER BY id"
        );
        sqlx::query_as::<_, BlitzReview>(&query)
            .bind(blitz_id)
            .fetch_all(pool)
            .await
    }

    /// An author's reviews for a blitz, newest first.
    pub async fn list_for_author(
        pool: &PgPool,
        blitz_id: DbId,
        author_id: DbId,
    ) -> Result<Vec<BlitzReview>, sqlx::Error> {
        let query = format!(
            "SELECT {REVIEW_COLUMNS} FROM blitz_reviews \
             WHERE blitz_id = $1 AND author_id = $2 ORDER BY posted_at DESC"
        );
        sqlx::query_as::<_, BlitzReview>(&query)
            .bind(blitz_id)
            .bind(author_id)
            .fetch_all(pool)
            .await
    }

    /// Finalize a moderated review with its adjusted score and flag.
    pub async fn finalize(
        pool: &PgPool,
        id: DbId,
        score: i64,
        theme: bool,
    ) -> Result<BlitzReview, sqlx::Error> {
        let query = format!(
            "UPDATE blitz_reviews SET score = $2, theme = $3, approved = TRUE, \
                updated_at = now() \
             WHERE id = $1 \
             RETURNING {REVIEW_COLUMNS}"
        );
        sqlx::query_as::<_, BlitzReview>(&query)
            .bind(id)
            .bind(score)
            .bind(theme)
            .fetch_one(pool)
            .await
    }

    /// Hard-delete a rejected review and its roster (cascade).
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM blitz_reviews WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
