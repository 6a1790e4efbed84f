//! Repository for the `fics`, `fic_authors` and `chapters` tables.

use fanfare_core::types::DbId;
use sqlx::PgPool;

use crate::models::identity::{Chapter, Fic, Member};

/// Column list for `fics` queries.
const FIC_COLUMNS: &str = "id, title, thread_id, post_id, created_at, updated_at";

/// Provides read/write operations for fics, their authors, and their
/// chapters.
pub struct FicRepo;

impl FicRepo {
    /// Find a fic by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Fic>, sqlx::Error> {
        let query = format!("SELECT {FIC_COLUMNS} FROM fics WHERE id = $1");
        sqlx::query_as::<_, Fic>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Resolve-or-create a fic by its thread/post key. Concurrent
    /// duplicate creation is absorbed by the conflict clause.
    pub async fn get_or_create(
        pool: &PgPool,
        thread_id: DbId,
        post_id: Option<DbId>,
        title: &str,
    ) -> Result<Fic, sqlx::Error> {
        let query = format!(
            "INSERT INTO fics (title, thread_id, post_id) VALUES ($1, $2, $3) \
             ON CONFLICT (thread_id, post_id) \
             DO UPDATE SET title = EXCLUDED.title, updated_at = now() \
             RETURNING {FIC_COLUMNS}"
        );
        sqlx::query_as::<_, Fic>(&query)
            .bind(title)
            .bind(thread_id)
            .bind(post_id)
            .fetch_one(pool)
            .await
    }

    /// The authors of a fic, ordered by username.
    pub async fn authors_of(pool: &PgPool, fic_id: DbId) -> Result<Vec<Member>, sqlx::Error> {
        sqlx::query_as::<_, Member>(
            "SELECT m.id, m.username, m.forum_user_id, m.created_at, m.updated_at \
             FROM members m \
             JOIN fic_authors fa ON fa.member_id = m.id \
             WHERE fa.fic_id = $1 \
             ORDER BY m.username",
        )
        .bind(fic_id)
        .fetch_all(pool)
        .await
    }

    /// Record a member as an author of a fic (idempotent).
    pub async fn add_author(
        pool: &PgPool,
        fic_id: DbId,
        member_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO fic_authors (fic_id, member_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(fic_id)
        .bind(member_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Fetch the given chapters, in id order.
    pub async fn chapters_by_ids(
        pool: &PgPool,
        chapter_ids: &[DbId],
    ) -> Result<Vec<Chapter>, sqlx::Error> {
        sqlx::query_as::<_, Chapter>(
            "SELECT id, fic_id, title, word_count FROM chapters \
             WHERE id = ANY($1) ORDER BY id",
        )
        .bind(chapter_ids)
        .fetch_all(pool)
        .await
    }
}
