//! Repository for the `members` table.

use fanfare_core::types::DbId;
use sqlx::PgPool;

use crate::models::identity::Member;

/// Column list for `members` queries.
const MEMBER_COLUMNS: &str = "id, username, forum_user_id, created_at, updated_at";

/// Provides read/write operations for members.
pub struct MemberRepo;

impl MemberRepo {
    /// Find a member by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Member>, sqlx::Error> {
        let query = format!("SELECT {MEMBER_COLUMNS} FROM members WHERE id = $1");
        sqlx::query_as::<_, Member>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Resolve-or-create a member by their forum user id.
    ///
    /// Concurrent creation of the same member is absorbed by the
    /// conflict clause rather than surfaced to the caller; the stored
    /// username is refreshed from the link on every resolution.
    pub async fn get_or_create(
        pool: &PgPool,
        forum_user_id: DbId,
        username: &str,
    ) -> Result<Member, sqlx::Error> {
        let query = format!(
            "INSERT INTO members (username, forum_user_id) VALUES ($1, $2) \
             ON CONFLICT (forum_user_id) \
             DO UPDATE SET username = EXCLUDED.username, updated_at = now() \
             RETURNING {MEMBER_COLUMNS}"
        );
        sqlx::query_as::<_, Member>(&query)
            .bind(username)
            .bind(forum_user_id)
            .fetch_one(pool)
            .await
    }
}
