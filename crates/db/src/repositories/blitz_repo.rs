//! Repository for the `blitzes`, `weekly_themes`, `blitz_theme_weeks`
//! and `blitz_users` tables.

use fanfare_core::types::DbId;
use sqlx::PgPool;

use crate::models::blitz::{Blitz, BlitzUser, LeaderboardRow};
use crate::models::theme::{ScheduledTheme, WeeklyThemeRow};

/// Column list for `blitzes` queries.
const BLITZ_COLUMNS: &str = "id, name, started_at, chapter_points, \
    consecutive_chapter_interval, consecutive_chapter_bonus, theme_bonus, \
    long_chapter_bonus_words, long_chapter_bonus, heat_bonus_multiplier, \
    max_effective_chapters, created_at";

/// Column list for `weekly_themes` queries.
const THEME_COLUMNS: &str =
    "id, name, description, notes, claimable, consecutive_chapter_bonus_applies";

/// Provides read/write operations for blitzes, their theme schedules,
/// and per-member point accounts.
pub struct BlitzRepo;

impl BlitzRepo {
    /// The most recently started blitz, if any.
    pub async fn get_current(pool: &PgPool) -> Result<Option<Blitz>, sqlx::Error> {
        let query = format!("SELECT {BLITZ_COLUMNS} FROM blitzes ORDER BY started_at DESC LIMIT 1");
        sqlx::query_as::<_, Blitz>(&query).fetch_optional(pool).await
    }

    /// Find a blitz by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Blitz>, sqlx::Error> {
        let query = format!("SELECT {BLITZ_COLUMNS} FROM blitzes WHERE id = $1");
        sqlx::query_as::<_, Blitz>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The blitz's theme schedule, ordered by week.
    pub async fn theme_schedule(
        pool: &PgPool,
        blitz_id: DbId,
    ) -> Result<Vec<ScheduledTheme>, sqlx::Error> {
        sqlx::query_as::<_, ScheduledTheme>(
            "SELECT btw.week, t.id, t.name, t.description, t.notes, t.claimable, \
                    t.consecutive_chapter_bonus_applies \
             FROM blitz_theme_weeks btw \
             JOIN weekly_themes t ON t.id = btw.theme_id \
             WHERE btw.blitz_id = $1 \
             ORDER BY btw.week",
        )
        .bind(blitz_id)
        .fetch_all(pool)
        .await
    }

    /// List all defined themes.
    pub async fn list_themes(pool: &PgPool) -> Result<Vec<WeeklyThemeRow>, sqlx::Error> {
        let query = format!("SELECT {THEME_COLUMNS} FROM weekly_themes ORDER BY name");
        sqlx::query_as::<_, WeeklyThemeRow>(&query)
            .fetch_all(pool)
            .await
    }

    /// Get-or-create a member's point account for a blitz.
    pub async fn get_or_create_user(
        pool: &PgPool,
        blitz_id: DbId,
        member_id: DbId,
    ) -> Result<BlitzUser, sqlx::Error> {
        sqlx::query_as::<_, BlitzUser>(
            "INSERT INTO blitz_users (blitz_id, member_id) VALUES ($1, $2) \
             ON CONFLICT (blitz_id, member_id) DO UPDATE SET blitz_id = EXCLUDED.blitz_id \
             RETURNING id, blitz_id, member_id, bonus_points, points_spent",
        )
        .bind(blitz_id)
        .bind(member_id)
        .fetch_one(pool)
        .await
    }

    /// Leaderboard: approved review scores plus bonus points, per
    /// member, highest first.
    pub async fn leaderboard(
        pool: &PgPool,
        blitz_id: DbId,
    ) -> Result<Vec<LeaderboardRow>, sqlx::Error> {
        sqlx::query_as::<_, LeaderboardRow>(
            "SELECT bu.member_id, m.username, \
                    bu.bonus_points + COALESCE(( \
                        SELECT SUM(r.score) FROM blitz_reviews r \
                        WHERE r.blitz_id = bu.blitz_id \
                          AND r.author_id = bu.member_id \
                          AND r.approved \
                    ), 0) AS points \
             FROM blitz_users bu \
             JOIN members m ON m.id = bu.member_id \
             WHERE bu.blitz_id = $1 \
             ORDER BY points DESC, m.username",
        )
        .bind(blitz_id)
        .fetch_all(pool)
        .await
    }
}
