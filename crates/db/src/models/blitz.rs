//! Review blitz models: the contest, its scored reviews, the
//! long-chapter roster, and per-member point accounts.

use fanfare_core::config::BlitzScoring;
use fanfare_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `blitzes` table, scoring constants embedded.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Blitz {
    pub id: DbId,
    pub name: String,
    pub started_at: Timestamp,
    pub chapter_points: i64,
    pub consecutive_chapter_interval: i64,
    pub consecutive_chapter_bonus: i64,
    pub theme_bonus: i64,
    pub long_chapter_bonus_words: i64,
    pub long_chapter_bonus: i64,
    pub heat_bonus_multiplier: i64,
    pub max_effective_chapters: i64,
    pub created_at: Timestamp,
}

impl Blitz {
    /// The scoring constants as the engine consumes them.
    pub fn scoring(&self) -> BlitzScoring {
        BlitzScoring {
            chapter_points: self.chapter_points,
            consecutive_chapter_interval: self.consecutive_chapter_interval,
            consecutive_chapter_bonus: self.consecutive_chapter_bonus,
            theme_bonus: self.theme_bonus,
            long_chapter_bonus_words: self.long_chapter_bonus_words,
            long_chapter_bonus: self.long_chapter_bonus,
            heat_bonus_multiplier: self.heat_bonus_multiplier,
            max_effective_chapters: self.max_effective_chapters,
        }
    }
}

/// A row from the `blitz_reviews` table.
///
/// `score` is frozen at submission; `heat_bonus` is set once at first
/// creation and never recomputed; `approved` flips true only through
/// moderation.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BlitzReview {
    pub id: DbId,
    pub blitz_id: DbId,
    pub fic_id: DbId,
    pub author_id: DbId,
    pub posted_at: Timestamp,
    pub week_index: i32,
    pub chapters: i64,
    pub score: i64,
    pub theme: bool,
    pub heat_bonus: i64,
    pub approved: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `review_chapter_links` table: a chapter that earned
/// the long-chapter bonus for its review.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReviewChapterLink {
    pub id: DbId,
    pub review_id: DbId,
    pub chapter_id: DbId,
}

/// A row from the `blitz_users` table: per-member point accounting
/// outside review scores (prize adjustments, spending).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BlitzUser {
    pub id: DbId,
    pub blitz_id: DbId,
    pub member_id: DbId,
    pub bonus_points: i64,
    pub points_spent: i64,
}

/// One leaderboard entry: approved score plus bonus points.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LeaderboardRow {
    pub member_id: DbId,
    pub username: String,
    pub points: i64,
}

/// Request body for a blitz review submission.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitReview {
    pub fic_id: DbId,
    pub author_id: DbId,
    pub posted_at: Timestamp,
    pub chapters: i64,
    #[serde(default)]
    pub satisfies_theme: Option<bool>,
    #[serde(default)]
    pub chapter_ids: Vec<DbId>,
}

/// Request body for the moderation endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ModerateReview {
    pub approve: bool,
    #[serde(default)]
    pub claim_theme: Option<bool>,
}
