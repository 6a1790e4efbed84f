//! Weekly theme models.

use fanfare_core::error::CoreError;
use fanfare_core::theme::{ThemeClaim, WeeklyTheme};
use fanfare_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `weekly_themes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WeeklyThemeRow {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub notes: String,
    pub claimable: String,
    pub consecutive_chapter_bonus_applies: bool,
}

/// A theme joined with the blitz week it is scheduled for.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ScheduledTheme {
    pub week: i32,
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub notes: String,
    pub claimable: String,
    pub consecutive_chapter_bonus_applies: bool,
}

impl ScheduledTheme {
    /// Convert into the engine's theme type, parsing the stored claim
    /// granularity.
    pub fn to_core(&self) -> Result<WeeklyTheme, CoreError> {
        Ok(WeeklyTheme {
            id: self.id,
            name: self.name.clone(),
            claim: ThemeClaim::parse(&self.claimable)?,
            consecutive_chapter_bonus_applies: self.consecutive_chapter_bonus_applies,
        })
    }
}
