//! Weekly themes and their claim-granularity policies.
//!
//! A theme unlocks bonus points under exactly one claim granularity:
//! per chapter, per review, per fic, or per author. The granularities
//! form a closed set dispatched through [`ThemeClaim`], so the scoring
//! pipeline never branches on a specific theme.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/* --------------------------------------------------------------------------
Claim granularity
-------------------------------------------------------------------------- */

/// How often a theme bonus can be claimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeClaim {
    /// One bonus per effective chapter in the review.
    PerChapter,
    /// One bonus per review.
    PerReview,
    /// One bonus for the first claimed review of the fic this blitz.
    PerFic,
    /// One bonus for the first claimed review by the author this blitz.
    PerAuthor,
}

impl ThemeClaim {
    /// Database representation of this granularity.
    pub fn as_str(self) -> &'static str {
        match self {
            ThemeClaim::PerChapter => "per_chapter",
            ThemeClaim::PerReview => "per_review",
            ThemeClaim::PerFic => "per_fic",
            ThemeClaim::PerAuthor => "per_author",
        }
    }

    /// Parse the database representation.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "per_chapter" => Ok(ThemeClaim::PerChapter),
            "per_review" => Ok(ThemeClaim::PerReview),
            "per_fic" => Ok(ThemeClaim::PerFic),
            "per_author" => Ok(ThemeClaim::PerAuthor),
            other => Err(CoreError::Validation(format!(
                "Invalid theme claim granularity '{other}'. Must be one of: \
                 per_chapter, per_review, per_fic, per_author"
            ))),
        }
    }
}

/// A weekly theme active for some week of a blitz.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyTheme {
    pub id: DbId,
    pub name: String,
    pub claim: ThemeClaim,
    /// Whether the consecutive-chapter streak bonus still applies while
    /// this theme is active.
    pub consecutive_chapter_bonus_applies: bool,
}

/// Week-by-week theme schedule for one blitz.
#[derive(Debug, Clone, Default)]
pub struct ThemeSchedule {
    entries: Vec<(u32, WeeklyTheme)>,
}

impl ThemeSchedule {
    pub fn new(entries: Vec<(u32, WeeklyTheme)>) -> Self {
        Self { entries }
    }

    /// The theme active for the given zero-based week index, if any.
    pub fn theme_for_week(&self, week_index: u32) -> Option<&WeeklyTheme> {
        self.entries
            .iter()
            .find(|(week, _)| *week == week_index)
            .map(|(_, theme)| theme)
    }
}

/* --------------------------------------------------------------------------
Claim evaluation
-------------------------------------------------------------------------- */

/// History inputs for evaluating a theme claim.
///
/// `prior_fic_claims` and `prior_author_claims` count earlier
/// theme-claimed reviews this blitz for the same fic and by the same
/// author respectively. The approval adjuster evaluates with both set
/// to zero, matching how bonuses were granted at submission time.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThemeContext {
    pub effective_chapters: i64,
    pub prior_fic_claims: u32,
    pub prior_author_claims: u32,
}

/// Number of theme-bonus multiples a claim is worth.
///
/// Returns zero whenever the submitter did not claim the theme; the
/// granularity only decides how a truthful claim is counted.
pub fn claimable_bonuses(claim: ThemeClaim, claimed: bool, ctx: &ThemeContext) -> i64 {
    if !claimed {
        return 0;
    }
    match claim {
        ThemeClaim::PerChapter => ctx.effective_chapters.max(0),
        ThemeClaim::PerReview => 1,
        ThemeClaim::PerFic => {
            if ctx.prior_fic_claims == 0 {
                1
            } else {
                0
            }
        }
        ThemeClaim::PerAuthor => {
            if ctx.prior_author_claims == 0 {
                1
            } else {
                0
            }
        }
    }
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(chapters: i64, fic_claims: u32, author_claims: u32) -> ThemeContext {
        ThemeContext {
            effective_chapters: chapters,
            prior_fic_claims: fic_claims,
            prior_author_claims: author_claims,
        }
    }

    #[test]
    fn test_unclaimed_is_always_zero() {
        for claim in [
            ThemeClaim::PerChapter,
            ThemeClaim::PerReview,
            ThemeClaim::PerFic,
            ThemeClaim::PerAuthor,
        ] {
            assert_eq!(claimable_bonuses(claim, false, &ctx(4, 0, 0)), 0);
        }
    }

    #[test]
    fn test_per_chapter_counts_effective_chapters() {
        assert_eq!(
            claimable_bonuses(ThemeClaim::PerChapter, true, &ctx(4, 0, 0)),
            4
        );
        assert_eq!(
            claimable_bonuses(ThemeClaim::PerChapter, true, &ctx(0, 0, 0)),
            0
        );
    }

    #[test]
    fn test_per_review_is_single() {
        assert_eq!(
            claimable_bonuses(ThemeClaim::PerReview, true, &ctx(4, 2, 2)),
            1
        );
    }

    #[test]
    fn test_per_fic_only_first_claim_counts() {
        assert_eq!(claimable_bonuses(ThemeClaim::PerFic, true, &ctx(2, 0, 0)), 1);
        assert_eq!(claimable_bonuses(ThemeClaim::PerFic, true, &ctx(2, 1, 0)), 0);
    }

    #[test]
    fn test_per_author_only_first_claim_counts() {
        assert_eq!(
            claimable_bonuses(ThemeClaim::PerAuthor, true, &ctx(2, 0, 0)),
            1
        );
        assert_eq!(
            claimable_bonuses(ThemeClaim::PerAuthor, true, &ctx(2, 0, 3)),
            0
        );
    }

    #[test]
    fn test_claim_round_trips_through_str() {
        for claim in [
            ThemeClaim::PerChapter,
            ThemeClaim::PerReview,
            ThemeClaim::PerFic,
            ThemeClaim::PerAuthor,
        ] {
            assert_eq!(ThemeClaim::parse(claim.as_str()).unwrap(), claim);
        }
        assert!(ThemeClaim::parse("weekly").is_err());
    }

    #[test]
    fn test_schedule_lookup() {
        let theme = WeeklyTheme {
            id: 1,
            name: "One-Shot Week".to_string(),
            claim: ThemeClaim::PerFic,
            consecutive_chapter_bonus_applies: true,
        };
        let schedule = ThemeSchedule::new(vec![(2, theme)]);
        assert!(schedule.theme_for_week(2).is_some());
        assert!(schedule.theme_for_week(0).is_none());
        assert!(ThemeSchedule::default().theme_for_week(2).is_none());
    }
}
