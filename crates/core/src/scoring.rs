//! Review scoring pipeline.
//!
//! Computes the point award for one blitz review submission from the
//! blitz's scoring constants, the week's theme, and the history of
//! prior reviews of the same fic by the same author. Stages run in a
//! fixed order: base chapters, consecutive-chapter streak, theme,
//! long chapters, heat. All stages are additive; the order fixes the
//! breakdown reported to the caller.
//!
//! The heat bonus is computed exactly once, on first creation of the
//! (blitz, fic, author) record. A resubmission reuses the stored value
//! verbatim even when the inputs would now compute differently.

use serde::Serialize;

use crate::config::BlitzScoring;
use crate::error::CoreError;
use crate::theme::{claimable_bonuses, ThemeContext, ThemeSchedule, WeeklyTheme};
use crate::types::{DbId, Timestamp};

/* --------------------------------------------------------------------------
Inputs
-------------------------------------------------------------------------- */

/// A chapter linked to the review, candidate for the long-chapter
/// bonus.
#[derive(Debug, Clone)]
pub struct ChapterRef {
    pub id: DbId,
    pub fic_id: DbId,
    pub word_count: i64,
}

/// One review submission as handed to the engine.
#[derive(Debug, Clone)]
pub struct ReviewInput {
    pub fic_id: DbId,
    pub posted_at: Timestamp,
    /// Chapters covered by this review, before the effective cap.
    pub chapters: i64,
    /// The submitter's self-reported theme-match flag. Required (Some)
    /// whenever a theme is active for the posting week.
    pub satisfies_theme: Option<bool>,
    /// Chapters the submitter linked for the long-chapter bonus.
    pub chapter_links: Vec<ChapterRef>,
}

/// A prior review of the same (blitz, fic, author) key.
#[derive(Debug, Clone, Copy)]
pub struct PriorReview {
    pub effective_chapters: i64,
    pub theme_claimed: bool,
}

/// History the engine aggregates over.
///
/// `prior_author_claims` counts theme-claimed reviews by this author
/// across *all* fics this blitz; the per-fic count is derived from
/// `prior`.
#[derive(Debug, Clone, Default)]
pub struct ReviewHistory {
    pub prior: Vec<PriorReview>,
    pub prior_author_claims: u32,
}

/// The stored record being resubmitted, when one exists for the key.
#[derive(Debug, Clone, Copy)]
pub struct ExistingReview {
    pub heat_bonus: i64,
}

/* --------------------------------------------------------------------------
Outputs
-------------------------------------------------------------------------- */

/// Per-stage point totals, reported for logging and moderator display.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ScoreBreakdown {
    pub base: i64,
    pub streak: i64,
    pub theme: i64,
    pub long_chapter: i64,
    pub heat: i64,
}

/// The engine's verdict for one submission. The caller persists this
/// with `approved = false` and replaces any prior chapter-link roster
/// with `long_chapter_ids`.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredReview {
    pub week_index: u32,
    pub effective_chapters: i64,
    pub score: i64,
    pub theme_claimed: bool,
    pub heat_bonus: i64,
    pub long_chapter_ids: Vec<DbId>,
    pub breakdown: ScoreBreakdown,
}

/* --------------------------------------------------------------------------
Pipeline
-------------------------------------------------------------------------- */

/// Chapters counted for scoring: the submitted count capped by the
/// blitz's per-review maximum.
pub fn effective_chapters(chapters: i64, scoring: &BlitzScoring) -> i64 {
    chapters.clamp(0, scoring.max_effective_chapters)
}

/// Zero-based blitz week containing the posted timestamp (7-day weeks
/// from the blitz start).
pub fn week_index(blitz_start: Timestamp, posted_at: Timestamp) -> u32 {
    let days = (posted_at - blitz_start).num_days();
    (days.max(0) / 7) as u32
}

/// Streak bonuses earned by this review: how many times the running
/// effective-chapter total ticks over the interval.
///
/// `prev_total` is clamped to zero first, so malformed history can
/// never produce a negative bonus count.
pub fn streak_bonuses(prev_total: i64, current: i64, interval: i64) -> i64 {
    if interval <= 0 {
        return 0;
    }
    let prev = prev_total.max(0);
    (prev + current) / interval - prev / interval
}

/// Score one review submission.
///
/// `heat` is the heat-bonus collaborator; it is invoked only when no
/// record exists yet for the (blitz, fic, author) key and the blitz
/// has a nonzero heat multiplier.
pub fn score_review(
    input: &ReviewInput,
    blitz_start: Timestamp,
    scoring: &BlitzScoring,
    schedule: &ThemeSchedule,
    history: &ReviewHistory,
    existing: Option<&ExistingReview>,
    heat: impl FnOnce() -> i64,
) -> Result<ScoredReview, CoreError> {
    // Stage 1: resolve the week and its theme.
    let week = week_index(blitz_start, input.posted_at);
    let theme: Option<&WeeklyTheme> = schedule.theme_for_week(week);

    // Validate everything before any arithmetic.
    if theme.is_some() && input.satisfies_theme.is_none() {
        return Err(CoreError::Validation(
            "A theme is active this week; please state whether your review \
             satisfies it."
                .to_string(),
        ));
    }
    for chapter in &input.chapter_links {
        if chapter.fic_id != input.fic_id {
            return Err(CoreError::Validation(format!(
                "Linked chapter {} does not belong to the reviewed fic.",
                chapter.id
            )));
        }
    }

    // Stage 2-3: effective chapters and base score.
    let effective = effective_chapters(input.chapters, scoring);
    let mut breakdown = ScoreBreakdown {
        base: effective * scoring.chapter_points,
        ..ScoreBreakdown::default()
    };

    // Stage 4: consecutive-chapter streak, suppressed when the active
    // theme says so.
    let streak_applies = theme.is_none_or(|t| t.consecutive_chapter_bonus_applies);
    if streak_applies {
        let prev_total: i64 = history.prior.iter().map(|r| r.effective_chapters).sum();
        let bonuses = streak_bonuses(prev_total, effective, scoring.consecutive_chapter_interval);
        breakdown.streak = bonuses * scoring.consecutive_chapter_bonus;
    }

    // Stage 5: theme bonus via the claim-granularity policy.
    let mut theme_claimed = false;
    if let Some(theme) = theme {
        let claimed = input.satisfies_theme.unwrap_or(false);
        let ctx = ThemeContext {
            effective_chapters: effective,
            prior_fic_claims: history.prior.iter().filter(|r| r.theme_claimed).count() as u32,
            prior_author_claims: history.prior_author_claims,
        };
        let multiples = claimable_bonuses(theme.claim, claimed, &ctx);
        breakdown.theme = multiples * scoring.theme_bonus;
        theme_claimed = claimed && multiples > 0;
    }

    // Stage 6: long-chapter bonuses; remember which chapters qualified
    // so the roster survives recalculation.
    let mut long_chapter_ids = Vec::new();
    for chapter in &input.chapter_links {
        if chapter.word_count >= scoring.long_chapter_bonus_words {
            breakdown.long_chapter += scoring.long_chapter_bonus;
            long_chapter_ids.push(chapter.id);
        }
    }

    // Stage 7: heat. Frozen at first creation; resubmission reuses the
    // stored value instead of recomputing.
    let heat_bonus = if scoring.heat_bonus_multiplier != 0 {
        match existing {
            Some(record) => record.heat_bonus,
            None => heat(),
        }
    } else {
        0
    };
    breakdown.heat = heat_bonus;

    let score =
        breakdown.base + breakdown.streak + breakdown.theme + breakdown.long_chapter + breakdown.heat;

    Ok(ScoredReview {
        week_index: week,
        effective_chapters: effective,
        score,
        theme_claimed,
        heat_bonus,
        long_chapter_ids,
        breakdown,
    })
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::{ThemeClaim, WeeklyTheme};
    use chrono::{TimeZone, Utc};

    fn start() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn posted(days: i64) -> Timestamp {
        start() + chrono::Duration::days(days)
    }

    fn input(chapters: i64) -> ReviewInput {
        ReviewInput {
            fic_id: 1,
            posted_at: posted(0),
            chapters,
            satisfies_theme: None,
            chapter_links: Vec::new(),
        }
    }

    fn theme(claim: ThemeClaim, streak_applies: bool) -> WeeklyTheme {
        WeeklyTheme {
            id: 1,
            name: "Theme Week".to_string(),
            claim,
            consecutive_chapter_bonus_applies: streak_applies,
        }
    }

    fn week0(theme_def: WeeklyTheme) -> ThemeSchedule {
        ThemeSchedule::new(vec![(0, theme_def)])
    }

    fn no_heat() -> i64 {
        panic!("heat collaborator must not be invoked");
    }

    #[test]
    fn test_base_score_three_chapters() {
        // chapter_points=10, 3 effective chapters, nothing else: 30.
        let scoring = BlitzScoring {
            consecutive_chapter_interval: 100,
            ..BlitzScoring::default()
        };
        let scored = score_review(
            &input(3),
            start(),
            &scoring,
            &ThemeSchedule::default(),
            &ReviewHistory::default(),
            None,
            no_heat,
        )
        .unwrap();
        assert_eq!(scored.score, 30);
        assert_eq!(scored.breakdown.base, 30);
        assert_eq!(scored.effective_chapters, 3);
        assert!(!scored.theme_claimed);
    }

    #[test]
    fn test_effective_chapters_capped() {
        let scoring = BlitzScoring {
            max_effective_chapters: 5,
            ..BlitzScoring::default()
        };
        assert_eq!(effective_chapters(12, &scoring), 5);
        assert_eq!(effective_chapters(4, &scoring), 4);
        assert_eq!(effective_chapters(-2, &scoring), 0);
    }

    #[test]
    fn test_week_index_seven_day_weeks() {
        assert_eq!(week_index(start(), posted(0)), 0);
        assert_eq!(week_index(start(), posted(6)), 0);
        assert_eq!(week_index(start(), posted(7)), 1);
        assert_eq!(week_index(start(), posted(20)), 2);
        // A timestamp before the blitz start clamps to week zero.
        assert_eq!(week_index(start(), posted(-3)), 0);
    }

    #[test]
    fn test_streak_formula_ticks_over_intervals() {
        // interval=3, prev=2, cur=4: floor(6/3) - floor(2/3) = 2.
        assert_eq!(streak_bonuses(2, 4, 3), 2);
        assert_eq!(streak_bonuses(0, 2, 3), 0);
        assert_eq!(streak_bonuses(2, 1, 3), 1);
        assert_eq!(streak_bonuses(3, 3, 3), 1);
    }

    #[test]
    fn test_streak_clamps_malformed_history() {
        assert_eq!(streak_bonuses(-10, 4, 3), 1);
        assert_eq!(streak_bonuses(4, 2, 0), 0);
    }

    #[test]
    fn test_streak_bonus_added_to_score() {
        let scoring = BlitzScoring {
            chapter_points: 10,
            consecutive_chapter_interval: 3,
            consecutive_chapter_bonus: 15,
            ..BlitzScoring::default()
        };
        let history = ReviewHistory {
            prior: vec![PriorReview {
                effective_chapters: 2,
                theme_claimed: false,
            }],
            prior_author_claims: 0,
        };
        let scored = score_review(
            &input(4),
            start(),
            &scoring,
            &ThemeSchedule::default(),
            &history,
            None,
            no_heat,
        )
        .unwrap();
        assert_eq!(scored.breakdown.streak, 30);
        assert_eq!(scored.score, 40 + 30);
    }

    #[test]
    fn test_theme_suppresses_streak_when_flagged() {
        let scoring = BlitzScoring {
            consecutive_chapter_interval: 1,
            ..BlitzScoring::default()
        };
        let schedule = week0(theme(ThemeClaim::PerReview, false));
        let mut review = input(3);
        review.satisfies_theme = Some(false);
        let scored = score_review(
            &review,
            start(),
            &scoring,
            &schedule,
            &ReviewHistory::default(),
            None,
            no_heat,
        )
        .unwrap();
        assert_eq!(scored.breakdown.streak, 0);
    }

    #[test]
    fn test_theme_claim_required_when_active() {
        let schedule = week0(theme(ThemeClaim::PerReview, true));
        let err = score_review(
            &input(1),
            start(),
            &BlitzScoring::default(),
            &schedule,
            &ReviewHistory::default(),
            None,
            no_heat,
        )
        .unwrap_err();
        assert!(err.to_string().contains("theme is active"));
    }

    #[test]
    fn test_theme_bonus_per_review() {
        let scoring = BlitzScoring {
            theme_bonus: 20,
            ..BlitzScoring::default()
        };
        let schedule = week0(theme(ThemeClaim::PerReview, true));
        let mut review = input(1);
        review.satisfies_theme = Some(true);
        let scored = score_review(
            &review,
            start(),
            &scoring,
            &schedule,
            &ReviewHistory::default(),
            None,
            no_heat,
        )
        .unwrap();
        assert_eq!(scored.breakdown.theme, 20);
        assert!(scored.theme_claimed);
    }

    #[test]
    fn test_per_fic_theme_not_granted_twice() {
        let schedule = week0(theme(ThemeClaim::PerFic, true));
        let history = ReviewHistory {
            prior: vec![PriorReview {
                effective_chapters: 1,
                theme_claimed: true,
            }],
            prior_author_claims: 1,
        };
        let mut review = input(1);
        review.satisfies_theme = Some(true);
        let scored = score_review(
            &review,
            start(),
            &BlitzScoring::default(),
            &schedule,
            &history,
            None,
            no_heat,
        )
        .unwrap();
        assert_eq!(scored.breakdown.theme, 0);
        assert!(!scored.theme_claimed);
    }

    #[test]
    fn test_long_chapter_bonus_and_roster() {
        let scoring = BlitzScoring {
            long_chapter_bonus_words: 5_000,
            long_chapter_bonus: 5,
            ..BlitzScoring::default()
        };
        let mut review = input(2);
        review.chapter_links = vec![
            ChapterRef {
                id: 31,
                fic_id: 1,
                word_count: 6_200,
            },
            ChapterRef {
                id: 32,
                fic_id: 1,
                word_count: 800,
            },
            ChapterRef {
                id: 33,
                fic_id: 1,
                word_count: 5_000,
            },
        ];
        let scored = score_review(
            &review,
            start(),
            &scoring,
            &ThemeSchedule::default(),
            &ReviewHistory::default(),
            None,
            no_heat,
        )
        .unwrap();
        assert_eq!(scored.breakdown.long_chapter, 10);
        assert_eq!(scored.long_chapter_ids, vec![31, 33]);
    }

    #[test]
    fn test_chapter_from_other_fic_rejected() {
        let mut review = input(1);
        review.chapter_links = vec![ChapterRef {
            id: 31,
            fic_id: 999,
            word_count: 6_000,
        }];
        let err = score_review(
            &review,
            start(),
            &BlitzScoring::default(),
            &ThemeSchedule::default(),
            &ReviewHistory::default(),
            None,
            no_heat,
        )
        .unwrap_err();
        assert!(err.to_string().contains("does not belong"));
    }

    #[test]
    fn test_heat_computed_on_first_creation() {
        let scoring = BlitzScoring {
            heat_bonus_multiplier: 2,
            consecutive_chapter_interval: 100,
            ..BlitzScoring::default()
        };
        let scored = score_review(
            &input(1),
            start(),
            &scoring,
            &ThemeSchedule::default(),
            &ReviewHistory::default(),
            None,
            || 12,
        )
        .unwrap();
        assert_eq!(scored.heat_bonus, 12);
        assert_eq!(scored.score, 10 + 12);
    }

    #[test]
    fn test_heat_frozen_on_resubmission() {
        let scoring = BlitzScoring {
            heat_bonus_multiplier: 2,
            consecutive_chapter_interval: 100,
            ..BlitzScoring::default()
        };
        // The collaborator would now return a different value; the
        // stored bonus wins and the collaborator is never called.
        let scored = score_review(
            &input(1),
            start(),
            &scoring,
            &ThemeSchedule::default(),
            &ReviewHistory::default(),
            Some(&ExistingReview { heat_bonus: 7 }),
            no_heat,
        )
        .unwrap();
        assert_eq!(scored.heat_bonus, 7);
        assert_eq!(scored.score, 10 + 7);
    }

    #[test]
    fn test_heat_skipped_when_multiplier_zero() {
        let scoring = BlitzScoring {
            heat_bonus_multiplier: 0,
            consecutive_chapter_interval: 100,
            ..BlitzScoring::default()
        };
        let scored = score_review(
            &input(1),
            start(),
            &scoring,
            &ThemeSchedule::default(),
            &ReviewHistory::default(),
            Some(&ExistingReview { heat_bonus: 7 }),
            no_heat,
        )
        .unwrap();
        assert_eq!(scored.heat_bonus, 0);
        assert_eq!(scored.score, 10);
    }
}
