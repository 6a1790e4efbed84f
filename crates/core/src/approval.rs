//! Moderator approval adjustments for scored reviews.
//!
//! Approval never re-runs the scoring pipeline: streak and heat
//! bonuses depend on submission order and are locked in at submission
//! time, so replaying them here would double-count. The only score
//! change a moderator can make is toggling the theme flag, applied as
//! a delta from the claim-granularity policy.

use crate::theme::{claimable_bonuses, ThemeContext, WeeklyTheme};
use crate::types::DbId;

/// A moderator's verdict on a pending review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeratorDecision {
    /// Finalize the review, asserting whether the theme bonus applies.
    Approve { claim_theme: bool },
    /// Discard the review entirely; nothing is archived.
    Reject,
}

/// The persisted review record under moderation.
#[derive(Debug, Clone, Copy)]
pub struct StoredReview {
    pub id: DbId,
    pub score: i64,
    pub theme_claimed: bool,
    pub effective_chapters: i64,
}

/// What the caller must do to the stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalOutcome {
    /// Hard-delete the record; a later lookup must return not-found.
    Delete,
    /// Set `approved = true` with the given final score and theme flag.
    Finalize { score: i64, theme_claimed: bool },
}

/// Apply a moderator decision to a stored review.
///
/// The theme-bonus delta is evaluated against the review's stored
/// context with empty history, matching how the bonus was granted at
/// submission time. When the posting week had no theme, a toggle
/// request is a no-op.
pub fn adjust(
    decision: ModeratorDecision,
    stored: &StoredReview,
    theme: Option<&WeeklyTheme>,
    theme_bonus_points: i64,
) -> ApprovalOutcome {
    let claim_theme = match decision {
        ModeratorDecision::Reject => return ApprovalOutcome::Delete,
        ModeratorDecision::Approve { claim_theme } => claim_theme,
    };

    if claim_theme == stored.theme_claimed {
        return ApprovalOutcome::Finalize {
            score: stored.score,
            theme_claimed: stored.theme_claimed,
        };
    }

    let Some(theme) = theme else {
        return ApprovalOutcome::Finalize {
            score: stored.score,
            theme_claimed: stored.theme_claimed,
        };
    };

    let ctx = ThemeContext {
        effective_chapters: stored.effective_chapters,
        prior_fic_claims: 0,
        prior_author_claims: 0,
    };
    let delta = (claimable_bonuses(theme.claim, true, &ctx)
        - claimable_bonuses(theme.claim, false, &ctx))
        * theme_bonus_points;

    let score = if claim_theme {
        stored.score + delta
    } else {
        stored.score - delta
    };

    ApprovalOutcome::Finalize {
        score,
        theme_claimed: claim_theme,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::ThemeClaim;

    fn stored(score: i64, theme_claimed: bool) -> StoredReview {
        StoredReview {
            id: 1,
            score,
            theme_claimed,
            effective_chapters: 4,
        }
    }

    fn per_chapter_theme() -> WeeklyTheme {
        WeeklyTheme {
            id: 1,
            name: "Theme Week".to_string(),
            claim: ThemeClaim::PerChapter,
            consecutive_chapter_bonus_applies: true,
        }
    }

    #[test]
    fn test_reject_deletes_record() {
        let outcome = adjust(
            ModeratorDecision::Reject,
            &stored(50, true),
            Some(&per_chapter_theme()),
            20,
        );
        assert_eq!(outcome, ApprovalOutcome::Delete);
    }

    #[test]
    fn test_approve_unchanged_flag_keeps_score() {
        let outcome = adjust(
            ModeratorDecision::Approve { claim_theme: true },
            &stored(50, true),
            Some(&per_chapter_theme()),
            20,
        );
        assert_eq!(
            outcome,
            ApprovalOutcome::Finalize {
                score: 50,
                theme_claimed: true
            }
        );
    }

    #[test]
    fn test_toggle_on_adds_delta() {
        // Per-chapter theme, 4 effective chapters, 20 points each: +80.
        let outcome = adjust(
            ModeratorDecision::Approve { claim_theme: true },
            &stored(50, false),
            Some(&per_chapter_theme()),
            20,
        );
        assert_eq!(
            outcome,
            ApprovalOutcome::Finalize {
                score: 130,
                theme_claimed: true
            }
        );
    }

    #[test]
    fn test_toggle_off_subtracts_same_delta() {
        let outcome = adjust(
            ModeratorDecision::Approve { claim_theme: false },
            &stored(130, true),
            Some(&per_chapter_theme()),
            20,
        );
        assert_eq!(
            outcome,
            ApprovalOutcome::Finalize {
                score: 50,
                theme_claimed: false
            }
        );
    }

    #[test]
    fn test_toggle_without_theme_is_noop() {
        let outcome = adjust(
            ModeratorDecision::Approve { claim_theme: true },
            &stored(50, false),
            None,
            20,
        );
        assert_eq!(
            outcome,
            ApprovalOutcome::Finalize {
                score: 50,
                theme_claimed: false
            }
        );
    }

    #[test]
    fn test_per_review_toggle_is_single_bonus() {
        let theme = WeeklyTheme {
            claim: ThemeClaim::PerReview,
            ..per_chapter_theme()
        };
        let outcome = adjust(
            ModeratorDecision::Approve { claim_theme: true },
            &stored(50, false),
            Some(&theme),
            20,
        );
        assert_eq!(
            outcome,
            ApprovalOutcome::Finalize {
                score: 70,
                theme_claimed: true
            }
        );
    }
}
