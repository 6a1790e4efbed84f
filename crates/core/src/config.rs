//! Tunable rule constants for both engines.
//!
//! Nomination limits come from server configuration; blitz scoring
//! constants are stored per contest and loaded alongside the blitz row.

use serde::{Deserialize, Serialize};

/// Limits applied to a member's full nomination batch for one year.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NominationRules {
    /// Maximum times any single fic may be nominated by one member.
    pub max_fic_nominations: u32,
    /// Maximum times any single person may be nominated by one member,
    /// counting direct nominations and nominations of their fics.
    pub max_person_nominations: u32,
    /// Minimum number of distinct people a valid batch must nominate.
    pub min_distinct_people: u32,
}

impl Default for NominationRules {
    fn default() -> Self {
        Self {
            max_fic_nominations: 3,
            max_person_nominations: 5,
            min_distinct_people: 4,
        }
    }
}

/// Scoring constants for one review blitz.
///
/// A `heat_bonus_multiplier` of zero disables the heat bonus entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlitzScoring {
    /// Points per effective chapter reviewed.
    pub chapter_points: i64,
    /// Streak length (in effective chapters) that triggers one
    /// consecutive-chapter bonus.
    pub consecutive_chapter_interval: i64,
    /// Points per consecutive-chapter bonus earned.
    pub consecutive_chapter_bonus: i64,
    /// Points per theme-bonus multiple claimed.
    pub theme_bonus: i64,
    /// Word count at which a chapter earns the long-chapter bonus.
    pub long_chapter_bonus_words: i64,
    /// Points per qualifying long chapter.
    pub long_chapter_bonus: i64,
    /// Scale factor handed to the heat-bonus policy; zero disables it.
    pub heat_bonus_multiplier: i64,
    /// Cap on chapters counted per review (anti chapter-splitting).
    pub max_effective_chapters: i64,
}

impl Default for BlitzScoring {
    fn default() -> Self {
        Self {
            chapter_points: 10,
            consecutive_chapter_interval: 3,
            consecutive_chapter_bonus: 15,
            theme_bonus: 20,
            long_chapter_bonus_words: 5_000,
            long_chapter_bonus: 5,
            heat_bonus_multiplier: 0,
            max_effective_chapters: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scoring_disables_heat() {
        assert_eq!(BlitzScoring::default().heat_bonus_multiplier, 0);
    }

    #[test]
    fn test_default_rules_require_multiple_authors() {
        let rules = NominationRules::default();
        assert!(rules.min_distinct_people > 1);
        assert!(rules.max_person_nominations >= rules.max_fic_nominations);
    }
}
