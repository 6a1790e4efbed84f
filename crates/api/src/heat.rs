//! Default heat-bonus policy.
//!
//! The scoring engine only guarantees that heat is computed once and
//! frozen; what "heat" means is this policy's call. The default pays
//! the blitz's multiplier for every review the author submitted in a
//! trailing window, rewarding review velocity.

/// Trailing window the policy counts reviews in.
pub const HEAT_WINDOW_HOURS: i64 = 24;

/// Points awarded for `recent_reviews` submissions inside the window.
pub fn heat_bonus(recent_reviews: i64, multiplier: i64) -> i64 {
    recent_reviews.max(0) * multiplier
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scales_with_recent_reviews() {
        assert_eq!(heat_bonus(0, 5), 0);
        assert_eq!(heat_bonus(3, 5), 15);
    }

    #[test]
    fn test_negative_count_clamped() {
        assert_eq!(heat_bonus(-2, 5), 0);
    }
}
