//! Voting form validation.
//!
//! The ballot offers one field per active award whose valid domain is
//! exactly that award's nomination pool. Validation rejects choices
//! that point outside their category (client-side tampering) and
//! requires votes in at least half of the offered categories.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// One offered award on the ballot with its nomination pool. Awards
/// with an empty pool are not offered and do not count toward the
/// coverage threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BallotField {
    pub award_id: DbId,
    pub award_name: String,
    pub nomination_ids: Vec<DbId>,
}

/// A member's submitted choice for one award.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VoteChoice {
    pub award_id: DbId,
    pub nomination_id: DbId,
}

/// One vote to upsert, keyed by (year, member, award) at the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteWrite {
    pub award_id: DbId,
    pub nomination_id: DbId,
}

/// Validate a member's vote selections against the offered ballot.
///
/// Awards with no choice are left alone (any pre-existing vote for
/// them survives a blank resubmission), so the result contains only
/// upserts.
pub fn validate_votes(
    fields: &[BallotField],
    choices: &[VoteChoice],
) -> Result<Vec<VoteWrite>, CoreError> {
    let offered: Vec<&BallotField> = fields
        .iter()
        .filter(|f| !f.nomination_ids.is_empty())
        .collect();

    let mut writes = Vec::with_capacity(choices.len());
    let mut voted_awards: HashSet<DbId> = HashSet::new();

    for choice in choices {
        let Some(field) = offered.iter().find(|f| f.award_id == choice.award_id) else {
            return Err(CoreError::Validation(format!(
                "No votes are being accepted for award {}.",
                choice.award_id
            )));
        };
        if !field.nomination_ids.contains(&choice.nomination_id) {
            return Err(CoreError::Validation(format!(
                "The chosen nomination does not belong to the {} category.",
                field.award_name
            )));
        }
        if !voted_awards.insert(choice.award_id) {
            return Err(CoreError::Validation(format!(
                "You can only cast one vote in the {} category.",
                field.award_name
            )));
        }
        writes.push(VoteWrite {
            award_id: choice.award_id,
            nomination_id: choice.nomination_id,
        });
    }

    // Votes must cover at least half of the offered categories,
    // rounding up on odd counts.
    if writes.len() * 2 < offered.len() {
        return Err(CoreError::Validation(
            "You must place a vote in at least half of the available categories.".to_string(),
        ));
    }

    Ok(writes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(award_id: DbId, nomination_ids: &[DbId]) -> BallotField {
        BallotField {
            award_id,
            award_name: format!("award-{award_id}"),
            nomination_ids: nomination_ids.to_vec(),
        }
    }

    fn choice(award_id: DbId, nomination_id: DbId) -> VoteChoice {
        VoteChoice {
            award_id,
            nomination_id,
        }
    }

    #[test]
    fn test_valid_ballot_produces_writes() {
        let fields = vec![field(1, &[10, 11]), field(2, &[20])];
        let writes = validate_votes(&fields, &[choice(1, 11), choice(2, 20)]).unwrap();
        assert_eq!(writes.len(), 2);
        assert_eq!(
            writes[0],
            VoteWrite {
                award_id: 1,
                nomination_id: 11
            }
        );
    }

    #[test]
    fn test_identical_resubmission_yields_identical_writes() {
        // The writes are pure upserts keyed by award, so submitting
        // the same ballot twice must plan the exact same writes.
        let fields = vec![field(1, &[10, 11]), field(2, &[20])];
        let choices = vec![choice(1, 11), choice(2, 20)];
        let first = validate_votes(&fields, &choices).unwrap();
        let second = validate_votes(&fields, &choices).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_cross_category_vote_rejected() {
        let fields = vec![field(1, &[10, 11]), field(2, &[20])];
        // Nomination 20 belongs to award 2, submitted under award 1.
        let err = validate_votes(&fields, &[choice(1, 20), choice(2, 20)])
            .unwrap_err()
            .to_string();
        assert!(err.contains("does not belong to the award-1 category"));
    }

    #[test]
    fn test_vote_for_unoffered_award_rejected() {
        let fields = vec![field(1, &[10])];
        assert!(validate_votes(&fields, &[choice(9, 10)]).is_err());
    }

    #[test]
    fn test_award_with_empty_pool_is_not_offered() {
        // Award 2 has no nominations: it neither accepts votes nor
        // counts toward the coverage threshold.
        let fields = vec![field(1, &[10]), field(2, &[])];
        assert!(validate_votes(&fields, &[choice(2, 10)]).is_err());
        assert!(validate_votes(&fields, &[choice(1, 10)]).is_ok());
    }

    #[test]
    fn test_duplicate_vote_in_same_award_rejected() {
        let fields = vec![field(1, &[10, 11])];
        assert!(validate_votes(&fields, &[choice(1, 10), choice(1, 11)]).is_err());
    }

    #[test]
    fn test_coverage_threshold_even_count() {
        let fields = vec![field(1, &[10]), field(2, &[20]), field(3, &[30]), field(4, &[40])];
        assert!(validate_votes(&fields, &[choice(1, 10)]).is_err());
        assert!(validate_votes(&fields, &[choice(1, 10), choice(3, 30)]).is_ok());
    }

    #[test]
    fn test_coverage_threshold_rounds_up_on_odd_count() {
        // Three offered fields: one vote fails (2 < 3), two pass.
        let fields = vec![field(1, &[10]), field(2, &[20]), field(3, &[30])];
        assert!(validate_votes(&fields, &[choice(2, 20)]).is_err());
        assert!(validate_votes(&fields, &[choice(2, 20), choice(3, 30)]).is_ok());
    }

    #[test]
    fn test_single_field_requires_the_one_vote() {
        let fields = vec![field(1, &[10])];
        assert!(validate_votes(&fields, &[]).is_err());
        assert!(validate_votes(&fields, &[choice(1, 10)]).is_ok());
    }

    #[test]
    fn test_five_fields_require_three_votes() {
        let fields: Vec<BallotField> =
            (1..=5).map(|i| field(i, &[i * 10])).collect();
        let two: Vec<VoteChoice> = (1..=2).map(|i| choice(i, i * 10)).collect();
        let three: Vec<VoteChoice> = (1..=3).map(|i| choice(i, i * 10)).collect();
        assert!(validate_votes(&fields, &two).is_err());
        assert!(validate_votes(&fields, &three).is_ok());
    }
}
