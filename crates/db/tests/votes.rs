//! Integration tests for vote persistence.
//!
//! Verifies the (year, member, award) upsert key: saving the same vote
//! mapping twice produces no duplicate rows, and a changed choice
//! replaces the stored one in place.

use sqlx::PgPool;

use fanfare_db::repositories::{MemberRepo, NominationRepo, NominationValues, VoteRepo};

/* --------------------------------------------------------------------------
Helpers
-------------------------------------------------------------------------- */

async fn seed_award(pool: &PgPool, name: &str) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO awards (name, category, has_person) VALUES ($1, 'Author awards', TRUE) \
         RETURNING id",
    )
    .bind(name)
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn seed_nomination(pool: &PgPool, year: i32, member_id: i64, award_id: i64) -> i64 {
    let values = NominationValues {
        nominee_id: Some(member_id),
        fic_id: None,
        detail: None,
        link: None,
        comment: None,
    };
    NominationRepo::insert(pool, year, member_id, award_id, &values)
        .await
        .unwrap()
        .id
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */

#[sqlx::test]
async fn test_same_vote_twice_produces_no_duplicate(pool: PgPool) {
    let voter = MemberRepo::get_or_create(&pool, 1, "voter").await.unwrap();
    let award = seed_award(&pool, "Best Author").await;
    let nomination = seed_nomination(&pool, 2026, voter.id, award).await;

    let first = VoteRepo::upsert(&pool, 2026, voter.id, award, nomination)
        .await
        .unwrap();
    let second = VoteRepo::upsert(&pool, 2026, voter.id, award, nomination)
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.nomination_id, nomination);

    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM votes WHERE year = 2026 AND member_id = $1 AND award_id = $2",
    )
    .bind(voter.id)
    .bind(award)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(count, 1);
}

#[sqlx::test]
async fn test_changed_vote_replaces_in_place(pool: PgPool) {
    let voter = MemberRepo::get_or_create(&pool, 1, "voter").await.unwrap();
    let award = seed_award(&pool, "Best Author").await;
    let first_choice = seed_nomination(&pool, 2026, voter.id, award).await;
    let second_choice = seed_nomination(&pool, 2026, voter.id, award).await;

    let original = VoteRepo::upsert(&pool, 2026, voter.id, award, first_choice)
        .await
        .unwrap();
    let changed = VoteRepo::upsert(&pool, 2026, voter.id, award, second_choice)
        .await
        .unwrap();

    assert_eq!(original.id, changed.id);
    assert_eq!(changed.nomination_id, second_choice);

    let votes = VoteRepo::list_for_member_year(&pool, 2026, voter.id).await.unwrap();
    assert_eq!(votes.len(), 1);
}
