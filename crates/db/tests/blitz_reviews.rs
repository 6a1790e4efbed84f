//! Integration tests for blitz review persistence.
//!
//! Verifies that:
//! - The per (blitz, fic, author) advisory lock is held for the
//!   duration of the submitting transaction
//! - A resubmission overwrites in place and resets approval
//! - History queries exclude the record being resubmitted

use chrono::Utc;
use sqlx::PgPool;

use fanfare_db::repositories::{BlitzReviewRepo, FicRepo, MemberRepo, ScoredReviewValues};

/* --------------------------------------------------------------------------
Helpers
-------------------------------------------------------------------------- */

async fn seed_blitz(pool: &PgPool) -> i64 {
    sqlx::query_scalar("INSERT INTO blitzes (name, started_at) VALUES ('Summer Blitz', now()) RETURNING id")
        .fetch_one(pool)
        .await
        .unwrap()
}

fn values(score: i64, theme: bool, heat_bonus: i64) -> ScoredReviewValues {
    ScoredReviewValues {
        posted_at: Utc::now(),
        week_index: 0,
        chapters: 3,
        score,
        theme,
        heat_bonus,
    }
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */

#[sqlx::test]
async fn test_submission_lock_held_until_commit(pool: PgPool) {
    let blitz = seed_blitz(&pool).await;
    let fic = FicRepo::get_or_create(&pool, 1, None, "fic").await.unwrap();
    let author = MemberRepo::get_or_create(&pool, 1, "author").await.unwrap();

    let mut holder = pool.begin().await.unwrap();
    BlitzReviewRepo::lock_submission_key(&mut holder, blitz, fic.id, author.id)
        .await
        .unwrap();

    // A second transaction cannot take the same key while the first
    // holds it.
    let key = format!("blitz_review:{blitz}:{}:{}", fic.id, author.id);
    let mut contender = pool.begin().await.unwrap();
    let acquired: bool =
        sqlx::query_scalar("SELECT pg_try_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(&key)
            .fetch_one(&mut *contender)
            .await
            .unwrap();
    assert!(!acquired);
    contender.rollback().await.unwrap();

    // Commit releases the lock.
    holder.commit().await.unwrap();

    let mut late = pool.begin().await.unwrap();
    let acquired: bool =
        sqlx::query_scalar("SELECT pg_try_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(&key)
            .fetch_one(&mut *late)
            .await
            .unwrap();
    assert!(acquired);
    late.rollback().await.unwrap();
}

#[sqlx::test]
async fn test_resubmission_overwrites_and_resets_approval(pool: PgPool) {
    let blitz = seed_blitz(&pool).await;
    let fic = FicRepo::get_or_create(&pool, 1, None, "fic").await.unwrap();
    let author = MemberRepo::get_or_create(&pool, 1, "author").await.unwrap();

    let mut tx = pool.begin().await.unwrap();
    let review = BlitzReviewRepo::insert_scored(&mut tx, blitz, fic.id, author.id, &values(30, false, 7))
        .await
        .unwrap();
    tx.commit().await.unwrap();

    let approved = BlitzReviewRepo::finalize(&pool, review.id, 30, false).await.unwrap();
    assert!(approved.approved);

    // The resubmission keeps the row and the stored heat bonus, but
    // the approval must be earned again.
    let mut tx = pool.begin().await.unwrap();
    let resubmitted = BlitzReviewRepo::update_scored(&mut tx, review.id, &values(50, true, 7))
        .await
        .unwrap();
    tx.commit().await.unwrap();

    assert_eq!(resubmitted.id, review.id);
    assert_eq!(resubmitted.score, 50);
    assert_eq!(resubmitted.heat_bonus, 7);
    assert!(!resubmitted.approved);

    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM blitz_reviews WHERE blitz_id = $1 AND fic_id = $2 AND author_id = $3",
    )
    .bind(blitz)
    .bind(fic.id)
    .bind(author.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(count, 1);
}

#[sqlx::test]
async fn test_history_excludes_the_resubmitted_record(pool: PgPool) {
    let blitz = seed_blitz(&pool).await;
    let fic = FicRepo::get_or_create(&pool, 1, None, "fic").await.unwrap();
    let author = MemberRepo::get_or_create(&pool, 1, "author").await.unwrap();

    let mut tx = pool.begin().await.unwrap();
    let earlier = BlitzReviewRepo::insert_scored(&mut tx, blitz, fic.id, author.id, &values(30, true, 0))
        .await
        .unwrap();
    let current = BlitzReviewRepo::insert_scored(&mut tx, blitz, fic.id, author.id, &values(20, true, 0))
        .await
        .unwrap();

    let prior = BlitzReviewRepo::list_prior(&mut tx, blitz, fic.id, author.id, Some(current.id))
        .await
        .unwrap();
    assert_eq!(prior.len(), 1);
    assert_eq!(prior[0].id, earlier.id);

    let claims = BlitzReviewRepo::count_author_theme_claims(&mut tx, blitz, author.id, Some(current.id))
        .await
        .unwrap();
    assert_eq!(claims, 1);

    tx.rollback().await.unwrap();
}
