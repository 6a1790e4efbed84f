//! Handlers for the review blitz: submission, moderation, and
//! standings.
//!
//! Submission is the hot path. It serializes on a per
//! (blitz, fic, author) advisory lock so two racing submissions for
//! the same key cannot both read empty history, then runs the scoring
//! pipeline inside that transaction and persists the verdict with
//! `approved = false`.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use fanfare_core::approval::{adjust, ApprovalOutcome, ModeratorDecision, StoredReview};
use fanfare_core::error::CoreError;
use fanfare_core::scoring::{
    effective_chapters, score_review, ChapterRef, ExistingReview, PriorReview, ReviewHistory,
    ReviewInput,
};
use fanfare_core::theme::ThemeSchedule;
use fanfare_core::types::DbId;
use fanfare_db::models::blitz::{Blitz, BlitzReview, ModerateReview, SubmitReview};
use fanfare_db::models::theme::ScheduledTheme;
use fanfare_db::repositories::{
    BlitzRepo, BlitzReviewRepo, FicRepo, MemberRepo, ScoredReviewValues,
};
use fanfare_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::heat;
use crate::response::DataResponse;
use crate::state::AppState;

/// The current blitz with its theme schedule.
#[derive(Serialize)]
pub struct BlitzView {
    pub blitz: Blitz,
    pub schedule: Vec<ScheduledTheme>,
}

/// A member's standing in the current blitz.
#[derive(Serialize)]
pub struct MemberStanding {
    pub member_id: DbId,
    pub approved_points: i64,
    pub pending_points: i64,
    pub bonus_points: i64,
    pub points_spent: i64,
    pub reviews: Vec<BlitzReview>,
}

/// GET /api/v1/blitz
///
/// The currently running blitz and its weekly theme schedule.
pub async fn get_current(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let blitz = current_blitz(&state.pool).await?;
    let schedule = BlitzRepo::theme_schedule(&state.pool, blitz.id).await?;

    Ok(Json(DataResponse {
        data: BlitzView { blitz, schedule },
    }))
}

/// GET /api/v1/blitz/themes
///
/// All defined weekly themes.
pub async fn list_themes(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let themes = BlitzRepo::list_themes(&state.pool).await?;

    Ok(Json(DataResponse { data: themes }))
}

/// POST /api/v1/blitz/reviews
///
/// Submit (or resubmit) a review for scoring. The computed score is
/// stored with `approved = false`; a resubmission overwrites the
/// existing record for the (blitz, fic, author) key and resets its
/// approval.
pub async fn submit_review(
    State(state): State<AppState>,
    Json(input): Json<SubmitReview>,
) -> AppResult<impl IntoResponse> {
    let pool = &state.pool;

    let blitz = current_blitz(pool).await?;
    let scoring = blitz.scoring();

    let fic = FicRepo::find_by_id(pool, input.fic_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Fic",
            id: input.fic_id,
        }))?;
    let author = MemberRepo::find_by_id(pool, input.author_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Member",
            id: input.author_id,
        }))?;

    let chapters = FicRepo::chapters_by_ids(pool, &input.chapter_ids).await?;
    if chapters.len() != input.chapter_ids.len() {
        return Err(AppError::BadRequest(
            "One or more linked chapters do not exist.".to_string(),
        ));
    }
    let chapter_links: Vec<ChapterRef> = chapters
        .iter()
        .map(|c| ChapterRef {
            id: c.id,
            fic_id: c.fic_id,
            word_count: c.word_count,
        })
        .collect();

    let schedule = load_schedule(pool, blitz.id).await?;

    let mut tx = pool.begin().await?;
    BlitzReviewRepo::lock_submission_key(&mut tx, blitz.id, fic.id, author.id).await?;

    let existing = BlitzReviewRepo::find_by_key(&mut tx, blitz.id, fic.id, author.id).await?;
    let exclude_id = existing.as_ref().map(|r| r.id);

    let prior_rows =
        BlitzReviewRepo::list_prior(&mut tx, blitz.id, fic.id, author.id, exclude_id).await?;
    let prior_author_claims =
        BlitzReviewRepo::count_author_theme_claims(&mut tx, blitz.id, author.id, exclude_id)
            .await?;


    // Heat inputs are only needed on first creation of the key.
    let recent = if existing.is_none() && scoring.heat_bonus_multiplier != 0 {
        let since = input.posted_at - chrono::Duration::hours(heat::HEAT_WINDOW_HOURS);
        BlitzReviewRepo::count_recent_by_author(&mut tx, blitz.id, author.id, since).await?
    } else {
        0
    };

    let history = ReviewHistory {
        prior: prior_rows
            .iter()
            .map(|r| PriorReview {
                effective_chapters: effective_chapters(r.chapters, &scoring),
                theme_claimed: r.theme,
            })
            .collect(),
        prior_author_claims: prior_author_claims.max(0) as u32,
    };
    let existing_record = existing.as_ref().map(|r| ExistingReview {
        heat_bonus: r.heat_bonus,
    });

    let engine_input = ReviewInput {
        fic_id: fic.id,
        posted_at: input.posted_at,
        chapters: input.chapters,
        satisfies_theme: input.satisfies_theme,
        chapter_links,
    };

    let scored = score_review(
        &engine_input,
        blitz.started_at,
        &scoring,
        &schedule,
        &history,
        existing_record.as_ref(),
        || heat::heat_bonus(recent, scoring.heat_bonus_multiplier),
    )?;

    let values = ScoredReviewValues {
        posted_at: input.posted_at,
        week_index: scored.week_index as i32,
        chapters: input.chapters,
        score: scored.score,
        theme: scored.theme_claimed,
        heat_bonus: scored.heat_bonus,
    };
    let review = match &existing {
        Some(record) => BlitzReviewRepo::update_scored(&mut tx, record.id, &values).await?,
        None => {
            BlitzReviewRepo::insert_scored(&mut tx, blitz.id, fic.id, author.id, &values).await?
        }
    };
    BlitzReviewRepo::replace_chapter_links(&mut tx, review.id, &scored.long_chapter_ids).await?;

    tx.commit().await?;

    // The author shows on the leaderboard from their first submission.
    BlitzRepo::get_or_create_user(pool, blitz.id, author.id).await?;

    tracing::info!(
        review_id = review.id,
        blitz_id = blitz.id,
        fic_id = fic.id,
        author_id = author.id,
        score = scored.score,
        base = scored.breakdown.base,
        streak = scored.breakdown.streak,
        theme = scored.breakdown.theme,
        long_chapter = scored.breakdown.long_chapter,
        heat = scored.breakdown.heat,
        resubmission = existing.is_some(),
        "Review scored"
    );

    Ok(Json(DataResponse { data: review }))
}

/// GET /api/v1/blitz/reviews/pending
///
/// Reviews awaiting moderation for the current blitz.
pub async fn list_pending(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let blitz = current_blitz(&state.pool).await?;
    let reviews = BlitzReviewRepo::list_pending(&state.pool, blitz.id).await?;

    Ok(Json(DataResponse { data: reviews }))
}

/// POST /api/v1/blitz/reviews/{id}/moderate
///
/// Apply a moderator verdict. Rejection hard-deletes the record;
/// approval finalizes it, optionally toggling the theme flag with the
/// matching score delta. Responds with the finalized review, or `null`
/// when the record was deleted.
pub async fn moderate_review(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ModerateReview>,
) -> AppResult<impl IntoResponse> {
    let pool = &state.pool;

    let review = BlitzReviewRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "BlitzReview",
            id,
        }))?;

    let decision = if input.approve {
        ModeratorDecision::Approve {
            claim_theme: input.claim_theme.unwrap_or(review.theme),
        }
    } else {
        ModeratorDecision::Reject
    };

    let blitz = BlitzRepo::find_by_id(pool, review.blitz_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Blitz",
            id: review.blitz_id,
        }))?;
    let scoring = blitz.scoring();
    let schedule = load_schedule(pool, blitz.id).await?;
    let theme = schedule.theme_for_week(review.week_index.max(0) as u32);

    let stored = StoredReview {
        id: review.id,
        score: review.score,
        theme_claimed: review.theme,
        effective_chapters: effective_chapters(review.chapters, &scoring),
    };

    match adjust(decision, &stored, theme, scoring.theme_bonus) {
        ApprovalOutcome::Delete => {
            BlitzReviewRepo::delete(pool, id).await?;
            tracing::info!(review_id = id, "Review rejected and deleted");
            Ok(Json(DataResponse::<Option<BlitzReview>> { data: None }))
        }
        ApprovalOutcome::Finalize {
            score,
            theme_claimed,
        } => {
            let finalized = BlitzReviewRepo::finalize(pool, id, score, theme_claimed).await?;
            tracing::info!(review_id = id, score, theme_claimed, "Review approved");
            Ok(Json(DataResponse {
                data: Some(finalized),
            }))
        }
    }
}

/// GET /api/v1/blitz/leaderboard
///
/// Current standings: approved review scores plus bonus points per
/// member, highest first.
pub async fn leaderboard(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let blitz = current_blitz(&state.pool).await?;
    let rows = BlitzRepo::leaderboard(&state.pool, blitz.id).await?;

    Ok(Json(DataResponse { data: rows }))
}

/// GET /api/v1/blitz/members/{member_id}
///
/// One member's reviews and point totals for the current blitz.
pub async fn member_standing(
    State(state): State<AppState>,
    Path(member_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let pool = &state.pool;

    let blitz = current_blitz(pool).await?;
    let account = BlitzRepo::get_or_create_user(pool, blitz.id, member_id).await?;
    let reviews = BlitzReviewRepo::list_for_author(pool, blitz.id, member_id).await?;

    let approved_points: i64 = reviews.iter().filter(|r| r.approved).map(|r| r.score).sum();
    let pending_points: i64 = reviews
        .iter()
        .filter(|r| !r.approved)
        .map(|r| r.score)
        .sum();

    Ok(Json(DataResponse {
        data: MemberStanding {
            member_id,
            approved_points,
            pending_points,
            bonus_points: account.bonus_points,
            points_spent: account.points_spent,
            reviews,
        },
    }))
}

/// The running blitz, or a 400 when none has started.
async fn current_blitz(pool: &DbPool) -> AppResult<Blitz> {
    BlitzRepo::get_current(pool)
        .await?
        .ok_or_else(|| AppError::BadRequest("No review blitz is currently running.".to_string()))
}

/// Load a blitz's theme schedule in the form the scoring engine
/// consumes.
async fn load_schedule(pool: &DbPool, blitz_id: DbId) -> AppResult<ThemeSchedule> {
    let scheduled = BlitzRepo::theme_schedule(pool, blitz_id).await?;
    let mut weeks = Vec::with_capacity(scheduled.len());
    for entry in &scheduled {
        weeks.push((entry.week.max(0) as u32, entry.to_core()?));
    }
    Ok(ThemeSchedule::new(weeks))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/blitz", get(get_current))
        .route("/blitz/themes", get(list_themes))
        .route("/blitz/reviews", post(submit_review))
        .route("/blitz/reviews/pending", get(list_pending))
        .route("/blitz/reviews/{id}/moderate", post(moderate_review))
        .route("/blitz/leaderboard", get(leaderboard))
        .route("/blitz/members/{member_id}", get(member_standing))
}
