//! Handlers for the voting form.
//!
//! The ballot is derived from the year's active awards and their
//! nomination pools. Vote submission validates the member's choices
//! against that ballot and upserts one vote per chosen award.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use fanfare_core::error::CoreError;
use fanfare_core::types::DbId;
use fanfare_core::voting::{validate_votes, BallotField, VoteChoice};
use fanfare_db::models::vote::VoteRequest;
use fanfare_db::repositories::{AwardRepo, MemberRepo, NominationRepo, VoteRepo};
use fanfare_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/years/{year}/ballot
///
/// The voting form for a year: one field per active award with its
/// nomination pool. Awards with no nominations are omitted.
pub async fn get_ballot(
    State(state): State<AppState>,
    Path(year): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let fields = ballot_fields(&state.pool, year).await?;
    let offered: Vec<BallotField> = fields
        .into_iter()
        .filter(|f| !f.nomination_ids.is_empty())
        .collect();

    Ok(Json(DataResponse { data: offered }))
}

/// GET /api/v1/years/{year}/members/{member_id}/votes
///
/// The member's stored votes for the year.
pub async fn list_votes(
    State(state): State<AppState>,
    Path((year, member_id)): Path<(i32, DbId)>,
) -> AppResult<impl IntoResponse> {
    let votes = VoteRepo::list_for_member_year(&state.pool, year, member_id).await?;

    Ok(Json(DataResponse { data: votes }))
}

/// PUT /api/v1/years/{year}/members/{member_id}/votes
///
/// Submit the member's votes. Choices must cover at least half of the
/// offered categories; awards left blank keep any earlier vote.
pub async fn submit_votes(
    State(state): State<AppState>,
    Path((year, member_id)): Path<(i32, DbId)>,
    Json(input): Json<VoteRequest>,
) -> AppResult<impl IntoResponse> {
    let pool = &state.pool;

    MemberRepo::find_by_id(pool, member_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Member",
            id: member_id,
        }))?;

    let fields = ballot_fields(pool, year).await?;
    if fields.is_empty() {
        return Err(AppError::BadRequest(format!(
            "Voting is not open for {year}."
        )));
    }

    let choices: Vec<VoteChoice> = input
        .choices
        .iter()
        .map(|c| VoteChoice {
            award_id: c.award_id,
            nomination_id: c.nomination_id,
        })
        .collect();

    let writes = validate_votes(&fields, &choices)?;

    for write in &writes {
        VoteRepo::upsert(pool, year, member_id, write.award_id, write.nomination_id).await?;
    }

    tracing::info!(year, member_id, votes = writes.len(), "Votes recorded");

    let votes = VoteRepo::list_for_member_year(pool, year, member_id).await?;

    Ok(Json(DataResponse { data: votes }))
}

/// Build the year's ballot fields from active awards and their
/// nomination pools.
async fn ballot_fields(pool: &DbPool, year: i32) -> AppResult<Vec<BallotField>> {
    let awards = AwardRepo::active_for_year(pool, year).await?;

    let mut fields = Vec::with_capacity(awards.len());
    for award in awards {
        let nominations = NominationRepo::list_for_award_year(pool, year, award.id).await?;
        fields.push(BallotField {
            award_id: award.id,
            award_name: award.name,
            nomination_ids: nominations.iter().map(|n| n.id).collect(),
        });
    }
    Ok(fields)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/years/{year}/ballot", get(get_ballot))
        .route(
            "/years/{year}/members/{member_id}/votes",
            get(list_votes).put(submit_votes),
        )
}
