//! Handlers for the award catalog and its per-year activations.
//!
//! Awards themselves are seeded data; the yearly process only chooses
//! which of them run. Replacing a year's activation set is the one
//! admin write here.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use fanfare_db::models::award::SetYearAwards;
use fanfare_db::repositories::AwardRepo;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/awards
///
/// List the full award catalog, grouped by category.
pub async fn list_awards(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let awards = AwardRepo::list_all(&state.pool).await?;

    Ok(Json(DataResponse { data: awards }))
}

/// GET /api/v1/years/{year}/awards
///
/// The awards active for a year, in ballot order.
pub async fn list_year_awards(
    State(state): State<AppState>,
    Path(year): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let awards = AwardRepo::active_for_year(&state.pool, year).await?;

    Ok(Json(DataResponse { data: awards }))
}

/// GET /api/v1/years/{year}/awards/defaults
///
/// The awards to pre-select when activating a year: the year's own
/// set, or the previous year's when the year has no activations yet.
pub async fn default_year_awards(
    State(state): State<AppState>,
    Path(year): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let awards = AwardRepo::default_awards_for_year(&state.pool, year).await?;

    Ok(Json(DataResponse { data: awards }))
}

/// PUT /api/v1/years/{year}/awards
///
/// Replace the year's activation set. Awards not listed are
/// deactivated for the year.
pub async fn set_year_awards(
    State(state): State<AppState>,
    Path(year): Path<i32>,
    Json(input): Json<SetYearAwards>,
) -> AppResult<impl IntoResponse> {
    let activations = AwardRepo::set_year_awards(&state.pool, year, &input.award_ids).await?;

    tracing::info!(year, active = activations.len(), "Year awards replaced");

    Ok(Json(DataResponse { data: activations }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/awards", get(list_awards))
        .route(
            "/years/{year}/awards",
            get(list_year_awards).put(set_year_awards),
        )
        .route("/years/{year}/awards/defaults", get(default_year_awards))
}
