pub mod awards;
pub mod blitz;
pub mod health;
pub mod nominations;
pub mod votes;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /awards                                          award catalog
/// /years/{year}/awards                             per-year activations
/// /years/{year}/ballot                             voting form
/// /years/{year}/members/{member_id}/nominations    nomination batches
/// /years/{year}/members/{member_id}/votes          vote batches
/// /blitz                                           review blitz
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(awards::router())
        .merge(nominations::router())
        .merge(votes::router())
        .merge(blitz::router())
}
