//! Handlers for nomination batch submission.
//!
//! A member submits their whole year's nominations at once. The
//! handler resolves every referenced person and fic to stored
//! entities, pairs the submitted slots with what is already stored,
//! hands the full batch to the validator, and applies the resulting
//! plan only if the entire batch passes.

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use fanfare_core::error::CoreError;
use fanfare_core::nomination::{
    validate_batch, NominationEntry, NominationSlot, StoredSlot,
};
use fanfare_core::types::DbId;
use fanfare_db::models::award::Award;
use fanfare_db::models::identity::{Fic, Member};
use fanfare_db::models::nomination::{Nomination, NominationSlotRequest};
use fanfare_db::repositories::{
    AwardRepo, FicRepo, MemberRepo, NominationRepo, NominationValues,
};
use fanfare_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::identity;
use crate::response::DataResponse;
use crate::state::AppState;

/// Nomination slots offered per award on the form.
const SLOTS_PER_AWARD: usize = 2;

/// GET /api/v1/years/{year}/members/{member_id}/nominations
///
/// The member's stored nominations for the year, in slot order.
pub async fn list_nominations(
    State(state): State<AppState>,
    Path((year, member_id)): Path<(i32, DbId)>,
) -> AppResult<impl IntoResponse> {
    let nominations =
        NominationRepo::list_for_member_year(&state.pool, year, member_id).await?;

    Ok(Json(DataResponse { data: nominations }))
}

/// PUT /api/v1/years/{year}/members/{member_id}/nominations
///
/// Replace the member's nomination batch for the year. The whole batch
/// validates or nothing is written; slots omitted from the request are
/// treated as emptied and their stored nominations deleted.
pub async fn submit_nominations(
    State(state): State<AppState>,
    Path((year, member_id)): Path<(i32, DbId)>,
    Json(requests): Json<Vec<NominationSlotRequest>>,
) -> AppResult<impl IntoResponse> {
    let pool = &state.pool;

    MemberRepo::find_by_id(pool, member_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Member",
            id: member_id,
        }))?;

    let awards = AwardRepo::active_for_year(pool, year).await?;
    if awards.is_empty() {
        return Err(AppError::BadRequest(format!(
            "Nominations are not open for {year}."
        )));
    }

    // Group the submitted slots per award, preserving their order on
    // the form, and reject slots for awards not running this year.
    let mut submitted: HashMap<DbId, Vec<&NominationSlotRequest>> = HashMap::new();
    for request in &requests {
        submitted.entry(request.award_id).or_default().push(request);
    }
    for (award_id, slots) in &submitted {
        if !awards.iter().any(|a| a.id == *award_id) {
            return Err(AppError::BadRequest(format!(
                "Award {award_id} is not accepting nominations for {year}."
            )));
        }
        if slots.len() > SLOTS_PER_AWARD {
            return Err(AppError::BadRequest(format!(
                "You can make at most {SLOTS_PER_AWARD} nominations per category."
            )));
        }
    }

    let existing = NominationRepo::list_for_member_year(pool, year, member_id).await?;
    let mut existing_by_award: HashMap<DbId, Vec<&Nomination>> = HashMap::new();
    for row in &existing {
        existing_by_award.entry(row.award_id).or_default().push(row);
    }

    // Pair submitted and stored slots positionally for every active
    // award so the validator sees the complete batch.
    let mut slots: Vec<NominationSlot> = Vec::with_capacity(awards.len() * SLOTS_PER_AWARD);
    for award in &awards {
        let stored_rows = existing_by_award.remove(&award.id).unwrap_or_default();
        let requested = submitted.remove(&award.id).unwrap_or_default();

        for index in 0..SLOTS_PER_AWARD {
            let existing_slot = match stored_rows.get(index) {
                Some(row) => Some(StoredSlot {
                    id: row.id,
                    entry: entry_from_row(pool, row).await?,
                }),
                None => None,
            };
            let entry = match requested.get(index) {
                Some(request) => Some(resolve_entry(pool, award, request).await?),
                None => None,
            };
            slots.push(NominationSlot {
                award_id: award.id,
                award_name: award.name.clone(),
                fields: award.fields(),
                existing: existing_slot,
                entry,
            });
        }
    }

    let plan = validate_batch(&slots, &state.config.nomination_rules)?;

    for id in &plan.deletes {
        NominationRepo::delete(pool, *id).await?;
    }
    for write in &plan.writes {
        let values = NominationValues {
            nominee_id: write.entry.nominee.as_ref().map(|p| p.id),
            fic_id: write.entry.fic.as_ref().map(|f| f.id),
            detail: write.entry.detail.clone(),
            link: write.entry.link.clone(),
            comment: write.entry.comment.clone(),
        };
        match write.existing_id {
            Some(id) => {
                NominationRepo::update(pool, id, &values).await?;
            }
            None => {
                NominationRepo::insert(pool, year, member_id, write.award_id, &values).await?;
            }
        }
    }

    tracing::info!(
        year,
        member_id,
        writes = plan.writes.len(),
        deletes = plan.deletes.len(),
        "Nomination batch applied"
    );

    let saved = NominationRepo::list_for_member_year(pool, year, member_id).await?;

    Ok(Json(DataResponse { data: saved }))
}

/// Resolve one submitted slot into a validated entry, get-or-creating
/// any person or fic referenced by link.
async fn resolve_entry(
    pool: &DbPool,
    award: &Award,
    request: &NominationSlotRequest,
) -> AppResult<NominationEntry> {
    let nominee = match (request.nominee_id, non_blank(&request.nominee_link)) {
        (Some(id), _) => {
            let member = MemberRepo::find_by_id(pool, id)
                .await?
                .ok_or(AppError::Core(CoreError::NotFound {
                    entity: "Member",
                    id,
                }))?;
            Some(member.person_ref())
        }
        (None, Some(link)) => Some(identity::resolve_member(pool, link).await?.person_ref()),
        (None, None) => None,
    };
    if nominee.is_some() && !award.has_person {
        return Err(AppError::BadRequest(format!(
            "The {} category does not take a nominee.",
            award.name
        )));
    }

    let fic = match (request.fic_id, non_blank(&request.fic_link)) {
        (Some(id), _) => {
            let fic = FicRepo::find_by_id(pool, id)
                .await?
                .ok_or(AppError::Core(CoreError::NotFound { entity: "Fic", id }))?;
            let authors = fic_authors(pool, &fic, &request.fic_author_links).await?;
            Some(fic.fic_ref(&authors))
        }
        (None, Some(link)) => {
            let fic = identity::resolve_fic(pool, link).await?;
            let authors = fic_authors(pool, &fic, &request.fic_author_links).await?;
            Some(fic.fic_ref(&authors))
        }
        (None, None) => None,
    };
    if fic.is_some() && !award.has_fic {
        return Err(AppError::BadRequest(format!(
            "The {} category does not take a fic.",
            award.name
        )));
    }

    Ok(NominationEntry {
        nominee,
        fic,
        detail: non_blank(&request.detail).map(str::to_string),
        link: non_blank(&request.link).map(str::to_string),
        comment: non_blank(&request.comment).map(str::to_string),
    })
}

/// The fic's recorded authors, after registering any author profile
/// links submitted alongside it. The per-person cap counts a fic's
/// authors, so authorship must be on record before validation runs.
async fn fic_authors(
    pool: &DbPool,
    fic: &Fic,
    author_links: &[String],
) -> AppResult<Vec<Member>> {
    for link in author_links {
        if link.trim().is_empty() {
            continue;
        }
        let author = identity::resolve_member(pool, link).await?;
        FicRepo::add_author(pool, fic.id, author.id).await?;
    }
    let authors = FicRepo::authors_of(pool, fic.id).await?;
    Ok(authors)
}

/// Reconstruct the entry stored in a nomination row, with its person
/// and fic references resolved for comparison against the submission.
async fn entry_from_row(pool: &DbPool, row: &Nomination) -> AppResult<NominationEntry> {
    let nominee = match row.nominee_id {
        Some(id) => MemberRepo::find_by_id(pool, id)
            .await?
            .map(|m| m.person_ref()),
        None => None,
    };
    let fic = match row.fic_id {
        Some(id) => match FicRepo::find_by_id(pool, id).await? {
            Some(fic) => {
                let authors = FicRepo::authors_of(pool, fic.id).await?;
                Some(fic.fic_ref(&authors))
            }
            None => None,
        },
        None => None,
    };

    Ok(NominationEntry {
        nominee,
        fic,
        detail: row.detail.clone(),
        link: row.link.clone(),
        comment: row.comment.clone(),
    })
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/years/{year}/members/{member_id}/nominations",
        get(list_nominations).put(submit_nominations),
    )
}
