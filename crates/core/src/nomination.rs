//! Nomination batch validation.
//!
//! Validates a member's full set of nomination slots for one awards
//! year (duplicate detection within each award, per-fic and per-person
//! nomination caps, and the minimum-distinct-authors requirement) and
//! then produces a persistence plan. Validation runs to
//! completion before the caller applies any writes, so a failing batch
//! never commits partial state.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::NominationRules;
use crate::error::CoreError;
use crate::types::DbId;

/* --------------------------------------------------------------------------
Types
-------------------------------------------------------------------------- */

/// Which nomination fields apply for an award.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AwardFields {
    pub has_person: bool,
    pub has_fic: bool,
    pub has_detail: bool,
    pub has_samples: bool,
}

/// A person referenced by a nomination, resolved to a stored entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRef {
    pub id: DbId,
    pub name: String,
}

/// A fic referenced by a nomination, with its authors resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FicRef {
    pub id: DbId,
    pub title: String,
    pub authors: Vec<PersonRef>,
}

/// The content of one nomination slot as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NominationEntry {
    pub nominee: Option<PersonRef>,
    pub fic: Option<FicRef>,
    pub detail: Option<String>,
    pub link: Option<String>,
    pub comment: Option<String>,
}

impl NominationEntry {
    /// An entry with every field blank counts as an empty slot.
    pub fn is_empty(&self) -> bool {
        self.nominee.is_none()
            && self.fic.is_none()
            && self.detail.as_deref().is_none_or(str::is_empty)
            && self.link.as_deref().is_none_or(str::is_empty)
            && self.comment.as_deref().is_none_or(str::is_empty)
    }
}

/// The nomination currently stored in a slot, if any.
#[derive(Debug, Clone)]
pub struct StoredSlot {
    pub id: DbId,
    pub entry: NominationEntry,
}

/// One slot of a member's nomination batch.
#[derive(Debug, Clone)]
pub struct NominationSlot {
    pub award_id: DbId,
    pub award_name: String,
    pub fields: AwardFields,
    pub existing: Option<StoredSlot>,
    pub entry: Option<NominationEntry>,
}

/// One upsert in the persistence plan. `existing_id` is `Some` when the
/// write replaces a stored nomination rather than creating a new one.
#[derive(Debug, Clone)]
pub struct NominationWrite {
    pub award_id: DbId,
    pub existing_id: Option<DbId>,
    pub entry: NominationEntry,
}

/// Persistence plan for a validated batch. Slots whose submitted entry
/// matches what is already stored appear in neither list.
#[derive(Debug, Clone, Default)]
pub struct BatchPlan {
    pub writes: Vec<NominationWrite>,
    pub deletes: Vec<DbId>,
}

/* --------------------------------------------------------------------------
Validation
-------------------------------------------------------------------------- */

/// Whether two entries represent the same nomination, comparing only
/// the fields active for the award.
pub fn same_nomination(a: &NominationEntry, b: &NominationEntry, fields: AwardFields) -> bool {
    if fields.has_person && a.nominee.as_ref().map(|p| p.id) != b.nominee.as_ref().map(|p| p.id) {
        return false;
    }
    if fields.has_fic && a.fic.as_ref().map(|f| f.id) != b.fic.as_ref().map(|f| f.id) {
        return false;
    }
    if fields.has_detail && a.detail != b.detail {
        return false;
    }
    true
}

/// Validate a member's full nomination batch and build its persistence
/// plan.
///
/// Every rule is checked before the plan is returned; a failing batch
/// yields an error and no plan.
pub fn validate_batch(
    slots: &[NominationSlot],
    rules: &NominationRules,
) -> Result<BatchPlan, CoreError> {
    let mut fic_counts: HashMap<DbId, (String, u32)> = HashMap::new();
    let mut person_counts: HashMap<DbId, (String, u32)> = HashMap::new();
    let mut seen_per_award: HashMap<DbId, Vec<(&NominationEntry, AwardFields)>> = HashMap::new();

    for slot in slots {
        let Some(entry) = slot.entry.as_ref().filter(|e| !e.is_empty()) else {
            continue;
        };

        if slot.fields.has_person && entry.nominee.is_none() {
            return Err(CoreError::Validation(format!(
                "A nominee is required for the {} category.",
                slot.award_name
            )));
        }
        if slot.fields.has_fic && entry.fic.is_none() {
            return Err(CoreError::Validation(format!(
                "A fic is required for the {} category.",
                slot.award_name
            )));
        }

        if slot.fields.has_fic {
            if let Some(fic) = &entry.fic {
                let slot_count = fic_counts
                    .entry(fic.id)
                    .or_insert_with(|| (fic.title.clone(), 0));
                slot_count.1 += 1;
                for author in &fic.authors {
                    person_counts
                        .entry(author.id)
                        .or_insert_with(|| (author.name.clone(), 0))
                        .1 += 1;
                }
            }
        }
        if slot.fields.has_person {
            if let Some(nominee) = &entry.nominee {
                person_counts
                    .entry(nominee.id)
                    .or_insert_with(|| (nominee.name.clone(), 0))
                    .1 += 1;
            }
        }

        let earlier = seen_per_award.entry(slot.award_id).or_default();
        for (other, fields) in earlier.iter() {
            if same_nomination(entry, other, *fields) {
                return Err(CoreError::Validation(format!(
                    "You cannot make the same nomination twice in the {} category.",
                    slot.award_name
                )));
            }
        }
        earlier.push((entry, slot.fields));
    }

    for (title, count) in fic_counts.values() {
        if *count > rules.max_fic_nominations {
            return Err(CoreError::Validation(format!(
                "You have nominated {title} {count} times. You may only nominate any \
                 given fic up to {} times.",
                rules.max_fic_nominations
            )));
        }
    }

    for (name, count) in person_counts.values() {
        if *count > rules.max_person_nominations {
            return Err(CoreError::Validation(format!(
                "You have nominated {name} or their work {count} times. You may only \
                 nominate a given person up to {} times.",
                rules.max_person_nominations
            )));
        }
    }

    if (person_counts.len() as u32) < rules.min_distinct_people {
        return Err(CoreError::Validation(format!(
            "You must nominate at least {} different authors.",
            rules.min_distinct_people
        )));
    }

    Ok(build_plan(slots))
}

/// Map each slot to an upsert, a delete, or a no-op.
fn build_plan(slots: &[NominationSlot]) -> BatchPlan {
    let mut plan = BatchPlan::default();
    for slot in slots {
        let submitted = slot.entry.as_ref().filter(|e| !e.is_empty());
        match (submitted, &slot.existing) {
            (Some(entry), Some(stored)) => {
                // Unchanged slots are left untouched.
                if *entry != stored.entry {
                    plan.writes.push(NominationWrite {
                        award_id: slot.award_id,
                        existing_id: Some(stored.id),
                        entry: entry.clone(),
                    });
                }
            }
            (Some(entry), None) => plan.writes.push(NominationWrite {
                award_id: slot.award_id,
                existing_id: None,
                entry: entry.clone(),
            }),
            (None, Some(stored)) => plan.deletes.push(stored.id),
            (None, None) => {}
        }
    }
    plan
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */
