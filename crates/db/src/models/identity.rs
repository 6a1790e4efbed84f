//! Member and fic identity models.
//!
//! Members and fics are resolved from forum links with get-or-create
//! semantics; the actual page fetching lives outside this system, so
//! resolution here is URL parsing plus a keyed upsert.

use fanfare_core::nomination::{FicRef, PersonRef};
use fanfare_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `members` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Member {
    pub id: DbId,
    pub username: String,
    pub forum_user_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Member {
    pub fn person_ref(&self) -> PersonRef {
        PersonRef {
            id: self.id,
            name: self.username.clone(),
        }
    }
}

/// A row from the `fics` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Fic {
    pub id: DbId,
    pub title: String,
    pub thread_id: DbId,
    pub post_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Fic {
    pub fn fic_ref(&self, authors: &[Member]) -> FicRef {
        FicRef {
            id: self.id,
            title: self.title.clone(),
            authors: authors.iter().map(Member::person_ref).collect(),
        }
    }
}

/// A row from the `chapters` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Chapter {
    pub id: DbId,
    pub fic_id: DbId,
    pub title: String,
    pub word_count: i64,
}
