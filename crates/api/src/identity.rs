//! Member and fic identity resolution.
//!
//! Nominations may reference people and fics that are not in the
//! system yet, by pasting a forum profile or thread link. Resolution
//! parses the identifying ids out of the link and get-or-creates the
//! entity; no remote page is ever fetched here.
//!
//! Link shapes follow the forum's URL scheme:
//! - profile: `.../members/<slug>.<user_id>/`
//! - fic thread: `.../threads/<slug>.<thread_id>/` with an optional
//!   trailing `post-<post_id>` for single-post fics.

use fanfare_core::error::CoreError;
use fanfare_core::types::DbId;
use fanfare_db::models::identity::{Fic, Member};
use fanfare_db::repositories::{FicRepo, MemberRepo};
use fanfare_db::DbPool;

use crate::error::AppResult;

/// Identifying parts of a member profile link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberLink {
    pub username: String,
    pub forum_user_id: DbId,
}

/// Identifying parts of a fic thread link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FicLink {
    pub title: String,
    pub thread_id: DbId,
    pub post_id: Option<DbId>,
}

/// Parse a profile link into its username slug and user id.
pub fn parse_member_link(link: &str) -> Result<MemberLink, CoreError> {
    let (slug, id) = parse_slug_segment(link, "/members/").ok_or_else(|| {
        CoreError::Validation(format!("'{link}' is not a valid member profile link."))
    })?;
    Ok(MemberLink {
        username: slug,
        forum_user_id: id,
    })
}

/// Parse a fic thread link into its title slug, thread id, and
/// optional post id.
pub fn parse_fic_link(link: &str) -> Result<FicLink, CoreError> {
    let (slug, thread_id) = parse_slug_segment(link, "/threads/").ok_or_else(|| {
        CoreError::Validation(format!("'{link}' is not a valid fic thread link."))
    })?;

    // A single-post fic links straight to its post: `...#post-123` or
    // a trailing `post-123` path segment.
    let post_id = link
        .rsplit(['/', '#'])
        .find_map(|segment| segment.strip_prefix("post-"))
        .and_then(|digits| digits.parse::<DbId>().ok());

    Ok(FicLink {
        title: humanize_slug(&slug),
        thread_id,
        post_id,
    })
}

/// Resolve-or-create a member from a profile link.
pub async fn resolve_member(pool: &DbPool, link: &str) -> AppResult<Member> {
    let parsed = parse_member_link(link)?;
    let member = MemberRepo::get_or_create(pool, parsed.forum_user_id, &parsed.username).await?;
    Ok(member)
}

/// Resolve-or-create a fic from a thread link.
pub async fn resolve_fic(pool: &DbPool, link: &str) -> AppResult<Fic> {
    let parsed = parse_fic_link(link)?;
    let fic = FicRepo::get_or_create(pool, parsed.thread_id, parsed.post_id, &parsed.title).await?;
    Ok(fic)
}

/// Extract the `<slug>.<id>` segment that follows `marker` in a link.
fn parse_slug_segment(link: &str, marker: &str) -> Option<(String, DbId)> {
    let rest = &link[link.find(marker)? + marker.len()..];
    let segment = rest.split(['/', '?', '#']).next()?;
    let (slug, id_part) = segment.rsplit_once('.')?;
    let id: DbId = id_part.parse().ok()?;
    if slug.is_empty() || id <= 0 {
        return None;
    }
    Some((slug.to_string(), id))
}

/// Turn a URL slug into a displayable title.
fn humanize_slug(slug: &str) -> String {
    slug.split('-')
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
