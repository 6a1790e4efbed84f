//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod award_repo;
pub mod blitz_repo;
pub mod blitz_review_repo;
pub mod fic_repo;
pub mod member_repo;
pub mod nomination_repo;
pub mod vote_repo;

pub use award_repo::AwardRepo;
pub use blitz_repo::BlitzRepo;
pub use blitz_review_repo::{BlitzReviewRepo, ScoredReviewValues};
pub use fic_repo::FicRepo;
pub use member_repo::MemberRepo;
pub use nomination_repo::{NominationRepo, NominationValues};
pub use vote_repo::VoteRepo;
