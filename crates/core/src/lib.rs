//! Rule engines for the community awards and review-blitz systems.
//!
//! Everything in this crate is pure and synchronous: the engines take
//! in-process data structures (the member's batch, the ballot, the
//! prior-review history) and return either a persistence plan or a
//! validation error. Loading state and applying the plans is the
//! caller's job (see the `fanfare-db` and `fanfare-api` crates).

pub mod approval;
pub mod config;
pub mod error;
pub mod nomination;
pub mod scoring;
pub mod theme;
pub mod types;
pub mod voting;
