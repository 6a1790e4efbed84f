//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts where the api accepts one
//! - Conversions into the plain types the core engines consume

pub mod award;
pub mod blitz;
pub mod identity;
pub mod nomination;
pub mod theme;
pub mod vote;
