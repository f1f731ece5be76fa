//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - Typed input structs for inserts and partial updates

pub mod objective;
pub mod project;
pub mod step;
