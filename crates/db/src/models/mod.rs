//! Row structs and insert DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - The DTO used to create a row, when inserts need more than the domain input

pub mod quiz_session;
pub mod rating;
