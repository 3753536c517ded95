//! Domain logic for the brand positioning quiz.
//!
//! Everything in this crate is pure: no I/O, no async. The API, storage and
//! generation crates build on these types and rules.

pub mod analytics;
pub mod answers;
pub mod error;
pub mod generation;
pub mod options;
pub mod pagination;
pub mod parsing;
pub mod progress;
pub mod prompts;
pub mod ratings;
pub mod types;
