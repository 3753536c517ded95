//! Request handlers.
//!
//! Each submodule provides the async handler functions for one route group.
//! Handlers go through the [`QuizStore`](brandquiz_db::store::QuizStore) and
//! map errors via [`AppError`](crate::error::AppError).

pub mod ai;
pub mod analytics;
pub mod quiz;
pub mod ratings;
