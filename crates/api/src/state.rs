use std::sync::Arc;

use brandquiz_db::store::QuizStore;
use brandquiz_llm::TextGenerator;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (every field is behind an `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Session and rating storage (Postgres or in-memory).
    pub store: Arc<dyn QuizStore>,
    /// Text generator used by the step and final phases.
    pub generator: Arc<dyn TextGenerator>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
