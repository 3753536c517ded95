//! Route definitions for the quiz session lifecycle.
//!
//! Mounted at `/quiz`.
//!
//! ```text
//! POST   /start                         start_quiz
//! GET    /session/{session_id}          get_session
//! POST   /step1                         submit_step1
//! POST   /step2                         submit_step2
//! POST   /generate-final-results        generate_final_results
//! GET    /results/{session_id}          get_results
//! GET    /options                       get_options
//! POST   /regenerate/{session_id}       regenerate
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::quiz;
use crate::state::AppState;

/// Quiz routes, mounted at `/quiz`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/start", post(quiz::start_quiz))
        .route("/session/{session_id}", get(quiz::get_session))
        .route("/step1", post(quiz::submit_step1))
        .route("/step2", post(quiz::submit_step2))
        .route(
            "/generate-final-results",
            post(quiz::generate_final_results),
        )
        .route("/results/{session_id}", get(quiz::get_results))
        .route("/options", get(quiz::get_options))
        .route("/regenerate/{session_id}", post(quiz::regenerate))
}
