//! Route definitions for result ratings.
//!
//! Mounted at `/ratings`.
//!
//! ```text
//! POST   /                              submit_rating
//! GET    /session/{session_id}          list_session_ratings
//! GET    /average/{rating_type}         average_rating
//! GET    /analytics                     rating_analytics
//! GET    /feedback/recent               recent_feedback
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::ratings;
use crate::state::AppState;

/// Rating routes, mounted at `/ratings`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(ratings::submit_rating))
        .route("/session/{session_id}", get(ratings::list_session_ratings))
        .route("/average/{rating_type}", get(ratings::average_rating))
        .route("/analytics", get(ratings::rating_analytics))
        .route("/feedback/recent", get(ratings::recent_feedback))
}
