//! Route definitions for generation metrics.
//!
//! ```text
//! GET    /metrics                       metrics
//! ```

use axum::routing::get;
use axum::Router;

use crate::handlers::ai;
use crate::state::AppState;

/// Generation routes, mounted at `/ai`.
pub fn router() -> Router<AppState> {
    Router::new().route("/metrics", get(ai::metrics))
}
