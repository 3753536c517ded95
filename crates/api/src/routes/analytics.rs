//! Route definitions for usage analytics.
//!
//! ```text
//! GET    /overview                      overview
//! GET    /funnel                        funnel
//! ```

use axum::routing::get;
use axum::Router;

use crate::handlers::analytics;
use crate::state::AppState;

/// Analytics routes, mounted at `/analytics`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/overview", get(analytics::overview))
        .route("/funnel", get(analytics::funnel))
}
