pub mod ai;
pub mod analytics;
pub mod health;
pub mod quiz;
pub mod ratings;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /quiz/start                                      start a session (POST)
/// /quiz/session/{session_id}                       progress projection (GET)
/// /quiz/step1                                      submit step 1 answers (POST)
/// /quiz/step2                                      submit step 2 answers (POST)
/// /quiz/generate-final-results                     generate final report (POST)
/// /quiz/results/{session_id}                       all generated results (GET)
/// /quiz/options                                    option catalog (GET)
/// /quiz/regenerate/{session_id}                    rerun one phase (POST)
///
/// /ratings                                         submit or update a rating (POST)
/// /ratings/session/{session_id}                    ratings for a session (GET)
/// /ratings/average/{rating_type}                   filtered statistics (GET)
/// /ratings/analytics                               grouped statistics (GET)
/// /ratings/feedback/recent                         recent written feedback (GET)
///
/// /analytics/overview                              usage overview (GET)
/// /analytics/funnel                                completion funnel (GET)
///
/// /ai/metrics                                      generation outcomes (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Session lifecycle, answers and generation.
        .nest("/quiz", quiz::router())
        // Ratings and rating statistics.
        .nest("/ratings", ratings::router())
        // Usage analytics.
        .nest("/analytics", analytics::router())
        // Generation metrics.
        .nest("/ai", ai::router())
}
