//! Handlers for usage analytics.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;

use brandquiz_core::analytics::{self, DateRange, TOP_INDUSTRY_LIMIT};

use crate::error::AppResult;
use crate::query::DateRangeParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET /analytics/overview
// ---------------------------------------------------------------------------

/// Session, completion and rating totals with the most chosen industries.
pub async fn overview(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let counts = state.store.funnel_counts(&DateRange::default()).await?;
    let ratings = state.store.rating_totals().await?;
    let industries = state.store.industry_counts(TOP_INDUSTRY_LIMIT).await?;

    let data = analytics::overview(counts.started, counts.final_completed, ratings, industries);
    tracing::debug!(
        total_quizzes = data.total_quizzes,
        completed_quizzes = data.completed_quizzes,
        "Computed analytics overview",
    );
    Ok(Json(DataResponse { data }))
}

// ---------------------------------------------------------------------------
// GET /analytics/funnel
// ---------------------------------------------------------------------------

/// Stage-by-stage completion funnel, optionally limited to a date window.
pub async fn funnel(
    State(state): State<AppState>,
    Query(params): Query<DateRangeParams>,
) -> AppResult<impl IntoResponse> {
    let range = params.parse()?;
    let counts = state.store.funnel_counts(&range).await?;
    Ok(Json(DataResponse {
        data: analytics::funnel(counts),
    }))
}
