//! Handlers for generation metrics.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use brandquiz_core::analytics::{self, GenerationMetrics};
use brandquiz_core::types::Timestamp;

use crate::error::AppResult;
use crate::query::DateRangeParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Window the metrics cover; `null` bounds are open.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsPeriod {
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsResponse {
    #[serde(flatten)]
    pub metrics: GenerationMetrics,
    pub period: MetricsPeriod,
}

// ---------------------------------------------------------------------------
// GET /ai/metrics
// ---------------------------------------------------------------------------

/// Per-phase generation outcomes for sessions created in the window.
pub async fn metrics(
    State(state): State<AppState>,
    Query(params): Query<DateRangeParams>,
) -> AppResult<impl IntoResponse> {
    let range = params.parse()?;
    let counts = state.store.generation_counts(&range).await?;
    let metrics = analytics::generation_metrics(&counts);
    tracing::debug!(
        sessions = metrics.sessions,
        total_artifacts = metrics.total_artifacts,
        "Computed generation metrics",
    );

    Ok(Json(DataResponse {
        data: MetricsResponse {
            metrics,
            period: MetricsPeriod {
                start_date: range.start,
                end_date: range.end,
            },
        },
    }))
}
