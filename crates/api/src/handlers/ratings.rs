//! Handlers for rating generated results and reading rating statistics.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use brandquiz_core::answers::decode_payload;
use brandquiz_core::error::{CoreError, FieldError};
use brandquiz_core::options::RatingType;
use brandquiz_core::pagination::{clamp_limit, DEFAULT_LIMIT, MAX_LIMIT};
use brandquiz_core::ratings::{
    group_ratings, overall_stats, summarize, validate_rating, FeedbackQuery, GroupBy,
    OverallStats, RatingGroup, RatingSample, RatingStats, RatingSubmission, UserDemographics,
    MAX_SCORE, MIN_SCORE,
};
use brandquiz_core::types::DbId;
use brandquiz_db::models::rating::Rating;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::query::{parse_label, RatingFilterParams};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// Filters for `GET /ratings/analytics`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsParams {
    pub group_by: Option<String>,
    #[serde(flatten)]
    pub filters: AnalyticsFilters,
}

/// The filters echoed back with grouped analytics.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating_type: Option<String>,
    #[serde(flatten)]
    pub demographics: RatingFilterParams,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackParams {
    pub limit: Option<i64>,
    pub rating_type: Option<String>,
    pub min_rating: Option<u8>,
    pub max_rating: Option<u8>,
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRatingResponse {
    pub rating_id: DbId,
    pub is_update: bool,
}

/// A stored rating with its derived category average.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingView {
    #[serde(flatten)]
    pub rating: Rating,
    pub average_category_rating: Option<f64>,
}

impl From<Rating> for RatingView {
    fn from(rating: Rating) -> Self {
        let average_category_rating = rating.average_category_rating();
        Self {
            rating,
            average_category_rating,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AverageRatingResponse {
    pub rating_type: RatingType,
    #[serde(flatten)]
    pub stats: RatingStats,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingAnalyticsResponse {
    pub analytics: Vec<RatingGroup>,
    pub overall_stats: OverallStats,
    pub group_by: &'static str,
    pub filters: AnalyticsFilters,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn samples(ratings: &[Rating]) -> Vec<RatingSample> {
    ratings.iter().filter_map(Rating::sample).collect()
}

fn check_score_bound(field: &str, value: Option<u8>, errors: &mut Vec<FieldError>) {
    if value.is_some_and(|v| !(MIN_SCORE..=MAX_SCORE).contains(&v)) {
        errors.push(FieldError::new(
            field,
            format!("{field} must be between {MIN_SCORE} and {MAX_SCORE}"),
        ));
    }
}

// ---------------------------------------------------------------------------
// POST /ratings
// ---------------------------------------------------------------------------

/// Rate a generated result.
///
/// Re-rating the same (session, type, index) overwrites the stored rating and
/// answers 200 instead of 201.
pub async fn submit_rating(
    State(state): State<AppState>,
    AppJson(payload): AppJson<serde_json::Value>,
) -> AppResult<impl IntoResponse> {
    let submission: RatingSubmission = decode_payload(payload)?;
    let input = validate_rating(submission)?;

    let session = state
        .store
        .find_session(&input.session_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Quiz session",
                id: input.session_id.clone(),
            })
        })?;
    let demographics = UserDemographics::from_step1(session.step1_answers());

    let rating = state.store.upsert_rating(&input, &demographics).await?;
    tracing::info!(
        rating_id = rating.id,
        session_id = %rating.session_id,
        rating_type = %rating.rating_type,
        star_rating = rating.star_rating,
        is_update = rating.is_updated,
        "Rating saved",
    );

    let status = if rating.is_updated {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((
        status,
        Json(DataResponse {
            data: SubmitRatingResponse {
                rating_id: rating.id,
                is_update: rating.is_updated,
            },
        }),
    ))
}

// ---------------------------------------------------------------------------
// GET /ratings/session/{session_id}
// ---------------------------------------------------------------------------

/// Ratings for a session, newest first. Unknown sessions yield an empty list.
pub async fn list_session_ratings(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let ratings = state.store.ratings_for_session(&session_id).await?;
    tracing::debug!(session_id = %session_id, count = ratings.len(), "Listed session ratings");

    let data: Vec<RatingView> = ratings.into_iter().map(RatingView::from).collect();
    Ok(Json(DataResponse { data }))
}

// ---------------------------------------------------------------------------
// GET /ratings/average/{rating_type}
// ---------------------------------------------------------------------------

/// Average and histogram statistics for one rating type.
pub async fn average_rating(
    State(state): State<AppState>,
    Path(rating_type): Path<String>,
    Query(params): Query<RatingFilterParams>,
) -> AppResult<impl IntoResponse> {
    let rating_type = parse_label::<RatingType>("ratingType", Some(&rating_type))?
        .ok_or_else(|| CoreError::Validation("ratingType is required".to_string()))?;
    let filter = params.to_filter(Some(rating_type))?;

    let ratings = state.store.find_ratings(&filter).await?;
    let samples = samples(&ratings);
    let stats = summarize(&samples.iter().collect::<Vec<_>>());

    Ok(Json(DataResponse {
        data: AverageRatingResponse { rating_type, stats },
    }))
}

// ---------------------------------------------------------------------------
// GET /ratings/analytics
// ---------------------------------------------------------------------------

/// Rating statistics grouped by type, region, industry or confidence.
pub async fn rating_analytics(
    State(state): State<AppState>,
    Query(params): Query<AnalyticsParams>,
) -> AppResult<impl IntoResponse> {
    let group_by = params
        .group_by
        .as_deref()
        .filter(|g| !g.trim().is_empty())
        .map(GroupBy::from_str_db)
        .transpose()?
        .unwrap_or_default();
    let rating_type =
        parse_label::<RatingType>("ratingType", params.filters.rating_type.as_deref())?;
    let filter = params.filters.demographics.to_filter(rating_type)?;

    let ratings = state.store.find_ratings(&filter).await?;
    let samples = samples(&ratings);
    tracing::debug!(group_by = group_by.as_str(), count = samples.len(), "Computed rating analytics");

    Ok(Json(DataResponse {
        data: RatingAnalyticsResponse {
            analytics: group_ratings(&samples, group_by),
            overall_stats: overall_stats(&samples),
            group_by: group_by.as_str(),
            filters: params.filters,
        },
    }))
}

// ---------------------------------------------------------------------------
// GET /ratings/feedback/recent
// ---------------------------------------------------------------------------

/// Ratings that carry written feedback, newest first.
pub async fn recent_feedback(
    State(state): State<AppState>,
    Query(params): Query<FeedbackParams>,
) -> AppResult<impl IntoResponse> {
    let rating_type = parse_label::<RatingType>("ratingType", params.rating_type.as_deref())?;

    let mut errors = Vec::new();
    check_score_bound("minRating", params.min_rating, &mut errors);
    check_score_bound("maxRating", params.max_rating, &mut errors);
    if !errors.is_empty() {
        return Err(CoreError::InvalidFields(errors).into());
    }

    let query = FeedbackQuery {
        rating_type,
        min_rating: params.min_rating,
        max_rating: params.max_rating,
        limit: clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT),
    };
    let ratings = state.store.recent_feedback(&query).await?;

    let data: Vec<RatingView> = ratings.into_iter().map(RatingView::from).collect();
    Ok(Json(DataResponse { data }))
}
