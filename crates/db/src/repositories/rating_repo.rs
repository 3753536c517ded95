//! Repository for the `ratings` table.
//!
//! A session rates each (rating type, result index) pair at most once;
//! re-rating updates the existing row and flags it as updated.

use brandquiz_core::analytics::RatingTotals;
use brandquiz_core::options::Labeled;
use brandquiz_core::ratings::{FeedbackQuery, RatingFilter, RatingInput, UserDemographics};
use sqlx::types::Json;
use sqlx::PgPool;

use super::quiz_session_repo::to_count;
use crate::models::rating::Rating;

/// Column list for `ratings` queries.
const COLUMNS: &str = "\
    id, session_id, rating_type, result_index, star_rating, \
    category_ratings, feedback, confidence_level, user_demographics, \
    is_updated, original_rating_id, created_at, updated_at";

/// Provides data access for ratings.
pub struct RatingRepo;

impl RatingRepo {
    /// Insert a rating, or overwrite the session's existing rating of the
    /// same result.
    pub async fn upsert(
        pool: &PgPool,
        input: &RatingInput,
        demographics: &UserDemographics,
    ) -> Result<Rating, sqlx::Error> {
        let query = format!(
            "INSERT INTO ratings \
                 (session_id, rating_type, result_index, star_rating, category_ratings, \
                  feedback, confidence_level, user_demographics) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT (session_id, rating_type, result_index) DO UPDATE SET \
                 star_rating = EXCLUDED.star_rating, \
                 category_ratings = EXCLUDED.category_ratings, \
                 feedback = EXCLUDED.feedback, \
                 confidence_level = EXCLUDED.confidence_level, \
                 user_demographics = EXCLUDED.user_demographics, \
                 is_updated = TRUE, \
                 original_rating_id = ratings.id, \
                 updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Rating>(&query)
            .bind(&input.session_id)
            .bind(input.rating_type.label())
            .bind(input.result_index)
            .bind(i16::from(input.star_rating))
            .bind(Json(&input.category_ratings))
            .bind(Json(&input.feedback))
            .bind(input.confidence_level.map(|c| c.label()))
            .bind(Json(demographics))
            .fetch_one(pool)
            .await
    }

    /// All ratings of one session, newest first.
    pub async fn list_by_session(
        pool: &PgPool,
        session_id: &str,
    ) -> Result<Vec<Rating>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM ratings \
             WHERE session_id = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Rating>(&query)
            .bind(session_id)
            .fetch_all(pool)
            .await
    }

    /// Ratings matching a filter. Demographic filters compare against the
    /// snapshot stored with each rating.
    pub async fn list_filtered(
        pool: &PgPool,
        filter: &RatingFilter,
    ) -> Result<Vec<Rating>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM ratings \
             WHERE ($1::text IS NULL OR rating_type = $1) \
               AND ($2::text IS NULL OR user_demographics->>'geographicLocation' = $2) \
               AND ($3::text IS NULL OR user_demographics->>'industryPreference' = $3) \
               AND ($4::text IS NULL OR user_demographics->>'experienceLevel' = $4) \
               AND ($5::timestamptz IS NULL OR created_at >= $5) \
               AND ($6::timestamptz IS NULL OR created_at <= $6) \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Rating>(&query)
            .bind(filter.rating_type.map(|t| t.label()))
            .bind(filter.geographic_location.map(|g| g.label()))
            .bind(filter.industry_preference.map(|i| i.label()))
            .bind(filter.experience_level.map(|e| e.label()))
            .bind(filter.range.start)
            .bind(filter.range.end)
            .fetch_all(pool)
            .await
    }

    /// Most recent ratings that carry written feedback.
    pub async fn recent_feedback(
        pool: &PgPool,
        query: &FeedbackQuery,
    ) -> Result<Vec<Rating>, sqlx::Error> {
        let sql = format!(
            "SELECT {COLUMNS} FROM ratings \
             WHERE (COALESCE(TRIM(feedback->>'liked'), '') <> '' \
                 OR COALESCE(TRIM(feedback->>'disliked'), '') <> '' \
                 OR COALESCE(TRIM(feedback->>'improvements'), '') <> '') \
               AND ($1::text IS NULL OR rating_type = $1) \
               AND ($2::smallint IS NULL OR star_rating >= $2) \
               AND ($3::smallint IS NULL OR star_rating <= $3) \
             ORDER BY created_at DESC, id DESC \
             LIMIT $4"
        );
        sqlx::query_as::<_, Rating>(&sql)
            .bind(query.rating_type.map(|t| t.label()))
            .bind(query.min_rating.map(i16::from))
            .bind(query.max_rating.map(i16::from))
            .bind(query.limit)
            .fetch_all(pool)
            .await
    }

    /// Count and mean star rating over every stored rating.
    pub async fn totals(pool: &PgPool) -> Result<RatingTotals, sqlx::Error> {
        let (total, average): (i64, f64) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(AVG(star_rating), 0)::float8 FROM ratings",
        )
        .fetch_one(pool)
        .await?;

        Ok(RatingTotals {
            total: to_count(total),
            average,
        })
    }
}
