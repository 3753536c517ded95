//! Rating model.

use brandquiz_core::options::{ConfidenceLevel, Labeled, RatingType};
use brandquiz_core::ratings::{
    CategoryRatings, RatingFeedback, RatingInput, RatingSample, UserDemographics,
};
use brandquiz_core::types::{DbId, SessionId, Timestamp};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `ratings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub id: DbId,
    pub session_id: SessionId,
    pub rating_type: String,
    pub result_index: i32,
    pub star_rating: i16,
    pub category_ratings: Json<CategoryRatings>,
    pub feedback: Json<RatingFeedback>,
    pub confidence_level: Option<String>,
    pub user_demographics: Json<UserDemographics>,
    pub is_updated: bool,
    /// Set to the row's own id once it has been re-rated.
    pub original_rating_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Rating {
    /// Build an unsaved row from validated input.
    pub fn new(
        id: DbId,
        input: &RatingInput,
        demographics: &UserDemographics,
        now: Timestamp,
    ) -> Self {
        Self {
            id,
            session_id: input.session_id.clone(),
            rating_type: input.rating_type.label().to_string(),
            result_index: input.result_index,
            star_rating: i16::from(input.star_rating),
            category_ratings: Json(input.category_ratings.clone()),
            feedback: Json(input.feedback.clone()),
            confidence_level: input.confidence_level.map(|c| c.label().to_string()),
            user_demographics: Json(demographics.clone()),
            is_updated: false,
            original_rating_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the scored fields with a re-rating.
    pub fn apply_update(
        &mut self,
        input: &RatingInput,
        demographics: &UserDemographics,
        now: Timestamp,
    ) {
        self.star_rating = i16::from(input.star_rating);
        self.category_ratings = Json(input.category_ratings.clone());
        self.feedback = Json(input.feedback.clone());
        self.confidence_level = input.confidence_level.map(|c| c.label().to_string());
        self.user_demographics = Json(demographics.clone());
        self.is_updated = true;
        self.original_rating_id = Some(self.id);
        self.updated_at = now;
    }

    pub fn parsed_rating_type(&self) -> Option<RatingType> {
        RatingType::from_label(&self.rating_type)
    }

    /// Star rating as the 1-5 score, `None` if the stored value is out of range.
    pub fn score(&self) -> Option<u8> {
        u8::try_from(self.star_rating).ok()
    }

    /// Mean of the category scores given with this rating.
    pub fn average_category_rating(&self) -> Option<f64> {
        self.category_ratings.average()
    }

    /// The fields statistics are computed from. Rows whose type or score no
    /// longer parse are skipped by callers.
    pub fn sample(&self) -> Option<RatingSample> {
        Some(RatingSample {
            session_id: self.session_id.clone(),
            rating_type: self.parsed_rating_type()?,
            star_rating: self.score()?,
            category_ratings: self.category_ratings.0.clone(),
            confidence_level: self
                .confidence_level
                .as_deref()
                .and_then(ConfidenceLevel::from_label),
            demographics: self.user_demographics.0.clone(),
        })
    }
}
