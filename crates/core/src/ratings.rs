//! Ratings of generated results: submission validation, filters and
//! aggregate statistics.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::analytics::{round_to, DateRange};
use crate::answers::{
    check_option, declared_errors, flatten_validation_errors, normalize_text, sort_errors,
    Step1Answers,
};
use crate::error::{CoreError, FieldError};
use crate::options::{
    CityMarketSize, ConfidenceLevel, ExperienceLevel, GeographicLocation, Industry, Labeled,
    RatingType,
};
use crate::types::{SessionId, Timestamp};

/// Lowest accepted star or category score.
pub const MIN_SCORE: u8 = 1;
/// Highest accepted star or category score.
pub const MAX_SCORE: u8 = 5;

// ---------------------------------------------------------------------------
// Typed rating parts
// ---------------------------------------------------------------------------

/// Optional per-category scores (1-5 each).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRatings {
    pub accuracy: Option<u8>,
    pub relevance: Option<u8>,
    pub actionability: Option<u8>,
    pub creativity: Option<u8>,
    pub market_fit: Option<u8>,
}

impl CategoryRatings {
    fn scores(&self) -> [Option<u8>; 5] {
        [
            self.accuracy,
            self.relevance,
            self.actionability,
            self.creativity,
            self.market_fit,
        ]
    }

    /// Mean of the categories that were scored, `None` if none were.
    pub fn average(&self) -> Option<f64> {
        let present: Vec<f64> = self.scores().iter().flatten().map(|s| f64::from(*s)).collect();
        if present.is_empty() {
            None
        } else {
            Some(present.iter().sum::<f64>() / present.len() as f64)
        }
    }
}

/// Free-text feedback attached to a rating.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingFeedback {
    pub liked: Option<String>,
    pub disliked: Option<String>,
    pub improvements: Option<String>,
}

impl RatingFeedback {
    /// Whether any feedback text was given.
    pub fn has_text(&self) -> bool {
        [&self.liked, &self.disliked, &self.improvements]
            .iter()
            .any(|v| v.as_deref().is_some_and(|t| !t.trim().is_empty()))
    }
}

/// Snapshot of the rater's profile taken when the rating is stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDemographics {
    pub geographic_location: Option<GeographicLocation>,
    pub industry_preference: Option<Industry>,
    pub experience_level: Option<ExperienceLevel>,
    pub city_market_size: Option<CityMarketSize>,
}

impl UserDemographics {
    pub fn from_step1(step1: Option<&Step1Answers>) -> Self {
        match step1 {
            Some(a) => Self {
                geographic_location: Some(a.geographic_location),
                industry_preference: Some(a.industry_preference),
                experience_level: Some(a.experience_level),
                city_market_size: Some(a.city_market_size),
            },
            None => Self::default(),
        }
    }
}

/// A validated rating ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingInput {
    pub session_id: SessionId,
    pub rating_type: RatingType,
    pub result_index: i32,
    pub star_rating: u8,
    pub category_ratings: CategoryRatings,
    pub feedback: RatingFeedback,
    pub confidence_level: Option<ConfidenceLevel>,
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRatingsSubmission {
    #[validate(range(min = 1, max = 5, message = "accuracy must be between 1 and 5"))]
    pub accuracy: Option<i64>,
    #[validate(range(min = 1, max = 5, message = "relevance must be between 1 and 5"))]
    pub relevance: Option<i64>,
    #[validate(range(min = 1, max = 5, message = "actionability must be between 1 and 5"))]
    pub actionability: Option<i64>,
    #[validate(range(min = 1, max = 5, message = "creativity must be between 1 and 5"))]
    pub creativity: Option<i64>,
    #[validate(range(min = 1, max = 5, message = "marketFit must be between 1 and 5"))]
    pub market_fit: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackSubmission {
    #[validate(length(max = 1000, message = "liked must be at most 1000 characters"))]
    pub liked: Option<String>,
    #[validate(length(max = 1000, message = "disliked must be at most 1000 characters"))]
    pub disliked: Option<String>,
    #[validate(length(max = 1000, message = "improvements must be at most 1000 characters"))]
    pub improvements: Option<String>,
}

/// Rating payload as received from the client.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RatingSubmission {
    #[validate(required(message = "sessionId is required"))]
    pub session_id: Option<String>,
    #[validate(required(message = "ratingType is required"))]
    pub rating_type: Option<String>,
    #[validate(range(
        min = 0,
        max = 2147483647,
        message = "resultIndex must be between 0 and 2147483647"
    ))]
    pub result_index: Option<i64>,
    #[validate(
        required(message = "starRating is required"),
        range(min = 1, max = 5, message = "starRating must be between 1 and 5")
    )]
    pub star_rating: Option<i64>,
    pub category_ratings: Option<CategoryRatingsSubmission>,
    pub feedback: Option<FeedbackSubmission>,
    pub confidence_level: Option<String>,
}

fn score(value: Option<i64>) -> Option<u8> {
    value.and_then(|v| u8::try_from(v).ok())
}

/// Validate a rating submission. All problems are reported together.
pub fn validate_rating(submission: RatingSubmission) -> Result<RatingInput, CoreError> {
    let session_id = normalize_text(submission.session_id.clone());
    let feedback = submission.feedback.clone().map(|f| FeedbackSubmission {
        liked: normalize_text(f.liked),
        disliked: normalize_text(f.disliked),
        improvements: normalize_text(f.improvements),
    });
    let submission = RatingSubmission {
        session_id,
        feedback,
        ..submission
    };

    let mut errors = declared_errors(&submission);
    if let Some(categories) = &submission.category_ratings {
        if let Err(e) = categories.validate() {
            flatten_validation_errors(&e, "categoryRatings", &mut errors);
        }
    }
    if let Some(feedback) = &submission.feedback {
        if let Err(e) = feedback.validate() {
            flatten_validation_errors(&e, "feedback", &mut errors);
        }
    }

    let rating_type =
        check_option::<RatingType>("ratingType", submission.rating_type.as_deref(), &mut errors);
    let confidence_level = check_option::<ConfidenceLevel>(
        "confidenceLevel",
        normalize_text(submission.confidence_level.clone()).as_deref(),
        &mut errors,
    );

    sort_errors(&mut errors);
    if !errors.is_empty() {
        return Err(CoreError::InvalidFields(errors));
    }

    let missing = |field: &str| {
        CoreError::InvalidFields(vec![FieldError::new(field, format!("{field} is required"))])
    };
    let categories = submission.category_ratings.unwrap_or_default();
    let feedback = submission.feedback.unwrap_or_default();

    Ok(RatingInput {
        session_id: submission.session_id.ok_or_else(|| missing("sessionId"))?,
        rating_type: rating_type.ok_or_else(|| missing("ratingType"))?,
        result_index: submission
            .result_index
            .and_then(|i| i32::try_from(i).ok())
            .unwrap_or(0),
        star_rating: score(submission.star_rating).ok_or_else(|| missing("starRating"))?,
        category_ratings: CategoryRatings {
            accuracy: score(categories.accuracy),
            relevance: score(categories.relevance),
            actionability: score(categories.actionability),
            creativity: score(categories.creativity),
            market_fit: score(categories.market_fit),
        },
        feedback: RatingFeedback {
            liked: feedback.liked,
            disliked: feedback.disliked,
            improvements: feedback.improvements,
        },
        confidence_level,
    })
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// Filters applied before aggregating ratings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatingFilter {
    pub rating_type: Option<RatingType>,
    pub geographic_location: Option<GeographicLocation>,
    pub industry_preference: Option<Industry>,
    pub experience_level: Option<ExperienceLevel>,
    pub range: DateRange,
}

impl RatingFilter {
    pub fn matches(
        &self,
        rating_type: RatingType,
        demographics: &UserDemographics,
        created_at: Timestamp,
    ) -> bool {
        self.rating_type.is_none_or(|t| t == rating_type)
            && self
                .geographic_location
                .is_none_or(|g| demographics.geographic_location == Some(g))
            && self
                .industry_preference
                .is_none_or(|i| demographics.industry_preference == Some(i))
            && self
                .experience_level
                .is_none_or(|e| demographics.experience_level == Some(e))
            && self.range.contains(created_at)
    }
}

/// Parameters for listing recent written feedback.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackQuery {
    pub rating_type: Option<RatingType>,
    pub min_rating: Option<u8>,
    pub max_rating: Option<u8>,
    pub limit: i64,
}

impl FeedbackQuery {
    pub fn matches_score(&self, star_rating: u8) -> bool {
        self.min_rating.is_none_or(|min| star_rating >= min)
            && self.max_rating.is_none_or(|max| star_rating <= max)
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// The fields of a stored rating that statistics are computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingSample {
    pub session_id: SessionId,
    pub rating_type: RatingType,
    pub star_rating: u8,
    pub category_ratings: CategoryRatings,
    pub confidence_level: Option<ConfidenceLevel>,
    pub demographics: UserDemographics,
}

/// Average and histogram statistics over a set of ratings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingStats {
    pub avg_star_rating: f64,
    pub avg_accuracy: f64,
    pub avg_relevance: f64,
    pub avg_actionability: f64,
    pub avg_creativity: f64,
    pub avg_market_fit: f64,
    pub total_ratings: u64,
    /// Count per star value; always has keys 1 through 5.
    pub rating_distribution: BTreeMap<u8, u64>,
}

fn mean(values: impl Iterator<Item = u8>) -> f64 {
    let (sum, count) = values.fold((0u64, 0u64), |(s, c), v| (s + u64::from(v), c + 1));
    if count == 0 {
        0.0
    } else {
        round_to(sum as f64 / count as f64, 2)
    }
}

fn category_mean(samples: &[&RatingSample], pick: impl Fn(&CategoryRatings) -> Option<u8>) -> f64 {
    mean(samples.iter().filter_map(|s| pick(&s.category_ratings)))
}

/// Summarize ratings. An empty input yields zeros and an all-zero histogram.
pub fn summarize(samples: &[&RatingSample]) -> RatingStats {
    let mut distribution: BTreeMap<u8, u64> = (MIN_SCORE..=MAX_SCORE).map(|s| (s, 0)).collect();
    for sample in samples {
        *distribution.entry(sample.star_rating).or_insert(0) += 1;
    }

    RatingStats {
        avg_star_rating: mean(samples.iter().map(|s| s.star_rating)),
        avg_accuracy: category_mean(samples, |c| c.accuracy),
        avg_relevance: category_mean(samples, |c| c.relevance),
        avg_actionability: category_mean(samples, |c| c.actionability),
        avg_creativity: category_mean(samples, |c| c.creativity),
        avg_market_fit: category_mean(samples, |c| c.market_fit),
        total_ratings: samples.len() as u64,
        rating_distribution: distribution,
    }
}

/// Dimension ratings are grouped by in the analytics view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GroupBy {
    #[default]
    RatingType,
    Geographic,
    Industry,
    Confidence,
}

impl GroupBy {
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "ratingType" => Ok(Self::RatingType),
            "geographic" => Ok(Self::Geographic),
            "industry" => Ok(Self::Industry),
            "confidence" => Ok(Self::Confidence),
            _ => Err(CoreError::Validation(format!(
                "Invalid groupBy '{s}'. Must be one of: ratingType, geographic, industry, confidence"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RatingType => "ratingType",
            Self::Geographic => "geographic",
            Self::Industry => "industry",
            Self::Confidence => "confidence",
        }
    }

    fn key(self, sample: &RatingSample) -> Option<&'static str> {
        match self {
            Self::RatingType => Some(sample.rating_type.label()),
            Self::Geographic => sample.demographics.geographic_location.map(|g| g.label()),
            Self::Industry => sample.demographics.industry_preference.map(|i| i.label()),
            Self::Confidence => sample.confidence_level.map(|c| c.label()),
        }
    }
}

/// Statistics for one group; `key` is `None` for ratings without a value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingGroup {
    pub key: Option<&'static str>,
    pub unique_sessions: u64,
    #[serde(flatten)]
    pub stats: RatingStats,
}

/// Group ratings and summarize each group, largest groups first.
pub fn group_ratings(samples: &[RatingSample], group_by: GroupBy) -> Vec<RatingGroup> {
    let mut buckets: HashMap<Option<&'static str>, Vec<&RatingSample>> = HashMap::new();
    for sample in samples {
        buckets.entry(group_by.key(sample)).or_default().push(sample);
    }

    let mut groups: Vec<RatingGroup> = buckets
        .into_iter()
        .map(|(key, members)| RatingGroup {
            key,
            unique_sessions: count_unique(members.iter().map(|s| s.session_id.as_str())),
            stats: summarize(&members),
        })
        .collect();

    groups.sort_by(|a, b| {
        b.stats
            .total_ratings
            .cmp(&a.stats.total_ratings)
            .then_with(|| a.key.cmp(&b.key))
    });
    groups
}

/// Totals across every rating in scope.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallStats {
    pub total_ratings: u64,
    pub avg_star_rating: f64,
    pub unique_session_count: u64,
    pub unique_rating_type_count: u64,
}

pub fn overall_stats(samples: &[RatingSample]) -> OverallStats {
    OverallStats {
        total_ratings: samples.len() as u64,
        avg_star_rating: mean(samples.iter().map(|s| s.star_rating)),
        unique_session_count: count_unique(samples.iter().map(|s| s.session_id.as_str())),
        unique_rating_type_count: count_unique(samples.iter().map(|s| s.rating_type.label())),
    }
}

fn count_unique<'a>(values: impl Iterator<Item = &'a str>) -> u64 {
    values.collect::<HashSet<_>>().len() as u64
}
