use async_trait::async_trait;
use brandquiz_core::analytics::{
    DateRange, FunnelCounts, GenerationCounts, IndustryCount, RatingTotals,
};
use brandquiz_core::ratings::{FeedbackQuery, RatingFilter, RatingInput, UserDemographics};

use super::{new_session_id, QuizStore, StoreResult};
use crate::models::quiz_session::{GenerationUpdate, NewQuizSession, QuizSession};
use crate::models::rating::Rating;
use crate::repositories::{QuizSessionRepo, RatingRepo};
use crate::DbPool;

/// [`QuizStore`] backed by Postgres.
#[derive(Clone)]
pub struct PgQuizStore {
    pool: DbPool,
}

impl PgQuizStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl QuizStore for PgQuizStore {
    async fn health_check(&self) -> StoreResult<()> {
        crate::health_check(&self.pool).await
    }

    async fn create_session(&self, origin: &NewQuizSession) -> StoreResult<QuizSession> {
        let session_id = new_session_id();
        tracing::debug!(session_id = %session_id, "Inserting quiz session");
        QuizSessionRepo::create(&self.pool, &session_id, origin).await
    }

    async fn find_session(&self, session_id: &str) -> StoreResult<Option<QuizSession>> {
        QuizSessionRepo::find_by_session_id(&self.pool, session_id).await
    }

    async fn save_answers(&self, session: &QuizSession) -> StoreResult<Option<QuizSession>> {
        QuizSessionRepo::save_answers(&self.pool, session).await
    }

    async fn record_generation(
        &self,
        session_id: &str,
        update: &GenerationUpdate,
    ) -> StoreResult<Option<QuizSession>> {
        QuizSessionRepo::record_generation(&self.pool, session_id, update).await
    }

    async fn funnel_counts(&self, range: &DateRange) -> StoreResult<FunnelCounts> {
        QuizSessionRepo::funnel_counts(&self.pool, range).await
    }

    async fn generation_counts(&self, range: &DateRange) -> StoreResult<GenerationCounts> {
        QuizSessionRepo::generation_counts(&self.pool, range).await
    }

    async fn industry_counts(&self, limit: usize) -> StoreResult<Vec<IndustryCount>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        QuizSessionRepo::industry_counts(&self.pool, limit).await
    }

    async fn upsert_rating(
        &self,
        input: &RatingInput,
        demographics: &UserDemographics,
    ) -> StoreResult<Rating> {
        RatingRepo::upsert(&self.pool, input, demographics).await
    }

    async fn ratings_for_session(&self, session_id: &str) -> StoreResult<Vec<Rating>> {
        RatingRepo::list_by_session(&self.pool, session_id).await
    }

    async fn find_ratings(&self, filter: &RatingFilter) -> StoreResult<Vec<Rating>> {
        RatingRepo::list_filtered(&self.pool, filter).await
    }

    async fn recent_feedback(&self, query: &FeedbackQuery) -> StoreResult<Vec<Rating>> {
        RatingRepo::recent_feedback(&self.pool, query).await
    }

    async fn rating_totals(&self) -> StoreResult<RatingTotals> {
        RatingRepo::totals(&self.pool).await
    }
}
