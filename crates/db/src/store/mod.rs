//! Storage seam used by the API.
//!
//! Session writes are targeted. Answer saves merge answers and progress into
//! the stored row, and generation events touch one phase's results and state.
//! Neither can undo what a concurrent request saved in the meantime.

use async_trait::async_trait;
use brandquiz_core::analytics::{
    DateRange, FunnelCounts, GenerationCounts, IndustryCount, RatingTotals,
};
use brandquiz_core::ratings::{FeedbackQuery, RatingFilter, RatingInput, UserDemographics};

use crate::models::quiz_session::{GenerationUpdate, NewQuizSession, QuizSession};
use crate::models::rating::Rating;

mod memory;
mod postgres;

pub use memory::MemoryQuizStore;
pub use postgres::PgQuizStore;

pub type StoreResult<T> = Result<T, sqlx::Error>;

/// A freshly generated public session identifier.
pub fn new_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Persistence operations for sessions, ratings and their aggregates.
#[async_trait]
pub trait QuizStore: Send + Sync {
    /// Confirm the backing store is reachable.
    async fn health_check(&self) -> StoreResult<()>;

    /// Create a session with a new identifier.
    async fn create_session(&self, origin: &NewQuizSession) -> StoreResult<QuizSession>;

    async fn find_session(&self, session_id: &str) -> StoreResult<Option<QuizSession>>;

    /// Merge a session's answers and progress into the stored row.
    /// `None` if it does not exist.
    async fn save_answers(&self, session: &QuizSession) -> StoreResult<Option<QuizSession>>;

    /// Apply one generation event to the stored row. `None` if it does not
    /// exist.
    async fn record_generation(
        &self,
        session_id: &str,
        update: &GenerationUpdate,
    ) -> StoreResult<Option<QuizSession>>;

    async fn funnel_counts(&self, range: &DateRange) -> StoreResult<FunnelCounts>;

    /// Generation status and artifact counts over sessions created in `range`.
    async fn generation_counts(&self, range: &DateRange) -> StoreResult<GenerationCounts>;

    /// Sessions per step 1 industry preference, most popular first.
    async fn industry_counts(&self, limit: usize) -> StoreResult<Vec<IndustryCount>>;

    /// Insert or overwrite a rating. The returned row has `is_updated` set
    /// when an existing rating was overwritten.
    async fn upsert_rating(
        &self,
        input: &RatingInput,
        demographics: &UserDemographics,
    ) -> StoreResult<Rating>;

    async fn ratings_for_session(&self, session_id: &str) -> StoreResult<Vec<Rating>>;

    async fn find_ratings(&self, filter: &RatingFilter) -> StoreResult<Vec<Rating>>;

    async fn recent_feedback(&self, query: &FeedbackQuery) -> StoreResult<Vec<Rating>>;

    async fn rating_totals(&self) -> StoreResult<RatingTotals>;
}
