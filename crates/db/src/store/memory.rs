use std::collections::HashMap;

use async_trait::async_trait;
use brandquiz_core::analytics::{
    DateRange, FunnelCounts, GenerationCounts, IndustryCount, RatingTotals,
};
use brandquiz_core::options::Labeled;
use brandquiz_core::ratings::{FeedbackQuery, RatingFilter, RatingInput, UserDemographics};
use brandquiz_core::types::DbId;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{new_session_id, QuizStore, StoreResult};
use crate::models::quiz_session::{GenerationUpdate, NewQuizSession, QuizSession};
use crate::models::rating::Rating;

#[derive(Default)]
struct MemoryState {
    sessions: HashMap<String, QuizSession>,
    ratings: Vec<Rating>,
    next_session_pk: DbId,
    next_rating_pk: DbId,
}

/// In-process [`QuizStore`]. Nothing survives a restart.
///
/// Mirrors the Postgres constraints the API relies on: ratings must
/// reference an existing session and are unique per
/// (session, rating type, result index).
#[derive(Default)]
pub struct MemoryQuizStore {
    state: RwLock<MemoryState>,
}

impl MemoryQuizStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(ratings: &mut [Rating]) {
    ratings.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

#[async_trait]
impl QuizStore for MemoryQuizStore {
    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn create_session(&self, origin: &NewQuizSession) -> StoreResult<QuizSession> {
        let mut state = self.state.write().await;
        state.next_session_pk += 1;

        let mut session = QuizSession::new(new_session_id(), origin, Utc::now());
        session.id = state.next_session_pk;
        state
            .sessions
            .insert(session.session_id.clone(), session.clone());
        Ok(session)
    }

    async fn find_session(&self, session_id: &str) -> StoreResult<Option<QuizSession>> {
        Ok(self.state.read().await.sessions.get(session_id).cloned())
    }

    async fn save_answers(&self, session: &QuizSession) -> StoreResult<Option<QuizSession>> {
        let mut state = self.state.write().await;
        let Some(stored) = state.sessions.get_mut(&session.session_id) else {
            return Ok(None);
        };

        stored.merge_answers(session);
        stored.updated_at = Utc::now();
        Ok(Some(stored.clone()))
    }

    async fn record_generation(
        &self,
        session_id: &str,
        update: &GenerationUpdate,
    ) -> StoreResult<Option<QuizSession>> {
        let mut state = self.state.write().await;
        let Some(stored) = state.sessions.get_mut(session_id) else {
            return Ok(None);
        };

        let now = Utc::now();
        stored.apply_generation(update, now);
        stored.updated_at = now;
        Ok(Some(stored.clone()))
    }

    async fn funnel_counts(&self, range: &DateRange) -> StoreResult<FunnelCounts> {
        let state = self.state.read().await;
        let mut counts = FunnelCounts::default();
        for session in state
            .sessions
            .values()
            .filter(|s| range.contains(s.created_at))
        {
            counts.started += 1;
            counts.step1_completed += u64::from(session.step1.is_some());
            counts.step2_completed += u64::from(session.step2.is_some());
            counts.final_completed += u64::from(session.is_completed);
        }
        Ok(counts)
    }

    async fn generation_counts(&self, range: &DateRange) -> StoreResult<GenerationCounts> {
        let state = self.state.read().await;
        let mut counts = GenerationCounts::default();
        for session in state
            .sessions
            .values()
            .filter(|s| range.contains(s.created_at))
        {
            counts.add_session(&session.generation, &session.ai_results);
        }
        Ok(counts)
    }

    async fn industry_counts(&self, limit: usize) -> StoreResult<Vec<IndustryCount>> {
        let state = self.state.read().await;
        let mut by_industry: HashMap<&'static str, u64> = HashMap::new();
        for answers in state.sessions.values().filter_map(|s| s.step1_answers()) {
            *by_industry
                .entry(answers.industry_preference.label())
                .or_default() += 1;
        }

        let mut counts: Vec<IndustryCount> = by_industry
            .into_iter()
            .map(|(industry, count)| IndustryCount {
                industry: industry.to_string(),
                count,
            })
            .collect();
        counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.industry.cmp(&b.industry)));
        counts.truncate(limit);
        Ok(counts)
    }

    async fn upsert_rating(
        &self,
        input: &RatingInput,
        demographics: &UserDemographics,
    ) -> StoreResult<Rating> {
        let mut state = self.state.write().await;
        if !state.sessions.contains_key(&input.session_id) {
            return Err(sqlx::Error::RowNotFound);
        }

        let now = Utc::now();
        let rating_type = input.rating_type.label();
        if let Some(existing) = state.ratings.iter_mut().find(|r| {
            r.session_id == input.session_id
                && r.rating_type == rating_type
                && r.result_index == input.result_index
        }) {
            existing.apply_update(input, demographics, now);
            return Ok(existing.clone());
        }

        state.next_rating_pk += 1;
        let rating = Rating::new(state.next_rating_pk, input, demographics, now);
        state.ratings.push(rating.clone());
        Ok(rating)
    }

    async fn ratings_for_session(&self, session_id: &str) -> StoreResult<Vec<Rating>> {
        let state = self.state.read().await;
        let mut ratings: Vec<Rating> = state
            .ratings
            .iter()
            .filter(|r| r.session_id == session_id)
            .cloned()
            .collect();
        newest_first(&mut ratings);
        Ok(ratings)
    }

    async fn find_ratings(&self, filter: &RatingFilter) -> StoreResult<Vec<Rating>> {
        let state = self.state.read().await;
        let mut ratings: Vec<Rating> = state
            .ratings
            .iter()
            .filter(|r| {
                r.parsed_rating_type().is_some_and(|t| {
                    filter.matches(t, &r.user_demographics, r.created_at)
                })
            })
            .cloned()
            .collect();
        newest_first(&mut ratings);
        Ok(ratings)
    }

    async fn recent_feedback(&self, query: &FeedbackQuery) -> StoreResult<Vec<Rating>> {
        let state = self.state.read().await;
        let mut ratings: Vec<Rating> = state
            .ratings
            .iter()
            .filter(|r| r.feedback.has_text())
            .filter(|r| {
                query
                    .rating_type
                    .is_none_or(|t| r.parsed_rating_type() == Some(t))
            })
            .filter(|r| r.score().is_some_and(|s| query.matches_score(s)))
            .cloned()
            .collect();
        newest_first(&mut ratings);
        ratings.truncate(usize::try_from(query.limit).unwrap_or(0));
        Ok(ratings)
    }

    async fn rating_totals(&self) -> StoreResult<RatingTotals> {
        let state = self.state.read().await;
        let total = state.ratings.len() as u64;
        let average = if total == 0 {
            0.0
        } else {
            state
                .ratings
                .iter()
                .map(|r| f64::from(r.star_rating))
                .sum::<f64>()
                / total as f64
        };
        Ok(RatingTotals { total, average })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brandquiz_core::generation::{GenerationPhase, GenerationStatus, PhaseOutput};
    use brandquiz_core::options::{GeographicLocation, RatingType};
    use brandquiz_core::ratings::{CategoryRatings, RatingFeedback};

    fn rating(session_id: &str, rating_type: RatingType, index: i32, stars: u8) -> RatingInput {
        RatingInput {
            session_id: session_id.to_string(),
            rating_type,
            result_index: index,
            star_rating: stars,
            category_ratings: CategoryRatings::default(),
            feedback: RatingFeedback::default(),
            confidence_level: None,
        }
    }

    #[tokio::test]
    async fn sessions_get_distinct_ids() {
        let store = MemoryQuizStore::new();
        let a = store.create_session(&NewQuizSession::default()).await.unwrap();
        let b = store.create_session(&NewQuizSession::default()).await.unwrap();

        assert_ne!(a.session_id, b.session_id);
        assert_ne!(a.id, b.id);
        assert!(store.find_session(&a.session_id).await.unwrap().is_some());
        assert!(store.find_session("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn writes_to_unknown_session_return_none() {
        let store = MemoryQuizStore::new();
        let session = QuizSession::new("ghost".to_string(), &NewQuizSession::default(), Utc::now());
        assert!(store.save_answers(&session).await.unwrap().is_none());

        let update = GenerationUpdate::Started(GenerationPhase::Step1);
        assert!(store.record_generation("ghost", &update).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn generation_result_does_not_undo_a_later_answer_save() {
        let store = MemoryQuizStore::new();
        let created = store.create_session(&NewQuizSession::default()).await.unwrap();

        // Another request advances the session while generation runs.
        let mut advanced = created.clone();
        advanced.current_step = 3;
        store.save_answers(&advanced).await.unwrap();

        let update = GenerationUpdate::Succeeded(PhaseOutput::Step1(Vec::new()));
        let saved = store
            .record_generation(&created.session_id, &update)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(saved.current_step, 3);
        assert_eq!(
            saved.generation.get(GenerationPhase::Step1).status,
            GenerationStatus::Succeeded
        );

        // A stale answer save cannot move progress back either.
        let saved = store.save_answers(&created).await.unwrap().unwrap();
        assert_eq!(saved.current_step, 3);
        assert_eq!(
            saved.generation.get(GenerationPhase::Step1).status,
            GenerationStatus::Succeeded
        );
    }

    #[tokio::test]
    async fn generation_counts_respect_the_window() {
        let store = MemoryQuizStore::new();
        let session = store.create_session(&NewQuizSession::default()).await.unwrap();
        store
            .record_generation(
                &session.session_id,
                &GenerationUpdate::Failed(GenerationPhase::Step2, "503".to_string()),
            )
            .await
            .unwrap();
        store.create_session(&NewQuizSession::default()).await.unwrap();

        let counts = store.generation_counts(&DateRange::default()).await.unwrap();
        assert_eq!(counts.sessions, 2);
        assert_eq!(counts.step2.failed, 1);

        let past = DateRange::parse(Some("2000-01-01"), Some("2000-12-31")).unwrap();
        let counts = store.generation_counts(&past).await.unwrap();
        assert_eq!(counts.sessions, 0);
    }

    #[tokio::test]
    async fn rerating_updates_in_place() {
        let store = MemoryQuizStore::new();
        let session = store.create_session(&NewQuizSession::default()).await.unwrap();
        let demographics = UserDemographics::default();

        let first = store
            .upsert_rating(&rating(&session.session_id, RatingType::BrandVoice, 0, 3), &demographics)
            .await
            .unwrap();
        assert!(!first.is_updated);

        let second = store
            .upsert_rating(&rating(&session.session_id, RatingType::BrandVoice, 0, 5), &demographics)
            .await
            .unwrap();
        assert!(second.is_updated);
        assert_eq!(second.id, first.id);
        assert_eq!(second.star_rating, 5);
        assert_eq!(second.original_rating_id, Some(first.id));

        let all = store.ratings_for_session(&session.session_id).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn rating_requires_existing_session() {
        let store = MemoryQuizStore::new();
        let result = store
            .upsert_rating(&rating("nope", RatingType::BrandVoice, 0, 3), &UserDemographics::default())
            .await;
        assert!(matches!(result, Err(sqlx::Error::RowNotFound)));
    }

    #[tokio::test]
    async fn filters_use_demographic_snapshot() {
        let store = MemoryQuizStore::new();
        let session = store.create_session(&NewQuizSession::default()).await.unwrap();
        let europe = UserDemographics {
            geographic_location: Some(GeographicLocation::Europe),
            ..Default::default()
        };
        store
            .upsert_rating(&rating(&session.session_id, RatingType::Step1Result, 0, 4), &europe)
            .await
            .unwrap();
        store
            .upsert_rating(
                &rating(&session.session_id, RatingType::Step1Result, 1, 2),
                &UserDemographics::default(),
            )
            .await
            .unwrap();

        let filter = RatingFilter {
            geographic_location: Some(GeographicLocation::Europe),
            ..Default::default()
        };
        let found = store.find_ratings(&filter).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].star_rating, 4);

        let totals = store.rating_totals().await.unwrap();
        assert_eq!(totals.total, 2);
        assert_eq!(totals.average, 3.0);
    }

    #[tokio::test]
    async fn recent_feedback_skips_blank_text() {
        let store = MemoryQuizStore::new();
        let session = store.create_session(&NewQuizSession::default()).await.unwrap();
        let mut with_text = rating(&session.session_id, RatingType::HeroSlogans, 0, 5);
        with_text.feedback.liked = Some("Punchy".to_string());
        store
            .upsert_rating(&with_text, &UserDemographics::default())
            .await
            .unwrap();
        store
            .upsert_rating(
                &rating(&session.session_id, RatingType::HeroSlogans, 1, 1),
                &UserDemographics::default(),
            )
            .await
            .unwrap();

        let query = FeedbackQuery {
            rating_type: None,
            min_rating: None,
            max_rating: None,
            limit: 20,
        };
        let feedback = store.recent_feedback(&query).await.unwrap();
        assert_eq!(feedback.len(), 1);
        assert_eq!(feedback[0].feedback.liked.as_deref(), Some("Punchy"));

        let strict = FeedbackQuery {
            max_rating: Some(4),
            ..query
        };
        assert!(store.recent_feedback(&strict).await.unwrap().is_empty());
    }
}
