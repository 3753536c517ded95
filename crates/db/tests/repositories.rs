//! Repository tests against a real Postgres.
//!
//! Run with `DATABASE_URL` set and `cargo test -- --ignored`.

use brandquiz_core::analytics::DateRange;
use brandquiz_core::options::{Industry, RatingType};
use brandquiz_core::ratings::{
    CategoryRatings, FeedbackQuery, RatingFeedback, RatingFilter, RatingInput, UserDemographics,
};
use brandquiz_core::generation::{GenerationPhase, GenerationStatus, PhaseOutput};
use brandquiz_db::models::quiz_session::{GenerationUpdate, NewQuizSession};
use brandquiz_db::repositories::{QuizSessionRepo, RatingRepo};
use sqlx::PgPool;

fn rating(session_id: &str, stars: u8) -> RatingInput {
    RatingInput {
        session_id: session_id.to_string(),
        rating_type: RatingType::Step2Result,
        result_index: 1,
        star_rating: stars,
        category_ratings: CategoryRatings {
            market_fit: Some(stars),
            ..Default::default()
        },
        feedback: RatingFeedback {
            liked: Some("Clear next steps".to_string()),
            ..Default::default()
        },
        confidence_level: None,
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "needs a Postgres DATABASE_URL"]
async fn session_create_find_update(pool: PgPool) {
    brandquiz_db::health_check(&pool).await.unwrap();

    let origin = NewQuizSession {
        utm_campaign: Some("spring".to_string()),
        ..Default::default()
    };
    let mut session = QuizSessionRepo::create(&pool, "sess-a", &origin)
        .await
        .unwrap();
    assert_eq!(session.current_step, 1);
    assert_eq!(session.utm_campaign.as_deref(), Some("spring"));

    let now = chrono::Utc::now();
    let mut progress = session.progress();
    progress.record_step1(now);
    session.apply_progress(progress);

    let saved = QuizSessionRepo::save_answers(&pool, &session)
        .await
        .unwrap()
        .expect("session exists");
    assert_eq!(saved.current_step, 2);
    assert_eq!(saved.completed_steps.len(), 1);

    let found = QuizSessionRepo::find_by_session_id(&pool, "sess-a")
        .await
        .unwrap()
        .expect("session exists");
    assert_eq!(found.current_step, 2);

    let counts = QuizSessionRepo::funnel_counts(&pool, &DateRange::default())
        .await
        .unwrap();
    assert_eq!(counts.started, 1);
    assert_eq!(counts.step1_completed, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "needs a Postgres DATABASE_URL"]
async fn generation_events_keep_concurrent_progress(pool: PgPool) {
    let loaded = QuizSessionRepo::create(&pool, "sess-g", &NewQuizSession::default())
        .await
        .unwrap();

    let mut advanced = loaded.clone();
    advanced.current_step = 3;
    QuizSessionRepo::save_answers(&pool, &advanced).await.unwrap();

    let started = GenerationUpdate::Started(GenerationPhase::Step1);
    QuizSessionRepo::record_generation(&pool, "sess-g", &started)
        .await
        .unwrap();
    let saved = QuizSessionRepo::record_generation(
        &pool,
        "sess-g",
        &GenerationUpdate::Succeeded(PhaseOutput::Step1(Vec::new())),
    )
    .await
    .unwrap()
    .expect("session exists");
    assert_eq!(saved.current_step, 3);
    assert_eq!(
        saved.generation.get(GenerationPhase::Step1).status,
        GenerationStatus::Succeeded
    );

    let stale = QuizSessionRepo::save_answers(&pool, &loaded)
        .await
        .unwrap()
        .expect("session exists");
    assert_eq!(stale.current_step, 3);

    let counts = QuizSessionRepo::generation_counts(&pool, &DateRange::default())
        .await
        .unwrap();
    assert_eq!(counts.sessions, 1);
    assert_eq!(counts.step1.succeeded, 1);
    assert_eq!(counts.final_report.artifacts, 0);

    let missing = QuizSessionRepo::record_generation(
        &pool,
        "ghost",
        &GenerationUpdate::Started(GenerationPhase::Final),
    )
    .await
    .unwrap();
    assert!(missing.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "needs a Postgres DATABASE_URL"]
async fn duplicate_session_id_is_rejected(pool: PgPool) {
    QuizSessionRepo::create(&pool, "dup", &NewQuizSession::default())
        .await
        .unwrap();
    let err = QuizSessionRepo::create(&pool, "dup", &NewQuizSession::default())
        .await
        .unwrap_err();
    let db_err = err.as_database_error().expect("database error");
    assert_eq!(db_err.constraint(), Some("uq_quiz_sessions_session_id"));
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "needs a Postgres DATABASE_URL"]
async fn rating_upsert_overwrites_same_result(pool: PgPool) {
    QuizSessionRepo::create(&pool, "sess-r", &NewQuizSession::default())
        .await
        .unwrap();
    let demographics = UserDemographics {
        industry_preference: Some(Industry::HealthWellness),
        ..Default::default()
    };

    let first = RatingRepo::upsert(&pool, &rating("sess-r", 2), &demographics)
        .await
        .unwrap();
    assert!(!first.is_updated);

    let second = RatingRepo::upsert(&pool, &rating("sess-r", 5), &demographics)
        .await
        .unwrap();
    assert!(second.is_updated);
    assert_eq!(second.id, first.id);
    assert_eq!(second.original_rating_id, Some(first.id));
    assert_eq!(second.star_rating, 5);

    let filter = RatingFilter {
        industry_preference: Some(Industry::HealthWellness),
        ..Default::default()
    };
    assert_eq!(RatingRepo::list_filtered(&pool, &filter).await.unwrap().len(), 1);

    let feedback = RatingRepo::recent_feedback(
        &pool,
        &FeedbackQuery {
            rating_type: Some(RatingType::Step2Result),
            min_rating: Some(4),
            max_rating: None,
            limit: 10,
        },
    )
    .await
    .unwrap();
    assert_eq!(feedback.len(), 1);

    let totals = RatingRepo::totals(&pool).await.unwrap();
    assert_eq!(totals.total, 1);
    assert_eq!(totals.average, 5.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "needs a Postgres DATABASE_URL"]
async fn rating_for_unknown_session_violates_foreign_key(pool: PgPool) {
    let err = RatingRepo::upsert(&pool, &rating("ghost", 3), &UserDemographics::default())
        .await
        .unwrap_err();
    assert!(err.as_database_error().is_some());
}
