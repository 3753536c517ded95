//! Repository for the `quiz_sessions` table.

use brandquiz_core::analytics::{
    DateRange, FunnelCounts, GenerationCounts, IndustryCount, PhaseCounts,
};
use sqlx::{PgConnection, PgPool};

use crate::models::quiz_session::{GenerationUpdate, NewQuizSession, QuizSession};

/// Column list for `quiz_sessions` queries.
const COLUMNS: &str = "\
    id, session_id, current_step, completed_steps, step1, step2, \
    ai_results, generation, is_completed, completed_at, \
    user_agent, ip_address, referrer, utm_source, utm_medium, utm_campaign, \
    created_at, updated_at";

/// Provides data access for quiz sessions.
pub struct QuizSessionRepo;

impl QuizSessionRepo {
    /// Insert a new session at step 1.
    pub async fn create(
        pool: &PgPool,
        session_id: &str,
        origin: &NewQuizSession,
    ) -> Result<QuizSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO quiz_sessions \
                 (session_id, user_agent, ip_address, referrer, utm_source, utm_medium, utm_campaign) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, QuizSession>(&query)
            .bind(session_id)
            .bind(&origin.user_agent)
            .bind(&origin.ip_address)
            .bind(&origin.referrer)
            .bind(&origin.utm_source)
            .bind(&origin.utm_medium)
            .bind(&origin.utm_campaign)
            .fetch_one(pool)
            .await
    }

    /// Find a session by its public identifier.
    pub async fn find_by_session_id(
        pool: &PgPool,
        session_id: &str,
    ) -> Result<Option<QuizSession>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM quiz_sessions WHERE session_id = $1");
        sqlx::query_as::<_, QuizSession>(&query)
            .bind(session_id)
            .fetch_optional(pool)
            .await
    }

    /// Merge answers and progress from `session` into the stored row.
    ///
    /// The row is locked while merging, so concurrent writers serialize.
    /// Returns `None` if the session no longer exists.
    pub async fn save_answers(
        pool: &PgPool,
        session: &QuizSession,
    ) -> Result<Option<QuizSession>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let Some(mut stored) = Self::lock(&mut tx, &session.session_id).await? else {
            return Ok(None);
        };
        stored.merge_answers(session);
        let saved = Self::write_back(&mut tx, &stored).await?;
        tx.commit().await?;
        Ok(Some(saved))
    }

    /// Apply one generation event to the stored row under a row lock.
    ///
    /// Returns `None` if the session no longer exists.
    pub async fn record_generation(
        pool: &PgPool,
        session_id: &str,
        update: &GenerationUpdate,
    ) -> Result<Option<QuizSession>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let Some(mut stored) = Self::lock(&mut tx, session_id).await? else {
            return Ok(None);
        };
        stored.apply_generation(update, chrono::Utc::now());
        let saved = Self::write_back(&mut tx, &stored).await?;
        tx.commit().await?;
        Ok(Some(saved))
    }

    async fn lock(
        conn: &mut PgConnection,
        session_id: &str,
    ) -> Result<Option<QuizSession>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM quiz_sessions WHERE session_id = $1 FOR UPDATE");
        sqlx::query_as::<_, QuizSession>(&query)
            .bind(session_id)
            .fetch_optional(conn)
            .await
    }

    async fn write_back(
        conn: &mut PgConnection,
        session: &QuizSession,
    ) -> Result<QuizSession, sqlx::Error> {
        let query = format!(
            "UPDATE quiz_sessions SET \
                 current_step = $2, \
                 completed_steps = $3, \
                 step1 = $4, \
                 step2 = $5, \
                 ai_results = $6, \
                 generation = $7, \
                 is_completed = $8, \
                 completed_at = $9, \
                 updated_at = NOW() \
             WHERE session_id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, QuizSession>(&query)
            .bind(&session.session_id)
            .bind(session.current_step)
            .bind(&session.completed_steps)
            .bind(&session.step1)
            .bind(&session.step2)
            .bind(&session.ai_results)
            .bind(&session.generation)
            .bind(session.is_completed)
            .bind(session.completed_at)
            .fetch_one(conn)
            .await
    }

    /// Count sessions at each funnel stage, limited to sessions created in
    /// `range`.
    pub async fn funnel_counts(
        pool: &PgPool,
        range: &DateRange,
    ) -> Result<FunnelCounts, sqlx::Error> {
        let (started, step1, step2, completed): (i64, i64, i64, i64) = sqlx::query_as(
            "SELECT \
                 COUNT(*), \
                 COUNT(*) FILTER (WHERE step1 IS NOT NULL), \
                 COUNT(*) FILTER (WHERE step2 IS NOT NULL), \
                 COUNT(*) FILTER (WHERE is_completed) \
             FROM quiz_sessions \
             WHERE ($1::timestamptz IS NULL OR created_at >= $1) \
               AND ($2::timestamptz IS NULL OR created_at <= $2)",
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_one(pool)
        .await?;

        Ok(FunnelCounts {
            started: to_count(started),
            step1_completed: to_count(step1),
            step2_completed: to_count(step2),
            final_completed: to_count(completed),
        })
    }

    /// Generation status and stored artifact counts per phase.
    pub async fn generation_counts(
        pool: &PgPool,
        range: &DateRange,
    ) -> Result<GenerationCounts, sqlx::Error> {
        let row: (i64, i64, i64, i64, i64, i64, i64, i64, i64, i64, i64, i64, i64) =
            sqlx::query_as(
                "SELECT \
                     COUNT(*), \
                     COUNT(*) FILTER (WHERE generation->'step1'->>'status' = 'pending'), \
                     COUNT(*) FILTER (WHERE generation->'step1'->>'status' = 'succeeded'), \
                     COUNT(*) FILTER (WHERE generation->'step1'->>'status' = 'failed'), \
                     COALESCE(SUM(jsonb_array_length(COALESCE(ai_results->'step1Results', '[]'::jsonb))), 0)::BIGINT, \
                     COUNT(*) FILTER (WHERE generation->'step2'->>'status' = 'pending'), \
                     COUNT(*) FILTER (WHERE generation->'step2'->>'status' = 'succeeded'), \
                     COUNT(*) FILTER (WHERE generation->'step2'->>'status' = 'failed'), \
                     COALESCE(SUM(jsonb_array_length(COALESCE(ai_results->'step2Results', '[]'::jsonb))), 0)::BIGINT, \
                     COUNT(*) FILTER (WHERE generation->'final'->>'status' = 'pending'), \
                     COUNT(*) FILTER (WHERE generation->'final'->>'status' = 'succeeded'), \
                     COUNT(*) FILTER (WHERE generation->'final'->>'status' = 'failed'), \
                     COUNT(*) FILTER (WHERE jsonb_typeof(ai_results->'finalResults') = 'object') \
                 FROM quiz_sessions \
                 WHERE ($1::timestamptz IS NULL OR created_at >= $1) \
                   AND ($2::timestamptz IS NULL OR created_at <= $2)",
            )
            .bind(range.start)
            .bind(range.end)
            .fetch_one(pool)
            .await?;

        let phase = |pending, succeeded, failed, artifacts| PhaseCounts {
            pending: to_count(pending),
            succeeded: to_count(succeeded),
            failed: to_count(failed),
            artifacts: to_count(artifacts),
        };
        Ok(GenerationCounts {
            sessions: to_count(row.0),
            step1: phase(row.1, row.2, row.3, row.4),
            step2: phase(row.5, row.6, row.7, row.8),
            final_report: phase(row.9, row.10, row.11, row.12),
        })
    }

    /// Sessions per industry preference, most popular first.
    pub async fn industry_counts(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<IndustryCount>, sqlx::Error> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT step1->>'industryPreference' AS industry, COUNT(*) \
             FROM quiz_sessions \
             WHERE step1->>'industryPreference' IS NOT NULL \
             GROUP BY industry \
             ORDER BY COUNT(*) DESC, industry ASC \
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(industry, count)| IndustryCount {
                industry,
                count: to_count(count),
            })
            .collect())
    }
}

pub(crate) fn to_count(n: i64) -> u64 {
    u64::try_from(n).unwrap_or(0)
}
