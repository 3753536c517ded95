//! Handlers for the quiz session lifecycle.
//!
//! A session moves through step 1 answers, step 2 answers and the final
//! report. Each step submission saves the answers first and then runs that
//! phase's generation. Step-level generation failures are recorded on the
//! session and do not fail the request; a final report failure returns 500.
//!
//! Generation writes only its own phase's results and state, so a slow call
//! never overwrites answers saved by another request in the meantime.

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use std::sync::Arc;

use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::types::Json as JsonColumn;

use brandquiz_core::answers::{
    decode_payload, normalize_text, validate_payload, StepAnswers, Step1Answers, Step2Answers,
    Validated,
};
use brandquiz_core::error::{CoreError, FieldError};
use brandquiz_core::generation::{
    FinalReport, GeneratedArtifact, GenerationPhase, GenerationState, GenerationTracker,
    PhaseOutput,
};
use brandquiz_core::options::{catalog, OptionCatalog};
use brandquiz_core::progress::{self, CompletedStep, QuizStage, QuizStep};
use brandquiz_core::types::{SessionId, Timestamp};
use brandquiz_db::models::quiz_session::{GenerationUpdate, NewQuizSession, QuizSession};
use brandquiz_db::store::QuizStore;
use brandquiz_llm::pipeline;
use brandquiz_llm::{GenerationError, TextGenerator};

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Attribution parameters accepted by `POST /quiz/start`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartParams {
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalResultsRequest {
    pub session_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RegenerateRequest {
    #[serde(rename = "type")]
    pub regeneration_type: Option<String>,
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartResponse {
    pub session_id: SessionId,
    pub current_step: u8,
    pub completion_percentage: f64,
}

/// Progress projection of a session.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: SessionId,
    pub current_step: u8,
    pub completion_percentage: f64,
    pub is_completed: bool,
    pub completed_steps: Vec<CompletedStep>,
    pub has_step1_data: bool,
    pub has_step2_data: bool,
    /// Whether the final report exists.
    pub has_results: bool,
    pub stage: QuizStage,
    pub generation: GenerationTracker,
}

impl From<&QuizSession> for SessionView {
    fn from(session: &QuizSession) -> Self {
        Self {
            session_id: session.session_id.clone(),
            current_step: session.current_step_number(),
            completion_percentage: session.progress().completion_percentage(),
            is_completed: session.is_completed,
            completed_steps: session.completed_steps.0.clone(),
            has_step1_data: session.step1.is_some(),
            has_step2_data: session.step2.is_some(),
            has_results: session.ai_results.final_results.is_some(),
            stage: session.stage(),
            generation: session.generation.0.clone(),
        }
    }
}

/// Response to a step submission. `ai_results` holds that step's artifacts.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepResponse {
    pub session_id: SessionId,
    pub current_step: u8,
    pub completion_percentage: f64,
    pub ai_results: Vec<GeneratedArtifact>,
    pub generation_status: GenerationState,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalResultsResponse {
    pub session_id: SessionId,
    pub is_completed: bool,
    pub completion_percentage: f64,
    pub final_results: FinalReport,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsView {
    pub session_id: SessionId,
    pub is_completed: bool,
    pub completion_percentage: f64,
    pub step1_results: Vec<GeneratedArtifact>,
    pub step2_results: Vec<GeneratedArtifact>,
    pub final_results: Option<FinalReport>,
    pub completed_at: Option<Timestamp>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegenerateResponse {
    pub session_id: SessionId,
    pub regeneration_type: GenerationPhase,
    pub result: PhaseOutput,
    pub generation: GenerationTracker,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn session_not_found(session_id: &str) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Quiz session",
        id: session_id.to_string(),
    })
}

/// Load a session, failing with 404 when it does not exist.
async fn load_session(state: &AppState, session_id: &str) -> AppResult<QuizSession> {
    state
        .store
        .find_session(session_id)
        .await?
        .ok_or_else(|| session_not_found(session_id))
}

async fn save_answers(state: &AppState, session: &QuizSession) -> AppResult<QuizSession> {
    state
        .store
        .save_answers(session)
        .await?
        .ok_or_else(|| session_not_found(&session.session_id))
}

async fn record_generation(
    state: &AppState,
    session_id: &str,
    update: &GenerationUpdate,
) -> AppResult<QuizSession> {
    state
        .store
        .record_generation(session_id, update)
        .await?
        .ok_or_else(|| session_not_found(session_id))
}

fn header_text(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// First hop of `X-Forwarded-For`, falling back to `X-Real-IP`.
fn client_ip(headers: &HeaderMap) -> Option<String> {
    header_text(headers, "x-forwarded-for")
        .and_then(|chain| chain.split(',').next().map(|ip| ip.trim().to_string()))
        .filter(|ip| !ip.is_empty())
        .or_else(|| header_text(headers, "x-real-ip"))
}

/// Answers a phase is generated from, copied out of the session.
enum PhaseInput {
    Step1(Step1Answers),
    Step2(Step1Answers, Step2Answers),
    Final(Step1Answers, Step2Answers),
}

impl PhaseInput {
    fn phase(&self) -> GenerationPhase {
        match self {
            Self::Step1(_) => GenerationPhase::Step1,
            Self::Step2(..) => GenerationPhase::Step2,
            Self::Final(..) => GenerationPhase::Final,
        }
    }
}

/// Check that the session holds the answers `phase` needs.
fn phase_input(session: &QuizSession, phase: GenerationPhase) -> Result<PhaseInput, CoreError> {
    let step1 = session.step1_answers().cloned();
    let step2 = session.step2_answers().cloned();

    match (phase, step1, step2) {
        (GenerationPhase::Step1, Some(step1), _) => Ok(PhaseInput::Step1(step1)),
        (GenerationPhase::Step2, Some(step1), Some(step2)) => Ok(PhaseInput::Step2(step1, step2)),
        (GenerationPhase::Final, Some(step1), Some(step2)) => Ok(PhaseInput::Final(step1, step2)),
        (GenerationPhase::Step1, None, _) => Err(CoreError::Precondition(
            "Step 1 must be completed first".to_string(),
        )),
        (phase, _, _) => Err(CoreError::Precondition(format!(
            "Both step 1 and step 2 must be completed before generating {} results",
            if phase == GenerationPhase::Final { "final" } else { "step 2" }
        ))),
    }
}

async fn run_phase(
    generator: &dyn TextGenerator,
    input: &PhaseInput,
) -> Result<PhaseOutput, GenerationError> {
    match input {
        PhaseInput::Step1(step1) => pipeline::generate_step1_results(generator, step1)
            .await
            .map(PhaseOutput::Step1),
        PhaseInput::Step2(step1, step2) => pipeline::generate_step2_results(generator, step1, step2)
            .await
            .map(PhaseOutput::Step2),
        PhaseInput::Final(step1, step2) => pipeline::generate_final_report(generator, step1, step2)
            .await
            .map(PhaseOutput::Final),
    }
}

/// Message recorded when a generation never reported back.
pub const INTERRUPTED_MESSAGE: &str = "Generation was interrupted before it finished";

/// A phase marked pending in the store.
///
/// Dropped without [`PendingGeneration::settle`] (the request timed out or
/// the client went away), it records the phase as failed so it does not stay
/// pending.
struct PendingGeneration {
    store: Arc<dyn QuizStore>,
    session_id: String,
    phase: GenerationPhase,
    settled: bool,
}

impl PendingGeneration {
    fn settle(mut self) {
        self.settled = true;
    }
}

impl Drop for PendingGeneration {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return;
        };

        tracing::warn!(
            session_id = %self.session_id,
            phase = self.phase.as_str(),
            "Generation abandoned while pending",
        );
        let store = Arc::clone(&self.store);
        let session_id = std::mem::take(&mut self.session_id);
        let update = GenerationUpdate::Failed(self.phase, INTERRUPTED_MESSAGE.to_string());
        runtime.spawn(async move {
            if let Err(error) = store.record_generation(&session_id, &update).await {
                tracing::error!(
                    session_id = %session_id,
                    error = %error,
                    "Failed to record abandoned generation",
                );
            }
        });
    }
}

/// Mark the phase pending, generate, then record the outcome.
///
/// Returns the stored session together with the generation result. On
/// failure the previous results are kept and the error text is returned.
async fn generate_and_save(
    state: &AppState,
    session_id: &str,
    input: PhaseInput,
) -> AppResult<(QuizSession, Result<PhaseOutput, String>)> {
    let phase = input.phase();
    record_generation(state, session_id, &GenerationUpdate::Started(phase)).await?;
    let pending = PendingGeneration {
        store: Arc::clone(&state.store),
        session_id: session_id.to_string(),
        phase,
        settled: false,
    };

    let outcome = run_phase(state.generator.as_ref(), &input).await;
    let (update, outcome) = match outcome {
        Ok(output) => (GenerationUpdate::Succeeded(output.clone()), Ok(output)),
        Err(error) => {
            let message = error.to_string();
            (GenerationUpdate::Failed(phase, message.clone()), Err(message))
        }
    };

    let session = record_generation(state, session_id, &update).await;
    pending.settle();
    Ok((session?, outcome))
}

/// Validate, save and generate for a step 1 or step 2 submission.
async fn submit_step(
    state: &AppState,
    step: QuizStep,
    payload: serde_json::Value,
) -> AppResult<StepResponse> {
    let Validated { session_id, answers } = validate_payload(step, payload)?;
    let mut session = load_session(state, &session_id).await?;

    let now = Utc::now();
    let mut progress = session.progress();
    let phase = match answers {
        StepAnswers::Step1(step1) => {
            progress.record_step1(now);
            session.step1 = Some(JsonColumn(step1));
            GenerationPhase::Step1
        }
        StepAnswers::Step2(step2) => {
            progress.record_step2(session.step1.is_some(), now)?;
            session.step2 = Some(JsonColumn(step2));
            GenerationPhase::Step2
        }
    };
    session.apply_progress(progress);
    tracing::info!(
        session_id = %session.session_id,
        step = step.to_number(),
        current_step = session.current_step,
        "Step answers accepted",
    );

    let input = phase_input(&session, phase)?;
    let session = save_answers(state, &session).await?;
    let (session, outcome) = generate_and_save(state, &session.session_id, input).await?;
    if let Err(error) = &outcome {
        tracing::warn!(
            session_id = %session.session_id,
            phase = phase.as_str(),
            error = %error,
            "Step generation failed; answers were kept",
        );
    }

    let ai_results = match phase {
        GenerationPhase::Step2 => session.ai_results.step2_results.clone(),
        _ => session.ai_results.step1_results.clone(),
    };

    Ok(StepResponse {
        session_id: session.session_id.clone(),
        current_step: session.current_step_number(),
        completion_percentage: session.progress().completion_percentage(),
        ai_results,
        generation_status: session.generation.get(phase).clone(),
    })
}

// ---------------------------------------------------------------------------
// POST /quiz/start
// ---------------------------------------------------------------------------

/// Start a new session, recording where the visitor came from.
pub async fn start_quiz(
    State(state): State<AppState>,
    Query(params): Query<StartParams>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let origin = NewQuizSession {
        user_agent: header_text(&headers, header::USER_AGENT.as_str()),
        ip_address: client_ip(&headers),
        referrer: header_text(&headers, header::REFERER.as_str()),
        utm_source: normalize_text(params.utm_source),
        utm_medium: normalize_text(params.utm_medium),
        utm_campaign: normalize_text(params.utm_campaign),
    };

    let session = state.store.create_session(&origin).await?;
    tracing::info!(
        session_id = %session.session_id,
        utm_source = ?session.utm_source,
        "Quiz session started",
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: StartResponse {
                session_id: session.session_id.clone(),
                current_step: session.current_step_number(),
                // Nothing has been answered yet.
                completion_percentage: 0.0,
            },
        }),
    ))
}

// ---------------------------------------------------------------------------
// GET /quiz/session/{session_id}
// ---------------------------------------------------------------------------

pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let session = load_session(&state, &session_id).await?;
    Ok(Json(DataResponse {
        data: SessionView::from(&session),
    }))
}

// ---------------------------------------------------------------------------
// POST /quiz/step1, POST /quiz/step2
// ---------------------------------------------------------------------------

/// Submit step 1 answers and generate the three profile summaries.
pub async fn submit_step1(
    State(state): State<AppState>,
    AppJson(payload): AppJson<serde_json::Value>,
) -> AppResult<impl IntoResponse> {
    let data = submit_step(&state, QuizStep::PersonalFoundation, payload).await?;
    Ok(Json(DataResponse { data }))
}

/// Submit step 2 answers and generate the three market strategies.
///
/// Requires step 1 answers; otherwise nothing is saved.
pub async fn submit_step2(
    State(state): State<AppState>,
    AppJson(payload): AppJson<serde_json::Value>,
) -> AppResult<impl IntoResponse> {
    let data = submit_step(&state, QuizStep::MarketResearch, payload).await?;
    Ok(Json(DataResponse { data }))
}

// ---------------------------------------------------------------------------
// POST /quiz/generate-final-results
// ---------------------------------------------------------------------------

/// Generate the final report and complete the session.
pub async fn generate_final_results(
    State(state): State<AppState>,
    AppJson(payload): AppJson<serde_json::Value>,
) -> AppResult<impl IntoResponse> {
    let request: FinalResultsRequest = decode_payload(payload)?;
    let session_id = normalize_text(request.session_id).ok_or_else(|| {
        CoreError::InvalidFields(vec![FieldError::new("sessionId", "sessionId is required")])
    })?;

    let session = load_session(&state, &session_id).await?;
    progress::ensure_ready_for_final(session.step1.is_some(), session.step2.is_some())?;
    let input = phase_input(&session, GenerationPhase::Final)?;

    let (session, outcome) = generate_and_save(&state, &session_id, input).await?;
    let report = match outcome {
        Ok(PhaseOutput::Final(report)) => report,
        Ok(_) => {
            return Err(AppError::InternalError(
                "Final generation returned step artifacts".to_string(),
            ))
        }
        Err(error) => {
            tracing::error!(session_id = %session_id, error = %error, "Final report generation failed");
            return Err(CoreError::Generation("Failed to generate final results".to_string()).into());
        }
    };

    tracing::info!(session_id = %session.session_id, "Quiz session completed");
    Ok(Json(DataResponse {
        data: FinalResultsResponse {
            session_id: session.session_id.clone(),
            is_completed: session.is_completed,
            completion_percentage: session.progress().completion_percentage(),
            final_results: report,
        },
    }))
}

// ---------------------------------------------------------------------------
// GET /quiz/results/{session_id}
// ---------------------------------------------------------------------------

pub async fn get_results(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let session = load_session(&state, &session_id).await?;
    let completion_percentage = session.progress().completion_percentage();
    let results = session.ai_results.0;

    Ok(Json(DataResponse {
        data: ResultsView {
            session_id: session.session_id,
            is_completed: session.is_completed,
            completion_percentage,
            step1_results: results.step1_results,
            step2_results: results.step2_results,
            final_results: results.final_results,
            completed_at: session.completed_at,
        },
    }))
}

// ---------------------------------------------------------------------------
// GET /quiz/options
// ---------------------------------------------------------------------------

/// Every option list the client renders, with selection bounds.
pub async fn get_options() -> Json<DataResponse<OptionCatalog>> {
    Json(DataResponse { data: catalog() })
}

// ---------------------------------------------------------------------------
// POST /quiz/regenerate/{session_id}
// ---------------------------------------------------------------------------

/// Rerun one phase for an existing session.
///
/// Replaces that phase's results on success. A failure is recorded on the
/// session and returned as 500.
pub async fn regenerate(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    AppJson(payload): AppJson<serde_json::Value>,
) -> AppResult<impl IntoResponse> {
    let request: RegenerateRequest = decode_payload(payload)?;
    let raw_type = normalize_text(request.regeneration_type).ok_or_else(|| {
        CoreError::InvalidFields(vec![FieldError::new("type", "type is required")])
    })?;
    let phase = GenerationPhase::from_str_db(&raw_type)?;

    let session = load_session(&state, &session_id).await?;
    let input = phase_input(&session, phase)?;
    tracing::info!(session_id = %session_id, phase = phase.as_str(), "Regenerating results");

    let (session, outcome) = generate_and_save(&state, &session_id, input).await?;
    let result = outcome.map_err(|error| {
        tracing::error!(
            session_id = %session_id,
            phase = phase.as_str(),
            error = %error,
            "Regeneration failed",
        );
        CoreError::Generation(format!("Failed to regenerate {} results", phase.as_str()))
    })?;

    Ok(Json(DataResponse {
        data: RegenerateResponse {
            session_id: session.session_id.clone(),
            regeneration_type: phase,
            result,
            generation: session.generation.0.clone(),
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn client_ip_prefers_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7, 10.0.0.1"));
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));
        assert_eq!(client_ip(&headers).as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn client_ip_falls_back_to_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));
        assert_eq!(client_ip(&headers).as_deref(), Some("10.0.0.2"));
        assert_eq!(client_ip(&HeaderMap::new()), None);
    }

    #[test]
    fn phase_input_requires_answers() {
        let session = QuizSession::new("s".to_string(), &NewQuizSession::default(), Utc::now());
        assert!(matches!(
            phase_input(&session, GenerationPhase::Step1),
            Err(CoreError::Precondition(_))
        ));
        assert!(matches!(
            phase_input(&session, GenerationPhase::Final),
            Err(CoreError::Precondition(_))
        ));
    }
}
