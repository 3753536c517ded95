//! Quiz session model.
//!
//! Answers, generated results and generation state are stored as JSONB and
//! decoded straight into the typed core structs.

use brandquiz_core::answers::{Step1Answers, Step2Answers};
use brandquiz_core::generation::{
    AiResults, GenerationPhase, GenerationState, GenerationTracker, PhaseOutput,
};
use brandquiz_core::progress::{self, CompletedStep, QuizProgress, QuizStage, MAX_STEP, MIN_STEP};
use brandquiz_core::types::{DbId, SessionId, Timestamp};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A row from the `quiz_sessions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSession {
    pub id: DbId,
    pub session_id: SessionId,
    pub current_step: i16,
    pub completed_steps: Json<Vec<CompletedStep>>,
    pub step1: Option<Json<Step1Answers>>,
    pub step2: Option<Json<Step2Answers>>,
    pub ai_results: Json<AiResults>,
    pub generation: Json<GenerationTracker>,
    pub is_completed: bool,
    pub completed_at: Option<Timestamp>,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub referrer: Option<String>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl QuizSession {
    /// A fresh, unsaved session at step 1.
    pub fn new(session_id: SessionId, origin: &NewQuizSession, now: Timestamp) -> Self {
        Self {
            id: 0,
            session_id,
            current_step: i16::from(MIN_STEP),
            completed_steps: Json(Vec::new()),
            step1: None,
            step2: None,
            ai_results: Json(AiResults::default()),
            generation: Json(GenerationTracker::default()),
            is_completed: false,
            completed_at: None,
            user_agent: origin.user_agent.clone(),
            ip_address: origin.ip_address.clone(),
            referrer: origin.referrer.clone(),
            utm_source: origin.utm_source.clone(),
            utm_medium: origin.utm_medium.clone(),
            utm_campaign: origin.utm_campaign.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn step1_answers(&self) -> Option<&Step1Answers> {
        self.step1.as_ref().map(|j| &j.0)
    }

    pub fn step2_answers(&self) -> Option<&Step2Answers> {
        self.step2.as_ref().map(|j| &j.0)
    }

    pub fn current_step_number(&self) -> u8 {
        u8::try_from(self.current_step)
            .unwrap_or(MIN_STEP)
            .clamp(MIN_STEP, MAX_STEP)
    }

    /// Progress fields as a core value.
    pub fn progress(&self) -> QuizProgress {
        QuizProgress {
            current_step: self.current_step_number(),
            completed_steps: self.completed_steps.0.clone(),
            is_completed: self.is_completed,
            completed_at: self.completed_at,
        }
    }

    /// Write progress fields back onto the row.
    pub fn apply_progress(&mut self, progress: QuizProgress) {
        self.current_step = i16::from(progress.current_step);
        self.completed_steps = Json(progress.completed_steps);
        self.is_completed = progress.is_completed;
        self.completed_at = progress.completed_at;
    }

    pub fn stage(&self) -> QuizStage {
        progress::stage(self.step1.is_some(), self.step2.is_some(), self.is_completed)
    }

    /// Fold the answers and progress of a copy loaded earlier into this row.
    ///
    /// Answers present in `saved` replace the stored ones; progress only
    /// moves forward. Generation state and results are left alone.
    pub fn merge_answers(&mut self, saved: &QuizSession) {
        if saved.step1.is_some() {
            self.step1 = saved.step1.clone();
        }
        if saved.step2.is_some() {
            self.step2 = saved.step2.clone();
        }
        let mut progress = self.progress();
        progress.merge(&saved.progress());
        self.apply_progress(progress);
    }

    /// Record one generation event. Only the phase's own results and state
    /// change, plus completion when a final report arrives.
    pub fn apply_generation(&mut self, update: &GenerationUpdate, now: Timestamp) {
        let state = match update {
            GenerationUpdate::Started(_) => GenerationState::pending(now),
            GenerationUpdate::Succeeded(output) => {
                self.ai_results.store(output);
                if let PhaseOutput::Final(_) = output {
                    let mut progress = self.progress();
                    progress.record_final(now);
                    self.apply_progress(progress);
                }
                GenerationState::succeeded(now)
            }
            GenerationUpdate::Failed(_, message) => GenerationState::failed(now, message.clone()),
        };
        self.generation.set(update.phase(), state);
    }
}

/// A change to one phase's generation record.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationUpdate {
    Started(GenerationPhase),
    Succeeded(PhaseOutput),
    Failed(GenerationPhase, String),
}

impl GenerationUpdate {
    pub fn phase(&self) -> GenerationPhase {
        match self {
            Self::Started(phase) | Self::Failed(phase, _) => *phase,
            Self::Succeeded(output) => output.phase(),
        }
    }
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// Request metadata captured when a session is started.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewQuizSession {
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub referrer: Option<String>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
}
