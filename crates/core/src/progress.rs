//! Quiz session progress: steps, stages and transition guards.
//!
//! A session moves one way through `created → step1_done → step2_done →
//! completed`. Resubmitting a step overwrites that step's answers but never
//! rolls `current_step` back.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

/// Total number of steps in the quiz (two answer steps plus synthesis).
pub const TOTAL_STEPS: u8 = 3;

/// Minimum step number (1-based).
pub const MIN_STEP: u8 = 1;

/// Maximum step number (1-based).
pub const MAX_STEP: u8 = 3;

/// The three quiz steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizStep {
    PersonalFoundation,
    MarketResearch,
    FinalSynthesis,
}

impl QuizStep {
    /// Convert a 1-based step number to a `QuizStep`.
    pub fn from_number(n: u8) -> Result<Self, CoreError> {
        match n {
            1 => Ok(Self::PersonalFoundation),
            2 => Ok(Self::MarketResearch),
            3 => Ok(Self::FinalSynthesis),
            _ => Err(CoreError::Validation(format!(
                "Invalid step number {n}. Must be between {MIN_STEP} and {MAX_STEP}"
            ))),
        }
    }

    /// Convert to a 1-based step number.
    pub fn to_number(self) -> u8 {
        match self {
            Self::PersonalFoundation => 1,
            Self::MarketResearch => 2,
            Self::FinalSynthesis => 3,
        }
    }

    /// Human-readable label for the step.
    pub fn label(self) -> &'static str {
        match self {
            Self::PersonalFoundation => "Personal Foundation",
            Self::MarketResearch => "Market Research",
            Self::FinalSynthesis => "Final Synthesis",
        }
    }
}

/// Progress percentage for a current step: `step / 3 * 100`.
pub fn completion_percentage(current_step: u8) -> f64 {
    f64::from(current_step) / f64::from(TOTAL_STEPS) * 100.0
}

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

/// Where a session sits in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizStage {
    Created,
    Step1Done,
    Step2Done,
    Completed,
}

impl QuizStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Step1Done => "step1_done",
            Self::Step2Done => "step2_done",
            Self::Completed => "completed",
        }
    }
}

/// A completed-step marker. A step number appears at most once per session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedStep {
    pub step: u8,
    pub completed_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Mutable progress fields of a quiz session.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizProgress {
    pub current_step: u8,
    pub completed_steps: Vec<CompletedStep>,
    pub is_completed: bool,
    pub completed_at: Option<Timestamp>,
}

impl Default for QuizProgress {
    fn default() -> Self {
        Self {
            current_step: MIN_STEP,
            completed_steps: Vec::new(),
            is_completed: false,
            completed_at: None,
        }
    }
}

impl QuizProgress {
    pub fn completion_percentage(&self) -> f64 {
        completion_percentage(self.current_step)
    }

    pub fn has_completed(&self, step: QuizStep) -> bool {
        let n = step.to_number();
        self.completed_steps.iter().any(|c| c.step == n)
    }

    /// Step numbers completed so far, in completion order.
    pub fn completed_step_numbers(&self) -> Vec<u8> {
        self.completed_steps.iter().map(|c| c.step).collect()
    }

    /// Record step 1 answers being saved.
    pub fn record_step1(&mut self, now: Timestamp) {
        self.advance_to(QuizStep::MarketResearch.to_number());
        self.mark_completed(QuizStep::PersonalFoundation, now);
    }

    /// Record step 2 answers being saved. Fails without mutation when step 1
    /// has no answers yet.
    pub fn record_step2(&mut self, has_step1: bool, now: Timestamp) -> Result<(), CoreError> {
        ensure_ready_for_step2(has_step1)?;
        self.advance_to(QuizStep::FinalSynthesis.to_number());
        self.mark_completed(QuizStep::MarketResearch, now);
        Ok(())
    }

    /// Record a successful final report.
    pub fn record_final(&mut self, now: Timestamp) {
        self.advance_to(MAX_STEP);
        self.mark_completed(QuizStep::FinalSynthesis, now);
        if !self.is_completed {
            self.is_completed = true;
            self.completed_at = Some(now);
        }
    }

    /// Fold in progress saved by another writer. The result is at least as far
    /// along as either side; markers already held keep their timestamps.
    pub fn merge(&mut self, other: &QuizProgress) {
        self.advance_to(other.current_step);
        for marker in &other.completed_steps {
            if !self.completed_steps.iter().any(|c| c.step == marker.step) {
                self.completed_steps.push(marker.clone());
            }
        }
        if other.is_completed && !self.is_completed {
            self.is_completed = true;
            self.completed_at = other.completed_at;
        }
    }

    /// Insert a completed-step marker unless one exists. Returns whether a
    /// marker was added.
    pub fn mark_completed(&mut self, step: QuizStep, now: Timestamp) -> bool {
        if self.has_completed(step) {
            return false;
        }
        self.completed_steps.push(CompletedStep {
            step: step.to_number(),
            completed_at: now,
        });
        true
    }

    fn advance_to(&mut self, step: u8) {
        self.current_step = self.current_step.max(step).min(MAX_STEP);
    }
}

/// Derive the lifecycle stage from answer presence and completion.
pub fn stage(has_step1: bool, has_step2: bool, is_completed: bool) -> QuizStage {
    match (has_step1, has_step2, is_completed) {
        (_, _, true) => QuizStage::Completed,
        (true, true, false) => QuizStage::Step2Done,
        (true, false, false) => QuizStage::Step1Done,
        _ => QuizStage::Created,
    }
}

// ---------------------------------------------------------------------------
// Guards
// ---------------------------------------------------------------------------

/// Step 2 may only be submitted once step 1 answers exist.
pub fn ensure_ready_for_step2(has_step1: bool) -> Result<(), CoreError> {
    if !has_step1 {
        return Err(CoreError::Precondition(
            "Step 1 must be completed first".to_string(),
        ));
    }
    Ok(())
}

/// The final report needs both answer sets.
pub fn ensure_ready_for_final(has_step1: bool, has_step2: bool) -> Result<(), CoreError> {
    if !has_step1 || !has_step2 {
        return Err(CoreError::Precondition(
            "Both step 1 and step 2 must be completed before generating final results"
                .to_string(),
        ));
    }
    Ok(())
}
