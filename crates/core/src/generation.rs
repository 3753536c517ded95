//! Generation phases, their fixed parameters, and the artifacts they produce.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Phases
// ---------------------------------------------------------------------------

/// The three text-generation phases of a quiz session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationPhase {
    Step1,
    Step2,
    Final,
}

impl GenerationPhase {
    pub const ALL: [GenerationPhase; 3] = [Self::Step1, Self::Step2, Self::Final];

    /// Parse a phase name (`step1`, `step2`, `final`).
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "step1" => Ok(Self::Step1),
            "step2" => Ok(Self::Step2),
            "final" => Ok(Self::Final),
            _ => Err(CoreError::Validation(format!(
                "Invalid generation type '{s}'. Must be one of: step1, step2, final"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Step1 => "step1",
            Self::Step2 => "step2",
            Self::Final => "final",
        }
    }

    /// Sampling temperature sent with every call of this phase.
    pub fn temperature(self) -> f32 {
        match self {
            Self::Step1 | Self::Step2 => 0.7,
            Self::Final => 0.6,
        }
    }

    /// Output token ceiling for this phase.
    pub fn max_tokens(self) -> u32 {
        match self {
            Self::Step1 => 3000,
            Self::Step2 => 3500,
            Self::Final => 4000,
        }
    }

    /// Tag stamped onto artifacts produced by this phase.
    pub fn prompt_tag(self) -> &'static str {
        match self {
            Self::Step1 => "step1_profile_analysis",
            Self::Step2 => "step2_market_analysis",
            Self::Final => "final_report_synthesis",
        }
    }

    /// Fixed system instruction describing the persona and output shape.
    pub fn system_instruction(self) -> &'static str {
        match self {
            Self::Step1 => STEP1_SYSTEM,
            Self::Step2 => STEP2_SYSTEM,
            Self::Final => FINAL_SYSTEM,
        }
    }
}

const STEP1_SYSTEM: &str = "You are a world-class personal branding strategist with deep \
expertise in market research, regional business dynamics, and cultural considerations. You create \
comprehensive, actionable brand positioning strategies that are both globally relevant and locally \
optimized.

Your responses must be professional, insightful, and immediately actionable. Focus on practical \
strategies rather than generic advice. Always consider regional market dynamics, cultural factors, \
and local competition when making recommendations.

Generate exactly 3 distinct Personal Brand Profile Summaries, each focusing on different strategic \
angles based on the user's profile. Each summary should be comprehensive, unique, and provide a \
different pathway for brand development.";

const STEP2_SYSTEM: &str = "You are an expert market research analyst and business strategist with \
deep knowledge of global markets, regional business landscapes, and competitive intelligence. You \
specialize in identifying market opportunities, analyzing competitive landscapes, and developing \
go-to-market strategies that account for local market dynamics.

Your analysis must be data-driven, regionally informed, and strategically sound. Provide specific, \
actionable insights that demonstrate deep understanding of market dynamics, cultural factors, and \
regional business practices.

Generate exactly 3 distinct Market Positioning Strategies, each offering a different market approach \
and competitive positioning based on your comprehensive market analysis.";

const FINAL_SYSTEM: &str = "You are the world's leading personal branding and business strategy \
consultant, combining deep market research expertise with practical implementation experience. You \
create comprehensive brand positioning strategies that integrate personal strengths, market \
opportunities, and regional dynamics into actionable business plans.

Your final analysis must be thorough, professional, and immediately implementable. Provide specific, \
data-informed recommendations that account for regional market conditions, competitive landscapes, \
and cultural factors. Focus on creating a complete strategic framework that the user can implement \
systematically.

Generate a comprehensive final brand positioning report with all required sections, ensuring each \
element is specific, actionable, and tailored to the user's unique profile and market context.";

// ---------------------------------------------------------------------------
// Generation state
// ---------------------------------------------------------------------------

/// Outcome of the most recent generation attempt for a phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStatus {
    #[default]
    NotRequested,
    Pending,
    Succeeded,
    Failed,
}

impl GenerationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotRequested => "not_requested",
            Self::Pending => "pending",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

/// Per-phase generation record persisted with the session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationState {
    pub status: GenerationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempted_at: Option<Timestamp>,
}

impl GenerationState {
    pub fn pending(now: Timestamp) -> Self {
        Self {
            status: GenerationStatus::Pending,
            error: None,
            attempted_at: Some(now),
        }
    }

    pub fn succeeded(now: Timestamp) -> Self {
        Self {
            status: GenerationStatus::Succeeded,
            error: None,
            attempted_at: Some(now),
        }
    }

    pub fn failed(now: Timestamp, error: impl Into<String>) -> Self {
        Self {
            status: GenerationStatus::Failed,
            error: Some(error.into()),
            attempted_at: Some(now),
        }
    }
}

/// Generation state for all three phases.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationTracker {
    #[serde(default)]
    pub step1: GenerationState,
    #[serde(default)]
    pub step2: GenerationState,
    #[serde(default, rename = "final")]
    pub final_report: GenerationState,
}

impl GenerationTracker {
    pub fn get(&self, phase: GenerationPhase) -> &GenerationState {
        match phase {
            GenerationPhase::Step1 => &self.step1,
            GenerationPhase::Step2 => &self.step2,
            GenerationPhase::Final => &self.final_report,
        }
    }

    pub fn set(&mut self, phase: GenerationPhase, state: GenerationState) {
        match phase {
            GenerationPhase::Step1 => self.step1 = state,
            GenerationPhase::Step2 => self.step2 = state,
            GenerationPhase::Final => self.final_report = state,
        }
    }
}

// ---------------------------------------------------------------------------
// Artifacts
// ---------------------------------------------------------------------------

/// Number of artifacts requested from each step-level generation.
pub const ARTIFACTS_PER_STEP: usize = 3;

/// One titled block of generated text (a profile summary or a strategy).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedArtifact {
    pub title: String,
    pub content: String,
    pub generated_at: Timestamp,
    pub prompt_tag: String,
    pub model_name: String,
}

/// The twelve-section synthesis report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalReport {
    pub brand_position: String,
    pub strengths_matrix: String,
    pub hero_slogans: Vec<String>,
    pub key_differentiators: Vec<String>,
    pub brand_voice: String,
    pub ideal_client_avatar: String,
    pub market_analysis: String,
    pub competitive_mapping: String,
    pub launch_roadmap: String,
    pub premium_services: String,
    pub success_indicators: Vec<String>,
    pub business_model: String,
    pub generated_at: Timestamp,
}

/// Sections of the final report, in the order the prompt requests them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportSection {
    BrandPosition,
    StrengthsMatrix,
    HeroSlogans,
    KeyDifferentiators,
    BrandVoice,
    IdealClientAvatar,
    MarketAnalysis,
    CompetitiveMapping,
    LaunchRoadmap,
    PremiumServices,
    SuccessIndicators,
    BusinessModel,
}

impl ReportSection {
    pub const ALL: [ReportSection; 12] = [
        Self::BrandPosition,
        Self::StrengthsMatrix,
        Self::HeroSlogans,
        Self::KeyDifferentiators,
        Self::BrandVoice,
        Self::IdealClientAvatar,
        Self::MarketAnalysis,
        Self::CompetitiveMapping,
        Self::LaunchRoadmap,
        Self::PremiumServices,
        Self::SuccessIndicators,
        Self::BusinessModel,
    ];

    /// Literal header the model is asked to emit.
    pub fn header(self) -> &'static str {
        match self {
            Self::BrandPosition => "UNIQUE BRAND POSITION STATEMENT",
            Self::StrengthsMatrix => "CORE STRENGTHS MATRIX",
            Self::HeroSlogans => "HERO SLOGANS & TAGLINES",
            Self::KeyDifferentiators => "KEY DIFFERENTIATORS",
            Self::BrandVoice => "BRAND VOICE & MESSAGING",
            Self::IdealClientAvatar => "IDEAL CLIENT AVATAR",
            Self::MarketAnalysis => "REGIONAL MARKET ANALYSIS",
            Self::CompetitiveMapping => "COMPETITIVE LANDSCAPE MAPPING",
            Self::LaunchRoadmap => "90-DAY LAUNCH ROADMAP",
            Self::PremiumServices => "PREMIUM SERVICE OFFERINGS",
            Self::SuccessIndicators => "SUCCESS INDICATORS & KPIS",
            Self::BusinessModel => "REGIONAL BUSINESS MODEL RECOMMENDATIONS",
        }
    }

    /// What the section should contain, rendered under the header.
    pub fn instruction(self) -> &'static str {
        match self {
            Self::BrandPosition => {
                "Two or three sentences stating who you serve, the outcome you deliver and why you are the credible choice in this region."
            }
            Self::StrengthsMatrix => {
                "Map the core skills to market needs: for each strength, the client problem it solves and the proof that backs it."
            }
            Self::HeroSlogans => "A dash-bulleted list of five short slogans or taglines.",
            Self::KeyDifferentiators => {
                "A dash-bulleted list of four or five differentiators competitors cannot easily copy."
            }
            Self::BrandVoice => {
                "Tone, vocabulary and three example messages suited to the target audience and region."
            }
            Self::IdealClientAvatar => {
                "Demographics, role, pains, goals and buying triggers of the ideal client."
            }
            Self::MarketAnalysis => {
                "Demand, pricing levels and cultural factors in the stated region and city size."
            }
            Self::CompetitiveMapping => {
                "Main competitor types, their positioning, and the white space this brand can own."
            }
            Self::LaunchRoadmap => {
                "Concrete actions for days 1-30, 31-60 and 61-90 that fit the stated time and budget."
            }
            Self::PremiumServices => {
                "Three tiered offers with scope and indicative regional pricing."
            }
            Self::SuccessIndicators => {
                "A dash-bulleted list of measurable KPIs with 90-day targets."
            }
            Self::BusinessModel => {
                "Recommended revenue model and channels for the region, with the reasoning behind them."
            }
        }
    }

    /// Whether the parser should split this section into list items.
    pub fn is_list(self) -> bool {
        matches!(
            self,
            Self::HeroSlogans | Self::KeyDifferentiators | Self::SuccessIndicators
        )
    }
}

/// Generated results held by a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiResults {
    #[serde(default)]
    pub step1_results: Vec<GeneratedArtifact>,
    #[serde(default)]
    pub step2_results: Vec<GeneratedArtifact>,
    #[serde(default)]
    pub final_results: Option<FinalReport>,
}

impl AiResults {
    /// Replace the results of the phase that produced `output`.
    pub fn store(&mut self, output: &PhaseOutput) {
        match output {
            PhaseOutput::Step1(artifacts) => self.step1_results = artifacts.clone(),
            PhaseOutput::Step2(artifacts) => self.step2_results = artifacts.clone(),
            PhaseOutput::Final(report) => self.final_results = Some(report.clone()),
        }
    }

    /// Stored artifacts for a phase; the final phase counts its one report.
    pub fn artifact_count(&self, phase: GenerationPhase) -> u64 {
        match phase {
            GenerationPhase::Step1 => self.step1_results.len() as u64,
            GenerationPhase::Step2 => self.step2_results.len() as u64,
            GenerationPhase::Final => u64::from(self.final_results.is_some()),
        }
    }
}

/// What one successful generation produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PhaseOutput {
    Step1(Vec<GeneratedArtifact>),
    Step2(Vec<GeneratedArtifact>),
    Final(FinalReport),
}

impl PhaseOutput {
    pub fn phase(&self) -> GenerationPhase {
        match self {
            Self::Step1(_) => GenerationPhase::Step1,
            Self::Step2(_) => GenerationPhase::Step2,
            Self::Final(_) => GenerationPhase::Final,
        }
    }
}
