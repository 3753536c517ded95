//! Usage analytics: date ranges, the completion funnel, the overview and
//! generation metrics.

use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Serialize;

use crate::error::CoreError;
use crate::generation::{AiResults, GenerationPhase, GenerationStatus, GenerationTracker};
use crate::types::Timestamp;

/// Number of industries listed in the overview.
pub const TOP_INDUSTRY_LIMIT: usize = 5;

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Whole-number percentage of `part` in `whole`; zero when `whole` is zero.
pub fn percent(part: u64, whole: u64) -> u32 {
    if whole == 0 {
        return 0;
    }
    (part as f64 / whole as f64 * 100.0).round() as u32
}

// ---------------------------------------------------------------------------
// Date ranges
// ---------------------------------------------------------------------------

/// Inclusive creation-time window; open on either side when unset.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DateRange {
    pub start: Option<Timestamp>,
    pub end: Option<Timestamp>,
}

impl DateRange {
    /// Parse query-string bounds. Accepts RFC 3339 timestamps or plain
    /// `YYYY-MM-DD` dates; a plain end date covers that whole day.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self, CoreError> {
        let start = start
            .filter(|s| !s.trim().is_empty())
            .map(|s| parse_bound("startDate", s, false))
            .transpose()?;
        let end = end
            .filter(|s| !s.trim().is_empty())
            .map(|s| parse_bound("endDate", s, true))
            .transpose()?;

        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(CoreError::Validation(
                    "startDate must not be after endDate".to_string(),
                ));
            }
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, at: Timestamp) -> bool {
        self.start.is_none_or(|s| at >= s) && self.end.is_none_or(|e| at <= e)
    }
}

fn parse_bound(field: &str, raw: &str, end_of_day: bool) -> Result<Timestamp, CoreError> {
    let raw = raw.trim();
    if let Ok(ts) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        CoreError::Validation(format!(
            "{field} must be an RFC 3339 timestamp or a YYYY-MM-DD date"
        ))
    })?;
    let time = if end_of_day {
        NaiveTime::from_hms_milli_opt(23, 59, 59, 999)
    } else {
        NaiveTime::from_hms_opt(0, 0, 0)
    }
    .ok_or_else(|| CoreError::Internal("invalid time of day".to_string()))?;
    Ok(Utc.from_utc_datetime(&date.and_time(time)))
}

// ---------------------------------------------------------------------------
// Funnel
// ---------------------------------------------------------------------------

/// Session counts at each point of the quiz.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FunnelCounts {
    pub started: u64,
    pub step1_completed: u64,
    pub step2_completed: u64,
    pub final_completed: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunnelStage {
    pub stage: &'static str,
    pub count: u64,
    /// Share of started sessions that reached this stage.
    pub percentage: u32,
    /// Sessions lost since the previous stage.
    pub drop_off: u64,
}

pub fn funnel(counts: FunnelCounts) -> Vec<FunnelStage> {
    let stages = [
        ("Started", counts.started),
        ("Step 1 Completed", counts.step1_completed),
        ("Step 2 Completed", counts.step2_completed),
        ("Final Results", counts.final_completed),
    ];

    let mut previous: Option<u64> = None;
    stages
        .into_iter()
        .map(|(stage, count)| {
            let drop_off = previous.map_or(0, |p| p.saturating_sub(count));
            previous = Some(count);
            FunnelStage {
                stage,
                count,
                percentage: percent(count, counts.started),
                drop_off,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Overview
// ---------------------------------------------------------------------------

/// Count and mean of stored star ratings.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RatingTotals {
    pub total: u64,
    pub average: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndustryCount {
    pub industry: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_quizzes: u64,
    pub completed_quizzes: u64,
    pub completion_rate: u32,
    pub total_ratings: u64,
    pub avg_rating: f64,
    pub top_industries: Vec<IndustryCount>,
}

/// Assemble the overview. Industries are ranked by count, then name.
pub fn overview(
    total_quizzes: u64,
    completed_quizzes: u64,
    ratings: RatingTotals,
    mut industries: Vec<IndustryCount>,
) -> Overview {
    industries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.industry.cmp(&b.industry)));
    industries.truncate(TOP_INDUSTRY_LIMIT);

    Overview {
        total_quizzes,
        completed_quizzes,
        completion_rate: percent(completed_quizzes, total_quizzes),
        total_ratings: ratings.total,
        avg_rating: round_to(ratings.average, 1),
        top_industries: industries,
    }
}

// ---------------------------------------------------------------------------
// Generation metrics
// ---------------------------------------------------------------------------

/// Raw generation counts for one phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseCounts {
    pub pending: u64,
    pub succeeded: u64,
    pub failed: u64,
    /// Artifacts currently stored; a final report counts as one.
    pub artifacts: u64,
}

/// Generation counts over a set of sessions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationCounts {
    pub sessions: u64,
    pub step1: PhaseCounts,
    pub step2: PhaseCounts,
    pub final_report: PhaseCounts,
}

impl GenerationCounts {
    pub fn phase(&self, phase: GenerationPhase) -> &PhaseCounts {
        match phase {
            GenerationPhase::Step1 => &self.step1,
            GenerationPhase::Step2 => &self.step2,
            GenerationPhase::Final => &self.final_report,
        }
    }

    fn phase_mut(&mut self, phase: GenerationPhase) -> &mut PhaseCounts {
        match phase {
            GenerationPhase::Step1 => &mut self.step1,
            GenerationPhase::Step2 => &mut self.step2,
            GenerationPhase::Final => &mut self.final_report,
        }
    }

    /// Count one session's generation state and stored results.
    pub fn add_session(&mut self, tracker: &GenerationTracker, results: &AiResults) {
        self.sessions += 1;
        for phase in GenerationPhase::ALL {
            let counts = self.phase_mut(phase);
            match tracker.get(phase).status {
                GenerationStatus::NotRequested => {}
                GenerationStatus::Pending => counts.pending += 1,
                GenerationStatus::Succeeded => counts.succeeded += 1,
                GenerationStatus::Failed => counts.failed += 1,
            }
            counts.artifacts += results.artifact_count(phase);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseMetrics {
    pub phase: GenerationPhase,
    /// Sessions where this phase was ever attempted.
    pub requested: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub pending: u64,
    /// Share of settled attempts that succeeded.
    pub success_rate: u32,
    pub artifacts: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationMetrics {
    pub sessions: u64,
    pub total_artifacts: u64,
    pub phases: Vec<PhaseMetrics>,
}

pub fn generation_metrics(counts: &GenerationCounts) -> GenerationMetrics {
    let phases: Vec<PhaseMetrics> = GenerationPhase::ALL
        .into_iter()
        .map(|phase| {
            let c = counts.phase(phase);
            PhaseMetrics {
                phase,
                requested: c.pending + c.succeeded + c.failed,
                succeeded: c.succeeded,
                failed: c.failed,
                pending: c.pending,
                success_rate: percent(c.succeeded, c.succeeded + c.failed),
                artifacts: c.artifacts,
            }
        })
        .collect();

    GenerationMetrics {
        sessions: counts.sessions,
        total_artifacts: phases.iter().map(|p| p.artifacts).sum(),
        phases,
    }
}
