//! Quiz answer sets and their validation.
//!
//! Raw submissions arrive as loosely typed JSON ([`Step1Submission`],
//! [`Step2Submission`]). Validation is all-or-nothing: it either yields the
//! typed answer set ([`Step1Answers`], [`Step2Answers`]) or every field-level
//! problem found, sorted by field path.
//!
//! Length, count and presence rules are declared with `validator` derives;
//! option membership, duplicate selections and the `customFocus` rule are
//! checked by hand and merged into the same error list.

use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::error::{CoreError, FieldError};
use crate::options::{
    BudgetRange, CityMarketSize, CoreSkill, EducationBackground, ExperienceLevel, FocusArea,
    GeographicLocation, Industry, JobStatus, Labeled, PrimaryGoal, SupportSystem, TechComfort,
    TimeAvailability, Timeline,
};
use crate::progress::QuizStep;
use crate::types::SessionId;

/// Fallback text used in prompts for optional answers that were left blank.
pub const NOT_SPECIFIED: &str = "Not specified";

// ---------------------------------------------------------------------------
// Typed answer sets
// ---------------------------------------------------------------------------

/// Validated personal-foundation answers (quiz step 1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step1Answers {
    pub job_status: JobStatus,
    pub industry_preference: Industry,
    pub experience_level: ExperienceLevel,
    pub education_background: EducationBackground,
    pub geographic_location: GeographicLocation,
    pub city_market_size: CityMarketSize,
    pub time_availability: TimeAvailability,
    pub budget_range: BudgetRange,
    pub tech_comfort: TechComfort,
    pub support_system: SupportSystem,
    pub core_skills: Vec<CoreSkill>,
    pub unique_experiences: String,
    pub passions_interests: String,
    pub focus_area: FocusArea,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_focus: Option<String>,
    pub primary_goals: Vec<PrimaryGoal>,
    pub timeline: Timeline,
    pub biggest_concerns: String,
}

impl Step1Answers {
    /// Focus area label, with the custom focus appended in parentheses when
    /// one was given.
    pub fn focus_display(&self) -> String {
        match &self.custom_focus {
            Some(custom) => format!("{} ({custom})", self.focus_area),
            None => self.focus_area.to_string(),
        }
    }
}

/// Validated market-research answers (quiz step 2).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step2Answers {
    pub problems_to_solve: String,
    pub ideal_target_group: String,
    pub industry_trends_impact: String,
    pub unique_advantages: String,
    pub market_challenges: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regional_considerations: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub competitive_landscape: Option<String>,
}

impl Step2Answers {
    pub fn regional_considerations_or_default(&self) -> &str {
        self.regional_considerations.as_deref().unwrap_or(NOT_SPECIFIED)
    }

    pub fn competitive_landscape_or_default(&self) -> &str {
        self.competitive_landscape.as_deref().unwrap_or(NOT_SPECIFIED)
    }
}

/// A validated answer set together with the session it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct Validated<T> {
    pub session_id: SessionId,
    pub answers: T,
}

/// Either step's validated answers, as returned by [`validate_payload`].
#[derive(Debug, Clone, PartialEq)]
pub enum StepAnswers {
    Step1(Step1Answers),
    Step2(Step2Answers),
}

// ---------------------------------------------------------------------------
// Raw submissions
// ---------------------------------------------------------------------------

/// Step 1 payload as received from the client.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Step1Submission {
    #[validate(required(message = "sessionId is required"))]
    pub session_id: Option<String>,
    #[validate(required(message = "jobStatus is required"))]
    pub job_status: Option<String>,
    #[validate(required(message = "industryPreference is required"))]
    pub industry_preference: Option<String>,
    #[validate(required(message = "experienceLevel is required"))]
    pub experience_level: Option<String>,
    #[validate(required(message = "educationBackground is required"))]
    pub education_background: Option<String>,
    #[validate(required(message = "geographicLocation is required"))]
    pub geographic_location: Option<String>,
    #[validate(required(message = "cityMarketSize is required"))]
    pub city_market_size: Option<String>,
    #[validate(required(message = "timeAvailability is required"))]
    pub time_availability: Option<String>,
    #[validate(required(message = "budgetRange is required"))]
    pub budget_range: Option<String>,
    #[validate(required(message = "techComfort is required"))]
    pub tech_comfort: Option<String>,
    #[validate(required(message = "supportSystem is required"))]
    pub support_system: Option<String>,
    #[validate(
        required(message = "coreSkills is required"),
        length(min = 3, max = 5, message = "coreSkills must contain between 3 and 5 selections")
    )]
    pub core_skills: Option<Vec<String>>,
    #[validate(
        required(message = "uniqueExperiences is required"),
        length(min = 50, max = 1000, message = "uniqueExperiences must be between 50 and 1000 characters")
    )]
    pub unique_experiences: Option<String>,
    #[validate(
        required(message = "passionsInterests is required"),
        length(min = 30, max = 500, message = "passionsInterests must be between 30 and 500 characters")
    )]
    pub passions_interests: Option<String>,
    #[validate(required(message = "focusArea is required"))]
    pub focus_area: Option<String>,
    #[validate(length(max = 200, message = "customFocus must be at most 200 characters"))]
    pub custom_focus: Option<String>,
    #[validate(
        required(message = "primaryGoals is required"),
        length(min = 2, max = 3, message = "primaryGoals must contain between 2 and 3 selections")
    )]
    pub primary_goals: Option<Vec<String>>,
    #[validate(required(message = "timeline is required"))]
    pub timeline: Option<String>,
    #[validate(
        required(message = "biggestConcerns is required"),
        length(min = 30, max = 500, message = "biggestConcerns must be between 30 and 500 characters")
    )]
    pub biggest_concerns: Option<String>,
}

/// Step 2 payload as received from the client.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Step2Submission {
    #[validate(required(message = "sessionId is required"))]
    pub session_id: Option<String>,
    #[validate(
        required(message = "problemsToSolve is required"),
        length(min = 50, max = 1000, message = "problemsToSolve must be between 50 and 1000 characters")
    )]
    pub problems_to_solve: Option<String>,
    #[validate(
        required(message = "idealTargetGroup is required"),
        length(min = 60, max = 1000, message = "idealTargetGroup must be between 60 and 1000 characters")
    )]
    pub ideal_target_group: Option<String>,
    #[validate(
        required(message = "industryTrendsImpact is required"),
        length(min = 50, max = 1000, message = "industryTrendsImpact must be between 50 and 1000 characters")
    )]
    pub industry_trends_impact: Option<String>,
    #[validate(
        required(message = "uniqueAdvantages is required"),
        length(min = 40, max = 1000, message = "uniqueAdvantages must be between 40 and 1000 characters")
    )]
    pub unique_advantages: Option<String>,
    #[validate(
        required(message = "marketChallenges is required"),
        length(min = 30, max = 1000, message = "marketChallenges must be between 30 and 1000 characters")
    )]
    pub market_challenges: Option<String>,
    #[validate(length(max = 1000, message = "regionalConsiderations must be at most 1000 characters"))]
    pub regional_considerations: Option<String>,
    #[validate(length(max = 1000, message = "competitiveLandscape must be at most 1000 characters"))]
    pub competitive_landscape: Option<String>,
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Trim a free-text value; blank strings count as absent.
pub fn normalize_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn normalize_list(values: Option<Vec<String>>) -> Option<Vec<String>> {
    values.map(|list| list.into_iter().map(|v| v.trim().to_string()).collect())
}

impl Step1Submission {
    fn normalized(self) -> Self {
        Self {
            session_id: normalize_text(self.session_id),
            job_status: normalize_text(self.job_status),
            industry_preference: normalize_text(self.industry_preference),
            experience_level: normalize_text(self.experience_level),
            education_background: normalize_text(self.education_background),
            geographic_location: normalize_text(self.geographic_location),
            city_market_size: normalize_text(self.city_market_size),
            time_availability: normalize_text(self.time_availability),
            budget_range: normalize_text(self.budget_range),
            tech_comfort: normalize_text(self.tech_comfort),
            support_system: normalize_text(self.support_system),
            core_skills: normalize_list(self.core_skills),
            unique_experiences: normalize_text(self.unique_experiences),
            passions_interests: normalize_text(self.passions_interests),
            focus_area: normalize_text(self.focus_area),
            custom_focus: normalize_text(self.custom_focus),
            primary_goals: normalize_list(self.primary_goals),
            timeline: normalize_text(self.timeline),
            biggest_concerns: normalize_text(self.biggest_concerns),
        }
    }
}

impl Step2Submission {
    fn normalized(self) -> Self {
        Self {
            session_id: normalize_text(self.session_id),
            problems_to_solve: normalize_text(self.problems_to_solve),
            ideal_target_group: normalize_text(self.ideal_target_group),
            industry_trends_impact: normalize_text(self.industry_trends_impact),
            unique_advantages: normalize_text(self.unique_advantages),
            market_challenges: normalize_text(self.market_challenges),
            regional_considerations: normalize_text(self.regional_considerations),
            competitive_landscape: normalize_text(self.competitive_landscape),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a step 1 submission into typed answers.
pub fn validate_step1(submission: Step1Submission) -> Result<Validated<Step1Answers>, CoreError> {
    let s = submission.normalized();
    let mut errors = declared_errors(&s);

    let job_status = check_option::<JobStatus>("jobStatus", s.job_status.as_deref(), &mut errors);
    let industry_preference =
        check_option::<Industry>("industryPreference", s.industry_preference.as_deref(), &mut errors);
    let experience_level =
        check_option::<ExperienceLevel>("experienceLevel", s.experience_level.as_deref(), &mut errors);
    let education_background = check_option::<EducationBackground>(
        "educationBackground",
        s.education_background.as_deref(),
        &mut errors,
    );
    let geographic_location = check_option::<GeographicLocation>(
        "geographicLocation",
        s.geographic_location.as_deref(),
        &mut errors,
    );
    let city_market_size =
        check_option::<CityMarketSize>("cityMarketSize", s.city_market_size.as_deref(), &mut errors);
    let time_availability = check_option::<TimeAvailability>(
        "timeAvailability",
        s.time_availability.as_deref(),
        &mut errors,
    );
    let budget_range = check_option::<BudgetRange>("budgetRange", s.budget_range.as_deref(), &mut errors);
    let tech_comfort = check_option::<TechComfort>("techComfort", s.tech_comfort.as_deref(), &mut errors);
    let support_system =
        check_option::<SupportSystem>("supportSystem", s.support_system.as_deref(), &mut errors);
    let core_skills = check_selection::<CoreSkill>("coreSkills", s.core_skills.as_deref(), &mut errors);
    let focus_area = check_option::<FocusArea>("focusArea", s.focus_area.as_deref(), &mut errors);
    let primary_goals =
        check_selection::<PrimaryGoal>("primaryGoals", s.primary_goals.as_deref(), &mut errors);
    let timeline = check_option::<Timeline>("timeline", s.timeline.as_deref(), &mut errors);

    if focus_area == Some(FocusArea::Other) && s.custom_focus.is_none() {
        errors.push(FieldError::new(
            "customFocus",
            "customFocus is required when focusArea is \"Other\"",
        ));
    }

    let assembled = (|| {
        Some(Validated {
            session_id: s.session_id?,
            answers: Step1Answers {
                job_status: job_status?,
                industry_preference: industry_preference?,
                experience_level: experience_level?,
                education_background: education_background?,
                geographic_location: geographic_location?,
                city_market_size: city_market_size?,
                time_availability: time_availability?,
                budget_range: budget_range?,
                tech_comfort: tech_comfort?,
                support_system: support_system?,
                core_skills: core_skills?,
                unique_experiences: s.unique_experiences?,
                passions_interests: s.passions_interests?,
                focus_area: focus_area?,
                custom_focus: s.custom_focus,
                primary_goals: primary_goals?,
                timeline: timeline?,
                biggest_concerns: s.biggest_concerns?,
            },
        })
    })();

    finish(assembled, errors)
}

/// Validate a step 2 submission into typed answers.
pub fn validate_step2(submission: Step2Submission) -> Result<Validated<Step2Answers>, CoreError> {
    let s = submission.normalized();
    let errors = declared_errors(&s);

    let assembled = (|| {
        Some(Validated {
            session_id: s.session_id?,
            answers: Step2Answers {
                problems_to_solve: s.problems_to_solve?,
                ideal_target_group: s.ideal_target_group?,
                industry_trends_impact: s.industry_trends_impact?,
                unique_advantages: s.unique_advantages?,
                market_challenges: s.market_challenges?,
                regional_considerations: s.regional_considerations,
                competitive_landscape: s.competitive_landscape,
            },
        })
    })();

    finish(assembled, errors)
}

/// Validate a raw JSON payload for the given quiz step.
///
/// Type mismatches (a number where text is expected, etc.) are reported as a
/// field error on `body` rather than rejected by the extractor.
pub fn validate_payload(
    step: QuizStep,
    payload: serde_json::Value,
) -> Result<Validated<StepAnswers>, CoreError> {
    match step {
        QuizStep::PersonalFoundation => {
            let validated = validate_step1(decode_payload(payload)?)?;
            Ok(Validated {
                session_id: validated.session_id,
                answers: StepAnswers::Step1(validated.answers),
            })
        }
        QuizStep::MarketResearch => {
            let validated = validate_step2(decode_payload(payload)?)?;
            Ok(Validated {
                session_id: validated.session_id,
                answers: StepAnswers::Step2(validated.answers),
            })
        }
        QuizStep::FinalSynthesis => Err(CoreError::Validation(
            "Step 3 has no answers to submit".to_string(),
        )),
    }
}

/// Deserialize a raw JSON body, reporting shape errors as a `body` field error.
pub fn decode_payload<T: DeserializeOwned>(payload: serde_json::Value) -> Result<T, CoreError> {
    serde_json::from_value(payload).map_err(|e| {
        CoreError::InvalidFields(vec![FieldError::new("body", format!("Malformed payload: {e}"))])
    })
}

fn finish<T>(assembled: Option<T>, mut errors: Vec<FieldError>) -> Result<T, CoreError> {
    sort_errors(&mut errors);
    match assembled {
        Some(value) if errors.is_empty() => Ok(value),
        _ => Err(CoreError::InvalidFields(errors)),
    }
}

/// Run the derive-declared rules and flatten their errors.
pub fn declared_errors<T: Validate>(value: &T) -> Vec<FieldError> {
    let mut out = Vec::new();
    if let Err(errors) = value.validate() {
        flatten_validation_errors(&errors, "", &mut out);
    }
    out
}

/// Flatten `validator` errors into camelCase, dot-separated field paths.
pub fn flatten_validation_errors(errors: &ValidationErrors, prefix: &str, out: &mut Vec<FieldError>) {
    for (field, kind) in errors.errors() {
        let path = join_path(prefix, &snake_to_camel(&field.to_string()));
        match kind {
            ValidationErrorsKind::Field(items) => {
                for item in items {
                    let message = item
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{path} is invalid ({})", item.code));
                    out.push(FieldError::new(path.clone(), message));
                }
            }
            ValidationErrorsKind::Struct(inner) => flatten_validation_errors(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    flatten_validation_errors(inner, &format!("{path}[{index}]"), out);
                }
            }
        }
    }
}

/// Sort errors by field path, keeping per-field message order.
pub fn sort_errors(errors: &mut [FieldError]) {
    errors.sort_by(|a, b| a.field.cmp(&b.field));
}

fn join_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{prefix}.{field}")
    }
}

fn snake_to_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Check a single-choice value against its option set.
pub fn check_option<T: Labeled>(
    field: &str,
    value: Option<&str>,
    errors: &mut Vec<FieldError>,
) -> Option<T> {
    let raw = value?;
    let parsed = T::from_label(raw);
    if parsed.is_none() {
        errors.push(FieldError::new(
            field,
            format!("{field} must be one of the available {} options", T::KIND),
        ));
    }
    parsed
}

/// Check a multi-select against its option set; entries must be distinct.
///
/// Count bounds are declared on the submission struct.
fn check_selection<T: Labeled + Eq + std::hash::Hash>(
    field: &str,
    values: Option<&[String]>,
    errors: &mut Vec<FieldError>,
) -> Option<Vec<T>> {
    let values = values?;
    let mut parsed = Vec::with_capacity(values.len());
    let mut seen = HashSet::new();
    let mut valid = true;

    for raw in values {
        match T::from_label(raw) {
            Some(option) => {
                if !seen.insert(option) {
                    errors.push(FieldError::new(
                        field,
                        format!("{field} must not contain duplicate selections"),
                    ));
                    valid = false;
                }
                parsed.push(option);
            }
            None => {
                errors.push(FieldError::new(
                    field,
                    format!("{field} contains an unknown {} '{raw}'", T::KIND),
                ));
                valid = false;
            }
        }
    }

    valid.then_some(parsed)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
