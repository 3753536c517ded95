//! Prompt rendering for the three generation phases.
//!
//! Pure functions from answers to prompt text. The marker lines requested
//! here (`SUMMARY n: [..]`, `STRATEGY n: [..]`, numbered report headers) are
//! the anchors [`crate::parsing`] extracts from.

use std::fmt::Write;

use crate::answers::{Step1Answers, Step2Answers};
use crate::generation::{GenerationPhase, ReportSection};
use crate::options::Labeled;

/// Titles requested for the three step 1 summaries.
pub const SUMMARY_TITLES: [&str; 3] = ["MARKET LEADER", "NICHE SPECIALIST", "HYBRID INNOVATOR"];

/// Titles requested for the three step 2 strategies.
pub const STRATEGY_TITLES: [&str; 3] = [
    "REGIONAL MARKET DOMINATION",
    "DIGITAL-FIRST GLOBAL REACH",
    "HYBRID LOCAL-GLOBAL APPROACH",
];

const SUMMARY_SUBSECTIONS: [[&str; 7]; 3] = [
    [
        "Brand archetype and positioning",
        "Unique value proposition",
        "Target audience definition",
        "Key differentiators",
        "Regional market context and opportunities",
        "Competitive advantages",
        "Implementation priority",
    ],
    [
        "Specialized positioning strategy",
        "Niche market identification",
        "Expert authority building",
        "Unique market angle",
        "Regional specialization opportunities",
        "Competitive differentiation",
        "Implementation roadmap",
    ],
    [
        "Multi-faceted positioning",
        "Cross-industry opportunities",
        "Innovation positioning",
        "Diverse market approach",
        "Regional adaptation strategies",
        "Unique market position",
        "Implementation strategy",
    ],
];

const STRATEGY_SUBSECTIONS: [[&str; 7]; 3] = [
    [
        "Regional market analysis and size",
        "Local competition assessment",
        "Cultural adaptation requirements",
        "Regional business model recommendations",
        "Local partnership opportunities",
        "Market entry timeline",
        "Revenue potential analysis",
    ],
    [
        "Digital market opportunities",
        "Online competition analysis",
        "Global vs local balance",
        "Platform-specific strategies",
        "International market considerations",
        "Scalability assessment",
        "Technology requirements",
    ],
    [
        "Multi-market positioning",
        "Local expertise with global reach",
        "Regional hub strategy",
        "Cross-market opportunities",
        "Cultural bridge positioning",
        "International expansion plan",
        "Competitive differentiation",
    ],
];

/// Answers a phase renders from.
#[derive(Debug, Clone, Copy)]
pub enum PromptInput<'a> {
    Step1(&'a Step1Answers),
    Step2(&'a Step1Answers, &'a Step2Answers),
    Final(&'a Step1Answers, &'a Step2Answers),
}

impl PromptInput<'_> {
    pub fn phase(&self) -> GenerationPhase {
        match self {
            Self::Step1(_) => GenerationPhase::Step1,
            Self::Step2(..) => GenerationPhase::Step2,
            Self::Final(..) => GenerationPhase::Final,
        }
    }
}

/// Render the prompt for a phase.
pub fn build_prompt(input: PromptInput<'_>) -> String {
    match input {
        PromptInput::Step1(step1) => step1_prompt(step1),
        PromptInput::Step2(step1, step2) => step2_prompt(step1, step2),
        PromptInput::Final(step1, step2) => final_prompt(step1, step2),
    }
}

fn join_labels<T: Labeled>(values: &[T]) -> String {
    values
        .iter()
        .map(|v| v.label())
        .collect::<Vec<_>>()
        .join(", ")
}

fn push_field(out: &mut String, label: &str, value: &str) {
    let _ = writeln!(out, "- {label}: {value}");
}

fn push_marker_instructions(
    out: &mut String,
    marker: &str,
    titles: &[&str; 3],
    subsections: &[[&str; 7]; 3],
    words: &str,
) {
    let _ = writeln!(
        out,
        "\nWrite exactly three alternatives. Start each one on its own line with its marker and bracketed title, exactly as shown, and cover the listed points:\n"
    );
    for (i, (title, points)) in titles.iter().zip(subsections).enumerate() {
        let _ = writeln!(out, "{marker} {}: [{title}]", i + 1);
        for point in points {
            let _ = writeln!(out, "- {point}");
        }
        out.push('\n');
    }
    let _ = writeln!(
        out,
        "Each one should be {words} words and give specific, actionable insights tailored to this profile and its regional market context."
    );
}

fn step1_prompt(a: &Step1Answers) -> String {
    let mut out = String::from(
        "Analyze this professional profile and propose three personal brand positions.\n\nPROFILE:\n",
    );
    push_field(&mut out, "Job status", a.job_status.label());
    push_field(&mut out, "Industry preference", a.industry_preference.label());
    push_field(&mut out, "Experience level", a.experience_level.label());
    push_field(&mut out, "Education", a.education_background.label());
    push_field(&mut out, "Geographic location", a.geographic_location.label());
    push_field(&mut out, "City market size", a.city_market_size.label());
    push_field(&mut out, "Weekly time available", a.time_availability.label());
    push_field(&mut out, "Monthly budget", a.budget_range.label());
    push_field(&mut out, "Tech comfort", a.tech_comfort.label());
    push_field(&mut out, "Support system", a.support_system.label());
    push_field(&mut out, "Core skills", &join_labels(&a.core_skills));
    push_field(&mut out, "Unique experiences", &a.unique_experiences);
    push_field(&mut out, "Passions and interests", &a.passions_interests);
    push_field(&mut out, "Focus area", &a.focus_display());
    push_field(&mut out, "Primary goals", &join_labels(&a.primary_goals));
    push_field(&mut out, "Timeline", a.timeline.label());
    push_field(&mut out, "Biggest concerns", &a.biggest_concerns);

    push_marker_instructions(&mut out, "SUMMARY", &SUMMARY_TITLES, &SUMMARY_SUBSECTIONS, "200-250");
    out
}

fn step2_prompt(a: &Step1Answers, m: &Step2Answers) -> String {
    let mut out = String::from(
        "Combine this profile with the market research below and propose three market positioning strategies.\n\nPROFILE:\n",
    );
    push_field(&mut out, "Industry", a.industry_preference.label());
    push_field(&mut out, "Experience level", a.experience_level.label());
    push_field(
        &mut out,
        "Location",
        &format!("{} ({})", a.geographic_location, a.city_market_size),
    );
    push_field(&mut out, "Focus area", &a.focus_display());
    push_field(&mut out, "Primary goals", &join_labels(&a.primary_goals));
    push_field(&mut out, "Monthly budget", a.budget_range.label());
    push_field(&mut out, "Timeline", a.timeline.label());

    out.push_str("\nMARKET RESEARCH:\n");
    push_field(&mut out, "Problems to solve", &m.problems_to_solve);
    push_field(&mut out, "Ideal target group", &m.ideal_target_group);
    push_field(&mut out, "Industry trends impact", &m.industry_trends_impact);
    push_field(&mut out, "Unique advantages", &m.unique_advantages);
    push_field(&mut out, "Market challenges", &m.market_challenges);
    push_field(
        &mut out,
        "Regional considerations",
        m.regional_considerations_or_default(),
    );
    push_field(
        &mut out,
        "Competitive landscape",
        m.competitive_landscape_or_default(),
    );

    push_marker_instructions(&mut out, "STRATEGY", &STRATEGY_TITLES, &STRATEGY_SUBSECTIONS, "250-300");
    out
}

fn final_prompt(a: &Step1Answers, m: &Step2Answers) -> String {
    let mut out = String::from(
        "Synthesize a complete brand positioning report for this professional.\n\nPROFILE:\n",
    );
    push_field(&mut out, "Job status", a.job_status.label());
    push_field(&mut out, "Industry", a.industry_preference.label());
    push_field(&mut out, "Experience level", a.experience_level.label());
    push_field(
        &mut out,
        "Location",
        &format!("{} ({})", a.geographic_location, a.city_market_size),
    );
    push_field(&mut out, "Core skills", &join_labels(&a.core_skills));
    push_field(&mut out, "Focus area", &a.focus_display());
    push_field(&mut out, "Primary goals", &join_labels(&a.primary_goals));
    push_field(&mut out, "Monthly budget", a.budget_range.label());
    push_field(&mut out, "Weekly time available", a.time_availability.label());
    push_field(&mut out, "Timeline", a.timeline.label());
    push_field(&mut out, "Unique experiences", &a.unique_experiences);

    out.push_str("\nMARKET:\n");
    push_field(&mut out, "Problems to solve", &m.problems_to_solve);
    push_field(&mut out, "Ideal target group", &m.ideal_target_group);
    push_field(&mut out, "Unique advantages", &m.unique_advantages);
    push_field(&mut out, "Market challenges", &m.market_challenges);
    push_field(
        &mut out,
        "Competitive landscape",
        m.competitive_landscape_or_default(),
    );

    out.push_str("\nUse these numbered section headers verbatim and in this order:\n\n");
    for (i, section) in ReportSection::ALL.iter().enumerate() {
        let _ = writeln!(out, "{}. {}\n{}\n", i + 1, section.header(), section.instruction());
    }
    out
}
