//! Tolerant extraction of typed results from generated text.
//!
//! Parsing is anchor-based: numbered markers (`SUMMARY 2:`) for the step
//! artifacts and literal section headers for the final report. Text that does
//! not follow the requested shape degrades to fewer artifacts or empty
//! sections; it never fails.

use std::sync::LazyLock;

use regex::Regex;

use crate::generation::{
    FinalReport, GeneratedArtifact, GenerationPhase, ReportSection, ARTIFACTS_PER_STEP,
};
use crate::types::Timestamp;

static SUMMARY_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bSUMMARY\s+\d+\s*:").expect("valid regex"));

static STRATEGY_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bSTRATEGY\s+\d+\s*:").expect("valid regex"));

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\[\]\n]+)\]").expect("valid regex"));

static LEADING_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s*").expect("valid regex"));

/// A `N.` header number directly before an inline header.
static INLINE_HEADER_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+[ \t]*[.)][ \t]*[*_]*[ \t]*$").expect("valid regex"));

static LIST_ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[-•*]|\d+[.)])\s+(.+)$").expect("valid regex"));

/// Headers anchored at a line start, optionally preceded by markdown or a
/// `N.` number. Matched ASCII case-insensitively.
static SECTION_HEADER_RES: LazyLock<Vec<(ReportSection, Regex)>> = LazyLock::new(|| {
    ReportSection::ALL
        .iter()
        .map(|section| {
            let pattern = format!(
                r"(?im)^[ \t>#*_]*(?:\d+[ \t]*[.)][ \t]*)?[*_]*[ \t]*{}",
                regex::escape(section.header())
            );
            (*section, Regex::new(&pattern).expect("valid regex"))
        })
        .collect()
});

// ---------------------------------------------------------------------------
// Step artifacts
// ---------------------------------------------------------------------------

/// Which marker family a step-level response uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepArtifactKind {
    /// `SUMMARY n:` blocks from the step 1 profile analysis.
    ProfileSummary,
    /// `STRATEGY n:` blocks from the step 2 market analysis.
    MarketStrategy,
}

impl StepArtifactKind {
    /// The artifact kind a phase produces; the final phase produces a report.
    pub fn for_phase(phase: GenerationPhase) -> Option<Self> {
        match phase {
            GenerationPhase::Step1 => Some(Self::ProfileSummary),
            GenerationPhase::Step2 => Some(Self::MarketStrategy),
            GenerationPhase::Final => None,
        }
    }

    pub fn phase(self) -> GenerationPhase {
        match self {
            Self::ProfileSummary => GenerationPhase::Step1,
            Self::MarketStrategy => GenerationPhase::Step2,
        }
    }

    fn marker(self) -> &'static Regex {
        match self {
            Self::ProfileSummary => &*SUMMARY_MARKER_RE,
            Self::MarketStrategy => &*STRATEGY_MARKER_RE,
        }
    }

    fn fallback_title(self, n: usize) -> String {
        match self {
            Self::ProfileSummary => format!("Personal Brand Profile {n}"),
            Self::MarketStrategy => format!("Market Positioning Strategy {n}"),
        }
    }
}

/// Split a step-level response into at most three titled artifacts.
///
/// Text before the first marker is discarded, as are segments that are empty
/// once markdown emphasis is trimmed.
pub fn parse_step_artifacts(
    kind: StepArtifactKind,
    text: &str,
    model_name: &str,
    generated_at: Timestamp,
) -> Vec<GeneratedArtifact> {
    let marker = kind.marker();
    let starts: Vec<_> = marker.find_iter(text).map(|m| (m.start(), m.end())).collect();

    starts
        .iter()
        .enumerate()
        .filter_map(|(i, &(_, body_start))| {
            let body_end = starts.get(i + 1).map_or(text.len(), |&(next, _)| next);
            let segment = trim_markup(&text[body_start..body_end]);
            (!segment.is_empty()).then_some(segment)
        })
        .take(ARTIFACTS_PER_STEP)
        .enumerate()
        .map(|(i, segment)| GeneratedArtifact {
            title: segment_title(segment).unwrap_or_else(|| kind.fallback_title(i + 1)),
            content: segment.to_string(),
            generated_at,
            prompt_tag: kind.phase().prompt_tag().to_string(),
            model_name: model_name.to_string(),
        })
        .collect()
}

fn trim_markup(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_whitespace() || matches!(c, '*' | '_' | '#'))
}

/// Bracketed title on the segment's first line.
fn segment_title(segment: &str) -> Option<String> {
    let first_line = segment.lines().next()?;
    let title = TITLE_RE.captures(first_line)?.get(1)?.as_str().trim();
    (!title.is_empty()).then(|| title.to_string())
}

// ---------------------------------------------------------------------------
// Final report
// ---------------------------------------------------------------------------

/// Extract the twelve report sections. Missing sections come back empty.
pub fn parse_final_report(text: &str, generated_at: Timestamp) -> FinalReport {
    let located: Vec<(ReportSection, usize, usize)> = SECTION_HEADER_RES
        .iter()
        .filter_map(|(section, re)| {
            locate_header(text, *section, re).map(|(start, end)| (*section, start, end))
        })
        .collect();

    let section_text = |wanted: ReportSection| -> String {
        let Some(&(_, _, body_start)) = located.iter().find(|(s, _, _)| *s == wanted) else {
            return String::new();
        };
        let body_end = located
            .iter()
            .map(|&(_, start, _)| start)
            .filter(|&start| start >= body_start)
            .min()
            .unwrap_or(text.len());
        clean_section(&text[body_start..body_end], wanted.is_list())
    };

    FinalReport {
        brand_position: section_text(ReportSection::BrandPosition),
        strengths_matrix: section_text(ReportSection::StrengthsMatrix),
        hero_slogans: extract_list(&section_text(ReportSection::HeroSlogans)),
        key_differentiators: extract_list(&section_text(ReportSection::KeyDifferentiators)),
        brand_voice: section_text(ReportSection::BrandVoice),
        ideal_client_avatar: section_text(ReportSection::IdealClientAvatar),
        market_analysis: section_text(ReportSection::MarketAnalysis),
        competitive_mapping: section_text(ReportSection::CompetitiveMapping),
        launch_roadmap: section_text(ReportSection::LaunchRoadmap),
        premium_services: section_text(ReportSection::PremiumServices),
        success_indicators: extract_list(&section_text(ReportSection::SuccessIndicators)),
        business_model: section_text(ReportSection::BusinessModel),
        generated_at,
    }
}

/// Byte range of a section header: line-anchored first, then a plain
/// case-insensitive substring search for headers written inline.
fn locate_header(text: &str, section: ReportSection, anchored: &Regex) -> Option<(usize, usize)> {
    if let Some(m) = anchored.find(text) {
        return Some((m.start(), m.end()));
    }
    // ASCII uppercasing keeps byte offsets stable.
    let upper = text.to_ascii_uppercase();
    let header = section.header();
    let header_start = upper.find(header)?;
    // The header's own number belongs to the header, not the section before.
    let start = INLINE_HEADER_NUMBER_RE
        .find(&text[..header_start])
        .map_or(header_start, |number| number.start());
    Some((start, header_start + header.len()))
}

fn clean_section(raw: &str, is_list: bool) -> String {
    // The remainder of the header line only carries content when the model
    // wrote the section inline ("HEADER: text").
    let (header_rest, body) = raw.split_once('\n').unwrap_or((raw, ""));
    let header_rest =
        header_rest.trim_matches(|c: char| c.is_whitespace() || matches!(c, '*' | '_' | '#' | ':'));

    let joined = if header_rest.is_empty() {
        body.to_string()
    } else {
        format!("{header_rest}\n{body}")
    };

    let mut cleaned = joined
        .trim()
        .trim_end_matches(|c: char| c.is_whitespace() || matches!(c, '*' | '_' | '#'))
        .to_string();
    if !is_list {
        cleaned = LEADING_NUMBER_RE.replace(&cleaned, "").to_string();
    }
    cleaned
}

/// Split a block into list items.
///
/// Lines starting with `-`, `•`, `*` or `N.` followed by whitespace are kept
/// with the marker removed. A block with no such lines becomes a single item;
/// an empty block becomes an empty list.
pub fn extract_list(block: &str) -> Vec<String> {
    let block = block.trim();
    if block.is_empty() {
        return Vec::new();
    }

    let items: Vec<String> = block
        .lines()
        .filter_map(|line| {
            LIST_ITEM_RE
                .captures(line.trim())
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().trim().to_string())
        })
        .filter(|item| !item.is_empty())
        .collect();

    if items.is_empty() {
        vec![block.to_string()]
    } else {
        items
    }
}
