//! Offline generator returning canned text in the requested marker format.

use std::fmt::Write;

use async_trait::async_trait;
use brandquiz_core::generation::{GenerationPhase, ReportSection};
use brandquiz_core::prompts::{STRATEGY_TITLES, SUMMARY_TITLES};

use crate::error::GenerationError;
use crate::generator::{GenerationRequest, TextGenerator};

/// Model name stamped on fixture output.
pub const FIXTURE_MODEL: &str = "fixture";

/// Generator that never leaves the process.
#[derive(Debug, Default, Clone)]
pub struct FixtureGenerator;

impl FixtureGenerator {
    pub fn new() -> Self {
        Self
    }
}

fn marked_blocks(marker: &str, titles: &[&str; 3], subject: &str) -> String {
    let mut out = String::new();
    for (i, title) in titles.iter().enumerate() {
        let _ = writeln!(out, "{marker} {}: [{title}]", i + 1);
        let _ = writeln!(
            out,
            "- {subject} built around the {} angle.\n- Start with one flagship offer and a clear proof point.\n",
            title.to_lowercase()
        );
    }
    out
}

fn report() -> String {
    let mut out = String::new();
    for (i, section) in ReportSection::ALL.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, section.header());
        if section.is_list() {
            for n in 1..=3 {
                let _ = writeln!(out, "- Sample {} item {n}", section.header().to_lowercase());
            }
        } else {
            let _ = writeln!(out, "Sample content for the {} section.", section.header().to_lowercase());
        }
        out.push('\n');
    }
    out
}

#[async_trait]
impl TextGenerator for FixtureGenerator {
    fn model_name(&self) -> &str {
        FIXTURE_MODEL
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        Ok(match request.phase {
            GenerationPhase::Step1 => marked_blocks("SUMMARY", &SUMMARY_TITLES, "A personal brand"),
            GenerationPhase::Step2 => {
                marked_blocks("STRATEGY", &STRATEGY_TITLES, "A market strategy")
            }
            GenerationPhase::Final => report(),
        })
    }
}
