//! Per-phase generation: render the prompt, call the generator, parse the
//! reply.
//!
//! Each function makes exactly one generator call. Parsing never fails, so
//! the only errors are the generator's own.

use brandquiz_core::answers::{Step1Answers, Step2Answers};
use brandquiz_core::generation::{FinalReport, GeneratedArtifact, ARTIFACTS_PER_STEP};
use brandquiz_core::parsing::{parse_final_report, parse_step_artifacts, StepArtifactKind};
use brandquiz_core::prompts::{build_prompt, PromptInput};
use chrono::Utc;

use crate::error::GenerationError;
use crate::generator::{GenerationRequest, TextGenerator};

async fn call(
    generator: &dyn TextGenerator,
    input: PromptInput<'_>,
) -> Result<String, GenerationError> {
    let phase = input.phase();
    let request = GenerationRequest::for_phase(phase, build_prompt(input));
    let started = std::time::Instant::now();

    match generator.generate(&request).await {
        Ok(text) => {
            tracing::info!(
                phase = phase.as_str(),
                model = generator.model_name(),
                chars = text.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Generation completed",
            );
            Ok(text)
        }
        Err(e) => {
            tracing::warn!(
                phase = phase.as_str(),
                model = generator.model_name(),
                error = %e,
                "Generation failed",
            );
            Err(e)
        }
    }
}

async fn step_artifacts(
    generator: &dyn TextGenerator,
    input: PromptInput<'_>,
) -> Result<Vec<GeneratedArtifact>, GenerationError> {
    let phase = input.phase();
    let text = call(generator, input).await?;
    let Some(kind) = StepArtifactKind::for_phase(phase) else {
        return Ok(Vec::new());
    };

    let artifacts = parse_step_artifacts(kind, &text, generator.model_name(), Utc::now());
    if artifacts.len() < ARTIFACTS_PER_STEP {
        tracing::warn!(
            phase = phase.as_str(),
            parsed = artifacts.len(),
            "Generated text had fewer artifacts than requested",
        );
    }
    Ok(artifacts)
}

/// Three personal brand profile summaries from the step 1 answers.
pub async fn generate_step1_results(
    generator: &dyn TextGenerator,
    step1: &Step1Answers,
) -> Result<Vec<GeneratedArtifact>, GenerationError> {
    step_artifacts(generator, PromptInput::Step1(step1)).await
}

/// Three market positioning strategies from both answer sets.
pub async fn generate_step2_results(
    generator: &dyn TextGenerator,
    step1: &Step1Answers,
    step2: &Step2Answers,
) -> Result<Vec<GeneratedArtifact>, GenerationError> {
    step_artifacts(generator, PromptInput::Step2(step1, step2)).await
}

/// The twelve-section final report.
pub async fn generate_final_report(
    generator: &dyn TextGenerator,
    step1: &Step1Answers,
    step2: &Step2Answers,
) -> Result<FinalReport, GenerationError> {
    let text = call(generator, PromptInput::Final(step1, step2)).await?;
    Ok(parse_final_report(&text, Utc::now()))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use brandquiz_core::generation::GenerationPhase;
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use brandquiz_core::answers::{
        validate_step1, validate_step2, Step1Submission, Step2Submission,
    };

    /// Records requests and replies with fixed text.
    struct Scripted {
        reply: Result<String, ()>,
        seen: Mutex<Vec<GenerationRequest>>,
    }

    impl Scripted {
        fn ok(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err(()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for Scripted {
        fn model_name(&self) -> &str {
            "scripted-model"
        }

        async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
            self.seen.lock().unwrap().push(request.clone());
            self.reply.clone().map_err(|_| GenerationError::EmptyContent)
        }
    }

    fn answers() -> (Step1Answers, Step2Answers) {
        let step1: Step1Submission = serde_json::from_value(serde_json::json!({
            "sessionId": "sess-1",
            "jobStatus": "Freelancer",
            "industryPreference": "Technology & IT",
            "experienceLevel": "5-10 years",
            "educationBackground": "Bachelor's Degree",
            "geographicLocation": "Europe",
            "cityMarketSize": "Mid-size City (100K-1M)",
            "timeAvailability": "10-20 hours",
            "budgetRange": "$150-500",
            "techComfort": "Tech Enthusiast - I learn eagerly",
            "supportSystem": "I have mentors or coaches",
            "coreSkills": [
                "Strategic Thinking",
                "Technical Understanding",
                "Communication & Presentation"
            ],
            "uniqueExperiences": "Built data platforms for three logistics startups across two continents.",
            "passionsInterests": "Teaching engineers to ship reliable systems.",
            "focusArea": "Technology & Innovation",
            "primaryGoals": ["Be recognized as an expert", "Build side income ($500-2000/month)"],
            "timeline": "Within 6 months",
            "biggestConcerns": "Finding time next to client work and standing out."
        }))
        .unwrap();
        let step2: Step2Submission = serde_json::from_value(serde_json::json!({
            "sessionId": "sess-1",
            "problemsToSolve": "Small logistics firms lose money on brittle, hand-maintained data pipelines.",
            "idealTargetGroup": "Operations leads at logistics companies with 20 to 200 employees in Europe.",
            "industryTrendsImpact": "Cheap sensors and AI forecasting raise the bar for data quality.",
            "uniqueAdvantages": "Hands-on platform experience in the same niche.",
            "marketChallenges": "Crowded consulting market and long sales cycles."
        }))
        .unwrap();
        (
            validate_step1(step1).unwrap().answers,
            validate_step2(step2).unwrap().answers,
        )
    }

    #[tokio::test]
    async fn step1_results_are_stamped_with_model_and_tag() {
        let generator = Scripted::ok(
            "Intro\nSUMMARY 1: [MARKET LEADER]\nA\nSUMMARY 2: [NICHE SPECIALIST]\nB\nSUMMARY 3: [HYBRID INNOVATOR]\nC",
        );
        let (step1, _) = answers();

        let artifacts = generate_step1_results(&generator, &step1).await.unwrap();
        assert_eq!(artifacts.len(), 3);
        assert_eq!(artifacts[1].title, "NICHE SPECIALIST");
        assert_eq!(artifacts[0].model_name, "scripted-model");
        assert_eq!(artifacts[2].prompt_tag, "step1_profile_analysis");

        let seen = generator.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].phase, GenerationPhase::Step1);
        assert_eq!(seen[0].max_tokens, 3000);
    }

    #[tokio::test]
    async fn step2_uses_step2_parameters() {
        let generator = Scripted::ok("STRATEGY 1: [A]\nx");
        let (step1, step2) = answers();

        let artifacts = generate_step2_results(&generator, &step1, &step2).await.unwrap();
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].prompt_tag, "step2_market_analysis");
        assert_eq!(generator.seen.lock().unwrap()[0].temperature, 0.7);
    }

    #[tokio::test]
    async fn unmarked_text_yields_no_artifacts() {
        let generator = Scripted::ok("I cannot help with that.");
        let (step1, _) = answers();
        assert!(generate_step1_results(&generator, &step1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn final_report_parses_sections() {
        let generator = Scripted::ok("1. UNIQUE BRAND POSITION STATEMENT\nYou help startups ship.\n");
        let (step1, step2) = answers();

        let report = generate_final_report(&generator, &step1, &step2).await.unwrap();
        assert_eq!(report.brand_position, "You help startups ship.");
        assert!(report.hero_slogans.is_empty());
    }

    #[tokio::test]
    async fn generator_errors_propagate() {
        let generator = Scripted::failing();
        let (step1, step2) = answers();
        assert_matches!(
            generate_final_report(&generator, &step1, &step2).await,
            Err(GenerationError::EmptyContent)
        );
    }
}
