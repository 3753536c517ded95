use async_trait::async_trait;
use brandquiz_core::generation::GenerationPhase;

use crate::error::GenerationError;

/// One generation call: the phase parameters plus the rendered prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub phase: GenerationPhase,
    pub system: &'static str,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl GenerationRequest {
    /// Request with the fixed parameters and system instruction of `phase`.
    pub fn for_phase(phase: GenerationPhase, prompt: String) -> Self {
        Self {
            phase,
            system: phase.system_instruction(),
            prompt,
            temperature: phase.temperature(),
            max_tokens: phase.max_tokens(),
        }
    }
}

/// A text-generation backend.
///
/// Implementations make a single attempt per call; there is no retry.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Model identifier stamped onto generated artifacts.
    fn model_name(&self) -> &str;

    /// Generate text for a request. Empty output is an error.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}
