//! Text generation for the quiz.
//!
//! [`TextGenerator`] is the injected client seam. [`OpenAiClient`] talks to an
//! OpenAI-compatible chat-completions endpoint; [`FixtureGenerator`] returns
//! canned text for offline runs and tests. The [`pipeline`] functions run
//! prompt rendering, generation and parsing for each phase.

pub mod client;
pub mod config;
pub mod error;
pub mod fixture;
pub mod generator;
pub mod pipeline;

pub use client::OpenAiClient;
pub use config::{build_generator, LlmConfig, LlmProvider};
pub use error::GenerationError;
pub use fixture::FixtureGenerator;
pub use generator::{GenerationRequest, TextGenerator};
