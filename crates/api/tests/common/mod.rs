#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tokio::sync::Notify;
use tower::ServiceExt;

use brandquiz_api::config::{ServerConfig, StorageBackend};
use brandquiz_api::router::build_app_router;
use brandquiz_api::state::AppState;
use brandquiz_core::generation::GenerationPhase;
use brandquiz_db::store::{MemoryQuizStore, QuizStore};
use brandquiz_llm::{
    FixtureGenerator, GenerationError, GenerationRequest, LlmConfig, LlmProvider, TextGenerator,
};

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        storage: StorageBackend::Memory,
        database_url: None,
        database_max_connections: 1,
        llm: LlmConfig {
            provider: LlmProvider::Fixture,
            ..LlmConfig::default()
        },
    }
}

/// Build the full application router over a fresh in-memory store.
pub fn build_test_app(generator: Arc<dyn TextGenerator>) -> Router {
    build_test_app_with_store(Arc::new(MemoryQuizStore::new()), generator)
}

/// Build the full application router over the given store, using the same
/// middleware stack as `main.rs`.
pub fn build_test_app_with_store(
    store: Arc<dyn QuizStore>,
    generator: Arc<dyn TextGenerator>,
) -> Router {
    build_test_app_with_config(test_config(), store, generator)
}

pub fn build_test_app_with_config(
    config: ServerConfig,
    store: Arc<dyn QuizStore>,
    generator: Arc<dyn TextGenerator>,
) -> Router {
    let state = AppState {
        store,
        generator,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

/// Router backed by the canned fixture generator.
pub fn fixture_app() -> Router {
    build_test_app(Arc::new(FixtureGenerator::new()))
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// Fixture output for every phase except the ones switched to fail.
/// Records the phase of every call.
#[derive(Default)]
pub struct ScriptedGenerator {
    failing: Mutex<HashSet<GenerationPhase>>,
    calls: Mutex<Vec<GenerationPhase>>,
}

impl ScriptedGenerator {
    pub fn failing_on(phases: &[GenerationPhase]) -> Self {
        let generator = Self::default();
        for phase in phases {
            generator.set_failing(*phase, true);
        }
        generator
    }

    pub fn set_failing(&self, phase: GenerationPhase, failing: bool) {
        let mut set = self.failing.lock().unwrap();
        if failing {
            set.insert(phase);
        } else {
            set.remove(&phase);
        }
    }

    pub fn calls(&self) -> Vec<GenerationPhase> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    fn model_name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        self.calls.lock().unwrap().push(request.phase);
        if self.failing.lock().unwrap().contains(&request.phase) {
            return Err(GenerationError::Api {
                status: 503,
                body: "upstream overloaded".to_string(),
            });
        }
        FixtureGenerator::new().generate(request).await
    }
}

/// Fixture output, except that calls for the held phase wait for
/// `release` once `hold` is switched on. A call that is never released
/// never finishes.
pub struct GatedGenerator {
    phase: GenerationPhase,
    held: AtomicBool,
    entered: Notify,
    released: Notify,
}

impl GatedGenerator {
    pub fn new(phase: GenerationPhase) -> Self {
        Self {
            phase,
            held: AtomicBool::new(false),
            entered: Notify::new(),
            released: Notify::new(),
        }
    }

    pub fn hold(&self) {
        self.held.store(true, Ordering::SeqCst);
    }

    /// Wait until a held call has started.
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    pub fn release(&self) {
        self.released.notify_one();
    }
}

#[async_trait]
impl TextGenerator for GatedGenerator {
    fn model_name(&self) -> &str {
        "gated"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        if request.phase == self.phase && self.held.load(Ordering::SeqCst) {
            self.entered.notify_one();
            self.released.notified().await;
        }
        FixtureGenerator::new().generate(request).await
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

/// Read a response body as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Quiz fixtures
// ---------------------------------------------------------------------------

pub fn step1_payload(session_id: &str) -> Value {
    json!({
        "sessionId": session_id,
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
    })
}

pub fn step2_payload(session_id: &str) -> Value {
    json!({
        "sessionId": session_id,
        "problemsToSolve": "Small logistics firms lose money on brittle, hand-maintained data pipelines.",
        "idealTargetGroup": "Operations leads at logistics companies with 20 to 200 employees in Europe.",
        "industryTrendsImpact": "Cheap sensors and AI forecasting raise the bar for data quality.",
        "uniqueAdvantages": "Hands-on platform experience in the same niche.",
        "marketChallenges": "Crowded consulting market and long sales cycles."
    })
}

/// Start a session and return its id.
pub async fn start_session(app: &Router) -> String {
    let response = post_json(app, "/api/v1/quiz/start", json!({})).await;
    assert_eq!(response.status(), 201);
    let json = body_json(response).await;
    json["data"]["sessionId"].as_str().unwrap().to_string()
}

/// Start a session and submit both steps.
pub async fn session_with_both_steps(app: &Router) -> String {
    let session_id = start_session(app).await;
    let response = post_json(app, "/api/v1/quiz/step1", step1_payload(&session_id)).await;
    assert_eq!(response.status(), 200);
    let response = post_json(app, "/api/v1/quiz/step2", step2_payload(&session_id)).await;
    assert_eq!(response.status(), 200);
    session_id
}
