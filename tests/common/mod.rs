//! Scripted collaborators shared across integration tests.
//!
//! The gateway replays queued replies (or deterministic fallbacks) and logs
//! every prompt it sees, so tests can assert on the exact wire contract. The
//! resolver serves documents from an in-memory map that tests may mutate
//! between finalize attempts.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;

use diagsmith::document::{DocumentResolver, ReferenceDocument};
use diagsmith::engine::DiagnosticEngine;
use diagsmith::gateway::{Conversation, GenerationGateway, GenerationRequest};
use diagsmith::embeddings::EmbeddingProvider;
use diagsmith::session::SessionId;
use diagsmith::types::DiagError;

pub const NEXON_KEY: &str = "Tata_Nexon_2020_petrol";

static TRACING: Once = Once::new();

/// Installs a fmt subscriber once per test binary so `RUST_LOG` controls
/// engine/retriever output during test runs.
pub fn init_tracing() {
    TRACING.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .init();
    });
}

#[derive(Default)]
struct GatewayState {
    replies: VecDeque<String>,
    generate_log: Vec<GenerationRequest>,
    send_log: Vec<String>,
    counter: usize,
    pending_send_failures: usize,
}

impl GatewayState {
    fn next_reply(&mut self) -> String {
        self.counter += 1;
        self.replies
            .pop_front()
            .unwrap_or_else(|| format!("reply-{}", self.counter))
    }
}

/// Generation gateway that replays scripted replies and records prompts.
#[derive(Clone, Default)]
pub struct ScriptedGateway {
    state: Arc<Mutex<GatewayState>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the next reply, used by both `generate` and conversation sends.
    pub fn push_reply(&self, text: &str) {
        self.state.lock().unwrap().replies.push_back(text.to_string());
    }

    /// Makes the next conversation send fail with a generation error.
    pub fn fail_next_send(&self) {
        self.state.lock().unwrap().pending_send_failures += 1;
    }

    /// All one-shot requests seen so far.
    pub fn generate_log(&self) -> Vec<GenerationRequest> {
        self.state.lock().unwrap().generate_log.clone()
    }

    /// All conversation prompts seen so far, in send order.
    pub fn send_log(&self) -> Vec<String> {
        self.state.lock().unwrap().send_log.clone()
    }
}

#[async_trait]
impl GenerationGateway for ScriptedGateway {
    async fn generate(&self, request: GenerationRequest) -> Result<String, DiagError> {
        let mut state = self.state.lock().unwrap();
        state.generate_log.push(request);
        Ok(state.next_reply())
    }

    fn start_conversation(&self) -> Box<dyn Conversation> {
        Box::new(ScriptedConversation {
            state: self.state.clone(),
        })
    }
}

struct ScriptedConversation {
    state: Arc<Mutex<GatewayState>>,
}

#[async_trait]
impl Conversation for ScriptedConversation {
    async fn send(&mut self, prompt: &str) -> Result<String, DiagError> {
        let mut state = self.state.lock().unwrap();
        if state.pending_send_failures > 0 {
            state.pending_send_failures -= 1;
            return Err(DiagError::Generation("scripted send failure".to_string()));
        }
        state.send_log.push(prompt.to_string());
        Ok(state.next_reply())
    }
}

/// Document resolver backed by a mutable in-memory map.
#[derive(Default)]
pub struct StaticResolver {
    docs: Mutex<HashMap<String, ReferenceDocument>>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_doc(key: &str, doc: ReferenceDocument) -> Self {
        let resolver = Self::new();
        resolver.insert(key, doc);
        resolver
    }

    pub fn insert(&self, key: &str, doc: ReferenceDocument) {
        self.docs.lock().unwrap().insert(key.to_string(), doc);
    }
}

#[async_trait]
impl DocumentResolver for StaticResolver {
    async fn resolve(&self, key: &str) -> Result<Option<ReferenceDocument>, DiagError> {
        Ok(self.docs.lock().unwrap().get(key).cloned())
    }
}

/// Embedding provider that always fails, for collaborator-failure paths.
pub struct FailingEmbedder;

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, DiagError> {
        Err(DiagError::Embedding("backend unavailable".to_string()))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// A small manual with distinct topics per page.
pub fn nexon_manual() -> ReferenceDocument {
    ReferenceDocument::new(
        "Tata_Nexon_2020_petrol_owners_manual.pdf",
        vec![
            "brake pads and discs wear gradually and grinding noise while braking \
             usually means the pads are fully worn and need replacement"
                .to_string(),
            "engine oil should be checked monthly and replaced at the scheduled \
             service interval to avoid premature engine wear"
                .to_string(),
            "coolant level must sit between the min and max marks on the reservoir \
             and should only be topped up with the specified coolant"
                .to_string(),
        ],
    )
}

/// Submits the five Scenario-A profile fields.
pub async fn fill_profile(engine: &DiagnosticEngine, id: &SessionId) {
    for (field, value) in [
        ("equipmentType", "car"),
        ("fuelType", "petrol"),
        ("brand", "Tata"),
        ("model", "Nexon"),
        ("year", "2020"),
    ] {
        engine
            .submit_profile_field(id, field, value)
            .await
            .expect("profile field should be accepted");
    }
}
