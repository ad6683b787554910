//! High-level engine: the one entry point transports talk to.
//!
//! The original deployment duplicated the chat/finalize logic across several
//! near-identical endpoints; here it is consolidated once. The engine owns
//! the [`SessionStore`] and the three collaborators, applies the per-session
//! locking policy, and exposes a transport-shaped surface: create a session,
//! feed profile fields, optionally attach an image caption, then drive the
//! question loop with [`DiagnosticEngine::chat`] until it yields the final
//! answer.
//!
//! Locking policy: every state-mutating operation runs under the session's
//! mutex. Finalization snapshots the transcript and document key under the
//! lock, releases it for the slow pipeline (summarization, chunking,
//! embedding, index build, retrieval, final generation), and re-acquires it
//! only to store the answer. A failed finalize leaves the session in
//! `Finalizing` and is safe to re-run from scratch.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::config::EngineConfig;
use crate::dialogue::{summary_prompt, Stage};
use crate::document::DocumentResolver;
use crate::embeddings::EmbeddingProvider;
use crate::gateway::{GenerationGateway, GenerationRequest};
use crate::message::Message;
use crate::profile::ProfileField;
use crate::retriever::{assemble_context, Retriever};
use crate::session::{SessionId, SessionStore};
use crate::types::DiagError;

/// What one chat call produced: either the next bot question or the final
/// diagnostic answer. Serialized as-is by transport layers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TurnOutcome {
    /// The next question to put to the user.
    Question {
        text: String,
        is_first_message: bool,
        interactions_remaining: u32,
    },
    /// The conversation is over and this is the diagnostic answer.
    Final { answer: String },
}

/// Diagnostic dialogue engine: session registry plus collaborators.
pub struct DiagnosticEngine {
    store: SessionStore,
    gateway: Arc<dyn GenerationGateway>,
    embedder: Arc<dyn EmbeddingProvider>,
    resolver: Arc<dyn DocumentResolver>,
    config: EngineConfig,
}

impl DiagnosticEngine {
    /// Builds an engine after validating the configuration.
    pub fn new(
        gateway: Arc<dyn GenerationGateway>,
        embedder: Arc<dyn EmbeddingProvider>,
        resolver: Arc<dyn DocumentResolver>,
        config: EngineConfig,
    ) -> Result<Self, DiagError> {
        config.validate()?;
        Ok(Self {
            store: SessionStore::new(),
            gateway,
            embedder,
            resolver,
            config,
        })
    }

    /// The session registry, for lifecycle management and inspection.
    #[must_use]
    pub fn sessions(&self) -> &SessionStore {
        &self.store
    }

    /// Starts a new session in `AwaitingProfile`.
    pub fn start_session(&self) -> SessionId {
        self.store.create(&self.config)
    }

    /// Evicts a session; absent identifiers are ignored.
    pub fn end_session(&self, id: &SessionId) {
        self.store.remove(id);
    }

    /// Submits one profile field by its wire name.
    pub async fn submit_profile_field(
        &self,
        id: &SessionId,
        field_name: &str,
        value: &str,
    ) -> Result<Stage, DiagError> {
        let field: ProfileField = field_name.parse()?;
        let handle = self.store.get(id)?;
        let mut session = handle.lock().await;
        session.submit_profile_field(field, value)
    }

    /// Attaches an image caption as auxiliary context, at most once.
    pub async fn attach_caption(&self, id: &SessionId, caption: &str) -> Result<(), DiagError> {
        let handle = self.store.get(id)?;
        let mut session = handle.lock().await;
        session.attach_context(caption)
    }

    /// Drives one turn of the dialogue.
    ///
    /// An empty `user_answer` is the signal to (re)issue the current
    /// question: the pending question is repeated verbatim, or the opening
    /// question is generated if none has been asked yet. A real answer
    /// consumes a turn and either produces the next question or, on the
    /// final turn, runs the full finalization pipeline.
    #[instrument(skip(self, user_answer), fields(session = %id))]
    pub async fn chat(&self, id: &SessionId, user_answer: &str) -> Result<TurnOutcome, DiagError> {
        let handle = self.store.get(id)?;

        {
            let mut session = handle.lock().await;
            if user_answer.trim().is_empty() {
                // Designed re-request signal: no turn consumed, no stage change.
                if let Some(pending) = session
                    .transcript()
                    .last()
                    .filter(|last| last.has_role(Message::BOT))
                {
                    return Ok(TurnOutcome::Question {
                        text: pending.content.clone(),
                        is_first_message: session.transcript().len() == 1,
                        interactions_remaining: session.interactions_remaining(),
                    });
                }
                // Reachable mid-conversation too, when a prior ask failed
                // after a recorded answer.
                let was_empty = session.transcript().is_empty();
                let text = session.ask_next(self.gateway.as_ref()).await?;
                return Ok(TurnOutcome::Question {
                    text,
                    is_first_message: was_empty,
                    interactions_remaining: session.interactions_remaining(),
                });
            }

            let stage = session.submit_answer(user_answer)?;
            if stage != Stage::Finalizing {
                let text = session.ask_next(self.gateway.as_ref()).await?;
                return Ok(TurnOutcome::Question {
                    text,
                    is_first_message: false,
                    interactions_remaining: session.interactions_remaining(),
                });
            }
            // Budget exhausted; fall through to finalize without the lock.
        }

        let answer = self.finalize(id).await?;
        Ok(TurnOutcome::Final { answer })
    }

    /// Runs the summarize/retrieve/answer pipeline for a `Finalizing`
    /// session and returns the stored answer.
    ///
    /// Retryable: a failure (most commonly [`DiagError::DocumentNotFound`])
    /// leaves the session in `Finalizing` with its transcript untouched, and
    /// a later call re-executes the pipeline from scratch.
    #[instrument(skip(self), fields(session = %id))]
    pub async fn finalize(&self, id: &SessionId) -> Result<String, DiagError> {
        let handle = self.store.get(id)?;

        // Snapshot what the pipeline needs, then release the session lock:
        // embedding and index build touch no session state.
        let (rendered, key) = {
            let session = handle.lock().await;
            if session.stage() != Stage::Finalizing {
                return Err(DiagError::InvalidStage {
                    op: "finalize",
                    stage: session.stage().to_string(),
                });
            }
            let key = session
                .profile()
                .ok_or(DiagError::InvalidStage {
                    op: "finalize",
                    stage: Stage::AwaitingProfile.as_str().to_string(),
                })?
                .document_key();
            (session.rendered_transcript(), key)
        };

        let summary = self
            .gateway
            .generate(GenerationRequest::new(summary_prompt(&rendered)))
            .await?;

        let doc = self
            .resolver
            .resolve(&key)
            .await?
            .ok_or_else(|| {
                warn!(key = %key, "no reference document; session stays finalizing");
                DiagError::DocumentNotFound { key: key.clone() }
            })?;

        let retriever = Retriever::build(self.embedder.clone(), &doc, self.config.chunk_window)
            .await?;
        let passages = retriever.retrieve_top_k(&summary, self.config.top_k).await?;
        let context = assemble_context(&passages);

        let answer = self
            .gateway
            .generate(GenerationRequest::new(summary).with_context(context))
            .await?;

        let mut session = handle.lock().await;
        session.record_final_answer(answer)?;
        info!(passages = passages.len(), "session finalized");
        // First stored answer wins if a concurrent finalize got there before us.
        Ok(session
            .final_answer()
            .map(str::to_string)
            .unwrap_or_default())
    }
}
