//! Text-generation collaborator interface.
//!
//! Two calling shapes, matching how the dialogue uses generation:
//!
//! * one-shot [`GenerationGateway::generate`] for summarization and the
//!   final answer, optionally carrying retrieved context;
//! * a stateful [`Conversation`] handle for the question loop. The engine
//!   still re-sends its whole running instruction on every turn rather than
//!   relying on the gateway to remember state; the handle exists so backends
//!   that do keep history accumulate it the same way on their side.

use async_trait::async_trait;

use crate::types::DiagError;

/// A one-shot generation request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub context: Option<String>,
}

impl GenerationRequest {
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            context: None,
        }
    }

    /// Attaches retrieved passages as context.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Flattens the request into a single prompt string, the wire form the
    /// original deployment sends: `Context:\n{context}\n\nQuery: {prompt}`.
    #[must_use]
    pub fn flatten(&self) -> String {
        match &self.context {
            Some(context) => format!("Context:\n{context}\n\nQuery: {}", self.prompt),
            None => self.prompt.clone(),
        }
    }
}

/// A stateful multi-turn generation conversation.
#[async_trait]
pub trait Conversation: Send {
    /// Sends a prompt and returns the generated reply.
    async fn send(&mut self, prompt: &str) -> Result<String, DiagError>;
}

/// Produces generated text from prompts.
///
/// Failures surface as [`DiagError::Generation`]; the core neither retries
/// them nor inspects them.
#[async_trait]
pub trait GenerationGateway: Send + Sync {
    /// One-shot generation.
    async fn generate(&self, request: GenerationRequest) -> Result<String, DiagError>;

    /// Opens a fresh conversation handle for a question loop.
    fn start_conversation(&self) -> Box<dyn Conversation>;
}
