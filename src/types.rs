//! Shared error taxonomy for the dialogue and retrieval pipeline.
//!
//! One enum covers both halves of the crate. Structural misuse
//! ([`DiagError::InvalidField`], [`DiagError::InvalidConfig`],
//! [`DiagError::InvalidStage`], [`DiagError::DimensionMismatch`]) propagates
//! immediately and is never retried. [`DiagError::DocumentNotFound`] is the
//! one expected terminal condition of finalization: the session stays in
//! `Finalizing` and the caller may retry. Collaborator failures
//! ([`DiagError::Embedding`], [`DiagError::Generation`]) are surfaced
//! untouched; retry policy belongs to the adapter, not the core.

use thiserror::Error;

/// Errors produced by the diagnostic dialogue engine.
#[derive(Debug, Error)]
pub enum DiagError {
    /// Profile field name is not one of the five required fields, or the
    /// field was already submitted.
    #[error("invalid profile field '{field}': {reason}")]
    InvalidField { field: String, reason: String },

    /// The user answer was empty or whitespace-only. This is the designed
    /// signal to re-request the current question, not a state advance.
    #[error("empty answer: the session state was not advanced")]
    EmptyAnswer,

    /// No live session exists under the given identifier.
    #[error("unknown session '{id}'")]
    UnknownSession { id: String },

    /// The operation is not legal in the session's current stage.
    #[error("operation '{op}' is not valid in stage {stage}")]
    InvalidStage { op: &'static str, stage: String },

    /// A bot question is already pending; an answer must arrive first.
    #[error("a question is already pending for this session")]
    QuestionPending,

    /// Auxiliary context (for example an image caption) may be attached at
    /// most once per session.
    #[error("auxiliary context has already been attached to this session")]
    ContextAlreadySet,

    /// The reference document contained no words.
    #[error("document has no words to chunk")]
    EmptyDocument,

    /// A configuration value failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The embedding collaborator failed.
    #[error("embedding failed: {0}")]
    Embedding(String),

    /// The text-generation collaborator failed.
    #[error("generation failed: {0}")]
    Generation(String),

    /// An index cannot be built from zero vectors.
    #[error("cannot build an index from zero vectors")]
    EmptyIndex,

    /// A vector's length disagrees with the index dimension.
    #[error("vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// No reference document exists for the session's profile key.
    /// Recoverable: the session remains finalizable.
    #[error("no reference document found for '{key}'")]
    DocumentNotFound { key: String },
}

impl DiagError {
    /// True for the one failure of `finalize` that callers are expected to
    /// report and retry rather than treat as a bug.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, DiagError::DocumentNotFound { .. })
    }
}
