//! # Diagsmith: bounded diagnostic dialogue with retrieval-grounded answers
//!
//! Diagsmith runs a bounded multi-turn conversation that elicits symptoms
//! about a piece of equipment, then answers a final query by retrieving
//! passages from the matching reference manual and handing them, with a
//! conversation summary, to a text-generation collaborator.
//!
//! ```text
//! SessionStore ──► Session (AwaitingProfile ► Ready ► Questioning ► Finalizing ► Done)
//!                     │  ask_next / submit_answer loop, cumulative instruction
//!                     ▼
//! DocumentResolver ──► ReferenceDocument ──► chunker ──► EmbeddingProvider
//!                                                 │              │
//!                                                 └─► VectorIndex ◄┘
//!                                                        │
//! transcript summary ──► Retriever::retrieve_top_k ──► context
//!                                                        │
//! GenerationGateway ◄── Context:\n{passages}\n\nQuery: {summary}
//! ```
//!
//! Vision captioning, generation backends, storage, and transport are
//! external collaborators behind the [`gateway::GenerationGateway`],
//! [`embeddings::EmbeddingProvider`], and [`document::DocumentResolver`]
//! traits; the crate ships deterministic mocks so the whole pipeline runs
//! in tests without any model.
//!
//! ## Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//! use diagsmith::config::EngineConfig;
//! use diagsmith::embeddings::MockEmbeddingProvider;
//! use diagsmith::engine::DiagnosticEngine;
//! # use diagsmith::document::DocumentResolver;
//! # use diagsmith::gateway::GenerationGateway;
//! # use diagsmith::types::DiagError;
//! # fn collaborators() -> (Arc<dyn GenerationGateway>, Arc<dyn DocumentResolver>) { unimplemented!() }
//!
//! # async fn run() -> Result<(), DiagError> {
//! let (gateway, resolver) = collaborators();
//! let engine = DiagnosticEngine::new(
//!     gateway,
//!     Arc::new(MockEmbeddingProvider::new()),
//!     resolver,
//!     EngineConfig::default(),
//! )?;
//!
//! let id = engine.start_session();
//! engine.submit_profile_field(&id, "equipmentType", "car").await?;
//! // ...remaining fields, then drive engine.chat(&id, answer) to Done.
//! # Ok(())
//! # }
//! ```
//!
//! ## Module guide
//!
//! - [`engine`] - the consolidated chat/finalize entry point
//! - [`dialogue`] - per-session stage machine and prompt construction
//! - [`session`] - session registry with per-session locking
//! - [`profile`] - the five required equipment fields and the document key
//! - [`chunker`] - deterministic word-window chunking
//! - [`index`] - flat squared-L2 vector index
//! - [`retriever`] - embed + search + context assembly over one document
//! - [`embeddings`], [`gateway`], [`document`] - collaborator seams
//! - [`message`], [`config`], [`types`] - transcript, configuration, errors

pub mod chunker;
pub mod config;
pub mod dialogue;
pub mod document;
pub mod embeddings;
pub mod engine;
pub mod gateway;
pub mod index;
pub mod message;
pub mod profile;
pub mod retriever;
pub mod session;
pub mod types;

pub use config::EngineConfig;
pub use engine::{DiagnosticEngine, TurnOutcome};
pub use session::{SessionId, SessionStore};
pub use types::DiagError;
