//! Retrieval over one reference document.
//!
//! A [`Retriever`] is built once per finalization: the document is chunked,
//! every chunk embedded, and a [`VectorIndex`] constructed over the
//! embeddings. Queries embed through the same provider and return chunks in
//! ascending distance order. Searching never mutates the retriever.

use std::sync::Arc;

use tracing::{debug, info};

use crate::chunker::{chunk_document, Chunk};
use crate::document::ReferenceDocument;
use crate::embeddings::EmbeddingProvider;
use crate::index::VectorIndex;
use crate::types::DiagError;

/// One retrieved passage with its distance to the query.
#[derive(Clone, Debug)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub distance: f32,
}

/// Embedder + index + chunks for a single document.
pub struct Retriever {
    provider: Arc<dyn EmbeddingProvider>,
    index: VectorIndex,
    chunks: Vec<Chunk>,
}

impl std::fmt::Debug for Retriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retriever")
            .field("provider", &self.provider.name())
            .field("index", &self.index)
            .field("chunks", &self.chunks)
            .finish()
    }
}

impl Retriever {
    /// Chunks, embeds, and indexes a document.
    ///
    /// The longest step of finalization; it holds no session state and is
    /// safe to run outside any session lock.
    pub async fn build(
        provider: Arc<dyn EmbeddingProvider>,
        doc: &ReferenceDocument,
        chunk_window: usize,
    ) -> Result<Self, DiagError> {
        let chunks = chunk_document(doc, chunk_window)?;
        let texts: Vec<String> = chunks.iter().map(|chunk| chunk.text.clone()).collect();
        let vectors = provider.embed_batch(&texts).await?;
        let index = VectorIndex::build(vectors)?;
        info!(
            source = %doc.source,
            chunks = chunks.len(),
            dimension = index.dimension(),
            embedder = provider.name(),
            "built retriever"
        );
        Ok(Self {
            provider,
            index,
            chunks,
        })
    }

    /// Number of indexed chunks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Embeds `query` and returns the `k` nearest chunks, closest first.
    pub async fn retrieve_top_k(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<ScoredChunk>, DiagError> {
        let query_vector = self.provider.embed(query).await?;
        let hits = self.index.search(&query_vector, k)?;
        debug!(hits = hits.len(), requested = k, "retrieval complete");
        Ok(hits
            .into_iter()
            .map(|hit| ScoredChunk {
                chunk: self.chunks[hit.position].clone(),
                distance: hit.distance,
            })
            .collect())
    }
}

/// Joins retrieved passages into a generation context, closest passage
/// first, separated by newlines.
#[must_use]
pub fn assemble_context(passages: &[ScoredChunk]) -> String {
    passages
        .iter()
        .map(|scored| scored.chunk.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
