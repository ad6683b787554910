//! Embedding collaborator interface.
//!
//! The core only needs one thing from an embedding backend: map text to a
//! fixed-dimension vector, deterministically within a session. Real
//! deployments adapt an HTTP or in-process model behind this trait; the
//! [`MockEmbeddingProvider`] ships for tests and demos so the retrieval
//! pipeline can run without any model.

use async_trait::async_trait;

use crate::types::DiagError;

/// Maps text to fixed-dimension vectors.
///
/// Implementations must be deterministic for identical input within one
/// session. Failures surface as [`DiagError::Embedding`] and are not retried
/// by the core.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embeds a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DiagError>;

    /// Embeds several texts in input order.
    ///
    /// The default implementation loops over [`embed`](Self::embed); backends
    /// with a batch endpoint should override it.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, DiagError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }

    /// A short backend name for logging.
    fn name(&self) -> &'static str {
        "unnamed"
    }
}

/// Deterministic hash-derived embeddings for tests and demos.
///
/// Vectors are derived from word hashes folded into a fixed number of
/// buckets, so identical texts always embed identically and texts sharing
/// words land near each other. Not a semantic model; good enough to exercise
/// the chunk/index/retrieve pipeline end to end.
#[derive(Clone, Debug)]
pub struct MockEmbeddingProvider {
    dimension: usize,
}

impl MockEmbeddingProvider {
    pub const DEFAULT_DIMENSION: usize = 16;

    #[must_use]
    pub fn new() -> Self {
        Self::with_dimension(Self::DEFAULT_DIMENSION)
    }

    /// A zero dimension cannot hold any signal; it falls back to
    /// [`Self::DEFAULT_DIMENSION`].
    #[must_use]
    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            dimension: if dimension == 0 {
                Self::DEFAULT_DIMENSION
            } else {
                dimension
            },
        }
    }

    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn fold(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];
        for word in text.split_whitespace() {
            // FNV-1a over the lowercased word; stable across runs.
            let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
            for byte in word.to_lowercase().bytes() {
                hash ^= u64::from(byte);
                hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
            }
            let bucket = (hash % self.dimension as u64) as usize;
            vector[bucket] += 1.0;
        }
        vector
    }
}

impl Default for MockEmbeddingProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DiagError> {
        Ok(self.fold(text))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
