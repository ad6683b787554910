//! Engine configuration.
//!
//! Defaults mirror the deployed constants: five question turns, 512-word
//! chunk windows, top-3 retrieval.

use crate::types::DiagError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Number of user answers collected before finalization. Zero is legal
    /// and finalizes over an empty transcript.
    pub max_turns: u32,
    /// Words per chunk window. Must be positive.
    pub chunk_window: usize,
    /// Passages retrieved for the final answer. Must be positive.
    pub top_k: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_turns: 5,
            chunk_window: 512,
            top_k: 3,
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    #[must_use]
    pub fn with_chunk_window(mut self, chunk_window: usize) -> Self {
        self.chunk_window = chunk_window;
        self
    }

    #[must_use]
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Rejects configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), DiagError> {
        if self.chunk_window == 0 {
            return Err(DiagError::InvalidConfig(
                "chunk_window must be a positive number of words".to_string(),
            ));
        }
        if self.top_k == 0 {
            return Err(DiagError::InvalidConfig(
                "top_k must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
