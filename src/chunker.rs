//! Deterministic word-window chunking of reference documents.
//!
//! Each page is split on whitespace and grouped into windows of exactly
//! `window` words; the final window of a page may be shorter. Joining the
//! chunk texts back with single spaces, in order, reproduces the document's
//! word sequence exactly (original inter-word spacing is not preserved, only
//! word order and membership).

use serde::{Deserialize, Serialize};

use crate::document::ReferenceDocument;
use crate::types::DiagError;

/// Document-relative position of a chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkLocator {
    /// Zero-based page index the window starts on.
    pub page: usize,
    /// Zero-based offset, in words, of the window within its page.
    pub word_offset: usize,
}

/// One retrieval unit: a bounded span of document text and where it came from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub locator: ChunkLocator,
}

impl Chunk {
    /// Number of words in this chunk.
    #[must_use]
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// Splits a document into fixed-size word windows.
///
/// Windows never cross a page boundary, so every chunk's locator points at a
/// single page. Fails with [`DiagError::InvalidConfig`] when `window` is
/// zero and [`DiagError::EmptyDocument`] when the document holds no words.
pub fn chunk_document(doc: &ReferenceDocument, window: usize) -> Result<Vec<Chunk>, DiagError> {
    if window == 0 {
        return Err(DiagError::InvalidConfig(
            "chunk window must be a positive number of words".to_string(),
        ));
    }

    let mut chunks = Vec::new();
    for (page, text) in doc.pages.iter().enumerate() {
        let words: Vec<&str> = text.split_whitespace().collect();
        for (slot, group) in words.chunks(window).enumerate() {
            chunks.push(Chunk {
                text: group.join(" "),
                locator: ChunkLocator {
                    page,
                    word_offset: slot * window,
                },
            });
        }
    }

    if chunks.is_empty() {
        return Err(DiagError::EmptyDocument);
    }
    Ok(chunks)
}

/// Splits a raw text blob into word windows, treating it as one page.
pub fn chunk_text(text: &str, window: usize) -> Result<Vec<Chunk>, DiagError> {
    chunk_document(&ReferenceDocument::from_text("inline", text), window)
}
