//! Reference documents and their resolution.
//!
//! The core never touches storage: a [`DocumentResolver`] maps a profile's
//! document key (see [`EquipmentProfile::document_key`]) to the text of the
//! matching reference manual, or reports that none exists. How documents are
//! located (filesystem scan, object store, database) is the resolver's
//! concern.
//!
//! [`EquipmentProfile::document_key`]: crate::profile::EquipmentProfile::document_key

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::DiagError;

/// A reference document as an ordered sequence of page texts.
///
/// Page boundaries are preserved so retrieval results can point back at a
/// page. Single-blob sources can use [`ReferenceDocument::from_text`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceDocument {
    /// Where the document came from, for logging only.
    pub source: String,
    /// Page texts in document order.
    pub pages: Vec<String>,
}

impl ReferenceDocument {
    /// Builds a document from explicit pages.
    #[must_use]
    pub fn new(source: impl Into<String>, pages: Vec<String>) -> Self {
        Self {
            source: source.into(),
            pages,
        }
    }

    /// Builds a single-page document from one blob of text.
    #[must_use]
    pub fn from_text(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            pages: vec![text.into()],
        }
    }

    /// Total word count across all pages.
    #[must_use]
    pub fn word_count(&self) -> usize {
        self.pages
            .iter()
            .map(|page| page.split_whitespace().count())
            .sum()
    }
}

/// Maps a profile document key to its reference document.
///
/// `Ok(None)` means "no reference material for this equipment", which the
/// engine surfaces as [`DiagError::DocumentNotFound`]; `Err` is reserved for
/// storage faults.
#[async_trait]
pub trait DocumentResolver: Send + Sync {
    async fn resolve(&self, key: &str) -> Result<Option<ReferenceDocument>, DiagError>;
}
