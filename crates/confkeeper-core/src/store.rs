// confkeeper-core/src/store.rs
// ============================================================================
// Module: Document Store Interface
// Description: Persistence contract for commented configuration documents.
// Purpose: Decouple the engine from the on-disk document format.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Persistence backends implement [`DocumentStore`]: load a file into a
//! [`CommentedDocument`] and save one back, prepending a schema header. The
//! contract distinguishes parse failures from I/O failures so that the
//! engine can treat a corrupt file as empty (recovering from defaults) while
//! surfacing genuine filesystem errors.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;

use thiserror::Error;

use crate::document::CommentedDocument;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised by document stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The file exists but its content is not a valid document.
    #[error("document parse error: {0}")]
    Parse(String),
    /// Filesystem failure while reading or writing.
    #[error("document io error: {0}")]
    Io(String),
}

impl StoreError {
    /// Returns whether this error is a parse failure (recoverable by
    /// treating the document as empty).
    #[must_use]
    pub const fn is_parse(&self) -> bool {
        matches!(self, Self::Parse(_))
    }
}

// ============================================================================
// SECTION: Store Contract
// ============================================================================

/// Persistence backend for commented configuration documents.
pub trait DocumentStore {
    /// Loads the document at `path`.
    ///
    /// A missing file yields an empty document; malformed content yields
    /// [`StoreError::Parse`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on parse or I/O failure.
    fn load(&self, path: &Path) -> Result<CommentedDocument, StoreError>;

    /// Saves `document` to `path`, writing `header` lines at the top of the
    /// file and each entry's attached comment immediately above it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] on filesystem failure.
    fn save(
        &self,
        path: &Path,
        document: &CommentedDocument,
        header: &[String],
    ) -> Result<(), StoreError>;
}
