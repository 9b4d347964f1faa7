// confkeeper-engine/src/error.rs
// ============================================================================
// Module: Engine Errors
// Description: Error taxonomy for registration and reload passes.
// Purpose: Distinguish schema faults, property faults, and I/O faults.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Three failure classes exist. Schema errors are raised while registering a
//! schema and are fatal to that registration. Property errors wrap a failure
//! attributed to one property during a reload pass with the property's fully
//! qualified path; they propagate to the reload caller. I/O errors cover
//! directory creation and file writes; parse failures never appear here
//! because the engine recovers from them internally by starting empty.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Display;

use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised by the configuration engine.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Malformed schema detected at registration.
    #[error("invalid schema: {0}")]
    Schema(String),
    /// Failure attributed to one property during a reload pass.
    #[error("error for configuration property {path}: {message}")]
    Property {
        /// Fully qualified path of the failing property.
        path: String,
        /// Underlying failure description.
        message: String,
    },
    /// Fatal filesystem failure.
    #[error("config io error: {0}")]
    Io(String),
}

impl ConfigError {
    /// Wraps a failure with the fully qualified path of the property it
    /// occurred in.
    #[must_use]
    pub fn property(path: impl Display, cause: impl Display) -> Self {
        Self::Property {
            path: path.to_string(),
            message: cause.to_string(),
        }
    }
}
