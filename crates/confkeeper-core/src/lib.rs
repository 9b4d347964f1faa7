// confkeeper-core/src/lib.rs
// ============================================================================
// Module: Confkeeper Core Library
// Description: Value model, key paths, and the commented document tree.
// Purpose: Single source of truth for the types shared by engine and stores.
// Dependencies: indexmap, thiserror
// ============================================================================

//! ## Overview
//! `confkeeper-core` defines the building blocks of the configuration engine:
//! dotted key paths, the closed tagged value model with per-width numeric
//! clamping, the scalar/list bridge, the ordered commented document tree, and
//! the document store interface implemented by persistence backends.
//!
//! Security posture: persisted documents are untrusted input; every stored
//! value is re-validated before it reaches host code.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod bridge;
pub mod document;
pub mod key;
pub mod store;
pub mod value;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use bridge::Scalar;
pub use bridge::from_list;
pub use bridge::to_list;
pub use document::CommentedDocument;
pub use document::DocEntry;
pub use document::DocNode;
pub use document::DocValue;
pub use key::KeyPath;
pub use store::DocumentStore;
pub use store::StoreError;
pub use value::Value;
pub use value::ValueKind;
pub use value::ValueType;
