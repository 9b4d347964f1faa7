// confkeeper-store-toml/src/lib.rs
// ============================================================================
// Module: Confkeeper TOML Store
// Description: Commented TOML persistence for configuration documents.
// Purpose: Provide the on-disk document format used by the engine.
// Dependencies: confkeeper-core, toml
// ============================================================================

//! ## Overview
//! This crate implements [`DocumentStore`](confkeeper_core::DocumentStore)
//! over TOML files. Loads go through the `toml` parser so malformed content
//! is reported as a parse failure distinct from I/O errors; saves emit a
//! deterministic layout with every attached comment rendered as `#` lines
//! immediately above its entry and the schema header block at the top.
//!
//! Security posture: file contents are untrusted; the store never interprets
//! values beyond TOML syntax.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::TomlStore;
