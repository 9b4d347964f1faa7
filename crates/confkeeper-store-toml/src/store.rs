// confkeeper-store-toml/src/store.rs
// ============================================================================
// Module: TOML Document Store
// Description: Loads and saves commented documents as TOML files.
// Purpose: Deterministic, comment-carrying persistence for the engine.
// Dependencies: confkeeper-core, toml, tracing
// ============================================================================

//! ## Overview
//! Loading parses the file with the `toml` crate and rebuilds the document
//! tree; a missing file is an empty document and malformed content is a
//! [`StoreError::Parse`]. Comments present in a loaded file are not read
//! back: the engine strips and regenerates every comment on each write-back,
//! so persisted comments are output-only.
//!
//! Saving renders entries level by level, leaves before subsections as TOML
//! requires, with each entry's comment as `#` lines directly above it.
//! Header lines are written first; lines that do not already start with `#`
//! gain a `# ` prefix so the emitted file always re-parses.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use confkeeper_core::CommentedDocument;
use confkeeper_core::DocEntry;
use confkeeper_core::DocNode;
use confkeeper_core::DocValue;
use confkeeper_core::DocumentStore;
use confkeeper_core::StoreError;

// ============================================================================
// SECTION: Store Type
// ============================================================================

/// TOML-backed document store.
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlStore;

impl TomlStore {
    /// Creates a TOML store.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl DocumentStore for TomlStore {
    fn load(&self, path: &Path) -> Result<CommentedDocument, StoreError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "config file absent, starting empty");
                return Ok(CommentedDocument::new());
            }
            Err(err) => return Err(StoreError::Io(err.to_string())),
        };
        let table: toml::Table =
            toml::from_str(&content).map_err(|err| StoreError::Parse(err.to_string()))?;
        Ok(document_from_table(&table))
    }

    fn save(
        &self,
        path: &Path,
        document: &CommentedDocument,
        header: &[String],
    ) -> Result<(), StoreError> {
        let mut out = String::new();
        for line in header {
            if line.starts_with('#') {
                out.push_str(line);
            } else {
                out.push_str("# ");
                out.push_str(line);
            }
            out.push('\n');
        }
        render_level(&mut out, document, &[]);
        fs::write(path, out.as_bytes()).map_err(|err| StoreError::Io(err.to_string()))
    }
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

/// Rebuilds a document tree from a parsed TOML table.
fn document_from_table(table: &toml::Table) -> CommentedDocument {
    let mut document = CommentedDocument::new();
    for (name, value) in table {
        let node = match value {
            toml::Value::Table(nested) => DocNode::Section(document_from_table(nested)),
            other => match doc_value_from_toml(other) {
                Some(leaf) => DocNode::Leaf(leaf),
                None => continue,
            },
        };
        document.insert_entry(name.clone(), DocEntry::new(node));
    }
    document
}

/// Converts a scalar or array TOML value into a document value.
///
/// Tables inside arrays have no document counterpart and are dropped; the
/// engine's pruning removes such entries anyway since nothing declares them.
fn doc_value_from_toml(value: &toml::Value) -> Option<DocValue> {
    match value {
        toml::Value::Boolean(v) => Some(DocValue::Bool(*v)),
        toml::Value::Integer(v) => Some(DocValue::Integer(*v)),
        toml::Value::Float(v) => Some(DocValue::Float(*v)),
        toml::Value::String(v) => Some(DocValue::Str(v.clone())),
        toml::Value::Datetime(v) => Some(DocValue::Str(v.to_string())),
        toml::Value::Array(items) => Some(DocValue::List(
            items.iter().filter_map(doc_value_from_toml).collect(),
        )),
        toml::Value::Table(_) => None,
    }
}

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Renders one document level: leaves first, then subsections with full
/// dotted headers.
fn render_level(out: &mut String, document: &CommentedDocument, prefix: &[&str]) {
    for (name, entry) in document.entries() {
        if let DocNode::Leaf(value) = &entry.node {
            render_comment(out, entry.comment.as_deref());
            let _ = writeln!(out, "{} = {}", render_key(name), render_value(value));
        }
    }
    for (name, entry) in document.entries() {
        if let DocNode::Section(section) = &entry.node {
            out.push('\n');
            render_comment(out, entry.comment.as_deref());
            let mut segments: Vec<&str> = prefix.to_vec();
            segments.push(name);
            let rendered: Vec<String> = segments.iter().map(|part| render_key(part)).collect();
            let _ = writeln!(out, "[{}]", rendered.join("."));
            render_level(out, section, &segments);
        }
    }
}

/// Renders a comment block, one `#` line per comment line.
fn render_comment(out: &mut String, comment: Option<&str>) {
    if let Some(comment) = comment {
        for line in comment.split('\n') {
            out.push('#');
            out.push_str(line);
            out.push('\n');
        }
    }
}

/// Renders a key, bare when possible and quoted otherwise.
fn render_key(name: &str) -> String {
    let bare = !name.is_empty()
        && name.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-');
    if bare {
        name.to_string()
    } else {
        render_string(name)
    }
}

/// Renders a leaf value as an inline TOML value.
fn render_value(value: &DocValue) -> String {
    match value {
        DocValue::Bool(v) => v.to_string(),
        DocValue::Integer(v) => v.to_string(),
        DocValue::Float(v) => render_float(*v),
        DocValue::Str(v) => render_string(v),
        DocValue::List(items) => {
            let rendered: Vec<String> = items.iter().map(render_value).collect();
            format!("[{}]", rendered.join(", "))
        }
    }
}

/// Renders a float in a form TOML parses back as a float.
///
/// Integral values keep a trailing `.0`; non-finite values use the TOML
/// spellings `nan`, `inf`, and `-inf`.
fn render_float(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else if value.is_infinite() {
        if value.is_sign_positive() {
            "inf".to_string()
        } else {
            "-inf".to_string()
        }
    } else if value == value.trunc() {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// Renders a basic (double-quoted) TOML string with escaping.
fn render_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            ch if (ch as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04X}", ch as u32);
            }
            ch => out.push(ch),
        }
    }
    out.push('"');
    out
}
