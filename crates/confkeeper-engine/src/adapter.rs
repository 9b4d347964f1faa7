// confkeeper-engine/src/adapter.rs
// ============================================================================
// Module: Value Adapters
// Description: Conversion between native values and document values.
// Purpose: One strategy per declared value type, dispatched exhaustively.
// Dependencies: confkeeper-core
// ============================================================================

//! ## Overview
//! An [`Adapter`] converts between a property's native [`Value`] form and
//! the generic document representation, renders canonical display strings,
//! and reports shape capabilities. Dispatch is an exhaustive match over
//! [`ValueKind`], so every supported type has an adapter by construction;
//! the only unresolvable declarations are enum properties without constant
//! metadata, rejected when the property descriptor is built.
//!
//! Reads reinterpret raw document values into the declared kind: integers
//! narrow into their declared width without wrapping, paths are rebuilt from
//! string form with lexical normalization, and values of a foreign shape
//! read as absent, which validation then replaces with the default.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use confkeeper_core::CommentedDocument;
use confkeeper_core::DocValue;
use confkeeper_core::KeyPath;
use confkeeper_core::Value;
use confkeeper_core::ValueKind;
use confkeeper_core::ValueType;

// ============================================================================
// SECTION: Adapter Type
// ============================================================================

/// Conversion strategy for one declared value type.
#[derive(Debug, Clone, Copy)]
pub struct Adapter {
    /// Declared type this adapter serves.
    ty: ValueType,
}

impl Adapter {
    /// Resolves the adapter for a declared type.
    ///
    /// Resolution itself cannot fail: the type set is closed. Enum metadata
    /// requirements are enforced by the property descriptor.
    #[must_use]
    pub const fn resolve(ty: ValueType) -> Self {
        Self { ty }
    }

    /// Returns the declared type.
    #[must_use]
    pub const fn value_type(&self) -> ValueType {
        self.ty
    }

    /// Returns whether the adapter serves an array-shaped type.
    #[must_use]
    pub const fn is_array(&self) -> bool {
        self.ty.array
    }

    /// Returns whether a missing stored value is tolerable without falling
    /// back to the default. No built-in kind tolerates absence.
    #[must_use]
    pub const fn allows_absent(&self) -> bool {
        false
    }

    /// Reads the stored value at `path`, reinterpreted into the declared
    /// kind. Returns `None` when nothing usable is stored.
    ///
    /// The default is part of the read contract for adapters that derive
    /// their result from it; the built-in kinds leave it untouched.
    #[must_use]
    pub fn read(
        &self,
        document: &CommentedDocument,
        path: &KeyPath,
        _default: &Value,
    ) -> Option<Value> {
        let stored = document.get(path)?;
        if self.ty.array {
            let DocValue::List(items) = stored else {
                return None;
            };
            let values: Vec<Value> =
                items.iter().filter_map(|item| read_scalar(self.ty.kind, item)).collect();
            Some(Value::List(values))
        } else {
            read_scalar(self.ty.kind, stored)
        }
    }

    /// Stores a native value at `path` in its document representation.
    ///
    /// Values whose shape does not match the declared type are skipped; the
    /// typed binding constructors make that unrepresentable in practice.
    pub fn write(&self, document: &mut CommentedDocument, path: &KeyPath, value: &Value) {
        let rendered = if self.ty.array {
            let Value::List(items) = value else {
                return;
            };
            let rendered: Vec<DocValue> =
                items.iter().filter_map(|item| write_scalar(self.ty.kind, item)).collect();
            Some(DocValue::List(rendered))
        } else {
            write_scalar(self.ty.kind, value)
        };
        if let Some(rendered) = rendered {
            document.set(path, rendered);
        }
    }

    /// Renders the canonical display string for a value, used for comments
    /// and blacklist comparison. Lists render as `[a, b]`.
    #[must_use]
    pub fn display_string(&self, value: &Value) -> String {
        display_value(value)
    }

    /// Recomputes a default whose canonical identity stabilizes late.
    ///
    /// The built-in adapters resolve defaults eagerly, so this is identity;
    /// properties layer host-supplied refresh closures on top.
    #[must_use]
    pub fn refresh_default(&self, previous: Value) -> Value {
        previous
    }
}

// ============================================================================
// SECTION: Scalar Conversion
// ============================================================================

/// Reinterprets one stored scalar into the declared kind.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    reason = "Float-to-width casts saturate and validation clamps into declared bounds."
)]
fn read_scalar(kind: ValueKind, stored: &DocValue) -> Option<Value> {
    match kind {
        ValueKind::Bool => match stored {
            DocValue::Bool(v) => Some(Value::Bool(*v)),
            _ => None,
        },
        ValueKind::I8 | ValueKind::I16 | ValueKind::I32 | ValueKind::I64 => match stored {
            DocValue::Integer(raw) => Value::integer_of_width(kind, *raw),
            DocValue::Float(raw) => Value::integer_of_width(kind, raw.trunc() as i64),
            _ => None,
        },
        ValueKind::F32 => match stored {
            DocValue::Float(raw) => Some(Value::F32(*raw as f32)),
            DocValue::Integer(raw) => Some(Value::F32(*raw as f32)),
            _ => None,
        },
        ValueKind::F64 => match stored {
            DocValue::Float(raw) => Some(Value::F64(*raw)),
            DocValue::Integer(raw) => Some(Value::F64(*raw as f64)),
            _ => None,
        },
        ValueKind::Str => match stored {
            DocValue::Str(v) => Some(Value::Str(v.clone())),
            _ => None,
        },
        ValueKind::Path => match stored {
            DocValue::Str(v) => Some(Value::Path(normalize_path(Path::new(v)))),
            _ => None,
        },
        ValueKind::Enum => match stored {
            DocValue::Str(v) => Some(Value::Enum(v.clone())),
            _ => None,
        },
    }
}

/// Converts one native scalar into its document representation.
fn write_scalar(kind: ValueKind, value: &Value) -> Option<DocValue> {
    match (kind, value) {
        (ValueKind::Bool, Value::Bool(v)) => Some(DocValue::Bool(*v)),
        (ValueKind::I8, Value::I8(v)) => Some(DocValue::Integer(i64::from(*v))),
        (ValueKind::I16, Value::I16(v)) => Some(DocValue::Integer(i64::from(*v))),
        (ValueKind::I32, Value::I32(v)) => Some(DocValue::Integer(i64::from(*v))),
        (ValueKind::I64, Value::I64(v)) => Some(DocValue::Integer(*v)),
        (ValueKind::F32, Value::F32(v)) => Some(DocValue::Float(f64::from(*v))),
        (ValueKind::F64, Value::F64(v)) => Some(DocValue::Float(*v)),
        (ValueKind::Str, Value::Str(v)) => Some(DocValue::Str(v.clone())),
        (ValueKind::Path, Value::Path(v)) => Some(DocValue::Str(display_path(v))),
        (ValueKind::Enum, Value::Enum(v)) => Some(DocValue::Str(v.clone())),
        _ => None,
    }
}

/// Renders the canonical display string for any value.
fn display_value(value: &Value) -> String {
    match value {
        Value::Bool(v) => v.to_string(),
        Value::I8(v) => v.to_string(),
        Value::I16(v) => v.to_string(),
        Value::I32(v) => v.to_string(),
        Value::I64(v) => v.to_string(),
        Value::F32(v) => v.to_string(),
        Value::F64(v) => v.to_string(),
        Value::Str(v) => v.clone(),
        Value::Path(v) => display_path(v),
        Value::Enum(v) => v.clone(),
        Value::List(items) => {
            let rendered: Vec<String> = items.iter().map(display_value).collect();
            format!("[{}]", rendered.join(", "))
        }
    }
}

// ============================================================================
// SECTION: Path Helpers
// ============================================================================

/// Lexically normalizes a path: strips `.` components and resolves `..`
/// against preceding normal components. Leading `..` runs are kept; a `..`
/// directly under the root is dropped.
fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    let _ = normalized.pop();
                }
                Some(Component::RootDir) => {}
                _ => normalized.push(Component::ParentDir),
            },
            other => normalized.push(other),
        }
    }
    normalized
}

/// Renders a path with unix separators regardless of platform.
fn display_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
