// confkeeper-core/src/bridge.rs
// ============================================================================
// Module: Scalar/List Bridge
// Description: Conversion between typed vectors and boxed value lists.
// Purpose: Let hosts bind native Vec<T> storage to generic value lists.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Array-shaped properties flow through the engine as [`Value::List`], a
//! homogeneous sequence of boxed scalars. Host code holds typed vectors. The
//! [`Scalar`] trait and the [`to_list`]/[`from_list`] helpers bridge the two
//! representations for every supported scalar type, replacing the need for
//! any runtime type inspection: the set of bridgeable types is closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;

use crate::value::Value;
use crate::value::ValueKind;

// ============================================================================
// SECTION: Scalar Trait
// ============================================================================

/// A native scalar type bridgeable to and from the generic [`Value`] model.
pub trait Scalar: Sized {
    /// The value kind this scalar maps to.
    const KIND: ValueKind;

    /// Wraps the scalar in its [`Value`] form.
    fn into_value(self) -> Value;

    /// Unwraps a [`Value`] back into the scalar, or `None` on a kind
    /// mismatch.
    fn from_value(value: Value) -> Option<Self>;
}

impl Scalar for bool {
    const KIND: ValueKind = ValueKind::Bool;

    fn into_value(self) -> Value {
        Value::Bool(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Bool(v) => Some(v),
            _ => None,
        }
    }
}

impl Scalar for i8 {
    const KIND: ValueKind = ValueKind::I8;

    fn into_value(self) -> Value {
        Value::I8(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::I8(v) => Some(v),
            _ => None,
        }
    }
}

impl Scalar for i16 {
    const KIND: ValueKind = ValueKind::I16;

    fn into_value(self) -> Value {
        Value::I16(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::I16(v) => Some(v),
            _ => None,
        }
    }
}

impl Scalar for i32 {
    const KIND: ValueKind = ValueKind::I32;

    fn into_value(self) -> Value {
        Value::I32(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::I32(v) => Some(v),
            _ => None,
        }
    }
}

impl Scalar for i64 {
    const KIND: ValueKind = ValueKind::I64;

    fn into_value(self) -> Value {
        Value::I64(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::I64(v) => Some(v),
            _ => None,
        }
    }
}

impl Scalar for f32 {
    const KIND: ValueKind = ValueKind::F32;

    fn into_value(self) -> Value {
        Value::F32(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::F32(v) => Some(v),
            _ => None,
        }
    }
}

impl Scalar for f64 {
    const KIND: ValueKind = ValueKind::F64;

    fn into_value(self) -> Value {
        Value::F64(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::F64(v) => Some(v),
            _ => None,
        }
    }
}

impl Scalar for String {
    const KIND: ValueKind = ValueKind::Str;

    fn into_value(self) -> Value {
        Value::Str(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Str(v) => Some(v),
            _ => None,
        }
    }
}

impl Scalar for PathBuf {
    const KIND: ValueKind = ValueKind::Path;

    fn into_value(self) -> Value {
        Value::Path(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Path(v) => Some(v),
            _ => None,
        }
    }
}

// ============================================================================
// SECTION: List Conversion
// ============================================================================

/// Converts a typed vector into its boxed list form.
#[must_use]
pub fn to_list<T: Scalar>(items: Vec<T>) -> Value {
    Value::List(items.into_iter().map(Scalar::into_value).collect())
}

/// Converts a boxed list back into a typed vector.
///
/// Elements of a mismatched kind are dropped; a non-list value yields an
/// empty vector. Validation upstream keeps lists homogeneous, so drops only
/// occur for values that validation already rejected.
#[must_use]
pub fn from_list<T: Scalar>(value: Value) -> Vec<T> {
    match value {
        Value::List(items) => items.into_iter().filter_map(T::from_value).collect(),
        _ => Vec::new(),
    }
}
