// confkeeper-core/src/value.rs
// ============================================================================
// Module: Value Model
// Description: Closed tagged value model for configuration properties.
// Purpose: Give validation and conversion an exhaustive set of value shapes.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Configuration values are drawn from a closed set of kinds: boolean, the
//! four integer widths, the two float widths, strings, filesystem paths, and
//! enumerated constants, each also available in list form. [`ValueKind`] is
//! the tag, [`ValueType`] pairs a tag with its array flag, and [`Value`] is
//! the runtime sum. Numeric clamping preserves the declared width: an 8-bit
//! property can never produce a value outside the 8-bit range, regardless of
//! what a document stores.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::path::PathBuf;

// ============================================================================
// SECTION: Value Kinds
// ============================================================================

/// Tag identifying the scalar kind of a configuration value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Boolean flag.
    Bool,
    /// 8-bit signed integer.
    I8,
    /// 16-bit signed integer.
    I16,
    /// 32-bit signed integer.
    I32,
    /// 64-bit signed integer.
    I64,
    /// 32-bit float.
    F32,
    /// 64-bit float.
    F64,
    /// UTF-8 string.
    Str,
    /// Filesystem path, persisted in string form.
    Path,
    /// Enumerated constant, persisted as its constant name.
    Enum,
}

impl ValueKind {
    /// Returns whether the kind is numeric (integer or float).
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        self.is_integer() || self.is_float()
    }

    /// Returns whether the kind is an integer width.
    #[must_use]
    pub const fn is_integer(self) -> bool {
        matches!(self, Self::I8 | Self::I16 | Self::I32 | Self::I64)
    }

    /// Returns whether the kind is a float width.
    #[must_use]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    /// Returns the smallest value representable in this kind's width.
    ///
    /// Non-numeric kinds report the widest float range, matching the
    /// behavior of range resolution for properties without numeric bounds.
    #[must_use]
    pub const fn width_min(self) -> f64 {
        match self {
            Self::I8 => i8::MIN as f64,
            Self::I16 => i16::MIN as f64,
            Self::I32 => i32::MIN as f64,
            Self::I64 => i64::MIN as f64,
            Self::F32 => -f32::MAX as f64,
            Self::Bool | Self::F64 | Self::Str | Self::Path | Self::Enum => -f64::MAX,
        }
    }

    /// Returns the largest value representable in this kind's width.
    #[must_use]
    pub const fn width_max(self) -> f64 {
        match self {
            Self::I8 => i8::MAX as f64,
            Self::I16 => i16::MAX as f64,
            Self::I32 => i32::MAX as f64,
            Self::I64 => i64::MAX as f64,
            Self::F32 => f32::MAX as f64,
            Self::Bool | Self::F64 | Self::Str | Self::Path | Self::Enum => f64::MAX,
        }
    }

    /// Returns a stable label for diagnostics.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Str => "string",
            Self::Path => "path",
            Self::Enum => "enum",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// SECTION: Value Types
// ============================================================================

/// Declared type of a property: a scalar kind plus an array flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueType {
    /// Scalar kind of the value (or of each element, for arrays).
    pub kind: ValueKind,
    /// Whether the property holds a homogeneous list of the kind.
    pub array: bool,
}

impl ValueType {
    /// Declares a scalar type of the given kind.
    #[must_use]
    pub const fn scalar(kind: ValueKind) -> Self {
        Self { kind, array: false }
    }

    /// Declares a homogeneous list type of the given element kind.
    #[must_use]
    pub const fn list(kind: ValueKind) -> Self {
        Self { kind, array: true }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.array {
            write!(f, "[{}]", self.kind)
        } else {
            self.kind.fmt(f)
        }
    }
}

// ============================================================================
// SECTION: Values
// ============================================================================

/// A native configuration value.
///
/// # Invariants
/// - `List` contents are homogeneous; element kinds match the declared
///   [`ValueType`] of the owning property.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Boolean flag.
    Bool(bool),
    /// 8-bit signed integer.
    I8(i8),
    /// 16-bit signed integer.
    I16(i16),
    /// 32-bit signed integer.
    I32(i32),
    /// 64-bit signed integer.
    I64(i64),
    /// 32-bit float.
    F32(f32),
    /// 64-bit float.
    F64(f64),
    /// UTF-8 string.
    Str(String),
    /// Filesystem path.
    Path(PathBuf),
    /// Enumerated constant name.
    Enum(String),
    /// Homogeneous list of scalar values.
    List(Vec<Value>),
}

impl Value {
    /// Returns the scalar kind of this value, or `None` for lists.
    #[must_use]
    pub const fn scalar_kind(&self) -> Option<ValueKind> {
        match self {
            Self::Bool(_) => Some(ValueKind::Bool),
            Self::I8(_) => Some(ValueKind::I8),
            Self::I16(_) => Some(ValueKind::I16),
            Self::I32(_) => Some(ValueKind::I32),
            Self::I64(_) => Some(ValueKind::I64),
            Self::F32(_) => Some(ValueKind::F32),
            Self::F64(_) => Some(ValueKind::F64),
            Self::Str(_) => Some(ValueKind::Str),
            Self::Path(_) => Some(ValueKind::Path),
            Self::Enum(_) => Some(ValueKind::Enum),
            Self::List(_) => None,
        }
    }

    /// Returns whether the value is numeric.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::I8(_)
                | Self::I16(_)
                | Self::I32(_)
                | Self::I64(_)
                | Self::F32(_)
                | Self::F64(_)
        )
    }

    /// Returns the numeric value widened to `f64`, or `None` if non-numeric.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        reason = "Range comparison intentionally mirrors the f64 arithmetic of validation."
    )]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::I8(v) => Some(*v as f64),
            Self::I16(v) => Some(*v as f64),
            Self::I32(v) => Some(*v as f64),
            Self::I64(v) => Some(*v as f64),
            Self::F32(v) => Some(*v as f64),
            Self::F64(v) => Some(*v),
            Self::Bool(_) | Self::Str(_) | Self::Path(_) | Self::Enum(_) | Self::List(_) => None,
        }
    }

    /// Clamps a numeric value into `[min, max]`, preserving its width.
    ///
    /// Non-numeric values pass through untouched. Float `NaN` also passes
    /// through, matching comparison semantics: it is neither below `min` nor
    /// above `max`.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        reason = "Casts back into the declared width follow an explicit range check."
    )]
    pub fn clamped(self, min: f64, max: f64) -> Self {
        let Some(number) = self.as_f64() else {
            return self;
        };
        let bounded = bound(number, min, max);
        match self {
            Self::I8(_) => Self::I8(bounded as i8),
            Self::I16(_) => Self::I16(bounded as i16),
            Self::I32(_) => Self::I32(bounded as i32),
            Self::I64(_) => Self::I64(bounded as i64),
            Self::F32(_) => Self::F32(bounded as f32),
            Self::F64(_) => Self::F64(bounded),
            other => other,
        }
    }

    /// Builds an integer value of the given width from a raw document
    /// integer, clamping into the width instead of wrapping.
    ///
    /// Returns `None` when `kind` is not an integer width.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Each cast is preceded by a clamp into the target width's range."
    )]
    pub fn integer_of_width(kind: ValueKind, raw: i64) -> Option<Self> {
        match kind {
            ValueKind::I8 => Some(Self::I8(clamp_i64(raw, i64::from(i8::MIN), i64::from(i8::MAX)) as i8)),
            ValueKind::I16 => {
                Some(Self::I16(clamp_i64(raw, i64::from(i16::MIN), i64::from(i16::MAX)) as i16))
            }
            ValueKind::I32 => {
                Some(Self::I32(clamp_i64(raw, i64::from(i32::MIN), i64::from(i32::MAX)) as i32))
            }
            ValueKind::I64 => Some(Self::I64(raw)),
            ValueKind::Bool
            | ValueKind::F32
            | ValueKind::F64
            | ValueKind::Str
            | ValueKind::Path
            | ValueKind::Enum => None,
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Bounds a number into `[min, max]` with explicit comparisons so that `NaN`
/// is preserved rather than collapsed to a bound.
const fn bound(number: f64, min: f64, max: f64) -> f64 {
    if number < min {
        min
    } else if number > max {
        max
    } else {
        number
    }
}

/// Clamps a raw `i64` into an inclusive range.
const fn clamp_i64(raw: i64, min: i64, max: i64) -> i64 {
    if raw < min {
        min
    } else if raw > max {
        max
    } else {
        raw
    }
}
