// confkeeper-engine/src/property.rs
// ============================================================================
// Module: Property Descriptor
// Description: Per-property validation, comment synthesis, and load/store.
// Purpose: Own the value pipeline between host storage and the document.
// Dependencies: confkeeper-core
// ============================================================================

//! ## Overview
//! A [`Property`] is built once at registration and fails fast on any
//! inconsistent declaration: missing enum metadata, an absent default,
//! conflicting restart/reload markers, a range that does not fit the
//! declared width, or a blacklisted default. At runtime it owns the full
//! pipeline: reads migrate legacy keys and self-heal the stored value
//! through validation, writes reattach the synthesized comment, and
//! validation clamps numerics into range without ever leaving the declared
//! width. Enumerated properties round-trip through constant names, matched
//! case-insensitively with underscores ignored.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;

use confkeeper_core::CommentedDocument;
use confkeeper_core::KeyPath;
use confkeeper_core::Value;
use confkeeper_core::ValueKind;

use crate::adapter::Adapter;
use crate::error::ConfigError;
use crate::schema::Binding;
use crate::schema::EnumSpec;
use crate::schema::PropertySpec;
use crate::schema::RefreshFn;

// ============================================================================
// SECTION: Property Type
// ============================================================================

/// Descriptor of one bound, validated, persisted configuration value.
pub struct Property {
    /// Entry name within the owning category.
    name: String,
    /// Fully qualified dotted path in the document.
    path: KeyPath,
    /// Localization key for host UIs.
    language_key: String,
    /// Legacy path consulted when the canonical path is absent.
    previous: Option<KeyPath>,
    /// Conversion strategy for the declared type.
    adapter: Adapter,
    /// Constant metadata for enumerated properties.
    enum_spec: Option<EnumSpec>,
    /// Whether an absent value must be replaced by the default.
    non_null: bool,
    /// Effective lower bound for numeric validation.
    min: f64,
    /// Effective upper bound for numeric validation.
    max: f64,
    /// Display strings the property must never take.
    blacklist: Vec<String>,
    /// Synthesized documentation comment.
    comment: String,
    /// Whether a change requires a host restart.
    requires_restart: bool,
    /// Whether a change requires a host reload.
    requires_reload: bool,
    /// Whether stored values are unsafe to coerce before finalization.
    late_bound: bool,
    /// Cached default, refreshable once for late-bound identities.
    default: Value,
    /// Getter/setter pair over host storage.
    binding: Binding,
    /// Host-supplied default refresh.
    refresh: Option<RefreshFn>,
}

impl std::fmt::Debug for Property {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Property")
            .field("path", &self.path)
            .field("ty", &self.adapter.value_type())
            .finish_non_exhaustive()
    }
}

impl Property {
    /// Builds the descriptor for one property declaration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Schema`] for every inconsistent declaration;
    /// see the module overview for the full list.
    pub(crate) fn build(
        category_path: &KeyPath,
        language_prefix: &str,
        spec: PropertySpec,
    ) -> Result<Self, ConfigError> {
        let PropertySpec {
            name,
            comment,
            binding,
            enum_spec,
            previous,
            non_null,
            int_range,
            float_range,
            blacklist,
            requires_restart,
            requires_reload,
            late_bound,
            refresh,
        } = spec;

        if name.trim().is_empty() || name.contains('.') {
            return Err(ConfigError::Schema(format!(
                "property name {name:?} must be non-empty and dot-free"
            )));
        }
        if comment.join("\n").trim().is_empty() {
            return Err(ConfigError::Schema(format!(
                "property {name} comment may not be empty"
            )));
        }

        let ty = binding.value_type();
        let adapter = Adapter::resolve(ty);

        let enum_spec = match (ty.kind, enum_spec) {
            (ValueKind::Enum, Some(spec)) if !spec.is_empty() => Some(spec),
            (ValueKind::Enum, _) => {
                return Err(ConfigError::Schema(format!(
                    "enumerated property {name} declares no constants"
                )));
            }
            (_, Some(_)) => {
                return Err(ConfigError::Schema(format!(
                    "property {name} declares enum constants for a non-enum type"
                )));
            }
            (_, None) => None,
        };

        let default = binding
            .read()
            .map_err(|err| ConfigError::Schema(format!("property {name} default read failed: {err}")))?;
        let Some(default) = default else {
            return Err(ConfigError::Schema(format!(
                "default value of configuration property {name} may not be absent"
            )));
        };

        if requires_restart && requires_reload {
            return Err(ConfigError::Schema(format!(
                "property {name} cannot both require a restart and a reload"
            )));
        }

        let width_min = ty.kind.width_min();
        let width_max = ty.kind.width_max();
        let declared = match (int_range, float_range) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::Schema(format!(
                    "two ranges cannot be defined for property {name}"
                )));
            }
            #[allow(
                clippy::cast_precision_loss,
                reason = "Bound comparison intentionally uses the f64 arithmetic of validation."
            )]
            (Some((min, max)), None) => Some((min as f64, max as f64)),
            (None, Some((min, max))) => Some((min, max)),
            (None, None) => None,
        };
        if declared.is_some() && !ty.kind.is_numeric() {
            return Err(ConfigError::Schema(format!(
                "property {name} declares a numeric range for a non-numeric type"
            )));
        }
        let (min, max) = declared.unwrap_or((width_min, width_max));
        if min > max {
            return Err(ConfigError::Schema(format!(
                "min cannot be larger than max for property {name}"
            )));
        }
        if min < width_min {
            return Err(ConfigError::Schema(format!(
                "min is too small for property {name}: {min} < {width_min}"
            )));
        }
        if max > width_max {
            return Err(ConfigError::Schema(format!(
                "max is too large for property {name}: {max} > {width_max}"
            )));
        }

        if let Some(spec) = &enum_spec {
            validate_enum_default(&name, spec, &default)?;
        }

        if default_blacklisted(&adapter, &blacklist, &default) {
            return Err(ConfigError::Schema(format!(
                "default value of property {name} is blacklisted"
            )));
        }

        let path = category_path.child(&name);
        let language_key = format!("{language_prefix}{name}");
        let previous = match previous {
            Some(raw) => Some(KeyPath::parse(&raw).ok_or_else(|| {
                ConfigError::Schema(format!("property {name} previous key {raw:?} is not a valid path"))
            })?),
            None => None,
        };

        let comment = synthesize_comment(
            &comment,
            enum_spec.as_ref(),
            ty.kind,
            adapter.is_array(),
            min,
            max,
            &blacklist,
            &adapter,
            &default,
        );

        Ok(Self {
            name,
            path,
            language_key,
            previous,
            adapter,
            enum_spec,
            non_null,
            min,
            max,
            blacklist,
            comment,
            requires_restart,
            requires_reload,
            late_bound,
            default,
            binding,
            refresh,
        })
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Returns the entry name within the owning category.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the fully qualified dotted path.
    #[must_use]
    pub const fn path(&self) -> &KeyPath {
        &self.path
    }

    /// Returns the localization key.
    #[must_use]
    pub fn language_key(&self) -> &str {
        &self.language_key
    }

    /// Returns whether a change requires a host restart.
    #[must_use]
    pub const fn requires_restart(&self) -> bool {
        self.requires_restart
    }

    /// Returns whether a change requires a host reload.
    #[must_use]
    pub const fn requires_reload(&self) -> bool {
        self.requires_reload
    }

    /// Returns the constant names of an enumerated property.
    #[must_use]
    pub fn valid_values(&self) -> Option<Vec<&str>> {
        self.enum_spec
            .as_ref()
            .map(|spec| spec.constants().iter().map(|constant| constant.name()).collect())
    }

    /// Returns the display names of an enumerated property.
    #[must_use]
    pub fn valid_values_display(&self) -> Option<Vec<&str>> {
        self.enum_spec
            .as_ref()
            .map(|spec| spec.constants().iter().map(|constant| constant.display()).collect())
    }

    /// Returns the synthesized documentation comment.
    #[must_use]
    pub fn comment(&self) -> &str {
        &self.comment
    }

    /// Returns the current default value.
    #[must_use]
    pub const fn default_value(&self) -> &Value {
        &self.default
    }

    // ------------------------------------------------------------------
    // Runtime protocol
    // ------------------------------------------------------------------

    /// Returns whether the canonical path or the legacy alias is present.
    #[must_use]
    pub fn exists(&self, document: &CommentedDocument) -> bool {
        document.contains(&self.path)
            || self.previous.as_ref().is_some_and(|previous| document.contains(previous))
    }

    /// Reads the stored value, seeding or migrating it first when absent.
    ///
    /// A missing canonical key is populated from the legacy alias when one
    /// is present, otherwise from the validated default. The value read is
    /// then re-stored through validation, so every read normalizes the
    /// document.
    pub fn get(&self, document: &mut CommentedDocument) -> Option<Value> {
        if !document.contains(&self.path) {
            let migrated = self
                .previous
                .as_ref()
                .and_then(|previous| document.get(previous).cloned());
            match migrated {
                Some(raw) => document.set(&self.path, raw),
                None => self.set(document, Some(self.default.clone())),
            }
        }
        let current = self.adapter.read(document, &self.path, &self.default);
        self.set(document, current);
        self.adapter.read(document, &self.path, &self.default)
    }

    /// Returns the canonical display string of the stored value.
    pub fn display_value(&self, document: &mut CommentedDocument) -> Option<String> {
        self.get(document).map(|value| self.adapter.display_string(&value))
    }

    /// Validates a value and stores it, reattaching the synthesized comment.
    pub fn set(&self, document: &mut CommentedDocument, value: Option<Value>) {
        document.set_comment(&self.path, &self.comment);
        let value = self.validate(value).unwrap_or_else(|| self.default.clone());
        self.adapter.write(document, &self.path, &value);
    }

    /// Validates a value against the null policy, blacklist, and range.
    ///
    /// Absent values become the default unless the type tolerates absence.
    /// List elements are validated individually and dropped when they
    /// validate to nothing. Blacklisted scalars validate to `None`; numeric
    /// scalars are clamped into `[min, max]` in their declared width.
    #[must_use]
    pub fn validate(&self, value: Option<Value>) -> Option<Value> {
        self.validate_shaped(value, self.adapter.is_array())
    }

    /// Validation worker, parameterized over the array shape so element
    /// validation reuses the scalar path.
    fn validate_shaped(&self, value: Option<Value>, array: bool) -> Option<Value> {
        let value = match value {
            None if !self.adapter.allows_absent() || self.non_null => self.default.clone(),
            None => return None,
            Some(value) => value,
        };

        if array {
            let items = match value {
                Value::List(items) => items,
                other => vec![other],
            };
            let kept: Vec<Value> = items
                .into_iter()
                .filter_map(|item| self.validate_shaped(Some(item), false))
                .collect();
            return Some(Value::List(kept));
        }

        if self.blacklist.contains(&self.adapter.display_string(&value)) {
            return None;
        }

        if value.is_numeric() {
            return Some(value.clamped(self.min, self.max));
        }

        Some(value)
    }

    /// Serializes the live host value into the document.
    ///
    /// The live value is re-validated, falling back to the default when
    /// validation rejects it, then stored with a fresh comment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Property`] when the host getter fails.
    pub(crate) fn serialize(&self, document: &mut CommentedDocument) -> Result<(), ConfigError> {
        let live = self
            .binding
            .read()
            .map_err(|err| ConfigError::property(&self.path, err))?;
        let value = self.validate(live).unwrap_or_else(|| self.default.clone());
        self.set(document, Some(value));
        Ok(())
    }

    /// Deserializes the stored value into the live host value.
    ///
    /// Enumerated properties match constant names case-insensitively with
    /// underscores ignored, falling back to the default on a scalar
    /// mismatch and dropping mismatched list elements.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Property`] when the host setter fails.
    pub(crate) fn deserialize(&self, document: &mut CommentedDocument) -> Result<(), ConfigError> {
        let Some(spec) = &self.enum_spec else {
            let value = self.get(document);
            let resolved = if self.non_null && value.is_none() {
                self.default.clone()
            } else {
                self.validate(value).unwrap_or_else(|| self.default.clone())
            };
            return self
                .binding
                .write(resolved)
                .map_err(|err| ConfigError::property(&self.path, err));
        };

        let resolved = if self.adapter.is_array() {
            let stored = match self.get(document) {
                Some(Value::List(items)) => items,
                Some(other) => vec![other],
                None => Vec::new(),
            };
            let matched: Vec<Value> = stored
                .iter()
                .filter_map(|item| match_constant(spec, &self.adapter.display_string(item)))
                .map(|name| Value::Enum(name.to_string()))
                .collect();
            Value::List(matched)
        } else {
            let stored = self
                .get(document)
                .map(|value| self.adapter.display_string(&value));
            match stored.as_deref().and_then(|raw| match_constant(spec, raw)) {
                Some(name) => Value::Enum(name.to_string()),
                None => self.default.clone(),
            }
        };
        self.binding
            .write(resolved)
            .map_err(|err| ConfigError::property(&self.path, err))
    }

    /// Returns whether the stored value is safe to coerce this pass.
    #[must_use]
    pub(crate) const fn should_load(&self, finalized: bool) -> bool {
        !self.late_bound || finalized
    }

    /// Recomputes the cached default through the refresh closure, if any.
    pub(crate) fn refresh_default(&mut self) {
        let previous = self.default.clone();
        self.default = match &self.refresh {
            Some(refresh) => refresh(previous),
            None => self.adapter.refresh_default(previous),
        };
    }
}

// ============================================================================
// SECTION: Construction Helpers
// ============================================================================

/// Checks that an enum default names declared constants only.
fn validate_enum_default(name: &str, spec: &EnumSpec, default: &Value) -> Result<(), ConfigError> {
    let names: Vec<&Value> = match default {
        Value::List(items) => items.iter().collect(),
        other => vec![other],
    };
    for value in names {
        let Value::Enum(constant) = value else {
            return Err(ConfigError::Schema(format!(
                "default value of enumerated property {name} is not a constant name"
            )));
        };
        if !spec.constants().iter().any(|declared| declared.name() == constant) {
            return Err(ConfigError::Schema(format!(
                "default constant {constant} of property {name} is not declared"
            )));
        }
    }
    Ok(())
}

/// Checks the default's display form (per element for lists) against the
/// blacklist.
fn default_blacklisted(adapter: &Adapter, blacklist: &[String], default: &Value) -> bool {
    if blacklist.is_empty() {
        return false;
    }
    match default {
        Value::List(items) => items
            .iter()
            .any(|item| blacklist.contains(&adapter.display_string(item))),
        other => blacklist.contains(&adapter.display_string(other)),
    }
}

/// Synthesizes the documentation comment from the declaration metadata.
///
/// Layout: explanatory lines, valid constant names for enums, `Min`/`Max`
/// for scalar numerics (integral kinds print as integers), the blacklist
/// when non-empty, and always the default's display form. Every line is
/// prefixed with a single space so the persisted form reads `# text`.
#[allow(
    clippy::too_many_arguments,
    clippy::cast_possible_truncation,
    reason = "The comment layout consumes every piece of declaration metadata; integral bounds fit their width by construction."
)]
fn synthesize_comment(
    lines: &[String],
    enum_spec: Option<&EnumSpec>,
    kind: ValueKind,
    array: bool,
    min: f64,
    max: f64,
    blacklist: &[String],
    adapter: &Adapter,
    default: &Value,
) -> String {
    let mut comment = String::new();
    for (index, line) in lines.iter().enumerate() {
        if index > 0 {
            comment.push('\n');
        }
        comment.push(' ');
        comment.push_str(line);
    }

    if let Some(spec) = enum_spec {
        comment.push_str("\n Valid values:");
        for constant in spec.constants() {
            comment.push('\n');
            comment.push(' ');
            comment.push_str(constant.name());
        }
    }

    if kind.is_numeric() && !array {
        if kind.is_float() {
            let _ = write!(comment, "\n Min: {min}\n Max: {max}");
        } else {
            let _ = write!(comment, "\n Min: {}\n Max: {}", min as i64, max as i64);
        }
    }

    if !blacklist.is_empty() {
        let _ = write!(comment, "\n Blacklist: [{}]", blacklist.join(", "));
    }

    comment.push_str("\n Default: ");
    comment.push_str(&adapter.display_string(default));
    comment
}

/// Matches a stored string against the constant set, ignoring case and
/// underscores. Returns the canonical constant name.
fn match_constant<'a>(spec: &'a EnumSpec, raw: &str) -> Option<&'a str> {
    let wanted = fold_constant(raw);
    spec.constants()
        .iter()
        .find(|constant| fold_constant(constant.name()) == wanted)
        .map(|constant| constant.name())
}

/// Folds a constant name for comparison: underscores stripped, lowercase.
fn fold_constant(raw: &str) -> String {
    raw.chars()
        .filter(|ch| *ch != '_')
        .flat_map(char::to_lowercase)
        .collect()
}
