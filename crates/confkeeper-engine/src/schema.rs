// confkeeper-engine/src/schema.rs
// ============================================================================
// Module: Schema Description
// Description: Host-facing schema tree of categories and properties.
// Purpose: Replace reflective field discovery with explicit typed literals.
// Dependencies: confkeeper-core
// ============================================================================

//! ## Overview
//! A [`Schema`] is the host's declaration of its configuration surface: an
//! identifier, a header comment, an optional file path override, and a tree
//! of [`CategorySpec`] nodes holding [`PropertySpec`] entries. Each property
//! carries a [`Binding`] — a getter/setter pair over the host's own storage —
//! so the host's values remain the source of truth without any runtime
//! introspection. Bindings may fail (a host slot behind a lock, a channel, a
//! device); failures surface as property errors during reload passes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use confkeeper_core::Scalar;
use confkeeper_core::Value;
use confkeeper_core::ValueKind;
use confkeeper_core::ValueType;
use confkeeper_core::from_list;
use confkeeper_core::to_list;

// ============================================================================
// SECTION: Callback Types
// ============================================================================

/// Getter closure over host storage.
type GetFn = Box<dyn Fn() -> Result<Option<Value>, String> + Send + Sync>;
/// Setter closure over host storage.
type SetFn = Box<dyn Fn(Value) -> Result<(), String> + Send + Sync>;
/// Parameterless reload hook fired after write-backs.
pub type ReloadHook = Box<dyn Fn() + Send + Sync>;
/// Host-supplied default refresh for late-bound properties.
pub type RefreshFn = Box<dyn Fn(Value) -> Value + Send + Sync>;

// ============================================================================
// SECTION: Bindings
// ============================================================================

/// Getter/setter pair binding a property to host storage.
pub struct Binding {
    /// Declared value type of the bound storage.
    ty: ValueType,
    /// Reads the current host value.
    get: GetFn,
    /// Writes a validated value back into host storage.
    set: SetFn,
}

impl Binding {
    /// Binds a scalar slot through infallible closures.
    pub fn scalar<T, G, S>(get: G, set: S) -> Self
    where
        T: Scalar,
        G: Fn() -> T + Send + Sync + 'static,
        S: Fn(T) + Send + Sync + 'static,
    {
        Self {
            ty: ValueType::scalar(T::KIND),
            get: Box::new(move || Ok(Some(get().into_value()))),
            set: Box::new(move |value| {
                if let Some(typed) = T::from_value(value) {
                    set(typed);
                }
                Ok(())
            }),
        }
    }

    /// Binds a homogeneous list slot through infallible closures.
    pub fn list<T, G, S>(get: G, set: S) -> Self
    where
        T: Scalar,
        G: Fn() -> Vec<T> + Send + Sync + 'static,
        S: Fn(Vec<T>) + Send + Sync + 'static,
    {
        Self {
            ty: ValueType::list(T::KIND),
            get: Box::new(move || Ok(Some(to_list(get())))),
            set: Box::new(move |value| {
                set(from_list(value));
                Ok(())
            }),
        }
    }

    /// Binds an enumerated slot; the closures speak constant names.
    pub fn enumeration<G, S>(get: G, set: S) -> Self
    where
        G: Fn() -> String + Send + Sync + 'static,
        S: Fn(String) + Send + Sync + 'static,
    {
        Self {
            ty: ValueType::scalar(ValueKind::Enum),
            get: Box::new(move || Ok(Some(Value::Enum(get())))),
            set: Box::new(move |value| {
                if let Value::Enum(name) = value {
                    set(name);
                }
                Ok(())
            }),
        }
    }

    /// Binds an enumerated list slot; the closures speak constant names.
    pub fn enumeration_list<G, S>(get: G, set: S) -> Self
    where
        G: Fn() -> Vec<String> + Send + Sync + 'static,
        S: Fn(Vec<String>) + Send + Sync + 'static,
    {
        Self {
            ty: ValueType::list(ValueKind::Enum),
            get: Box::new(move || {
                Ok(Some(Value::List(get().into_iter().map(Value::Enum).collect())))
            }),
            set: Box::new(move |value| {
                if let Value::List(items) = value {
                    let names = items
                        .into_iter()
                        .filter_map(|item| match item {
                            Value::Enum(name) => Some(name),
                            _ => None,
                        })
                        .collect();
                    set(names);
                }
                Ok(())
            }),
        }
    }

    /// Binds a slot through fallible, value-level closures.
    ///
    /// The getter may report absence; whether absence is acceptable is
    /// decided by the property's type and null policy at registration.
    pub fn fallible<G, S>(ty: ValueType, get: G, set: S) -> Self
    where
        G: Fn() -> Result<Option<Value>, String> + Send + Sync + 'static,
        S: Fn(Value) -> Result<(), String> + Send + Sync + 'static,
    {
        Self {
            ty,
            get: Box::new(get),
            set: Box::new(set),
        }
    }

    /// Returns the declared value type of the bound storage.
    #[must_use]
    pub const fn value_type(&self) -> ValueType {
        self.ty
    }

    /// Reads the current host value.
    ///
    /// # Errors
    ///
    /// Propagates the host closure's failure message.
    pub(crate) fn read(&self) -> Result<Option<Value>, String> {
        (self.get)()
    }

    /// Writes a validated value into host storage.
    ///
    /// # Errors
    ///
    /// Propagates the host closure's failure message.
    pub(crate) fn write(&self, value: Value) -> Result<(), String> {
        (self.set)(value)
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding").field("ty", &self.ty).finish_non_exhaustive()
    }
}

// ============================================================================
// SECTION: Enum Metadata
// ============================================================================

/// One constant of an enumerated property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumConstant {
    /// Canonical constant name, as persisted.
    name: String,
    /// Human-readable display name.
    display: String,
}

impl EnumConstant {
    /// Declares a constant with identical name and display form.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let display = name.clone();
        Self { name, display }
    }

    /// Declares a constant with a distinct display form.
    #[must_use]
    pub fn with_display(name: impl Into<String>, display: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display: display.into(),
        }
    }

    /// Returns the canonical constant name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the display name.
    #[must_use]
    pub fn display(&self) -> &str {
        &self.display
    }
}

/// Ordered constant set of an enumerated property.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnumSpec {
    /// Constants in declaration order.
    constants: Vec<EnumConstant>,
}

impl EnumSpec {
    /// Declares an ordered constant set.
    #[must_use]
    pub fn new(constants: impl IntoIterator<Item = EnumConstant>) -> Self {
        Self {
            constants: constants.into_iter().collect(),
        }
    }

    /// Declares constants from their names alone.
    #[must_use]
    pub fn of_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            constants: names.into_iter().map(EnumConstant::new).collect(),
        }
    }

    /// Returns the constants in declaration order.
    #[must_use]
    pub fn constants(&self) -> &[EnumConstant] {
        &self.constants
    }

    /// Returns whether no constants are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
    }
}

// ============================================================================
// SECTION: Property Specs
// ============================================================================

/// Declaration of a single configuration property.
pub struct PropertySpec {
    /// Entry name within the owning category.
    pub(crate) name: String,
    /// Explanatory comment lines.
    pub(crate) comment: Vec<String>,
    /// Binding to host storage.
    pub(crate) binding: Binding,
    /// Constant metadata for enumerated properties.
    pub(crate) enum_spec: Option<EnumSpec>,
    /// Legacy key consulted when the canonical key is absent.
    pub(crate) previous: Option<String>,
    /// Whether an absent value must be replaced by the default.
    pub(crate) non_null: bool,
    /// Explicit integer range bounds.
    pub(crate) int_range: Option<(i64, i64)>,
    /// Explicit float range bounds.
    pub(crate) float_range: Option<(f64, f64)>,
    /// Display strings the property must never take.
    pub(crate) blacklist: Vec<String>,
    /// Whether a change requires a host restart.
    pub(crate) requires_restart: bool,
    /// Whether a change requires a host reload.
    pub(crate) requires_reload: bool,
    /// Whether stored values are unsafe to coerce before finalization.
    pub(crate) late_bound: bool,
    /// Host-supplied default refresh for late-bound identities.
    pub(crate) refresh: Option<RefreshFn>,
}

impl fmt::Debug for PropertySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertySpec")
            .field("name", &self.name)
            .field("ty", &self.binding.value_type())
            .finish_non_exhaustive()
    }
}

impl PropertySpec {
    /// Declares a property with its name, comment lines, and binding.
    #[must_use]
    pub fn new<S>(name: impl Into<String>, comment: impl IntoIterator<Item = S>, binding: Binding) -> Self
    where
        S: Into<String>,
    {
        Self {
            name: name.into(),
            comment: comment.into_iter().map(Into::into).collect(),
            binding,
            enum_spec: None,
            previous: None,
            non_null: false,
            int_range: None,
            float_range: None,
            blacklist: Vec::new(),
            requires_restart: false,
            requires_reload: false,
            late_bound: false,
            refresh: None,
        }
    }

    /// Attaches enum constant metadata.
    #[must_use]
    pub fn enum_values(mut self, spec: EnumSpec) -> Self {
        self.enum_spec = Some(spec);
        self
    }

    /// Records the property's previous key for one-time migration.
    #[must_use]
    pub fn previous(mut self, key: impl Into<String>) -> Self {
        self.previous = Some(key.into());
        self
    }

    /// Requires the stored value to be present; absence yields the default.
    #[must_use]
    pub fn non_null(mut self) -> Self {
        self.non_null = true;
        self
    }

    /// Declares inclusive integer bounds.
    #[must_use]
    pub fn range_int(mut self, min: i64, max: i64) -> Self {
        self.int_range = Some((min, max));
        self
    }

    /// Declares inclusive float bounds.
    #[must_use]
    pub fn range_float(mut self, min: f64, max: f64) -> Self {
        self.float_range = Some((min, max));
        self
    }

    /// Declares forbidden display strings.
    #[must_use]
    pub fn blacklist<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blacklist = values.into_iter().map(Into::into).collect();
        self
    }

    /// Marks the property as requiring a host restart to take effect.
    #[must_use]
    pub fn requires_restart(mut self) -> Self {
        self.requires_restart = true;
        self
    }

    /// Marks the property as requiring a host reload to take effect.
    #[must_use]
    pub fn requires_reload(mut self) -> Self {
        self.requires_reload = true;
        self
    }

    /// Marks stored values as unsafe to coerce until finalization.
    #[must_use]
    pub fn late_bound(mut self) -> Self {
        self.late_bound = true;
        self
    }

    /// Supplies a refresh closure recomputing the default at finalization.
    #[must_use]
    pub fn refresh<F>(mut self, refresh: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.refresh = Some(Box::new(refresh));
        self
    }
}

// ============================================================================
// SECTION: Category Specs
// ============================================================================

/// Declaration of a category grouping properties, possibly nested.
pub struct CategorySpec {
    /// Entry name within the parent (or at the document root).
    pub(crate) name: String,
    /// Category comment lines.
    pub(crate) comment: Vec<String>,
    /// Properties in declaration order.
    pub(crate) properties: Vec<PropertySpec>,
    /// Nested child categories in declaration order.
    pub(crate) children: Vec<CategorySpec>,
    /// Hook fired unconditionally after every write-back.
    pub(crate) on_reload: Option<ReloadHook>,
    /// Hook fired additionally when the process is in client mode.
    pub(crate) on_reload_client: Option<ReloadHook>,
}

impl fmt::Debug for CategorySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CategorySpec")
            .field("name", &self.name)
            .field("properties", &self.properties.len())
            .field("children", &self.children.len())
            .finish_non_exhaustive()
    }
}

impl CategorySpec {
    /// Declares a category with its name and comment lines.
    #[must_use]
    pub fn new<S>(name: impl Into<String>, comment: impl IntoIterator<Item = S>) -> Self
    where
        S: Into<String>,
    {
        Self {
            name: name.into(),
            comment: comment.into_iter().map(Into::into).collect(),
            properties: Vec::new(),
            children: Vec::new(),
            on_reload: None,
            on_reload_client: None,
        }
    }

    /// Appends a property declaration.
    #[must_use]
    pub fn property(mut self, property: PropertySpec) -> Self {
        self.properties.push(property);
        self
    }

    /// Appends a nested child category.
    #[must_use]
    pub fn child(mut self, child: CategorySpec) -> Self {
        self.children.push(child);
        self
    }

    /// Registers the unconditional reload hook.
    #[must_use]
    pub fn on_reload<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_reload = Some(Box::new(hook));
        self
    }

    /// Registers the client-mode reload hook.
    #[must_use]
    pub fn on_reload_client<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_reload_client = Some(Box::new(hook));
        self
    }
}

// ============================================================================
// SECTION: Schema
// ============================================================================

/// A configuration schema: identity, header, file binding, category tree.
pub struct Schema {
    /// Schema identifier, also the default file stem.
    pub(crate) id: String,
    /// Header comment lines prepended to the persisted file.
    pub(crate) header: Vec<String>,
    /// Optional file stem override (absolute stems escape the config dir).
    pub(crate) path: Option<String>,
    /// Root categories in declaration order.
    pub(crate) categories: Vec<CategorySpec>,
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("id", &self.id)
            .field("categories", &self.categories.len())
            .finish_non_exhaustive()
    }
}

impl Schema {
    /// Declares a schema with its identifier and header comment lines.
    #[must_use]
    pub fn new<S>(id: impl Into<String>, header: impl IntoIterator<Item = S>) -> Self
    where
        S: Into<String>,
    {
        Self {
            id: id.into(),
            header: header.into_iter().map(Into::into).collect(),
            path: None,
            categories: Vec::new(),
        }
    }

    /// Overrides the file stem used to derive the persisted path.
    #[must_use]
    pub fn with_path(mut self, stem: impl Into<String>) -> Self {
        self.path = Some(stem.into());
        self
    }

    /// Appends a root category.
    #[must_use]
    pub fn category(mut self, category: CategorySpec) -> Self {
        self.categories.push(category);
        self
    }
}
