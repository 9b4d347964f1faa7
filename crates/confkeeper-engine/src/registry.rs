// confkeeper-engine/src/registry.rs
// ============================================================================
// Module: Lifecycle Orchestrator
// Description: Registration, reload passes, and comment-driven pruning.
// Purpose: Drive the load/validate/serialize/prune cycle for one schema.
// Dependencies: confkeeper-core, confkeeper-store-toml, indexmap, tracing
// ============================================================================

//! ## Overview
//! [`register`] validates a [`Schema`], derives and creates its file path,
//! builds the category and property descriptors, and performs the initial
//! reload from disk. It returns a [`ConfigHandle`] the host threads through
//! every later call; distinct handles are fully independent.
//!
//! A reload pass reconciles each stored property into host storage, then
//! writes back: every comment in the document is stripped, declared
//! categories and properties reattach theirs while serializing, and any
//! entry still uncommented afterwards is pruned as stale. Late-bound values
//! sit in a delayed table untouched until [`ConfigHandle::finalize`] marks
//! the one-time transition to safe.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::OnceLock;

use confkeeper_core::CommentedDocument;
use confkeeper_core::DocValue;
use confkeeper_core::DocumentStore;
use confkeeper_core::KeyPath;
use confkeeper_core::StoreError;
use confkeeper_store_toml::TomlStore;
use indexmap::IndexMap;

use crate::category::Category;
use crate::error::ConfigError;
use crate::property::Property;
use crate::schema::CategorySpec;
use crate::schema::Schema;

// ============================================================================
// SECTION: Client Mode
// ============================================================================

/// Process-wide client flag, set once by the host before any reload.
static CLIENT_MODE: OnceLock<bool> = OnceLock::new();

/// Sets the process-wide client flag. Returns `false` when already set.
pub fn set_client_mode(client: bool) -> bool {
    CLIENT_MODE.set(client).is_ok()
}

/// Returns the process-wide client flag, defaulting to client.
#[must_use]
pub fn client_mode() -> bool {
    CLIENT_MODE.get().copied().unwrap_or(true)
}

// ============================================================================
// SECTION: Registration
// ============================================================================

/// Registers a schema: validates it, creates its file path, builds the
/// descriptor tree, and performs the initial reload from disk.
///
/// # Errors
///
/// Returns [`ConfigError::Schema`] for malformed schemas,
/// [`ConfigError::Io`] when the configuration directory cannot be created
/// or the file cannot be written, and [`ConfigError::Property`] when the
/// initial reload fails for one property.
pub fn register(schema: Schema) -> Result<ConfigHandle, ConfigError> {
    if schema.id.trim().is_empty() {
        return Err(ConfigError::Schema(
            "configuration id may not be empty".to_string(),
        ));
    }
    if schema.header.join("").trim().is_empty() {
        return Err(ConfigError::Schema(
            "configuration header comment may not be empty".to_string(),
        ));
    }

    let path_string = derive_path_string(&schema);
    let path = PathBuf::from(&path_string);
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|err| {
            ConfigError::Io(format!("failed to create configuration directory: {err}"))
        })?;
    }

    let language_root = format!("{}.config.", schema.id);
    let mut categories = Vec::new();
    for spec in schema.categories {
        build_categories(None, &language_root, spec, &mut categories)?;
    }

    tracing::debug!(id = %schema.id, path = %path_string, categories = categories.len(), "registered configuration schema");

    let mut handle = ConfigHandle {
        id: schema.id,
        header: schema.header,
        path,
        path_string,
        document: CommentedDocument::new(),
        categories,
        delayed: IndexMap::new(),
        finalized: false,
        store: TomlStore::new(),
    };
    handle.reload_from_disk()?;
    Ok(handle)
}

/// Derives the persisted file path string for a schema.
///
/// The default is `config/<id>.toml`; an explicit stem replaces the
/// identifier, and an absolute stem escapes the config directory entirely.
fn derive_path_string(schema: &Schema) -> String {
    match &schema.path {
        Some(stem) if Path::new(stem).is_absolute() => format!("{stem}.toml"),
        Some(stem) => format!("config/{stem}.toml"),
        None => format!("config/{}.toml", schema.id),
    }
}

/// Builds descriptors for a category and its children, depth-first in
/// declaration order.
fn build_categories(
    parent: Option<&KeyPath>,
    language_root: &str,
    spec: CategorySpec,
    out: &mut Vec<Category>,
) -> Result<(), ConfigError> {
    if spec.name.trim().is_empty() || spec.name.contains('.') {
        return Err(ConfigError::Schema(format!(
            "category name {:?} must be non-empty and dot-free",
            spec.name
        )));
    }
    let comment = join_comment(&spec.comment);
    if comment.trim().is_empty() {
        return Err(ConfigError::Schema(format!(
            "category {} comment may not be empty",
            spec.name
        )));
    }

    let path = match parent {
        Some(parent) => parent.child(&spec.name),
        None => KeyPath::parse(&spec.name).ok_or_else(|| {
            ConfigError::Schema(format!("category name {:?} is not a valid key", spec.name))
        })?,
    };
    let language_key = format!("{language_root}{path}");
    let child_prefix = format!("{language_key}.");

    let mut properties = Vec::with_capacity(spec.properties.len());
    for property in spec.properties {
        properties.push(Property::build(&path, &child_prefix, property)?);
    }

    out.push(Category::new(
        spec.name,
        path.clone(),
        language_key,
        comment,
        properties,
        spec.on_reload,
        spec.on_reload_client,
    ));

    for child in spec.children {
        build_categories(Some(&path), language_root, child, out)?;
    }
    Ok(())
}

/// Joins comment lines with a leading space per line.
fn join_comment(lines: &[String]) -> String {
    let mut joined = String::new();
    for (index, line) in lines.iter().enumerate() {
        if index > 0 {
            joined.push('\n');
        }
        joined.push(' ');
        joined.push_str(line);
    }
    joined
}

// ============================================================================
// SECTION: Handle
// ============================================================================

/// A registered configuration: bound document, file path, descriptor tree,
/// and delayed-load state.
#[derive(Debug)]
pub struct ConfigHandle {
    /// Schema identifier.
    id: String,
    /// Header comment lines for the persisted file.
    header: Vec<String>,
    /// Persisted file path.
    path: PathBuf,
    /// Persisted file path in string form.
    path_string: String,
    /// The bound in-memory document.
    document: CommentedDocument,
    /// Categories in declaration order, parents before children.
    categories: Vec<Category>,
    /// Raw values stashed until coercion is safe, keyed by property path.
    delayed: IndexMap<KeyPath, DocValue>,
    /// Whether the host has completed its own initialization.
    finalized: bool,
    /// Persistence backend.
    store: TomlStore,
}

impl ConfigHandle {
    /// Returns the schema identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the persisted file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the persisted file path in string form.
    #[must_use]
    pub fn path_string(&self) -> &str {
        &self.path_string
    }

    /// Returns the bound document.
    #[must_use]
    pub const fn document(&self) -> &CommentedDocument {
        &self.document
    }

    /// Returns the bound document mutably, for host-driven edits between
    /// reload passes.
    pub fn document_mut(&mut self) -> &mut CommentedDocument {
        &mut self.document
    }

    /// Returns the categories in declaration order.
    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Reloads the document from disk, then reconciles and writes back.
    ///
    /// A parse failure is not an error: the document is treated as empty
    /// and repopulated from defaults during the write-back.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] on filesystem failure and
    /// [`ConfigError::Property`] when one property fails to reconcile.
    pub fn reload_from_disk(&mut self) -> Result<(), ConfigError> {
        match self.store.load(&self.path) {
            Ok(document) => self.document = document,
            Err(StoreError::Parse(message)) => {
                tracing::warn!(id = %self.id, %message, "config file unreadable, starting from defaults");
                self.document.clear();
            }
            Err(StoreError::Io(message)) => return Err(ConfigError::Io(message)),
        }
        self.reload_from_memory()
    }

    /// Reconciles the in-memory document into host storage and writes back.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Property`] when one property fails and
    /// [`ConfigError::Io`] when persisting fails.
    pub fn reload_from_memory(&mut self) -> Result<(), ConfigError> {
        self.reconcile()?;
        self.write_to_disk()
    }

    /// Marks the one-time transition out of the late-bound phase and drains
    /// pending delayed values through a reload.
    ///
    /// # Errors
    ///
    /// Propagates reload failures; see [`Self::reload_from_memory`].
    pub fn finalize(&mut self) -> Result<(), ConfigError> {
        if self.finalized {
            return Ok(());
        }
        self.finalized = true;
        tracing::debug!(id = %self.id, pending = self.delayed.len(), "finalizing configuration");
        self.reload_from_memory()
    }

    /// Reconciles every stored property into host storage, in category then
    /// property declaration order.
    ///
    /// Properties absent from the document are skipped; the write-back
    /// populates them lazily. Present late-bound values are stashed on
    /// first sight while unsafe; once safe, a pending stash refreshes the
    /// property default, is restored into the document, and is dropped
    /// before normal deserialization.
    fn reconcile(&mut self) -> Result<(), ConfigError> {
        let finalized = self.finalized;
        for category in &mut self.categories {
            for property in category.properties_mut() {
                if !property.exists(&self.document) {
                    continue;
                }
                let path = property.path().clone();
                if !property.should_load(finalized) {
                    if !self.delayed.contains_key(&path)
                        && let Some(raw) = self.document.get(&path).cloned()
                    {
                        tracing::debug!(path = %path, "deferring value until finalization");
                        self.delayed.insert(path, raw);
                    }
                    continue;
                }
                if let Some(raw) = self.delayed.shift_remove(&path) {
                    tracing::debug!(path = %path, "draining deferred value");
                    property.refresh_default();
                    self.document.set(&path, raw);
                }
                property.deserialize(&mut self.document)?;
            }
        }
        Ok(())
    }

    /// Writes the document back to disk: strips all comments, reattaches
    /// them while serializing declared entries, prunes whatever stayed
    /// uncommented, and persists with the schema header.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Property`] when serialization of one property
    /// fails and [`ConfigError::Io`] when the file cannot be written.
    pub fn write_to_disk(&mut self) -> Result<(), ConfigError> {
        self.document.clear_comments();

        let client = client_mode();
        for category in &self.categories {
            category.initialize(&mut self.document);
            category.on_reload(false);
            if client {
                category.on_reload(true);
            }
            for property in category.properties() {
                // Serialize first even when a delayed value immediately
                // replaces it: serialization attaches the comment that keeps
                // the entry alive through the prune below.
                property.serialize(&mut self.document)?;
                if let Some(raw) = self.delayed.get(property.path()) {
                    self.document.set(property.path(), raw.clone());
                }
            }
        }

        let pruned = self.document.prune_uncommented();
        if pruned > 0 {
            tracing::debug!(id = %self.id, pruned, "pruned undeclared entries");
        }

        self.store
            .save(&self.path, &self.document, &self.header)
            .map_err(|err| ConfigError::Io(format!("failed to write config: {err}")))
    }
}
