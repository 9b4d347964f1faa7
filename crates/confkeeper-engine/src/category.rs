// confkeeper-engine/src/category.rs
// ============================================================================
// Module: Category Descriptor
// Description: Commented grouping of properties under a document section.
// Purpose: Own the section comment and the post-write reload hooks.
// Dependencies: confkeeper-core
// ============================================================================

//! ## Overview
//! A [`Category`] binds a nested document section: it reattaches the
//! section's comment on every write-back and fires its reload hooks
//! afterwards, the unconditional one always and the client hook only when
//! the process runs in client mode. Hooks are parameterless closures
//! returning nothing, so the contract that their result is ignored holds by
//! construction.

// ============================================================================
// SECTION: Imports
// ============================================================================

use confkeeper_core::CommentedDocument;
use confkeeper_core::KeyPath;

use crate::property::Property;
use crate::schema::ReloadHook;

// ============================================================================
// SECTION: Category Type
// ============================================================================

/// Descriptor of one category section, built once at registration.
pub struct Category {
    /// Entry name of the section.
    name: String,
    /// Fully qualified dotted path of the section.
    path: KeyPath,
    /// Localization key for host UIs.
    language_key: String,
    /// Section comment, space-prefixed per line.
    comment: String,
    /// Properties in declaration order.
    properties: Vec<Property>,
    /// Hook fired unconditionally after every write-back.
    on_reload: Option<ReloadHook>,
    /// Hook fired additionally in client mode.
    on_reload_client: Option<ReloadHook>,
}

impl std::fmt::Debug for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Category")
            .field("path", &self.path)
            .field("properties", &self.properties.len())
            .finish_non_exhaustive()
    }
}

impl Category {
    /// Assembles a category descriptor from its resolved parts.
    pub(crate) fn new(
        name: String,
        path: KeyPath,
        language_key: String,
        comment: String,
        properties: Vec<Property>,
        on_reload: Option<ReloadHook>,
        on_reload_client: Option<ReloadHook>,
    ) -> Self {
        Self {
            name,
            path,
            language_key,
            comment,
            properties,
            on_reload,
            on_reload_client,
        }
    }

    /// Returns the entry name of the section.
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

    /// Returns the language key prefix for entries below this category.
    #[must_use]
    pub fn child_language_prefix(&self) -> String {
        format!("{}.", self.language_key)
    }

    /// Returns the section comment.
    #[must_use]
    pub fn comment(&self) -> &str {
        &self.comment
    }

    /// Returns the properties in declaration order.
    #[must_use]
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// Returns the properties mutably for reconciliation.
    pub(crate) fn properties_mut(&mut self) -> &mut [Property] {
        &mut self.properties
    }

    /// Attaches the category comment to its document section.
    pub fn initialize(&self, document: &mut CommentedDocument) {
        document.set_comment(&self.path, &self.comment);
    }

    /// Fires the reload hook selected by `client`, when declared.
    pub fn on_reload(&self, client: bool) {
        let hook = if client {
            self.on_reload_client.as_ref()
        } else {
            self.on_reload.as_ref()
        };
        if let Some(hook) = hook {
            hook();
        }
    }
}
