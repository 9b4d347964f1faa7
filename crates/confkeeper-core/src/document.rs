// confkeeper-core/src/document.rs
// ============================================================================
// Module: Commented Document Tree
// Description: Ordered key/value tree with per-entry comment slots.
// Purpose: In-memory model of a persisted configuration document.
// Dependencies: indexmap
// ============================================================================

//! ## Overview
//! A [`CommentedDocument`] is an ordered mapping from names to entries, where
//! an entry is either a leaf value or a nested section, and every entry owns
//! an optional comment independent of its value. Entries are addressed by
//! dotted [`KeyPath`]s; intermediate sections are created on demand by
//! writes. Comments are the engine's liveness markers: a write-back pass
//! strips every comment, reattaches comments for declared entries, and then
//! prunes whatever still has none.

// ============================================================================
// SECTION: Imports
// ============================================================================

use indexmap::IndexMap;

use crate::key::KeyPath;

// ============================================================================
// SECTION: Document Values
// ============================================================================

/// A leaf value as persisted in a document.
#[derive(Debug, Clone, PartialEq)]
pub enum DocValue {
    /// Boolean leaf.
    Bool(bool),
    /// Integer leaf (widest storage form).
    Integer(i64),
    /// Float leaf (widest storage form).
    Float(f64),
    /// String leaf.
    Str(String),
    /// Homogeneous list leaf.
    List(Vec<DocValue>),
}

// ============================================================================
// SECTION: Entries
// ============================================================================

/// Payload of a document entry: a leaf value or a nested section.
#[derive(Debug, Clone, PartialEq)]
pub enum DocNode {
    /// Leaf value.
    Leaf(DocValue),
    /// Nested section of further entries.
    Section(CommentedDocument),
}

/// One named entry in a document level.
#[derive(Debug, Clone, PartialEq)]
pub struct DocEntry {
    /// Comment attached to the entry, independent of its value.
    pub comment: Option<String>,
    /// The entry payload.
    pub node: DocNode,
}

impl DocEntry {
    /// Creates an uncommented entry around a node.
    #[must_use]
    pub const fn new(node: DocNode) -> Self {
        Self {
            comment: None,
            node,
        }
    }
}

// ============================================================================
// SECTION: Document Tree
// ============================================================================

/// Ordered tree of commented entries addressed by dotted paths.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentedDocument {
    /// Entries at this level, in insertion order.
    entries: IndexMap<String, DocEntry>,
}

impl CommentedDocument {
    /// Creates an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether any entry (leaf or section) exists at `path`.
    #[must_use]
    pub fn contains(&self, path: &KeyPath) -> bool {
        self.entry(path).is_some()
    }

    /// Returns the leaf value at `path`, or `None` for sections and missing
    /// entries.
    #[must_use]
    pub fn get(&self, path: &KeyPath) -> Option<&DocValue> {
        match &self.entry(path)?.node {
            DocNode::Leaf(value) => Some(value),
            DocNode::Section(_) => None,
        }
    }

    /// Returns the entry at `path`, leaf or section.
    #[must_use]
    pub fn entry(&self, path: &KeyPath) -> Option<&DocEntry> {
        let mut segments = path.segments();
        let mut name = segments.next()?;
        let mut current = self;
        for next in segments {
            current = match &current.entries.get(name)?.node {
                DocNode::Section(section) => section,
                DocNode::Leaf(_) => return None,
            };
            name = next;
        }
        current.entries.get(name)
    }

    /// Stores a leaf value at `path`, creating intermediate sections as
    /// needed and preserving any comment already attached at the path.
    pub fn set(&mut self, path: &KeyPath, value: DocValue) {
        if let Some(entry) = self.entry_mut(path) {
            entry.node = DocNode::Leaf(value);
        }
    }

    /// Attaches a comment to the entry at `path`, creating an empty section
    /// there when nothing exists yet.
    pub fn set_comment(&mut self, path: &KeyPath, comment: &str) {
        if let Some(entry) = self.entry_mut(path) {
            entry.comment = Some(comment.to_string());
        }
    }

    /// Returns the comment attached at `path`.
    #[must_use]
    pub fn comment(&self, path: &KeyPath) -> Option<&str> {
        self.entry(path)?.comment.as_deref()
    }

    /// Removes the entry at `path`, returning it when present.
    pub fn remove(&mut self, path: &KeyPath) -> Option<DocEntry> {
        let mut segments = path.segments();
        let mut name = segments.next()?;
        let mut current = self;
        for next in segments {
            current = match &mut current.entries.get_mut(name)?.node {
                DocNode::Section(section) => section,
                DocNode::Leaf(_) => return None,
            };
            name = next;
        }
        current.entries.shift_remove(name)
    }

    /// Strips every comment from every entry, at every depth.
    pub fn clear_comments(&mut self) {
        for entry in self.entries.values_mut() {
            entry.comment = None;
            if let DocNode::Section(section) = &mut entry.node {
                section.clear_comments();
            }
        }
    }

    /// Removes every entry that carries no comment, returning the number of
    /// entries removed.
    ///
    /// An uncommented section is removed wholesale without descending into
    /// it; a commented section is kept and swept recursively.
    pub fn prune_uncommented(&mut self) -> usize {
        let mut removed = 0;
        self.entries.retain(|_, entry| {
            if entry.comment.is_none() {
                removed += 1;
                false
            } else {
                true
            }
        });
        for entry in self.entries.values_mut() {
            if let DocNode::Section(section) = &mut entry.node {
                removed += section.prune_uncommented();
            }
        }
        removed
    }

    /// Iterates the entries at this level in order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &DocEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    /// Returns the number of entries at this level.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether this level has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every entry at every depth.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Inserts an entry at this level directly, preserving order.
    ///
    /// Used by stores when reconstructing a document from a parsed file.
    pub fn insert_entry(&mut self, name: String, entry: DocEntry) {
        self.entries.insert(name, entry);
    }

    /// Resolves the entry at `path` mutably, creating empty uncommented
    /// sections along the way. A leaf occupying an intermediate segment is
    /// replaced by a section, keeping its comment.
    fn entry_mut(&mut self, path: &KeyPath) -> Option<&mut DocEntry> {
        let mut segments = path.segments();
        let head = segments.next()?;
        let tail: Vec<&str> = segments.collect();
        self.entry_mut_inner(head, &tail)
    }

    /// Recursive worker for [`Self::entry_mut`].
    fn entry_mut_inner(&mut self, head: &str, tail: &[&str]) -> Option<&mut DocEntry> {
        let entry = self
            .entries
            .entry(head.to_string())
            .or_insert_with(|| DocEntry::new(DocNode::Section(Self::new())));
        let Some((next, rest)) = tail.split_first() else {
            return Some(entry);
        };
        if !matches!(entry.node, DocNode::Section(_)) {
            entry.node = DocNode::Section(Self::new());
        }
        match &mut entry.node {
            DocNode::Section(section) => section.entry_mut_inner(next, rest),
            DocNode::Leaf(_) => None,
        }
    }
}
