// confkeeper-engine/tests/common/mod.rs
// =============================================================================
// Module: Engine Test Helpers
// Description: Shared helpers for engine integration tests.
// Purpose: Reduce duplication across confkeeper-engine test suites.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

use confkeeper_engine::Binding;
use confkeeper_engine::Schema;
use tempfile::TempDir;

/// Clonable host-side storage slot for binding tests.
#[derive(Debug, Clone)]
pub struct Slot<T>(Arc<Mutex<T>>);

impl<T: Clone + Send + 'static> Slot<T> {
    /// Creates a slot holding `value`.
    pub fn new(value: T) -> Self {
        Self(Arc::new(Mutex::new(value)))
    }

    /// Returns a copy of the stored value.
    pub fn get(&self) -> T {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Replaces the stored value.
    pub fn set(&self, value: T) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = value;
    }
}

/// Builds a scalar binding over a slot.
pub fn slot_binding<T>(slot: &Slot<T>) -> Binding
where
    T: confkeeper_core::Scalar + Clone + Send + 'static,
{
    let getter = slot.clone();
    let setter = slot.clone();
    Binding::scalar(move || getter.get(), move |value| setter.set(value))
}

/// Builds a list binding over a slot.
pub fn slot_list_binding<T>(slot: &Slot<Vec<T>>) -> Binding
where
    T: confkeeper_core::Scalar + Clone + Send + 'static,
{
    let getter = slot.clone();
    let setter = slot.clone();
    Binding::list(move || getter.get(), move |value| setter.set(value))
}

/// Builds an enumeration binding over a constant-name slot.
pub fn slot_enum_binding(slot: &Slot<String>) -> Binding {
    let getter = slot.clone();
    let setter = slot.clone();
    Binding::enumeration(move || getter.get(), move |value| setter.set(value))
}

/// Returns a schema bound to a file stem inside the temp directory.
pub fn schema_in<S>(dir: &TempDir, id: &str, header: impl IntoIterator<Item = S>) -> Schema
where
    S: Into<String>,
{
    let stem = dir.path().join(id);
    Schema::new(id, header).with_path(stem.to_string_lossy().into_owned())
}
