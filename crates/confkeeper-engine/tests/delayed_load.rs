// confkeeper-engine/tests/delayed_load.rs
// ============================================================================
// Module: Delayed Load Tests
// Description: Validate the late-bound stash and finalize drain.
// Purpose: Ensure unsafe-to-coerce values survive untouched until safe.
// Dependencies: confkeeper-core, confkeeper-engine, tempfile
// ============================================================================

//! Two-phase loading tests for late-bound properties.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::fs;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use confkeeper_core::Value;
use confkeeper_engine::CategorySpec;
use confkeeper_engine::PropertySpec;
use confkeeper_engine::register;
use tempfile::TempDir;

mod common;

use common::Slot;
use common::schema_in;
use common::slot_binding;

type TestResult = Result<(), String>;

#[test]
fn late_bound_values_stay_raw_until_finalize() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    fs::write(dir.path().join("cfg.toml"), "[general]\nresource = \"modded:thing\"\n")
        .map_err(|err| err.to_string())?;
    let slot = Slot::new("builtin:default".to_string());
    let refreshed = Arc::new(AtomicUsize::new(0));
    let refresh_count = Arc::clone(&refreshed);
    let schema = schema_in(&dir, "cfg", ["Header"]).category(
        CategorySpec::new("general", ["General settings"]).property(
            PropertySpec::new("resource", ["Bound resource id"], slot_binding(&slot))
                .late_bound()
                .refresh(move |previous| {
                    refresh_count.fetch_add(1, Ordering::SeqCst);
                    previous
                }),
        ),
    );
    let mut handle = register(schema).map_err(|err| err.to_string())?;

    // While unsafe: the live value is untouched and the raw stored value
    // survives the write-back verbatim.
    if slot.get() != "builtin:default" {
        return Err(format!("live value touched while unsafe: {}", slot.get()));
    }
    let content = fs::read_to_string(handle.path()).map_err(|err| err.to_string())?;
    if !content.contains("resource = \"modded:thing\"") {
        return Err(format!("raw value lost before finalize: {content}"));
    }
    if refreshed.load(Ordering::SeqCst) != 0 {
        return Err("default refreshed before finalize".to_string());
    }

    // Another reload while unsafe must not drain the stash.
    handle.reload_from_disk().map_err(|err| err.to_string())?;
    if slot.get() != "builtin:default" {
        return Err(format!("live value touched on second pass: {}", slot.get()));
    }

    handle.finalize().map_err(|err| err.to_string())?;
    if slot.get() != "modded:thing" {
        return Err(format!("deferred value not applied: {}", slot.get()));
    }
    if refreshed.load(Ordering::SeqCst) != 1 {
        return Err(format!(
            "expected one refresh, got {}",
            refreshed.load(Ordering::SeqCst)
        ));
    }
    let content = fs::read_to_string(handle.path()).map_err(|err| err.to_string())?;
    if !content.contains("resource = \"modded:thing\"") {
        return Err(format!("value lost after finalize: {content}"));
    }
    Ok(())
}

#[test]
fn finalize_is_idempotent() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    fs::write(dir.path().join("cfg.toml"), "[general]\nresource = \"modded:thing\"\n")
        .map_err(|err| err.to_string())?;
    let slot = Slot::new("builtin:default".to_string());
    let refreshed = Arc::new(AtomicUsize::new(0));
    let refresh_count = Arc::clone(&refreshed);
    let schema = schema_in(&dir, "cfg", ["Header"]).category(
        CategorySpec::new("general", ["General settings"]).property(
            PropertySpec::new("resource", ["Bound resource id"], slot_binding(&slot))
                .late_bound()
                .refresh(move |previous| {
                    refresh_count.fetch_add(1, Ordering::SeqCst);
                    previous
                }),
        ),
    );
    let mut handle = register(schema).map_err(|err| err.to_string())?;
    handle.finalize().map_err(|err| err.to_string())?;
    handle.finalize().map_err(|err| err.to_string())?;
    if refreshed.load(Ordering::SeqCst) != 1 {
        return Err(format!(
            "finalize drained more than once: {}",
            refreshed.load(Ordering::SeqCst)
        ));
    }
    Ok(())
}

#[test]
fn refresh_can_rewrite_the_default() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    fs::write(dir.path().join("cfg.toml"), "[general]\nresource = \"modded:thing\"\n")
        .map_err(|err| err.to_string())?;
    let slot = Slot::new("builtin:default".to_string());
    let schema = schema_in(&dir, "cfg", ["Header"]).category(
        CategorySpec::new("general", ["General settings"]).property(
            PropertySpec::new("resource", ["Bound resource id"], slot_binding(&slot))
                .late_bound()
                .refresh(|_previous| Value::Str("builtin:remapped".to_string())),
        ),
    );
    let mut handle = register(schema).map_err(|err| err.to_string())?;
    handle.finalize().map_err(|err| err.to_string())?;
    let property = &handle.categories()[0].properties()[0];
    if property.default_value() != &Value::Str("builtin:remapped".to_string()) {
        return Err(format!("default not refreshed: {:?}", property.default_value()));
    }
    Ok(())
}

#[test]
fn absent_late_bound_values_seed_normally_after_finalize() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    let slot = Slot::new("builtin:default".to_string());
    let schema = schema_in(&dir, "cfg", ["Header"]).category(
        CategorySpec::new("general", ["General settings"]).property(
            PropertySpec::new("resource", ["Bound resource id"], slot_binding(&slot))
                .late_bound(),
        ),
    );
    let mut handle = register(schema).map_err(|err| err.to_string())?;
    // Nothing stored: the write-back seeds the default like any property.
    let content = fs::read_to_string(handle.path()).map_err(|err| err.to_string())?;
    if !content.contains("resource = \"builtin:default\"") {
        return Err(format!("default not seeded: {content}"));
    }
    handle.finalize().map_err(|err| err.to_string())?;
    if slot.get() != "builtin:default" {
        return Err(format!("unexpected live value: {}", slot.get()));
    }
    Ok(())
}
