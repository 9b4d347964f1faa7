// confkeeper-engine/tests/property_validation.rs
// ============================================================================
// Module: Property Validation Tests
// Description: Validate clamping, blacklists, migration, and round trips.
// Purpose: Ensure stored values never reach host storage unvalidated.
// Dependencies: confkeeper-core, confkeeper-engine, tempfile
// ============================================================================

//! Validation pipeline tests for the property descriptor.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::fs;

use confkeeper_core::Value;
use confkeeper_engine::CategorySpec;
use confkeeper_engine::ConfigHandle;
use confkeeper_engine::PropertySpec;
use confkeeper_engine::register;
use tempfile::TempDir;

mod common;

use common::Slot;
use common::schema_in;
use common::slot_binding;
use common::slot_list_binding;

type TestResult = Result<(), String>;

/// Registers a single `general.speed` i32 property with range `[0, 10]` and
/// default 5, over a file pre-seeded with `content`.
fn speed_fixture(content: &str) -> Result<(TempDir, Slot<i32>, ConfigHandle), String> {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    let file = dir.path().join("speed.toml");
    if !content.is_empty() {
        fs::write(&file, content).map_err(|err| err.to_string())?;
    }
    let slot = Slot::new(5_i32);
    let schema = schema_in(&dir, "speed", ["Speed test config"]).category(
        CategorySpec::new("general", ["General settings"]).property(
            PropertySpec::new("speed", ["Speed limit"], slot_binding(&slot)).range_int(0, 10),
        ),
    );
    let handle = register(schema).map_err(|err| err.to_string())?;
    Ok((dir, slot, handle))
}

#[test]
fn stored_value_above_range_clamps_to_max() -> TestResult {
    let (_dir, slot, handle) = speed_fixture("[general]\nspeed = 15\n")?;
    if slot.get() != 10 {
        return Err(format!("expected clamp to 10, got {}", slot.get()));
    }
    let content = fs::read_to_string(handle.path()).map_err(|err| err.to_string())?;
    if !content.contains("speed = 10") {
        return Err(format!("file not healed: {content}"));
    }
    Ok(())
}

#[test]
fn stored_value_below_range_clamps_to_min() -> TestResult {
    let (_dir, slot, _handle) = speed_fixture("[general]\nspeed = -3\n")?;
    if slot.get() != 0 {
        return Err(format!("expected clamp to 0, got {}", slot.get()));
    }
    Ok(())
}

#[test]
fn absent_value_seeds_the_default() -> TestResult {
    let (_dir, slot, handle) = speed_fixture("")?;
    if slot.get() != 5 {
        return Err(format!("expected default 5, got {}", slot.get()));
    }
    let content = fs::read_to_string(handle.path()).map_err(|err| err.to_string())?;
    if !content.contains("speed = 5") {
        return Err(format!("default not persisted: {content}"));
    }
    Ok(())
}

#[test]
fn blacklisted_stored_value_falls_back_to_default() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    fs::write(dir.path().join("ports.toml"), "[general]\nport = 7\n")
        .map_err(|err| err.to_string())?;
    let slot = Slot::new(5_i32);
    let schema = schema_in(&dir, "ports", ["Port test config"]).category(
        CategorySpec::new("general", ["General settings"]).property(
            PropertySpec::new("port", ["Port number"], slot_binding(&slot))
                .range_int(0, 10)
                .blacklist(["7"]),
        ),
    );
    let handle = register(schema).map_err(|err| err.to_string())?;
    if slot.get() != 5 {
        return Err(format!("expected default 5, got {}", slot.get()));
    }
    let content = fs::read_to_string(handle.path()).map_err(|err| err.to_string())?;
    if !content.contains("port = 5") {
        return Err(format!("blacklisted value survived: {content}"));
    }
    Ok(())
}

#[test]
fn narrow_width_never_escapes_its_range() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    fs::write(dir.path().join("width.toml"), "[general]\ntiny = 1000\n")
        .map_err(|err| err.to_string())?;
    let slot = Slot::new(1_i8);
    let schema = schema_in(&dir, "width", ["Width test config"]).category(
        CategorySpec::new("general", ["General settings"])
            .property(PropertySpec::new("tiny", ["Tiny value"], slot_binding(&slot))),
    );
    let _handle = register(schema).map_err(|err| err.to_string())?;
    if slot.get() != 127 {
        return Err(format!("expected width clamp to 127, got {}", slot.get()));
    }
    Ok(())
}

#[test]
fn float_range_clamps_in_declared_width() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    fs::write(dir.path().join("ratio.toml"), "[general]\nratio = 2.5\n")
        .map_err(|err| err.to_string())?;
    let slot = Slot::new(0.5_f64);
    let schema = schema_in(&dir, "ratio", ["Ratio test config"]).category(
        CategorySpec::new("general", ["General settings"]).property(
            PropertySpec::new("ratio", ["Mix ratio"], slot_binding(&slot)).range_float(0.0, 1.0),
        ),
    );
    let _handle = register(schema).map_err(|err| err.to_string())?;
    if slot.get() != 1.0 {
        return Err(format!("expected clamp to 1.0, got {}", slot.get()));
    }
    Ok(())
}

#[test]
fn validate_is_directly_observable_on_the_descriptor() -> TestResult {
    let (_dir, _slot, handle) = speed_fixture("")?;
    let property = &handle.categories()[0].properties()[0];
    match property.validate(Some(Value::I32(15))) {
        Some(Value::I32(10)) => {}
        other => return Err(format!("unexpected validation result: {other:?}")),
    }
    match property.validate(None) {
        Some(Value::I32(5)) => Ok(()),
        other => Err(format!("expected default substitution, got {other:?}")),
    }
}

#[test]
fn live_value_round_trips_through_disk() -> TestResult {
    let (_dir, slot, mut handle) = speed_fixture("")?;
    slot.set(9);
    handle.write_to_disk().map_err(|err| err.to_string())?;
    let content = fs::read_to_string(handle.path()).map_err(|err| err.to_string())?;
    if !content.contains("speed = 9") {
        return Err(format!("live value not serialized: {content}"));
    }
    handle.reload_from_disk().map_err(|err| err.to_string())?;
    if slot.get() != 9 {
        return Err(format!("round trip lost the value: {}", slot.get()));
    }
    Ok(())
}

#[test]
fn out_of_range_live_value_is_clamped_on_serialize() -> TestResult {
    let (_dir, slot, mut handle) = speed_fixture("")?;
    slot.set(42);
    handle.write_to_disk().map_err(|err| err.to_string())?;
    let content = fs::read_to_string(handle.path()).map_err(|err| err.to_string())?;
    if !content.contains("speed = 10") {
        return Err(format!("live value not clamped: {content}"));
    }
    handle.reload_from_disk().map_err(|err| err.to_string())?;
    if slot.get() != 10 {
        return Err(format!("expected 10 after reload, got {}", slot.get()));
    }
    Ok(())
}

#[test]
fn legacy_alias_migrates_into_the_canonical_key() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    fs::write(dir.path().join("legacy.toml"), "[general]\nold_speed = 15\n")
        .map_err(|err| err.to_string())?;
    let slot = Slot::new(5_i32);
    let schema = schema_in(&dir, "legacy", ["Legacy test config"]).category(
        CategorySpec::new("general", ["General settings"]).property(
            PropertySpec::new("speed", ["Speed limit"], slot_binding(&slot))
                .range_int(0, 10)
                .previous("general.old_speed"),
        ),
    );
    let handle = register(schema).map_err(|err| err.to_string())?;
    if slot.get() != 10 {
        return Err(format!("expected migrated clamp to 10, got {}", slot.get()));
    }
    let content = fs::read_to_string(handle.path()).map_err(|err| err.to_string())?;
    if !content.contains("speed = 10") {
        return Err(format!("canonical key missing: {content}"));
    }
    // The alias carries no comment, so the write-back prune removes it.
    if content.contains("old_speed") {
        return Err(format!("legacy key survived write-back: {content}"));
    }
    Ok(())
}

#[test]
fn list_elements_validate_individually() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    fs::write(dir.path().join("lists.toml"), "[general]\nlevels = [1, 99, -5, 7]\n")
        .map_err(|err| err.to_string())?;
    let slot = Slot::new(vec![3_i32]);
    let schema = schema_in(&dir, "lists", ["List test config"]).category(
        CategorySpec::new("general", ["General settings"]).property(
            PropertySpec::new("levels", ["Allowed levels"], slot_list_binding(&slot))
                .range_int(0, 10)
                .blacklist(["7"]),
        ),
    );
    let _handle = register(schema).map_err(|err| err.to_string())?;
    // 99 clamps to 10, -5 clamps to 0, the blacklisted 7 is dropped.
    if slot.get() != vec![1, 10, 0] {
        return Err(format!("unexpected list: {:?}", slot.get()));
    }
    Ok(())
}

#[test]
fn synthesized_comment_lists_range_and_default() -> TestResult {
    let (_dir, _slot, handle) = speed_fixture("")?;
    let property = &handle.categories()[0].properties()[0];
    let expected = " Speed limit\n Min: 0\n Max: 10\n Default: 5";
    if property.comment() != expected {
        return Err(format!("unexpected comment: {:?}", property.comment()));
    }
    let content = fs::read_to_string(handle.path()).map_err(|err| err.to_string())?;
    if !content.contains("# Speed limit\n# Min: 0\n# Max: 10\n# Default: 5\nspeed = 5") {
        return Err(format!("comment not rendered above key: {content}"));
    }
    Ok(())
}

#[test]
fn language_keys_follow_the_schema_identifier() -> TestResult {
    let (_dir, _slot, handle) = speed_fixture("")?;
    let category = &handle.categories()[0];
    if category.language_key() != "speed.config.general" {
        return Err(format!("unexpected category key: {}", category.language_key()));
    }
    let property = &category.properties()[0];
    if property.language_key() != "speed.config.general.speed" {
        return Err(format!("unexpected property key: {}", property.language_key()));
    }
    Ok(())
}
