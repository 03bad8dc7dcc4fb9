//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Qi.
//! The Qi project belongs to the Dunimd project team.

#[path = "../common/mod.rs"]
mod common;

use qix::{
    run_for_ci, validate_for_ci, QiError, QiLogArea, QiLogEntry, QiLogSeverity, QiMarker,
    QiMemoryUnitStore, QiObjectRef, QiOrchestrator, QiOverrideConfig, QiPhase, QiRunConfig,
    QiRunContext, QiTypeCatalog, QiTypeInfo, QiValidatorKind,
};
use serde_json::json;

use common::*;

fn full_orchestrator(step_size: usize) -> QiOrchestrator<QiMemoryUnitStore> {
    let context = QiRunContext::new(shared(instrumented_catalog())).step_size(step_size);
    QiOrchestrator::configure(three_unit_store(), context, "all", true, true).unwrap()
}

fn entries_from(source: &str, entries: &[QiLogEntry]) -> Vec<QiLogEntry> {
    entries.iter().filter(|e| e.source == source).cloned().collect()
}

#[test]
fn test_orchestrator_incremental_run_matches_full_run() {
    for step_size in [1, 2, 5] {
        let mut full = full_orchestrator(step_size);
        full.run().unwrap();
        assert!(full.is_complete());
        assert!(!full.is_running());

        let mut incremental = full_orchestrator(step_size);
        let mut ticks = 0;
        while incremental.continue_running().unwrap() {
            ticks += 1;
            assert!(incremental.is_running());
            assert!(ticks < 1_000, "run did not converge");
        }

        assert!(incremental.is_complete());
        assert!(!incremental.is_running());
        assert!(full.log_cache().has_entries());
        assert_eq!(full.log_cache().entries(), incremental.log_cache().entries());
    }
}

#[test]
fn test_orchestrator_cross_unit_commit_after_all_units() {
    let context = QiRunContext::new(shared(game_catalog()));
    let mut orchestrator =
        QiOrchestrator::configure(three_unit_store(), context, "all", false, true).unwrap();

    orchestrator.run().unwrap();

    let entries = orchestrator.log_cache().entries();
    let unique = entries_from("qi.unique_instance", entries);
    let warnings: Vec<&QiLogEntry> = unique
        .iter()
        .filter(|e| e.severity == QiLogSeverity::Warning)
        .collect();
    let errors: Vec<&QiLogEntry> = unique
        .iter()
        .filter(|e| e.severity == QiLogSeverity::Error)
        .collect();
    assert_eq!(warnings.len(), 3);
    assert_eq!(errors.len(), 1);
    assert_eq!(unique.last().unwrap().severity, QiLogSeverity::Error);
    assert!(errors[0].message.contains("3 instances"));

    let object_paths: Vec<&str> = warnings.iter().map(|e| e.object_path.as_str()).collect();
    assert_eq!(object_paths, ["A/Spawn", "B/Spawn1", "B/Spawn2"]);
    assert_eq!(warnings[0].unit_path, "levels/a.unit");
    assert_eq!(warnings[1].unit_path, "levels/b.unit");

    // every per-unit entry precedes the committed cross-unit entries
    let first_unique = entries
        .iter()
        .position(|e| e.source == "qi.unique_instance")
        .unwrap();
    assert!(entries[..first_unique].iter().any(|e| e.source == "qi.required_field"));
    assert!(entries[first_unique..]
        .iter()
        .all(|e| e.source == "qi.unique_instance"));
}

#[test]
fn test_orchestrator_single_instance_commits_nothing() {
    let context = QiRunContext::new(shared(game_catalog()));
    let mut store = QiMemoryUnitStore::new();
    store.add_unit("levels/a.unit").add_unit("levels/b.unit");
    store.add_object("levels/a.unit", spawn("Spawn")).unwrap();
    let mut orchestrator = QiOrchestrator::configure(store, context, "all", false, true).unwrap();

    orchestrator.run().unwrap();

    assert!(entries_from("qi.unique_instance", orchestrator.log_cache().entries()).is_empty());
}

#[test]
fn test_orchestrator_disabled_plugin_is_reported_not_run() {
    take_calls();
    let mut overrides = QiOverrideConfig::new();
    overrides.set_enabled(RECORDING, false);
    let context = QiRunContext::new(shared(instrumented_catalog())).with_overrides(overrides);
    let mut orchestrator =
        QiOrchestrator::configure(three_unit_store(), context, "all", true, true).unwrap();

    let first = orchestrator.log_cache().get(0).unwrap().clone();
    assert_eq!(orchestrator.log_cache().len(), 1);
    assert_eq!(first.severity, QiLogSeverity::Warning);
    assert_eq!(first.source, "tests.Recording");
    assert!(first.message.contains(RECORDING));

    orchestrator.run().unwrap();

    assert_eq!(calls_matching(RECORDING), 0);
    assert!(entries_from(RECORDING, orchestrator.log_cache().entries()).is_empty());
    assert_eq!(
        orchestrator
            .log_cache()
            .iter()
            .filter(|e| e.message.contains(RECORDING))
            .count(),
        1
    );
}

#[test]
fn test_orchestrator_phases_move_forward() {
    let mut orchestrator = full_orchestrator(1);
    assert_eq!(orchestrator.phase(), QiPhase::ProjectAssets);

    let mut phases = vec![orchestrator.phase()];
    while orchestrator.continue_running().unwrap() {
        if phases.last() != Some(&orchestrator.phase()) {
            phases.push(orchestrator.phase());
        }
    }
    if phases.last() != Some(&orchestrator.phase()) {
        phases.push(orchestrator.phase());
    }

    assert_eq!(
        phases,
        [
            QiPhase::ProjectAssets,
            QiPhase::PerUnit(0),
            QiPhase::PerUnit(1),
            QiPhase::PerUnit(2),
            QiPhase::CrossUnit,
        ]
    );
    assert_eq!(
        orchestrator.store().opened_units(),
        ["levels/a.unit", "levels/b.unit", "levels/c.unit"]
    );
    assert_eq!(orchestrator.progress_message(), "Validation complete");
}

#[test]
fn test_orchestrator_progress_is_phase_relative() {
    let mut orchestrator = full_orchestrator(1);
    let mut readings = Vec::new();
    while orchestrator.continue_running().unwrap() {
        let progress = orchestrator.progress();
        assert!((0.0..=1.0).contains(&progress));
        readings.push((orchestrator.phase(), progress));
    }

    // the project phase completes before the first unit starts from zero
    let first_unit = readings
        .iter()
        .position(|(phase, _)| *phase == QiPhase::PerUnit(0))
        .unwrap();
    assert!(first_unit > 0);
    assert!(readings[first_unit].1 < 1.0);
    assert_eq!(orchestrator.progress(), 1.0);
}

#[test]
fn test_orchestrator_without_optional_phases() {
    let context = QiRunContext::new(shared(instrumented_catalog()));
    let mut orchestrator = QiOrchestrator::new(three_unit_store(), context, "build").unwrap();

    assert_eq!(orchestrator.progress(), 1.0);
    orchestrator.run().unwrap();

    assert_eq!(orchestrator.phase(), QiPhase::CrossUnit);
    assert_eq!(orchestrator.progress(), 1.0);
    assert!(orchestrator
        .log_cache()
        .iter()
        .all(|e| e.source != "qi.unique_instance" && e.area != QiLogArea::Project));
}

#[test]
fn test_orchestrator_with_no_units() {
    let context = QiRunContext::new(shared(instrumented_catalog()));
    let mut orchestrator =
        QiOrchestrator::configure(three_unit_store(), context, "none", true, true).unwrap();
    assert!(orchestrator.units().is_empty());

    while orchestrator.continue_running().unwrap() {}

    assert!(orchestrator.is_complete());
    assert!(orchestrator.store().opened_units().is_empty());
}

#[test]
fn test_orchestrator_rejects_invalid_unit_mode() {
    let context = QiRunContext::new(shared(game_catalog()));
    let err = QiOrchestrator::new(three_unit_store(), context, "everything").unwrap_err();
    assert!(matches!(err, QiError::Configuration { .. }));
}

#[test]
fn test_orchestrator_cannot_enable_phases_after_start() {
    let context = QiRunContext::new(shared(game_catalog()));
    let mut orchestrator = QiOrchestrator::new(three_unit_store(), context, "all").unwrap();
    orchestrator.continue_running().unwrap();

    let err = orchestrator.enable_cross_unit_validation().unwrap_err();
    assert!(matches!(err, QiError::Configuration { .. }));
    assert!(matches!(orchestrator.run(), Err(QiError::Orchestrator { .. })));
}

#[test]
fn test_orchestrator_logs_plugin_rejections() {
    let mut catalog = game_catalog();
    catalog
        .register(
            QiTypeInfo::new("tests.Unnamed", "tests")
                .with_base(QiValidatorKind::Object.base())
                .with_marker(QiValidatorKind::Object.marker())
                .with_factory(recording_factory),
        )
        .unwrap();
    let context = QiRunContext::new(shared(catalog));
    let orchestrator = QiOrchestrator::new(three_unit_store(), context, "all").unwrap();

    let entries = orchestrator.log_cache().entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].severity, QiLogSeverity::Warning);
    assert!(entries[0].message.contains("tests.Unnamed"));
}

#[test]
fn test_orchestrator_logs_each_rejected_type_once() {
    let mut catalog = game_catalog();
    catalog
        .register(
            QiTypeInfo::new("tests.Confused", "tests")
                .with_base(QiValidatorKind::Object.base())
                .with_base(QiValidatorKind::CrossUnit.base())
                .with_marker(QiValidatorKind::Object.marker())
                .with_marker(QiValidatorKind::CrossUnit.marker())
                .with_marker(QiMarker::symbol("test.confused"))
                .with_factory(recording_factory),
        )
        .unwrap();
    let context = QiRunContext::new(shared(catalog));
    let orchestrator =
        QiOrchestrator::configure(three_unit_store(), context, "all", true, true).unwrap();

    let entries = orchestrator.log_cache().entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].severity, QiLogSeverity::Warning);
    assert_eq!(entries[0].source, "tests.Confused");
    assert!(entries[0].message.contains("kind marker"));
}

#[test]
fn test_orchestrator_cross_unit_validates_after_every_unit_search() {
    for incremental in [false, true] {
        take_calls();
        let mut catalog = game_catalog();
        catalog
            .register(plugin_type(
                "tests.CrossRecorder",
                QiValidatorKind::CrossUnit,
                CROSS_RECORDER,
                cross_recorder_factory,
            ))
            .unwrap();
        let context = QiRunContext::new(shared(catalog)).step_size(1);
        let mut orchestrator =
            QiOrchestrator::configure(three_unit_store(), context, "all", false, true).unwrap();

        if incremental {
            while orchestrator.continue_running().unwrap() {}
        } else {
            orchestrator.run().unwrap();
        }

        let calls: Vec<String> = take_calls()
            .into_iter()
            .filter(|call| call.starts_with(CROSS_RECORDER))
            .collect();
        assert_eq!(
            calls,
            [
                format!("{CROSS_RECORDER}:search:levels/a.unit"),
                format!("{CROSS_RECORDER}:search:levels/b.unit"),
                format!("{CROSS_RECORDER}:search:levels/c.unit"),
                format!("{CROSS_RECORDER}:validate"),
            ],
            "incremental={incremental}"
        );
    }
}

#[test]
fn test_orchestrator_project_assets_reach_unit_plugins() {
    let mut store = three_unit_store();
    store.add_asset(QiObjectRef::new("prefabs/lamp.prefab", LIGHT, json!({"name": ""})));
    let context = QiRunContext::new(shared(game_catalog()));
    let mut orchestrator = QiOrchestrator::configure(store, context, "none", true, false).unwrap();

    orchestrator.run().unwrap();

    let log = orchestrator.log_cache();
    assert!(log.has_errors());
    let required = entries_from("qi.required_field", log.entries());
    assert_eq!(required.len(), 1);
    assert_eq!(required[0].object_path, "prefabs/lamp.prefab");
    assert_eq!(required[0].area, QiLogArea::Project);
}

#[test]
fn test_orchestrator_propagates_plugin_errors() {
    let mut catalog = game_catalog();
    catalog
        .register(plugin_type("tests.Failing", QiValidatorKind::Object, FAILING, failing_factory))
        .unwrap();
    let mut store = three_unit_store();
    store
        .add_object("levels/b.unit", QiObjectRef::new("B/Broken", PROP, json!({"fail": true})))
        .unwrap();
    let context = QiRunContext::new(shared(catalog));
    let mut orchestrator = QiOrchestrator::configure(store, context, "all", true, true).unwrap();

    let err = orchestrator.run().unwrap_err();

    assert!(matches!(err, QiError::Validator { ref validator, .. } if validator == FAILING));
    assert_eq!(orchestrator.phase(), QiPhase::PerUnit(1));
}

#[test]
fn test_ci_outcome_reports_errors() {
    let outcome = validate_for_ci(three_unit_store(), shared(game_catalog()), &QiRunConfig::new());

    assert!(!outcome.passed);
    assert!(outcome.message.contains("failed"));
    // the lamp's empty name and the duplicated spawn point
    assert_eq!(outcome.errors().count(), 2);
}

#[test]
fn test_ci_outcome_passes_clean_project() {
    let mut store = QiMemoryUnitStore::new();
    store.add_unit("levels/clean.unit");
    store
        .add_object("levels/clean.unit", QiObjectRef::new("Lamp", LIGHT, json!({"name": "Lamp"})))
        .unwrap();
    store.add_object("levels/clean.unit", spawn("Spawn")).unwrap();

    let outcome = validate_for_ci(store, shared(game_catalog()), &QiRunConfig::new());

    assert!(outcome.passed, "{}", outcome.message);
    assert!(outcome.entries.is_empty());
}

#[test]
fn test_ci_outcome_turns_errors_into_failures() {
    let outcome = validate_for_ci(
        three_unit_store(),
        shared(game_catalog()),
        &QiRunConfig::new().unit_mode("sideways"),
    );
    assert!(!outcome.passed);
    assert!(outcome.message.contains("sideways"));

    let mut catalog = QiTypeCatalog::new();
    catalog
        .register_all([
            QiTypeInfo::object(PROP, "game"),
            plugin_type("tests.Failing", QiValidatorKind::Object, FAILING, failing_factory),
        ])
        .unwrap();
    let mut store = QiMemoryUnitStore::new();
    store.add_unit("levels/bad.unit");
    store
        .add_object("levels/bad.unit", QiObjectRef::new("Broken", PROP, json!({"fail": true})))
        .unwrap();
    let mut orchestrator = QiOrchestrator::new(store, QiRunContext::new(shared(catalog)), "all").unwrap();

    let outcome = run_for_ci(&mut orchestrator);
    assert!(!outcome.passed);
    assert!(outcome.message.contains(FAILING));
}
