//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Qi.
//! The Qi project belongs to the Dunimd project team.

#[path = "../common/mod.rs"]
mod common;

use qix::{
    QiMarker, QiOverrideConfig, QiPluginCache, QiPluginDiscovery, QiPluginScope, QiRunContext,
    QiTypeId, QiTypeInfo, QiValidatorKind,
};

use common::*;

#[test]
fn test_plugin_cache_splits_scopes() {
    let context = QiRunContext::new(shared(instrumented_catalog()));

    let unit = QiPluginCache::new(&context, QiPluginScope::Unit);
    let cross = QiPluginCache::new(&context, QiPluginScope::CrossUnit);
    let project = QiPluginCache::new(&context, QiPluginScope::Project);

    assert_eq!(
        unit.symbols(),
        ["qi.required_field", "qi.asset_reference", RECORDING, COUNTER]
    );
    assert_eq!(cross.symbols(), ["qi.unique_instance"]);
    assert_eq!(project.symbols(), [TEXTURE_CHECK, "qi.asset_contract"]);
    assert!(unit.rejected().is_empty());
}

#[test]
fn test_plugin_cache_skips_disabled_plugins_without_constructing_them() {
    take_calls();
    let mut overrides = QiOverrideConfig::new();
    overrides.set_enabled(RECORDING, false);
    let context = QiRunContext::new(shared(instrumented_catalog())).with_overrides(overrides);

    let unit = QiPluginCache::new(&context, QiPluginScope::Unit);

    assert!(!unit.symbols().contains(&RECORDING));
    assert_eq!(calls_matching(&format!("{RECORDING}:construct")), 0);
}

#[test]
fn test_plugin_cache_test_only_plugins_need_debug_flag() {
    let source = shared(instrumented_catalog());

    let release = QiPluginCache::new(&QiRunContext::new(source.clone()), QiPluginScope::Unit);
    assert!(!release.symbols().contains(&DEBUG_ONLY));

    let debug = QiPluginCache::new(
        &QiRunContext::new(source).include_test_types(true),
        QiPluginScope::Unit,
    );
    assert!(debug.symbols().contains(&DEBUG_ONLY));
}

#[test]
fn test_plugin_discovery_rejects_marker_misuse() {
    let mut catalog = game_catalog();
    catalog
        .register_all([
            // two symbols
            plugin_type("tests.TwoSymbols", QiValidatorKind::Object, "a", recording_factory)
                .with_marker(QiMarker::symbol("b")),
            // two kinds
            plugin_type("tests.TwoKinds", QiValidatorKind::Object, "c", recording_factory)
                .with_marker(QiValidatorKind::Field.marker())
                .with_base(QiValidatorKind::Field.base()),
            // no constructor
            QiTypeInfo::new("tests.NoFactory", "tests")
                .with_base(QiValidatorKind::Object.base())
                .with_marker(QiValidatorKind::Object.marker())
                .with_marker(QiMarker::symbol("d")),
        ])
        .unwrap();
    let context = QiRunContext::new(shared(catalog));

    // field-kind candidates are discovered before object-kind ones
    let discovery = QiPluginDiscovery::run(&context, QiPluginScope::Unit);
    let rejected: Vec<&QiTypeId> = discovery.rejected.iter().map(|r| &r.type_id).collect();

    assert_eq!(
        rejected,
        [
            &QiTypeId::from("tests.TwoKinds"),
            &QiTypeId::from("tests.TwoSymbols"),
            &QiTypeId::from("tests.NoFactory"),
        ]
    );
    assert!(discovery.rejected[0].reason.contains("kind"));
    assert!(discovery.rejected[1].reason.contains("symbol"));

    let cache = QiPluginCache::new(&context, QiPluginScope::Unit);
    assert_eq!(cache.rejected().len(), 3);
    assert!(!cache.symbols().contains(&"a"));
}

#[test]
fn test_plugin_cache_records_kinds() {
    let context = QiRunContext::new(shared(instrumented_catalog()));
    let unit = QiPluginCache::new(&context, QiPluginScope::Unit);

    let kinds: Vec<QiValidatorKind> = unit.iter().map(|p| p.kind).collect();
    assert_eq!(
        kinds,
        [
            QiValidatorKind::Field,
            QiValidatorKind::Field,
            QiValidatorKind::Object,
            QiValidatorKind::UnitCollection,
        ]
    );
    assert_eq!(unit.get(2).unwrap().name(), RECORDING);
}
