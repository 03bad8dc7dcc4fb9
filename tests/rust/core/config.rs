//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Qi.
//! The Qi project belongs to the Dunimd project team.

#[path = "../common/mod.rs"]
mod common;

use std::collections::BTreeMap;
use std::io::Write;

use qix::{
    QiError, QiOverrideConfig, QiReflectionSource, QiRunConfig, QiRunContext, QiStaticOverrideStore,
    QiTypeId,
};
use tempfile::NamedTempFile;

#[test]
fn test_config_defaults() {
    let config = QiRunConfig::default();
    assert_eq!(config.unit_mode, "all");
    assert!(config.project_assets);
    assert!(config.cross_unit);
    assert_eq!(config.step_size, 1);
    assert!(!config.include_test_types);
    assert!(config.overrides.is_empty());
}

#[test]
fn test_config_from_json_file() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(
        file,
        r#"{{"unit_mode": "build", "cross_unit": false, "step_size": 8, "overrides": {{"qi.unique_instance": false}}}}"#
    )
    .unwrap();

    let config = QiRunConfig::from_path(file.path()).unwrap();
    assert_eq!(config.unit_mode, "build");
    assert!(!config.cross_unit);
    assert!(config.project_assets);
    assert_eq!(config.step_size, 8);
    assert_eq!(config.overrides.get("qi.unique_instance"), Some(&false));
}

#[cfg(feature = "yaml")]
#[test]
fn test_config_from_yaml_file() {
    let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
    writeln!(file, "unit_mode: active").unwrap();
    writeln!(file, "include_test_types: true").unwrap();
    writeln!(file, "overrides:").unwrap();
    writeln!(file, "  qi.required_field: false").unwrap();

    let config = QiRunConfig::from_path(file.path()).unwrap();
    assert_eq!(config.unit_mode, "active");
    assert!(config.include_test_types);
    assert_eq!(config.overrides.get("qi.required_field"), Some(&false));
}

#[test]
fn test_config_unknown_extension_is_rejected() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "unit_mode = 'all'").unwrap();

    let err = QiRunConfig::from_path(file.path()).unwrap_err();
    assert!(matches!(err, QiError::Configuration { .. }));
}

#[test]
fn test_config_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = QiRunConfig::from_path(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, QiError::Io(_)));
}

#[test]
fn test_overrides_resolve_plugin_types() {
    let source = common::shared(common::game_catalog());
    let mut table = BTreeMap::new();
    table.insert("qi.unique_instance".to_string(), false);
    table.insert("vendor.unknown".to_string(), false);

    let mut overrides = QiOverrideConfig::load(&QiStaticOverrideStore::new(table)).unwrap();
    overrides.resolve(source.as_ref());

    let unique = overrides.get("qi.unique_instance").unwrap();
    assert_eq!(
        unique.resolved_type,
        Some(QiTypeId::from("qi.builtin.UniqueInstanceValidator"))
    );
    assert_eq!(unique.display_name(), "qi.builtin.UniqueInstanceValidator");
    assert_eq!(overrides.get("vendor.unknown").unwrap().display_name(), "vendor.unknown");
    assert!(overrides.is_enabled("qi.required_field"));
    assert_eq!(overrides.disabled().count(), 2);
}

#[test]
fn test_run_context_from_config() {
    let source = common::shared(common::game_catalog());
    let config = QiRunConfig::new()
        .step_size(0)
        .include_test_types(true)
        .override_validator("qi.asset_reference", false);

    let context = QiRunContext::from_config(source, &config).unwrap();

    assert_eq!(context.step(), 1);
    assert!(context.includes_test_types());
    assert!(!context.overrides().is_enabled("qi.asset_reference"));
    assert!(context.source().find(&QiTypeId::from(common::PROP)).is_some());
}
