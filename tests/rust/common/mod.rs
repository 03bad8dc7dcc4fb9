//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Qi.
//! The Qi project belongs to the Dunimd project team.

//! Shared fixtures: a small game catalog, instrumented test plugins and a
//! three-unit store.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use qix::validators::{asset_reference, required, unique_instance};
use qix::{
    QiError, QiExecutionContext, QiLogArea, QiLogCache, QiMarker, QiMemoryUnitStore, QiObjectRef,
    QiReflectionSource, QiTypeCatalog, QiTypeId, QiTypeInfo, QiUnitStore, QiValidationTarget,
    QiValidator, QiValidatorFactory, QiValidatorKind, QiValidatorTarget, Result,
};
use serde_json::json;

pub const PROP: &str = "game.Prop";
pub const LIGHT: &str = "game.Light";
pub const SPAWN: &str = "game.SpawnPoint";
pub const TEXTURE: &str = "game.Texture";

pub const RECORDING: &str = "test.recording";
pub const FAILING: &str = "test.failing";
pub const COUNTER: &str = "test.prop_counter";
pub const DEBUG_ONLY: &str = "test.debug_only";
pub const TEXTURE_CHECK: &str = "test.texture_check";
pub const CROSS_RECORDER: &str = "test.cross_recorder";

thread_local! {
    static CALLS: RefCell<Vec<String>> = RefCell::new(Vec::new());
}

pub fn record_call(call: impl Into<String>) {
    CALLS.with(|calls| calls.borrow_mut().push(call.into()));
}

pub fn take_calls() -> Vec<String> {
    CALLS.with(|calls| std::mem::take(&mut *calls.borrow_mut()))
}

pub fn calls_matching(prefix: &str) -> usize {
    CALLS.with(|calls| calls.borrow().iter().filter(|c| c.starts_with(prefix)).count())
}

pub fn plugin_type(id: &str, kind: QiValidatorKind, symbol: &str, factory: QiValidatorFactory) -> QiTypeInfo {
    QiTypeInfo::new(id, "tests")
        .with_base(kind.base())
        .with_marker(kind.marker())
        .with_marker(QiMarker::symbol(symbol))
        .with_factory(factory)
}

/// Logs one info entry per prop it sees.
#[derive(Debug, Default)]
pub struct RecordingPropValidator;

impl QiValidator for RecordingPropValidator {
    fn name(&self) -> &str {
        RECORDING
    }

    fn target(&self) -> QiValidatorTarget {
        QiValidatorTarget::Type(QiTypeId::from(PROP))
    }

    fn validate(&mut self, target: QiValidationTarget<'_>, ctx: &mut QiExecutionContext<'_>) -> Result<()> {
        if let QiValidationTarget::Object(object) = target {
            record_call(format!("{RECORDING}:validate:{}", object.path));
            ctx.info(RECORDING, format!("checked {}", object.path), &object.path);
        }
        Ok(())
    }
}

pub fn recording_factory() -> Box<dyn QiValidator> {
    record_call(format!("{RECORDING}:construct"));
    Box::new(RecordingPropValidator)
}

/// Fails on props whose payload sets `fail`.
#[derive(Debug, Default)]
pub struct FailingPropValidator;

impl QiValidator for FailingPropValidator {
    fn name(&self) -> &str {
        FAILING
    }

    fn target(&self) -> QiValidatorTarget {
        QiValidatorTarget::Type(QiTypeId::from(PROP))
    }

    fn validate(&mut self, target: QiValidationTarget<'_>, _ctx: &mut QiExecutionContext<'_>) -> Result<()> {
        match target {
            QiValidationTarget::Object(object) if object.field("fail") == Some(&json!(true)) => {
                Err(QiError::internal(format!("cannot inspect {}", object.path)))
            }
            _ => Ok(()),
        }
    }
}

pub fn failing_factory() -> Box<dyn QiValidator> {
    Box::new(FailingPropValidator)
}

/// Counts props during search and reports the count as one aggregate item.
#[derive(Debug, Default)]
pub struct PropCounter {
    seen: usize,
}

impl QiValidator for PropCounter {
    fn name(&self) -> &str {
        COUNTER
    }

    fn target(&self) -> QiValidatorTarget {
        QiValidatorTarget::Aggregate
    }

    fn search(&mut self, ctx: &mut QiExecutionContext<'_>) -> Result<()> {
        self.seen += ctx.find_instances(&QiTypeId::from(PROP))?.len();
        record_call(format!("{COUNTER}:search"));
        Ok(())
    }

    fn validate(&mut self, target: QiValidationTarget<'_>, ctx: &mut QiExecutionContext<'_>) -> Result<()> {
        if let QiValidationTarget::Aggregate = target {
            record_call(format!("{COUNTER}:validate"));
            let entry = ctx.entry(qix::QiLogSeverity::Info, COUNTER, format!("{} props", self.seen));
            ctx.append(entry);
        }
        Ok(())
    }
}

pub fn counter_factory() -> Box<dyn QiValidator> {
    Box::new(PropCounter::default())
}

/// Only loaded when test types are included.
#[derive(Debug, Default)]
pub struct DebugOnlyValidator;

impl QiValidator for DebugOnlyValidator {
    fn name(&self) -> &str {
        DEBUG_ONLY
    }

    fn target(&self) -> QiValidatorTarget {
        QiValidatorTarget::Type(QiTypeId::from(PROP))
    }

    fn validate(&mut self, _target: QiValidationTarget<'_>, _ctx: &mut QiExecutionContext<'_>) -> Result<()> {
        record_call(format!("{DEBUG_ONLY}:validate"));
        Ok(())
    }
}

pub fn debug_only_factory() -> Box<dyn QiValidator> {
    Box::new(DebugOnlyValidator)
}

/// Project-routed check warning about textures without a size.
#[derive(Debug, Default)]
pub struct TextureCheck;

impl QiValidator for TextureCheck {
    fn name(&self) -> &str {
        TEXTURE_CHECK
    }

    fn target(&self) -> QiValidatorTarget {
        QiValidatorTarget::Type(QiTypeId::from(TEXTURE))
    }

    fn validate(&mut self, target: QiValidationTarget<'_>, ctx: &mut QiExecutionContext<'_>) -> Result<()> {
        if let QiValidationTarget::Object(object) = target {
            record_call(format!("{TEXTURE_CHECK}:validate:{}", object.path));
            if object.field("size").is_none() {
                ctx.warning(TEXTURE_CHECK, "texture has no size", &object.path);
            }
        }
        Ok(())
    }
}

pub fn texture_check_factory() -> Box<dyn QiValidator> {
    Box::new(TextureCheck)
}

/// Cross-unit plugin that only records when it is searched and validated.
#[derive(Debug, Default)]
pub struct CrossRecorder;

impl QiValidator for CrossRecorder {
    fn name(&self) -> &str {
        CROSS_RECORDER
    }

    fn target(&self) -> QiValidatorTarget {
        QiValidatorTarget::Aggregate
    }

    fn search(&mut self, ctx: &mut QiExecutionContext<'_>) -> Result<()> {
        record_call(format!("{CROSS_RECORDER}:search:{}", ctx.unit_path().unwrap_or_default()));
        Ok(())
    }

    fn validate(&mut self, _target: QiValidationTarget<'_>, _ctx: &mut QiExecutionContext<'_>) -> Result<()> {
        record_call(format!("{CROSS_RECORDER}:validate"));
        Ok(())
    }
}

pub fn cross_recorder_factory() -> Box<dyn QiValidator> {
    Box::new(CrossRecorder)
}

/// Game object types plus the bundled validators.
pub fn game_catalog() -> QiTypeCatalog {
    let mut catalog = QiTypeCatalog::with_builtin_validators().unwrap();
    catalog
        .register_all([
            QiTypeInfo::object(PROP, "game").with_field("mesh", vec![asset_reference::marker()]),
            QiTypeInfo::object(LIGHT, "game").with_field("name", vec![required::marker()]),
            QiTypeInfo::object(SPAWN, "game").with_marker(unique_instance::marker()),
            QiTypeInfo::object(TEXTURE, "game"),
        ])
        .unwrap();
    catalog
}

/// [`game_catalog`] plus the recording, counter, debug-only and texture plugins.
pub fn instrumented_catalog() -> QiTypeCatalog {
    let mut catalog = game_catalog();
    catalog
        .register_all([
            plugin_type("tests.Recording", QiValidatorKind::Object, RECORDING, recording_factory),
            plugin_type("tests.PropCounter", QiValidatorKind::UnitCollection, COUNTER, counter_factory),
            plugin_type("tests.DebugOnly", QiValidatorKind::Object, DEBUG_ONLY, debug_only_factory)
                .with_marker(QiMarker::test_only()),
            plugin_type("tests.TextureCheck", QiValidatorKind::Object, TEXTURE_CHECK, texture_check_factory)
                .with_marker(QiMarker::project_route()),
        ])
        .unwrap();
    catalog
}

pub fn shared(catalog: QiTypeCatalog) -> Rc<dyn QiReflectionSource> {
    Rc::new(catalog)
}

pub fn prop(path: &str) -> QiObjectRef {
    QiObjectRef::new(path, PROP, json!({"mesh": "meshes/crate.mesh"}))
}

pub fn spawn(path: &str) -> QiObjectRef {
    QiObjectRef::new(path, SPAWN, json!({}))
}

/// Three units holding 1, 2 and 0 spawn points, with a few props and lights,
/// and two project assets.
pub fn three_unit_store() -> QiMemoryUnitStore {
    let mut store = QiMemoryUnitStore::new();
    store
        .add_unit("levels/a.unit")
        .add_unit("levels/b.unit")
        .add_unit("levels/c.unit")
        .add_asset(QiObjectRef::new("meshes/crate.mesh", "game.Mesh", json!({})))
        .add_asset(QiObjectRef::new("textures/wall.tex", TEXTURE, json!({"size": 512})));

    store.add_object("levels/a.unit", spawn("A/Spawn")).unwrap();
    store.add_object("levels/a.unit", prop("A/Crate1")).unwrap();
    store.add_object("levels/a.unit", prop("A/Crate2")).unwrap();

    store.add_object("levels/b.unit", spawn("B/Spawn1")).unwrap();
    store.add_object("levels/b.unit", spawn("B/Spawn2")).unwrap();
    store
        .add_object("levels/b.unit", QiObjectRef::new("B/Lamp", LIGHT, json!({"name": ""})))
        .unwrap();

    store.add_object("levels/c.unit", prop("C/Crate")).unwrap();
    store
}

/// Execution context over `store`, opened on `unit` when given.
pub fn unit_context<'a>(
    source: &'a dyn QiReflectionSource,
    store: &'a mut QiMemoryUnitStore,
    log: &'a mut QiLogCache,
    unit: &'a str,
) -> QiExecutionContext<'a> {
    store.open_unit(unit).unwrap();
    QiExecutionContext::new(source, &*store, log, QiLogArea::Unit).in_unit(unit)
}
