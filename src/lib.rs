//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Qi.
//! The Qi project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

//! # Qi Core Library
//!
//! This is the main library entry point for the Qi validation framework. Qi
//! discovers validator plugins from a type catalog, applies them to the
//! objects of a host's units and project assets, and collects the findings in
//! an ordered diagnostics log. A run can finish in one call or be advanced a
//! bounded slice at a time from a host tick, with identical results.
//!
//! ## Module Overview
//!
//! - **catalog**: Type metadata, markers and the reflection source trait
//! - **registry**: Marker-filtered, ordered type sets with ignore rules
//! - **record**: Handles to objects owned by the unit store
//! - **store**: Unit selection modes and the unit store trait
//! - **plugin**: Validator contract, plugin discovery and plugin caches
//! - **manager**: Unit, project and cross-unit validator managers
//! - **orchestrator**: Phase sequencing and incremental runs
//! - **diagnostics**: Log entries and the append-only log cache
//! - **overrides**: Per-validator enable/disable decisions
//! - **config**: Serializable run configuration
//! - **context**: Per-run and per-call execution contexts
//! - **validators**: Validators bundled with Qi
//! - **ci**: Batch entry points producing pass/fail outcomes
//!
//! ## Feature Flags
//!
//! - `yaml`: YAML run configuration files
//! - `full`: Enables all features
//!
//! ## Quick Start
//!
//! ```rust
//! use std::rc::Rc;
//!
//! use qix::{QiMemoryUnitStore, QiObjectRef, QiOrchestrator, QiRunConfig, QiTypeCatalog, QiTypeInfo};
//! use qix::validators::required;
//! use serde_json::json;
//!
//! let mut catalog = QiTypeCatalog::with_builtin_validators().unwrap();
//! catalog
//!     .register(QiTypeInfo::object("Door", "game").with_field("target", vec![required::marker()]))
//!     .unwrap();
//!
//! let mut store = QiMemoryUnitStore::new();
//! store.add_unit("levels/a.unit");
//! store
//!     .add_object("levels/a.unit", QiObjectRef::new("Hall/Door", "Door", json!({"target": ""})))
//!     .unwrap();
//!
//! let mut orchestrator = QiOrchestrator::from_config(store, Rc::new(catalog), &QiRunConfig::new()).unwrap();
//! while orchestrator.continue_running().unwrap() {}
//! assert!(orchestrator.log_cache().has_errors());
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return `Result<T, QiError>`. Errors raised by
//! validators propagate out of the orchestrator unchanged; [`ci`] turns them
//! into failed outcomes.

#![allow(non_snake_case)]

pub mod errors;
pub mod catalog;
pub mod registry;
pub mod record;
pub mod store;
pub mod diagnostics;
pub mod overrides;
pub mod config;
pub mod context;
pub mod plugin;
pub mod manager;
pub mod orchestrator;
pub mod validators;
pub mod ci;

pub use errors::{QiError, Result};
pub use catalog::{QiFieldInfo, QiMarker, QiReflectionSource, QiTypeCatalog, QiTypeId, QiTypeInfo};
pub use registry::QiTypeRegistry;
pub use record::QiObjectRef;
pub use store::{QiMemoryUnitStore, QiUnitMode, QiUnitStore};
pub use diagnostics::{QiLogArea, QiLogCache, QiLogEntry, QiLogSeverity, QiLogSummary};
pub use overrides::{QiOverrideConfig, QiOverrideEntry, QiOverrideStore, QiStaticOverrideStore};
pub use config::QiRunConfig;
pub use context::{QiExecutionContext, QiRunContext, QI_DEFAULT_STEP_SIZE};
pub use plugin::{
    QiLoadedValidator, QiPluginCache, QiPluginDiscovery, QiPluginRejection, QiPluginScope,
    QiValidationTarget, QiValidator, QiValidatorFactory, QiValidatorKind, QiValidatorTarget,
};
pub use manager::{
    QiCrossUnitValidatorManager, QiManagerState, QiProgress, QiProjectValidatorManager,
    QiUnitValidatorManager, QiValidatorManager,
};
pub use orchestrator::{QiOrchestrator, QiPhase};
pub use ci::{run_for_ci, validate_for_ci, QiCiOutcome};
