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

//! # Qi Context Module
//!
//! Two contexts flow through a validation run:
//!
//! - [`QiRunContext`]: built once per run and shared read-only by the
//!   orchestrator and every manager. It carries the reflection source, the
//!   resolved override decisions and the run switches.
//! - [`QiExecutionContext`]: handed to every validator call. It exposes the
//!   unit store and the single diagnostics sink of the run.

use std::rc::Rc;

use crate::catalog::{QiReflectionSource, QiTypeId};
use crate::config::QiRunConfig;
use crate::diagnostics::{QiLogArea, QiLogCache, QiLogEntry, QiLogSeverity};
use crate::errors::Result;
use crate::overrides::QiOverrideConfig;
use crate::record::QiObjectRef;
use crate::store::QiUnitStore;

/// Number of work items validated per step unless configured otherwise.
pub const QI_DEFAULT_STEP_SIZE: usize = 1;

/// Read-only state shared by everything taking part in one run.
#[derive(Clone)]
pub struct QiRunContext {
    source: Rc<dyn QiReflectionSource>,
    overrides: QiOverrideConfig,
    include_test_types: bool,
    step_size: usize,
}

impl QiRunContext {
    pub fn new(source: Rc<dyn QiReflectionSource>) -> Self {
        QiRunContext {
            source,
            overrides: QiOverrideConfig::new(),
            include_test_types: false,
            step_size: QI_DEFAULT_STEP_SIZE,
        }
    }

    /// Builds the context described by a run configuration. Override symbols
    /// are resolved against `source`.
    pub fn from_config(source: Rc<dyn QiReflectionSource>, config: &QiRunConfig) -> Result<Self> {
        let overrides = QiOverrideConfig::load(config)?;
        Ok(Self::new(source)
            .with_overrides(overrides)
            .include_test_types(config.include_test_types)
            .step_size(config.step_size))
    }

    pub fn with_overrides(mut self, mut overrides: QiOverrideConfig) -> Self {
        overrides.resolve(self.source.as_ref());
        self.overrides = overrides;
        self
    }

    /// Lets validators and types carrying the test-only marker take part.
    pub fn include_test_types(mut self, include: bool) -> Self {
        self.include_test_types = include;
        self
    }

    /// Items validated per step. Values below one are raised to one.
    pub fn step_size(mut self, step_size: usize) -> Self {
        self.step_size = step_size.max(1);
        self
    }

    pub fn source(&self) -> &dyn QiReflectionSource {
        self.source.as_ref()
    }

    pub fn shared_source(&self) -> Rc<dyn QiReflectionSource> {
        Rc::clone(&self.source)
    }

    pub fn overrides(&self) -> &QiOverrideConfig {
        &self.overrides
    }

    pub fn includes_test_types(&self) -> bool {
        self.include_test_types
    }

    pub fn step(&self) -> usize {
        self.step_size
    }
}

impl std::fmt::Debug for QiRunContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QiRunContext")
            .field("types", &self.source.types().len())
            .field("overrides", &self.overrides)
            .field("include_test_types", &self.include_test_types)
            .field("step_size", &self.step_size)
            .finish()
    }
}

/// Mutable context passed to validators during search and validation.
pub struct QiExecutionContext<'a> {
    source: &'a dyn QiReflectionSource,
    store: &'a dyn QiUnitStore,
    log: &'a mut QiLogCache,
    area: QiLogArea,
    unit_path: Option<&'a str>,
    include_test_types: bool,
    declared_assets: Vec<String>,
}

impl<'a> QiExecutionContext<'a> {
    pub fn new(
        source: &'a dyn QiReflectionSource,
        store: &'a dyn QiUnitStore,
        log: &'a mut QiLogCache,
        area: QiLogArea,
    ) -> Self {
        QiExecutionContext {
            source,
            store,
            log,
            area,
            unit_path: None,
            include_test_types: false,
            declared_assets: Vec::new(),
        }
    }

    /// Scopes the context to the unit at `path`.
    pub fn in_unit(mut self, path: &'a str) -> Self {
        self.unit_path = Some(path);
        self
    }

    /// Lets validators that scan the type catalog themselves see test-only
    /// types. Mirrors [`QiRunContext::includes_test_types`].
    pub fn include_test_types(mut self, include: bool) -> Self {
        self.include_test_types = include;
        self
    }

    pub fn includes_test_types(&self) -> bool {
        self.include_test_types
    }

    pub fn source(&self) -> &'a dyn QiReflectionSource {
        self.source
    }

    pub fn store(&self) -> &'a dyn QiUnitStore {
        self.store
    }

    pub fn area(&self) -> QiLogArea {
        self.area
    }

    pub fn unit_path(&self) -> Option<&'a str> {
        self.unit_path
    }

    /// Appends a finished entry to the run's diagnostics.
    pub fn append(&mut self, entry: QiLogEntry) {
        self.log.append(entry);
    }

    /// Builds an entry pre-filled with this context's area and unit path. The
    /// entry is not appended; validators that buffer findings keep it.
    pub fn entry(
        &self,
        severity: QiLogSeverity,
        source: impl Into<String>,
        message: impl Into<String>,
    ) -> QiLogEntry {
        QiLogEntry::new(severity, source, message)
            .with_area(self.area)
            .in_unit(self.unit_path.unwrap_or_default())
    }

    pub fn info(&mut self, source: &str, message: impl Into<String>, object_path: &str) {
        let entry = self.entry(QiLogSeverity::Info, source, message).for_object(object_path);
        self.append(entry);
    }

    pub fn warning(&mut self, source: &str, message: impl Into<String>, object_path: &str) {
        let entry = self
            .entry(QiLogSeverity::Warning, source, message)
            .for_object(object_path);
        self.append(entry);
    }

    pub fn error(&mut self, source: &str, message: impl Into<String>, object_path: &str) {
        let entry = self.entry(QiLogSeverity::Error, source, message).for_object(object_path);
        self.append(entry);
    }

    pub fn find_instances(&self, ty: &QiTypeId) -> Result<Vec<QiObjectRef>> {
        self.store.find_instances(ty)
    }

    pub fn find_project_assets(&self, ty: &QiTypeId) -> Result<Vec<QiObjectRef>> {
        self.store.find_project_assets(ty)
    }

    pub fn load_asset(&self, path: &str) -> Result<Option<QiObjectRef>> {
        self.store.load_asset(path)
    }

    /// Declares an additional project asset to validate. Only honoured while
    /// the project asset phase is searching.
    pub fn declare_asset(&mut self, path: impl Into<String>) {
        self.declared_assets.push(path.into());
    }

    pub(crate) fn take_declared_assets(&mut self) -> Vec<String> {
        std::mem::take(&mut self.declared_assets)
    }

    pub fn entries_logged(&self) -> usize {
        self.log.len()
    }
}
