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

//! # Qi Orchestrator Module
//!
//! [`QiOrchestrator`] sequences a validation run through three phases:
//!
//! 1. **ProjectAssets**: project assets and assets declared by project plugins
//! 2. **PerUnit**: every selected unit in order, each with a fresh unit manager,
//!    while the cross-unit manager buffers findings for that unit
//! 3. **CrossUnit**: the cross-unit plugins decide on what they buffered
//!
//! A run is driven either at once with [`QiOrchestrator::run`] or one bounded
//! slice at a time with [`QiOrchestrator::continue_running`], called once per
//! host tick. Both paths visit the same items in the same order and leave the
//! same entries in the log cache.
//!
//! Errors raised by plugins or by the store propagate out of both methods.
//! Turning them into a pass/fail result is left to [`crate::ci`].

use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

use crate::catalog::{QiMarker, QiReflectionSource, QiTypeId};
use crate::config::QiRunConfig;
use crate::context::{QiExecutionContext, QiRunContext};
use crate::diagnostics::{QiLogArea, QiLogCache, QiLogEntry};
use crate::errors::{QiError, Result};
use crate::manager::{
    QiCrossUnitValidatorManager, QiProjectValidatorManager, QiUnitValidatorManager,
    QiManagerState, QiValidatorManager,
};
use crate::plugin::{QiPluginDiscovery, QiPluginRejection, QiPluginScope};
use crate::registry::QiTypeRegistry;
use crate::store::{QiUnitMode, QiUnitStore};

/// Stage of a run. Phases only move forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QiPhase {
    ProjectAssets,
    PerUnit(usize),
    CrossUnit,
}

impl fmt::Display for QiPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QiPhase::ProjectAssets => f.write_str("project_assets"),
            QiPhase::PerUnit(index) => write!(f, "per_unit[{index}]"),
            QiPhase::CrossUnit => f.write_str("cross_unit"),
        }
    }
}

/// Builds a call context carrying the run's test-type setting. Takes the
/// orchestrator's fields separately so a manager can stay borrowed.
fn execution_context<'a, S: QiUnitStore>(
    context: &'a QiRunContext,
    store: &'a S,
    log: &'a mut QiLogCache,
    area: QiLogArea,
) -> QiExecutionContext<'a> {
    QiExecutionContext::new(context.source(), store, log, area)
        .include_test_types(context.includes_test_types())
}

/// Drives the managers of one validation run over a unit store.
pub struct QiOrchestrator<S: QiUnitStore> {
    store: S,
    context: QiRunContext,
    object_types: QiTypeRegistry,
    units: Vec<String>,
    phase: QiPhase,
    project: Option<QiProjectValidatorManager>,
    cross_unit: Option<QiCrossUnitValidatorManager>,
    current_unit: Option<QiUnitValidatorManager>,
    log: QiLogCache,
    rejected_types: BTreeSet<QiTypeId>,
    started: bool,
    running: bool,
}

impl<S: QiUnitStore> QiOrchestrator<S> {
    /// Creates an orchestrator with no project or cross-unit phase attached.
    ///
    /// `unit_mode` selects the units to visit; an unknown mode is a
    /// configuration error.
    pub fn new(store: S, context: QiRunContext, unit_mode: &str) -> Result<Self> {
        let mode: QiUnitMode = unit_mode.parse()?;
        let units = store.list_unit_paths(mode)?;

        let mut object_types = QiTypeRegistry::new(context.shared_source());
        object_types.ignore_type(&QiTypeId::self_test_base());
        if !context.includes_test_types() {
            object_types.ignore_marker(&QiMarker::test_only());
        }
        object_types.add_candidates(&QiTypeId::object_base(), &QiMarker::validatable());

        let mut orchestrator = QiOrchestrator {
            store,
            context,
            object_types,
            units,
            phase: QiPhase::ProjectAssets,
            project: None,
            cross_unit: None,
            current_unit: None,
            log: QiLogCache::new(),
            rejected_types: BTreeSet::new(),
            started: false,
            running: false,
        };

        orchestrator.log_disabled_overrides();
        let discovery = QiPluginDiscovery::run(&orchestrator.context, QiPluginScope::Unit);
        orchestrator.log_rejections(&discovery.rejected);

        log::info!(
            "qi.orchestrator.new: orchestrator created - mode={}, units={}, object_types={}",
            mode,
            orchestrator.units.len(),
            orchestrator.object_types.len()
        );
        Ok(orchestrator)
    }

    /// Creates an orchestrator and attaches the requested optional phases.
    pub fn configure(
        store: S,
        context: QiRunContext,
        unit_mode: &str,
        project_assets: bool,
        cross_unit: bool,
    ) -> Result<Self> {
        let mut orchestrator = Self::new(store, context, unit_mode)?;
        if project_assets {
            orchestrator.enable_project_asset_validation()?;
        }
        if cross_unit {
            orchestrator.enable_cross_unit_validation()?;
        }
        Ok(orchestrator)
    }

    pub fn from_config(
        store: S,
        source: Rc<dyn QiReflectionSource>,
        config: &QiRunConfig,
    ) -> Result<Self> {
        let context = QiRunContext::from_config(source, config)?;
        Self::configure(
            store,
            context,
            &config.unit_mode,
            config.project_assets,
            config.cross_unit,
        )
    }

    /// Attaches the project asset phase. Calling it again has no effect.
    pub fn enable_project_asset_validation(&mut self) -> Result<()> {
        self.ensure_not_started("project asset validation")?;
        if self.project.is_none() {
            let manager = QiProjectValidatorManager::new(&self.context, &self.object_types);
            let rejected: Vec<QiPluginRejection> = manager
                .dispatch_plugins()
                .rejected()
                .iter()
                .chain(manager.plugins().rejected())
                .cloned()
                .collect();
            self.log_rejections(&rejected);
            self.project = Some(manager);
        }
        Ok(())
    }

    /// Attaches the cross-unit phase. Calling it again has no effect.
    pub fn enable_cross_unit_validation(&mut self) -> Result<()> {
        self.ensure_not_started("cross-unit validation")?;
        if self.cross_unit.is_none() {
            let manager = QiCrossUnitValidatorManager::new(&self.context);
            let rejected = manager.plugins().rejected().to_vec();
            self.log_rejections(&rejected);
            self.cross_unit = Some(manager);
        }
        Ok(())
    }

    /// Runs every phase to completion.
    pub fn run(&mut self) -> Result<()> {
        if self.started {
            return Err(QiError::orchestrator(
                self.phase.to_string(),
                "run called on an orchestrator that already started",
            ));
        }
        self.started = true;
        self.running = true;

        log::info!("qi.orchestrator.phase: entering phase - phase={}", self.phase);
        if let Some(project) = self.project.as_mut() {
            let mut ctx = execution_context(
                &self.context,
                &self.store,
                &mut self.log,
                QiLogArea::Project,
            );
            project.search(&mut ctx)?;
            project.validate_all(&mut ctx)?;
        }

        for index in 0..self.units.len() {
            self.enter_phase(QiPhase::PerUnit(index));
            self.store.open_unit(&self.units[index])?;
            let mut manager = QiUnitValidatorManager::new(&self.context, &self.object_types);
            let mut ctx = execution_context(
                &self.context,
                &self.store,
                &mut self.log,
                QiLogArea::Unit,
            )
            .in_unit(&self.units[index]);
            manager.search(&mut ctx)?;
            manager.validate_all(&mut ctx)?;
            if let Some(cross_unit) = self.cross_unit.as_mut() {
                cross_unit.search(&mut ctx)?;
            }
        }

        self.enter_phase(QiPhase::CrossUnit);
        if let Some(cross_unit) = self.cross_unit.as_mut() {
            let mut ctx = execution_context(
                &self.context,
                &self.store,
                &mut self.log,
                QiLogArea::None,
            );
            cross_unit.validate_all(&mut ctx)?;
        }

        self.running = false;
        self.log_finished();
        Ok(())
    }

    /// Performs one bounded slice of work and returns whether the run is
    /// still going.
    pub fn continue_running(&mut self) -> Result<bool> {
        if !self.started {
            self.started = true;
            self.running = true;
            log::info!("qi.orchestrator.phase: entering phase - phase={}", self.phase);
        }

        loop {
            match self.phase {
                QiPhase::ProjectAssets => {
                    if self.step_project()? {
                        break;
                    }
                    self.enter_phase(QiPhase::PerUnit(0));
                }
                QiPhase::PerUnit(index) if index < self.units.len() => {
                    self.step_unit(index)?;
                    break;
                }
                QiPhase::PerUnit(_) => self.enter_phase(QiPhase::CrossUnit),
                QiPhase::CrossUnit => {
                    self.step_cross_unit()?;
                    break;
                }
            }
        }

        let still_running = !self.is_complete();
        if self.running && !still_running {
            self.log_finished();
        }
        self.running = still_running;
        Ok(self.running)
    }

    /// Validates one project step, searching first if needed. Returns false
    /// when the phase has nothing left to do.
    fn step_project(&mut self) -> Result<bool> {
        let Some(project) = self.project.as_mut() else {
            return Ok(false);
        };
        let searched = project.state() != QiManagerState::NotSearched;
        if searched && project.is_complete() {
            return Ok(false);
        }
        let mut ctx = execution_context(
            &self.context,
            &self.store,
            &mut self.log,
            QiLogArea::Project,
        );
        if searched {
            project.continue_validation(&mut ctx)?;
        } else {
            project.search(&mut ctx)?;
        }
        Ok(true)
    }

    /// Opens and searches the unit at `index`, or validates one step of it.
    /// Once the unit is exhausted the cross-unit plugins search it and the
    /// phase moves to the next unit.
    fn step_unit(&mut self, index: usize) -> Result<()> {
        if self.current_unit.is_none() {
            self.store.open_unit(&self.units[index])?;
            let mut manager = QiUnitValidatorManager::new(&self.context, &self.object_types);
            let mut ctx = execution_context(
                &self.context,
                &self.store,
                &mut self.log,
                QiLogArea::Unit,
            )
            .in_unit(&self.units[index]);
            manager.search(&mut ctx)?;
            self.current_unit = Some(manager);
            return Ok(());
        }

        let mut ctx = execution_context(
            &self.context,
            &self.store,
            &mut self.log,
            QiLogArea::Unit,
        )
        .in_unit(&self.units[index]);
        let remaining = match self.current_unit.as_mut() {
            Some(manager) if !manager.is_complete() => manager.continue_validation(&mut ctx)?,
            _ => false,
        };
        if remaining {
            return Ok(());
        }

        if let Some(cross_unit) = self.cross_unit.as_mut() {
            cross_unit.search(&mut ctx)?;
        }
        self.current_unit = None;
        if index + 1 < self.units.len() {
            self.enter_phase(QiPhase::PerUnit(index + 1));
        } else {
            self.enter_phase(QiPhase::CrossUnit);
        }
        Ok(())
    }

    fn step_cross_unit(&mut self) -> Result<()> {
        if let Some(cross_unit) = self.cross_unit.as_mut() {
            let mut ctx = execution_context(
                &self.context,
                &self.store,
                &mut self.log,
                QiLogArea::None,
            );
            cross_unit.continue_validation(&mut ctx)?;
        }
        Ok(())
    }

    fn enter_phase(&mut self, phase: QiPhase) {
        self.phase = phase;
        match phase {
            QiPhase::PerUnit(index) if index < self.units.len() => log::info!(
                "qi.orchestrator.phase: entering phase - phase={}, unit={}",
                phase,
                self.units[index]
            ),
            QiPhase::PerUnit(_) => {}
            _ => log::info!("qi.orchestrator.phase: entering phase - phase={}", phase),
        }
    }

    fn ensure_not_started(&self, what: &str) -> Result<()> {
        if self.started {
            return Err(QiError::configuration(format!(
                "cannot enable {what} after the run started"
            )));
        }
        Ok(())
    }

    fn log_disabled_overrides(&mut self) {
        let entries: Vec<QiLogEntry> = self
            .context
            .overrides()
            .disabled()
            .map(|entry| {
                QiLogEntry::warning(
                    entry.display_name(),
                    format!(
                        "validator '{}' is disabled by the override configuration",
                        entry.symbol
                    ),
                )
            })
            .collect();
        for entry in entries {
            self.log.append(entry);
        }
    }

    /// Logs each rejected plugin type once per orchestrator, however many
    /// scopes discovered it.
    fn log_rejections(&mut self, rejected: &[QiPluginRejection]) {
        for rejection in rejected {
            if !self.rejected_types.insert(rejection.type_id.clone()) {
                continue;
            }
            self.log.append(QiLogEntry::warning(
                rejection.type_id.as_str(),
                format!(
                    "validator type '{}' skipped: {}",
                    rejection.type_id, rejection.reason
                ),
            ));
        }
    }

    fn log_finished(&self) {
        let summary = self.log.summary();
        log::info!(
            "qi.orchestrator.finish: run complete - units={}, info={}, warnings={}, errors={}",
            self.units.len(),
            summary.info,
            summary.warnings,
            summary.errors
        );
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// True once every unit was visited and every attached manager finished.
    pub fn is_complete(&self) -> bool {
        self.phase == QiPhase::CrossUnit
            && self.cross_unit.as_ref().map_or(true, |m| m.is_complete())
    }

    pub fn phase(&self) -> QiPhase {
        self.phase
    }

    /// Progress of the active phase only. Phases that are not attached read
    /// as complete.
    pub fn progress(&self) -> f32 {
        match self.phase {
            QiPhase::ProjectAssets => self.project.as_ref().map_or(1.0, |m| m.progress()),
            QiPhase::PerUnit(_) => self.current_unit.as_ref().map_or(0.0, |m| m.progress()),
            QiPhase::CrossUnit => self.cross_unit.as_ref().map_or(1.0, |m| m.progress()),
        }
    }

    pub fn progress_message(&self) -> String {
        if self.is_complete() {
            return "Validation complete".to_string();
        }
        match self.phase {
            QiPhase::ProjectAssets => match self.project.as_ref() {
                Some(manager) => {
                    let (done, total) = manager.counts();
                    format!("Validating project assets ({done}/{total})")
                }
                None => "Preparing validation".to_string(),
            },
            QiPhase::PerUnit(index) => {
                let unit = self.units.get(index).map(String::as_str).unwrap_or_default();
                match self.current_unit.as_ref() {
                    Some(manager) => {
                        let (done, total) = manager.counts();
                        format!(
                            "Validating unit {}/{} '{unit}' ({done}/{total})",
                            index + 1,
                            self.units.len()
                        )
                    }
                    None => format!("Opening unit {}/{} '{unit}'", index + 1, self.units.len()),
                }
            }
            QiPhase::CrossUnit => match self.cross_unit.as_ref() {
                Some(manager) => {
                    let (done, total) = manager.counts();
                    format!("Validating across units ({done}/{total})")
                }
                None => "Validation complete".to_string(),
            },
        }
    }

    pub fn log_cache(&self) -> &QiLogCache {
        &self.log
    }

    pub fn units(&self) -> &[String] {
        &self.units
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn context(&self) -> &QiRunContext {
        &self.context
    }

    /// Object types the run dispatches to plugins.
    pub fn object_types(&self) -> &QiTypeRegistry {
        &self.object_types
    }
}

impl<S: QiUnitStore> fmt::Debug for QiOrchestrator<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QiOrchestrator")
            .field("phase", &self.phase)
            .field("units", &self.units)
            .field("project", &self.project.is_some())
            .field("cross_unit", &self.cross_unit.is_some())
            .field("entries", &self.log.len())
            .field("running", &self.running)
            .finish()
    }
}
