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

//! Manager for plugins that aggregate findings across every unit.
//!
//! Validation here is a two-phase commit. While units are visited, `search`
//! lets every plugin scan the open unit and buffer tentative entries inside
//! itself; nothing reaches the diagnostics sink. Once every unit has been
//! searched, validating a plugin lets it look at the full aggregate and decide
//! whether its buffered entries are real findings.
//!
//! The working set is the plugin list itself, so its size is known at
//! construction.

use crate::context::{QiExecutionContext, QiRunContext};
use crate::errors::{QiError, Result};
use crate::manager::{QiManagerState, QiProgress, QiValidatorManager};
use crate::plugin::{
    execute_search, execute_validation, QiPluginCache, QiPluginScope, QiValidationTarget,
};

#[derive(Debug)]
pub struct QiCrossUnitValidatorManager {
    plugins: QiPluginCache,
    searched_units: Vec<String>,
    progress: QiProgress,
}

impl QiCrossUnitValidatorManager {
    pub fn new(context: &QiRunContext) -> Self {
        let plugins = QiPluginCache::new(context, QiPluginScope::CrossUnit);
        let mut progress = QiProgress::new(context.step());
        progress.reset(plugins.len());
        QiCrossUnitValidatorManager {
            plugins,
            searched_units: Vec::new(),
            progress,
        }
    }

    pub fn plugins(&self) -> &QiPluginCache {
        &self.plugins
    }

    /// Units searched so far, in order.
    pub fn searched_units(&self) -> &[String] {
        &self.searched_units
    }
}

impl QiValidatorManager for QiCrossUnitValidatorManager {
    /// Lets every plugin buffer findings for the unit `ctx` is scoped to. A
    /// unit that was already searched is skipped.
    fn search(&mut self, ctx: &mut QiExecutionContext<'_>) -> Result<()> {
        if self.progress.cursor() > 0 {
            return Err(QiError::orchestrator(
                "cross_unit",
                "cannot search a unit after cross-unit validation started",
            ));
        }
        let unit = ctx.unit_path().unwrap_or_default().to_string();
        if self.searched_units.contains(&unit) {
            log::debug!("qi.manager.search: unit already searched, skipping - unit={}", unit);
            return Ok(());
        }
        for plugin in self.plugins.iter_mut() {
            execute_search(plugin.validator.as_mut(), ctx)?;
        }
        log::debug!(
            "qi.manager.search: cross-unit plugins searched unit - unit={}, plugins={}",
            unit,
            self.plugins.len()
        );
        self.searched_units.push(unit);
        Ok(())
    }

    fn validate_all(&mut self, ctx: &mut QiExecutionContext<'_>) -> Result<()> {
        while self.continue_validation(ctx)? {}
        Ok(())
    }

    fn continue_validation(&mut self, ctx: &mut QiExecutionContext<'_>) -> Result<bool> {
        for index in self.progress.next_window() {
            if let Some(plugin) = self.plugins.get_mut(index) {
                execute_validation(plugin.validator.as_mut(), QiValidationTarget::Aggregate, ctx)?;
            }
            self.progress.advance(1);
        }
        Ok(!self.progress.is_complete())
    }

    fn progress(&self) -> f32 {
        self.progress.fraction()
    }

    fn is_complete(&self) -> bool {
        self.progress.is_complete()
    }

    fn state(&self) -> QiManagerState {
        self.progress.state(!self.searched_units.is_empty())
    }

    fn counts(&self) -> (usize, usize) {
        (self.progress.cursor(), self.progress.total())
    }
}
