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

//! Manager validating the live instances of the currently open unit.

use crate::context::{QiExecutionContext, QiRunContext};
use crate::errors::Result;
use crate::manager::worklist::{QiPluginSlot, QiTargetLookup, QiWorkItem, QiWorklist};
use crate::manager::{QiManagerState, QiValidatorManager};
use crate::plugin::{execute_search, QiPluginCache, QiPluginScope, QiValidatorKind};
use crate::registry::QiTypeRegistry;

/// Validates one unit. A fresh manager is created for every unit so that
/// unit-collection plugins start each unit with empty state.
#[derive(Debug)]
pub struct QiUnitValidatorManager {
    plugins: QiPluginCache,
    lookup: QiTargetLookup,
    worklist: QiWorklist,
}

impl QiUnitValidatorManager {
    pub fn new(context: &QiRunContext, types: &QiTypeRegistry) -> Self {
        let plugins = QiPluginCache::new(context, QiPluginScope::Unit);
        let lookup = QiTargetLookup::build(types, &[&plugins]);
        QiUnitValidatorManager {
            plugins,
            lookup,
            worklist: QiWorklist::new(context.step()),
        }
    }

    pub fn plugins(&self) -> &QiPluginCache {
        &self.plugins
    }
}

impl QiValidatorManager for QiUnitValidatorManager {
    fn search(&mut self, ctx: &mut QiExecutionContext<'_>) -> Result<()> {
        self.worklist.begin_search();
        for ty in self.lookup.types() {
            for object in ctx.find_instances(ty)? {
                self.worklist.push(QiWorkItem::Object(object));
            }
        }
        for (index, plugin) in self.plugins.iter_mut().enumerate() {
            if plugin.kind == QiValidatorKind::UnitCollection {
                execute_search(plugin.validator.as_mut(), ctx)?;
                self.worklist
                    .push(QiWorkItem::Aggregate(QiPluginSlot { cache: 0, index }));
            }
        }
        self.worklist.finish_search();
        log::debug!(
            "qi.manager.search: unit searched - unit={}, types={}, items={}",
            ctx.unit_path().unwrap_or_default(),
            self.lookup.types().len(),
            self.worklist.len()
        );
        Ok(())
    }

    fn validate_all(&mut self, ctx: &mut QiExecutionContext<'_>) -> Result<()> {
        self.worklist
            .run_to_end(std::slice::from_mut(&mut self.plugins), &self.lookup, ctx)
    }

    fn continue_validation(&mut self, ctx: &mut QiExecutionContext<'_>) -> Result<bool> {
        self.worklist
            .step(std::slice::from_mut(&mut self.plugins), &self.lookup, ctx)
    }

    fn progress(&self) -> f32 {
        self.worklist.progress().fraction()
    }

    fn is_complete(&self) -> bool {
        self.worklist.progress().is_complete()
    }

    fn state(&self) -> QiManagerState {
        self.worklist.state()
    }

    fn counts(&self) -> (usize, usize) {
        let progress = self.worklist.progress();
        (progress.cursor(), progress.total())
    }
}
