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

//! Manager validating project assets.
//!
//! Two plugin caches are involved. The field and object plugins that check
//! objects inside units check project assets of their types too, so the
//! unit-scope cache is loaded for dispatch. The project-routed cache adds its
//! own object plugins to the lookup and is the only one asked to self-search
//! or to run an aggregate step.
//!
//! The working set is built in three passes: project assets of every type with
//! plugins, then assets declared by the project plugins' own search (for
//! instance paths listed in contract assets), then one aggregate item per
//! project unit-collection plugin. An asset path enters the set at most once;
//! the first occurrence wins.

use std::collections::HashSet;

use crate::context::{QiExecutionContext, QiRunContext};
use crate::errors::Result;
use crate::manager::worklist::{QiPluginSlot, QiTargetLookup, QiWorkItem, QiWorklist};
use crate::manager::{QiManagerState, QiValidatorManager};
use crate::plugin::{execute_search, QiPluginCache, QiPluginScope, QiValidatorKind};
use crate::registry::QiTypeRegistry;

const DISPATCH: usize = 0;
const PROJECT: usize = 1;

#[derive(Debug)]
pub struct QiProjectValidatorManager {
    /// Unit-scope cache at [`DISPATCH`], project cache at [`PROJECT`].
    caches: [QiPluginCache; 2],
    lookup: QiTargetLookup,
    worklist: QiWorklist,
}

impl QiProjectValidatorManager {
    pub fn new(context: &QiRunContext, types: &QiTypeRegistry) -> Self {
        let dispatch = QiPluginCache::new(context, QiPluginScope::Unit);
        let project = QiPluginCache::new(context, QiPluginScope::Project);
        let lookup = QiTargetLookup::build(types, &[&dispatch, &project]);
        QiProjectValidatorManager {
            caches: [dispatch, project],
            lookup,
            worklist: QiWorklist::new(context.step()),
        }
    }

    /// Project-routed plugins.
    pub fn plugins(&self) -> &QiPluginCache {
        &self.caches[PROJECT]
    }

    /// Unit-scope plugins that also check project assets.
    pub fn dispatch_plugins(&self) -> &QiPluginCache {
        &self.caches[DISPATCH]
    }
}

impl QiValidatorManager for QiProjectValidatorManager {
    fn search(&mut self, ctx: &mut QiExecutionContext<'_>) -> Result<()> {
        self.worklist.begin_search();
        let mut seen = HashSet::new();

        for ty in self.lookup.types() {
            for asset in ctx.find_project_assets(ty)? {
                if seen.insert(asset.path.clone()) {
                    self.worklist.push(QiWorkItem::Object(asset));
                }
            }
        }

        for plugin in self.caches[PROJECT].iter_mut() {
            execute_search(plugin.validator.as_mut(), ctx)?;
            for path in ctx.take_declared_assets() {
                if !seen.insert(path.clone()) {
                    log::debug!(
                        "qi.manager.search: declared asset already collected - plugin={}, path={}",
                        plugin.symbol,
                        path
                    );
                    continue;
                }
                match ctx.load_asset(&path)? {
                    Some(asset) => self.worklist.push(QiWorkItem::Object(asset)),
                    None => ctx.warning(
                        plugin.validator.name(),
                        format!("declared asset '{path}' could not be loaded"),
                        &path,
                    ),
                }
            }
        }

        for (index, plugin) in self.caches[PROJECT].iter().enumerate() {
            if plugin.kind == QiValidatorKind::UnitCollection {
                self.worklist.push(QiWorkItem::Aggregate(QiPluginSlot {
                    cache: PROJECT,
                    index,
                }));
            }
        }

        self.worklist.finish_search();
        log::debug!(
            "qi.manager.search: project searched - types={}, items={}",
            self.lookup.types().len(),
            self.worklist.len()
        );
        Ok(())
    }

    fn validate_all(&mut self, ctx: &mut QiExecutionContext<'_>) -> Result<()> {
        self.worklist.run_to_end(&mut self.caches, &self.lookup, ctx)
    }

    fn continue_validation(&mut self, ctx: &mut QiExecutionContext<'_>) -> Result<bool> {
        self.worklist.step(&mut self.caches, &self.lookup, ctx)
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
