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

//! Working set shared by the unit and project managers.

use std::collections::HashMap;

use crate::catalog::QiTypeId;
use crate::context::QiExecutionContext;
use crate::errors::Result;
use crate::manager::{QiManagerState, QiProgress};
use crate::plugin::{
    execute_validation, QiLoadedValidator, QiPluginCache, QiValidationTarget, QiValidatorKind,
};
use crate::record::QiObjectRef;
use crate::registry::QiTypeRegistry;

/// Position of a plugin among the caches a manager owns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct QiPluginSlot {
    pub(crate) cache: usize,
    pub(crate) index: usize,
}

/// One unit of validation work.
#[derive(Clone, Debug)]
pub(crate) enum QiWorkItem {
    /// An object dispatched to every plugin registered for its type.
    Object(QiObjectRef),
    /// The aggregate step of the plugin in this slot.
    Aggregate(QiPluginSlot),
}

/// Type to plugin lookup, computed once per manager.
#[derive(Debug, Default)]
pub(crate) struct QiTargetLookup {
    types: Vec<QiTypeId>,
    by_type: HashMap<QiTypeId, Vec<QiPluginSlot>>,
}

impl QiTargetLookup {
    /// Keeps, in registry order, every type at least one field or object
    /// plugin of `caches` applies to. Slots follow cache order.
    pub(crate) fn build(types: &QiTypeRegistry, caches: &[&QiPluginCache]) -> Self {
        let mut lookup = QiTargetLookup::default();
        for info in types.iter() {
            let mut matching = Vec::new();
            for (cache, plugins) in caches.iter().enumerate() {
                for (index, plugin) in plugins.iter().enumerate() {
                    if matches!(plugin.kind, QiValidatorKind::Field | QiValidatorKind::Object)
                        && plugin.validator.applies_to(info, types.source())
                    {
                        matching.push(QiPluginSlot { cache, index });
                    }
                }
            }
            if !matching.is_empty() {
                lookup.types.push(info.id.clone());
                lookup.by_type.insert(info.id.clone(), matching);
            }
        }
        lookup
    }

    pub(crate) fn types(&self) -> &[QiTypeId] {
        &self.types
    }

    pub(crate) fn plugins_for(&self, ty: &QiTypeId) -> &[QiPluginSlot] {
        self.by_type.get(ty).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Ordered working set plus its cursor.
#[derive(Debug)]
pub(crate) struct QiWorklist {
    items: Vec<QiWorkItem>,
    progress: QiProgress,
    searched: bool,
}

impl QiWorklist {
    pub(crate) fn new(step_size: usize) -> Self {
        QiWorklist {
            items: Vec::new(),
            progress: QiProgress::new(step_size),
            searched: false,
        }
    }

    pub(crate) fn begin_search(&mut self) {
        self.items.clear();
        self.searched = false;
    }

    pub(crate) fn push(&mut self, item: QiWorkItem) {
        self.items.push(item);
    }

    pub(crate) fn finish_search(&mut self) {
        self.progress.reset(self.items.len());
        self.searched = true;
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn progress(&self) -> &QiProgress {
        &self.progress
    }

    pub(crate) fn state(&self) -> QiManagerState {
        self.progress.state(self.searched)
    }

    /// Validates the next window of items. Returns whether work remains.
    pub(crate) fn step(
        &mut self,
        caches: &mut [QiPluginCache],
        lookup: &QiTargetLookup,
        ctx: &mut QiExecutionContext<'_>,
    ) -> Result<bool> {
        for index in self.progress.next_window() {
            validate_item(&self.items[index], caches, lookup, ctx)?;
            self.progress.advance(1);
        }
        Ok(!self.progress.is_complete())
    }

    pub(crate) fn run_to_end(
        &mut self,
        caches: &mut [QiPluginCache],
        lookup: &QiTargetLookup,
        ctx: &mut QiExecutionContext<'_>,
    ) -> Result<()> {
        while self.step(caches, lookup, ctx)? {}
        Ok(())
    }
}

fn slot_mut<'c>(
    caches: &'c mut [QiPluginCache],
    slot: QiPluginSlot,
) -> Option<&'c mut QiLoadedValidator> {
    caches.get_mut(slot.cache)?.get_mut(slot.index)
}

fn validate_item(
    item: &QiWorkItem,
    caches: &mut [QiPluginCache],
    lookup: &QiTargetLookup,
    ctx: &mut QiExecutionContext<'_>,
) -> Result<()> {
    match item {
        QiWorkItem::Object(object) => {
            for &slot in lookup.plugins_for(&object.type_id) {
                if let Some(plugin) = slot_mut(caches, slot) {
                    execute_validation(
                        plugin.validator.as_mut(),
                        QiValidationTarget::Object(object),
                        ctx,
                    )?;
                }
            }
        }
        QiWorkItem::Aggregate(slot) => {
            if let Some(plugin) = slot_mut(caches, *slot) {
                execute_validation(plugin.validator.as_mut(), QiValidationTarget::Aggregate, ctx)?;
            }
        }
    }
    Ok(())
}
