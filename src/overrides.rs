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

//! # Qi Override Module
//!
//! Override decisions enable or disable validator plugins by their symbol
//! rather than by type identity, so a decision survives type renames. A
//! symbol that has no entry is enabled.
//!
//! Where decisions are persisted is up to the host; it only has to provide a
//! [`QiOverrideStore`] returning a symbol to flag table.

use std::collections::BTreeMap;

use crate::catalog::{QiReflectionSource, QiTypeId};
use crate::errors::Result;

/// Source of persisted override decisions.
pub trait QiOverrideStore {
    fn load(&self) -> Result<BTreeMap<String, bool>>;
}

/// Fixed, in-memory override table.
#[derive(Clone, Debug, Default)]
pub struct QiStaticOverrideStore {
    table: BTreeMap<String, bool>,
}

impl QiStaticOverrideStore {
    pub fn new(table: BTreeMap<String, bool>) -> Self {
        QiStaticOverrideStore { table }
    }
}

impl QiOverrideStore for QiStaticOverrideStore {
    fn load(&self) -> Result<BTreeMap<String, bool>> {
        Ok(self.table.clone())
    }
}

/// Enable/disable decision for one validator symbol.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QiOverrideEntry {
    pub symbol: String,
    pub enabled: bool,
    /// Plugin type declaring the symbol, when it could be resolved.
    pub resolved_type: Option<QiTypeId>,
}

impl QiOverrideEntry {
    /// Name used when reporting on this entry.
    pub fn display_name(&self) -> &str {
        self.resolved_type
            .as_ref()
            .map(QiTypeId::as_str)
            .unwrap_or(self.symbol.as_str())
    }
}

/// Override decisions for one run, ordered by symbol.
#[derive(Clone, Debug, Default)]
pub struct QiOverrideConfig {
    entries: BTreeMap<String, QiOverrideEntry>,
}

impl QiOverrideConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(table: BTreeMap<String, bool>) -> Self {
        let entries = table
            .into_iter()
            .map(|(symbol, enabled)| {
                let entry = QiOverrideEntry {
                    symbol: symbol.clone(),
                    enabled,
                    resolved_type: None,
                };
                (symbol, entry)
            })
            .collect();
        QiOverrideConfig { entries }
    }

    pub fn load(store: &dyn QiOverrideStore) -> Result<Self> {
        Ok(Self::from_map(store.load()?))
    }

    /// Fills in the plugin type of every entry whose symbol is declared in
    /// `source`. Unresolvable symbols are left as they are.
    pub fn resolve(&mut self, source: &dyn QiReflectionSource) {
        for entry in self.entries.values_mut() {
            entry.resolved_type = source
                .find_by_symbol(&entry.symbol)
                .map(|info| info.id.clone());
        }
    }

    pub fn is_enabled(&self, symbol: &str) -> bool {
        self.entries.get(symbol).map(|e| e.enabled).unwrap_or(true)
    }

    pub fn set_enabled(&mut self, symbol: impl Into<String>, enabled: bool) {
        let symbol = symbol.into();
        self.entries
            .entry(symbol.clone())
            .and_modify(|e| e.enabled = enabled)
            .or_insert(QiOverrideEntry {
                symbol,
                enabled,
                resolved_type: None,
            });
    }

    pub fn get(&self, symbol: &str) -> Option<&QiOverrideEntry> {
        self.entries.get(symbol)
    }

    /// Disabled entries in symbol order.
    pub fn disabled(&self) -> impl Iterator<Item = &QiOverrideEntry> {
        self.entries.values().filter(|e| !e.enabled)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
