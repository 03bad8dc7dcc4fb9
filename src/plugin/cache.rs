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

//! # Plugin Cache
//!
//! A [`QiPluginCache`] holds the enabled validator instances of one scope.
//! Discovery runs a [`QiTypeRegistry`] pass per validator kind of the scope,
//! checks the markers of every candidate and instantiates the candidates whose
//! symbol is enabled by the override configuration. Disabled plugins are never
//! constructed.
//!
//! The cache does not report anything itself. Candidates with malformed
//! markers are returned as [`QiPluginRejection`]s for the orchestrator to log.

use std::fmt;

use crate::catalog::{QiMarker, QiTypeId};
use crate::context::QiRunContext;
use crate::plugin::validator::{QiValidator, QiValidatorFactory, QiValidatorKind};
use crate::registry::QiTypeRegistry;

/// Which group of plugins a cache serves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QiPluginScope {
    /// Field, object and unit-collection plugins run against every unit.
    Unit,
    /// Plugins aggregating across all units.
    CrossUnit,
    /// Field, object and unit-collection plugins routed to project assets.
    Project,
}

impl QiPluginScope {
    pub fn kinds(&self) -> &'static [QiValidatorKind] {
        match self {
            QiPluginScope::Unit | QiPluginScope::Project => &[
                QiValidatorKind::Field,
                QiValidatorKind::Object,
                QiValidatorKind::UnitCollection,
            ],
            QiPluginScope::CrossUnit => &[QiValidatorKind::CrossUnit],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QiPluginScope::Unit => "unit",
            QiPluginScope::CrossUnit => "cross_unit",
            QiPluginScope::Project => "project",
        }
    }
}

impl fmt::Display for QiPluginScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A discovered plugin type that passed marker checks.
#[derive(Clone, Debug)]
pub struct QiPluginCandidate {
    pub type_id: QiTypeId,
    pub symbol: String,
    pub kind: QiValidatorKind,
    pub factory: QiValidatorFactory,
}

/// A discovered plugin type skipped because of marker misuse.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QiPluginRejection {
    pub type_id: QiTypeId,
    pub reason: String,
}

/// Result of a discovery pass.
#[derive(Clone, Debug, Default)]
pub struct QiPluginDiscovery {
    pub candidates: Vec<QiPluginCandidate>,
    pub rejected: Vec<QiPluginRejection>,
}

impl QiPluginDiscovery {
    /// Discovers the plugin types of `scope`, in kind order then catalog order.
    pub fn run(context: &QiRunContext, scope: QiPluginScope) -> Self {
        let mut registry = QiTypeRegistry::new(context.shared_source());
        if !context.includes_test_types() {
            registry.ignore_marker(&QiMarker::test_only());
        }
        if scope == QiPluginScope::Unit {
            registry.ignore_marker(&QiMarker::project_route());
        }
        for kind in scope.kinds() {
            registry.add_candidates(&kind.base(), &kind.marker());
        }

        let mut discovery = QiPluginDiscovery::default();
        for info in registry.iter() {
            if scope == QiPluginScope::Project && !info.carries(&QiMarker::project_route()) {
                continue;
            }

            let symbols = info.markers_named(QiMarker::SYMBOL).count();
            if symbols != 1 {
                discovery.rejected.push(QiPluginRejection {
                    type_id: info.id.clone(),
                    reason: format!("expected exactly one symbol marker, found {symbols}"),
                });
                continue;
            }

            let kind = match QiValidatorKind::declared_by(info) {
                Ok(kind) => kind,
                Err(count) => {
                    discovery.rejected.push(QiPluginRejection {
                        type_id: info.id.clone(),
                        reason: format!("expected exactly one validator kind marker, found {count}"),
                    });
                    continue;
                }
            };

            let (Some(symbol), Some(factory)) = (info.symbol(), info.factory) else {
                discovery.rejected.push(QiPluginRejection {
                    type_id: info.id.clone(),
                    reason: "no zero-argument constructor registered".to_string(),
                });
                continue;
            };

            discovery.candidates.push(QiPluginCandidate {
                type_id: info.id.clone(),
                symbol: symbol.to_string(),
                kind,
                factory,
            });
        }
        discovery
    }
}

/// An instantiated plugin together with what discovery learned about it.
#[derive(Debug)]
pub struct QiLoadedValidator {
    pub type_id: QiTypeId,
    pub symbol: String,
    pub kind: QiValidatorKind,
    pub validator: Box<dyn QiValidator>,
}

impl QiLoadedValidator {
    pub fn name(&self) -> &str {
        self.validator.name()
    }
}

/// Enabled plugin instances of one scope.
#[derive(Debug)]
pub struct QiPluginCache {
    scope: QiPluginScope,
    plugins: Vec<QiLoadedValidator>,
    rejected: Vec<QiPluginRejection>,
}

impl QiPluginCache {
    pub fn new(context: &QiRunContext, scope: QiPluginScope) -> Self {
        let discovery = QiPluginDiscovery::run(context, scope);
        let mut plugins = Vec::with_capacity(discovery.candidates.len());
        for candidate in discovery.candidates {
            if !context.overrides().is_enabled(&candidate.symbol) {
                log::debug!(
                    "qi.plugin.cache: plugin disabled by override - scope={}, symbol={}",
                    scope,
                    candidate.symbol
                );
                continue;
            }
            plugins.push(QiLoadedValidator {
                validator: (candidate.factory)(),
                type_id: candidate.type_id,
                symbol: candidate.symbol,
                kind: candidate.kind,
            });
        }
        log::debug!(
            "qi.plugin.cache: plugins instantiated - scope={}, count={}, rejected={}",
            scope,
            plugins.len(),
            discovery.rejected.len()
        );
        QiPluginCache {
            scope,
            plugins,
            rejected: discovery.rejected,
        }
    }

    pub fn scope(&self) -> QiPluginScope {
        self.scope
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&QiLoadedValidator> {
        self.plugins.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut QiLoadedValidator> {
        self.plugins.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, QiLoadedValidator> {
        self.plugins.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, QiLoadedValidator> {
        self.plugins.iter_mut()
    }

    pub fn rejected(&self) -> &[QiPluginRejection] {
        &self.rejected
    }

    pub fn symbols(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.symbol.as_str()).collect()
    }
}
