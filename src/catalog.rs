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

//! # Qi Type Catalog Module
//!
//! Rust has no runtime reflection over loaded modules, so every type that can
//! be validated or can act as a validator plugin is described explicitly by a
//! [`QiTypeInfo`] and registered into a [`QiTypeCatalog`]. The catalog is the
//! reflection source the rest of the framework queries:
//!
//! - **is concrete**: neither abstract nor generic
//! - **derives from X**: reflexive, transitive walk over declared bases
//! - **carries marker M**: declarative tags attached to the type
//!
//! Types are kept in registration order, which makes every discovery pass
//! deterministic.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{QiError, Result};
use crate::plugin::QiValidatorFactory;

/// Stable identity of a registered type.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QiTypeId(pub String);

impl QiTypeId {
    pub fn new(id: impl Into<String>) -> Self {
        QiTypeId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Base every validatable object type derives from.
    pub fn object_base() -> Self {
        QiTypeId::from("qi.Object")
    }

    /// Base of the framework's internal self-test types.
    pub fn self_test_base() -> Self {
        QiTypeId::from("qi.SelfTest")
    }

    /// Project asset type whose `paths` list declares additional assets.
    pub fn asset_contract() -> Self {
        QiTypeId::from("qi.AssetContract")
    }
}

impl fmt::Display for QiTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for QiTypeId {
    fn from(s: &str) -> Self {
        QiTypeId(s.to_string())
    }
}

impl From<String> for QiTypeId {
    fn from(s: String) -> Self {
        QiTypeId(s)
    }
}

/// Declarative tag attached to a type or a field.
#[derive(Clone, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct QiMarker {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl QiMarker {
    pub fn new(name: impl Into<String>) -> Self {
        QiMarker {
            name: name.into(),
            value: None,
        }
    }

    pub fn with_value(name: impl Into<String>, value: impl Into<String>) -> Self {
        QiMarker {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    /// Marks an object type as eligible for validation.
    pub fn validatable() -> Self {
        QiMarker::new("qi.validate")
    }

    /// Types only visible to self-test runs.
    pub fn test_only() -> Self {
        QiMarker::new("qi.test_only")
    }

    /// Routes a validator plugin to the project asset phase.
    pub fn project_route() -> Self {
        QiMarker::new("qi.route.project")
    }

    /// Name of the symbol marker; see [`QiMarker::symbol`].
    pub const SYMBOL: &'static str = "qi.symbol";

    /// Stable symbolic identifier of a validator plugin.
    pub fn symbol(symbol: impl Into<String>) -> Self {
        QiMarker::with_value(Self::SYMBOL, symbol)
    }

    /// Returns true when `self` satisfies the query marker `query`.
    ///
    /// Names must be equal. A query without a value matches any value.
    pub fn matches(&self, query: &QiMarker) -> bool {
        self.name == query.name
            && match &query.value {
                Some(value) => self.value.as_deref() == Some(value.as_str()),
                None => true,
            }
    }
}

impl fmt::Display for QiMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}={}", self.name, value),
            None => write!(f, "{}", self.name),
        }
    }
}

/// A named field of a type together with the markers it carries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QiFieldInfo {
    pub name: String,
    pub markers: Vec<QiMarker>,
}

impl QiFieldInfo {
    pub fn new(name: impl Into<String>, markers: Vec<QiMarker>) -> Self {
        QiFieldInfo {
            name: name.into(),
            markers,
        }
    }

    pub fn carries(&self, marker: &QiMarker) -> bool {
        self.markers.iter().any(|m| m.matches(marker))
    }
}

/// Descriptor of one registered type.
#[derive(Clone, Debug)]
pub struct QiTypeInfo {
    pub id: QiTypeId,
    /// Owning module, used only for reporting.
    pub module: String,
    pub is_abstract: bool,
    pub is_generic: bool,
    pub bases: Vec<QiTypeId>,
    pub markers: Vec<QiMarker>,
    pub fields: Vec<QiFieldInfo>,
    /// Zero-argument constructor for validator plugin types.
    pub factory: Option<QiValidatorFactory>,
}

impl QiTypeInfo {
    pub fn new(id: impl Into<QiTypeId>, module: impl Into<String>) -> Self {
        QiTypeInfo {
            id: id.into(),
            module: module.into(),
            is_abstract: false,
            is_generic: false,
            bases: Vec::new(),
            markers: Vec::new(),
            fields: Vec::new(),
            factory: None,
        }
    }

    /// Declares a validatable object type deriving from [`QiTypeId::object_base`].
    pub fn object(id: impl Into<QiTypeId>, module: impl Into<String>) -> Self {
        QiTypeInfo::new(id, module)
            .with_base(QiTypeId::object_base())
            .with_marker(QiMarker::validatable())
    }

    pub fn abstract_type(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn generic_type(mut self) -> Self {
        self.is_generic = true;
        self
    }

    pub fn with_base(mut self, base: impl Into<QiTypeId>) -> Self {
        let base = base.into();
        if !self.bases.contains(&base) {
            self.bases.push(base);
        }
        self
    }

    pub fn with_marker(mut self, marker: QiMarker) -> Self {
        self.markers.push(marker);
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, markers: Vec<QiMarker>) -> Self {
        self.fields.push(QiFieldInfo::new(name, markers));
        self
    }

    pub fn with_factory(mut self, factory: QiValidatorFactory) -> Self {
        self.factory = Some(factory);
        self
    }

    pub fn is_concrete(&self) -> bool {
        !self.is_abstract && !self.is_generic
    }

    pub fn carries(&self, marker: &QiMarker) -> bool {
        self.markers.iter().any(|m| m.matches(marker))
    }

    /// All markers with the given name, in declaration order.
    pub fn markers_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a QiMarker> + 'a {
        self.markers.iter().filter(move |m| m.name == name)
    }

    /// The symbol declared through [`QiMarker::symbol`], if exactly one exists.
    pub fn symbol(&self) -> Option<&str> {
        let mut symbols = self.markers_named(QiMarker::SYMBOL);
        match (symbols.next(), symbols.next()) {
            (Some(marker), None) => marker.value.as_deref(),
            _ => None,
        }
    }

    /// Fields carrying `marker`, in declaration order.
    pub fn fields_with<'a>(&'a self, marker: &'a QiMarker) -> impl Iterator<Item = &'a QiFieldInfo> + 'a {
        self.fields.iter().filter(move |f| f.carries(marker))
    }
}

/// Enumerates loadable types and answers the predicates discovery relies on.
pub trait QiReflectionSource {
    /// All known types in a stable order.
    fn types(&self) -> &[QiTypeInfo];

    fn find(&self, id: &QiTypeId) -> Option<&QiTypeInfo> {
        self.types().iter().find(|info| &info.id == id)
    }

    /// Returns true when `ty` is `base` or derives from it, directly or not.
    ///
    /// Bases that were never registered still match by identity, they just
    /// cannot be walked further.
    fn is_assignable(&self, ty: &QiTypeId, base: &QiTypeId) -> bool {
        let mut pending = vec![ty];
        let mut visited = HashSet::new();
        while let Some(current) = pending.pop() {
            if current == base {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            if let Some(info) = self.find(current) {
                pending.extend(info.bases.iter());
            }
        }
        false
    }

    /// Resolves the plugin type declaring `symbol`, best effort.
    fn find_by_symbol(&self, symbol: &str) -> Option<&QiTypeInfo> {
        self.types().iter().find(|info| info.symbol() == Some(symbol))
    }
}

/// Explicit, self-registering catalog of types.
#[derive(Debug, Default)]
pub struct QiTypeCatalog {
    types: Vec<QiTypeInfo>,
    index: HashMap<QiTypeId, usize>,
}

impl QiTypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog pre-loaded with the validators bundled with Qi.
    pub fn with_builtin_validators() -> Result<Self> {
        let mut catalog = Self::new();
        crate::validators::register_builtin(&mut catalog)?;
        Ok(catalog)
    }

    /// Registers a type. Ids are unique within a catalog.
    pub fn register(&mut self, info: QiTypeInfo) -> Result<()> {
        if self.index.contains_key(&info.id) {
            return Err(QiError::configuration(format!(
                "type '{}' is already registered",
                info.id
            )));
        }
        log::debug!(
            "qi.catalog.register: type registered - type={}, module={}",
            info.id,
            info.module
        );
        self.index.insert(info.id.clone(), self.types.len());
        self.types.push(info);
        Ok(())
    }

    /// Registers several types, stopping at the first duplicate.
    pub fn register_all(&mut self, infos: impl IntoIterator<Item = QiTypeInfo>) -> Result<()> {
        for info in infos {
            self.register(info)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl QiReflectionSource for QiTypeCatalog {
    fn types(&self) -> &[QiTypeInfo] {
        &self.types
    }

    fn find(&self, id: &QiTypeId) -> Option<&QiTypeInfo> {
        self.index.get(id).map(|&idx| &self.types[idx])
    }
}
