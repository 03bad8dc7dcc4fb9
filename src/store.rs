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

//! # Qi Unit Store Module
//!
//! The unit store is the host's object database: it knows which units exist,
//! switches the currently open unit, and enumerates live instances and
//! project assets. Qi consumes it through [`QiUnitStore`].
//!
//! [`QiMemoryUnitStore`] is an in-process implementation, primarily intended
//! for tests and for embedding Qi before a real store is wired.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::catalog::QiTypeId;
use crate::errors::{QiError, Result};
use crate::record::QiObjectRef;

/// Which units a run visits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QiUnitMode {
    /// No units; only project assets are validated.
    None,
    /// The unit currently open in the host.
    Active,
    /// Every unit known to the store.
    All,
    /// Units included in the build.
    Build,
    /// Units included in the build or shipped in a bundle.
    BuildAndBundled,
}

impl QiUnitMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            QiUnitMode::None => "none",
            QiUnitMode::Active => "active",
            QiUnitMode::All => "all",
            QiUnitMode::Build => "build",
            QiUnitMode::BuildAndBundled => "build_and_bundled",
        }
    }
}

impl fmt::Display for QiUnitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QiUnitMode {
    type Err = QiError;

    fn from_str(raw: &str) -> Result<Self> {
        let normalized = raw.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "none" => Ok(QiUnitMode::None),
            "active" => Ok(QiUnitMode::Active),
            "all" => Ok(QiUnitMode::All),
            "build" => Ok(QiUnitMode::Build),
            "build_and_bundled" => Ok(QiUnitMode::BuildAndBundled),
            _ => Err(QiError::configuration(format!(
                "unknown unit selection mode '{raw}'"
            ))),
        }
    }
}

impl TryFrom<i64> for QiUnitMode {
    type Error = QiError;

    fn try_from(raw: i64) -> Result<Self> {
        match raw {
            0 => Ok(QiUnitMode::None),
            1 => Ok(QiUnitMode::Active),
            2 => Ok(QiUnitMode::All),
            3 => Ok(QiUnitMode::Build),
            4 => Ok(QiUnitMode::BuildAndBundled),
            _ => Err(QiError::configuration(format!(
                "unknown unit selection mode value {raw}"
            ))),
        }
    }
}

/// Object store consumed by the validation core.
///
/// `find_instances` and `find_project_assets` return objects whose runtime
/// type is exactly `ty`; subtypes are registered and queried on their own.
pub trait QiUnitStore {
    /// Paths of the units selected by `mode`, in visiting order.
    fn list_unit_paths(&self, mode: QiUnitMode) -> Result<Vec<String>>;

    /// Makes `path` the current unit.
    fn open_unit(&mut self, path: &str) -> Result<()>;

    /// Live instances of `ty` in the current unit.
    fn find_instances(&self, ty: &QiTypeId) -> Result<Vec<QiObjectRef>>;

    /// Project assets of type `ty`.
    fn find_project_assets(&self, ty: &QiTypeId) -> Result<Vec<QiObjectRef>>;

    /// Loads a project asset by path. `Ok(None)` when nothing lives there.
    fn load_asset(&self, path: &str) -> Result<Option<QiObjectRef>>;
}

/// One unit held by [`QiMemoryUnitStore`].
#[derive(Clone, Debug, Default)]
pub struct QiMemoryUnit {
    pub path: String,
    pub in_build: bool,
    pub bundled: bool,
    pub objects: Vec<QiObjectRef>,
}

/// In-memory unit store.
#[derive(Clone, Debug, Default)]
pub struct QiMemoryUnitStore {
    units: Vec<QiMemoryUnit>,
    assets: Vec<QiObjectRef>,
    active: Option<String>,
    open: Option<usize>,
    opened: Vec<String>,
}

impl QiMemoryUnitStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a unit that is part of the build.
    pub fn add_unit(&mut self, path: impl Into<String>) -> &mut Self {
        self.add_unit_with(path, true, false)
    }

    pub fn add_unit_with(&mut self, path: impl Into<String>, in_build: bool, bundled: bool) -> &mut Self {
        self.units.push(QiMemoryUnit {
            path: path.into(),
            in_build,
            bundled,
            objects: Vec::new(),
        });
        self
    }

    /// Adds an object to an existing unit.
    pub fn add_object(&mut self, unit: &str, object: QiObjectRef) -> Result<&mut Self> {
        let target = self
            .units
            .iter_mut()
            .find(|u| u.path == unit)
            .ok_or_else(|| QiError::store(format!("unknown unit '{unit}'")))?;
        target.objects.push(object.in_unit(unit));
        Ok(self)
    }

    pub fn add_asset(&mut self, asset: QiObjectRef) -> &mut Self {
        self.assets.push(asset);
        self
    }

    pub fn set_active(&mut self, path: impl Into<String>) -> &mut Self {
        self.active = Some(path.into());
        self
    }

    /// Units opened so far, in order.
    pub fn opened_units(&self) -> &[String] {
        &self.opened
    }

    pub fn current_unit(&self) -> Option<&str> {
        self.open.map(|idx| self.units[idx].path.as_str())
    }
}

impl QiUnitStore for QiMemoryUnitStore {
    fn list_unit_paths(&self, mode: QiUnitMode) -> Result<Vec<String>> {
        let paths = match mode {
            QiUnitMode::None => Vec::new(),
            QiUnitMode::Active => self.active.iter().cloned().collect(),
            QiUnitMode::All => self.units.iter().map(|u| u.path.clone()).collect(),
            QiUnitMode::Build => self
                .units
                .iter()
                .filter(|u| u.in_build)
                .map(|u| u.path.clone())
                .collect(),
            QiUnitMode::BuildAndBundled => self
                .units
                .iter()
                .filter(|u| u.in_build || u.bundled)
                .map(|u| u.path.clone())
                .collect(),
        };
        Ok(paths)
    }

    fn open_unit(&mut self, path: &str) -> Result<()> {
        let idx = self
            .units
            .iter()
            .position(|u| u.path == path)
            .ok_or_else(|| QiError::store(format!("unknown unit '{path}'")))?;
        self.open = Some(idx);
        self.opened.push(path.to_string());
        Ok(())
    }

    fn find_instances(&self, ty: &QiTypeId) -> Result<Vec<QiObjectRef>> {
        let idx = self
            .open
            .ok_or_else(|| QiError::store("no unit is open"))?;
        Ok(self.units[idx]
            .objects
            .iter()
            .filter(|o| &o.type_id == ty)
            .cloned()
            .collect())
    }

    fn find_project_assets(&self, ty: &QiTypeId) -> Result<Vec<QiObjectRef>> {
        Ok(self
            .assets
            .iter()
            .filter(|a| &a.type_id == ty)
            .cloned()
            .collect())
    }

    fn load_asset(&self, path: &str) -> Result<Option<QiObjectRef>> {
        Ok(self.assets.iter().find(|a| a.path == path).cloned())
    }
}
