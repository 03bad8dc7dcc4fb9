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

//! # Qi Config Module
//!
//! [`QiRunConfig`] describes one validation run: which units to visit, which
//! optional phases to attach, the step size of incremental runs and the
//! per-validator override table. It is plain serde data and can be read from
//! JSON or YAML.
//!
//! ```json
//! {
//!   "unit_mode": "build",
//!   "cross_unit": true,
//!   "step_size": 4,
//!   "overrides": { "qi.unique_instance": false }
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::QI_DEFAULT_STEP_SIZE;
use crate::errors::{QiError, Result};
use crate::overrides::QiOverrideStore;

/// Settings of one validation run. Missing fields take their defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QiRunConfig {
    /// Unit-selection mode, see [`crate::store::QiUnitMode`].
    pub unit_mode: String,
    pub project_assets: bool,
    pub cross_unit: bool,
    /// Items validated per incremental step.
    pub step_size: usize,
    /// Lets types and validators carrying the test-only marker take part.
    pub include_test_types: bool,
    /// Validator symbol to enabled flag. Symbols not listed are enabled.
    pub overrides: BTreeMap<String, bool>,
}

impl Default for QiRunConfig {
    fn default() -> Self {
        QiRunConfig {
            unit_mode: "all".to_string(),
            project_assets: true,
            cross_unit: true,
            step_size: QI_DEFAULT_STEP_SIZE,
            include_test_types: false,
            overrides: BTreeMap::new(),
        }
    }
}

impl QiRunConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unit_mode(mut self, mode: impl Into<String>) -> Self {
        self.unit_mode = mode.into();
        self
    }

    pub fn project_assets(mut self, enabled: bool) -> Self {
        self.project_assets = enabled;
        self
    }

    pub fn cross_unit(mut self, enabled: bool) -> Self {
        self.cross_unit = enabled;
        self
    }

    pub fn step_size(mut self, step_size: usize) -> Self {
        self.step_size = step_size;
        self
    }

    pub fn include_test_types(mut self, include: bool) -> Self {
        self.include_test_types = include;
        self
    }

    pub fn override_validator(mut self, symbol: impl Into<String>, enabled: bool) -> Self {
        self.overrides.insert(symbol.into(), enabled);
        self
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        serde_json::from_str(raw)
            .map_err(|err| QiError::configuration(format!("invalid run configuration: {err}")))
    }

    pub fn from_json(value: &Value) -> Result<Self> {
        Self::deserialize(value)
            .map_err(|err| QiError::configuration(format!("invalid run configuration: {err}")))
    }

    #[cfg(feature = "yaml")]
    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        serde_yaml::from_str(raw)
            .map_err(|err| QiError::configuration(format!("invalid run configuration: {err}")))
    }

    /// Reads a `.json`, `.yaml` or `.yml` file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let raw = fs::read_to_string(path)?;
        let config = match extension.as_str() {
            "json" => Self::from_json_str(&raw)?,
            #[cfg(feature = "yaml")]
            "yaml" | "yml" => Self::from_yaml_str(&raw)?,
            other => {
                return Err(QiError::configuration(format!(
                    "unsupported run configuration format '{other}': {}",
                    path.display()
                )))
            }
        };
        log::debug!(
            "qi.config.load: run configuration loaded - path={}, unit_mode={}, overrides={}",
            path.display(),
            config.unit_mode,
            config.overrides.len()
        );
        Ok(config)
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl QiOverrideStore for QiRunConfig {
    fn load(&self) -> Result<BTreeMap<String, bool>> {
        Ok(self.overrides.clone())
    }
}
