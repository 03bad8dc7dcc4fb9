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

//! Project contracts listing extra assets to validate.
//!
//! A contract is a project asset of type [`QiTypeId::asset_contract`] whose
//! `paths` field lists asset paths. While the project phase searches, every
//! listed path is declared to the project manager, which loads and validates
//! it like any other project asset. Contracts that list nothing useful are
//! reported when the plugin's aggregate item is validated.

use serde_json::Value;

use crate::catalog::{QiMarker, QiTypeId, QiTypeInfo};
use crate::context::QiExecutionContext;
use crate::errors::Result;
use crate::plugin::{QiValidationTarget, QiValidator, QiValidatorKind, QiValidatorTarget};

pub const SYMBOL: &str = "qi.asset_contract";

/// Field of a contract asset listing the declared paths.
pub const PATHS_FIELD: &str = "paths";

#[derive(Debug, Default)]
pub struct QiAssetContractValidator {
    empty: Vec<String>,
    malformed: Vec<(String, usize)>,
    declared: usize,
}

impl QiAssetContractValidator {
    /// Paths declared by the last search.
    pub fn declared(&self) -> usize {
        self.declared
    }
}

impl QiValidator for QiAssetContractValidator {
    fn name(&self) -> &str {
        SYMBOL
    }

    fn target(&self) -> QiValidatorTarget {
        QiValidatorTarget::Aggregate
    }

    fn search(&mut self, ctx: &mut QiExecutionContext<'_>) -> Result<()> {
        self.empty.clear();
        self.malformed.clear();
        self.declared = 0;

        for contract in ctx.find_project_assets(&QiTypeId::asset_contract())? {
            let entries = contract
                .field(PATHS_FIELD)
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            let mut listed = 0;
            let mut invalid = 0;
            for entry in entries {
                match entry {
                    Value::String(path) if !path.is_empty() => {
                        ctx.declare_asset(path);
                        listed += 1;
                    }
                    _ => invalid += 1,
                }
            }
            if invalid > 0 {
                self.malformed.push((contract.path.clone(), invalid));
            }
            if listed == 0 && invalid == 0 {
                self.empty.push(contract.path.clone());
            }
            self.declared += listed;
        }
        log::debug!(
            "qi.validator.search: asset contracts searched - declared={}, empty={}, malformed={}",
            self.declared,
            self.empty.len(),
            self.malformed.len()
        );
        Ok(())
    }

    fn validate(&mut self, target: QiValidationTarget<'_>, ctx: &mut QiExecutionContext<'_>) -> Result<()> {
        if !matches!(target, QiValidationTarget::Aggregate) {
            return Ok(());
        }
        for path in &self.empty {
            ctx.warning(SYMBOL, "asset contract declares no paths", path);
        }
        for (path, invalid) in &self.malformed {
            ctx.warning(
                SYMBOL,
                format!("asset contract lists {invalid} entries that are not asset paths"),
                path,
            );
        }
        Ok(())
    }
}

pub fn asset_contract_factory() -> Box<dyn QiValidator> {
    Box::new(QiAssetContractValidator::default())
}

pub fn type_info() -> QiTypeInfo {
    super::plugin_type(
        "qi.builtin.AssetContractValidator",
        QiValidatorKind::UnitCollection,
        SYMBOL,
        asset_contract_factory,
    )
    .with_marker(QiMarker::project_route())
}
