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

use serde_json::Value;

use crate::catalog::{QiMarker, QiTypeInfo};
use crate::context::QiExecutionContext;
use crate::errors::Result;
use crate::plugin::{QiValidationTarget, QiValidator, QiValidatorKind, QiValidatorTarget};

pub const SYMBOL: &str = "qi.asset_reference";

/// Field marker for fields holding an asset path.
pub fn marker() -> QiMarker {
    QiMarker::new("qi.asset_reference")
}

/// Checks that marked fields name assets the store can load. Empty and null
/// references are left to [`super::required`].
#[derive(Debug, Default)]
pub struct QiAssetReferenceValidator;

impl QiValidator for QiAssetReferenceValidator {
    fn name(&self) -> &str {
        SYMBOL
    }

    fn target(&self) -> QiValidatorTarget {
        QiValidatorTarget::FieldMarker(marker())
    }

    fn validate(&mut self, target: QiValidationTarget<'_>, ctx: &mut QiExecutionContext<'_>) -> Result<()> {
        let QiValidationTarget::Object(object) = target else {
            return Ok(());
        };
        let Some(info) = ctx.source().find(&object.type_id) else {
            return Ok(());
        };
        let marker = marker();
        for field in info.fields_with(&marker) {
            match object.field(&field.name) {
                None | Some(Value::Null) => {}
                Some(Value::String(path)) if path.is_empty() => {}
                Some(Value::String(path)) => {
                    if ctx.load_asset(path)?.is_none() {
                        ctx.error(
                            SYMBOL,
                            format!("field '{}' references missing asset '{path}'", field.name),
                            &object.path,
                        );
                    }
                }
                Some(other) => ctx.warning(
                    SYMBOL,
                    format!(
                        "field '{}' should hold an asset path, found {}",
                        field.name,
                        json_kind(other)
                    ),
                    &object.path,
                ),
            }
        }
        Ok(())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

pub fn asset_reference_factory() -> Box<dyn QiValidator> {
    Box::new(QiAssetReferenceValidator)
}

pub fn type_info() -> QiTypeInfo {
    super::plugin_type(
        "qi.builtin.AssetReferenceValidator",
        QiValidatorKind::Field,
        SYMBOL,
        asset_reference_factory,
    )
}
