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

pub const SYMBOL: &str = "qi.required_field";

/// Field marker requesting a value.
pub fn marker() -> QiMarker {
    QiMarker::new("qi.required")
}

/// Reports marked fields that are missing, null or an empty string.
#[derive(Debug, Default)]
pub struct QiRequiredFieldValidator;

impl QiValidator for QiRequiredFieldValidator {
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
            let missing = match object.field(&field.name) {
                None | Some(Value::Null) => true,
                Some(Value::String(text)) => text.is_empty(),
                Some(_) => false,
            };
            if missing {
                ctx.error(
                    SYMBOL,
                    format!("required field '{}' of {} has no value", field.name, object.type_id),
                    &object.path,
                );
            }
        }
        Ok(())
    }
}

pub fn required_factory() -> Box<dyn QiValidator> {
    Box::new(QiRequiredFieldValidator)
}

pub fn type_info() -> QiTypeInfo {
    super::plugin_type(
        "qi.builtin.RequiredFieldValidator",
        QiValidatorKind::Field,
        SYMBOL,
        required_factory,
    )
}
