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

//! Cross-unit check that types marked unique have a single instance.
//!
//! Each unit search buffers one tentative warning per instance found. The
//! warnings only reach the log if the total over every unit is above one, in
//! which case a summary error follows them.

use std::collections::BTreeMap;

use crate::catalog::{QiMarker, QiTypeId, QiTypeInfo};
use crate::context::QiExecutionContext;
use crate::diagnostics::{QiLogEntry, QiLogSeverity};
use crate::errors::Result;
use crate::plugin::{QiValidationTarget, QiValidator, QiValidatorKind, QiValidatorTarget};

pub const SYMBOL: &str = "qi.unique_instance";

/// Type marker declaring that at most one instance may exist.
pub fn marker() -> QiMarker {
    QiMarker::new("qi.unique")
}

#[derive(Debug, Default)]
struct QiUniqueTally {
    units: Vec<String>,
    pending: Vec<QiLogEntry>,
}

#[derive(Debug, Default)]
pub struct QiUniqueInstanceValidator {
    tallies: BTreeMap<QiTypeId, QiUniqueTally>,
}

impl QiUniqueInstanceValidator {
    /// Instances buffered so far for `ty`.
    pub fn buffered(&self, ty: &QiTypeId) -> usize {
        self.tallies.get(ty).map_or(0, |tally| tally.pending.len())
    }
}

impl QiValidator for QiUniqueInstanceValidator {
    fn name(&self) -> &str {
        SYMBOL
    }

    fn target(&self) -> QiValidatorTarget {
        QiValidatorTarget::Aggregate
    }

    fn search(&mut self, ctx: &mut QiExecutionContext<'_>) -> Result<()> {
        let marker = marker();
        let source = ctx.source();
        let self_test = QiTypeId::self_test_base();
        let test_only = QiMarker::test_only();
        let include_test_types = ctx.includes_test_types();
        let unique_types: Vec<QiTypeId> = source
            .types()
            .iter()
            .filter(|info| info.is_concrete() && info.carries(&marker))
            .filter(|info| !source.is_assignable(&info.id, &self_test))
            .filter(|info| include_test_types || !info.carries(&test_only))
            .map(|info| info.id.clone())
            .collect();
        let unit = ctx.unit_path().unwrap_or_default().to_string();

        for ty in unique_types {
            let instances = ctx.find_instances(&ty)?;
            if instances.is_empty() {
                continue;
            }
            let tally = self.tallies.entry(ty.clone()).or_default();
            if !tally.units.contains(&unit) {
                tally.units.push(unit.clone());
            }
            for object in instances {
                let entry = ctx
                    .entry(
                        QiLogSeverity::Warning,
                        SYMBOL,
                        format!("instance of unique type {ty}"),
                    )
                    .for_object(object.path);
                tally.pending.push(entry);
            }
        }
        Ok(())
    }

    fn validate(&mut self, target: QiValidationTarget<'_>, ctx: &mut QiExecutionContext<'_>) -> Result<()> {
        if !matches!(target, QiValidationTarget::Aggregate) {
            return Ok(());
        }
        for (ty, tally) in std::mem::take(&mut self.tallies) {
            let count = tally.pending.len();
            if count <= 1 {
                continue;
            }
            for entry in tally.pending {
                ctx.append(entry);
            }
            let summary = ctx.entry(
                QiLogSeverity::Error,
                SYMBOL,
                format!(
                    "type {ty} must be unique but {count} instances were found in {} unit(s): {}",
                    tally.units.len(),
                    tally.units.join(", ")
                ),
            );
            ctx.append(summary);
        }
        Ok(())
    }
}

pub fn unique_instance_factory() -> Box<dyn QiValidator> {
    Box::new(QiUniqueInstanceValidator::default())
}

pub fn type_info() -> QiTypeInfo {
    super::plugin_type(
        "qi.builtin.UniqueInstanceValidator",
        QiValidatorKind::CrossUnit,
        SYMBOL,
        unique_instance_factory,
    )
}
