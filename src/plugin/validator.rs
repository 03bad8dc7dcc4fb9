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

//! # Validator Contract
//!
//! Every rule plugin implements [`QiValidator`]. Plugins come in four kinds:
//!
//! - **Field**: reacts to fields carrying a marker and inspects their values
//! - **Object**: reacts to objects of a target type
//! - **UnitCollection**: scans the current scope during search and reports
//!   on what it gathered as one aggregate item
//! - **CrossUnit**: buffers tentative findings while every unit is searched
//!   and decides what to report once all units have been seen
//!
//! A plugin's kind and symbol are declared on its catalog type through markers,
//! so they are known before the plugin is constructed.

use std::fmt;

use crate::catalog::{QiMarker, QiReflectionSource, QiTypeId, QiTypeInfo};
use crate::context::QiExecutionContext;
use crate::errors::{QiError, Result};
use crate::record::QiObjectRef;

/// Zero-argument constructor of a validator plugin.
pub type QiValidatorFactory = fn() -> Box<dyn QiValidator>;

/// Kinds of validator plugins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QiValidatorKind {
    Field,
    Object,
    UnitCollection,
    CrossUnit,
}

impl QiValidatorKind {
    pub const ALL: [QiValidatorKind; 4] = [
        QiValidatorKind::Field,
        QiValidatorKind::Object,
        QiValidatorKind::UnitCollection,
        QiValidatorKind::CrossUnit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QiValidatorKind::Field => "field",
            QiValidatorKind::Object => "object",
            QiValidatorKind::UnitCollection => "unit",
            QiValidatorKind::CrossUnit => "cross_unit",
        }
    }

    /// Marker a plugin type of this kind must carry.
    pub fn marker(&self) -> QiMarker {
        QiMarker::new(format!("qi.validator.{}", self.as_str()))
    }

    /// Base capability a plugin type of this kind must derive from.
    pub fn base(&self) -> QiTypeId {
        match self {
            QiValidatorKind::Field => QiTypeId::from("qi.FieldValidator"),
            QiValidatorKind::Object => QiTypeId::from("qi.ObjectValidator"),
            QiValidatorKind::UnitCollection => QiTypeId::from("qi.UnitValidator"),
            QiValidatorKind::CrossUnit => QiTypeId::from("qi.CrossUnitValidator"),
        }
    }

    /// Kind declared by the markers of `info`, if there is exactly one.
    pub fn declared_by(info: &QiTypeInfo) -> std::result::Result<Self, usize> {
        let declared: Vec<QiValidatorKind> = Self::ALL
            .iter()
            .copied()
            .filter(|kind| info.carries(&kind.marker()))
            .collect();
        let marker_count: usize = Self::ALL
            .iter()
            .map(|kind| info.markers_named(&kind.marker().name).count())
            .sum();
        match declared.as_slice() {
            [kind] if marker_count == 1 => Ok(*kind),
            _ => Err(marker_count),
        }
    }
}

impl fmt::Display for QiValidatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a validator reacts to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QiValidatorTarget {
    /// Objects whose type is, or derives from, the given type.
    Type(QiTypeId),
    /// Objects whose type declares at least one field carrying the marker.
    FieldMarker(QiMarker),
    /// No per-object dispatch; the plugin validates what it gathered itself.
    Aggregate,
}

/// What a single validate call looks at.
#[derive(Clone, Copy, Debug)]
pub enum QiValidationTarget<'o> {
    Object(&'o QiObjectRef),
    Aggregate,
}

/// Contract every validator plugin fulfils.
pub trait QiValidator: fmt::Debug {
    /// Human-readable name used as the source of reported diagnostics.
    fn name(&self) -> &str;

    fn target(&self) -> QiValidatorTarget;

    /// Whether objects of type `ty` should be dispatched to this plugin.
    fn applies_to(&self, ty: &QiTypeInfo, source: &dyn QiReflectionSource) -> bool {
        match self.target() {
            QiValidatorTarget::Type(target) => source.is_assignable(&ty.id, &target),
            QiValidatorTarget::FieldMarker(marker) => ty.fields.iter().any(|f| f.carries(&marker)),
            QiValidatorTarget::Aggregate => false,
        }
    }

    /// Scans the current scope. Cross-unit plugins buffer here; project
    /// plugins may declare extra assets through the context.
    fn search(&mut self, _ctx: &mut QiExecutionContext<'_>) -> Result<()> {
        Ok(())
    }

    fn validate(&mut self, target: QiValidationTarget<'_>, ctx: &mut QiExecutionContext<'_>) -> Result<()>;
}

fn attribute(validator: &dyn QiValidator, err: QiError) -> QiError {
    match err {
        err @ QiError::Validator { .. } => err,
        other => QiError::validator(validator.name(), other.to_string()),
    }
}

/// Runs a plugin's search step, attributing failures to the plugin.
pub fn execute_search(validator: &mut dyn QiValidator, ctx: &mut QiExecutionContext<'_>) -> Result<()> {
    validator
        .search(ctx)
        .map_err(|err| attribute(validator, err))
}

/// Runs a plugin's validate step, attributing failures to the plugin.
pub fn execute_validation(
    validator: &mut dyn QiValidator,
    target: QiValidationTarget<'_>,
    ctx: &mut QiExecutionContext<'_>,
) -> Result<()> {
    validator
        .validate(target, ctx)
        .map_err(|err| attribute(validator, err))
}
