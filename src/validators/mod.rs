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

//! # Validators Module
//!
//! Validator plugins bundled with Qi. Each module exposes the plugin type, a
//! zero-argument factory and a `type_info()` describing the plugin type to the
//! catalog (base, kind marker, symbol marker and factory).
//!
//! ## Bundled Validators
//!
//! - **required**: `qi.required_field`, marked fields must hold a value
//! - **asset_reference**: `qi.asset_reference`, marked fields must name a
//!   loadable asset
//! - **unique_instance**: `qi.unique_instance`, types marked unique may have
//!   one instance across all units
//! - **asset_contract**: `qi.asset_contract`, project contracts listing
//!   additional assets to validate
//!
//! ## Usage
//!
//! ```rust
//! use qix::catalog::QiTypeCatalog;
//!
//! let catalog = QiTypeCatalog::with_builtin_validators().unwrap();
//! assert_eq!(catalog.len(), 4);
//! ```

pub mod asset_contract;
pub mod asset_reference;
pub mod required;
pub mod unique_instance;

use crate::catalog::{QiMarker, QiTypeCatalog, QiTypeInfo};
use crate::errors::Result;
use crate::plugin::{QiValidatorFactory, QiValidatorKind};

/// Module name recorded for bundled plugin types.
pub const BUILTIN_MODULE: &str = "qi.builtin";

/// Describes a bundled plugin type of `kind` declaring `symbol`.
pub(crate) fn plugin_type(
    id: &str,
    kind: QiValidatorKind,
    symbol: &str,
    factory: QiValidatorFactory,
) -> QiTypeInfo {
    QiTypeInfo::new(id, BUILTIN_MODULE)
        .with_base(kind.base())
        .with_marker(kind.marker())
        .with_marker(QiMarker::symbol(symbol))
        .with_factory(factory)
}

/// Registers every bundled validator type.
pub fn register_builtin(catalog: &mut QiTypeCatalog) -> Result<()> {
    catalog.register_all([
        required::type_info(),
        asset_reference::type_info(),
        unique_instance::type_info(),
        asset_contract::type_info(),
    ])
}
