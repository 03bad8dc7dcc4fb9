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

//! # Qi Plugin Module
//!
//! Validator plugins are discovered from the type catalog, instantiated
//! through their zero-argument constructors and filtered by override
//! decisions.
//!
//! - [`validator`]: the [`QiValidator`] trait, kinds and targets
//! - [`cache`]: discovery and instantiation per plugin scope

pub mod cache;
pub mod validator;

pub use cache::{
    QiLoadedValidator, QiPluginCache, QiPluginCandidate, QiPluginDiscovery, QiPluginRejection,
    QiPluginScope,
};
pub use validator::{
    execute_search, execute_validation, QiValidationTarget, QiValidator, QiValidatorFactory,
    QiValidatorKind, QiValidatorTarget,
};
