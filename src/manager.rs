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

//! # Qi Manager Module
//!
//! A validator manager owns the plugins of one scope and a working set. It
//! goes through the same states for every scope:
//!
//! `NotSearched -> Searched -> Validating(cursor) -> Complete`
//!
//! `search` fills the working set, then the set is validated either at once
//! (`validate_all`) or a bounded step at a time (`continue_validation`). Both
//! paths run the same per-item code in the same order, so they leave identical
//! diagnostics behind.
//!
//! - [`unit`]: live instances of the currently open unit
//! - [`project`]: project assets, including assets declared by plugins
//! - [`cross_unit`]: plugins aggregating findings across every unit

pub mod cross_unit;
pub mod progress;
pub mod project;
pub mod unit;
pub(crate) mod worklist;

use crate::context::QiExecutionContext;
use crate::errors::Result;

pub use cross_unit::QiCrossUnitValidatorManager;
pub use progress::QiProgress;
pub use project::QiProjectValidatorManager;
pub use unit::QiUnitValidatorManager;

/// Lifecycle of a manager's working set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QiManagerState {
    NotSearched,
    Searched,
    Validating(usize),
    Complete,
}

/// Contract shared by the unit, project and cross-unit managers.
pub trait QiValidatorManager {
    /// Populates the working set from the scope `ctx` points at.
    fn search(&mut self, ctx: &mut QiExecutionContext<'_>) -> Result<()>;

    /// Validates every remaining item.
    fn validate_all(&mut self, ctx: &mut QiExecutionContext<'_>) -> Result<()>;

    /// Validates at most one step of items. Returns whether work remains.
    fn continue_validation(&mut self, ctx: &mut QiExecutionContext<'_>) -> Result<bool>;

    /// Validated fraction of the working set in `[0, 1]`.
    fn progress(&self) -> f32;

    fn is_complete(&self) -> bool;

    fn state(&self) -> QiManagerState;

    /// `(validated, total)` item counts.
    fn counts(&self) -> (usize, usize);
}
