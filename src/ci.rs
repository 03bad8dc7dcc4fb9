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

//! # Qi CI Module
//!
//! Entry points for batch runs, such as a build pipeline gating on validation.
//! This is the only place where errors raised during a run are caught: they
//! become a failed [`QiCiOutcome`] carrying the error text.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::catalog::QiReflectionSource;
use crate::config::QiRunConfig;
use crate::diagnostics::{QiLogEntry, QiLogSeverity};
use crate::orchestrator::QiOrchestrator;
use crate::store::QiUnitStore;

/// Result of a batch validation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QiCiOutcome {
    /// True when the run finished and logged no error entries.
    pub passed: bool,
    pub message: String,
    pub entries: Vec<QiLogEntry>,
}

impl QiCiOutcome {
    fn failed(message: impl Into<String>, entries: Vec<QiLogEntry>) -> Self {
        QiCiOutcome {
            passed: false,
            message: message.into(),
            entries,
        }
    }

    pub fn errors(&self) -> impl Iterator<Item = &QiLogEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.severity == QiLogSeverity::Error)
    }
}

/// Runs `orchestrator` to completion and summarises the log.
pub fn run_for_ci<S: QiUnitStore>(orchestrator: &mut QiOrchestrator<S>) -> QiCiOutcome {
    if let Err(err) = orchestrator.run() {
        log::warn!("qi.ci.run: validation aborted - error={}", err);
        return QiCiOutcome::failed(
            err.to_string(),
            orchestrator.log_cache().entries().to_vec(),
        );
    }

    let log = orchestrator.log_cache();
    let summary = log.summary();
    let passed = summary.errors == 0;
    let message = if passed {
        format!("validation passed with {} warning(s)", summary.warnings)
    } else {
        format!(
            "validation failed with {} error(s) and {} warning(s)",
            summary.errors, summary.warnings
        )
    };
    log::info!(
        "qi.ci.run: validation finished - passed={}, errors={}, warnings={}",
        passed,
        summary.errors,
        summary.warnings
    );
    QiCiOutcome {
        passed,
        message,
        entries: log.entries().to_vec(),
    }
}

/// Builds an orchestrator from `config` and runs it for CI. Configuration
/// errors fail the outcome like any other error.
pub fn validate_for_ci<S: QiUnitStore>(
    store: S,
    source: Rc<dyn QiReflectionSource>,
    config: &QiRunConfig,
) -> QiCiOutcome {
    match QiOrchestrator::from_config(store, source, config) {
        Ok(mut orchestrator) => run_for_ci(&mut orchestrator),
        Err(err) => {
            log::warn!("qi.ci.run: validation could not start - error={}", err);
            QiCiOutcome::failed(err.to_string(), Vec::new())
        }
    }
}
