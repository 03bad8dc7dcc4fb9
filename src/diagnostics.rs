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

//! # Qi Diagnostics Module
//!
//! Validators report findings as [`QiLogEntry`] values appended to a single
//! [`QiLogCache`]. The cache is ordered and append-only: entries are built
//! completely before they are appended and are never edited or removed
//! afterwards, except by [`QiLogCache::clear`] when a new run starts.
//!
//! The cache is read by whatever presents results (file writers, tree views,
//! CI summaries). None of those live in this crate.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Severity of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QiLogSeverity {
    Info,
    Warning,
    Error,
}

impl QiLogSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            QiLogSeverity::Info => "INFO",
            QiLogSeverity::Warning => "WARNING",
            QiLogSeverity::Error => "ERROR",
        }
    }
}

impl fmt::Display for QiLogSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the diagnosed object lives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QiLogArea {
    #[default]
    None,
    Unit,
    Project,
}

/// One diagnostic.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QiLogEntry {
    pub severity: QiLogSeverity,
    pub area: QiLogArea,
    /// Name of the validator (or framework component) that produced it.
    pub source: String,
    pub message: String,
    #[serde(default)]
    pub unit_path: String,
    #[serde(default)]
    pub object_path: String,
}

impl QiLogEntry {
    pub fn new(
        severity: QiLogSeverity,
        source: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        QiLogEntry {
            severity,
            area: QiLogArea::None,
            source: source.into(),
            message: message.into(),
            unit_path: String::new(),
            object_path: String::new(),
        }
    }

    pub fn info(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(QiLogSeverity::Info, source, message)
    }

    pub fn warning(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(QiLogSeverity::Warning, source, message)
    }

    pub fn error(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(QiLogSeverity::Error, source, message)
    }

    pub fn with_area(mut self, area: QiLogArea) -> Self {
        self.area = area;
        self
    }

    pub fn in_unit(mut self, unit_path: impl Into<String>) -> Self {
        self.unit_path = unit_path.into();
        self
    }

    pub fn for_object(mut self, object_path: impl Into<String>) -> Self {
        self.object_path = object_path.into();
        self
    }
}

impl fmt::Display for QiLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.source, self.message)?;
        if !self.unit_path.is_empty() {
            write!(f, " (unit={})", self.unit_path)?;
        }
        if !self.object_path.is_empty() {
            write!(f, " (object={})", self.object_path)?;
        }
        Ok(())
    }
}

/// Per-severity entry counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct QiLogSummary {
    pub info: usize,
    pub warnings: usize,
    pub errors: usize,
}

/// Ordered, append-only sink of diagnostics.
///
/// Not synchronised: the whole framework runs on the host's thread.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct QiLogCache {
    entries: Vec<QiLogEntry>,
}

impl QiLogCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, entry: QiLogEntry) {
        log::debug!(
            "qi.log.append: diagnostic recorded - severity={}, source={}, unit={}, object={}, message={}",
            entry.severity,
            entry.source,
            entry.unit_path,
            entry.object_path,
            entry.message
        );
        self.entries.push(entry);
    }

    /// Drops every entry. Only meant to be called when a new run starts.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn has_entries(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&QiLogEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[QiLogEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, QiLogEntry> {
        self.entries.iter()
    }

    pub fn count(&self, severity: QiLogSeverity) -> usize {
        self.entries.iter().filter(|e| e.severity == severity).count()
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|e| e.severity == QiLogSeverity::Error)
    }

    pub fn summary(&self) -> QiLogSummary {
        let mut summary = QiLogSummary::default();
        for entry in &self.entries {
            match entry.severity {
                QiLogSeverity::Info => summary.info += 1,
                QiLogSeverity::Warning => summary.warnings += 1,
                QiLogSeverity::Error => summary.errors += 1,
            }
        }
        summary
    }

    pub fn as_json(&self) -> Value {
        serde_json::to_value(&self.entries).unwrap_or(Value::Null)
    }
}

impl<'a> IntoIterator for &'a QiLogCache {
    type Item = &'a QiLogEntry;
    type IntoIter = std::slice::Iter<'a, QiLogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
