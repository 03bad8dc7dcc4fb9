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

//! # Qi Error Module
//!
//! This module defines the error types used throughout the Qi validation
//! framework for consistent error handling and reporting.
//!
//! ## Error Categories
//!
//! - **Io**: Filesystem errors while reading run configuration
//! - **Configuration**: Invalid unit-selection modes, unreadable configuration,
//!   duplicate type registrations
//! - **Store**: Failures reported by the unit store (unknown unit path, ...)
//! - **Validator**: Failures raised inside a validator's search or validate step
//! - **Orchestrator**: Failures while sequencing validation phases
//! - **Serde**: Serialization/deserialization errors
//! - **Internal**: Unexpected internal failures
//!
//! Validator failures are never recovered by the scheduler. They travel out of
//! [`crate::orchestrator::QiOrchestrator::run`] unchanged and are converted into
//! a failed outcome only by the CI entry point in [`crate::ci`].
//!
//! ## Usage
//!
//! ```rust
//! use qix::errors::{Result, QiError};
//!
//! fn parse_step(raw: &str) -> Result<usize> {
//!     raw.parse::<usize>()
//!         .map_err(|err| QiError::configuration(format!("invalid step size: {err}")))
//! }
//! ```

use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Convenience result type used throughout Qi.
pub type Result<T> = std::result::Result<T, QiError>;

/// Canonical error enumeration for Qi.
#[derive(Clone, Debug, Error, PartialEq, Serialize, Deserialize)]
pub enum QiError {
    /// Errors originating from filesystem IO.
    #[error("io error: {0}")]
    Io(String),

    /// Invalid run configuration. Raised immediately, before any work starts.
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// Failures reported by the unit store collaborator.
    #[error("store error: {message}")]
    Store { message: String },

    /// Any failure raised by a validator implementation.
    #[error("validator '{validator}' failed: {message}")]
    Validator { validator: String, message: String },

    /// Failures that occur while sequencing validation phases.
    #[error("orchestrator error in phase '{phase}': {message}")]
    Orchestrator { phase: String, message: String },

    /// Wrapper for serde-style serialization issues.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Catch-all variant for unexpected situations.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<io::Error> for QiError {
    fn from(err: io::Error) -> Self {
        QiError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for QiError {
    fn from(err: serde_json::Error) -> Self {
        QiError::Serde(err.to_string())
    }
}

#[cfg(feature = "yaml")]
impl From<serde_yaml::Error> for QiError {
    fn from(err: serde_yaml::Error) -> Self {
        QiError::Serde(err.to_string())
    }
}

impl QiError {
    /// Helper to construct configuration errors.
    pub fn configuration<T: Into<String>>(message: T) -> Self {
        QiError::Configuration {
            message: message.into(),
        }
    }

    /// Helper to construct store errors.
    pub fn store<T: Into<String>>(message: T) -> Self {
        QiError::Store {
            message: message.into(),
        }
    }

    /// Helper to construct validator errors.
    pub fn validator(name: impl Into<String>, message: impl Into<String>) -> Self {
        QiError::Validator {
            validator: name.into(),
            message: message.into(),
        }
    }

    /// Helper to construct orchestrator errors.
    pub fn orchestrator(phase: impl Into<String>, message: impl Into<String>) -> Self {
        QiError::Orchestrator {
            phase: phase.into(),
            message: message.into(),
        }
    }

    /// Helper to construct internal errors.
    pub fn internal<T: Into<String>>(message: T) -> Self {
        QiError::Internal(message.into())
    }
}
