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

//! # Qi Object Record Module
//!
//! [`QiObjectRef`] is the handle the unit store hands out for one live
//! instance or project asset. The framework never owns the underlying object;
//! a record only carries what validators need to inspect it: a path, the
//! runtime type and a JSON payload with the object's field values.
//!
//! ```rust
//! use qix::record::QiObjectRef;
//! use serde_json::json;
//!
//! let light = QiObjectRef::new("Lobby/Lamp", "Light", json!({"intensity": 2.5}))
//!     .in_unit("levels/lobby.unit");
//! assert_eq!(light.field("intensity"), Some(&json!(2.5)));
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::QiTypeId;

/// Reference to one object owned by the unit store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QiObjectRef {
    /// Hierarchical path of the object inside its unit, or the asset path.
    pub path: String,

    /// Runtime type used to dispatch validators.
    pub type_id: QiTypeId,

    /// Unit the object lives in. `None` for project assets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    /// Field values keyed by field name.
    pub payload: Value,
}

impl QiObjectRef {
    pub fn new(path: impl Into<String>, type_id: impl Into<QiTypeId>, payload: Value) -> Self {
        QiObjectRef {
            path: path.into(),
            type_id: type_id.into(),
            unit: None,
            payload,
        }
    }

    pub fn in_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Value of a top-level field, if the payload is an object containing it.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.payload.as_object().and_then(|map| map.get(name))
    }
}
