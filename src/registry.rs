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

//! # Qi Type Registry Module
//!
//! A [`QiTypeRegistry`] is the filtered view of a reflection source that one
//! discovery pass works with: every concrete type deriving from a base
//! capability and carrying a required marker, minus whatever the ignore rules
//! exclude.
//!
//! Ignore rules are predicates. They are checked when candidates are added and
//! are also swept retroactively over the types already collected, so the final
//! set never depends on whether `ignore_*` was called before or after
//! `add_candidates`.

use std::rc::Rc;

use crate::catalog::{QiMarker, QiReflectionSource, QiTypeId, QiTypeInfo};

/// Ordered, de-duplicated set of types selected from a reflection source.
pub struct QiTypeRegistry {
    source: Rc<dyn QiReflectionSource>,
    types: Vec<QiTypeId>,
    ignored_types: Vec<QiTypeId>,
    ignored_markers: Vec<QiMarker>,
}

impl QiTypeRegistry {
    pub fn new(source: Rc<dyn QiReflectionSource>) -> Self {
        QiTypeRegistry {
            source,
            types: Vec::new(),
            ignored_types: Vec::new(),
            ignored_markers: Vec::new(),
        }
    }

    /// Appends every concrete type assignable to `base` that carries `marker`.
    ///
    /// Returns how many types were added by this call. Zero matches is not an
    /// error.
    pub fn add_candidates(&mut self, base: &QiTypeId, marker: &QiMarker) -> usize {
        let mut added = 0;
        for info in self.source.types() {
            if !info.is_concrete()
                || !info.carries(marker)
                || !self.source.is_assignable(&info.id, base)
                || self.is_ignored(info)
                || self.types.contains(&info.id)
            {
                continue;
            }
            self.types.push(info.id.clone());
            added += 1;
        }
        log::debug!(
            "qi.registry.add: candidates added - base={}, marker={}, added={}, total={}",
            base,
            marker,
            added,
            self.types.len()
        );
        added
    }

    /// Removes, now and in the future, every type assignable to `ty`.
    pub fn ignore_type(&mut self, ty: &QiTypeId) {
        if !self.ignored_types.contains(ty) {
            self.ignored_types.push(ty.clone());
        }
        let source = Rc::clone(&self.source);
        self.types.retain(|id| !source.is_assignable(id, ty));
    }

    /// Removes, now and in the future, every type carrying `marker`.
    pub fn ignore_marker(&mut self, marker: &QiMarker) {
        if !self.ignored_markers.contains(marker) {
            self.ignored_markers.push(marker.clone());
        }
        let source = Rc::clone(&self.source);
        self.types.retain(|id| {
            source
                .find(id)
                .map(|info| !info.carries(marker))
                .unwrap_or(true)
        });
    }

    fn is_ignored(&self, info: &QiTypeInfo) -> bool {
        self.ignored_types
            .iter()
            .any(|ignored| self.source.is_assignable(&info.id, ignored))
            || self.ignored_markers.iter().any(|marker| info.carries(marker))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn contains(&self, ty: &QiTypeId) -> bool {
        self.types.contains(ty)
    }

    pub fn get(&self, index: usize) -> Option<&QiTypeInfo> {
        self.types.get(index).and_then(|id| self.source.find(id))
    }

    pub fn ids(&self) -> &[QiTypeId] {
        &self.types
    }

    pub fn iter(&self) -> impl Iterator<Item = &QiTypeInfo> + '_ {
        self.types.iter().filter_map(|id| self.source.find(id))
    }

    pub fn source(&self) -> &dyn QiReflectionSource {
        self.source.as_ref()
    }
}

impl std::fmt::Debug for QiTypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QiTypeRegistry")
            .field("types", &self.types)
            .field("ignored_types", &self.ignored_types)
            .field("ignored_markers", &self.ignored_markers)
            .finish()
    }
}
