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

//! Cursor over a bounded working set.

use std::ops::Range;

use crate::manager::QiManagerState;

/// Cursor, total and step size of one manager's working set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QiProgress {
    cursor: usize,
    total: usize,
    step_size: usize,
    started: bool,
}

impl QiProgress {
    pub fn new(step_size: usize) -> Self {
        QiProgress {
            cursor: 0,
            total: 0,
            step_size: step_size.max(1),
            started: false,
        }
    }

    /// Restarts the cursor over a working set of `total` items.
    pub fn reset(&mut self, total: usize) {
        self.cursor = 0;
        self.total = total;
        self.started = false;
    }

    /// Indices of the items the next step covers.
    pub fn next_window(&mut self) -> Range<usize> {
        self.started = true;
        self.cursor..(self.cursor + self.step_size).min(self.total)
    }

    pub fn advance(&mut self, items: usize) {
        self.cursor = (self.cursor + items).min(self.total);
    }

    pub fn finish(&mut self) {
        self.started = true;
        self.cursor = self.total;
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn step_size(&self) -> usize {
        self.step_size
    }

    pub fn remaining(&self) -> usize {
        self.total - self.cursor
    }

    pub fn is_complete(&self) -> bool {
        self.cursor >= self.total
    }

    /// `cursor / total` clamped to `[0, 1]`; exactly `1.0` for an empty or
    /// exhausted working set.
    pub fn fraction(&self) -> f32 {
        if self.total == 0 || self.cursor >= self.total {
            return 1.0;
        }
        (self.cursor as f32 / self.total as f32).clamp(0.0, 1.0)
    }

    pub fn state(&self, searched: bool) -> QiManagerState {
        if !searched && !self.started {
            QiManagerState::NotSearched
        } else if self.is_complete() {
            QiManagerState::Complete
        } else if self.cursor == 0 {
            QiManagerState::Searched
        } else {
            QiManagerState::Validating(self.cursor)
        }
    }
}
