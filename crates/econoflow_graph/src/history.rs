// SPDX-License-Identifier: MIT OR Apache-2.0
//! Snapshot-based scene history for undo/redo.
//!
//! Each stored step is a full persisted document; restoring one goes
//! through the ordinary codec, so history and file round-trips share the
//! same reconstruction path. UI wiring lives with the host.

use crate::persist::SceneDoc;
use crate::scene::Scene;
use std::collections::VecDeque;
use thiserror::Error;

/// Default maximum history depth
pub const DEFAULT_HISTORY_LIMIT: usize = 32;

/// History errors
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Nothing to undo
    #[error("Nothing to undo")]
    NothingToUndo,

    /// Nothing to redo
    #[error("Nothing to redo")]
    NothingToRedo,
}

/// One stored history step
#[derive(Debug, Clone)]
pub struct HistoryStep {
    /// Human-readable description of the change
    pub description: String,
    /// Serialized scene state after the change
    pub doc: SceneDoc,
}

/// A bounded stack of scene snapshots with a cursor for undo/redo
#[derive(Debug)]
pub struct SceneHistory {
    steps: VecDeque<HistoryStep>,
    // number of steps considered "applied"; the current state is
    // steps[cursor - 1]
    cursor: usize,
    limit: usize,
}

impl SceneHistory {
    /// Create an empty history with the default depth limit
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }

    /// Create an empty history with a custom depth limit
    pub fn with_limit(limit: usize) -> Self {
        Self {
            steps: VecDeque::new(),
            cursor: 0,
            limit: limit.max(1),
        }
    }

    /// Snapshot the scene as the newest step, dropping any redo tail and
    /// the oldest steps beyond the limit.
    pub fn store(&mut self, scene: &Scene, description: impl Into<String>) {
        self.steps.truncate(self.cursor);
        self.steps.push_back(HistoryStep {
            description: description.into(),
            doc: scene.to_doc(),
        });
        while self.steps.len() > self.limit {
            self.steps.pop_front();
        }
        self.cursor = self.steps.len();
        tracing::debug!("stored history step ({} of {})", self.cursor, self.limit);
    }

    /// Whether an undo step is available
    pub fn can_undo(&self) -> bool {
        self.cursor > 1
    }

    /// Whether a redo step is available
    pub fn can_redo(&self) -> bool {
        self.cursor < self.steps.len()
    }

    /// Step back and return the document to restore
    pub fn undo(&mut self) -> Result<&HistoryStep, HistoryError> {
        if !self.can_undo() {
            return Err(HistoryError::NothingToUndo);
        }
        self.cursor -= 1;
        Ok(&self.steps[self.cursor - 1])
    }

    /// Step forward and return the document to restore
    pub fn redo(&mut self) -> Result<&HistoryStep, HistoryError> {
        if !self.can_redo() {
            return Err(HistoryError::NothingToRedo);
        }
        self.cursor += 1;
        Ok(&self.steps[self.cursor - 1])
    }

    /// Number of stored steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether no steps are stored
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Drop all stored steps
    pub fn clear(&mut self) {
        self.steps.clear();
        self.cursor = 0;
    }
}

impl Default for SceneHistory {
    fn default() -> Self {
        Self::new()
    }
}
