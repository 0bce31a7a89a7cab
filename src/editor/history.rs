// SPDX-License-Identifier: MPL-2.0
//! Linear undo/redo history.
//!
//! Entries are full snapshots, so undo and redo never replay edits. Committing
//! after an undo discards every entry past the current position.

use crate::editor::Project;
use crate::error::Result;
use crate::media::{Mask, RasterImage};

/// Ordered snapshots with a cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct History<T> {
    entries: Vec<T>,
    /// `None` while empty, otherwise always within `0..entries.len()`.
    index: Option<usize>,
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: None,
        }
    }
}

impl<T> History<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `entry` after the current position, dropping any redo entries.
    pub fn commit(&mut self, entry: T) {
        let keep = self.index.map_or(0, |index| index + 1);
        self.entries.truncate(keep);
        self.entries.push(entry);
        self.index = Some(self.entries.len() - 1);
    }

    /// Steps back one entry and returns it.
    pub fn undo(&mut self) -> Option<&T> {
        match self.index {
            Some(index) if index > 0 => {
                self.index = Some(index - 1);
                self.entries.get(index - 1)
            }
            _ => None,
        }
    }

    /// Steps forward one entry and returns it.
    pub fn redo(&mut self) -> Option<&T> {
        match self.index {
            Some(index) if index + 1 < self.entries.len() => {
                self.index = Some(index + 1);
                self.entries.get(index + 1)
            }
            _ => None,
        }
    }

    /// Drops every entry.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.index = None;
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.index.is_some_and(|index| index > 0)
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.index
            .is_some_and(|index| index + 1 < self.entries.len())
    }

    #[must_use]
    pub fn current(&self) -> Option<&T> {
        self.index.and_then(|index| self.entries.get(index))
    }

    #[must_use]
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One project snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub raster: RasterImage,
    pub mask: Mask,
}

impl Project {
    /// Whether an undo operation is currently possible.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether a redo operation is currently possible.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    #[must_use]
    pub fn history(&self) -> &History<HistoryEntry> {
        &self.history
    }

    /// Restores the previous snapshot. Returns `false` when nothing changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the restored mask cannot be loaded into the painter.
    pub fn undo(&mut self) -> Result<bool> {
        let Some(entry) = self.history.undo().cloned() else {
            return Ok(false);
        };
        self.restore_snapshot(entry)?;
        tracing::debug!(index = ?self.history.index(), "undo");
        Ok(true)
    }

    /// Re-applies the next snapshot. Returns `false` when nothing changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the restored mask cannot be loaded into the painter.
    pub fn redo(&mut self) -> Result<bool> {
        let Some(entry) = self.history.redo().cloned() else {
            return Ok(false);
        };
        self.restore_snapshot(entry)?;
        tracing::debug!(index = ?self.history.index(), "redo");
        Ok(true)
    }

    pub(crate) fn commit_snapshot(&mut self) {
        let Some(raster) = self.raster.clone() else {
            return;
        };
        self.history.commit(HistoryEntry {
            raster,
            mask: self.mask.clone(),
        });
        tracing::debug!(
            index = ?self.history.index(),
            entries = self.history.len(),
            "history commit"
        );
    }

    fn restore_snapshot(&mut self, entry: HistoryEntry) -> Result<()> {
        let resized = self
            .raster
            .as_ref()
            .is_none_or(|current| current.dimensions() != entry.raster.dimensions());
        self.invalidate_generation();
        self.raster = Some(entry.raster);
        self.mask = entry.mask;
        self.generated = None;
        self.adjustments.reset();
        self.compare.reset();
        if resized {
            self.reset_canvas()?;
        }
        if let Some(painter) = self.painter.as_mut() {
            painter.load(&self.mask)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_history_has_no_current_entry() {
        let history: History<u32> = History::new();
        assert!(history.is_empty());
        assert_eq!(history.index(), None);
        assert_eq!(history.current(), None);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn undo_then_redo_returns_same_entry() {
        let mut history = History::new();
        history.commit("a");
        history.commit("b");

        assert_eq!(history.undo(), Some(&"a"));
        assert_eq!(history.redo(), Some(&"b"));
        assert_eq!(history.current(), Some(&"b"));
    }

    #[test]
    fn commit_after_undo_discards_redo_entries() {
        let mut history = History::new();
        history.commit(1);
        history.commit(2);
        history.commit(3);
        history.undo();
        history.undo();

        history.commit(4);
        assert_eq!(history.len(), 2);
        assert_eq!(history.current(), Some(&4));
        assert!(!history.can_redo());
    }

    #[test]
    fn undo_at_first_entry_is_noop() {
        let mut history = History::new();
        history.commit(1);
        assert_eq!(history.undo(), None);
        assert_eq!(history.index(), Some(0));
    }

    #[test]
    fn redo_at_last_entry_is_noop() {
        let mut history = History::new();
        history.commit(1);
        history.commit(2);
        assert_eq!(history.redo(), None);
        assert_eq!(history.index(), Some(1));
    }

    #[test]
    fn reset_empties_history() {
        let mut history = History::new();
        history.commit(1);
        history.commit(2);
        history.reset();
        assert!(history.is_empty());
        assert_eq!(history.index(), None);
        history.commit(3);
        assert_eq!(history.index(), Some(0));
    }
}
