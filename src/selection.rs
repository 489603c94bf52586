//! The current selection: an ordered set of element ids.
//!
//! Single and multi-selection share one representation. Order is the order in
//! which ids were selected and drives batch operations such as reordering.
//! The set itself does not know about the document; the engine filters ids
//! against the store before handing them over and prunes deleted ids.

#[cfg(test)]
#[path = "selection_test.rs"]
mod selection_test;

use crate::doc::ElementId;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: Vec<ElementId>,
}

impl SelectionSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selection with exactly `id`.
    pub fn select_single(&mut self, id: ElementId) {
        self.ids.clear();
        self.ids.push(id);
    }

    /// Replace the selection wholesale. Duplicates keep their first position.
    pub fn select_many<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = ElementId>,
    {
        self.ids.clear();
        for id in ids {
            if !self.ids.contains(&id) {
                self.ids.push(id);
            }
        }
    }

    /// The set that results from adding `id` if absent, or removing it if present.
    ///
    /// Does not modify `self`; feed the result to [`Self::select_many`].
    #[must_use]
    pub fn toggled(&self, id: ElementId) -> Vec<ElementId> {
        if self.contains(&id) {
            self.ids.iter().copied().filter(|other| *other != id).collect()
        } else {
            let mut next = self.ids.clone();
            next.push(id);
            next
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Drop any of `removed` from the selection. Returns whether anything changed.
    pub fn prune(&mut self, removed: &[ElementId]) -> bool {
        let before = self.ids.len();
        self.ids.retain(|id| !removed.contains(id));
        self.ids.len() != before
    }

    #[must_use]
    pub fn contains(&self, id: &ElementId) -> bool {
        self.ids.contains(id)
    }

    #[must_use]
    pub fn ids(&self) -> &[ElementId] {
        &self.ids
    }

    /// The selected id when exactly one element is selected.
    #[must_use]
    pub fn single(&self) -> Option<ElementId> {
        match self.ids.as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
