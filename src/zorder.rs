//! Paint-order ranks within sibling scopes.
//!
//! Every scope (elements sharing one `parent_id`, including the top level)
//! keeps its `z_index` values a dense permutation of `0..N`. Each reorder
//! rebuilds the scope's rank list and writes it back, so a scope that was
//! somehow left sparse is also healed by the next reorder.

#[cfg(test)]
#[path = "zorder_test.rs"]
mod zorder_test;

use crate::doc::{DocStore, ElementId};

/// A single-element reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZOrderOp {
    /// Swap with the neighbor one rank above.
    BringForward,
    /// Swap with the neighbor one rank below.
    SendBackward,
    /// Move to rank `N - 1`.
    BringToFront,
    /// Move to rank 0.
    SendToBack,
}

impl ZOrderOp {
    /// Apply to one element. Returns whether its rank changed.
    pub fn apply(self, doc: &mut DocStore, id: ElementId) -> bool {
        let Some(parent) = doc.get(&id).map(|e| e.parent_id) else {
            return false;
        };
        let mut order = doc.scope_by_rank(parent);
        let Some(pos) = order.iter().position(|other| *other == id) else {
            return false;
        };
        let last = order.len() - 1;
        let target = match self {
            Self::BringForward => (pos + 1).min(last),
            Self::SendBackward => pos.saturating_sub(1),
            Self::BringToFront => last,
            Self::SendToBack => 0,
        };
        if target != pos {
            let moved = order.remove(pos);
            order.insert(target, moved);
        }
        write_ranks(doc, &order);
        target != pos
    }

    /// Apply to each id in turn, in the given order.
    ///
    /// This is sequential single-element application: adjacent ids can
    /// leapfrog each other. Returns the ids whose rank changed at least once.
    pub fn apply_many(self, doc: &mut DocStore, ids: &[ElementId]) -> Vec<ElementId> {
        let mut changed = Vec::new();
        for id in ids {
            if self.apply(doc, *id) && !changed.contains(id) {
                changed.push(*id);
            }
        }
        changed
    }
}

pub fn bring_forward(doc: &mut DocStore, id: ElementId) -> bool {
    ZOrderOp::BringForward.apply(doc, id)
}

pub fn send_backward(doc: &mut DocStore, id: ElementId) -> bool {
    ZOrderOp::SendBackward.apply(doc, id)
}

pub fn bring_to_front(doc: &mut DocStore, id: ElementId) -> bool {
    ZOrderOp::BringToFront.apply(doc, id)
}

pub fn send_to_back(doc: &mut DocStore, id: ElementId) -> bool {
    ZOrderOp::SendToBack.apply(doc, id)
}

/// Rank of a new element appended on top of `parent`'s scope.
#[must_use]
pub fn next_rank(doc: &DocStore, parent: Option<ElementId>) -> usize {
    doc.iter().filter(|e| e.parent_id == parent).count()
}

/// Renumber `parent`'s scope to `0..N`, keeping relative order.
pub fn normalize_scope(doc: &mut DocStore, parent: Option<ElementId>) {
    let order = doc.scope_by_rank(parent);
    write_ranks(doc, &order);
}

/// Renumber every scope in the store.
pub fn normalize_all(doc: &mut DocStore) {
    let mut parents: Vec<Option<ElementId>> = Vec::new();
    for element in doc.iter() {
        if !parents.contains(&element.parent_id) {
            parents.push(element.parent_id);
        }
    }
    for parent in parents {
        normalize_scope(doc, parent);
    }
}

/// Whether `parent`'s scope ranks are exactly `0..N`.
#[must_use]
pub fn is_dense(doc: &DocStore, parent: Option<ElementId>) -> bool {
    let mut ranks: Vec<usize> = doc
        .iter()
        .filter(|e| e.parent_id == parent)
        .map(|e| e.geometry.z_index)
        .collect();
    ranks.sort_unstable();
    ranks.iter().enumerate().all(|(i, rank)| i == *rank)
}

fn write_ranks(doc: &mut DocStore, order: &[ElementId]) {
    for (rank, id) in order.iter().enumerate() {
        if let Some(element) = doc.get_mut(id) {
            element.geometry.z_index = rank;
        }
    }
}
