//! Nesting rules for container cells.
//!
//! A cell holds either one container child, or any number of free-form
//! non-container children ("free" mode), or a single non-container child
//! ("fill" mode). A drop that would break this is refused before anything is
//! written.

#[cfg(test)]
#[path = "layout_test.rs"]
mod layout_test;

use crate::doc::{CellMode, DocStore, Element, ElementId};
use crate::error::PlacementError;
use crate::group;
use crate::transform::{Point, to_logical};
use crate::zorder;

/// A container cell receiving a drop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropTarget {
    pub parent_id: ElementId,
    pub cell_index: usize,
    /// Screen position of the cell's top-left corner as rendered.
    pub cell_origin: Point,
}

impl DropTarget {
    #[must_use]
    pub fn new(parent_id: ElementId, cell_index: usize, cell_origin: Point) -> Self {
        Self { parent_id, cell_index, cell_origin }
    }
}

/// Children currently occupying a cell, in collection order.
#[must_use]
pub fn cell_children(doc: &DocStore, parent_id: ElementId, cell_index: usize) -> Vec<ElementId> {
    doc.iter()
        .filter(|e| e.parent_id == Some(parent_id) && e.cell_index == Some(cell_index))
        .map(|e| e.id)
        .collect()
}

/// Whether `element` sits in a fill cell of its parent.
#[must_use]
pub fn in_fill_cell(doc: &DocStore, element: &Element) -> bool {
    let (Some(parent_id), Some(cell)) = (element.parent_id, element.cell_index) else {
        return false;
    };
    doc.get(&parent_id)
        .and_then(|parent| parent.container.as_ref())
        .and_then(|layout| layout.cell(cell))
        == Some(CellMode::Fill)
}

/// Check whether an element may be dropped into `target`.
///
/// `incoming` is the element id when an existing element is being moved (it
/// is not counted as an occupant of its own cell); `None` for a new element.
/// Returns the cell's mode on success.
///
/// # Errors
///
/// Returns the first occupancy or nesting rule the drop would break.
pub fn check_placement(
    doc: &DocStore,
    target: &DropTarget,
    incoming_is_container: bool,
    incoming: Option<ElementId>,
) -> Result<CellMode, PlacementError> {
    let parent_id = target.parent_id;
    let cell = target.cell_index;
    let parent = doc.get(&parent_id).ok_or(PlacementError::UnknownParent(parent_id))?;
    let layout = parent.container.as_ref().ok_or(PlacementError::NotAContainer(parent_id))?;
    let mode = layout.cell(cell).ok_or(PlacementError::CellOutOfRange { parent: parent_id, cell })?;

    if let Some(id) = incoming {
        if id == parent_id || doc.descendants(id).contains(&parent_id) {
            return Err(PlacementError::WouldNestInSelf(id));
        }
    }

    let occupants: Vec<&Element> = cell_children(doc, parent_id, cell)
        .iter()
        .filter(|id| Some(**id) != incoming)
        .filter_map(|id| doc.get(id))
        .collect();

    if occupants.iter().any(|e| e.is_container()) {
        return Err(PlacementError::CellHoldsContainer { parent: parent_id, cell });
    }
    if mode == CellMode::Fill && !occupants.is_empty() {
        return Err(PlacementError::FillCellOccupied { parent: parent_id, cell });
    }
    if incoming_is_container && !occupants.is_empty() {
        return Err(PlacementError::ContainerNeedsEmptyCell { parent: parent_id, cell });
    }
    Ok(mode)
}

/// Logical position of a drop inside a cell.
///
/// Fill cells pin the child to the cell origin; free cells convert the drop
/// point relative to the cell's own top-left.
#[must_use]
pub fn drop_position(mode: CellMode, drop: Point, cell_origin: Point, scale: f64) -> Point {
    match mode {
        CellMode::Fill => Point::default(),
        CellMode::Free => to_logical(drop, cell_origin, scale),
    }
}

/// Move an existing element into `target` at screen point `drop`.
///
/// The element lands on top of its new sibling scope, its old scope is
/// renumbered, and it leaves any group (group members share one parent).
/// Returns false, changing nothing, when the drop is refused or `id` is
/// unknown or locked.
pub fn place(doc: &mut DocStore, id: ElementId, target: &DropTarget, drop: Point, scale: f64) -> bool {
    let Some(element) = doc.get(&id) else {
        return false;
    };
    if element.locked {
        tracing::debug!(%id, "placement ignored: element locked");
        return false;
    }
    let old_parent = element.parent_id;
    let mode = match check_placement(doc, target, element.is_container(), Some(id)) {
        Ok(mode) => mode,
        Err(reason) => {
            tracing::debug!(%id, %reason, "placement rejected");
            return false;
        }
    };

    if old_parent != Some(target.parent_id) {
        group::leave_group(doc, id);
    }
    let position = drop_position(mode, drop, target.cell_origin, scale);
    let rank = if old_parent == Some(target.parent_id) {
        doc.get(&id).map_or(0, |e| e.geometry.z_index)
    } else {
        zorder::next_rank(doc, Some(target.parent_id))
    };
    if let Some(element) = doc.get_mut(&id) {
        element.parent_id = Some(target.parent_id);
        element.cell_index = Some(target.cell_index);
        element.geometry.x = position.x;
        element.geometry.y = position.y;
        element.geometry.z_index = rank;
    }
    zorder::normalize_scope(doc, old_parent);
    tracing::debug!(%id, parent = %target.parent_id, cell = target.cell_index, ?mode, "element placed");
    true
}

/// Bring a loaded document back inside the nesting rules.
///
/// Elements whose parent is missing, not a container, or does not have their
/// cell are moved to the top level, as are members of a parent cycle. Each
/// cell then keeps the occupants that a drop in collection order would have
/// accepted; the rest are moved to the top level. Fill children are pinned to
/// the cell origin. Returns the ids that changed.
pub fn repair_nesting(doc: &mut DocStore) -> Vec<ElementId> {
    let mut changed = Vec::new();

    let mut detach: Vec<ElementId> = Vec::new();
    let mut stray_cells: Vec<ElementId> = Vec::new();
    for element in doc.iter() {
        match element.parent_id {
            None => {
                if element.cell_index.is_some() {
                    stray_cells.push(element.id);
                }
            }
            Some(parent_id) => {
                let has_cell = doc
                    .get(&parent_id)
                    .filter(|parent| parent.id != element.id)
                    .and_then(|parent| parent.container.as_ref())
                    .zip(element.cell_index)
                    .and_then(|(layout, cell)| layout.cell(cell))
                    .is_some();
                if !has_cell || in_parent_cycle(doc, element.id) {
                    detach.push(element.id);
                }
            }
        }
    }
    for id in stray_cells {
        if let Some(element) = doc.get_mut(&id) {
            element.cell_index = None;
            changed.push(id);
        }
    }
    for id in detach {
        detach_to_top(doc, id);
        changed.push(id);
    }

    let mut accepted: Vec<(ElementId, usize, CellMode, Vec<ElementId>)> = Vec::new();
    let mut rejected: Vec<ElementId> = Vec::new();
    let mut pinned: Vec<ElementId> = Vec::new();
    for element in doc.iter() {
        let (Some(parent_id), Some(cell)) = (element.parent_id, element.cell_index) else {
            continue;
        };
        let index = match accepted.iter().position(|(p, c, _, _)| *p == parent_id && *c == cell) {
            Some(index) => index,
            None => {
                let mode = doc
                    .get(&parent_id)
                    .and_then(|parent| parent.container.as_ref())
                    .and_then(|layout| layout.cell(cell))
                    .unwrap_or_default();
                accepted.push((parent_id, cell, mode, Vec::new()));
                accepted.len() - 1
            }
        };
        let (_, _, mode, occupants) = &mut accepted[index];
        let holds_container = occupants.iter().any(|id| doc.get(id).is_some_and(Element::is_container));
        let refused = holds_container
            || (*mode == CellMode::Fill && !occupants.is_empty())
            || (element.is_container() && !occupants.is_empty());
        if refused {
            rejected.push(element.id);
            continue;
        }
        occupants.push(element.id);
        if *mode == CellMode::Fill && Point::new(element.geometry.x, element.geometry.y) != Point::default() {
            pinned.push(element.id);
        }
    }
    for id in rejected {
        detach_to_top(doc, id);
        changed.push(id);
    }
    for id in pinned {
        if let Some(element) = doc.get_mut(&id) {
            element.geometry.x = 0.0;
            element.geometry.y = 0.0;
            changed.push(id);
        }
    }

    changed
}

/// Whether following parents from `id` comes back to `id`.
fn in_parent_cycle(doc: &DocStore, id: ElementId) -> bool {
    let mut current = doc.get(&id).and_then(|e| e.parent_id);
    let mut steps = 0;
    while let Some(parent) = current {
        if parent == id {
            return true;
        }
        steps += 1;
        if steps > doc.len() {
            return false;
        }
        current = doc.get(&parent).and_then(|e| e.parent_id);
    }
    false
}

fn detach_to_top(doc: &mut DocStore, id: ElementId) {
    if let Some(element) = doc.get_mut(&id) {
        element.parent_id = None;
        element.cell_index = None;
    }
}
