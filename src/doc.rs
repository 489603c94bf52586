//! Document model: placed elements, their geometry, and the in-memory store.
//!
//! This module defines the data types that describe what is on the surface
//! (`Element`, `Geometry`, `ContainerLayout`), a sparse-update type for
//! incremental edits (`ElementPatch`), and the store that owns all live
//! elements (`DocStore`).
//!
//! Relations between elements (`parent_id`, `group_id`) are plain ids, never
//! references. The store keeps insertion order so that every scan over the
//! collection is deterministic.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an element.
pub type ElementId = Uuid;

/// Shared identifier carried by every member of a group.
pub type GroupId = Uuid;

/// Occupancy policy of a container cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellMode {
    /// Any number of freely positioned non-container children.
    #[default]
    Free,
    /// At most one child, sized by the rendering layer to fill the cell.
    Fill,
}

/// Cell definitions of a container-kind element, indexed by `cell_index`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContainerLayout {
    pub cells: Vec<CellMode>,
}

impl ContainerLayout {
    #[must_use]
    pub fn new(cells: Vec<CellMode>) -> Self {
        Self { cells }
    }

    /// Mode of the cell at `index`, if the container has that many cells.
    #[must_use]
    pub fn cell(&self, index: usize) -> Option<CellMode> {
        self.cells.get(index).copied()
    }
}

/// Position, size and paint attributes of an element in logical units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// Left edge, relative to the parent cell (or the surface when top-level).
    pub x: f64,
    /// Top edge, relative to the parent cell (or the surface when top-level).
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Paint rank within the sibling scope; dense from 0.
    pub z_index: usize,
    pub opacity: f64,
}

impl Geometry {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height, z_index: 0, opacity: 1.0 }
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[must_use]
    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    #[must_use]
    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    /// Whether the logical point `(px, py)` lies inside the bounding box.
    #[must_use]
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.right() && py >= self.y && py <= self.bottom()
    }
}

/// A placed element as stored in the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    /// Opaque renderer tag (chart, text, image, ...).
    pub kind: String,
    /// Present only for container-kind elements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<ContainerLayout>,
    pub geometry: Geometry,
    pub visible: bool,
    /// Locked elements never move or resize.
    pub locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<ElementId>,
    /// Slot of the parent's layout; meaningful only with `parent_id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<GroupId>,
    /// Renderer payload. Never read by the engine.
    #[serde(default)]
    pub props: serde_json::Value,
}

impl Element {
    /// Build a visible, unlocked, top-level element with a fresh id.
    #[must_use]
    pub fn new(kind: impl Into<String>, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: kind.into(),
            container: None,
            geometry: Geometry::new(x, y, width, height),
            visible: true,
            locked: false,
            parent_id: None,
            cell_index: None,
            group_id: None,
            props: serde_json::Value::Null,
        }
    }

    /// Build a container-kind element with the given cells.
    #[must_use]
    pub fn container(kind: impl Into<String>, x: f64, y: f64, width: f64, height: f64, cells: Vec<CellMode>) -> Self {
        Self { container: Some(ContainerLayout::new(cells)), ..Self::new(kind, x, y, width, height) }
    }

    #[must_use]
    pub fn is_container(&self) -> bool {
        self.container.is_some()
    }
}

/// Sparse update for an element. Only present fields are applied.
///
/// Paint rank is deliberately absent: ranks are owned by the z-order functions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    /// Props keys to merge or remove (null values delete keys).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub props: Option<serde_json::Value>,
}

impl ElementPatch {
    /// Patch that moves an element.
    #[must_use]
    pub fn position(x: f64, y: f64) -> Self {
        Self { x: Some(x), y: Some(y), ..Default::default() }
    }

    /// Patch that replaces position and size.
    #[must_use]
    pub fn bounds(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x: Some(x), y: Some(y), width: Some(width), height: Some(height), ..Default::default() }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// In-memory store of elements, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct DocStore {
    elements: IndexMap<ElementId, Element>,
}

impl DocStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self { elements: IndexMap::new() }
    }

    /// Insert or replace an element. A replaced element keeps its position in
    /// the collection order.
    pub fn insert(&mut self, element: Element) {
        self.elements.insert(element.id, element);
    }

    #[must_use]
    pub fn get(&self, id: &ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &ElementId) -> Option<&mut Element> {
        self.elements.get_mut(id)
    }

    #[must_use]
    pub fn contains(&self, id: &ElementId) -> bool {
        self.elements.contains_key(id)
    }

    /// All elements in collection order.
    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.elements.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.elements.values_mut()
    }

    /// Number of elements currently in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if the store contains no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Replace all elements with a full snapshot.
    pub fn load_snapshot(&mut self, elements: Vec<Element>) {
        self.elements.clear();
        for element in elements {
            self.elements.insert(element.id, element);
        }
    }

    /// Raise every width and height below `min_size` to it. Returns the ids
    /// that changed.
    pub fn floor_sizes(&mut self, min_size: f64) -> Vec<ElementId> {
        let mut changed = Vec::new();
        for element in self.elements.values_mut() {
            let geometry = &mut element.geometry;
            if geometry.width < min_size || geometry.height < min_size {
                geometry.width = geometry.width.max(min_size);
                geometry.height = geometry.height.max(min_size);
                changed.push(element.id);
            }
        }
        changed
    }

    /// Apply a partial update. Width and height are floored at `min_size`.
    /// Returns false if the element doesn't exist.
    pub fn apply_patch(&mut self, id: &ElementId, patch: &ElementPatch, min_size: f64) -> bool {
        let Some(element) = self.elements.get_mut(id) else {
            return false;
        };
        let geometry = &mut element.geometry;
        if let Some(x) = patch.x {
            geometry.x = x;
        }
        if let Some(y) = patch.y {
            geometry.y = y;
        }
        if let Some(w) = patch.width {
            geometry.width = w.max(min_size);
        }
        if let Some(h) = patch.height {
            geometry.height = h.max(min_size);
        }
        if let Some(opacity) = patch.opacity {
            geometry.opacity = opacity.clamp(0.0, 1.0);
        }
        if let Some(visible) = patch.visible {
            element.visible = visible;
        }
        if let Some(locked) = patch.locked {
            element.locked = locked;
        }
        if let Some(ref props) = patch.props {
            merge_props(&mut element.props, props);
        }
        true
    }

    /// Ids of the sibling scope under `parent`, in collection order.
    #[must_use]
    pub fn children_of(&self, parent: Option<ElementId>) -> Vec<ElementId> {
        self.elements
            .values()
            .filter(|e| e.parent_id == parent)
            .map(|e| e.id)
            .collect()
    }

    /// Ids of every element nested (transitively) under `id`, breadth-first.
    #[must_use]
    pub fn descendants(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut frontier = vec![id];
        while let Some(parent) = frontier.pop() {
            for child in self.children_of(Some(parent)) {
                if !out.contains(&child) {
                    out.push(child);
                    frontier.push(child);
                }
            }
        }
        out
    }

    /// Parent chain of `id`, nearest first. Stops at a missing parent or
    /// when the chain loops back on itself.
    #[must_use]
    pub fn ancestors(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut current = self.elements.get(&id).and_then(|e| e.parent_id);
        while let Some(parent) = current {
            if parent == id || out.contains(&parent) || !self.elements.contains_key(&parent) {
                break;
            }
            out.push(parent);
            current = self.elements.get(&parent).and_then(|e| e.parent_id);
        }
        out
    }

    /// Remove an element and, for containers, every descendant.
    ///
    /// Returns the removed elements, root first. Empty if `id` is unknown.
    pub fn remove_cascade(&mut self, id: &ElementId) -> Vec<Element> {
        if !self.elements.contains_key(id) {
            return Vec::new();
        }
        let mut doomed = vec![*id];
        doomed.extend(self.descendants(*id));
        doomed
            .iter()
            .filter_map(|doomed_id| self.elements.shift_remove(doomed_id))
            .collect()
    }

    /// Sibling scope under `parent` sorted by paint rank (ties by collection order).
    #[must_use]
    pub fn scope_by_rank(&self, parent: Option<ElementId>) -> Vec<ElementId> {
        let mut scope: Vec<&Element> = self.elements.values().filter(|e| e.parent_id == parent).collect();
        scope.sort_by_key(|e| e.geometry.z_index);
        scope.into_iter().map(|e| e.id).collect()
    }

    /// Every element in paint order: each scope bottom to top, children
    /// painted directly after their container.
    #[must_use]
    pub fn paint_order(&self) -> Vec<&Element> {
        let mut out = Vec::with_capacity(self.elements.len());
        self.push_scope_paint_order(None, &mut out);
        out
    }

    fn push_scope_paint_order<'a>(&'a self, parent: Option<ElementId>, out: &mut Vec<&'a Element>) {
        for id in self.scope_by_rank(parent) {
            if let Some(element) = self.elements.get(&id) {
                out.push(element);
                if element.is_container() {
                    self.push_scope_paint_order(Some(id), out);
                }
            }
        }
    }
}

/// Merge `incoming` object keys into `props`; null values delete keys.
fn merge_props(props: &mut serde_json::Value, incoming: &serde_json::Value) {
    let Some(incoming) = incoming.as_object() else {
        return;
    };
    if !props.is_object() {
        *props = serde_json::json!({});
    }
    if let Some(existing) = props.as_object_mut() {
        for (k, v) in incoming {
            if v.is_null() {
                existing.remove(k);
            } else {
                existing.insert(k.clone(), v.clone());
            }
        }
    }
}
