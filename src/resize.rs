//! Corner-handle resize transaction for a single element.

#[cfg(test)]
#[path = "resize_test.rs"]
mod resize_test;

use crate::config::EngineConfig;
use crate::doc::{DocStore, ElementId, ElementPatch, Geometry};
use crate::engine::{Action, TransientUpdate};
use crate::hit::ResizeHandle;
use crate::input::PointerSession;
use crate::layout::in_fill_cell;
use crate::transform::{Point, Viewport};

/// Geometry after dragging `handle` by logical `delta`, keeping the opposite
/// corner fixed. Width and height never drop below `min_size`; the moving
/// edge stops where the floor is reached.
#[must_use]
pub fn resize_geometry(start: &Geometry, handle: ResizeHandle, delta: Point, min_size: f64) -> Geometry {
    let (x, width) = if handle.moves_left() {
        let width = (start.width - delta.x).max(min_size);
        (start.right() - width, width)
    } else {
        (start.x, (start.width + delta.x).max(min_size))
    };
    let (y, height) = if handle.moves_top() {
        let height = (start.height - delta.y).max(min_size);
        (start.bottom() - height, height)
    } else {
        (start.y, (start.height + delta.y).max(min_size))
    };
    Geometry { x, y, width, height, ..*start }
}

/// Whether two geometries differ by more than `epsilon` in position or size.
#[must_use]
pub fn geometry_changed(a: &Geometry, b: &Geometry, epsilon: f64) -> bool {
    (a.x - b.x).abs() > epsilon
        || (a.y - b.y).abs() > epsilon
        || (a.width - b.width).abs() > epsilon
        || (a.height - b.height).abs() > epsilon
}

#[derive(Debug, Clone)]
pub struct ResizeSession {
    id: ElementId,
    handle: ResizeHandle,
    /// Logical pointer position at pointer-down.
    start_pointer: Point,
    start: Geometry,
    current: Geometry,
}

impl ResizeSession {
    /// Start resizing `id` by `handle` from screen point `screen`.
    ///
    /// Returns `None` when the element is missing, locked, or fills a cell
    /// (its size then follows the cell).
    #[must_use]
    pub fn begin(doc: &DocStore, id: ElementId, handle: ResizeHandle, screen: Point, viewport: &Viewport) -> Option<Self> {
        let element = doc.get(&id)?;
        if element.locked {
            tracing::debug!(%id, "resize refused: element locked");
            return None;
        }
        if in_fill_cell(doc, element) {
            tracing::debug!(%id, "resize refused: element fills its cell");
            return None;
        }
        tracing::debug!(%id, ?handle, "resize started");
        Some(Self {
            id,
            handle,
            start_pointer: viewport.to_logical(screen),
            start: element.geometry,
            current: element.geometry,
        })
    }

    #[must_use]
    pub fn handle(&self) -> ResizeHandle {
        self.handle
    }

    /// Geometry most recently emitted as a transient update.
    #[must_use]
    pub fn current(&self) -> Geometry {
        self.current
    }

    fn solve(&self, screen: Point, viewport: &Viewport, config: &EngineConfig) -> Geometry {
        let delta = viewport.to_logical(screen) - self.start_pointer;
        resize_geometry(&self.start, self.handle, delta, config.min_size)
    }
}

impl PointerSession for ResizeSession {
    fn element_ids(&self) -> Vec<ElementId> {
        vec![self.id]
    }

    fn pointer_move(&mut self, _doc: &DocStore, screen: Point, viewport: &Viewport, config: &EngineConfig) -> Vec<Action> {
        self.current = self.solve(screen, viewport, config);
        tracing::trace!(id = %self.id, width = self.current.width, height = self.current.height, "resize moved");
        vec![Action::Transient(TransientUpdate::bounds(self.id, &self.current))]
    }

    fn pointer_up(self, doc: &mut DocStore, screen: Point, viewport: &Viewport, config: &EngineConfig) -> Vec<Action> {
        let end = self.solve(screen, viewport, config);
        if !geometry_changed(&self.start, &end, config.commit_epsilon) {
            tracing::debug!(id = %self.id, "resize ended without change");
            return vec![
                Action::Transient(TransientUpdate::bounds(self.id, &self.start)),
                Action::GuidesChanged(Vec::new()),
            ];
        }
        let patch = ElementPatch::bounds(end.x, end.y, end.width, end.height);
        let ids = if doc.apply_patch(&self.id, &patch, config.min_size) { vec![self.id] } else { Vec::new() };
        tracing::debug!(id = %self.id, width = end.width, height = end.height, "resize committed");
        vec![Action::ElementsUpdated { ids }, Action::GuidesChanged(Vec::new()), Action::RenderNeeded]
    }

    fn cancel(self) -> Vec<Action> {
        tracing::debug!(id = %self.id, "resize cancelled");
        vec![
            Action::Transient(TransientUpdate::bounds(self.id, &self.start)),
            Action::GuidesChanged(Vec::new()),
        ]
    }
}
