//! Hit-testing against top-level elements.
//!
//! Children of containers live in cell-relative coordinates whose screen
//! placement is decided by the rendering layer, so the engine only resolves
//! top-level hits. Hosts that hit-test nested elements themselves call the
//! engine's `begin_drag` / `begin_resize` directly.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::doc::{DocStore, ElementId, Geometry};
use crate::transform::{Point, Viewport};

/// Corner handle of a selected element. Edge handles do not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeHandle {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 4] = [Self::TopLeft, Self::TopRight, Self::BottomLeft, Self::BottomRight];

    /// Logical position of this handle on `geometry`.
    #[must_use]
    pub fn position(self, geometry: &Geometry) -> Point {
        match self {
            Self::TopLeft => Point::new(geometry.x, geometry.y),
            Self::TopRight => Point::new(geometry.right(), geometry.y),
            Self::BottomLeft => Point::new(geometry.x, geometry.bottom()),
            Self::BottomRight => Point::new(geometry.right(), geometry.bottom()),
        }
    }

    /// Whether dragging this handle moves the left edge.
    #[must_use]
    pub fn moves_left(self) -> bool {
        matches!(self, Self::TopLeft | Self::BottomLeft)
    }

    /// Whether dragging this handle moves the top edge.
    #[must_use]
    pub fn moves_top(self) -> bool {
        matches!(self, Self::TopLeft | Self::TopRight)
    }
}

/// Which part of an element was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    Handle(ResizeHandle),
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub element_id: ElementId,
    pub part: HitPart,
}

/// Test what is under `logical`, checking the handles of the single selected
/// element first, then element bodies from the top of the stack down.
#[must_use]
pub fn hit_test(
    doc: &DocStore,
    logical: Point,
    viewport: &Viewport,
    selected: Option<ElementId>,
    handle_radius_px: f64,
) -> Option<Hit> {
    if let Some(id) = selected {
        if let Some(handle) = handle_at(doc, id, logical, viewport, handle_radius_px) {
            return Some(Hit { element_id: id, part: HitPart::Handle(handle) });
        }
    }
    element_at(doc, logical).map(|element_id| Hit { element_id, part: HitPart::Body })
}

/// Top-most visible top-level element containing `logical`.
#[must_use]
pub fn element_at(doc: &DocStore, logical: Point) -> Option<ElementId> {
    doc.scope_by_rank(None).into_iter().rev().find(|id| {
        doc.get(id)
            .is_some_and(|e| e.visible && e.geometry.contains(logical.x, logical.y))
    })
}

/// Corner handle of top-level element `id` within the screen-space radius.
#[must_use]
pub fn handle_at(
    doc: &DocStore,
    id: ElementId,
    logical: Point,
    viewport: &Viewport,
    handle_radius_px: f64,
) -> Option<ResizeHandle> {
    let element = doc.get(&id)?;
    if !element.visible || element.parent_id.is_some() {
        return None;
    }
    let radius = viewport.screen_dist_to_logical(handle_radius_px);
    ResizeHandle::ALL.into_iter().find(|handle| {
        let corner = handle.position(&element.geometry);
        (logical.x - corner.x).abs() <= radius && (logical.y - corner.y).abs() <= radius
    })
}

/// Visible top-level elements lying entirely inside the rectangle spanned by
/// `a` and `b`, in collection order.
#[must_use]
pub fn elements_in_rect(doc: &DocStore, a: Point, b: Point) -> Vec<ElementId> {
    let (min_x, max_x) = (a.x.min(b.x), a.x.max(b.x));
    let (min_y, max_y) = (a.y.min(b.y), a.y.max(b.y));
    doc.iter()
        .filter(|e| e.parent_id.is_none() && e.visible)
        .filter(|e| {
            let g = &e.geometry;
            g.x >= min_x && g.right() <= max_x && g.y >= min_y && g.bottom() <= max_y
        })
        .map(|e| e.id)
        .collect()
}
