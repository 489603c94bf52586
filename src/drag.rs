//! Move transaction for one element or a rigid multi-selection.
//!
//! The anchor (the element under the pointer) is the only element snapped.
//! Its snapped offset from its start position is applied unchanged to every
//! dragged element, so the selection moves as one body.

#[cfg(test)]
#[path = "drag_test.rs"]
mod drag_test;

use crate::align::{GuideLine, snap_position_excluding};
use crate::config::EngineConfig;
use crate::doc::{DocStore, ElementId, ElementPatch};
use crate::engine::{Action, TransientUpdate};
use crate::input::PointerSession;
use crate::layout::in_fill_cell;
use crate::selection::SelectionSet;
use crate::transform::{Point, Viewport};

#[derive(Debug, Clone)]
pub struct DragSession {
    anchor: ElementId,
    anchor_start: Point,
    /// Logical pointer position at pointer-down.
    start_pointer: Point,
    /// Start position of every dragged element, anchor first.
    starts: Vec<(ElementId, Point)>,
    /// Offset most recently emitted as a transient update.
    applied: Point,
}

impl DragSession {
    /// Start dragging `anchor` from screen point `screen`.
    ///
    /// When the anchor belongs to a multi-selection the whole selection moves;
    /// locked members and fill-cell children stay put, and a member nested
    /// under another dragged member rides along with it instead of moving on
    /// its own. An anchor nested under a selected container is dragged alone.
    /// Returns `None` when the anchor is missing, locked, or fills its cell.
    #[must_use]
    pub fn begin(
        doc: &DocStore,
        anchor: ElementId,
        selection: &SelectionSet,
        screen: Point,
        viewport: &Viewport,
    ) -> Option<Self> {
        let element = doc.get(&anchor)?;
        if element.locked {
            tracing::debug!(id = %anchor, "drag refused: element locked");
            return None;
        }
        if in_fill_cell(doc, element) {
            tracing::debug!(id = %anchor, "drag refused: element fills its cell");
            return None;
        }
        let anchor_start = Point::new(element.geometry.x, element.geometry.y);
        let mut candidates = vec![anchor];
        if selection.len() > 1 && selection.contains(&anchor) {
            for id in selection.ids() {
                let Some(member) = doc.get(id) else {
                    continue;
                };
                if *id == anchor || member.locked || in_fill_cell(doc, member) {
                    continue;
                }
                candidates.push(*id);
            }
        }
        let nested_in_drag = |id: ElementId| doc.ancestors(id).iter().any(|a| candidates.contains(a));
        let mut starts = vec![(anchor, anchor_start)];
        if !nested_in_drag(anchor) {
            for id in candidates.iter().skip(1) {
                if nested_in_drag(*id) {
                    continue;
                }
                if let Some(member) = doc.get(id) {
                    starts.push((*id, Point::new(member.geometry.x, member.geometry.y)));
                }
            }
        }
        tracing::debug!(id = %anchor, count = starts.len(), "drag started");
        Some(Self {
            anchor,
            anchor_start,
            start_pointer: viewport.to_logical(screen),
            starts,
            applied: Point::default(),
        })
    }

    #[must_use]
    pub fn anchor(&self) -> ElementId {
        self.anchor
    }

    /// Offset of the latest transient update relative to the start positions.
    #[must_use]
    pub fn applied_offset(&self) -> Point {
        self.applied
    }

    /// Snapped offset for the pointer at `screen`, plus the guides it produced.
    fn solve(&self, doc: &DocStore, screen: Point, viewport: &Viewport, config: &EngineConfig) -> (Point, Vec<GuideLine>) {
        let delta = viewport.to_logical(screen) - self.start_pointer;
        let proposed = self.anchor_start + delta;
        let co_moving: Vec<ElementId> = self.starts.iter().skip(1).map(|(id, _)| *id).collect();
        let snap = snap_position_excluding(doc, self.anchor, proposed, config.snap_threshold, &co_moving);
        (Point::new(snap.x, snap.y) - self.anchor_start, snap.guide_lines)
    }

    fn transient_at(&self, offset: Point) -> Vec<Action> {
        self.starts
            .iter()
            .map(|(id, start)| Action::Transient(TransientUpdate::position(*id, *start + offset)))
            .collect()
    }
}

impl PointerSession for DragSession {
    fn element_ids(&self) -> Vec<ElementId> {
        self.starts.iter().map(|(id, _)| *id).collect()
    }

    fn pointer_move(&mut self, doc: &DocStore, screen: Point, viewport: &Viewport, config: &EngineConfig) -> Vec<Action> {
        let (offset, guides) = self.solve(doc, screen, viewport, config);
        self.applied = offset;
        tracing::trace!(id = %self.anchor, dx = offset.x, dy = offset.y, "drag moved");
        let mut actions = self.transient_at(offset);
        actions.push(Action::GuidesChanged(guides));
        actions
    }

    fn pointer_up(self, doc: &mut DocStore, screen: Point, viewport: &Viewport, config: &EngineConfig) -> Vec<Action> {
        let (offset, _) = self.solve(doc, screen, viewport, config);
        let moved = offset.x.abs() > config.commit_epsilon || offset.y.abs() > config.commit_epsilon;
        if !moved {
            tracing::debug!(id = %self.anchor, "drag ended without movement");
            let mut actions = self.transient_at(Point::default());
            actions.push(Action::GuidesChanged(Vec::new()));
            return actions;
        }

        let mut committed = Vec::with_capacity(self.starts.len());
        for (id, start) in &self.starts {
            let target = *start + offset;
            if doc.apply_patch(id, &ElementPatch::position(target.x, target.y), config.min_size) {
                committed.push(*id);
            }
        }
        tracing::debug!(id = %self.anchor, count = committed.len(), dx = offset.x, dy = offset.y, "drag committed");
        vec![
            Action::ElementsUpdated { ids: committed },
            Action::GuidesChanged(Vec::new()),
            Action::RenderNeeded,
        ]
    }

    fn cancel(self) -> Vec<Action> {
        tracing::debug!(id = %self.anchor, "drag cancelled");
        let mut actions = self.transient_at(Point::default());
        actions.push(Action::GuidesChanged(Vec::new()));
        actions
    }
}
