//! Alignment snapping and guide lines for a moving element.
//!
//! Each axis is solved independently. On the x-axis the moving element's left
//! edge, horizontal center and right edge are compared with the same three
//! features of every other visible element in its coordinate space; the
//! y-axis does the same with top, vertical center and bottom. The closest
//! feature pair within the threshold wins, ties going to the element that
//! comes first in the collection. The result is a pure function of its
//! inputs.

#[cfg(test)]
#[path = "align_test.rs"]
mod align_test;

use serde::{Deserialize, Serialize};

use crate::doc::{DocStore, Element, ElementId};
use crate::transform::Point;

/// Orientation of a guide line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// A vertical line at some x, produced by x-axis snapping.
    Vertical,
    /// A horizontal line at some y, produced by y-axis snapping.
    Horizontal,
}

/// Transient alignment indicator. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GuideLine {
    pub axis: Axis,
    pub position: f64,
}

/// Snapped position plus the guides that justify it.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapResult {
    pub x: f64,
    pub y: f64,
    pub guide_lines: Vec<GuideLine>,
}

/// Best match found so far on one axis.
#[derive(Debug, Clone, Copy)]
struct AxisMatch {
    distance: f64,
    /// Output coordinate (left or top edge) that aligns the matched feature.
    coordinate: f64,
    /// Target feature position, where the guide is drawn.
    guide: f64,
}

/// Snap `proposed` (the new top-left of element `id`) against its siblings.
///
/// Only visible elements sharing the moving element's parent and cell are
/// targets, since positions are relative to that cell. Top-level elements
/// snap against other top-level elements. Co-moving elements of a
/// multi-element drag are still targets here; see
/// [`snap_position_excluding`].
#[must_use]
pub fn snap_position(doc: &DocStore, id: ElementId, proposed: Point, threshold: f64) -> SnapResult {
    snap_position_excluding(doc, id, proposed, threshold, &[])
}

/// Like [`snap_position`], additionally ignoring `exclude` as targets.
///
/// Targets are still limited to the moving element's parent and cell. A
/// multi-element drag passes its co-moving elements as `exclude` so the
/// anchor never snaps to a stale copy of something moving with it.
#[must_use]
pub fn snap_position_excluding(
    doc: &DocStore,
    id: ElementId,
    proposed: Point,
    threshold: f64,
    exclude: &[ElementId],
) -> SnapResult {
    let Some(moving) = doc.get(&id) else {
        return SnapResult { x: proposed.x, y: proposed.y, guide_lines: Vec::new() };
    };
    let size = (moving.geometry.width, moving.geometry.height);

    let mut best_x: Option<AxisMatch> = None;
    let mut best_y: Option<AxisMatch> = None;
    for target in doc.iter().filter(|t| is_target(moving, t, exclude)) {
        let g = &target.geometry;
        consider(&mut best_x, proposed.x, size.0, [g.x, g.center_x(), g.right()], threshold);
        consider(&mut best_y, proposed.y, size.1, [g.y, g.center_y(), g.bottom()], threshold);
    }

    let mut guide_lines = Vec::new();
    let x = match best_x {
        Some(m) => {
            guide_lines.push(GuideLine { axis: Axis::Vertical, position: m.guide });
            m.coordinate
        }
        None => proposed.x,
    };
    let y = match best_y {
        Some(m) => {
            guide_lines.push(GuideLine { axis: Axis::Horizontal, position: m.guide });
            m.coordinate
        }
        None => proposed.y,
    };
    SnapResult { x, y, guide_lines }
}

/// Targets share the moving element's coordinate space (same parent and cell).
fn is_target(moving: &Element, target: &Element, exclude: &[ElementId]) -> bool {
    target.id != moving.id
        && target.visible
        && target.parent_id == moving.parent_id
        && target.cell_index == moving.cell_index
        && !exclude.contains(&target.id)
}

/// Fold one target's features into the running best match for an axis.
///
/// `start` is the proposed leading edge and `extent` the moving size along
/// the axis. Only a strictly smaller distance replaces the current best, so
/// earlier targets win ties.
fn consider(best: &mut Option<AxisMatch>, start: f64, extent: f64, targets: [f64; 3], threshold: f64) {
    for offset in [0.0, extent / 2.0, extent] {
        let feature = start + offset;
        for target in targets {
            let distance = (feature - target).abs();
            if distance > threshold {
                continue;
            }
            if best.is_none_or(|b| distance < b.distance) {
                *best = Some(AxisMatch { distance, coordinate: target - offset, guide: target });
            }
        }
    }
}
