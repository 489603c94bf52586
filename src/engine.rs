//! The engine facade: the in-process API a host UI drives.
//!
//! Every handler runs synchronously and returns the [`Action`]s the host
//! should react to. Committed changes are visible through the query methods
//! as soon as a handler returns; `Action::Transient` updates are a
//! render-only side channel that is never written to the document.
//!
//! Invalid requests (unknown ids, locked elements, rejected placements or
//! groups) return an empty action list and change nothing.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use crate::align::GuideLine;
use crate::config::EngineConfig;
use crate::doc::{CellMode, DocStore, Element, ElementId, ElementPatch, Geometry, GroupId};
use crate::drag::DragSession;
use crate::group;
use crate::hit::{self, Hit, HitPart, ResizeHandle};
use crate::input::{Button, InputState, Key, Modifiers, PointerSession};
use crate::layout::{self, DropTarget};
use crate::resize::ResizeSession;
use crate::selection::SelectionSet;
use crate::transform::{Point, Viewport};
use crate::zorder::{self, ZOrderOp};

/// Render-only position (and, for resize, size) of one element during an
/// active drag or resize.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransientUpdate {
    pub id: ElementId,
    pub x: f64,
    pub y: f64,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl TransientUpdate {
    #[must_use]
    pub fn position(id: ElementId, at: Point) -> Self {
        Self { id, x: at.x, y: at.y, width: None, height: None }
    }

    #[must_use]
    pub fn bounds(id: ElementId, geometry: &Geometry) -> Self {
        Self {
            id,
            x: geometry.x,
            y: geometry.y,
            width: Some(geometry.width),
            height: Some(geometry.height),
        }
    }
}

/// Actions returned from engine handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ElementCreated { id: ElementId },
    /// Committed changes to existing elements (geometry, flags, rank, group).
    ElementsUpdated { ids: Vec<ElementId> },
    ElementsDeleted { ids: Vec<ElementId> },
    Transient(TransientUpdate),
    /// Replacement set of guide lines; empty clears them.
    GuidesChanged(Vec<GuideLine>),
    SelectionChanged(Vec<ElementId>),
    RenderNeeded,
}

/// Editing engine state: document, viewport, selection and the active gesture.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    doc: DocStore,
    viewport: Viewport,
    selection: SelectionSet,
    guides: Vec<GuideLine>,
    input: InputState,
    config: EngineConfig,
}

impl Engine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        Self { config, ..Self::default() }
    }

    // --- Data inputs ---

    /// Replace the document with a snapshot.
    ///
    /// Abandons any active gesture and clears the selection. The loaded
    /// elements are then brought back inside the document rules: sizes are
    /// floored at the configured minimum, orphaned or cyclic children and
    /// surplus cell occupants move to the top level, fill children are pinned
    /// to their cell origin, groups spanning parents or left with one member
    /// are dissolved, and every scope is renumbered densely.
    pub fn load_snapshot(&mut self, elements: Vec<Element>) -> Vec<Action> {
        self.input = InputState::Idle;
        self.guides.clear();
        self.selection.clear();
        self.doc.load_snapshot(elements);
        let floored = self.doc.floor_sizes(self.config.min_size);
        let renested = layout::repair_nesting(&mut self.doc);
        let mut ungrouped = group::dissolve_mixed_parents(&mut self.doc);
        ungrouped.extend(group::dissolve_singletons(&mut self.doc));
        zorder::normalize_all(&mut self.doc);
        if !floored.is_empty() || !renested.is_empty() || !ungrouped.is_empty() {
            tracing::warn!(
                floored = floored.len(),
                renested = renested.len(),
                ungrouped = ungrouped.len(),
                "snapshot repaired on load"
            );
        }
        vec![Action::GuidesChanged(Vec::new()), Action::SelectionChanged(Vec::new()), Action::RenderNeeded]
    }

    /// Insert a new element on top of its sibling scope.
    ///
    /// An element with `parent_id` must name a `cell_index` and pass the
    /// containment rules; fill cells pin it to the cell origin. Any
    /// `group_id` on the request is dropped.
    pub fn create(&mut self, mut element: Element) -> Vec<Action> {
        let id = element.id;
        if self.doc.contains(&id) {
            tracing::debug!(%id, "create ignored: id already exists");
            return Vec::new();
        }
        if element.group_id.take().is_some() {
            tracing::debug!(%id, "create dropped group membership");
        }
        element.geometry.width = element.geometry.width.max(self.config.min_size);
        element.geometry.height = element.geometry.height.max(self.config.min_size);

        match element.parent_id {
            Some(parent_id) => {
                let Some(cell_index) = element.cell_index else {
                    tracing::debug!(%id, %parent_id, "create ignored: nested element without cell index");
                    return Vec::new();
                };
                let target = DropTarget::new(parent_id, cell_index, Point::default());
                match layout::check_placement(&self.doc, &target, element.is_container(), None) {
                    Ok(CellMode::Fill) => {
                        element.geometry.x = 0.0;
                        element.geometry.y = 0.0;
                    }
                    Ok(CellMode::Free) => {}
                    Err(reason) => {
                        tracing::debug!(%id, %reason, "create rejected");
                        return Vec::new();
                    }
                }
            }
            None => element.cell_index = None,
        }

        element.geometry.z_index = zorder::next_rank(&self.doc, element.parent_id);
        tracing::debug!(%id, kind = %element.kind, rank = element.geometry.z_index, "element created");
        self.doc.insert(element);
        vec![Action::ElementCreated { id }, Action::RenderNeeded]
    }

    /// Create `element` where it was dropped: on the surface when `target` is
    /// `None`, otherwise inside the given container cell.
    pub fn drop_new(&mut self, mut element: Element, screen: Point, target: Option<DropTarget>) -> Vec<Action> {
        match target {
            None => {
                let at = self.viewport.to_logical(screen);
                element.parent_id = None;
                element.cell_index = None;
                element.geometry.x = at.x;
                element.geometry.y = at.y;
            }
            Some(target) => {
                let mode = match layout::check_placement(&self.doc, &target, element.is_container(), None) {
                    Ok(mode) => mode,
                    Err(reason) => {
                        tracing::debug!(id = %element.id, %reason, "drop rejected");
                        return Vec::new();
                    }
                };
                let at = layout::drop_position(mode, screen, target.cell_origin, self.viewport.scale);
                element.parent_id = Some(target.parent_id);
                element.cell_index = Some(target.cell_index);
                element.geometry.x = at.x;
                element.geometry.y = at.y;
            }
        }
        self.create(element)
    }

    /// Move an existing element into a container cell at screen point `screen`.
    pub fn move_into(&mut self, id: ElementId, target: &DropTarget, screen: Point) -> Vec<Action> {
        if !self.input.is_idle() {
            tracing::debug!(%id, "move into cell ignored: transaction active");
            return Vec::new();
        }
        let mut affected = self
            .doc
            .get(&id)
            .and_then(|e| e.group_id)
            .map(|g| group::group_members(&self.doc, g))
            .unwrap_or_default();
        if !layout::place(&mut self.doc, id, target, screen, self.viewport.scale) {
            return Vec::new();
        }
        if !affected.contains(&id) {
            affected.push(id);
        }
        vec![Action::ElementsUpdated { ids: affected }, Action::RenderNeeded]
    }

    /// Merge a partial update into an element.
    ///
    /// This is the property-edit path and applies whether or not the element
    /// is locked: `locked` only blocks interactive drag and resize, and a
    /// patch is how an element gets unlocked. A position patch therefore
    /// moves a locked element too. A fill-cell child stays pinned to its
    /// cell origin whatever the patch says.
    pub fn update(&mut self, id: ElementId, patch: &ElementPatch) -> Vec<Action> {
        if patch.is_empty() {
            return Vec::new();
        }
        if !self.doc.apply_patch(&id, patch, self.config.min_size) {
            tracing::debug!(%id, "update ignored: unknown element");
            return Vec::new();
        }
        let pinned = self.doc.get(&id).is_some_and(|e| layout::in_fill_cell(&self.doc, e));
        if pinned {
            if let Some(element) = self.doc.get_mut(&id) {
                element.geometry.x = 0.0;
                element.geometry.y = 0.0;
            }
        }
        vec![Action::ElementsUpdated { ids: vec![id] }, Action::RenderNeeded]
    }

    pub fn delete(&mut self, id: ElementId) -> Vec<Action> {
        self.delete_many(&[id])
    }

    /// Delete elements, cascading into container contents.
    ///
    /// Surviving scopes are renumbered, groups left with one member are
    /// dissolved, deleted ids leave the selection, and a drag or resize that
    /// involved a deleted element is cancelled.
    pub fn delete_many(&mut self, ids: &[ElementId]) -> Vec<Action> {
        let mut removed = Vec::new();
        let mut scopes: Vec<Option<ElementId>> = Vec::new();
        for id in ids {
            for element in self.doc.remove_cascade(id) {
                if !scopes.contains(&element.parent_id) {
                    scopes.push(element.parent_id);
                }
                removed.push(element.id);
            }
        }
        if removed.is_empty() {
            return Vec::new();
        }
        for parent in scopes {
            if parent.is_none_or(|p| self.doc.contains(&p)) {
                zorder::normalize_scope(&mut self.doc, parent);
            }
        }
        tracing::debug!(count = removed.len(), "elements deleted");

        let regrouped = group::dissolve_singletons(&mut self.doc);
        let interrupted = self.input.session_ids().iter().any(|id| removed.contains(id));
        let mut actions = vec![Action::ElementsDeleted { ids: removed.clone() }];
        if !regrouped.is_empty() {
            actions.push(Action::ElementsUpdated { ids: regrouped });
        }
        if interrupted {
            actions.extend(self.cancel());
        }
        if self.selection.prune(&removed) {
            actions.extend(self.selection_changed());
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    // --- Grouping ---

    /// Group `ids` under a fresh group id. See [`group::validate_group`].
    pub fn group(&mut self, ids: &[ElementId]) -> Vec<Action> {
        match group::group(&mut self.doc, ids) {
            Some(group_id) => {
                tracing::debug!(%group_id, "group created");
                vec![
                    Action::ElementsUpdated { ids: group::group_members(&self.doc, group_id) },
                    Action::RenderNeeded,
                ]
            }
            None => Vec::new(),
        }
    }

    pub fn group_selection(&mut self) -> Vec<Action> {
        let ids = self.selection.ids().to_vec();
        self.group(&ids)
    }

    /// Clear the group `id` belongs to from all of its members.
    pub fn ungroup(&mut self, id: ElementId) -> Vec<Action> {
        let cleared = group::ungroup(&mut self.doc, id);
        if cleared.is_empty() {
            return Vec::new();
        }
        tracing::debug!(%id, count = cleared.len(), "group dissolved");
        vec![Action::ElementsUpdated { ids: cleared }, Action::RenderNeeded]
    }

    // --- Z-order ---

    pub fn bring_forward(&mut self, id: ElementId) -> Vec<Action> {
        self.reorder(id, ZOrderOp::BringForward)
    }

    pub fn send_backward(&mut self, id: ElementId) -> Vec<Action> {
        self.reorder(id, ZOrderOp::SendBackward)
    }

    pub fn bring_to_front(&mut self, id: ElementId) -> Vec<Action> {
        self.reorder(id, ZOrderOp::BringToFront)
    }

    pub fn send_to_back(&mut self, id: ElementId) -> Vec<Action> {
        self.reorder(id, ZOrderOp::SendToBack)
    }

    pub fn reorder(&mut self, id: ElementId, op: ZOrderOp) -> Vec<Action> {
        self.reorder_many(&[id], op)
    }

    /// Apply `op` to each selected element in selection order.
    pub fn reorder_selection(&mut self, op: ZOrderOp) -> Vec<Action> {
        let ids = self.selection.ids().to_vec();
        self.reorder_many(&ids, op)
    }

    fn reorder_many(&mut self, ids: &[ElementId], op: ZOrderOp) -> Vec<Action> {
        let changed = op.apply_many(&mut self.doc, ids);
        if changed.is_empty() {
            return Vec::new();
        }
        let mut parents: Vec<Option<ElementId>> = Vec::new();
        for id in &changed {
            if let Some(element) = self.doc.get(id) {
                if !parents.contains(&element.parent_id) {
                    parents.push(element.parent_id);
                }
            }
        }
        let ids: Vec<ElementId> = parents.into_iter().flat_map(|p| self.doc.children_of(p)).collect();
        tracing::debug!(?op, count = changed.len(), "reordered");
        vec![Action::ElementsUpdated { ids }, Action::RenderNeeded]
    }

    // --- Viewport ---

    /// Set the zoom factor. Non-finite or non-positive values are ignored.
    pub fn set_scale(&mut self, scale: f64) -> Vec<Action> {
        if !scale.is_finite() || scale <= 0.0 {
            tracing::debug!(scale, "scale ignored");
            return Vec::new();
        }
        self.viewport.scale = scale;
        vec![Action::RenderNeeded]
    }

    /// Set the screen position of logical `(0, 0)`.
    pub fn set_origin(&mut self, origin: Point) -> Vec<Action> {
        self.viewport.origin = origin;
        vec![Action::RenderNeeded]
    }

    // --- Selection ---

    /// Select exactly `id`, even when it belongs to a group.
    pub fn select_single(&mut self, id: ElementId) -> Vec<Action> {
        if !self.doc.contains(&id) {
            return Vec::new();
        }
        self.selection.select_single(id);
        self.selection_changed()
    }

    /// Replace the selection; unknown ids are dropped.
    pub fn select_many(&mut self, ids: &[ElementId]) -> Vec<Action> {
        let existing: Vec<ElementId> = ids.iter().copied().filter(|id| self.doc.contains(id)).collect();
        self.selection.select_many(existing);
        self.selection_changed()
    }

    /// Add `id` to the selection or remove it if already selected.
    pub fn toggle_selection(&mut self, id: ElementId) -> Vec<Action> {
        if !self.doc.contains(&id) {
            return Vec::new();
        }
        let next = self.selection.toggled(id);
        self.select_many(&next)
    }

    /// Select every member of `group_id`.
    pub fn select_group(&mut self, group_id: GroupId) -> Vec<Action> {
        let members = group::group_members(&self.doc, group_id);
        if members.is_empty() {
            return Vec::new();
        }
        self.selection.select_many(members);
        self.selection_changed()
    }

    pub fn clear_selection(&mut self) -> Vec<Action> {
        self.selection.clear();
        self.selection_changed()
    }

    fn selection_changed(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        if !self.guides.is_empty() {
            self.guides.clear();
            actions.push(Action::GuidesChanged(Vec::new()));
        }
        actions.push(Action::SelectionChanged(self.selection.ids().to_vec()));
        actions.push(Action::RenderNeeded);
        actions
    }

    // --- Pointer transactions ---

    /// Start moving `anchor` (with its multi-selection, if it is part of one).
    ///
    /// Ignored while another transaction is active or when the anchor is
    /// missing or locked.
    pub fn begin_drag(&mut self, anchor: ElementId, screen: Point) -> Vec<Action> {
        if !self.input.is_idle() {
            tracing::debug!(id = %anchor, "drag ignored: transaction active");
            return Vec::new();
        }
        if let Some(session) = DragSession::begin(&self.doc, anchor, &self.selection, screen, &self.viewport) {
            self.input = InputState::Dragging(session);
        }
        Vec::new()
    }

    /// Start resizing `id` by one of its corner handles.
    pub fn begin_resize(&mut self, id: ElementId, handle: ResizeHandle, screen: Point) -> Vec<Action> {
        if !self.input.is_idle() {
            tracing::debug!(%id, "resize ignored: transaction active");
            return Vec::new();
        }
        if let Some(session) = ResizeSession::begin(&self.doc, id, handle, screen, &self.viewport) {
            self.input = InputState::Resizing(session);
        }
        Vec::new()
    }

    /// Primary-button press on the surface.
    ///
    /// A handle of the single selected element starts a resize; an element
    /// body selects it (or toggles it with Ctrl/Cmd) and starts a drag; empty
    /// surface starts a box-select.
    pub fn on_pointer_down(&mut self, screen: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        if button != Button::Primary || !self.input.is_idle() {
            return Vec::new();
        }
        let logical = self.viewport.to_logical(screen);
        let hit = hit::hit_test(
            &self.doc,
            logical,
            &self.viewport,
            self.selection.single(),
            self.config.handle_radius_px,
        );
        match hit {
            Some(Hit { element_id, part: HitPart::Handle(handle) }) => self.begin_resize(element_id, handle, screen),
            Some(Hit { element_id, part: HitPart::Body }) => {
                if modifiers.toggles_selection() {
                    return self.toggle_selection(element_id);
                }
                let mut actions = Vec::new();
                if !self.selection.contains(&element_id) {
                    actions = self.select_single(element_id);
                }
                actions.extend(self.begin_drag(element_id, screen));
                actions
            }
            None => {
                let additive = modifiers.toggles_selection() || modifiers.shift;
                let mut actions = Vec::new();
                if !additive && !self.selection.is_empty() {
                    actions = self.clear_selection();
                }
                self.input = InputState::BoxSelecting { start: logical, current: logical, additive };
                actions
            }
        }
    }

    pub fn on_pointer_move(&mut self, screen: Point) -> Vec<Action> {
        let actions = match &mut self.input {
            InputState::Idle => Vec::new(),
            InputState::Dragging(session) => session.pointer_move(&self.doc, screen, &self.viewport, &self.config),
            InputState::Resizing(session) => session.pointer_move(&self.doc, screen, &self.viewport, &self.config),
            InputState::BoxSelecting { current, .. } => {
                *current = self.viewport.to_logical(screen);
                vec![Action::RenderNeeded]
            }
        };
        self.track_guides(&actions);
        actions
    }

    pub fn on_pointer_up(&mut self, screen: Point) -> Vec<Action> {
        let actions = match std::mem::take(&mut self.input) {
            InputState::Idle => Vec::new(),
            InputState::Dragging(session) => session.pointer_up(&mut self.doc, screen, &self.viewport, &self.config),
            InputState::Resizing(session) => session.pointer_up(&mut self.doc, screen, &self.viewport, &self.config),
            InputState::BoxSelecting { start, additive, .. } => {
                let end = self.viewport.to_logical(screen);
                let mut ids = if additive { self.selection.ids().to_vec() } else { Vec::new() };
                ids.extend(hit::elements_in_rect(&self.doc, start, end));
                self.select_many(&ids)
            }
        };
        self.track_guides(&actions);
        actions
    }

    /// Abandon the active gesture without committing anything.
    pub fn cancel(&mut self) -> Vec<Action> {
        let actions = match std::mem::take(&mut self.input) {
            InputState::Idle => Vec::new(),
            InputState::Dragging(session) => session.cancel(),
            InputState::Resizing(session) => session.cancel(),
            InputState::BoxSelecting { .. } => vec![Action::RenderNeeded],
        };
        self.track_guides(&actions);
        actions
    }

    /// Input focus was lost: the active gesture is cancelled.
    pub fn on_blur(&mut self) -> Vec<Action> {
        self.cancel()
    }

    /// Double-click on an element selects its whole group, or the element
    /// alone when it is not grouped.
    pub fn on_double_click(&mut self, screen: Point) -> Vec<Action> {
        if !self.input.is_idle() {
            return Vec::new();
        }
        let logical = self.viewport.to_logical(screen);
        let Some(id) = hit::element_at(&self.doc, logical) else {
            return Vec::new();
        };
        match self.doc.get(&id).and_then(|e| e.group_id) {
            Some(group_id) => self.select_group(group_id),
            None => self.select_single(id),
        }
    }

    /// `Escape` cancels the active gesture or clears the selection;
    /// `Delete`/`Backspace` delete the selection.
    pub fn on_key_down(&mut self, key: &Key, _modifiers: Modifiers) -> Vec<Action> {
        if key.is("Escape") {
            if self.input.is_idle() {
                return self.clear_selection();
            }
            return self.cancel();
        }
        if (key.is("Delete") || key.is("Backspace")) && self.input.is_idle() {
            let ids = self.selection.ids().to_vec();
            return self.delete_many(&ids);
        }
        Vec::new()
    }

    fn track_guides(&mut self, actions: &[Action]) {
        for action in actions {
            if let Action::GuidesChanged(guides) = action {
                self.guides.clone_from(guides);
            }
        }
    }

    // --- Queries ---

    #[must_use]
    pub fn element(&self, id: &ElementId) -> Option<&Element> {
        self.doc.get(id)
    }

    /// All elements in collection order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.doc.iter()
    }

    #[must_use]
    pub fn doc(&self) -> &DocStore {
        &self.doc
    }

    #[must_use]
    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    #[must_use]
    pub fn scale(&self) -> f64 {
        self.viewport.scale
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[must_use]
    pub fn guide_lines(&self) -> &[GuideLine] {
        &self.guides
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Whether a drag, resize or box-select is in progress.
    #[must_use]
    pub fn is_interacting(&self) -> bool {
        !self.input.is_idle()
    }

    /// Logical corners of the box-select rectangle, while one is active.
    #[must_use]
    pub fn marquee(&self) -> Option<(Point, Point)> {
        match self.input {
            InputState::BoxSelecting { start, current, .. } => Some((start, current)),
            _ => None,
        }
    }
}
