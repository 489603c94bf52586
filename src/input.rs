//! Input model: modifier keys, buttons, keys, and the modal gesture state.
//!
//! A drag or resize is a pointer transaction: it begins on pointer-down,
//! receives every pointer-move exclusively, and ends on pointer-up, cancel or
//! focus loss. `PointerSession` is the lifecycle both transactions implement;
//! `InputState` is the single slot holding whichever one is active, so a second
//! transaction cannot begin while one is in progress.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::config::EngineConfig;
use crate::doc::{DocStore, ElementId};
use crate::drag::DragSession;
use crate::engine::Action;
use crate::resize::ResizeSession;
use crate::transform::{Point, Viewport};

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Command on macOS.
    #[must_use]
    pub fn toggles_selection(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// A keyboard key as reported by the host (e.g. `"Delete"`, `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.0 == name
    }
}

/// One interactive pointer transaction.
///
/// Sessions are created by their own `begin` constructor, which refuses
/// locked or missing elements. Moves only emit transient updates; the
/// document is written once, by `pointer_up`.
pub trait PointerSession {
    /// Elements moved or resized by this session.
    fn element_ids(&self) -> Vec<ElementId>;

    /// Pointer moved to `screen`. Emits transient updates and guide changes.
    fn pointer_move(&mut self, doc: &DocStore, screen: Point, viewport: &Viewport, config: &EngineConfig)
    -> Vec<Action>;

    /// Pointer released at `screen`. Commits the result if anything changed.
    fn pointer_up(self, doc: &mut DocStore, screen: Point, viewport: &Viewport, config: &EngineConfig) -> Vec<Action>;

    /// Abandon the transaction. Emits transient updates restoring the start
    /// geometry; the document is untouched.
    fn cancel(self) -> Vec<Action>;
}

/// The active gesture between pointer-down and pointer-up.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// One or more elements are being moved.
    Dragging(DragSession),
    /// One element is being resized by a corner handle.
    Resizing(ResizeSession),
    /// A selection rectangle is being dragged out on empty surface.
    BoxSelecting {
        /// Logical position of the pointer-down.
        start: Point,
        /// Logical position of the latest pointer event.
        current: Point,
        /// Add to the existing selection instead of replacing it.
        additive: bool,
    },
}

impl InputState {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Ids owned by an active drag or resize.
    #[must_use]
    pub fn session_ids(&self) -> Vec<ElementId> {
        match self {
            Self::Dragging(session) => session.element_ids(),
            Self::Resizing(session) => session.element_ids(),
            Self::Idle | Self::BoxSelecting { .. } => Vec::new(),
        }
    }
}
