//! Geometric editing engine for a dashboard layout editor.
//!
//! The engine owns the layout document (placed elements, their nesting inside
//! container cells, groups and paint order) and turns pointer, keyboard and
//! programmatic requests into validated changes. During a drag or resize it
//! emits transient positions for the renderer and writes the document once,
//! when the gesture ends. The host is responsible for rendering, persistence
//! and routing DOM events to [`engine::Engine`]; it reacts to the returned
//! [`engine::Action`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | The [`engine::Engine`] facade and the actions it returns |
//! | [`doc`] | Element types and the in-memory document store |
//! | [`transform`] | Screen/logical coordinate conversion |
//! | [`align`] | Alignment snapping and guide lines |
//! | [`zorder`] | Paint-rank reordering within sibling scopes |
//! | [`group`] | Group membership |
//! | [`layout`] | Container cell occupancy rules and drop placement |
//! | [`selection`] | Ordered selection set |
//! | [`input`] | Input event types and the gesture state machine |
//! | [`drag`] | Move transaction with snapping |
//! | [`resize`] | Corner-handle resize transaction |
//! | [`hit`] | Hit-testing and box-select |
//! | [`config`] | Tunable thresholds, with environment overrides |
//! | [`error`] | Rejection reasons for placement, grouping and config |
//! | [`consts`] | Default numeric constants |

pub mod align;
pub mod config;
pub mod consts;
pub mod doc;
pub mod drag;
pub mod engine;
pub mod error;
pub mod group;
pub mod hit;
pub mod input;
pub mod layout;
pub mod resize;
pub mod selection;
pub mod transform;
pub mod zorder;
