//! Shared numeric constants for the layout engine.

// ── Geometry ────────────────────────────────────────────────────

/// Smallest width or height an element may have, in logical units.
pub const MIN_ELEMENT_SIZE: f64 = 10.0;

/// Geometry changes at or below this distance are not committed.
pub const COMMIT_EPSILON: f64 = 0.01;

// ── Snapping ────────────────────────────────────────────────────

/// Maximum distance in logical units at which two features snap together.
pub const SNAP_THRESHOLD: f64 = 5.0;

// ── Hit-testing ─────────────────────────────────────────────────

/// Screen-space hit slop in pixels for resize handles.
pub const HANDLE_RADIUS_PX: f64 = 8.0;
