//! Rejection reasons for placement, grouping and configuration.
//!
//! Mutating engine calls never surface these: a rejected request is logged and
//! degrades to a no-op. The pre-validation predicates (`check_placement`,
//! `validate_group`) return them so callers that need feedback can ask first.

use uuid::Uuid;

/// Why a drop into a container cell was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlacementError {
    #[error("parent not found: {0}")]
    UnknownParent(Uuid),
    #[error("parent is not a container: {0}")]
    NotAContainer(Uuid),
    #[error("cell {cell} out of range for container {parent}")]
    CellOutOfRange { parent: Uuid, cell: usize },
    #[error("cell {cell} of {parent} already holds a container")]
    CellHoldsContainer { parent: Uuid, cell: usize },
    #[error("fill cell {cell} of {parent} is already occupied")]
    FillCellOccupied { parent: Uuid, cell: usize },
    #[error("container cannot join non-empty cell {cell} of {parent}")]
    ContainerNeedsEmptyCell { parent: Uuid, cell: usize },
    #[error("element {0} cannot be nested inside itself")]
    WouldNestInSelf(Uuid),
}

/// Why a `group` request was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GroupError {
    #[error("a group needs at least 2 elements, got {0}")]
    TooFew(usize),
    #[error("element not found: {0}")]
    UnknownElement(Uuid),
    #[error("elements do not share one parent")]
    MixedParents,
    #[error("element {0} already belongs to a group")]
    AlreadyGrouped(Uuid),
}

/// Malformed configuration value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} is not a number: {value:?}")]
    NotANumber { key: String, value: String },
    #[error("{key} must be finite and positive, got {value}")]
    OutOfRange { key: String, value: f64 },
    #[error("{key} must be at least {min}, got {value}")]
    BelowMinimum { key: String, value: f64, min: f64 },
}
