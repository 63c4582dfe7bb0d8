//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::entities::ItemId;

/// Domain errors represent menu-tree rule violations.
/// These are independent of persistence concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("menu item not found: {0}")]
    ItemNotFound(ItemId),

    #[error("cannot nest {id}: depth {depth} exceeds the maximum of {max_depth} levels")]
    DepthExceeded {
        id: ItemId,
        depth: usize,
        max_depth: usize,
    },

    #[error("cannot move {id} into its own subtree")]
    CyclicMove { id: ItemId },

    #[error("unknown menu field: {0}")]
    InvalidField(String),

    #[error("unknown link target: {0} (expected same-window or new-window)")]
    InvalidLinkTarget(String),

    #[error("max depth must be at least 1, got {0}")]
    InvalidMaxDepth(usize),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
