//! Domain layer: menu tree model and its pure operations
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod converter;
pub mod drag;
pub mod entities;
pub mod error;
pub mod mutation;
pub mod validate;
pub mod view;

pub use arena::{MenuNode, MenuTree, TreeIterator};
pub use converter::{flatten, nestify};
pub use drag::{
    CancelReason, DragChange, DragController, DragOutcome, DragState, DropTarget, Placement,
};
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use mutation::{add_item, move_within, remove_item, reparent, update_item};
pub use validate::{validate_records, validate_stored, validate_tree, Violation};
pub use view::ViewState;
