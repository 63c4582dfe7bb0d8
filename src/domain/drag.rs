//! Drag reorder/reparent controller.
//!
//! A drag session is a small state machine:
//! `Idle -> Dragging { active, over } -> Resolved`.
//! `begin` starts a session, `hover` records (or clears) the current drop
//! target and `end` resolves the session against a tree snapshot.

use std::fmt;

use tracing::{debug, instrument};

use crate::domain::arena::MenuTree;
use crate::domain::entities::ItemId;
use crate::domain::error::DomainError;
use crate::domain::mutation::{move_within, reparent};

/// How a hovered entry is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Drop inside the target, as its last child
    Inside,
    /// Drop next to the target, at its level
    Beside,
}

/// The entry currently under the pointer and how to drop onto it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropTarget {
    pub id: ItemId,
    pub placement: Placement,
}

impl DropTarget {
    pub fn inside(id: impl Into<ItemId>) -> Self {
        Self {
            id: id.into(),
            placement: Placement::Inside,
        }
    }

    pub fn beside(id: impl Into<ItemId>) -> Self {
        Self {
            id: id.into(),
            placement: Placement::Beside,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragState {
    Idle,
    Dragging {
        active: ItemId,
        over: Option<DropTarget>,
    },
    Resolved {
        applied: bool,
    },
}

/// Why a session ended without touching the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelReason {
    NotDragging,
    NoTarget,
    SelfDrop,
    IntoOwnSubtree,
    UnknownItem(ItemId),
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelReason::NotDragging => write!(f, "no drag in progress"),
            CancelReason::NoTarget => write!(f, "no drop target"),
            CancelReason::SelfDrop => write!(f, "dropped onto itself"),
            CancelReason::IntoOwnSubtree => write!(f, "dropped into its own subtree"),
            CancelReason::UnknownItem(id) => write!(f, "unknown menu item {id}"),
        }
    }
}

/// What a committed drop did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragChange {
    Reordered {
        id: ItemId,
        from: usize,
        to: usize,
    },
    Reparented {
        id: ItemId,
        parent: Option<ItemId>,
        position: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragOutcome {
    /// Nothing to do; the tree is unchanged
    Cancelled(CancelReason),
    /// The drop broke a rule; the tree is unchanged
    Rejected(DomainError),
    /// The drop was applied, producing a new snapshot
    Applied { tree: MenuTree, change: DragChange },
}

impl DragOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, DragOutcome::Applied { .. })
    }
}

#[derive(Debug, Clone)]
pub struct DragController {
    state: DragState,
}

impl Default for DragController {
    fn default() -> Self {
        Self::new()
    }
}

impl DragController {
    pub fn new() -> Self {
        Self {
            state: DragState::Idle,
        }
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn active(&self) -> Option<&ItemId> {
        match &self.state {
            DragState::Dragging { active, .. } => Some(active),
            _ => None,
        }
    }

    /// Start dragging `id`. A session already in progress is abandoned.
    pub fn begin(&mut self, id: ItemId) {
        if let DragState::Dragging { active, .. } = &self.state {
            debug!("abandoning drag of {} for {}", active, id);
        }
        self.state = DragState::Dragging {
            active: id,
            over: None,
        };
    }

    /// Record the entry under the pointer; `None` clears it.
    pub fn hover(&mut self, target: Option<DropTarget>) {
        if let DragState::Dragging { over, .. } = &mut self.state {
            *over = target;
        }
    }

    /// Abort the session without resolving it.
    pub fn cancel(&mut self) {
        self.state = DragState::Resolved { applied: false };
    }

    /// Finish the session and resolve it against `tree`.
    #[instrument(level = "debug", skip(self, tree))]
    pub fn end(&mut self, tree: &MenuTree, max_depth: usize) -> DragOutcome {
        let state = std::mem::replace(&mut self.state, DragState::Resolved { applied: false });
        let outcome = match state {
            DragState::Dragging {
                active,
                over: Some(target),
            } => resolve(tree, &active, &target, max_depth),
            DragState::Dragging { over: None, .. } => DragOutcome::Cancelled(CancelReason::NoTarget),
            DragState::Idle | DragState::Resolved { .. } => {
                DragOutcome::Cancelled(CancelReason::NotDragging)
            }
        };
        self.state = DragState::Resolved {
            applied: outcome.is_applied(),
        };
        debug!("drag resolved: {}", outcome_kind(&outcome));
        outcome
    }
}

fn outcome_kind(outcome: &DragOutcome) -> &'static str {
    match outcome {
        DragOutcome::Cancelled(_) => "cancelled",
        DragOutcome::Rejected(_) => "rejected",
        DragOutcome::Applied { .. } => "applied",
    }
}

fn resolve(tree: &MenuTree, active: &ItemId, target: &DropTarget, max_depth: usize) -> DragOutcome {
    if &target.id == active {
        return DragOutcome::Cancelled(CancelReason::SelfDrop);
    }
    for id in [active, &target.id] {
        if !tree.contains(id) {
            return DragOutcome::Cancelled(CancelReason::UnknownItem(id.clone()));
        }
    }
    if tree.is_within(&target.id, active) {
        return DragOutcome::Cancelled(CancelReason::IntoOwnSubtree);
    }

    match target.placement {
        Placement::Inside => drop_into(tree, active, Some(&target.id), max_depth),
        Placement::Beside => {
            let active_parent = tree.parent(active).map(|p| p.id.clone());
            let target_parent = tree.parent(&target.id).map(|p| p.id.clone());
            if active_parent == target_parent {
                reorder(tree, active, &target.id)
            } else {
                drop_into(tree, active, target_parent.as_ref(), max_depth)
            }
        }
    }
}

fn reorder(tree: &MenuTree, active: &ItemId, over: &ItemId) -> DragOutcome {
    let (Some(from), Some(to)) = (tree.sibling_index(active), tree.sibling_index(over)) else {
        return DragOutcome::Cancelled(CancelReason::UnknownItem(over.clone()));
    };
    match move_within(tree, active, to) {
        Ok(next) => DragOutcome::Applied {
            tree: next,
            change: DragChange::Reordered {
                id: active.clone(),
                from,
                to,
            },
        },
        Err(e) => DragOutcome::Rejected(e),
    }
}

fn drop_into(
    tree: &MenuTree,
    active: &ItemId,
    container: Option<&ItemId>,
    max_depth: usize,
) -> DragOutcome {
    let target_depth = container
        .and_then(|c| tree.depth(c))
        .map(|d| d + 1)
        .unwrap_or(0);
    if target_depth >= max_depth {
        return DragOutcome::Rejected(DomainError::DepthExceeded {
            id: active.clone(),
            depth: target_depth,
            max_depth,
        });
    }

    match reparent(tree, active, container, max_depth) {
        Ok(next) => {
            let position = next.sibling_index(active).unwrap_or(0);
            DragOutcome::Applied {
                tree: next,
                change: DragChange::Reparented {
                    id: active.clone(),
                    parent: container.cloned(),
                    position,
                },
            }
        }
        Err(e) => DragOutcome::Rejected(e),
    }
}
