//! Mutation engine: pure tree-in / tree-out operations.
//!
//! Every function takes a snapshot by reference and returns a new snapshot,
//! leaving the input untouched. On error no snapshot is produced.

use tracing::{debug, instrument};

use crate::domain::arena::MenuTree;
use crate::domain::entities::{ItemDefaults, ItemId, MenuField};
use crate::domain::error::{DomainError, DomainResult};

/// Create a new entry with a temporary id, appended under `parent` or at the
/// end of the root list.
#[instrument(level = "debug", skip(tree, defaults))]
pub fn add_item(
    tree: &MenuTree,
    parent: Option<&ItemId>,
    defaults: &ItemDefaults,
    max_depth: usize,
) -> DomainResult<(MenuTree, ItemId)> {
    check_max_depth(max_depth)?;
    let parent_idx = match parent {
        Some(id) => {
            let idx = tree
                .index_of(id)
                .ok_or_else(|| DomainError::ItemNotFound(id.clone()))?;
            let depth = tree.depth(id).unwrap_or(0) + 1;
            if depth >= max_depth {
                return Err(DomainError::DepthExceeded {
                    id: id.clone(),
                    depth,
                    max_depth,
                });
            }
            Some(idx)
        }
        None => None,
    };

    let item = defaults.instantiate();
    let id = item.id.clone();
    let mut next = tree.clone();
    next.push(item, parent_idx);
    debug!("added {}", id);
    Ok((next, id))
}

/// Replace one field of one entry.
#[instrument(level = "debug", skip(tree))]
pub fn update_item(tree: &MenuTree, id: &ItemId, field: MenuField) -> DomainResult<MenuTree> {
    let mut next = tree.clone();
    let item = next
        .item_mut(id)
        .ok_or_else(|| DomainError::ItemNotFound(id.clone()))?;
    field.apply(item);
    Ok(next)
}

/// Delete an entry together with its whole subtree; remaining siblings are
/// renumbered.
#[instrument(level = "debug", skip(tree))]
pub fn remove_item(tree: &MenuTree, id: &ItemId) -> DomainResult<MenuTree> {
    let idx = tree
        .index_of(id)
        .ok_or_else(|| DomainError::ItemNotFound(id.clone()))?;
    let mut next = tree.clone();
    let removed = next.remove_subtree(idx);
    debug!("removed {} with {} descendants", id, removed.len().saturating_sub(1));
    Ok(next)
}

/// Move an entry to `to_index` within its own sibling list.
///
/// The index is clamped to the list; only that list is renumbered.
#[instrument(level = "debug", skip(tree))]
pub fn move_within(tree: &MenuTree, id: &ItemId, to_index: usize) -> DomainResult<MenuTree> {
    let idx = tree
        .index_of(id)
        .ok_or_else(|| DomainError::ItemNotFound(id.clone()))?;
    let mut next = tree.clone();
    if let Some((from, to)) = next.move_in_list(idx, to_index) {
        debug!("moved {} from {} to {}", id, from, to);
    }
    Ok(next)
}

/// Re-parent an entry (with its subtree) as the last child of `new_parent`,
/// or as the last root when `new_parent` is `None`.
///
/// The vacated and the receiving sibling lists are renumbered.
#[instrument(level = "debug", skip(tree))]
pub fn reparent(
    tree: &MenuTree,
    id: &ItemId,
    new_parent: Option<&ItemId>,
    max_depth: usize,
) -> DomainResult<MenuTree> {
    check_max_depth(max_depth)?;
    let idx = tree
        .index_of(id)
        .ok_or_else(|| DomainError::ItemNotFound(id.clone()))?;

    let (parent_idx, target_depth) = match new_parent {
        Some(parent) => {
            let parent_idx = tree
                .index_of(parent)
                .ok_or_else(|| DomainError::ItemNotFound(parent.clone()))?;
            if tree.is_within(parent, id) {
                return Err(DomainError::CyclicMove { id: id.clone() });
            }
            (Some(parent_idx), tree.depth(parent).unwrap_or(0) + 1)
        }
        None => (None, 0),
    };

    // the moved subtree must fit below the bound as well
    let deepest = target_depth + tree.height(id).unwrap_or(0);
    if target_depth >= max_depth || deepest >= max_depth {
        return Err(DomainError::DepthExceeded {
            id: id.clone(),
            depth: deepest,
            max_depth,
        });
    }

    let mut next = tree.clone();
    next.detach(idx);
    next.place_last(idx, parent_idx);
    Ok(next)
}

pub(crate) fn check_max_depth(max_depth: usize) -> DomainResult<()> {
    if max_depth == 0 {
        return Err(DomainError::InvalidMaxDepth(max_depth));
    }
    Ok(())
}
