//! Arena-backed menu tree.
//!
//! Nodes live in a generational arena. Each node keeps its parent index and
//! the ordered indices of its children; an id map gives O(1) lookup by
//! `ItemId`. The `position` and `parent_id` stored on every item mirror the
//! structure and are rewritten whenever a sibling list changes.

use std::collections::HashMap;

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::entities::{ItemId, MenuItem, NestedItem};

/// Tree node in the arena.
#[derive(Debug, Clone)]
pub struct MenuNode {
    /// The entry itself
    pub item: MenuItem,
    /// Index of parent node in the arena, None for root entries
    pub parent: Option<Index>,
    /// Indices of child nodes, in display order
    pub children: Vec<Index>,
}

/// One immutable-by-convention snapshot of a menu.
///
/// Public operations never mutate in place; the mutation engine clones a
/// snapshot and edits the copy.
#[derive(Debug, Clone)]
pub struct MenuTree {
    arena: Arena<MenuNode>,
    index: HashMap<ItemId, Index>,
    roots: Vec<Index>,
}

impl Default for MenuTree {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for MenuTree {
    fn eq(&self, other: &Self) -> bool {
        self.to_flat() == other.to_flat()
    }
}

impl Eq for MenuTree {}

impl MenuTree {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            index: HashMap::new(),
            roots: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.index.contains_key(id)
    }

    pub fn get(&self, id: &ItemId) -> Option<&MenuItem> {
        self.node_by_id(id).map(|n| &n.item)
    }

    pub fn node_by_id(&self, id: &ItemId) -> Option<&MenuNode> {
        self.index.get(id).and_then(|&idx| self.arena.get(idx))
    }

    pub fn node(&self, idx: Index) -> Option<&MenuNode> {
        self.arena.get(idx)
    }

    pub(crate) fn index_of(&self, id: &ItemId) -> Option<Index> {
        self.index.get(id).copied()
    }

    /// Root entries in position order.
    pub fn roots(&self) -> impl Iterator<Item = &MenuItem> + '_ {
        self.roots
            .iter()
            .filter_map(|&idx| self.arena.get(idx))
            .map(|n| &n.item)
    }

    pub fn root_indices(&self) -> &[Index] {
        &self.roots
    }

    /// Entries of one sibling group: children of `parent`, or the roots.
    pub fn children(&self, parent: Option<&ItemId>) -> Vec<&MenuItem> {
        let parent_idx = match parent {
            Some(id) => match self.index_of(id) {
                Some(idx) => Some(idx),
                None => return Vec::new(),
            },
            None => None,
        };
        self.siblings(parent_idx)
            .iter()
            .filter_map(|&idx| self.arena.get(idx))
            .map(|n| &n.item)
            .collect()
    }

    pub fn parent(&self, id: &ItemId) -> Option<&MenuItem> {
        self.node_by_id(id)
            .and_then(|n| n.parent)
            .and_then(|p| self.arena.get(p))
            .map(|n| &n.item)
    }

    /// Number of ancestor edges between `id` and its root (roots are depth 0).
    #[instrument(level = "trace", skip(self))]
    pub fn depth(&self, id: &ItemId) -> Option<usize> {
        let mut current = self.node_by_id(id)?;
        let mut depth = 0;
        while let Some(parent) = current.parent.and_then(|p| self.arena.get(p)) {
            depth += 1;
            current = parent;
        }
        Some(depth)
    }

    /// Longest descendant chain below `id` (a leaf has height 0).
    #[instrument(level = "trace", skip(self))]
    pub fn height(&self, id: &ItemId) -> Option<usize> {
        let start = self.index_of(id)?;
        let mut height = 0;
        let mut stack = vec![(start, 0usize)];
        while let Some((idx, level)) = stack.pop() {
            height = height.max(level);
            if let Some(node) = self.arena.get(idx) {
                stack.extend(node.children.iter().map(|&c| (c, level + 1)));
            }
        }
        Some(height)
    }

    /// Whether `candidate` is `ancestor` itself or lies below it.
    pub fn is_within(&self, candidate: &ItemId, ancestor: &ItemId) -> bool {
        let Some(target) = self.index_of(ancestor) else {
            return false;
        };
        let mut cursor = self.index_of(candidate);
        while let Some(idx) = cursor {
            if idx == target {
                return true;
            }
            cursor = self.arena.get(idx).and_then(|n| n.parent);
        }
        false
    }

    /// Rank of `id` within its sibling group.
    pub fn sibling_index(&self, id: &ItemId) -> Option<usize> {
        let idx = self.index_of(id)?;
        let parent = self.arena.get(idx)?.parent;
        self.siblings(parent).iter().position(|&c| c == idx)
    }

    /// Pre-order traversal over all roots.
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self)
    }

    /// Nested representation with embedded children.
    #[instrument(level = "debug", skip(self))]
    pub fn to_nested(&self) -> Vec<NestedItem> {
        fn build(tree: &MenuTree, idx: Index) -> Option<NestedItem> {
            let node = tree.arena.get(idx)?;
            Some(NestedItem {
                item: node.item.clone(),
                children: node
                    .children
                    .iter()
                    .filter_map(|&c| build(tree, c))
                    .collect(),
            })
        }
        self.roots.iter().filter_map(|&r| build(self, r)).collect()
    }

    /// Flat parent-pointer records in depth-first order.
    pub fn to_flat(&self) -> Vec<MenuItem> {
        self.iter().map(|(_, node)| node.item.clone()).collect()
    }

    // ------------------------------------------------------------------
    // Structural edits, used by the converter and the mutation engine
    // ------------------------------------------------------------------

    pub(crate) fn item_mut(&mut self, id: &ItemId) -> Option<&mut MenuItem> {
        let idx = self.index_of(id)?;
        self.arena.get_mut(idx).map(|n| &mut n.item)
    }

    fn siblings(&self, parent: Option<Index>) -> &[Index] {
        match parent {
            Some(p) => self
                .arena
                .get(p)
                .map(|n| n.children.as_slice())
                .unwrap_or(&[]),
            None => &self.roots,
        }
    }

    fn siblings_mut(&mut self, parent: Option<Index>) -> &mut Vec<Index> {
        match parent {
            Some(p) if self.arena.contains(p) => &mut self.arena[p].children,
            _ => &mut self.roots,
        }
    }

    /// Insert a new node as the last child of `parent` (or last root).
    pub(crate) fn push(&mut self, item: MenuItem, parent: Option<Index>) -> Index {
        let id = item.id.clone();
        let idx = self.arena.insert(MenuNode {
            item,
            parent: None,
            children: Vec::new(),
        });
        self.index.insert(id, idx);
        self.place_last(idx, parent);
        idx
    }

    /// Append an existing, detached node under `parent`.
    pub(crate) fn place_last(&mut self, idx: Index, parent: Option<Index>) {
        let parent = parent.filter(|&p| self.arena.contains(p));
        let parent_id = parent
            .and_then(|p| self.arena.get(p))
            .map(|n| n.item.id.clone());
        let list = self.siblings_mut(parent);
        list.push(idx);
        let position = list.len() - 1;
        if let Some(node) = self.arena.get_mut(idx) {
            node.parent = parent;
            node.item.position = position;
            node.item.parent_id = parent_id;
        }
    }

    /// Unlink a node from its sibling list and renumber that list.
    /// Returns the former parent.
    pub(crate) fn detach(&mut self, idx: Index) -> Option<Index> {
        let parent = self.arena.get(idx)?.parent;
        self.siblings_mut(parent).retain(|&c| c != idx);
        self.renumber(parent);
        if let Some(node) = self.arena.get_mut(idx) {
            node.parent = None;
        }
        parent
    }

    /// Move a node inside its own sibling list. Returns `(from, to)`.
    pub(crate) fn move_in_list(&mut self, idx: Index, to: usize) -> Option<(usize, usize)> {
        let parent = self.arena.get(idx)?.parent;
        let list = self.siblings_mut(parent);
        let from = list.iter().position(|&c| c == idx)?;
        let moved = list.remove(from);
        let to = to.min(list.len());
        list.insert(to, moved);
        self.renumber(parent);
        Some((from, to))
    }

    /// Remove a node and all of its descendants. Returns the removed items.
    pub(crate) fn remove_subtree(&mut self, idx: Index) -> Vec<MenuItem> {
        if !self.arena.contains(idx) {
            return Vec::new();
        }
        self.detach(idx);
        let mut removed = Vec::new();
        let mut stack = vec![idx];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.arena.remove(current) {
                stack.extend(node.children.iter().copied());
                self.index.remove(&node.item.id);
                removed.push(node.item);
            }
        }
        removed
    }

    /// Rewrite `position` and `parent_id` of one sibling list from its order.
    pub(crate) fn renumber(&mut self, parent: Option<Index>) {
        let parent_id = parent
            .and_then(|p| self.arena.get(p))
            .map(|n| n.item.id.clone());
        let list = self.siblings(parent).to_vec();
        for (position, idx) in list.into_iter().enumerate() {
            if let Some(node) = self.arena.get_mut(idx) {
                node.item.position = position;
                node.item.parent_id = parent_id.clone();
            }
        }
    }

    /// Give a node a new id, keeping its children's `parent_id` in step.
    pub(crate) fn rekey(&mut self, from: &ItemId, to: ItemId) -> bool {
        let Some(idx) = self.index.remove(from) else {
            return false;
        };
        let children = match self.arena.get_mut(idx) {
            Some(node) => {
                node.item.id = to.clone();
                node.children.clone()
            }
            None => return false,
        };
        for child in children {
            if let Some(node) = self.arena.get_mut(child) {
                node.item.parent_id = Some(to.clone());
            }
        }
        self.index.insert(to, idx);
        true
    }
}

/// Pre-order iterator yielding `(depth, node)`.
pub struct TreeIterator<'a> {
    tree: &'a MenuTree,
    stack: Vec<(Index, usize)>,
}

impl<'a> TreeIterator<'a> {
    fn new(tree: &'a MenuTree) -> Self {
        // Push in reverse order for left-to-right traversal
        let stack = tree.roots.iter().rev().map(|&r| (r, 0)).collect();
        Self { tree, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (usize, &'a MenuNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((idx, depth)) = self.stack.pop() {
            if let Some(node) = self.tree.arena.get(idx) {
                for &child in node.children.iter().rev() {
                    self.stack.push((child, depth + 1));
                }
                return Some((depth, node));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::LinkTarget;

    fn item(id: &str) -> MenuItem {
        MenuItem {
            id: ItemId::new(id),
            label: id.to_uppercase(),
            link: format!("/{id}"),
            link_target: LinkTarget::SameWindow,
            position: 0,
            parent_id: None,
        }
    }

    fn sample() -> MenuTree {
        // a
        // ├── b
        // │   └── c
        // d
        let mut tree = MenuTree::new();
        let a = tree.push(item("a"), None);
        let b = tree.push(item("b"), Some(a));
        tree.push(item("c"), Some(b));
        tree.push(item("d"), None);
        tree
    }

    #[test]
    fn given_pushed_nodes_when_iterating_then_yields_preorder_with_depth() {
        let tree = sample();
        let visited: Vec<(usize, &str)> = tree
            .iter()
            .map(|(d, n)| (d, n.item.id.as_str()))
            .collect();
        assert_eq!(visited, vec![(0, "a"), (1, "b"), (2, "c"), (0, "d")]);
    }

    #[test]
    fn given_nested_node_when_measuring_then_depth_and_height_match() {
        let tree = sample();
        assert_eq!(tree.depth(&"c".into()), Some(2));
        assert_eq!(tree.height(&"a".into()), Some(2));
        assert_eq!(tree.height(&"d".into()), Some(0));
        assert_eq!(tree.depth(&"zz".into()), None);
    }

    #[test]
    fn given_descendant_when_checking_within_then_true_only_below_ancestor() {
        let tree = sample();
        assert!(tree.is_within(&"c".into(), &"a".into()));
        assert!(tree.is_within(&"a".into(), &"a".into()));
        assert!(!tree.is_within(&"a".into(), &"c".into()));
        assert!(!tree.is_within(&"d".into(), &"a".into()));
    }

    #[test]
    fn given_subtree_when_removed_then_index_forgets_all_descendants() {
        let mut tree = sample();
        let a = tree.index_of(&"a".into()).expect("a");
        let removed = tree.remove_subtree(a);
        assert_eq!(removed.len(), 3);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.get(&"d".into()).map(|i| i.position), Some(0));
    }

    #[test]
    fn given_rekeyed_parent_when_reading_children_then_parent_id_follows() {
        let mut tree = sample();
        assert!(tree.rekey(&"b".into(), ItemId::new("7")));
        assert_eq!(
            tree.get(&"c".into()).and_then(|i| i.parent_id.clone()),
            Some(ItemId::new("7"))
        );
        assert!(tree.contains(&"7".into()));
        assert!(!tree.contains(&"b".into()));
    }
}
