//! Conversion between the flat parent-pointer shape and the nested shape.

use std::collections::{HashMap, HashSet, VecDeque};

use generational_arena::Index;
use tracing::{debug, instrument, warn};

use crate::domain::arena::MenuTree;
use crate::domain::entities::{ItemId, MenuItem, NestedItem};

/// Build a nested tree from records of any shape.
///
/// Input may be flat (`parent_id` links, no children), already nested, or a
/// mix of both; every entry is collected exactly once before nesting, so the
/// result does not depend on the input shape. Sibling lists come out sorted
/// by `position` and renumbered `0..n-1`.
pub fn nestify(records: &[NestedItem]) -> Vec<NestedItem> {
    MenuTree::from_records(records).to_nested()
}

/// Flatten a nested tree into parent-pointer records, depth first.
///
/// `parent_id` and `position` are taken from where each node sits in the
/// walked structure, not from the stored fields.
pub fn flatten(tree: &[NestedItem]) -> Vec<MenuItem> {
    fn walk(list: &[NestedItem], parent: Option<&ItemId>, out: &mut Vec<MenuItem>) {
        for (position, node) in list.iter().enumerate() {
            let mut item = node.item.clone();
            item.parent_id = parent.cloned();
            item.position = position;
            out.push(item);
            walk(&node.children, Some(&node.item.id), out);
        }
    }

    let mut out = Vec::new();
    walk(tree, None, &mut out);
    out
}

impl MenuTree {
    /// Build the arena from loaded records.
    ///
    /// Entries whose parent does not resolve are promoted to roots. A parent
    /// chain that loops back on itself is cut at the first entry found on the
    /// loop, which becomes a root.
    #[instrument(level = "debug", skip(records), fields(records = records.len()))]
    pub fn from_records(records: &[NestedItem]) -> MenuTree {
        let items = collect_unique(records);
        let known: HashSet<&ItemId> = items.iter().map(|i| &i.id).collect();

        let mut parents: HashMap<ItemId, Option<ItemId>> = HashMap::with_capacity(items.len());
        for item in &items {
            let parent = match &item.parent_id {
                Some(p) if known.contains(p) => Some(p.clone()),
                Some(p) => {
                    warn!("menu item {} has unknown parent {}, treating as root", item.id, p);
                    None
                }
                None => None,
            };
            parents.insert(item.id.clone(), parent);
        }
        break_cycles(&items, &mut parents);

        let mut groups: HashMap<Option<ItemId>, Vec<&MenuItem>> = HashMap::new();
        for item in &items {
            let parent = parents.get(&item.id).cloned().flatten();
            groups.entry(parent).or_default().push(item);
        }
        for group in groups.values_mut() {
            // stable: equal positions keep input order
            group.sort_by_key(|i| i.position);
        }

        let mut tree = MenuTree::new();
        let mut queue: VecDeque<(Option<ItemId>, Option<Index>)> = VecDeque::new();
        queue.push_back((None, None));
        while let Some((parent_id, parent_idx)) = queue.pop_front() {
            let Some(group) = groups.remove(&parent_id) else {
                continue;
            };
            for item in group {
                let idx = tree.push(item.clone(), parent_idx);
                queue.push_back((Some(item.id.clone()), Some(idx)));
            }
        }
        debug!("nested {} menu items", tree.len());
        tree
    }

    /// Build the arena from flat records.
    pub fn from_flat(items: &[MenuItem]) -> MenuTree {
        let records: Vec<NestedItem> = items.iter().cloned().map(NestedItem::leaf).collect();
        Self::from_records(&records)
    }
}

/// Collect every entry once, pre-order; the first occurrence of an id wins.
/// Embedded children take their embedding node as parent, also when that
/// node is a repeat and is itself skipped.
fn collect_unique(records: &[NestedItem]) -> Vec<MenuItem> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    let mut stack: Vec<(&NestedItem, Option<&ItemId>)> =
        records.iter().rev().map(|r| (r, None)).collect();

    while let Some((node, embedded_in)) = stack.pop() {
        if seen.insert(node.item.id.clone()) {
            let mut item = node.item.clone();
            if let Some(parent) = embedded_in {
                item.parent_id = Some(parent.clone());
            }
            out.push(item);
        } else {
            debug!("skipping repeated menu item {}", node.item.id);
        }
        for child in node.children.iter().rev() {
            stack.push((child, Some(&node.item.id)));
        }
    }
    out
}

fn break_cycles(items: &[MenuItem], parents: &mut HashMap<ItemId, Option<ItemId>>) {
    for item in items {
        let mut seen = HashSet::new();
        let mut cursor = Some(item.id.clone());
        while let Some(current) = cursor {
            if !seen.insert(current.clone()) {
                warn!("menu item {} is part of a parent cycle, treating as root", current);
                parents.insert(current, None);
                break;
            }
            cursor = parents.get(&current).cloned().flatten();
        }
    }
}
