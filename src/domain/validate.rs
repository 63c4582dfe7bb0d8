//! Structural invariant checks for menu data.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use itertools::Itertools;
use tracing::instrument;

use crate::domain::arena::MenuTree;
use crate::domain::entities::{ItemId, MenuItem, NestedItem};

/// A broken menu invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    DuplicateId(ItemId),
    DanglingParent { id: ItemId, parent: ItemId },
    Cycle(ItemId),
    TooDeep {
        id: ItemId,
        depth: usize,
        max_depth: usize,
    },
    PositionGap {
        parent: Option<ItemId>,
        positions: Vec<usize>,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::DuplicateId(id) => write!(f, "duplicate id {id}"),
            Violation::DanglingParent { id, parent } => {
                write!(f, "{id} refers to missing parent {parent}")
            }
            Violation::Cycle(id) => write!(f, "{id} is its own ancestor"),
            Violation::TooDeep {
                id,
                depth,
                max_depth,
            } => write!(f, "{id} sits at depth {depth}, limit is {}", max_depth.saturating_sub(1)),
            Violation::PositionGap { parent, positions } => {
                let group = parent
                    .as_ref()
                    .map(|p| format!("children of {p}"))
                    .unwrap_or_else(|| "root entries".to_string());
                write!(
                    f,
                    "{group} have positions {:?}, expected 0..{}",
                    positions,
                    positions.len()
                )
            }
        }
    }
}

/// Check flat records against every menu invariant.
#[instrument(level = "debug", skip(records), fields(records = records.len()))]
pub fn validate_records(records: &[MenuItem], max_depth: usize) -> Vec<Violation> {
    let mut violations: Vec<Violation> = records
        .iter()
        .map(|r| &r.id)
        .duplicates()
        .cloned()
        .map(Violation::DuplicateId)
        .collect();

    let parents: HashMap<&ItemId, Option<&ItemId>> = records
        .iter()
        .map(|r| (&r.id, r.parent_id.as_ref()))
        .collect();

    for record in records {
        if let Some(parent) = &record.parent_id {
            if !parents.contains_key(parent) {
                violations.push(Violation::DanglingParent {
                    id: record.id.clone(),
                    parent: parent.clone(),
                });
            }
        }
    }

    for record in records {
        let mut seen = HashSet::new();
        let mut depth = 0usize;
        let mut cursor = record.parent_id.as_ref();
        seen.insert(&record.id);
        let mut on_cycle = false;
        while let Some(parent) = cursor {
            if !seen.insert(parent) {
                on_cycle = true;
                break;
            }
            depth += 1;
            cursor = parents.get(parent).copied().flatten();
        }
        if on_cycle {
            if record_on_cycle(record, &parents) {
                violations.push(Violation::Cycle(record.id.clone()));
            }
        } else if depth >= max_depth {
            violations.push(Violation::TooDeep {
                id: record.id.clone(),
                depth,
                max_depth,
            });
        }
    }

    let mut groups: BTreeMap<Option<&ItemId>, Vec<usize>> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.parent_id.as_ref())
            .or_default()
            .push(record.position);
    }
    for (parent, positions) in groups {
        let sorted: Vec<usize> = positions.iter().copied().sorted().collect();
        if !sorted.iter().copied().eq(0..sorted.len()) {
            violations.push(Violation::PositionGap {
                parent: parent.cloned(),
                positions: sorted,
            });
        }
    }

    violations
}

/// Check a tree snapshot; stored positions and parent links must agree with
/// the structure.
pub fn validate_tree(tree: &MenuTree, max_depth: usize) -> Vec<Violation> {
    validate_records(&tree.to_flat(), max_depth)
}

/// Check records as they were stored, before loading repairs anything.
///
/// Embedded children are attributed to the entry embedding them; stored
/// positions are checked as written.
pub fn validate_stored(records: &[NestedItem], max_depth: usize) -> Vec<Violation> {
    fn collect(records: &[NestedItem], parent: Option<&ItemId>, out: &mut Vec<MenuItem>) {
        for record in records {
            let mut item = record.item.clone();
            if let Some(parent) = parent {
                item.parent_id = Some(parent.clone());
            }
            out.push(item);
            collect(&record.children, Some(&record.item.id), out);
        }
    }

    let mut flat = Vec::new();
    collect(records, None, &mut flat);
    validate_records(&flat, max_depth)
}

fn record_on_cycle(record: &MenuItem, parents: &HashMap<&ItemId, Option<&ItemId>>) -> bool {
    let mut cursor = record.parent_id.as_ref();
    let mut steps = 0;
    while let Some(parent) = cursor {
        if parent == &record.id {
            return true;
        }
        steps += 1;
        if steps > parents.len() {
            return false;
        }
        cursor = parents.get(parent).copied().flatten();
    }
    false
}
