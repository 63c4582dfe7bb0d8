//! Menu persistence service
//!
//! Loads a menu file of any shape into a tree and saves trees back as flat
//! records, turning temporary ids into permanent ones on the way out.

use std::collections::HashSet;
use std::io;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::application::error_ext::PathContextExt;
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{ItemId, MenuTree, NestedItem};
use crate::infrastructure::traits::FileSystem;

/// Result of saving a menu.
#[derive(Debug, Clone)]
pub struct SaveReport {
    /// The saved tree, with permanent ids only
    pub tree: MenuTree,
    /// Temporary id → permanent id, in tree order
    pub assigned: Vec<(ItemId, ItemId)>,
}

/// Service for reading and writing menu files.
pub struct MenuService {
    fs: Arc<dyn FileSystem>,
}

impl MenuService {
    /// Create a new menu service.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Load a menu file. Flat and nested JSON are both accepted; a missing
    /// file is an empty menu.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path) -> ApplicationResult<MenuTree> {
        let records = self.load_records(path)?;
        let tree = MenuTree::from_records(&records);
        debug!("load: {} items from {}", tree.len(), path.display());
        Ok(tree)
    }

    /// Read the records of a menu file as stored, without nesting them.
    pub fn load_records(&self, path: &Path) -> ApplicationResult<Vec<NestedItem>> {
        if !self.fs.exists(path) {
            debug!("load: {} does not exist, starting empty", path.display());
            return Ok(Vec::new());
        }
        if !self.fs.is_file(path) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "not a regular file",
            ))
            .with_path_context("read menu", path);
        }
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read menu", path)?;
        parse_records(&content).with_path_context("parse menu", path)
    }

    /// Save a menu as flat records.
    #[instrument(level = "debug", skip(self, tree))]
    pub fn save(&self, path: &Path, tree: &MenuTree) -> ApplicationResult<SaveReport> {
        let (tree, assigned) = assign_permanent_ids(tree);
        let json = serde_json::to_string_pretty(&tree.to_flat())
            .with_path_context("serialize menu", path)?;

        self.fs
            .ensure_parent(path)
            .with_path_context("create directory for", path)?;
        self.fs
            .write(path, &format!("{json}\n"))
            .with_path_context("write menu", path)?;

        info!(
            "saved {} items to {} ({} new ids)",
            tree.len(),
            path.display(),
            assigned.len()
        );
        Ok(SaveReport { tree, assigned })
    }

    /// Render a tree as JSON, flat or nested.
    pub fn export(&self, tree: &MenuTree, nested: bool) -> ApplicationResult<String> {
        let rendered = if nested {
            serde_json::to_string_pretty(&tree.to_nested())
        } else {
            serde_json::to_string_pretty(&tree.to_flat())
        };
        rendered.map_err(|e| ApplicationError::OperationFailed {
            context: "serialize menu".to_string(),
            source: Box::new(e),
        })
    }
}

/// Parse menu JSON, flat or nested. Blank content is an empty menu.
pub fn parse_records(content: &str) -> Result<Vec<NestedItem>, serde_json::Error> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(content)
}

/// Replace every temporary id with the next free numeric id.
///
/// Numbering continues after the largest numeric id present and wraps to 1
/// past `u64::MAX`; ids already in the tree are skipped. Non-numeric
/// permanent ids are left alone.
pub fn assign_permanent_ids(tree: &MenuTree) -> (MenuTree, Vec<(ItemId, ItemId)>) {
    let temporary: Vec<ItemId> = tree
        .iter()
        .map(|(_, node)| node.item.id.clone())
        .filter(ItemId::is_temporary)
        .collect();
    if temporary.is_empty() {
        return (tree.clone(), Vec::new());
    }

    let mut taken: HashSet<ItemId> = tree
        .iter()
        .map(|(_, node)| node.item.id.clone())
        .collect();
    let start = tree
        .iter()
        .filter_map(|(_, node)| node.item.id.as_str().parse::<u64>().ok())
        .max()
        .and_then(|max| max.checked_add(1))
        .unwrap_or(1);
    let mut candidates = (start..=u64::MAX)
        .chain(1..start)
        .map(|n| ItemId::new(n.to_string()));

    let mut rekeyed = tree.clone();
    let mut assigned = Vec::with_capacity(temporary.len());
    for temp in temporary {
        let Some(permanent) = candidates.find(|id| !taken.contains(id)) else {
            warn!("no free numeric id left for {}", temp);
            break;
        };
        taken.insert(permanent.clone());
        if rekeyed.rekey(&temp, permanent.clone()) {
            assigned.push((temp, permanent));
        }
    }
    (rekeyed, assigned)
}
