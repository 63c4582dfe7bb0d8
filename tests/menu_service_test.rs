//! Integration tests for loading and saving menu files.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use navmenu::application::services::{assign_permanent_ids, MenuService};
use navmenu::application::ApplicationError;
use navmenu::config::Settings;
use navmenu::domain::{add_item, ItemDefaults, ItemId, LinkTarget, MenuItem, MenuTree};
use navmenu::infrastructure::di::ServiceContainer;
use navmenu::infrastructure::traits::{FileSystem, RealFileSystem};

/// In-memory filesystem keeping written files in a map.
#[derive(Default)]
struct MemoryFs {
    files: Mutex<HashMap<PathBuf, String>>,
}

impl MemoryFs {
    fn with_file(path: &str, content: &str) -> Self {
        let fs = Self::default();
        fs.files
            .lock()
            .unwrap()
            .insert(PathBuf::from(path), content.to_string());
        fs
    }

    fn content(&self, path: &str) -> Option<String> {
        self.files.lock().unwrap().get(Path::new(path)).cloned()
    }
}

impl FileSystem for MemoryFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.content(&path.to_string_lossy())
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.exists(path)
    }

    fn ensure_parent(&self, _path: &Path) -> io::Result<()> {
        Ok(())
    }
}

fn rec(id: &str, parent: Option<&str>, position: usize) -> MenuItem {
    MenuItem {
        id: ItemId::new(id),
        label: id.to_uppercase(),
        link: format!("/{id}"),
        link_target: LinkTarget::SameWindow,
        position,
        parent_id: parent.map(ItemId::new),
    }
}

const FLAT: &str = r#"[
  {"id": "1", "label": "Home", "link": "/", "linkTarget": "same-window", "position": 0, "parentId": null},
  {"id": "2", "label": "Shop", "link": "/shop", "linkTarget": "same-window", "position": 1, "parentId": null},
  {"id": "3", "label": "Sale", "link": "/sale", "linkTarget": "new-window", "position": 0, "parentId": "2"}
]"#;

const NESTED: &str = r#"[
  {"id": "1", "label": "Home", "link": "/", "linkTarget": "same-window", "position": 0, "parentId": null},
  {"id": "2", "label": "Shop", "link": "/shop", "linkTarget": "same-window", "position": 1, "parentId": null,
   "children": [
     {"id": "3", "label": "Sale", "link": "/sale", "linkTarget": "new-window", "position": 0, "parentId": "2"}
   ]}
]"#;

#[test]
fn given_missing_file_when_loading_then_empty_menu() {
    let service = MenuService::new(Arc::new(MemoryFs::default()));

    let tree = service.load(Path::new("/menu.json")).unwrap();

    assert!(tree.is_empty());
}

#[test]
fn given_flat_and_nested_files_when_loading_then_same_tree() {
    // Arrange
    let flat = MenuService::new(Arc::new(MemoryFs::with_file("/flat.json", FLAT)));
    let nested = MenuService::new(Arc::new(MemoryFs::with_file("/nested.json", NESTED)));

    // Act
    let from_flat = flat.load(Path::new("/flat.json")).unwrap();
    let from_nested = nested.load(Path::new("/nested.json")).unwrap();

    // Assert
    assert_eq!(from_flat, from_nested);
    assert_eq!(from_flat.len(), 3);
    assert_eq!(from_flat.depth(&"3".into()), Some(1));
}

#[test]
fn given_malformed_json_when_loading_then_operation_failed() {
    let service = MenuService::new(Arc::new(MemoryFs::with_file("/menu.json", "{ not json")));

    let result = service.load(Path::new("/menu.json"));

    assert!(matches!(result, Err(ApplicationError::OperationFailed { .. })));
}

#[test]
fn given_temporary_ids_when_saving_then_numbered_after_largest_id() {
    // Arrange
    let fs = Arc::new(MemoryFs::with_file("/menu.json", FLAT));
    let service = MenuService::new(fs.clone());
    let tree = service.load(Path::new("/menu.json")).unwrap();
    let (tree, first) = add_item(&tree, Some(&"2".into()), &ItemDefaults::default(), 3).unwrap();
    let (tree, second) = add_item(&tree, None, &ItemDefaults::default(), 3).unwrap();

    // Act
    let report = service.save(Path::new("/menu.json"), &tree).unwrap();

    // Assert
    let assigned: HashMap<ItemId, ItemId> = report.assigned.into_iter().collect();
    assert_eq!(assigned.get(&first), Some(&ItemId::new("4")));
    assert_eq!(assigned.get(&second), Some(&ItemId::new("5")));
    assert!(report.tree.iter().all(|(_, n)| !n.item.id.is_temporary()));

    let written = fs.content("/menu.json").unwrap();
    assert!(!written.contains("tmp-"));
    assert!(written.ends_with('\n'));
    let records: Vec<MenuItem> = serde_json::from_str(&written).unwrap();
    assert_eq!(records.len(), 5);
}

#[test]
fn given_temporary_parent_when_assigning_ids_then_children_follow() {
    // Arrange
    let tree = MenuTree::from_flat(&[rec("a", None, 0)]);
    let (tree, parent) = add_item(&tree, None, &ItemDefaults::default(), 3).unwrap();
    let (tree, child) = add_item(&tree, Some(&parent), &ItemDefaults::default(), 3).unwrap();

    // Act
    let (saved, assigned) = assign_permanent_ids(&tree);

    // Assert
    assert_eq!(assigned.len(), 2);
    let permanent_parent = &assigned[0].1;
    let permanent_child = &assigned[1].1;
    assert_eq!(assigned[1].0, child);
    assert_eq!(permanent_parent.as_str(), "1");
    assert_eq!(
        saved.get(permanent_child).unwrap().parent_id.as_ref(),
        Some(permanent_parent)
    );
}

#[test]
fn given_saved_menu_when_exporting_nested_then_children_embedded() {
    let service = MenuService::new(Arc::new(MemoryFs::with_file("/menu.json", FLAT)));
    let tree = service.load(Path::new("/menu.json")).unwrap();

    let flat = service.export(&tree, false).unwrap();
    let nested = service.export(&tree, true).unwrap();

    assert!(!flat.contains("children"));
    assert!(nested.contains("children"));
}

#[test]
fn given_real_filesystem_when_saving_into_missing_dir_then_file_is_created() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("site").join("menu.json");
    let service = MenuService::new(Arc::new(RealFileSystem));
    let tree = MenuTree::from_flat(&[rec("1", None, 0), rec("2", Some("1"), 0)]);

    // Act
    service.save(&path, &tree).unwrap();

    // Assert
    let reloaded = service.load(&path).unwrap();
    assert_eq!(reloaded, tree);
    assert!(fs::read_to_string(&path).unwrap().contains("\"parentId\": \"1\""));
}

#[test]
fn given_directory_in_place_of_file_when_loading_then_operation_failed() {
    let dir = TempDir::new().unwrap();
    let service = MenuService::new(Arc::new(RealFileSystem));

    let result = service.load(dir.path());

    assert!(matches!(result, Err(ApplicationError::OperationFailed { .. })));
}

#[test]
fn given_largest_possible_numeric_id_when_assigning_ids_then_wraps_to_free_ids() {
    // Arrange: numbering cannot continue past u64::MAX, and "1" is taken
    let tree = MenuTree::from_flat(&[
        rec("18446744073709551615", None, 0),
        rec("1", None, 1),
    ]);
    let (tree, first) = add_item(&tree, None, &ItemDefaults::default(), 3).unwrap();
    let (tree, second) = add_item(&tree, None, &ItemDefaults::default(), 3).unwrap();

    // Act
    let (saved, assigned) = assign_permanent_ids(&tree);

    // Assert
    assert_eq!(
        assigned,
        vec![(first, ItemId::new("2")), (second, ItemId::new("3"))]
    );
    assert_eq!(saved.len(), 4);
    assert_eq!(saved.get(&"1".into()).unwrap().position, 1);
    assert_eq!(saved.get(&"2".into()).unwrap().position, 2);
    assert_eq!(saved.get(&"3".into()).unwrap().position, 3);
}

#[test]
fn given_gap_below_largest_id_when_assigning_ids_then_existing_ids_untouched() {
    // Arrange
    let tree = MenuTree::from_flat(&[rec("3", None, 0), rec("4", None, 1)]);
    let (tree, temp) = add_item(&tree, None, &ItemDefaults::default(), 3).unwrap();

    // Act
    let (saved, assigned) = assign_permanent_ids(&tree);

    // Assert
    assert_eq!(assigned, vec![(temp, ItemId::new("5"))]);
    assert_eq!(saved.get(&"3".into()).unwrap().label, "3");
    assert_eq!(saved.get(&"4".into()).unwrap().label, "4");
}

#[test]
fn given_injected_filesystem_when_container_saves_then_menu_lands_there() {
    // Arrange
    let fs = Arc::new(MemoryFs::with_file("/site/menu.json", FLAT));
    let container = ServiceContainer::with_deps(Settings::default(), fs.clone());
    let path = container.menu_path(Path::new("/site"), None);

    // Act
    let tree = container.menu.load(&path).unwrap();
    let (tree, _) = add_item(&tree, None, &ItemDefaults::default(), 3).unwrap();
    container.menu.save(&path, &tree).unwrap();

    // Assert
    let written = fs.content("/site/menu.json").unwrap();
    let records: Vec<MenuItem> = serde_json::from_str(&written).unwrap();
    assert_eq!(records.len(), 4);
    assert!(records.iter().any(|r| r.id.as_str() == "4"));
}
