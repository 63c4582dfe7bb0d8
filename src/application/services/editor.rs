//! Menu editing session
//!
//! Holds the current tree snapshot and feeds it through the mutation engine
//! and the drag controller. Every accepted change pushes the previous
//! snapshot onto a bounded undo history.

use std::collections::VecDeque;
use std::fmt;

use tracing::{debug, instrument, warn};

use crate::application::ApplicationResult;
use crate::config::Settings;
use crate::domain::mutation::check_max_depth;
use crate::domain::{
    add_item, remove_item, update_item, validate_tree, DragChange, DragController, DragOutcome,
    DropTarget, ItemDefaults, ItemId, MenuField, MenuItem, MenuTree, NestedItem, ViewState,
};

/// Options of an editing session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorOptions {
    /// Number of nesting levels allowed (roots are level one)
    pub max_depth: usize,
    /// Number of undo steps kept
    pub history_limit: usize,
    /// Field values of newly created entries
    pub defaults: ItemDefaults,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            max_depth: 3,
            history_limit: 50,
            defaults: ItemDefaults::default(),
        }
    }
}

impl From<&Settings> for EditorOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            max_depth: settings.max_depth,
            history_limit: settings.history_limit,
            defaults: settings.defaults.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
}

/// A message meant for the person editing the menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Single owner of the current menu snapshot.
#[derive(Debug)]
pub struct MenuEditor {
    tree: MenuTree,
    options: EditorOptions,
    drag: DragController,
    undo: VecDeque<MenuTree>,
    redo: Vec<MenuTree>,
    notices: Vec<Notice>,
    view: ViewState,
}

impl MenuEditor {
    /// Start a session on `tree`. Structural problems in the loaded data are
    /// reported as notices, not errors.
    pub fn new(tree: MenuTree, options: EditorOptions) -> ApplicationResult<Self> {
        check_max_depth(options.max_depth)?;
        let notices = validate_tree(&tree, options.max_depth)
            .into_iter()
            .map(|v| {
                warn!("loaded menu: {}", v);
                Notice::warning(v.to_string())
            })
            .collect();
        Ok(Self {
            tree,
            options,
            drag: DragController::new(),
            undo: VecDeque::new(),
            redo: Vec::new(),
            notices,
            view: ViewState::new(),
        })
    }

    /// Start a session from loaded records of any shape.
    pub fn from_records(records: &[NestedItem], options: EditorOptions) -> ApplicationResult<Self> {
        Self::new(MenuTree::from_records(records), options)
    }

    pub fn tree(&self) -> &MenuTree {
        &self.tree
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    /// Flat records of the current snapshot, ready to persist.
    pub fn records(&self) -> Vec<MenuItem> {
        self.tree.to_flat()
    }

    pub fn nested(&self) -> Vec<NestedItem> {
        self.tree.to_nested()
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ViewState {
        &mut self.view
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Create an entry under `parent` (or at root level). Returns its temporary id.
    #[instrument(level = "debug", skip(self))]
    pub fn create(&mut self, parent: Option<&ItemId>) -> ApplicationResult<ItemId> {
        let (next, id) = add_item(
            &self.tree,
            parent,
            &self.options.defaults,
            self.options.max_depth,
        )?;
        self.commit(next);
        Ok(id)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn update(&mut self, id: &ItemId, field: MenuField) -> ApplicationResult<()> {
        let next = update_item(&self.tree, id, field)?;
        self.commit(next);
        Ok(())
    }

    /// Delete an entry and everything below it.
    #[instrument(level = "debug", skip(self))]
    pub fn delete(&mut self, id: &ItemId) -> ApplicationResult<()> {
        let next = remove_item(&self.tree, id)?;
        let removed: Vec<ItemId> = self
            .tree
            .iter()
            .map(|(_, node)| &node.item.id)
            .filter(|candidate| self.tree.is_within(candidate, id))
            .cloned()
            .collect();
        self.commit(next);
        for gone in &removed {
            self.view.expand(gone);
        }
        Ok(())
    }

    pub fn begin_drag(&mut self, id: ItemId) {
        self.drag.begin(id);
    }

    pub fn hover_drag(&mut self, over: Option<DropTarget>) {
        self.drag.hover(over);
    }

    pub fn cancel_drag(&mut self) {
        self.drag.cancel();
    }

    /// Resolve the drag session. Returns the applied change, or `None` when
    /// the drop was cancelled or rejected; rejections raise a notice.
    #[instrument(level = "debug", skip(self))]
    pub fn end_drag(&mut self) -> Option<DragChange> {
        match self.drag.end(&self.tree, self.options.max_depth) {
            DragOutcome::Applied { tree, change } => {
                self.commit(tree);
                Some(change)
            }
            DragOutcome::Rejected(err) => {
                warn!("drop rejected: {}", err);
                self.notices.push(Notice::warning(err.to_string()));
                None
            }
            DragOutcome::Cancelled(reason) => {
                debug!("drop cancelled: {}", reason);
                None
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Step back to the previous snapshot. Returns false when there is none.
    pub fn undo(&mut self) -> bool {
        match self.undo.pop_back() {
            Some(previous) => {
                let current = std::mem::replace(&mut self.tree, previous);
                self.redo.push(current);
                true
            }
            None => false,
        }
    }

    /// Re-apply the last undone snapshot. Returns false when there is none.
    pub fn redo(&mut self) -> bool {
        match self.redo.pop() {
            Some(next) => {
                let current = std::mem::replace(&mut self.tree, next);
                self.push_undo(current);
                true
            }
            None => false,
        }
    }

    /// Swap in a tree coming back from persistence; history is dropped
    /// because older snapshots still carry temporary ids.
    pub fn reload(&mut self, tree: MenuTree) {
        self.tree = tree;
        self.undo.clear();
        self.redo.clear();
    }

    fn commit(&mut self, next: MenuTree) {
        let previous = std::mem::replace(&mut self.tree, next);
        self.push_undo(previous);
        self.redo.clear();
    }

    fn push_undo(&mut self, snapshot: MenuTree) {
        if self.options.history_limit == 0 {
            return;
        }
        if self.undo.len() == self.options.history_limit {
            self.undo.pop_front();
        }
        self.undo.push_back(snapshot);
    }
}
