//! Presentation-only state, kept apart from the menu data.

use std::collections::HashSet;

use crate::domain::entities::ItemId;

/// Expand/collapse flags keyed by item id. Entries are expanded unless
/// collapsed here; ids no longer in the tree are simply ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    collapsed: HashSet<ItemId>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_collapsed(ids: impl IntoIterator<Item = ItemId>) -> Self {
        Self {
            collapsed: ids.into_iter().collect(),
        }
    }

    pub fn is_expanded(&self, id: &ItemId) -> bool {
        !self.collapsed.contains(id)
    }

    pub fn collapse(&mut self, id: ItemId) {
        self.collapsed.insert(id);
    }

    pub fn expand(&mut self, id: &ItemId) {
        self.collapsed.remove(id);
    }

    /// Flip the flag, returning whether the entry is now expanded.
    pub fn toggle(&mut self, id: &ItemId) -> bool {
        if self.collapsed.remove(id) {
            true
        } else {
            self.collapsed.insert(id.clone());
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_collapsed_item_when_toggled_twice_then_collapsed_again() {
        let id = ItemId::new("a");
        let mut view = ViewState::with_collapsed([id.clone()]);
        assert!(!view.is_expanded(&id));
        assert!(view.toggle(&id));
        assert!(!view.toggle(&id));
        view.expand(&id);
        assert!(view.is_expanded(&id));
    }
}
