//! Text rendering of menu trees.

use generational_arena::Index;
use termtree::Tree;
use tracing::instrument;

use crate::domain::{LinkTarget, MenuItem, MenuTree, ViewState};

pub trait TreeDisplay {
    fn to_tree_string(&self, view: &ViewState) -> Tree<String>;
}

impl TreeDisplay for MenuTree {
    #[instrument(level = "debug", skip_all)]
    fn to_tree_string(&self, view: &ViewState) -> Tree<String> {
        fn build(tree: &MenuTree, idx: Index, view: &ViewState, parent: &mut Tree<String>) {
            let Some(node) = tree.node(idx) else {
                return;
            };
            let expanded = view.is_expanded(&node.item.id);
            let mut label = node_label(&node.item);
            if !expanded && !node.children.is_empty() {
                label.push_str(&format!(" [+{}]", node.children.len()));
            }
            let mut child_tree = Tree::new(label);
            if expanded {
                for &child in &node.children {
                    build(tree, child, view, &mut child_tree);
                }
            }
            parent.push(child_tree);
        }

        let mut root = Tree::new(if self.is_empty() {
            "(empty menu)".to_string()
        } else {
            "menu".to_string()
        });
        for &idx in self.root_indices() {
            build(self, idx, view, &mut root);
        }
        root
    }
}

fn node_label(item: &MenuItem) -> String {
    let target = match item.link_target {
        LinkTarget::SameWindow => "",
        LinkTarget::NewWindow => " ↗",
    };
    format!("{} -> {}{} ({})", item.label, item.link, target, item.id)
}
