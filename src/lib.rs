//! navmenu: hierarchical navigation-menu editor
//!
//! Menu entries live in an id-indexed arena tree with ordered child lists.
//! Pure operations take a snapshot and return a new one: nest and flatten
//! records, create/update/delete entries, reorder and reparent them by drag
//! and drop, all under a maximum nesting depth.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod tree_traits;
pub mod util;
