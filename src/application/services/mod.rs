//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem) but are themselves
//! concrete structs, not traits.

mod editor;
mod menu;

pub use editor::{EditorOptions, MenuEditor, Notice, NoticeLevel};
pub use menu::{assign_permanent_ids, parse_records, MenuService, SaveReport};
