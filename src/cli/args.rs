//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

/// Hierarchical navigation-menu editor: nest, flatten, reorder and reparent menu entries
#[derive(Parser, Debug)]
#[command(name = "navmenu")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Project directory (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    /// Menu file (default: menu_file from config)
    #[arg(short, long, global = true, env = "NAVMENU_FILE", value_hint = ValueHint::FilePath)]
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the menu as a tree
    Show {
        /// Fold the children of these entries
        #[arg(long = "collapse", value_name = "ID")]
        collapse: Vec<String>,
    },

    /// Create an entry
    Add {
        /// Parent entry (default: root level)
        #[arg(short, long)]
        parent: Option<String>,
        /// Label (default from config)
        #[arg(short, long)]
        label: Option<String>,
        /// Link target URL or path (default from config)
        #[arg(long)]
        link: Option<String>,
        /// Open the link in a new window
        #[arg(long)]
        new_window: bool,
    },

    /// Change one field of an entry (label, link, linkTarget)
    Set {
        /// Entry id
        id: String,
        /// Field name
        field: String,
        /// New value
        value: String,
    },

    /// Delete an entry and everything below it
    Rm {
        /// Entry id
        id: String,
    },

    /// Drag an entry onto another one
    Move {
        /// Entry being dragged
        id: String,
        /// Entry it is dropped on
        #[arg(long)]
        over: String,
        /// Drop inside the target as its last child instead of next to it
        #[arg(long)]
        inside: bool,
    },

    /// Check the menu file for structural problems
    Check,

    /// Print the menu as JSON
    Export {
        /// Embed children instead of printing flat records
        #[arg(long)]
        nested: bool,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective settings
    Show,
    /// Print a template config file
    Template,
    /// Show config file locations
    Path,
}
