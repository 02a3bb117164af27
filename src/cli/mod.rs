//! CLI argument definitions for Idea Vault.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Idea Vault - capture ideas, link them to parent ideas and group them into collections.
///
/// Start with `iv idea create "My idea"`, then `iv view grid` to browse.
#[derive(Parser, Debug)]
#[command(name = "iv")]
#[command(
    author,
    version,
    about = "A graph of ideas with parent links and collections",
    long_about = None
)]
#[command(long_version = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("IV_GIT_COMMIT"),
    ", built ",
    env!("IV_BUILD_TIMESTAMP"),
    ")"
))]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Storage backend: file, http or memory
    #[arg(long, global = true)]
    pub store: Option<String>,

    /// Directory holding the vault document and the action log
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Storage server base URL (http backend)
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Name of the vault document (e.g. idea_vault.json)
    #[arg(long = "key", global = true)]
    pub document_key: Option<String>,

    /// Log debug diagnostics to stderr (IV_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Idea management commands
    Idea {
        #[command(subcommand)]
        command: IdeaCommands,
    },

    /// Collection management commands
    Collection {
        #[command(subcommand)]
        command: CollectionCommands,
    },

    /// Render a view of the vault: grid, list, collections or mindmap
    View {
        /// View mode
        #[arg(value_parser = ["grid", "list", "collections", "mindmap"], default_value = "grid")]
        mode: String,

        /// Filter by collection: all, unassigned or a collection ID
        #[arg(long, default_value = "all")]
        collection: String,

        /// Case-insensitive title search (grid and list views)
        #[arg(long)]
        search: Option<String>,

        /// Also search descriptions
        #[arg(long)]
        in_description: bool,
    },

    /// Check the vault for broken references and cycles
    Doctor {
        /// Repair dangling and duplicate references
        #[arg(long)]
        fix: bool,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Idea subcommands
#[derive(Subcommand, Debug)]
pub enum IdeaCommands {
    /// Create a new idea
    Create {
        /// Idea title
        title: String,

        /// Stage (Idea, Validating, Building, Launched, or any custom stage)
        #[arg(short, long)]
        stage: Option<String>,

        /// Priority (low, medium, high)
        #[arg(short, long)]
        priority: Option<String>,

        /// Collection ID
        #[arg(short, long)]
        collection: Option<String>,

        /// Idea description
        #[arg(short, long)]
        description: Option<String>,

        /// Parent idea ID (repeatable)
        #[arg(long)]
        parent: Vec<String>,
    },

    /// Update an idea
    Update {
        /// Idea ID
        id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New stage
        #[arg(long)]
        stage: Option<String>,

        /// New priority (low, medium, high)
        #[arg(long)]
        priority: Option<String>,

        /// Move to this collection
        #[arg(long, conflicts_with = "unassign")]
        collection: Option<String>,

        /// Remove the idea from its collection
        #[arg(long)]
        unassign: bool,

        /// New description
        #[arg(long)]
        description: Option<String>,

        /// Replace the parent set with these IDs (repeatable)
        #[arg(long, conflicts_with = "clear_parents")]
        parent: Vec<String>,

        /// Remove every parent
        #[arg(long)]
        clear_parents: bool,
    },

    /// Show idea details, including parents and children
    Show {
        /// Idea ID
        id: String,
    },

    /// Delete an idea (children are detached, not deleted)
    Delete {
        /// Idea ID
        id: String,
    },

    /// List ideas, newest first
    List {
        /// Filter by collection: all, unassigned or a collection ID
        #[arg(long, default_value = "all")]
        collection: String,

        /// Case-insensitive title search
        #[arg(long)]
        search: Option<String>,

        /// Also search descriptions
        #[arg(long)]
        in_description: bool,
    },

    /// List ideas that can be linked as parents
    Candidates {
        /// Idea being edited (omit for a new idea)
        id: Option<String>,

        /// Case-insensitive title search
        #[arg(long)]
        search: Option<String>,
    },

    /// List ideas without parents
    Roots,

    /// List every idea below an idea
    Descendants {
        /// Idea ID
        id: String,
    },

    /// List every idea above an idea
    Ancestors {
        /// Idea ID
        id: String,
    },
}

/// Collection subcommands
#[derive(Subcommand, Debug)]
pub enum CollectionCommands {
    /// Create a new collection
    Create {
        /// Collection name
        name: String,
    },

    /// Rename a collection
    Rename {
        /// Collection ID
        id: String,

        /// New name
        name: String,
    },

    /// Delete a collection (its ideas become unassigned)
    Delete {
        /// Collection ID
        id: String,
    },

    /// List collections with idea counts
    List,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show resolved configuration and where each value came from
    Show,
}
