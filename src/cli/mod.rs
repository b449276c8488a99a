//! CLI argument definitions for PopDocs.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::layout::Orientation;

/// PopDocs - explore a documentation tree as an expandable diagram.
///
/// Start with `pd visible` to see the top level, then `pd layout --expand <ID>`
/// to open containers.
#[derive(Parser, Debug)]
#[command(name = "pd")]
#[command(author, version, about = "Index a documentation tree and lay it out as an expandable diagram", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Log debug events to stderr (PD_LOG takes precedence)
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Documentation tree: a directory to scan, or a JSON file holding an
    /// index snapshot or a raw nested hierarchy
    #[arg(short = 's', long, global = true, env = "PD_SOURCE", default_value = "docs")]
    pub source: PathBuf,

    /// Leaf extension that counts as a document (repeatable, overrides config)
    #[arg(long = "doc-ext", global = true, value_name = "EXT")]
    pub doc_ext: Vec<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Expand history replayed before a command runs
#[derive(Args, Debug, Clone, Default)]
pub struct NavArgs {
    /// Expand a container (repeatable, applied in order)
    #[arg(short = 'e', long = "expand", value_name = "ID")]
    pub expand: Vec<String>,

    /// Collapse the most recent expansion this many times afterwards
    #[arg(short = 'b', long, default_value_t = 0)]
    pub back: usize,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the index and write its snapshot (stdout unless -o is given)
    Index {
        /// Write the snapshot JSON to this file
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Show the currently visible entries and edges
    Visible {
        #[command(flatten)]
        nav: NavArgs,
    },

    /// Compute the diagram layout for the visible entries
    Layout {
        #[command(flatten)]
        nav: NavArgs,

        /// Layout direction (horizontal|h or vertical|v)
        #[arg(long)]
        orientation: Option<Orientation>,

        /// Gap between neighbouring nodes of one rank
        #[arg(long)]
        node_spacing: Option<f64>,

        /// Distance between consecutive ranks
        #[arg(long)]
        rank_spacing: Option<f64>,
    },

    /// Activate an entry as if it were clicked
    ///
    /// Containers are expanded and their first document selected.
    Open {
        /// Entry ID (e.g., docs/guide/ or docs/guide/intro.md)
        id: String,

        #[command(flatten)]
        nav: NavArgs,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the resolved configuration and where each value came from
    Show,

    /// Show the config file locations
    Path,
}
