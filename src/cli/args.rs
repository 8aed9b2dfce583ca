//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

use crate::application::ReportFormat;

/// Composite node tree: render it, emit events through it, and run its collaborators
#[derive(Parser, Debug)]
#[command(name = "domtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output: -d info, -dd debug, -ddd trace
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file (default: $XDG_CONFIG_HOME/domtree/domtree.toml)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the tree, one line per node
    Render {
        /// Tree document (default: ./tree.toml)
        #[arg(value_hint = ValueHint::FilePath)]
        document: Option<PathBuf>,
        /// Indentation marker, overrides render.marker
        #[arg(short, long)]
        marker: Option<char>,
    },

    /// Show the tree with node attributes
    Tree {
        /// Tree document (default: ./tree.toml)
        #[arg(value_hint = ValueHint::FilePath)]
        document: Option<PathBuf>,
    },

    /// Emit an event on the root and list listener calls
    Emit {
        /// Event name, e.g. click
        event: String,
        /// Tree document (default: ./tree.toml)
        #[arg(value_hint = ValueHint::FilePath)]
        document: Option<PathBuf>,
    },

    /// Build a storage-engine session and connect
    Session {
        /// Session config (TOML)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Export a report
    Report {
        /// Report config (TOML)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Output file (default: <report.output_dir>/report.<ext>)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
        /// Output format, overrides report.format
        #[arg(short, long, value_enum)]
        format: Option<ReportFormat>,
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
    /// Show global config file path
    Path,
}
