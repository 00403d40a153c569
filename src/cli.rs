//! CLI argument parsing for Tally.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tally::{Filter, Priority};

#[derive(Parser)]
#[command(
    name = "tally",
    about = "A personal todo list backed by a local daemon",
    version,
    after_help = "Logs are written to: ~/.local/share/tally/logs/tally.log"
)]
pub struct Cli {
    /// Directory holding the daemon state (default: current directory)
    #[arg(short = 'd', long, global = true)]
    pub dir: Option<PathBuf>,

    /// Config file (default: ~/.config/tally/config.yaml)
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show todos
    List {
        /// Which todos to show (all, active, done)
        #[arg(short, long, default_value = "all")]
        filter: Filter,
    },

    /// Add a todo
    Add {
        /// Todo text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,

        /// Priority (low, medium, high)
        #[arg(short, long)]
        priority: Option<Priority>,
    },

    /// Mark a todo done, or not done again
    Toggle {
        /// Todo ID
        id: i64,
    },

    /// Delete a todo
    Delete {
        /// Todo ID
        id: i64,
    },

    /// Delete every completed todo
    Clear,

    /// Export todos to a JSON file
    Export,

    /// Run the daemon in foreground
    Daemon {
        /// Directory exports are written to (default: ~/todo-exports)
        #[arg(long)]
        export_dir: Option<PathBuf>,
    },

    /// Stop the running daemon
    DaemonStop,

    /// Check daemon status
    DaemonStatus,
}
