use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{DEFAULT_API_URL, DEFAULT_LOG_LEVEL, DEFAULT_TIMEOUT_SECS};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Base URL of the task collection
    #[arg(long, env = "TASKBOARD_API_URL", default_value = DEFAULT_API_URL, global = true)]
    pub api_url: String,

    /// Request timeout in seconds
    #[arg(long, env = "TASKBOARD_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS, global = true)]
    pub timeout_secs: u64,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, env = "TASKBOARD_LOG", default_value = DEFAULT_LOG_LEVEL, global = true)]
    pub log_level: String,

    /// Directory for log files [default: ~/.taskboard/logs]
    #[arg(long, env = "TASKBOARD_LOG_DIR", global = true)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List tasks in position order
    List {
        /// Group tasks into To Do / In Progress / Completed columns
        #[arg(short, long)]
        board: bool,
    },
    /// Create a new task
    Add {
        #[arg(value_name = "NAME")]
        name: String,
    },
    /// Rename a task
    Rename {
        /// Task id or name
        #[arg(value_name = "TASK")]
        task: String,
        #[arg(value_name = "NAME")]
        name: String,
    },
    /// Flip a task between done and not done
    Toggle {
        /// Task id or name
        #[arg(value_name = "TASK")]
        task: String,
    },
    /// Delete a task
    Delete {
        /// Task id or name
        #[arg(value_name = "TASK")]
        task: String,
    },
    /// Move a task to a new index, optionally into another board column
    Move {
        /// Task id or name
        #[arg(value_name = "TASK")]
        task: String,
        /// Destination index (global for the list, within the column for the board)
        #[arg(long = "to", value_name = "INDEX")]
        to: usize,
        /// Destination column: to-do, in-progress or completed
        #[arg(short, long, value_name = "COLUMN")]
        column: Option<String>,
    },
    /// Launch TUI interface
    Tui,
    /// Generate shell completions
    Completions {
        #[arg(value_name = "SHELL")]
        shell: String,
    },
}
