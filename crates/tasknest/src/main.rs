//! CLI entry point for tasknest.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tasknest_app::{AppConfig, TaskService};
use tasknest_store_fs::FsStore;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

mod commands;
mod view;

/// Nested personal task list in your terminal.
#[derive(Parser, Debug)]
#[command(
    name = "tasknest",
    version,
    about = "tasknest: nested tasks with cascading completion and fuzzy search"
)]
struct Cli {
    /// Path to the record file (defaults to the user data dir).
    #[arg(long)]
    data: Option<PathBuf>,

    /// Path to the config directory (defaults to the user config dir).
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a task; phrases like "tomorrow" become the due date.
    Add {
        /// Task text.
        text: String,
        /// Parent task id to nest under.
        #[arg(short = 'p', long)]
        parent: Option<u64>,
    },

    /// Overwrite a task's text. Empty text deletes the task.
    Edit {
        /// Task id.
        id: u64,
        /// Replacement text.
        text: String,
    },

    /// Toggle completion (cascades to subtasks and parents).
    Done {
        /// Task id.
        id: u64,
    },

    /// Delete a task and its subtasks.
    Rm {
        /// Task id.
        id: u64,
    },

    /// Nest a task under the task above it.
    Indent {
        /// Task id.
        id: u64,
    },

    /// Lift a task one level.
    Outdent {
        /// Task id.
        id: u64,
    },

    /// Move a task between positions (0-based).
    Move {
        /// Current position.
        from: usize,
        /// Target position.
        to: usize,
    },

    /// List tasks.
    Ls {
        /// Filter: all, active, or completed.
        #[arg(long, default_value = "all")]
        filter: String,
    },

    /// Search tasks by substring or in-order fuzzy match.
    Find {
        /// Search query.
        query: String,
    },

    /// Show aggregate counters.
    Stats,

    /// Remove every completed task.
    ClearDone,

    /// Remove everything and reset ids.
    ClearAll,

    /// Print the collection as a portable snapshot.
    Export,

    /// Replace the collection from a snapshot file.
    Import {
        /// Snapshot file path.
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    install_tracing();
    execute_command(cli)
}

fn execute_command(cli: Cli) -> Result<()> {
    let Cli { data, config, cmd } = cli;
    let config_dir = config
        .or_else(default_config_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    let config = AppConfig::load(config_dir)?;
    let data_path = data.unwrap_or_else(|| config.data_path(default_data_path()));

    let store = FsStore::new(data_path);
    let mut service = TaskService::new(store, config.input.date_extraction);
    service.load();
    commands::run(cmd, &mut service)
}

fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tasknest"))
}

fn default_data_path() -> PathBuf {
    dirs::data_dir().map_or_else(
        || PathBuf::from("tasknest.json"),
        |dir| dir.join("tasknest").join("tasks.json"),
    )
}

fn install_tracing() {
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .compact()
        .try_init();
}
