use std::path::PathBuf;

use clap::{Parser, Subcommand};
use weekplan::{Category, Day, TodoId};

#[derive(Debug, Parser)]
#[command(name = "weekplan")]
#[command(about = "Plan your week across goal, focus, work, leisure and basics")]
pub struct Cli {
    /// Weeks relative to the current one, e.g. -1 for last week
    #[arg(long, global = true, default_value_t = 0, allow_negative_numbers = true)]
    pub offset: i32,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the week grid with daily load
    Week,
    /// List backlog tasks and habit templates
    Pool,
    /// Add a task to the pool
    Add {
        text: String,
        /// Minutes
        #[arg(long)]
        duration: Option<String>,
        /// Store as a recurring habit template
        #[arg(long)]
        habit: bool,
    },
    /// Add a task straight into a day slot
    QuickAdd {
        day: Day,
        category: Category,
        text: String,
        /// Minutes
        #[arg(long)]
        duration: Option<String>,
    },
    /// Move a pool task into a day slot
    Schedule {
        id: TodoId,
        day: Day,
        category: Category,
    },
    /// Move a scheduled task to another slot
    Move {
        from_day: Day,
        from_category: Category,
        id: TodoId,
        day: Day,
        category: Category,
    },
    /// Take a scheduled task off the grid
    Unschedule {
        day: Day,
        category: Category,
        id: TodoId,
    },
    /// Mark a scheduled task done, or not done
    Toggle {
        day: Day,
        category: Category,
        id: TodoId,
    },
    /// Change a task's text or duration
    Edit {
        id: TodoId,
        #[arg(long)]
        text: Option<String>,
        /// Minutes
        #[arg(long)]
        duration: Option<String>,
    },
    /// Write a JSON backup of all weeks and the pool
    Export {
        /// Target file, defaults to weekplan-backup-<date>.json
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Replace all data with a JSON backup
    Import { file: PathBuf },
    /// Print config path and create default file if missing
    ConfigPath,
}
