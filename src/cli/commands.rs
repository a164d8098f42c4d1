use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "todo", about = concat!("[ ] todo v", env!("CARGO_PKG_VERSION"), " - deadlines and priorities in a plain text file"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use this config file instead of searching for todo.toml
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Use this task file instead of the configured one
    #[arg(long, global = true)]
    pub storage: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a todo.toml in the current directory
    Init(InitArgs),
    /// List tasks in their current order
    #[command(visible_alias = "ls")]
    List,
    /// Add a task
    Add(AddArgs),
    /// Change a task's name, priority or deadline
    Edit(EditArgs),
    /// Delete a task
    #[command(visible_alias = "rm")]
    Remove(RemoveArgs),
    /// Mark a task done and move it to the end of the list
    Done(DoneArgs),
    /// Reorder the list by deadline or priority
    Sort(SortArgs),
    /// Show task counts
    Stats,
    /// Show or change configuration
    Config(ConfigCmd),
    /// View or manage the recovery log
    Recovery(RecoveryCmd),
}

#[derive(Args)]
pub struct InitArgs {
    /// Task file location written to todo.toml (default: tasks.txt)
    #[arg(long = "storage-path")]
    pub storage_path: Option<String>,
    /// Overwrite an existing todo.toml
    #[arg(long)]
    pub force: bool,
}

// ---------------------------------------------------------------------------
// Task commands
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AddArgs {
    /// Task name
    pub name: String,
    /// Priority: high, medium or low
    #[arg(short, long, default_value = "high")]
    pub priority: String,
    /// Deadline as dd-MM-yyyy
    #[arg(short, long)]
    pub deadline: String,
}

#[derive(Args)]
pub struct EditArgs {
    /// Task number (as shown by `list`) or name
    pub task: String,
    /// New name
    #[arg(short, long)]
    pub name: Option<String>,
    /// New priority
    #[arg(short, long)]
    pub priority: Option<String>,
    /// New deadline as dd-MM-yyyy
    #[arg(short, long)]
    pub deadline: Option<String>,
}

#[derive(Args)]
pub struct RemoveArgs {
    /// Task number (as shown by `list`) or name
    pub task: String,
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Args)]
pub struct DoneArgs {
    /// Task number (as shown by `list`) or name
    pub task: String,
}

#[derive(Args)]
pub struct SortArgs {
    /// Sort key
    #[arg(value_enum)]
    pub by: SortKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortKey {
    Deadline,
    Priority,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ConfigCmd {
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the task file location, or set it in todo.toml
    StoragePath(StoragePathArgs),
}

#[derive(Args)]
pub struct StoragePathArgs {
    /// New location (omit to print the current one)
    pub path: Option<String>,
}

// ---------------------------------------------------------------------------
// Recovery log
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct RecoveryCmd {
    #[command(subcommand)]
    pub action: Option<RecoveryAction>,
    /// Maximum number of entries to show (default: 10)
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Subcommand)]
pub enum RecoveryAction {
    /// Remove old entries
    Prune(RecoveryPruneArgs),
    /// Print the path to the recovery log
    Path,
}

#[derive(Args)]
pub struct RecoveryPruneArgs {
    /// Remove entries older than this many days (default: 30)
    #[arg(long)]
    pub days: Option<u32>,
    /// Remove all entries
    #[arg(long)]
    pub all: bool,
}
