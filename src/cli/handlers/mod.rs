mod init;
pub use init::cmd_init;

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io::{self, ConfigError};
use crate::io::{recovery, task_io};
use crate::model::config::{Config, DEFAULT_STORAGE_PATH};
use crate::model::task::{Priority, TaskDraft, TaskRef};
use crate::ops::task_ops::{TaskError, TaskStore};
use crate::parse::format_deadline;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Default number of entries shown by `recovery`
const RECOVERY_LIMIT: usize = 10;

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Where this invocation reads its config from and keeps its tasks.
pub struct Context {
    /// The todo.toml in effect, if any
    pub config_path: Option<PathBuf>,
    pub config: Config,
    /// Resolved task file location
    pub storage_path: PathBuf,
}

impl Context {
    /// Resolve config and storage from the global flags and the working
    /// directory. `--storage` wins over `storage.path`, which wins over
    /// `tasks.txt` in the working directory.
    pub fn resolve(config_flag: Option<&str>, storage_flag: Option<&str>) -> Result<Context, ConfigError> {
        let cwd = std::env::current_dir().map_err(|e| ConfigError::ReadError {
            path: PathBuf::from("."),
            source: e,
        })?;

        let config_path = match config_flag {
            Some(p) => Some(cwd.join(p)),
            None => config_io::discover_config(&cwd),
        };

        let (config, configured_storage) = match &config_path {
            Some(path) => {
                let (config, _) = config_io::read_config(path)?;
                let storage = config_io::resolve_storage_path(&config, path);
                (config, storage)
            }
            None => (Config::default(), cwd.join(DEFAULT_STORAGE_PATH)),
        };

        let storage_path = match storage_flag {
            Some(p) => cwd.join(p),
            None => configured_storage,
        };

        tracing::debug!(
            config = ?config_path,
            storage = %storage_path.display(),
            "resolved context"
        );

        Ok(Context {
            config_path,
            config,
            storage_path,
        })
    }

    fn recovery_dir(&self) -> &Path {
        recovery::parent_dir(&self.storage_path)
    }

    fn load_store(&self) -> Result<TaskStore, task_io::StorageError> {
        task_io::load_tasks(&self.storage_path).map(TaskStore::from_tasks)
    }

    fn save_store(&self, store: &TaskStore) -> Result<(), task_io::StorageError> {
        task_io::save_tasks(&self.storage_path, store.tasks())
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;

    match cli.command {
        // Init runs before any config exists
        Commands::Init(args) => cmd_init(args),
        command => {
            let ctx = Context::resolve(cli.config.as_deref(), cli.storage.as_deref())?;
            run(&ctx, command, json)
        }
    }
}

fn run(ctx: &Context, command: Commands, json: bool) -> CmdResult {
    match command {
        Commands::Init(args) => cmd_init(args),

        // Read commands
        Commands::List => cmd_list(ctx, json),
        Commands::Stats => cmd_stats(ctx, json),

        // Write commands
        Commands::Add(args) => cmd_add(ctx, args),
        Commands::Edit(args) => cmd_edit(ctx, args),
        Commands::Remove(args) => cmd_remove(ctx, args),
        Commands::Done(args) => cmd_done(ctx, args),
        Commands::Sort(args) => cmd_sort(ctx, args, json),

        // Maintenance
        Commands::Config(args) => cmd_config(ctx, args, json),
        Commands::Recovery(args) => cmd_recovery(ctx, args, json),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_priority(text: &str) -> Result<Priority, Box<dyn std::error::Error>> {
    Ok(text.parse::<Priority>()?)
}

/// Print the list the way `list` does
fn print_task_list(store: &TaskStore, json: bool) -> CmdResult {
    if json {
        println!("{}", serde_json::to_string_pretty(&tasks_to_json(store.tasks()))?);
        return Ok(());
    }

    if store.is_empty() {
        println!("No tasks.");
    } else {
        let color = use_color();
        for (line, task) in format_task_list(store.tasks()).iter().zip(store.tasks()) {
            if color {
                println!("{}", style_task_line(line, task));
            } else {
                println!("{}", line);
            }
        }
        println!();
    }
    println!("{}", store.summary());
    Ok(())
}

/// The instant `days` days ago, if it is representable
fn prune_cutoff(days: u32) -> Result<chrono::DateTime<chrono::Utc>, String> {
    chrono::Duration::try_days(i64::from(days))
        .and_then(|age| chrono::Utc::now().checked_sub_signed(age))
        .ok_or_else(|| format!("--days {} reaches past the earliest supported date", days))
}

/// Ask on stderr and read a y/n answer from stdin
fn confirm(prompt: &str) -> Result<bool, std::io::Error> {
    eprint!("{} [y/n] ", prompt);
    std::io::stderr().flush()?;
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(ctx: &Context, json: bool) -> CmdResult {
    let store = ctx.load_store()?;
    print_task_list(&store, json)
}

fn cmd_stats(ctx: &Context, json: bool) -> CmdResult {
    let store = ctx.load_store()?;
    let summary = store.summary();
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&stats_to_json(summary, store.tasks()))?
        );
    } else {
        for line in format_stats(summary, store.tasks()) {
            println!("{}", line);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_add(ctx: &Context, args: AddArgs) -> CmdResult {
    let priority = parse_priority(&args.priority)?;
    let mut store = ctx.load_store()?;

    let task = store.add(TaskDraft::new(args.name, priority, args.deadline))?;

    ctx.save_store(&store)?;
    println!("Added: {}", format_task_line(&task));
    Ok(())
}

fn cmd_edit(ctx: &Context, args: EditArgs) -> CmdResult {
    let task_ref = TaskRef::from_user_input(&args.task);
    let mut store = ctx.load_store()?;

    // Omitted fields keep their current values
    let current = store
        .get(&task_ref)
        .ok_or_else(|| TaskError::NotFound(task_ref.to_string()))?
        .clone();
    let priority = match args.priority {
        Some(ref p) => parse_priority(p)?,
        None => current.priority,
    };
    let draft = TaskDraft::new(
        args.name.unwrap_or(current.name),
        priority,
        args.deadline.unwrap_or_else(|| format_deadline(current.deadline)),
    );
    let new_name = draft.name.trim().to_string();

    store.edit(&task_ref, draft)?;

    ctx.save_store(&store)?;
    println!("Updated: {}", new_name);
    Ok(())
}

fn cmd_remove(ctx: &Context, args: RemoveArgs) -> CmdResult {
    let task_ref = TaskRef::from_user_input(&args.task);
    let mut store = ctx.load_store()?;

    let name = store
        .get(&task_ref)
        .map(|t| t.name.clone())
        .ok_or_else(|| TaskError::NotFound(task_ref.to_string()))?;

    if !args.yes && !confirm(&format!("Are you sure you want to delete '{}'?", name))? {
        println!("cancelled");
        return Ok(());
    }

    let removed = store.remove(&task_ref)?;

    ctx.save_store(&store)?;
    println!("Removed: {}", removed.name);
    Ok(())
}

fn cmd_done(ctx: &Context, args: DoneArgs) -> CmdResult {
    let task_ref = TaskRef::from_user_input(&args.task);
    let mut store = ctx.load_store()?;

    store.mark_complete(&task_ref)?;

    ctx.save_store(&store)?;
    if let Some(task) = store.tasks().last() {
        println!("Completed: {}", task.name);
    }
    Ok(())
}

fn cmd_sort(ctx: &Context, args: SortArgs, json: bool) -> CmdResult {
    let mut store = ctx.load_store()?;

    match args.by {
        SortKey::Deadline => store.sort_by_deadline(),
        SortKey::Priority => store.sort_by_priority(),
    }

    ctx.save_store(&store)?;
    print_task_list(&store, json)
}

// ---------------------------------------------------------------------------
// Maintenance
// ---------------------------------------------------------------------------

fn cmd_config(ctx: &Context, args: ConfigCmd, json: bool) -> CmdResult {
    match args.action {
        None => {
            if json {
                let value = serde_json::json!({
                    "config": ctx.config_path.as_ref().map(|p| p.display().to_string()),
                    "storage": {
                        "path": ctx.config.storage.path,
                        "resolved": ctx.storage_path.display().to_string(),
                    },
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                match &ctx.config_path {
                    Some(path) => println!("config: {}", path.display()),
                    None => println!("config: (none, using defaults)"),
                }
                println!("storage.path: {}", ctx.storage_path.display());
            }
            Ok(())
        }
        Some(ConfigAction::StoragePath(sp)) => match sp.path {
            None => {
                println!("{}", ctx.storage_path.display());
                Ok(())
            }
            Some(new_path) => {
                if new_path.trim().is_empty() {
                    return Err("storage path cannot be empty".into());
                }
                let config_path = ctx
                    .config_path
                    .as_ref()
                    .ok_or("no todo.toml found (run `todo init` first)")?;
                let (_, mut doc) = config_io::read_config(config_path)?;
                config_io::set_storage_path(&mut doc, &new_path);
                config_io::write_config(config_path, &doc)?;
                println!("storage.path = {}", new_path);
                Ok(())
            }
        },
    }
}

fn cmd_recovery(ctx: &Context, args: RecoveryCmd, json: bool) -> CmdResult {
    let dir = ctx.recovery_dir();

    match args.action {
        Some(RecoveryAction::Path) => {
            println!("{}", recovery::recovery_log_path(dir).display());
            Ok(())
        }
        Some(RecoveryAction::Prune(prune)) => {
            let before = if prune.all {
                None
            } else {
                let days = prune.days.unwrap_or(recovery::PRUNE_AGE_DAYS);
                Some(prune_cutoff(days)?)
            };
            let removed = recovery::prune_recovery(dir, before, prune.all)?;
            println!("pruned {} entries", removed);
            Ok(())
        }
        None => {
            let limit = args.limit.unwrap_or(RECOVERY_LIMIT);
            let entries = recovery::read_recovery_entries(dir, Some(limit));
            if json {
                let values: Vec<serde_json::Value> = entries.iter().map(|e| e.to_json()).collect();
                println!("{}", serde_json::to_string_pretty(&values)?);
            } else if entries.is_empty() {
                println!("No recovery entries.");
            } else {
                for entry in &entries {
                    print!("{}", entry.to_markdown());
                }
            }
            Ok(())
        }
    }
}
