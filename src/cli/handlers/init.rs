use std::fs;
use std::path::Path;

use crate::cli::commands::InitArgs;
use crate::io::config_io::{self, CONFIG_FILE_NAME};
use crate::model::config::DEFAULT_STORAGE_PATH;

/// Validate a storage path given to `init`.
fn validate_storage_path(path: &str) -> Result<(), String> {
    if path.trim().is_empty() {
        return Err("storage path cannot be empty".to_string());
    }
    if path.ends_with('/') || path.ends_with('\\') {
        return Err(format!(
            "storage path \"{}\" names a directory, give a file (e.g. \"{}tasks.txt\")",
            path, path
        ));
    }
    Ok(())
}

pub fn cmd_init(args: InitArgs) -> Result<(), Box<dyn std::error::Error>> {
    let cwd = std::env::current_dir()?;
    let config_path = cwd.join(CONFIG_FILE_NAME);

    if config_path.exists() && !args.force {
        return Err(format!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        )
        .into());
    }

    // A config further up would otherwise have applied here
    if let Some(parent) = cwd.parent()
        && let Some(parent_config) = config_io::discover_config(parent)
    {
        eprintln!("Note: parent config found at {}", parent_config.display());
        eprintln!("Creating new config in ./{}", CONFIG_FILE_NAME);
    }

    let storage = args
        .storage_path
        .unwrap_or_else(|| DEFAULT_STORAGE_PATH.to_string());
    validate_storage_path(&storage)?;

    fs::write(&config_path, config_io::default_config_text(&storage))?;

    let resolved = if Path::new(&storage).is_absolute() {
        Path::new(&storage).to_path_buf()
    } else {
        cwd.join(&storage)
    };
    println!("Initialized todo list: tasks stored in {}", resolved.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_storage_path_valid() {
        assert!(validate_storage_path("tasks.txt").is_ok());
        assert!(validate_storage_path("data/tasks.txt").is_ok());
        assert!(validate_storage_path("/var/lib/todo/tasks.txt").is_ok());
    }

    #[test]
    fn test_validate_storage_path_invalid() {
        assert!(validate_storage_path("").is_err());
        assert!(validate_storage_path("   ").is_err());
        assert!(validate_storage_path("data/").is_err());
    }
}
