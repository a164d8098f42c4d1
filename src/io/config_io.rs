use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::Config;

/// Name of the configuration file
pub const CONFIG_FILE_NAME: &str = "todo.toml";

/// Error type for configuration I/O
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("could not edit {path}: {source}")]
    EditError {
        path: PathBuf,
        source: toml_edit::TomlError,
    },
}

/// Walk up from `start` looking for a `todo.toml`.
pub fn discover_config(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Read the config file, returning both the parsed config and the raw
/// toml_edit document for round-trip-safe editing.
pub fn read_config(config_path: &Path) -> Result<(Config, toml_edit::DocumentMut), ConfigError> {
    let config_text = fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
        path: config_path.to_path_buf(),
        source: e,
    })?;
    let config: Config = toml::from_str(&config_text).map_err(|e| ConfigError::ParseError {
        path: config_path.to_path_buf(),
        source: e,
    })?;
    let doc: toml_edit::DocumentMut = config_text.parse().map_err(|e| ConfigError::EditError {
        path: config_path.to_path_buf(),
        source: e,
    })?;
    Ok((config, doc))
}

/// Write the config document back to disk, preserving formatting.
pub fn write_config(config_path: &Path, doc: &toml_edit::DocumentMut) -> Result<(), ConfigError> {
    fs::write(config_path, doc.to_string()).map_err(|e| ConfigError::WriteError {
        path: config_path.to_path_buf(),
        source: e,
    })
}

/// Update the storage path in the config document
pub fn set_storage_path(doc: &mut toml_edit::DocumentMut, path: &str) {
    if !doc.contains_key("storage") {
        doc["storage"] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    doc["storage"]["path"] = toml_edit::value(path);
}

/// Contents of a fresh `todo.toml`
pub fn default_config_text(storage_path: &str) -> String {
    let mut doc = toml_edit::DocumentMut::new();
    set_storage_path(&mut doc, storage_path);
    format!(
        "# todo configuration\n# storage.path is relative to this file unless absolute.\n\n{}",
        doc
    )
}

/// Resolve the configured storage path against the config file's directory.
pub fn resolve_storage_path(config: &Config, config_path: &Path) -> PathBuf {
    let configured = Path::new(&config.storage.path);
    if configured.is_absolute() {
        return configured.to_path_buf();
    }
    match config_path.parent() {
        Some(dir) => dir.join(configured),
        None => configured.to_path_buf(),
    }
}
