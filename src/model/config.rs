use serde::{Deserialize, Serialize};

/// Default task file, relative to the config directory
pub const DEFAULT_STORAGE_PATH: &str = "tasks.txt";

/// Configuration from todo.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Location of the task file. Relative paths resolve against the
    /// directory holding todo.toml.
    #[serde(default = "default_storage_path")]
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            path: default_storage_path(),
        }
    }
}

fn default_storage_path() -> String {
    DEFAULT_STORAGE_PATH.to_string()
}
