use std::{fs, path::PathBuf};

use serde::{Deserialize, Serialize};

pub const APP_NAME: &str = "signoff";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const SNAPSHOT_FILE_NAME: &str = "snapshot.json";
pub const LOGS_DIR_NAME: &str = "logs";

const EMPTY_SNAPSHOT: &str = "{\"session\": {}, \"collections\": []}\n";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Port for the HTML console
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,
    /// Maximum number of queued workflow actions
    #[serde(default = "default_max_queue_size")]
    pub max_queue_size: usize,
    /// Delay before the effect worker applies an action, in milliseconds
    #[serde(default)]
    pub effect_delay_ms: u64,
    /// Hide every workflow action
    #[serde(default)]
    pub read_only: bool,
    /// Also write daily rotated logs under the console directory
    #[serde(default)]
    pub log_to_file: bool,
}

fn default_listen_port() -> u16 {
    8080
}

fn default_max_queue_size() -> usize {
    64
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            listen_port: default_listen_port(),
            max_queue_size: default_max_queue_size(),
            effect_delay_ms: 0,
            read_only: false,
            log_to_file: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConsoleState {
    /// Path to the console directory (~/.signoff)
    pub console_dir: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Path to the snapshot file
    pub snapshot_path: PathBuf,
    /// Path to the logs directory
    pub logs_path: PathBuf,
    /// Loaded configuration
    pub config: ConsoleConfig,
}

impl ConsoleState {
    /// Get the console directory path (custom or default ~/.signoff)
    pub fn console_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Initialize a new console directory
    pub fn init(
        custom_path: Option<PathBuf>,
        config: Option<ConsoleConfig>,
    ) -> Result<Self, StateError> {
        let console_dir = Self::console_dir(custom_path)?;

        if console_dir.exists() {
            return Err(StateError::AlreadyInitialized);
        }

        fs::create_dir_all(&console_dir)?;

        let logs_path = console_dir.join(LOGS_DIR_NAME);
        fs::create_dir_all(&logs_path)?;

        let config = config.unwrap_or_default();
        let config_path = console_dir.join(CONFIG_FILE_NAME);
        fs::write(&config_path, toml::to_string_pretty(&config)?)?;

        let snapshot_path = console_dir.join(SNAPSHOT_FILE_NAME);
        fs::write(&snapshot_path, EMPTY_SNAPSHOT)?;

        Ok(Self {
            console_dir,
            config_path,
            snapshot_path,
            logs_path,
            config,
        })
    }

    /// Load existing state from the console directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let console_dir = Self::console_dir(custom_path)?;

        if !console_dir.exists() {
            return Err(StateError::NotInitialized);
        }

        let config_path = console_dir.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            return Err(StateError::MissingFile(CONFIG_FILE_NAME.to_string()));
        }

        let config_toml = fs::read_to_string(&config_path)?;
        let config: ConsoleConfig = toml::from_str(&config_toml)?;

        Ok(Self {
            snapshot_path: console_dir.join(SNAPSHOT_FILE_NAME),
            logs_path: console_dir.join(LOGS_DIR_NAME),
            console_dir,
            config_path,
            config,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("console directory not initialized. Run 'signoff-console init' first")]
    NotInitialized,

    #[error("console directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("missing required file: {0}")]
    MissingFile(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}
