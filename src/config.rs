//! Engine configuration.
//!
//! Loaded from a TOML file with one section per component:
//!
//! ```toml
//! log_level = "info"
//!
//! [board]
//! width = 15
//! height = 15
//! win_length = 5
//!
//! [mcts]
//! c_puct = 5.0
//! duration_ms = 950
//!
//! [minimax]
//! max_depth = 3
//! max_candidates = 12
//! pruning = true
//! ```
//!
//! Every field is optional and falls back to its default.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::board::{BoardConfig, MAX_BOARD_SIZE};
use crate::search::{MctsConfig, MinimaxConfig};

/// Environment variable naming a config file
pub const CONFIG_ENV_VAR: &str = "GOMOKU_CONFIG";

/// Config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "gomoku.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub board: BoardConfig,
    pub mcts: MctsConfig,
    pub minimax: MinimaxConfig,
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            board: BoardConfig::default(),
            mcts: MctsConfig::default(),
            minimax: MinimaxConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let b = &self.board;
        if b.win_length < 2 {
            return Err(ConfigError::Invalid(format!(
                "win_length must be at least 2, got {}",
                b.win_length
            )));
        }
        if b.width < b.win_length || b.height < b.win_length {
            return Err(ConfigError::Invalid(format!(
                "board {}x{} cannot hold a line of {}",
                b.width, b.height, b.win_length
            )));
        }
        if b.width > MAX_BOARD_SIZE || b.height > MAX_BOARD_SIZE {
            return Err(ConfigError::Invalid(format!(
                "board {}x{} exceeds {MAX_BOARD_SIZE}x{MAX_BOARD_SIZE}",
                b.width, b.height
            )));
        }
        if self.minimax.max_depth == 0 {
            return Err(ConfigError::Invalid("minimax.max_depth must be at least 1".into()));
        }
        if !(self.mcts.c_puct > 0.0 && self.mcts.c_puct.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "mcts.c_puct must be positive, got {}",
                self.mcts.c_puct
            )));
        }
        Ok(())
    }
}

/// Load the engine configuration.
///
/// Lookup order:
/// 1. `path`, when given (must exist)
/// 2. The file named by `GOMOKU_CONFIG`
/// 3. `gomoku.toml` in the working directory
/// 4. Built-in defaults
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig, ConfigError> {
    if let Some(path) = path {
        info!("Loading config from {}", path.display());
        return EngineConfig::from_path(path);
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
        let env_path = PathBuf::from(env_path);
        if env_path.exists() {
            info!("Loading config from {CONFIG_ENV_VAR}: {}", env_path.display());
            return EngineConfig::from_path(&env_path);
        }
        warn!(
            "{CONFIG_ENV_VAR}={} not found, searching defaults",
            env_path.display()
        );
    }

    let local = Path::new(DEFAULT_CONFIG_FILE);
    if local.exists() {
        info!("Loading config from {}", local.display());
        return EngineConfig::from_path(local);
    }

    debug!("No {DEFAULT_CONFIG_FILE} found, using built-in defaults");
    let config = EngineConfig::default();
    config.validate()?;
    Ok(config)
}
