use std::path::Path;

use crate::error::ConfigError;
use crate::game::Board;

/// Board dimensions.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub width: usize,
    pub height: usize,
}

impl Default for BoardConfig {
    fn default() -> Self {
        BoardConfig {
            width: 7,
            height: 6,
        }
    }
}

/// Who plays, and who opens.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PlayersConfig {
    pub count: usize,
    /// Index of the opening player in turn order
    pub first: usize,
}

impl Default for PlayersConfig {
    fn default() -> Self {
        PlayersConfig { count: 2, first: 0 }
    }
}

/// Log output settings. `RUST_LOG` overrides `level` when set.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub board: BoardConfig,
    pub players: PlayersConfig,
    pub log: LogConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.board.width == 0 {
            return Err(ConfigError::Validation("board.width must be > 0".into()));
        }
        if self.board.height == 0 {
            return Err(ConfigError::Validation("board.height must be > 0".into()));
        }
        let cells = self.board.width.checked_mul(self.board.height);
        if cells.map_or(true, |cells| cells > Board::MAX_CELLS) {
            return Err(ConfigError::Validation(format!(
                "board.width * board.height must be <= {}",
                Board::MAX_CELLS
            )));
        }
        if self.players.count == 0 {
            return Err(ConfigError::Validation(
                "players.count must be >= 1".into(),
            ));
        }
        if self.players.count > Board::SYMBOLS {
            return Err(ConfigError::Validation(format!(
                "players.count must be <= {}",
                Board::SYMBOLS
            )));
        }
        if self.players.first >= self.players.count {
            return Err(ConfigError::Validation(
                "players.first must be < players.count".into(),
            ));
        }
        if self.log.level.trim().is_empty() {
            return Err(ConfigError::Validation("log.level must not be empty".into()));
        }

        Ok(())
    }

    /// Generate a TOML string with all default values (useful for creating
    /// example config files).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&AppConfig::default()).expect("default config serializes")
    }
}
