//! Application-level configuration loading: game rules, RNG seed and storage backend.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

use crate::state::scoring::ScoringRule;

/// Default location on disk where the engine looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/bughunt.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "BUGHUNT_CONFIG_PATH";

/// Capacity of an interactive BugHunt match.
pub const MAX_BUGHUNT_PLAYERS: usize = 30;
/// Capacity of a daily challenge.
pub const MAX_DAILY_PLAYERS: usize = 100_000;
/// Guess budget per player.
pub const MAX_BUGHUNT_GUESSES: u32 = 3;
/// Accuracy penalty charged per hint.
pub const BUGHUNT_HINT_PENALTY: f64 = -0.1;
/// Cumulative correctness at which a player wins.
pub const BUGHUNT_WIN_THRESHOLD: f64 = 0.97;
/// Objects on the table when a Nim match starts.
pub const MAX_NIM_OBJECTS: u32 = 21;

/// Tunable rules shared by every game instance of a manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct GameRules {
    #[validate(range(min = 1, max = 1000))]
    pub max_players: usize,
    #[validate(range(min = 1, max = 10_000_000))]
    pub daily_max_players: usize,
    #[validate(range(min = 1, max = 100))]
    pub max_guesses: u32,
    #[validate(range(min = -1.0, max = 0.0))]
    pub hint_penalty: f64,
    #[validate(range(exclusive_min = 0.0, max = 1.0))]
    pub win_threshold: f64,
    pub scoring: ScoringRule,
    #[validate(range(min = 1, max = 1000))]
    pub nim_objects: u32,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            max_players: MAX_BUGHUNT_PLAYERS,
            daily_max_players: MAX_DAILY_PLAYERS,
            max_guesses: MAX_BUGHUNT_GUESSES,
            hint_penalty: BUGHUNT_HINT_PENALTY,
            win_threshold: BUGHUNT_WIN_THRESHOLD,
            scoring: ScoringRule::default(),
            nim_objects: MAX_NIM_OBJECTS,
        }
    }
}

/// Which [`GameStore`](crate::dao::game_store::GameStore) the binary connects to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Mongo,
    Couch,
}

/// Immutable runtime configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    #[validate(nested)]
    pub rules: GameRules,
    /// Fixed seed for reproducible file and hint selection; entropy when absent.
    pub rng_seed: Option<u64>,
    pub storage: StorageBackend,
}

impl AppConfig {
    /// Load the configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(config) => {
                    info!(
                        path = %path.display(),
                        storage = ?config.storage,
                        max_players = config.rules.max_players,
                        "loaded configuration"
                    );
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "invalid config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Parse and validate a JSON document.
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }
}

/// Reasons a configuration document is rejected.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("malformed JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("validation failed: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
