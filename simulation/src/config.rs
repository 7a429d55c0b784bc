use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use mine_crawl_system_encounter::Tuning;
use mine_crawl_world::{BuildError, WorldConfig};
use serde::Deserialize;
use thiserror::Error;

/// Parameters of a single Mine Crawl session.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Seed every random stream of the session derives from.
    pub seed: u64,
    /// Height of the complete binary room tree.
    pub tree_height: i32,
    /// Width shared by every room.
    pub room_width: f32,
    /// Height shared by every room.
    pub room_height: f32,
    /// Keys the player holds from the start, such as the golden key for
    /// practice runs with an open exit.
    pub starting_keys: Vec<String>,
    /// Spawn curve of the encounter system.
    pub encounter: Tuning,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            tree_height: 3,
            room_width: 950.0,
            room_height: 650.0,
            starting_keys: Vec::new(),
            encounter: Tuning::default(),
        }
    }
}

impl SessionConfig {
    /// Parses a configuration from TOML, filling omitted keys with defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Reads and parses a TOML configuration file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub(crate) fn world_config(&self, seed: u64) -> WorldConfig {
        WorldConfig {
            tree_height: self.tree_height,
            room_width: self.room_width,
            room_height: self.room_height,
            seed,
            starting_keys: self.starting_keys.clone(),
        }
    }
}

/// Errors raised while loading a configuration or building its session.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Path of the unreadable file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The configuration is not valid TOML or has unexpected keys.
    #[error("invalid session config: {0}")]
    Parse(#[from] toml::de::Error),
    /// The configured dungeon cannot be built.
    #[error(transparent)]
    Build(#[from] BuildError),
}
