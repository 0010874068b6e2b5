//! Configuration file management
//!
//! Settings are read from a TOML file (`musicdb.toml` by default) and may be
//! overridden from the command line.
//!
//! # Configuration Format
//!
//! ```toml
//! [database]
//! path = "music.db"      # omitted, "" or ":memory:" open an in-memory database
//! read_only = false
//! no_follow = false      # refuse to open symbolic links
//!
//! [shell]
//! mode = "column"        # column, ascii
//! echo = false           # print SQL files before running them
//! reset_script = "sql/create_and_populate.sql"
//! history = true
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::render::OutputMode;

pub const DEFAULT_CONFIG_PATH: &str = "musicdb.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShellConfig {
    pub database: DatabaseConfig,
    pub shell: UiConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Database file; `None` means a transient in-memory database
    pub path: Option<String>,
    pub read_only: bool,
    pub no_follow: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UiConfig {
    pub mode: OutputMode,
    /// Print SQL files before running them
    pub echo: bool,
    /// Script run by "Reset Database"
    pub reset_script: PathBuf,
    /// Keep line-editor history in the home directory
    pub history: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            mode: OutputMode::Column,
            echo: false,
            reset_script: PathBuf::from("sql/create_and_populate.sql"),
            history: true,
        }
    }
}

impl ShellConfig {
    /// Load configuration from file.
    ///
    /// A missing file yields the defaults unless `required` is set, which is
    /// the case when the path was named explicitly.
    pub fn load(path: &Path, required: bool) -> Result<Self> {
        if !required && !path.exists() {
            tracing::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&contents).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn parse(contents: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }
}
