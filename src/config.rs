use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use clap::Parser;
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_PROMPT: &str = "plumb> ";
pub const DEFAULT_HISTORY_LIMIT: usize = 1000;
const CONFIG_FILE_NAME: &str = ".plumbrc.toml";

/// Startup flags.
#[derive(Parser, Debug, Default)]
#[command(version, about)]
pub struct Args {
    /// Configuration file. Defaults to `~/.plumbrc.toml` when it exists.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Do not print a prompt before reading each line.
    #[arg(long)]
    pub no_prompt: bool,

    /// Directory the log file is written to.
    #[arg(long, default_value = ".")]
    pub log_dir: PathBuf,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Settings read from the TOML configuration file.
///
/// ```toml
/// prompt = "$ "
/// history_limit = 500
/// extra_paths = ["/opt/tools/bin"]
///
/// [aliases]
/// ll = "ls -l"
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShellConfig {
    pub prompt: String,
    pub history_limit: usize,
    /// Searched after `PATH` when resolving commands.
    pub extra_paths: Vec<PathBuf>,
    pub aliases: BTreeMap<String, String>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.into(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            extra_paths: Vec::new(),
            aliases: BTreeMap::new(),
        }
    }
}

impl ShellConfig {
    /// Loads `path` if given, otherwise the default file in the home
    /// directory. Only an explicitly named file has to exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => match default_path() {
                Some(path) if path.is_file() => Self::from_file(&path),
                _ => {
                    debug!("no config file, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config = text.parse().map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(?path, "loaded config");

        Ok(config)
    }
}

impl std::str::FromStr for ShellConfig {
    type Err = toml::de::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        toml::from_str(s)
    }
}

fn default_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_FILE_NAME))
}
