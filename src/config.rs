//! Server configuration.
//!
//! A JSON document, read once at startup:
//!
//! ```json
//! {
//!     "port": 8080,
//!     "shares": [
//!         { "path": "/data/public", "alias": "public", "read_only": false }
//!     ]
//! }
//! ```

use std::error::Error;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// One exported directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Share {
    /// Real directory served by this share.
    pub path: PathBuf,
    /// Name of the share in the url space: `/{alias}/...`.
    pub alias: String,
    #[serde(default)]
    pub read_only: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    pub shares: Vec<Share>,
}

fn default_port() -> u16 {
    8080
}

impl Config {
    /// Read and parse the configuration file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let data = std::fs::read(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let config = serde_json::from_slice(&data)?;
        Ok(config)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, io::Error),
    Parse(serde_json::Error),
    InvalidAlias(String),
    DuplicateAlias(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "{}: {}", path.display(), e),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
            ConfigError::InvalidAlias(a) => write!(f, "invalid share alias {a:?}"),
            ConfigError::DuplicateAlias(a) => write!(f, "duplicate share alias {a:?}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigError::Io(_, e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}
