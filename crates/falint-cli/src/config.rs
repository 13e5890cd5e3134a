//! Lint configuration loading from falint.toml
//!
//! Flag values live under a `[lint]` table using the externally visible
//! option names:
//!
//! ```toml
//! [lint]
//! force-future-annotations = true
//! check-future-annotations = false
//! ```

use falint_core::Config;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// falint.toml layout
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    lint: Config,
}

/// Load lint configuration.
///
/// An explicitly given path must exist. Without one, `falint.toml` in the
/// current directory is used when present and defaults apply otherwise.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            read(path)
        }
        None => {
            let default = Path::new("falint.toml");
            if default.exists() {
                read(default)
            } else {
                Ok(Config::default())
            }
        }
    }
}

fn read(path: &Path) -> Result<Config, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file: FileConfig = toml::from_str(&text).map_err(|source| ConfigError::Toml {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(file.lint)
}
