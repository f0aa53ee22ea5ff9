//! CLI configuration file support.
//!
//! The file is YAML with optional `project`, `region` and `output` keys. It
//! is read from `--config`, then `GCPHCP_CONFIG_PATH`, then
//! `<config dir>/gcphcp/config.yaml` (`~/.config/gcphcp/config.yaml` on most
//! platforms). Values from the file only fill what flags and environment
//! variables left unset.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use dirs_next::{config_dir, home_dir};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Environment variable allowing callers to override the config file path.
pub const CONFIG_PATH_ENV: &str = "GCPHCP_CONFIG_PATH";
pub const PROJECT_ENV: &str = "GCPHCP_PROJECT";
pub const REGION_ENV: &str = "GCPHCP_REGION";
pub const OUTPUT_ENV: &str = "GCPHCP_OUTPUT";

const CONFIG_FILE_NAME: &str = "config.yaml";

#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("reading config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("--{flag} is required (or set {env})")]
    Missing { flag: &'static str, env: &'static str },
}

/// Settings shared by every command.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl CliConfig {
    /// Load the config file. A missing file is an empty config; a file that
    /// exists but cannot be read or parsed is an error.
    pub fn load(explicit_path: Option<&str>) -> Result<Self, ConfigFileError> {
        let path = resolve_config_path(explicit_path);
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file; using defaults");
                return Ok(Self::default());
            }
            Err(source) => return Err(ConfigFileError::Read { path, source }),
        };

        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(&text).map_err(|source| ConfigFileError::Parse {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "loaded config file");
        Ok(config.normalized())
    }

    /// Fill unset values from `fallback`. `self` holds the higher-precedence
    /// values (flags and environment).
    pub fn or(self, fallback: CliConfig) -> CliConfig {
        let (primary, fallback) = (self.normalized(), fallback.normalized());
        CliConfig {
            project: primary.project.or(fallback.project),
            region: primary.region.or(fallback.region),
            output: primary.output.or(fallback.output),
        }
    }

    pub fn require_project(&self) -> Result<&str, ConfigFileError> {
        self.project.as_deref().ok_or(ConfigFileError::Missing {
            flag: "project",
            env: PROJECT_ENV,
        })
    }

    pub fn require_region(&self) -> Result<&str, ConfigFileError> {
        self.region.as_deref().ok_or(ConfigFileError::Missing {
            flag: "region",
            env: REGION_ENV,
        })
    }

    fn normalized(self) -> Self {
        let clean = |value: Option<String>| value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        Self {
            project: clean(self.project),
            region: clean(self.region),
            output: clean(self.output),
        }
    }
}

/// Path of the config file that would be read.
pub fn resolve_config_path(explicit_path: Option<&str>) -> Option<PathBuf> {
    if let Some(path) = explicit_path.map(str::trim).filter(|path| !path.is_empty()) {
        return Some(expand_tilde(path));
    }
    if let Ok(path) = env::var(CONFIG_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return Some(expand_tilde(trimmed));
        }
    }
    config_dir().map(|dir| dir.join("gcphcp").join(CONFIG_FILE_NAME))
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    let home = || home_dir().unwrap_or_else(|| PathBuf::from("~"));
    match path {
        "~" => home(),
        _ => match path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
            Some(rest) => home().join(rest),
            None => Path::new(path).to_path_buf(),
        },
    }
}
