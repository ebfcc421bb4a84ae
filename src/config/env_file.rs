//! Optional JSON file supplying defaults for process environment variables.

use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};

use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

pub const DEFAULT_ENV_FILE: &str = "env.json";

#[derive(Debug, Error)]
pub enum EnvFileError {
    #[error("no env file found at `{}`", .0.display())]
    Missing(PathBuf),
    #[error("failed to read `{}`: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse `{}`: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Variables read from the env file. Process environment always wins.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EnvDefaults {
    values: HashMap<String, String>,
}

impl EnvDefaults {
    pub fn read(path: &Path) -> Result<Self, EnvFileError> {
        let raw = fs::read_to_string(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                EnvFileError::Missing(path.to_path_buf())
            } else {
                EnvFileError::Read {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let parsed: HashMap<String, Value> =
            serde_json::from_str(&raw).map_err(|source| EnvFileError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let values = parsed
            .into_iter()
            .filter_map(|(key, value)| match value {
                Value::String(text) => Some((key, text)),
                Value::Number(number) => Some((key, number.to_string())),
                Value::Bool(flag) => Some((key, flag.to_string())),
                Value::Null | Value::Array(_) | Value::Object(_) => None,
            })
            .collect();

        Ok(Self { values })
    }

    /// Read the env file, falling back to no defaults when it is absent or broken.
    pub fn load(path: &Path) -> (Self, EnvFileOutcome) {
        match Self::read(path) {
            Ok(defaults) => {
                let outcome = EnvFileOutcome::Loaded {
                    path: path.to_path_buf(),
                    keys: defaults.len(),
                };
                (defaults, outcome)
            }
            Err(EnvFileError::Missing(path)) => (Self::default(), EnvFileOutcome::Missing { path }),
            Err(err) => (
                Self::default(),
                EnvFileOutcome::Failed {
                    path: path.to_path_buf(),
                    reason: err.to_string(),
                },
            ),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Resolve `key` from `lookup` first, then from the file defaults.
    pub fn resolve_with(
        &self,
        key: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Option<String> {
        lookup(key).or_else(|| self.get(key).map(str::to_string))
    }
}

/// What happened while reading the env file. Logged once telemetry is up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvFileOutcome {
    Loaded { path: PathBuf, keys: usize },
    Missing { path: PathBuf },
    Failed { path: PathBuf, reason: String },
}

impl EnvFileOutcome {
    pub fn log(&self) {
        match self {
            EnvFileOutcome::Loaded { path, keys } => info!(
                target = "tumbleproxy::config",
                path = %path.display(),
                keys,
                "loaded environment defaults"
            ),
            EnvFileOutcome::Missing { path } => info!(
                target = "tumbleproxy::config",
                path = %path.display(),
                "no env file found, assuming production"
            ),
            EnvFileOutcome::Failed { path, reason } => warn!(
                target = "tumbleproxy::config",
                path = %path.display(),
                reason = %reason,
                "error loading env file, using process environment only"
            ),
        }
    }
}
