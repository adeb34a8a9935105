//! Run settings read from environment variables

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::Result;

/// API token variable. Only its shape is checked; it is never sent anywhere.
pub const API_TOKEN_VAR: &str = "JETON_API";
/// Path of the CSV dataset
pub const DATA_PATH_VAR: &str = "DATA_PATH";
/// Dataset loaded when `DATA_PATH` is unset
pub const DEFAULT_DATA_PATH: &str = "data.csv";
/// Column holding the survival label
pub const TARGET_COLUMN: &str = "Survived";

/// Copy a `.env` file from the working directory (or a parent) into the
/// process environment. Variables that are already set win. A missing file
/// is not an error.
pub fn load_dotenv() -> Option<PathBuf> {
    match dotenvy::dotenv() {
        Ok(path) => {
            info!("Loaded environment from {}", path.display());
            Some(path)
        }
        Err(err) if err.not_found() => {
            debug!("No .env file found");
            None
        }
        Err(err) => {
            warn!("Ignoring unreadable .env file: {}", err);
            None
        }
    }
}

/// Settings taken from the process environment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvSettings {
    pub api_token: String,
    pub data_path: PathBuf,
}

impl Default for EnvSettings {
    fn default() -> Self {
        Self {
            api_token: String::new(),
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
        }
    }
}

impl EnvSettings {
    /// Load settings from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings from a `.env`-style file, ignoring the process environment
    pub fn from_env_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let vars = dotenvy::from_path_iter(path.as_ref())?
            .collect::<std::result::Result<HashMap<String, String>, _>>()?;
        Ok(Self::from_lookup(|key| vars.get(key).cloned()))
    }

    /// Load settings through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(val) = lookup(API_TOKEN_VAR) {
            settings.api_token = val;
        }

        if let Some(val) = lookup(DATA_PATH_VAR).filter(|v| !v.trim().is_empty()) {
            settings.data_path = PathBuf::from(val);
        }

        info!("Data path: {}", settings.data_path.display());
        settings
    }

    /// A configured token is one that starts with `$`
    pub fn api_token_configured(&self) -> bool {
        self.api_token.starts_with('$')
    }

    /// Log and return a one-line status for the token
    pub fn api_token_status(&self) -> &'static str {
        if self.api_token_configured() {
            info!("{} is set", API_TOKEN_VAR);
            "API token has been configured properly"
        } else {
            warn!("{} is missing or does not start with '$'", API_TOKEN_VAR);
            "API token has not been configured"
        }
    }
}
