//! Configuration types

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use arckana_core::{DuplicatePolicy, U256};

use crate::{Result, SettingsError};

/// Environment variable naming the iExec input directory
pub const ENV_INPUT_DIR: &str = "IEXEC_IN";

/// Environment variable naming the iExec output directory
pub const ENV_OUTPUT_DIR: &str = "IEXEC_OUT";

pub const DEFAULT_INPUT_DIR: &str = "/iexec_in";
pub const DEFAULT_OUTPUT_DIR: &str = "/iexec_out";

/// Pool used when no argument is supplied: 1000 USDC at 6 decimals.
pub const DEFAULT_POOL: u64 = 1_000_000_000;

/// Main settings structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Directory holding `protectedData.json` or per-holder JSON files, and `args.txt`
    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,

    /// Directory receiving `result.json` and `computed.json`
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Pool distributed when `args.txt` is missing, empty or non-numeric
    #[serde(default = "default_pool")]
    pub default_pool: U256,

    /// Resolution of repeated holder addresses
    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,
}

fn default_input_dir() -> PathBuf {
    PathBuf::from(DEFAULT_INPUT_DIR)
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

fn default_pool() -> U256 {
    U256::from(DEFAULT_POOL)
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input_dir: default_input_dir(),
            output_dir: default_output_dir(),
            default_pool: default_pool(),
            duplicate_policy: DuplicatePolicy::default(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file.
    ///
    /// Missing fields fall back to their defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(SettingsError::ReadError)?;
        let settings: Settings = serde_json::from_str(&content).map_err(SettingsError::ParseError)?;
        info!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Load from `path` if given, otherwise start from defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => Ok(Self::default()),
        }
    }

    /// Apply `IEXEC_IN` / `IEXEC_OUT` from the process environment.
    pub fn with_env(self) -> Self {
        self.with_env_from(|key| std::env::var(key).ok())
    }

    /// Apply directory overrides from an arbitrary variable lookup.
    ///
    /// Empty values are ignored.
    pub fn with_env_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_INPUT_DIR).filter(|v| !v.is_empty()) {
            self.input_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup(ENV_OUTPUT_DIR).filter(|v| !v.is_empty()) {
            self.output_dir = PathBuf::from(dir);
        }
        self
    }

    /// Path of the result file inside the output directory.
    pub fn result_path(&self) -> PathBuf {
        self.output_dir.join("result.json")
    }

    /// Path of the iExec manifest inside the output directory.
    pub fn computed_path(&self) -> PathBuf {
        self.output_dir.join("computed.json")
    }
}
