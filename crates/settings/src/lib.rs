//! Arckana Settings
//!
//! Run configuration for the dividend iApp.
//!
//! Values are resolved in layers: built-in defaults, an optional JSON
//! settings file, the iExec environment (`IEXEC_IN`, `IEXEC_OUT`) and
//! finally CLI overrides applied by the binary.
//!
//! ## Usage
//!
//! ```no_run
//! use arckana_settings::Settings;
//!
//! let settings = Settings::load_from(std::path::Path::new("arckana.json"))?
//!     .with_env();
//! println!("reading from {:?}", settings.input_dir);
//! # Ok::<(), arckana_settings::SettingsError>(())
//! ```

mod config;

pub use config::{Settings, DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_DIR, DEFAULT_POOL, ENV_INPUT_DIR, ENV_OUTPUT_DIR};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings: {0}")]
    ReadError(std::io::Error),

    #[error("Failed to parse settings: {0}")]
    ParseError(serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SettingsError>;
