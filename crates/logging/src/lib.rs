//! Arckana Logging
//!
//! Subscriber setup for the iApp binary and its tests. Logs always go to
//! stderr: inside the TEE, stdout is captured as the task log and the
//! result itself lives in `result.json`.
//!
//! ```no_run
//! use arckana_logging::{try_init, LogLevel};
//!
//! // `-vv` on the command line
//! try_init(LogLevel::from_flags(2, 0)).unwrap();
//! ```

use tracing_subscriber::EnvFilter;

/// Log level for the application
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    /// Per-holder payouts and proof sizes
    Debug,
    /// Tree construction detail
    Trace,
}

impl LogLevel {
    /// Level from repeated `-v` / `-q` flags.
    ///
    /// Starts at `Info`; each `-v` moves one step towards `Trace` and each
    /// `-q` one step towards `Error`.
    pub fn from_flags(verbose: u8, quiet: u8) -> Self {
        const LEVELS: [LogLevel; 5] = [
            LogLevel::Error,
            LogLevel::Warn,
            LogLevel::Info,
            LogLevel::Debug,
            LogLevel::Trace,
        ];
        let step = 2 + i32::from(verbose) - i32::from(quiet);
        LEVELS[step.clamp(0, 4) as usize]
    }

    fn directive(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

/// Filter for `level`, unless `RUST_LOG` is set.
fn filter_for(level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.directive()))
}

/// Install the global subscriber.
///
/// Fails if one is already installed.
pub fn try_init(level: LogLevel) -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(filter_for(level))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| format!("Failed to initialize logging: {e}"))
}

/// Initialize logging for tests (captures output for the test harness).
///
/// Safe to call from every test; only the first call installs a subscriber.
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
