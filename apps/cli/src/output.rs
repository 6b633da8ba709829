//! Output boundary: `result.json` and the iExec `computed.json` manifest.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::json;
use tracing::info;

use arckana_aggregator::DistributionReport;
use arckana_settings::Settings;

/// Key iExec reads from `computed.json` to locate the deterministic output
pub const DETERMINISTIC_OUTPUT_KEY: &str = "deterministic-output-path";

/// Write `result.json` and `computed.json` into the output directory.
pub fn write_report(settings: &Settings, report: &DistributionReport) -> Result<()> {
    fs::create_dir_all(&settings.output_dir)
        .with_context(|| format!("Failed to create output directory {:?}", settings.output_dir))?;

    let result_path = settings.result_path();
    let content = serde_json::to_string_pretty(report).context("Failed to serialize result")?;
    fs::write(&result_path, content)
        .with_context(|| format!("Failed to write {:?}", result_path))?;

    write_computed(&settings.computed_path(), &result_path)?;

    info!("Wrote {:?}", result_path);
    Ok(())
}

fn write_computed(computed_path: &Path, result_path: &Path) -> Result<()> {
    let manifest = json!({ DETERMINISTIC_OUTPUT_KEY: result_path.to_string_lossy() });
    fs::write(computed_path, manifest.to_string())
        .with_context(|| format!("Failed to write {:?}", computed_path))
}
