//! Arckana iApp
//!
//! Wires the input boundary, the distribution core and the output boundary
//! into one run, plus claim-side proof verification.

pub mod input;
pub mod output;

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use arckana_aggregator::{build_distribution, collect_balances, DistributionReport};
use arckana_core::{hash_from_hex, hash_to_hex, Address, ArckanaError, DuplicatePolicy, U256};
use arckana_prover::{merkle_leaf, verify_proof};
use arckana_settings::Settings;

/// Message reported when no record survives validation
pub const NO_BALANCES_MESSAGE: &str = "No valid balances found";

/// Command-line overrides, layered over the settings file and environment.
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    /// Settings file (JSON)
    pub config: Option<PathBuf>,
    pub input_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    /// Raw pool argument, replaces `args.txt`
    pub pool: Option<String>,
    pub duplicate_policy: Option<DuplicatePolicy>,
}

impl RunOverrides {
    fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(input) = &self.input_dir {
            settings.input_dir = input.clone();
        }
        if let Some(output) = &self.output_dir {
            settings.output_dir = output.clone();
        }
        if let Some(policy) = self.duplicate_policy {
            settings.duplicate_policy = policy;
        }
        settings
    }
}

/// Resolve settings and the pool argument, then execute one run.
///
/// A settings file that fails to load or a bad pool argument is fatal, but
/// the failure result is still written to the best known output directory
/// (defaults, then environment, then overrides).
pub fn run_from(overrides: &RunOverrides) -> Result<DistributionReport> {
    let (settings, load_error) = match Settings::load_or_default(overrides.config.as_deref()) {
        Ok(settings) => (settings, None),
        Err(e) => (Settings::default(), Some(e)),
    };
    let settings = overrides.apply(settings.with_env());

    if let Some(e) = load_error {
        return Err(abort(&settings, anyhow::Error::new(e).context("Failed to load settings")));
    }

    let pool = match overrides.pool.as_deref().map(input::parse_pool_arg).transpose() {
        Ok(pool) => pool,
        Err(e) => return Err(abort(&settings, anyhow::Error::new(e).context("Invalid --pool"))),
    };

    run(&settings, pool)
}

/// Execute one distribution run.
///
/// Always leaves `result.json` and `computed.json` behind. An empty holder
/// set is a structured failure and returns `Ok`. Domain errors (pool or
/// amount outside 256 bits, rejected duplicates) write a failure result
/// with no distribution entries and return `Err`.
pub fn run(settings: &Settings, pool_override: Option<U256>) -> Result<DistributionReport> {
    info!("Arckana iApp starting");
    info!("Input directory: {:?}", settings.input_dir);
    info!("Output directory: {:?}", settings.output_dir);

    match compute(settings, pool_override) {
        Ok(report) => {
            output::write_report(settings, &report)?;
            if report.success {
                info!(
                    "Distribution complete: root {}, {} holders, {} distributed",
                    report.merkle_root, report.holder_count, report.total_distributed
                );
            }
            Ok(report)
        }
        Err(e) => Err(abort(settings, e.into())),
    }
}

/// Write the failure result for a fatal error and hand the error back.
fn abort(settings: &Settings, err: anyhow::Error) -> anyhow::Error {
    error!("Distribution aborted: {:#}", err);
    let report = DistributionReport::failure(format!("{:#}", err));
    match output::write_report(settings, &report) {
        Ok(()) => err.context("Distribution aborted"),
        Err(write_err) => write_err.context(format!("Distribution aborted ({:#})", err)),
    }
}

fn compute(settings: &Settings, pool_override: Option<U256>) -> std::result::Result<DistributionReport, ArckanaError> {
    let pool = match pool_override {
        Some(pool) => pool,
        None => input::read_pool(&settings.input_dir, settings.default_pool)?,
    };
    info!("Total dividend pool: {}", pool);

    let loaded = input::load_holder_records(&settings.input_dir);
    if loaded.skipped > 0 {
        warn!("Discarded {} malformed records", loaded.skipped);
    }

    let balances = collect_balances(loaded.records, settings.duplicate_policy)?;
    info!("Processing {} holder balances", balances.len());

    if balances.is_empty() {
        warn!("{}", NO_BALANCES_MESSAGE);
        return Ok(DistributionReport::failure(NO_BALANCES_MESSAGE));
    }

    let distribution = build_distribution(&balances, pool)?;
    Ok(DistributionReport::from_distribution(&distribution))
}

/// Check a holder's claim against a published root.
///
/// Recomputes the leaf from `(holder, amount)` and folds the proof the way
/// the on-chain pool does.
pub fn verify_claim(root: &str, holder: &str, amount: &str, proof: &[String]) -> Result<bool> {
    let root = hash_from_hex(root).context("Invalid root")?;
    let holder: Address = holder.parse().context("Invalid holder")?;
    let amount = U256::parse_decimal(amount).context("Invalid amount")?;
    let siblings = proof
        .iter()
        .map(|p| hash_from_hex(p))
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("Invalid proof element")?;

    let leaf = merkle_leaf(&holder, &amount);
    let valid = verify_proof(&root, &leaf, &siblings);
    info!(
        "Claim for {} amount {} leaf {}: {}",
        holder,
        amount,
        hash_to_hex(&leaf),
        if valid { "valid" } else { "INVALID" }
    );
    Ok(valid)
}
