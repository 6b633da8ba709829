//! Arckana CLI
//!
//! Confidential dividend calculator: allocates a pool across token holders
//! and commits the payouts to a Merkle root for on-chain claiming.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{ArgAction, Parser, Subcommand};

use arckana_cli::{run_from, verify_claim, RunOverrides};
use arckana_core::DuplicatePolicy;
use arckana_logging::{try_init, LogLevel};

/// Arckana - Confidential Dividend Distribution
#[derive(Parser)]
#[command(name = "arckana")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// More logging (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Less logging (-q warnings only, -qq errors only)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    quiet: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the distribution from the input directory (default)
    Run(RunArgs),

    /// Check a holder's claim against a published Merkle root
    Verify {
        /// Merkle root (0x-prefixed, 64 hex chars)
        #[arg(long)]
        root: String,

        /// Holder address
        #[arg(long)]
        holder: String,

        /// Claimed amount in base units
        #[arg(long)]
        amount: String,

        /// Proof hashes, comma separated
        #[arg(long, value_delimiter = ',')]
        proof: Vec<String>,
    },
}

#[derive(clap::Args, Default)]
struct RunArgs {
    /// Settings file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Input directory (overrides IEXEC_IN)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output directory (overrides IEXEC_OUT)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Dividend pool in base units (overrides args.txt)
    #[arg(short, long)]
    pool: Option<String>,

    /// Duplicate holder policy: last_wins, merge or reject
    #[arg(long)]
    duplicates: Option<DuplicatePolicy>,
}

impl From<RunArgs> for RunOverrides {
    fn from(args: RunArgs) -> Self {
        Self {
            config: args.config,
            input_dir: args.input,
            output_dir: args.output,
            pool: args.pool,
            duplicate_policy: args.duplicates,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    try_init(LogLevel::from_flags(cli.verbose, cli.quiet)).map_err(anyhow::Error::msg)?;

    match cli.command.unwrap_or(Commands::Run(RunArgs::default())) {
        Commands::Run(args) => {
            run_from(&args.into())?;
        }
        Commands::Verify {
            root,
            holder,
            amount,
            proof,
        } => {
            if !verify_claim(&root, &holder, &amount, &proof)? {
                bail!("Proof does not match root");
            }
            println!("valid");
        }
    }

    Ok(())
}
