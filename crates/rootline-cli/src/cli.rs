use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rootline_types::{BundleId, PoolId};

#[derive(Parser)]
#[command(
    name = "rootline",
    about = "rootline: rebuild Merkle roots for finalized bundles",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the TOML configuration file
    #[arg(long, global = true, default_value = "rootline.toml")]
    pub config: PathBuf,

    /// Directory holding the per-pool ledger files
    #[arg(long, global = true)]
    pub ledger_dir: Option<PathBuf>,

    /// Chain REST endpoint serving bundle metadata
    #[arg(long, global = true)]
    pub chain_rest: Option<String>,

    /// Storage gateway serving raw bundle content
    #[arg(long, global = true)]
    pub storage_rest: Option<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compute and append Merkle roots for a pool until it is caught up
    Start(StartArgs),
    /// Compute the Merkle root of a single bundle without writing it
    Inspect(InspectArgs),
    /// Show the Merkle roots stored for a pool
    Show(ShowArgs),
}

#[derive(Args)]
pub struct StartArgs {
    pub pool_id: PoolId,
    /// Stop before processing this bundle id
    #[arg(long)]
    pub stop_before: Option<BundleId>,
}

#[derive(Args)]
pub struct InspectArgs {
    #[arg(long)]
    pub pool_id: PoolId,
    #[arg(long)]
    pub bundle_id: BundleId,
    /// Runtime name selecting the leaf scheme instead of the pool default
    #[arg(long)]
    pub runtime: Option<String>,
}

#[derive(Args)]
pub struct ShowArgs {
    pub pool_id: PoolId,
    #[arg(long, default_value = "0")]
    pub from: u64,
    #[arg(short = 'n', long, default_value = "20")]
    pub limit: u64,
}
