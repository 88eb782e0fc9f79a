use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "dlink",
    about = "dlink: ledger event and datalog bridge",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log at debug level regardless of the configured level
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Load and validate a configuration file
    Check(ConfigArgs),
    /// Show the owner and admin ledger addresses
    Addresses(ConfigArgs),
    /// Run the bridge against an in-memory ledger
    Simulate(SimulateArgs),
}

#[derive(Args)]
pub struct ConfigArgs {
    #[arg(short, long, default_value = "dlink.toml")]
    pub config: PathBuf,
}

#[derive(Args)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
    /// Number of state datalogs to send concurrently
    #[arg(long, default_value_t = 1)]
    pub states: usize,
    /// Number of credential datalogs to send concurrently
    #[arg(long, default_value_t = 1)]
    pub creds: usize,
    /// Shorten lane timings to one second
    #[arg(long)]
    pub fast: bool,
}
