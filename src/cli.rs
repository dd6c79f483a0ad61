//! CLI surface (spec §1 "CLI command dispatch"): parses arguments and
//! chooses between running the daemon loop and the one-off key management
//! commands operators use during setup.

use clap::{Parser, Subcommand};

use crate::config::GlobalConfigArgs;

#[derive(Parser, Debug)]
#[command(name = "dbrhino-agent", version, about = "Reconciles database users and grants against a central control-plane specification")]
pub struct Args {
    #[command(flatten)]
    pub config: GlobalConfigArgs,

    #[command(subcommand)]
    pub command: Command,

    /// Increase log verbosity (can be repeated: -v, -vv, -vvv).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the reconciliation loop, fetching a spec and checking in every cycle.
    Run,
    /// Generate a fresh RSA keypair at the configured path, overwriting any existing one.
    Keygen,
    /// Print this agent's public key in the PEM format the control plane expects.
    ShowPubkey,
}

impl Args {
    #[must_use]
    pub fn default_log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}
