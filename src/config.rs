//! Agent configuration (access token, control-plane URL, key paths):
//! one of the "deliberately out of scope" collaborators the core consumes
//! only through already-resolved values (spec §1).

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "/etc/dbrhino-agent/config.toml";
const DEFAULT_PRIVATE_KEY_PATH: &str = "/etc/dbrhino-agent/agent.key";
const DEFAULT_CYCLE_INTERVAL_SECS: u64 = 30;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server_url: String,
    pub access_token: String,
    pub private_key_path: PathBuf,
    pub cycle_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
struct FileConfig {
    server_url: Option<String>,
    access_token: Option<String>,
    private_key_path: Option<PathBuf>,
    cycle_interval_secs: Option<u64>,
}

#[derive(Parser, Debug)]
pub struct GlobalConfigArgs {
    /// Path to the configuration file.
    #[arg(short, long, value_name = "PATH", global = true, default_value = DEFAULT_CONFIG_PATH)]
    config_file: String,

    /// Base URL of the control-plane service.
    #[arg(long, value_name = "URL", global = true)]
    server_url: Option<String>,

    /// Bearer token used to authenticate with the control plane.
    #[arg(long, value_name = "TOKEN", global = true, hide_short_help = true)]
    access_token: Option<String>,

    /// Path to the agent's RSA private key, generated on first run if absent.
    #[arg(long, value_name = "PATH", global = true, hide_short_help = true)]
    private_key_path: Option<PathBuf>,

    /// Seconds to sleep between reconciliation cycles.
    #[arg(long, value_name = "SECONDS", global = true, hide_short_help = true)]
    cycle_interval_secs: Option<u64>,
}

/// Loads the TOML config file (if it exists) and layers CLI overrides on
/// top, the way the teacher's `get_config` composes file and CLI config.
pub fn get_config(args: GlobalConfigArgs) -> anyhow::Result<Config> {
    let config_path = PathBuf::from(&args.config_file);

    let file_config: FileConfig = if config_path.exists() {
        fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read config file from {config_path:?}"))
            .and_then(|contents| toml::from_str(&contents).context("failed to parse config file"))?
    } else {
        FileConfig::default()
    };

    let server_url = args
        .server_url
        .or(file_config.server_url)
        .context("server_url must be set via --server-url or the config file")?;

    let access_token = args
        .access_token
        .or(file_config.access_token)
        .context("access_token must be set via --access-token or the config file")?;

    let private_key_path = args
        .private_key_path
        .or(file_config.private_key_path)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PRIVATE_KEY_PATH));

    let cycle_interval_secs = args
        .cycle_interval_secs
        .or(file_config.cycle_interval_secs)
        .unwrap_or(DEFAULT_CYCLE_INTERVAL_SECS);

    Ok(Config {
        server_url,
        access_token,
        private_key_path,
        cycle_interval_secs,
    })
}
