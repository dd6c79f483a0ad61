use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use dbrhino_agent_lib::cli::{Args, Command};
use dbrhino_agent_lib::config::get_config;
use dbrhino_agent_lib::crypto::{encode_public_key, read_or_generate_private_key};
use dbrhino_agent_lib::logging;
use dbrhino_agent_lib::scheduler;
use dbrhino_agent_lib::transport::ControlPlaneClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init(args.default_log_level())?;

    let config = get_config(args.config)?;

    match args.command {
        Command::Keygen => {
            dbrhino_agent_lib::crypto::generate_and_write_private_key(&config.private_key_path)
                .context("failed to generate RSA keypair")?;
            tracing::info!("wrote a new private key to {}", config.private_key_path.display());
            Ok(())
        }
        Command::ShowPubkey => {
            let key = read_or_generate_private_key(&config.private_key_path).context("failed to load private key")?;
            let pem = encode_public_key(&key).context("failed to encode public key")?;
            print!("{}", String::from_utf8_lossy(&pem));
            Ok(())
        }
        Command::Run => {
            let key =
                read_or_generate_private_key(&config.private_key_path).context("failed to load private key")?;
            let pubkey_pem = encode_public_key(&key).context("failed to encode public key")?;

            let client = ControlPlaneClient::new(config.server_url.clone(), config.access_token.clone())?;
            client
                .send_pubkey(&pubkey_pem)
                .await
                .context("failed to announce public key to the control plane")?;

            scheduler::run(&config, &client, Arc::new(key)).await
        }
    }
}
