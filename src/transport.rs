//! HTTP transport to the control plane (spec §6): fetching the
//! specification, announcing the agent's public key, and posting checkin
//! reports. The core never touches `reqwest` directly — it only sees
//! [`crate::core::model::Specification`] and [`crate::core::model::Checkin`].

use std::time::Duration;

use anyhow::Context;
use reqwest::Client;

use crate::core::model::{Checkin, Specification};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct ControlPlaneClient {
    http: Client,
    server_url: String,
    access_token: String,
}

impl ControlPlaneClient {
    pub fn new(server_url: String, access_token: String) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            server_url,
            access_token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.server_url.trim_end_matches('/'), path)
    }

    /// `GET /api/grants`.
    pub async fn fetch_grants(&self) -> anyhow::Result<Specification> {
        self.http
            .get(self.url("/api/grants"))
            .bearer_auth(&self.access_token)
            .send()
            .await
            .context("request to /api/grants failed")?
            .error_for_status()
            .context("/api/grants returned an error status")?
            .json::<Specification>()
            .await
            .context("failed to parse /api/grants response body")
    }

    /// `POST /api/agents/startup`, announcing this agent's public key.
    pub async fn send_pubkey(&self, pubkey_pem: &[u8]) -> anyhow::Result<()> {
        #[derive(serde::Serialize)]
        struct StartupBody<'a> {
            pubkey: &'a str,
        }

        let pubkey = std::str::from_utf8(pubkey_pem).context("public key PEM was not valid UTF-8")?;

        self.http
            .post(self.url("/api/agents/startup"))
            .bearer_auth(&self.access_token)
            .json(&StartupBody { pubkey })
            .send()
            .await
            .context("request to /api/agents/startup failed")?
            .error_for_status()
            .context("/api/agents/startup returned an error status")?;
        Ok(())
    }

    /// `POST /api/agents/checkin`.
    pub async fn send_checkin(&self, checkin: &Checkin) -> anyhow::Result<()> {
        self.http
            .post(self.url("/api/agents/checkin"))
            .bearer_auth(&self.access_token)
            .json(checkin)
            .send()
            .await
            .context("request to /api/agents/checkin failed")?
            .error_for_status()
            .context("/api/agents/checkin returned an error status")?;
        Ok(())
    }
}
