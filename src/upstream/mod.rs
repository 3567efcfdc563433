//! HTTP clients for the upstream open-data feeds

pub mod madrid;
pub mod nominatim;
pub mod normalize;
pub mod overpass;

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};

use crate::config::UpstreamConfig;

pub use madrid::MadridClient;
pub use nominatim::NominatimClient;
pub use overpass::OverpassClient;

/// Shared client with timeout, user agent and transient-error retries
pub fn build_client(config: &UpstreamConfig) -> Result<ClientWithMiddleware> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(config.user_agent.clone())
        .build()
        .context("Failed to build HTTP client")?;

    let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);

    Ok(ClientBuilder::new(client)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build())
}

/// Every upstream client, sharing one connection pool
#[derive(Debug, Clone)]
pub struct Upstream {
    pub madrid: MadridClient,
    pub overpass: OverpassClient,
    pub nominatim: NominatimClient,
}

impl Upstream {
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let client = build_client(config)?;
        Ok(Self {
            madrid: MadridClient::new(
                client.clone(),
                &config.madrid_air_url,
                &config.madrid_recycling_url,
            ),
            overpass: OverpassClient::new(client.clone(), &config.overpass_url),
            nominatim: NominatimClient::new(client, &config.nominatim_url),
        })
    }
}
