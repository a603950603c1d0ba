//! Probe executor: one proxied GET per proxy spec

use crate::config::RunConfig;
use crate::proxy::models::{FailureStage, ProbeOutcome, ProxySpec};
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Proxy as ReqwestProxy};
use std::time::{Duration, Instant};

/// Scheme handed to reqwest for every tag; the target host is resolved by the proxy
const SOCKS_SCHEME: &str = "socks5h";

/// A single probe attempt against one proxy
#[async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self, spec: &ProxySpec) -> ProbeOutcome;
}

/// Probes proxies by fetching a target URL through them with reqwest
#[derive(Debug, Clone)]
pub struct ProxyProber {
    target_url: String,
    timeout: Duration,
    capture_body: bool,
}

impl ProxyProber {
    pub fn new(target_url: impl Into<String>, timeout: Duration, capture_body: bool) -> Self {
        Self {
            target_url: target_url.into(),
            timeout,
            capture_body,
        }
    }

    pub fn from_config(config: &RunConfig) -> Self {
        Self::new(config.target_url.clone(), config.timeout, config.echo_body)
    }

    pub fn target_url(&self) -> &str {
        &self.target_url
    }

    /// Build a client that tunnels every request through the proxy.
    ///
    /// The scheme tag is not consulted: socks4, socks and socks5 descriptors
    /// all go through the same SOCKS5 client with username/password auth.
    fn create_client(&self, spec: &ProxySpec) -> Result<Client, reqwest::Error> {
        let proxy_url = format!("{}://{}", SOCKS_SCHEME, spec.host_port);
        let reqwest_proxy =
            ReqwestProxy::all(&proxy_url)?.basic_auth(&spec.username, &spec.password);

        Client::builder()
            .proxy(reqwest_proxy)
            .timeout(self.timeout)
            .build()
    }

    async fn fetch(&self, client: &Client) -> Result<(u16, Vec<u8>), (FailureStage, String)> {
        let response = client
            .get(&self.target_url)
            .send()
            .await
            .map_err(|e| (stage_of(&e, FailureStage::Request), e.to_string()))?;

        let status_code = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| (stage_of(&e, FailureStage::Body), e.to_string()))?;

        Ok((status_code, body.to_vec()))
    }
}

#[async_trait]
impl Probe for ProxyProber {
    async fn probe(&self, spec: &ProxySpec) -> ProbeOutcome {
        let source = spec.to_string();
        let start = Instant::now();

        let client = match self.create_client(spec) {
            Ok(client) => client,
            Err(e) => return ProbeOutcome::failure(source, FailureStage::Setup, e.to_string()),
        };

        let outcome = match tokio::time::timeout(self.timeout, self.fetch(&client)).await {
            Ok(Ok((status_code, body))) => {
                let body = self.capture_body.then_some(body);
                ProbeOutcome::success(source, status_code, body)
            }
            Ok(Err((stage, message))) => ProbeOutcome::failure(source, stage, message),
            Err(_) => ProbeOutcome::failure(
                source,
                FailureStage::Timeout,
                format!("no response within {:?}", self.timeout),
            ),
        };

        debug!(
            "probe via {} finished in {}ms (success: {})",
            spec.host_port,
            start.elapsed().as_millis(),
            outcome.is_success()
        );
        outcome
    }
}

fn stage_of(error: &reqwest::Error, otherwise: FailureStage) -> FailureStage {
    if error.is_timeout() {
        FailureStage::Timeout
    } else {
        otherwise
    }
}
