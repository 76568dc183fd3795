use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::error::FetchError;

/// Retrieves the raw HTML of one page.
///
/// The pagination logic only sees this trait, so static and script-executing
/// fetchers are interchangeable. Implementations make a single attempt.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError>;

    fn kind(&self) -> &'static str;
}

pub fn create_client(user_agent: &str, timeout: Duration) -> Result<Client, reqwest::Error> {
    ClientBuilder::new()
        .user_agent(user_agent)
        .timeout(timeout)
        .cookie_store(true)
        .pool_max_idle_per_host(2)
        .build()
}

/// Plain HTTP fetcher for server-rendered pages.
pub struct HttpFetcher {
    client: Client,
    timeout_secs: u64,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: create_client(user_agent, timeout)?,
            timeout_secs: timeout.as_secs(),
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest_error(e, self.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            warn!("HTTP error {}: {}", status, url);
            return Err(FetchError::Http { status });
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest_error(e, self.timeout_secs))
    }

    fn kind(&self) -> &'static str {
        "http"
    }
}
