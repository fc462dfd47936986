use crate::error::{FetchError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::form_urlencoded;

pub const DEFAULT_USER_AGENT: &str = concat!("jsift/", env!("CARGO_PKG_VERSION"));

/// Retrieves the text body behind a URL.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> std::result::Result<String, FetchError>;
}

/// [`Fetcher`] backed by a `reqwest` client.
///
/// With a relay prefix configured, `https://site/a.js` is requested as
/// `{relay}https%3A%2F%2Fsite%2Fa.js`, the addressing used by CORS relays.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    relay: Option<String>,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        Self::with_options(10, DEFAULT_USER_AGENT, None)
    }

    pub fn with_options(timeout_secs: u64, user_agent: &str, relay: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs((timeout_secs / 2).max(1)))
            .pool_max_idle_per_host(20)
            .pool_idle_timeout(Duration::from_secs(90))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self {
            client,
            relay: relay.filter(|r| !r.trim().is_empty()),
        })
    }

    pub fn relay(&self) -> Option<&str> {
        self.relay.as_deref()
    }

    /// The URL actually requested for `url`.
    pub fn request_url(&self, url: &str) -> String {
        match &self.relay {
            Some(prefix) => {
                let encoded: String = form_urlencoded::byte_serialize(url.as_bytes()).collect();
                format!("{}{}", prefix, encoded)
            }
            None => url.to_string(),
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> std::result::Result<String, FetchError> {
        let target = self.request_url(url);
        debug!("Fetching {} via {}", url, target);

        let response = match self.client.get(&target).send().await {
            Ok(response) => response,
            Err(e) if self.relay.is_some() => {
                return Err(FetchError::Relay {
                    url: url.to_string(),
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(FetchError::Http(e)),
        };

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}
