use crate::Result;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Proxy;
use std::env;
use std::time::Duration;

/// Fixed request timeout applied to every client.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Content type sent with every request unless a call overrides it.
pub const DEFAULT_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 32;

/// Settings used to construct the underlying `reqwest::Client`.
///
/// Timeout and content type are fixed policy. The remaining knobs are
/// ambient and may be supplied through the process environment:
/// - `ENV_HTTP_PROXY_URL` (the only proxy source; `HTTP_PROXY` and friends are ignored)
/// - `ENV_HTTP_POOL_MAX_IDLE_PER_HOST` (default 32)
/// - `ENV_HTTP_USER_AGENT` (default `env-http/<version>`)
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub timeout: Duration,
    pub content_type: &'static str,
    pub pool_max_idle_per_host: usize,
    pub proxy_url: Option<String>,
    pub user_agent: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            content_type: DEFAULT_CONTENT_TYPE,
            pool_max_idle_per_host: DEFAULT_POOL_MAX_IDLE_PER_HOST,
            proxy_url: None,
            user_agent: default_user_agent(),
        }
    }
}

impl ClientSettings {
    /// Defaults overlaid with the `ENV_HTTP_*` environment variables.
    pub fn from_env() -> Self {
        let pool_max_idle_per_host = env::var("ENV_HTTP_POOL_MAX_IDLE_PER_HOST")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(DEFAULT_POOL_MAX_IDLE_PER_HOST);

        Self {
            pool_max_idle_per_host,
            proxy_url: env::var("ENV_HTTP_PROXY_URL").ok().filter(|s| !s.is_empty()),
            user_agent: env::var("ENV_HTTP_USER_AGENT")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(default_user_agent),
            ..Self::default()
        }
    }

    pub fn with_proxy(mut self, proxy_url: impl Into<String>) -> Self {
        self.proxy_url = Some(proxy_url.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub(crate) fn default_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(self.content_type));
        headers
    }

    /// Build a `reqwest::Client` from these settings. Performs no network I/O.
    pub(crate) fn build_client(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .default_headers(self.default_headers())
            .user_agent(self.user_agent.as_str())
            .pool_max_idle_per_host(self.pool_max_idle_per_host);

        // Proxying is opt-in through `proxy_url`; system proxy variables are not consulted.
        builder = match self.proxy_url.as_deref().map(|url| (url, Proxy::all(url))) {
            Some((_, Ok(proxy))) => builder.proxy(proxy),
            Some((url, Err(e))) => {
                tracing::warn!(proxy = %url, error = %e, "Ignoring invalid proxy URL");
                builder.no_proxy()
            }
            None => builder.no_proxy(),
        };

        builder
            .build()
            .map_err(|e| crate::Error::Transport(TransportError::Other(e.to_string())))
    }
}

fn default_user_agent() -> String {
    format!("env-http/{}", env!("CARGO_PKG_VERSION"))
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Other(String),
}
