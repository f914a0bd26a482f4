use crate::environment::EnvironmentConfig;
use crate::transport::ClientSettings;
use crate::{Error, ErrorContext, Result};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// A configured HTTP client scoped to one environment.
///
/// Cloning is cheap: clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct ClientHandle {
    environment: Arc<EnvironmentConfig>,
    base_url: Url,
    timeout: Duration,
    pub(crate) client: reqwest::Client,
}

impl ClientHandle {
    pub fn environment(&self) -> &EnvironmentConfig {
        &self.environment
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolve a request path against the base URL.
    ///
    /// Absolute `http`/`https` URLs pass through unchanged and protocol-relative
    /// ones (`//host/path`) take the base URL's scheme. Anything else is
    /// appended to the base URL, so a base path such as `/api` is kept.
    pub fn resolve(&self, path: &str) -> Result<Url> {
        if let Ok(url) = Url::parse(path) {
            if matches!(url.scheme(), "http" | "https") {
                return Ok(url);
            }
        }
        if path.starts_with("//") {
            return Url::parse(&format!("{}:{}", self.base_url.scheme(), path))
                .map_err(|e| url_error(path, e));
        }

        let base = self.base_url.as_str().trim_end_matches('/');
        let joined = if path.is_empty() {
            base.to_string()
        } else {
            format!("{}/{}", base, path.trim_start_matches('/'))
        };
        Url::parse(&joined).map_err(|e| url_error(path, e))
    }
}

fn url_error(path: &str, e: url::ParseError) -> Error {
    Error::configuration_with_context(
        format!("Cannot build request URL from \"{}\"", path),
        ErrorContext::new()
            .with_details(e.to_string())
            .with_source("client_handle"),
    )
}

/// Builds [`ClientHandle`]s from registry entries.
#[derive(Debug, Clone, Default)]
pub struct ClientBuilder {
    settings: ClientSettings,
}

impl ClientBuilder {
    /// Builder with the fixed policy defaults and no environment overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder whose ambient knobs come from `ENV_HTTP_*` variables.
    pub fn from_env() -> Self {
        Self {
            settings: ClientSettings::from_env(),
        }
    }

    pub fn with_settings(settings: ClientSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Construct a client for `config`. No network I/O happens here.
    pub fn build(&self, config: &EnvironmentConfig) -> Result<ClientHandle> {
        let base_url = config.url()?;
        let client = self.settings.build_client()?;
        tracing::debug!(
            environment = %config.name,
            base_url = %base_url,
            timeout_ms = self.settings.timeout.as_millis() as u64,
            "Built HTTP client"
        );
        Ok(ClientHandle {
            environment: Arc::new(config.clone()),
            base_url,
            timeout: self.settings.timeout,
            client,
        })
    }
}

/// Build a client for `config` with the default policy.
pub fn build(config: &EnvironmentConfig) -> Result<ClientHandle> {
    ClientBuilder::from_env().build(config)
}
