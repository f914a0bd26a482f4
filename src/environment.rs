//! Environment registry: named deployment targets and their base URLs.
//!
//! The process-wide default registry holds `development`, `debug` and
//! `production`. Additional targets can be registered programmatically or
//! loaded from YAML:
//!
//! ```yaml
//! environments:
//!   - name: staging
//!     base_url: https://www.staging.com
//! ```

use crate::{Error, ErrorContext, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// A named deployment target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    pub name: String,
    pub base_url: String,
}

impl EnvironmentConfig {
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
        }
    }

    /// Parsed base URL. Registered entries are always valid.
    pub fn url(&self) -> Result<Url> {
        parse_base_url(&self.name, &self.base_url)
    }
}

#[derive(Debug, Deserialize)]
struct RegistryFile {
    environments: Vec<EnvironmentConfig>,
}

static DEFAULT_REGISTRY: Lazy<EnvironmentRegistry> = Lazy::new(EnvironmentRegistry::builtin);

/// Ordered, name-unique set of [`EnvironmentConfig`] entries.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentRegistry {
    entries: Vec<EnvironmentConfig>,
}

impl EnvironmentRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared registry with the built-in environments.
    pub fn global() -> &'static EnvironmentRegistry {
        &DEFAULT_REGISTRY
    }

    fn builtin() -> Self {
        let entries = [
            ("development", "https://www.development.com"),
            ("debug", "https://www.debug.com"),
            ("production", "https://www.production.com"),
        ]
        .into_iter()
        .map(|(name, url)| EnvironmentConfig::new(name, url))
        .collect();
        Self { entries }
    }

    /// Add an entry. Duplicate names and invalid base URLs are rejected.
    pub fn register(&mut self, config: EnvironmentConfig) -> Result<()> {
        if config.name.trim().is_empty() {
            return Err(Error::configuration_with_context(
                "Environment name must not be empty",
                ErrorContext::new().with_source("environment_registry"),
            ));
        }
        if self.contains(&config.name) {
            return Err(Error::configuration_with_context(
                format!("Environment \"{}\" is already registered", config.name),
                ErrorContext::new()
                    .with_field_path("name")
                    .with_source("environment_registry"),
            ));
        }
        parse_base_url(&config.name, &config.base_url)?;
        self.entries.push(config);
        Ok(())
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, config: EnvironmentConfig) -> Result<Self> {
        self.register(config)?;
        Ok(self)
    }

    /// Look up an environment by name. There is no fallback environment.
    pub fn lookup(&self, name: &str) -> Result<&EnvironmentConfig> {
        self.entries.iter().find(|cfg| cfg.name == name).ok_or_else(|| {
            Error::configuration_with_context(
                format!("No configuration found for environment \"{}\"", name),
                ErrorContext::new()
                    .with_details(format!("known environments: {}", self.names().join(", ")))
                    .with_source("environment_registry"),
            )
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|cfg| cfg.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|cfg| cfg.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EnvironmentConfig> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse a YAML registry document. Entries go through [`register`](Self::register).
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let file: RegistryFile = serde_yaml::from_str(yaml)?;
        let mut registry = Self::new();
        for (idx, entry) in file.environments.into_iter().enumerate() {
            registry.register(entry).map_err(|e| match e {
                Error::Configuration { message, context } => Error::Configuration {
                    message,
                    context: context.with_field_path(format!("environments[{}]", idx)),
                },
                other => other,
            })?;
        }
        Ok(registry)
    }

    /// Load a YAML registry file from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }

    /// Add every entry of `other`, rejecting name clashes.
    pub fn extend_from(&mut self, other: EnvironmentRegistry) -> Result<()> {
        for entry in other.entries {
            self.register(entry)?;
        }
        Ok(())
    }
}

/// Look up an environment in the default registry.
pub fn lookup(name: &str) -> Result<&'static EnvironmentConfig> {
    EnvironmentRegistry::global().lookup(name)
}

fn parse_base_url(name: &str, base_url: &str) -> Result<Url> {
    let invalid = |details: String| {
        Error::configuration_with_context(
            format!("Invalid base URL for environment \"{}\"", name),
            ErrorContext::new()
                .with_field_path("base_url")
                .with_details(details)
                .with_source("environment_registry"),
        )
    };
    let url = Url::parse(base_url).map_err(|e| invalid(format!("{}: {}", base_url, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme \"{}\"", other))),
    }
}
