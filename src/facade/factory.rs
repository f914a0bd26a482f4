use crate::client::{ClientBuilder, ClientHandle};
use crate::environment::EnvironmentRegistry;
use crate::facade::HttpRequests;
use crate::Result;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};

const DEFAULT_CACHE_CAPACITY: usize = 16;

/// Facade constructor that reuses one client per environment.
pub struct RequestsFactory {
    registry: EnvironmentRegistry,
    builder: ClientBuilder,
    cache: Mutex<LruCache<String, ClientHandle>>,
}

impl RequestsFactory {
    /// Factory over the default registry.
    pub fn new() -> Self {
        Self::with_registry(EnvironmentRegistry::global().clone())
    }

    pub fn with_registry(registry: EnvironmentRegistry) -> Self {
        Self {
            registry,
            builder: ClientBuilder::from_env(),
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(DEFAULT_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN),
            )),
        }
    }

    /// Replace the client builder. Clears cached clients.
    pub fn with_builder(mut self, builder: ClientBuilder) -> Self {
        self.builder = builder;
        self.lock().clear();
        self
    }

    pub fn registry(&self) -> &EnvironmentRegistry {
        &self.registry
    }

    /// Request helpers for `environment`, building its client on first use.
    pub fn requests(&self, environment: &str) -> Result<HttpRequests> {
        Ok(HttpRequests::from_client(self.client(environment)?))
    }

    /// Cached client for `environment`.
    pub fn client(&self, environment: &str) -> Result<ClientHandle> {
        if let Some(client) = self.lock().get(environment) {
            return Ok(client.clone());
        }

        let config = self.registry.lookup(environment)?;
        let client = self.builder.build(config)?;
        let mut cache = self.lock();
        // Another caller may have raced us here; keep the first client.
        let cached = cache.get_or_insert(environment.to_string(), || client);
        Ok(cached.clone())
    }

    pub fn cached_environments(&self) -> usize {
        self.lock().len()
    }

    /// Drop every cached client.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, ClientHandle>> {
        // Cached handles stay valid even if a holder panicked.
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for RequestsFactory {
    fn default() -> Self {
        Self::new()
    }
}
