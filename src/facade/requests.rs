use crate::client::{builder, create_method, ClientHandle, HttpMethod, RequestMethod};
use crate::environment::EnvironmentRegistry;
use crate::Result;

/// The `get`, `post` and `delete` callables for one environment.
#[derive(Debug, Clone)]
pub struct HttpRequests {
    pub get: RequestMethod,
    pub post: RequestMethod,
    pub delete: RequestMethod,
}

impl HttpRequests {
    /// Bind all three verbs to `client`.
    pub fn from_client(client: ClientHandle) -> Self {
        Self {
            get: create_method(HttpMethod::Get, client.clone()),
            post: create_method(HttpMethod::Post, client.clone()),
            delete: create_method(HttpMethod::Delete, client),
        }
    }

    pub fn client(&self) -> &ClientHandle {
        self.get.client()
    }

    pub fn environment(&self) -> &str {
        &self.client().environment().name
    }

    /// The callable for `method`.
    pub fn method(&self, method: HttpMethod) -> &RequestMethod {
        match method {
            HttpMethod::Get => &self.get,
            HttpMethod::Post => &self.post,
            HttpMethod::Delete => &self.delete,
        }
    }
}

/// Build request helpers for an environment of the default registry.
///
/// Fails with [`Error::Configuration`](crate::Error::Configuration) for an
/// unknown name, before any client is built.
pub fn create_requests(environment: &str) -> Result<HttpRequests> {
    create_requests_in(EnvironmentRegistry::global(), environment)
}

/// [`create_requests`] against a caller-supplied registry.
pub fn create_requests_in(registry: &EnvironmentRegistry, environment: &str) -> Result<HttpRequests> {
    let config = registry.lookup(environment)?;
    let client = builder::build(config)?;
    Ok(HttpRequests::from_client(client))
}
