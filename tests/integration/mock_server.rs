//! Mock HTTP server setup for integration tests

use env_http::{create_requests_in, EnvironmentConfig, EnvironmentRegistry, HttpRequests};
use mockito::{Server, ServerGuard};
use std::net::SocketAddr;
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;

/// Test fixture that manages a mock server registered as an environment
pub struct MockServerFixture {
    pub server: ServerGuard,
    pub registry: EnvironmentRegistry,
}

impl MockServerFixture {
    pub const ENV: &'static str = "mock";

    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let registry = EnvironmentRegistry::new()
            .with(EnvironmentConfig::new(Self::ENV, server.url()))
            .expect("mock server URL is a valid base URL");
        Self { server, registry }
    }

    /// Request helpers bound to the mock server
    pub fn requests(&self) -> HttpRequests {
        create_requests_in(&self.registry, Self::ENV).expect("mock environment is registered")
    }
}

/// A server that accepts connections and never answers.
///
/// Requests against it stay in flight until cancelled or timed out.
pub struct SilentServer {
    pub addr: SocketAddr,
    task: tokio::task::JoinHandle<()>,
}

impl SilentServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let task = tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                tokio::spawn(async move {
                    let mut buf = [0u8; 1024];
                    while let Ok(n) = socket.read(&mut buf).await {
                        if n == 0 {
                            break;
                        }
                    }
                });
            }
        });
        Self { addr, task }
    }

    pub fn requests(&self) -> HttpRequests {
        let registry = EnvironmentRegistry::new()
            .with(EnvironmentConfig::new("silent", format!("http://{}", self.addr)))
            .expect("valid base URL");
        create_requests_in(&registry, "silent").expect("silent environment is registered")
    }
}

impl Drop for SilentServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}
