//! # env-http
//!
//! Environment-scoped HTTP request helpers on top of `reqwest`.
//!
//! ## Overview
//!
//! An environment name (`development`, `debug`, `production`, or any entry
//! added to an [`EnvironmentRegistry`]) resolves to a base URL. From it the
//! crate builds a client with a fixed 10 second timeout and a form-urlencoded
//! content type, and exposes `get`, `post` and `delete` callables. Every call
//! returns a `{ res, cancel }` pair: `res` is a deferred request that runs
//! only when awaited, `cancel` aborts it at any time.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use env_http::{create_requests, Params, RequestOutcome};
//!
//! #[tokio::main]
//! async fn main() -> env_http::Result<()> {
//!     let api = create_requests("development")?;
//!
//!     let prepared = api.post.call("/items", Params::new().with("name", "x"), None);
//!     let cancel = prepared.cancel.clone();
//!     tokio::spawn(async move {
//!         tokio::time::sleep(std::time::Duration::from_secs(2)).await;
//!         cancel.cancel();
//!     });
//!
//!     match prepared.res.execute().await? {
//!         RequestOutcome::Completed(resp) => println!("{} {}", resp.status, resp.text()),
//!         RequestOutcome::Cancelled => println!("cancelled"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`environment`] | Environment registry (name → base URL) |
//! | [`params`] | Typed request parameters and URL encoding |
//! | [`client`] | Client builder, per-verb callables, cancellation |
//! | [`facade`] | `create_requests` and the cached [`RequestsFactory`] |
//! | [`transport`] | `reqwest` client settings and transport errors |

pub mod client;
pub mod environment;
pub mod facade;
pub mod params;
pub mod transport;

// Re-export main types for convenience
pub use client::{
    create_method, CancelHandle, ClientBuilder, ClientHandle, DeferredRequest, HttpMethod,
    HttpResponse, PreparedRequest, RequestMethod, RequestOptions, RequestOutcome,
};
pub use environment::{EnvironmentConfig, EnvironmentRegistry};
pub use facade::{create_requests, create_requests_in, HttpRequests, RequestsFactory};
pub use params::{ParamValue, Params};
pub use transport::ClientSettings;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
