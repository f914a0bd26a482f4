//! Request facade: environment name in, `get` / `post` / `delete` out.
//!
//! [`create_requests`] builds a fresh client on every call. [`RequestsFactory`]
//! keeps one client per environment for callers that construct facades often.

pub mod factory;
pub mod requests;

pub use factory::RequestsFactory;
pub use requests::{create_requests, create_requests_in, HttpRequests};
