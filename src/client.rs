//! Client construction and per-verb request callables.
//!
//! Implementation details are split into submodules under `src/client/`.

pub mod builder;
pub mod method;
pub mod types;

pub use builder::{ClientBuilder, ClientHandle};
pub use method::{
    create_method, DeferredRequest, HttpMethod, PreparedRequest, RequestMethod, RequestOptions,
};
pub use types::{CancelHandle, HttpResponse, RequestOutcome};
