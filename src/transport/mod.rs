//! Thin layer over `reqwest`: client construction and transport errors.

pub mod http;

pub use http::{ClientSettings, TransportError, DEFAULT_CONTENT_TYPE, DEFAULT_TIMEOUT};
