//! Per-verb request callables with deferred execution and cancellation.
//!
//! ```rust,no_run
//! # async fn demo() -> env_http::Result<()> {
//! use env_http::{create_requests, Params, RequestOutcome};
//!
//! let api = create_requests("development")?;
//! let prepared = api.get.call("/items", Params::new().with("page", 1), None);
//! let cancel = prepared.cancel.clone();
//!
//! match prepared.res.execute().await? {
//!     RequestOutcome::Completed(resp) => println!("{}", resp.text()),
//!     RequestOutcome::Cancelled => println!("cancelled"),
//! }
//! cancel.cancel(); // no-op once settled
//! # Ok(())
//! # }
//! ```

use crate::client::builder::ClientHandle;
use crate::client::types::{CancelHandle, HttpResponse, RequestOutcome};
use crate::params::{self, Params};
use crate::transport::TransportError;
use crate::{Error, ErrorContext, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::Instrument;
use uuid::Uuid;

/// Header carrying the per-call correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Verbs exposed by the request facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// POST carries the encoded params as its body; GET and DELETE as the query.
    pub fn sends_body(&self) -> bool {
        matches!(self, HttpMethod::Post)
    }

    fn to_reqwest(self) -> reqwest::Method {
        match self {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "DELETE" => Ok(HttpMethod::Delete),
            _ => Err(Error::UnsupportedMethod(s.to_string())),
        }
    }
}

/// Per-call options merged over the client defaults.
///
/// A cancel handle supplied here is observed in addition to the handle
/// returned with the [`PreparedRequest`]; it never replaces it.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    headers: Vec<(String, String)>,
    timeout: Option<Duration>,
    cancel: Option<CancelHandle>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header. Later values for the same name win, including over the default content type.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Override the client timeout for this call only.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Abort this call when `cancel` fires as well.
    pub fn with_cancel(mut self, cancel: CancelHandle) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

/// A callable bound to one verb and one client.
#[derive(Debug, Clone)]
pub struct RequestMethod {
    method: HttpMethod,
    client: ClientHandle,
}

/// Create the callable for `method` on `client`.
pub fn create_method(method: HttpMethod, client: ClientHandle) -> RequestMethod {
    RequestMethod::new(method, client)
}

impl RequestMethod {
    pub fn new(method: HttpMethod, client: ClientHandle) -> Self {
        Self { method, client }
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn client(&self) -> &ClientHandle {
        &self.client
    }

    /// Prepare a request. Nothing is sent until `res.execute()` is awaited.
    ///
    /// Encoding errors are reported by `execute()`, never here.
    pub fn call(
        &self,
        url: &str,
        params: impl Into<Option<Params>>,
        options: impl Into<Option<RequestOptions>>,
    ) -> PreparedRequest {
        let cancel = CancelHandle::new();
        let params = params.into();
        let payload = params::encode(params.as_ref());

        let res = DeferredRequest {
            method: self.method,
            client: self.client.clone(),
            url: url.to_string(),
            payload,
            options: options.into().unwrap_or_default(),
            cancel: cancel.clone(),
            request_id: Uuid::new_v4(),
        };
        PreparedRequest { res, cancel }
    }
}

/// The `{ res, cancel }` pair returned by [`RequestMethod::call`].
#[derive(Debug)]
pub struct PreparedRequest {
    pub res: DeferredRequest,
    pub cancel: CancelHandle,
}

impl PreparedRequest {
    pub fn into_parts(self) -> (DeferredRequest, CancelHandle) {
        (self.res, self.cancel)
    }

    /// Execute, discarding the cancel handle.
    pub async fn execute(self) -> Result<RequestOutcome> {
        self.res.execute().await
    }
}

/// A prepared request that runs when [`execute`](Self::execute) is awaited.
#[derive(Debug)]
pub struct DeferredRequest {
    method: HttpMethod,
    client: ClientHandle,
    url: String,
    payload: Result<String>,
    options: RequestOptions,
    cancel: CancelHandle,
    request_id: Uuid,
}

impl DeferredRequest {
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Encoded params, or the encoding error that `execute()` will return.
    pub fn payload(&self) -> std::result::Result<&str, &Error> {
        self.payload.as_deref()
    }

    /// Run the request.
    ///
    /// Resolves to `Cancelled` if either cancel handle fired before or during
    /// the call. Any other failure is logged and returned as `Err`.
    pub async fn execute(self) -> Result<RequestOutcome> {
        let span = tracing::debug_span!(
            "http_request",
            method = %self.method,
            url = %self.url,
            environment = %self.client.environment().name,
            request_id = %self.request_id,
        );
        self.run().instrument(span).await
    }

    async fn run(self) -> Result<RequestOutcome> {
        let DeferredRequest {
            method,
            client,
            url,
            payload,
            options,
            cancel,
            request_id,
        } = self;
        let external = options.cancel.clone();

        let cancelled_early =
            cancel.is_cancelled() || external.as_ref().is_some_and(|c| c.is_cancelled());
        if cancelled_early {
            tracing::info!("{} request canceled before dispatch", method);
            return Ok(RequestOutcome::Cancelled);
        }

        let abort = async {
            match &external {
                Some(ext) => {
                    tokio::select! {
                        _ = cancel.cancelled() => {}
                        _ = ext.cancelled() => {}
                    }
                }
                None => cancel.cancelled().await,
            }
        };

        let result = tokio::select! {
            biased;
            _ = abort => None,
            r = dispatch(method, &client, &url, payload, &options, request_id) => Some(r),
        };

        match result {
            None => {
                tracing::info!("{} request canceled", method);
                Ok(RequestOutcome::Cancelled)
            }
            Some(Ok(resp)) => Ok(RequestOutcome::Completed(resp)),
            Some(Err(e)) => {
                tracing::error!(error = %e, "{} request error", method);
                Err(e)
            }
        }
    }
}

async fn dispatch(
    method: HttpMethod,
    client: &ClientHandle,
    url: &str,
    payload: Result<String>,
    options: &RequestOptions,
    request_id: Uuid,
) -> Result<HttpResponse> {
    let payload = payload?;
    let mut target = client.resolve(url)?;

    let mut req = if method.sends_body() {
        client.client.request(method.to_reqwest(), target).body(payload)
    } else {
        if !payload.is_empty() {
            let query = match target.query() {
                Some(existing) if !existing.is_empty() => format!("{}&{}", existing, payload),
                _ => payload,
            };
            target.set_query(Some(&query));
        }
        client.client.request(method.to_reqwest(), target)
    };

    let mut headers = HeaderMap::new();
    for (name, value) in &options.headers {
        let (name, value) = parse_header(name, value)?;
        headers.insert(name, value);
    }
    req = req
        .headers(headers)
        .header(REQUEST_ID_HEADER, request_id.to_string());
    if let Some(timeout) = options.timeout {
        req = req.timeout(timeout);
    }

    tracing::debug!("Dispatching request");
    let resp = req.send().await.map_err(TransportError::from)?;
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = resp.bytes().await.map_err(TransportError::from)?;

    if !status.is_success() {
        let text = String::from_utf8_lossy(&body).into_owned();
        let message = if text.trim().is_empty() {
            status.canonical_reason().unwrap_or("unknown status").to_string()
        } else {
            text
        };
        return Err(Error::Remote {
            status: status.as_u16(),
            message,
        });
    }

    Ok(HttpResponse {
        status,
        headers,
        body,
    })
}

fn parse_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue)> {
    let invalid = |details: String| {
        Error::configuration_with_context(
            format!("Invalid request header \"{}\"", name),
            ErrorContext::new()
                .with_field_path("options.headers")
                .with_details(details)
                .with_source("request_options"),
        )
    };
    let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(e.to_string()))?;
    let header_value = HeaderValue::from_str(value).map_err(|e| invalid(e.to_string()))?;
    Ok((header_name, header_value))
}
