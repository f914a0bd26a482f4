use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

/// One-shot abort capability bound to a single request.
///
/// Cancelling is idempotent and safe at any time: before the request is
/// executed, while it is in flight, or after it settled.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Completes once [`cancel`](Self::cancel) has been called.
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }
}

/// A fully received response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> crate::Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| {
            crate::Error::serialization_with_context(
                e.to_string(),
                crate::ErrorContext::new().with_source("response_body"),
            )
        })
    }
}

/// Result of one executed request. Failures are reported as `Err(Error)`.
#[derive(Debug, Clone)]
pub enum RequestOutcome {
    Completed(HttpResponse),
    Cancelled,
}

impl RequestOutcome {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RequestOutcome::Cancelled)
    }

    pub fn response(&self) -> Option<&HttpResponse> {
        match self {
            RequestOutcome::Completed(resp) => Some(resp),
            RequestOutcome::Cancelled => None,
        }
    }

    pub fn into_response(self) -> Option<HttpResponse> {
        match self {
            RequestOutcome::Completed(resp) => Some(resp),
            RequestOutcome::Cancelled => None,
        }
    }
}
