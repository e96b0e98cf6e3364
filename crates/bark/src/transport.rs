//! HTTP delivery of assembled payloads.
//!
//! [`Transport`] is the only place the crate performs I/O. [`HyperTransport`]
//! is the default: a pooled hyper-util client behind a hyper-rustls connector
//! (webpki roots, ring provider) that speaks both `http` and `https`.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::header::CONTENT_TYPE;
use hyper::{Method, Request};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use thiserror::Error;
use tracing::debug;

/// Content type of every push body.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Default connect and whole-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Boxed `Send` future returned by [`Transport::send`].
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// Errors raised while exchanging a request with the gateway.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The URL or headers could not form a valid HTTP request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Connecting or sending failed.
    #[error("request failed: {0}")]
    Request(String),

    /// The response body could not be read.
    #[error("failed to read response body: {0}")]
    Body(String),

    /// No complete response arrived in time.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

/// A POST ready to go on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    pub url: String,
    pub body: Bytes,
    pub content_type: &'static str,
}

/// Status and raw body of a gateway response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Bytes,
}

/// Sends one request and returns the raw response.
///
/// Implementations own pooling, TLS and timeouts. They must not retry.
#[cfg_attr(test, mockall::automock)]
pub trait Transport: Send + Sync {
    fn send(&self, request: OutboundRequest) -> BoxFuture<Result<RawResponse, TransportError>>;
}

type HttpsClient = Client<HttpsConnector<HttpConnector>, Full<Bytes>>;

/// Default [`Transport`] over hyper + rustls.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone, Debug)]
pub struct HyperTransport {
    client: HttpsClient,
    timeout: Duration,
}

impl HyperTransport {
    /// A transport with [`DEFAULT_TIMEOUT`].
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// A transport whose connect phase and whole exchange are bounded by `timeout`.
    pub fn with_timeout(timeout: Duration) -> Self {
        let mut http = HttpConnector::new();
        http.enforce_http(false);
        http.set_connect_timeout(Some(timeout));

        let https = hyper_rustls::HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .wrap_connector(http);

        Self {
            client: Client::builder(TokioExecutor::new()).build(https),
            timeout,
        }
    }

    /// The configured request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HyperTransport {
    fn send(&self, request: OutboundRequest) -> BoxFuture<Result<RawResponse, TransportError>> {
        let client = self.client.clone();
        let timeout = self.timeout;

        Box::pin(async move {
            let req = Request::builder()
                .method(Method::POST)
                .uri(request.url.as_str())
                .header(CONTENT_TYPE, request.content_type)
                .body(Full::new(request.body))
                .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

            let exchange = async {
                let resp = client
                    .request(req)
                    .await
                    .map_err(|e| TransportError::Request(e.to_string()))?;
                let status = resp.status().as_u16();
                let body = resp
                    .into_body()
                    .collect()
                    .await
                    .map_err(|e| TransportError::Body(e.to_string()))?
                    .to_bytes();
                debug!(status, bytes = body.len(), "gateway responded");
                Ok::<_, TransportError>(RawResponse { status, body })
            };

            tokio::time::timeout(timeout, exchange)
                .await
                .map_err(|_| TransportError::Timeout(timeout))?
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timeout_is_ten_seconds() {
        assert_eq!(HyperTransport::default().timeout(), Duration::from_secs(10));
    }

    #[tokio::test]
    async fn rejects_malformed_url() {
        let transport = HyperTransport::new();
        let err = transport
            .send(OutboundRequest {
                url: "http://exa mple.com/push".into(),
                body: Bytes::from_static(b"{}"),
                content_type: JSON_CONTENT_TYPE,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn unreachable_host_is_a_request_error() {
        // Port 9 on loopback (discard) is closed on test hosts.
        let transport = HyperTransport::with_timeout(Duration::from_secs(2));
        let err = transport
            .send(OutboundRequest {
                url: "http://127.0.0.1:9/push".into(),
                body: Bytes::from_static(b"{}"),
                content_type: JSON_CONTENT_TYPE,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TransportError::Request(_) | TransportError::Timeout(_)
        ));
    }
}
