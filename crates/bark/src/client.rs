//! [`Client`]: validate, assemble, send, interpret.

use std::sync::OnceLock;

use bark_common::{NotificationRequest, PushResponse};
use bytes::Bytes;
use tracing::{debug, info};

use crate::error::{DeliveryError, PushError};
use crate::payload;
use crate::transport::{HyperTransport, OutboundRequest, Transport, JSON_CONTENT_TYPE};

/// Host of the public Bark gateway.
pub const DEFAULT_DOMAIN: &str = "api.day.app";

/// Base URL used when none is configured.
pub const DEFAULT_URL: &str = "https://api.day.app";

/// Push client bound to one gateway.
///
/// Holds no per-request state, so a single instance can serve any number of
/// concurrent pushes.
#[derive(Debug, Clone)]
pub struct Client<T = HyperTransport> {
    server_url: String,
    transport: T,
}

impl Client<HyperTransport> {
    /// A client for `server_url` using the default HTTPS transport.
    ///
    /// See [`normalize_server_url`] for how the URL is cleaned up.
    pub fn new(server_url: &str) -> Self {
        Self::with_transport(server_url, HyperTransport::new())
    }
}

impl<T: Transport> Client<T> {
    /// A client for `server_url` that delivers through `transport`.
    pub fn with_transport(server_url: &str, transport: T) -> Self {
        Self {
            server_url: normalize_server_url(server_url),
            transport,
        }
    }

    /// The normalised base URL, without trailing slash.
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Validate, assemble and deliver `req`.
    ///
    /// Validation and assembly finish before any network I/O, so a rejected
    /// request never reaches the gateway.
    ///
    /// # Errors
    ///
    /// Returns [`PushError`] describing the first failing stage.
    pub async fn push(&self, req: &NotificationRequest) -> Result<(), PushError> {
        req.validate()?;
        let body = payload::assemble(req)?;

        let url = format!("{}/push", self.server_url);
        debug!(
            url = %url,
            encrypted = req.enc.is_some(),
            bytes = body.len(),
            "sending push"
        );

        let resp = self
            .transport
            .send(OutboundRequest {
                url,
                body: Bytes::from(body),
                content_type: JSON_CONTENT_TYPE,
            })
            .await?;

        interpret_response(resp.status, &resp.body)?;
        info!(status = resp.status, "push accepted");
        Ok(())
    }
}

/// Lazily built client for [`DEFAULT_URL`], shared by the whole process.
///
/// Immutable after construction; the underlying connection pool is
/// internally synchronised.
pub fn default_client() -> &'static Client {
    static DEFAULT: OnceLock<Client> = OnceLock::new();
    DEFAULT.get_or_init(|| Client::new(DEFAULT_URL))
}

/// Normalise a gateway base URL.
///
/// - empty input selects [`DEFAULT_URL`];
/// - trailing slashes are removed;
/// - `https://` is prepended when no `http://` or `https://` scheme is present.
pub fn normalize_server_url(server_url: &str) -> String {
    let trimmed = server_url.trim();
    if trimmed.is_empty() {
        return DEFAULT_URL.to_owned();
    }
    let trimmed = trimmed.trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_owned()
    } else {
        format!("https://{trimmed}")
    }
}

/// Decide whether a gateway response means success.
///
/// # Errors
///
/// - [`DeliveryError::UnexpectedResponse`] with the HTTP status and raw body
///   when the body is not a `{"code", "message"}` object.
/// - [`DeliveryError::Rejected`] when `code != 200`.
pub fn interpret_response(status: u16, body: &[u8]) -> Result<(), DeliveryError> {
    let parsed: PushResponse =
        serde_json::from_slice(body).map_err(|_| DeliveryError::UnexpectedResponse {
            status,
            body: String::from_utf8_lossy(body).into_owned(),
        })?;

    if !parsed.is_success() {
        return Err(DeliveryError::Rejected {
            code: parsed.code,
            message: parsed.message,
        });
    }
    Ok(())
}
