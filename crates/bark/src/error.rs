//! Error types for payload assembly, delivery, and the top-level push call.

use bark_common::ValidationError;
use thiserror::Error;

use crate::crypto::CipherError;
use crate::transport::TransportError;

/// The encrypted envelope cannot be built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblyError {
    /// No non-empty device key survived the routing merge, so the gateway
    /// could not route the envelope.
    #[error("missing device key for routing")]
    MissingRoutingKey,
}

/// The gateway could not be reached or did not accept the push.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The HTTP exchange itself failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The gateway answered with a JSON body whose `code` is not 200.
    #[error("bark error ({code}): {message}")]
    Rejected { code: i64, message: String },

    /// The response body was not the expected JSON object.
    #[error("unexpected response (status {status}): {body}")]
    UnexpectedResponse { status: u16, body: String },
}

/// Everything [`Client::push`](crate::Client::push) can fail with.
#[derive(Debug, Error)]
pub enum PushError {
    #[error("invalid notification: {0}")]
    Validation(#[from] ValidationError),

    #[error("encryption failed: {0}")]
    Crypto(#[from] CipherError),

    #[error("payload assembly failed: {0}")]
    Assembly(#[from] AssemblyError),

    #[error("failed to serialise payload: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("delivery failed: {0}")]
    Delivery(#[from] DeliveryError),
}

impl PushError {
    /// Whether repeating the same call could succeed.
    ///
    /// Only network failures and server-side (5xx) answers qualify; every
    /// other variant is a caller input problem. Nothing in this crate retries.
    pub fn is_retryable(&self) -> bool {
        match self {
            PushError::Delivery(DeliveryError::Transport(_)) => true,
            PushError::Delivery(DeliveryError::Rejected { code, .. }) => *code >= 500,
            PushError::Delivery(DeliveryError::UnexpectedResponse { status, .. }) => *status >= 500,
            PushError::Validation(_)
            | PushError::Crypto(_)
            | PushError::Assembly(_)
            | PushError::Serialization(_) => false,
        }
    }
}

impl From<TransportError> for PushError {
    fn from(e: TransportError) -> Self {
        PushError::Delivery(DeliveryError::Transport(e))
    }
}
