//! Client for Bark-style push gateways.
//!
//! A push goes through four stages, each of which can fail on its own:
//!
//! 1. [`NotificationRequest::validate`] checks routing, content and
//!    encryption parameters.
//! 2. [`payload::assemble`] serialises the request, or encrypts it into an
//!    envelope when an [`EncryptionSpec`] is attached.
//! 3. A [`Transport`] POSTs the bytes to `<server>/push`.
//! 4. [`client::interpret_response`] maps the gateway's `{"code", "message"}`
//!    answer to success or [`DeliveryError`].
//!
//! Stages 1 and 2 are pure and synchronous; only stage 3 performs I/O.
//!
//! ```no_run
//! # async fn run() -> Result<(), bark::PushError> {
//! use bark::{Client, EncryptionSpec, NotificationRequest};
//!
//! let req = NotificationRequest::new("device-key", "Build finished")
//!     .with_title("CI")
//!     .with_encryption(EncryptionSpec::new("GCM", *b"0123456789abcdef", *b"unique-nonce"));
//! Client::new("bark.example.com").push(&req).await
//! # }
//! ```

pub mod client;
pub mod crypto;
pub mod error;
pub mod payload;
pub mod transport;

pub use bark_common::{EncMode, EncryptionSpec, NotificationRequest, PushResponse, ValidationError};
pub use client::{default_client, Client};
pub use crypto::CipherError;
pub use error::{AssemblyError, DeliveryError, PushError};
pub use transport::{HyperTransport, Transport, TransportError};
