//! Common types, request model, and validation shared across the Bark push crates.

pub mod error;
pub mod protocol;
pub mod validate;

pub use error::ValidationError;
pub use protocol::{EncMode, EncryptionSpec, NotificationRequest, PushResponse};
