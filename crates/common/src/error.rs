//! Validation errors raised before any cryptographic or network work.

use thiserror::Error;

/// Reasons a [`NotificationRequest`](crate::NotificationRequest) is rejected
/// by [`NotificationRequest::validate`](crate::NotificationRequest::validate).
///
/// Every variant is a caller input problem; none of them are transient.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Neither `device_key` nor `device_keys` was set.
    #[error("device_key is required")]
    MissingDeviceKey,

    /// `title`, `body` and `markdown` are all empty.
    #[error("notification content is required (title, body or markdown)")]
    MissingContent,

    /// The encryption key is not 16, 24 or 32 bytes.
    #[error("encryption key length must be 16 (AES-128), 24 (AES-192) or 32 (AES-256) bytes, got {0}")]
    InvalidKeyLength(usize),

    /// The encryption mode string is not one of ECB, CBC or GCM.
    #[error("unsupported encryption mode: {0} (supported: CBC, ECB, GCM)")]
    UnsupportedMode(String),

    /// CBC was selected without an IV.
    #[error("CBC mode requires an IV")]
    MissingIv,

    /// GCM was selected without a nonce.
    #[error("GCM mode requires a nonce (iv field)")]
    MissingNonce,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_detail() {
        assert!(ValidationError::InvalidKeyLength(15).to_string().contains("15"));
        assert!(ValidationError::UnsupportedMode("CTR".into())
            .to_string()
            .contains("CTR"));
    }
}
