//! Pre-flight checks on a [`NotificationRequest`].
//!
//! Checks run in a fixed order and the first failure wins. Only presence of
//! the IV/nonce is checked here; exact lengths are enforced again by the
//! cipher layer, which has to be safe to call on its own.

use crate::error::ValidationError;
use crate::protocol::{EncMode, NotificationRequest};

/// AES key lengths accepted for AES-128, AES-192 and AES-256.
pub const VALID_KEY_LENGTHS: [usize; 3] = [16, 24, 32];

impl NotificationRequest {
    /// Check routing, content and encryption parameters.
    ///
    /// Takes `&self` and never normalises in place.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] in this order: missing device key,
    /// missing content, bad key length, unknown mode, missing CBC IV, missing
    /// GCM nonce.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.device_key.is_empty() && self.device_keys.is_empty() {
            return Err(ValidationError::MissingDeviceKey);
        }

        if self.title.is_empty() && self.body.is_empty() && self.markdown.is_empty() {
            return Err(ValidationError::MissingContent);
        }

        if let Some(enc) = &self.enc {
            if !VALID_KEY_LENGTHS.contains(&enc.key.len()) {
                return Err(ValidationError::InvalidKeyLength(enc.key.len()));
            }

            match enc.parsed_mode()? {
                EncMode::Cbc if enc.iv.is_empty() => return Err(ValidationError::MissingIv),
                EncMode::Gcm if enc.iv.is_empty() => return Err(ValidationError::MissingNonce),
                EncMode::Ecb | EncMode::Cbc | EncMode::Gcm => {}
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::EncryptionSpec;

    const KEY16: &[u8] = b"1234567890abcdef";
    const IV16: &[u8] = b"1111111111111111";

    fn base() -> NotificationRequest {
        NotificationRequest::new("abc", "B").with_title("T")
    }

    #[test]
    fn accepts_plain_request() {
        assert_eq!(base().validate(), Ok(()));
    }

    #[test]
    fn accepts_device_keys_only() {
        let req = NotificationRequest {
            device_keys: vec!["a".into(), "b".into()],
            markdown: "**hi**".into(),
            ..NotificationRequest::default()
        };
        assert_eq!(req.validate(), Ok(()));
    }

    #[test]
    fn rejects_missing_device_key() {
        let req = NotificationRequest {
            body: "B".into(),
            ..NotificationRequest::default()
        };
        assert_eq!(req.validate(), Err(ValidationError::MissingDeviceKey));
    }

    #[test]
    fn device_key_checked_before_content() {
        assert_eq!(
            NotificationRequest::default().validate(),
            Err(ValidationError::MissingDeviceKey)
        );
    }

    #[test]
    fn rejects_missing_content() {
        let req = NotificationRequest {
            device_key: "abc".into(),
            subtitle: "only a subtitle".into(),
            ..NotificationRequest::default()
        };
        assert_eq!(req.validate(), Err(ValidationError::MissingContent));
    }

    #[test]
    fn rejects_short_key() {
        let req = base().with_encryption(EncryptionSpec::new("CBC", vec![0u8; 15], IV16.to_vec()));
        assert_eq!(req.validate(), Err(ValidationError::InvalidKeyLength(15)));
    }

    #[test]
    fn accepts_all_aes_key_sizes() {
        for len in VALID_KEY_LENGTHS {
            let req = base().with_encryption(EncryptionSpec::new("ecb", vec![7u8; len], Vec::new()));
            assert_eq!(req.validate(), Ok(()), "key length {len}");
        }
    }

    #[test]
    fn key_length_checked_before_mode() {
        let req = base().with_encryption(EncryptionSpec::new("CTR", vec![0u8; 5], Vec::new()));
        assert_eq!(req.validate(), Err(ValidationError::InvalidKeyLength(5)));
    }

    #[test]
    fn rejects_unknown_mode() {
        let req = base().with_encryption(EncryptionSpec::new("OFB", KEY16.to_vec(), IV16.to_vec()));
        assert_eq!(
            req.validate(),
            Err(ValidationError::UnsupportedMode("OFB".into()))
        );
    }

    #[test]
    fn rejects_cbc_without_iv() {
        let req = base().with_encryption(EncryptionSpec::new("cbc", KEY16.to_vec(), Vec::new()));
        assert_eq!(req.validate(), Err(ValidationError::MissingIv));
    }

    #[test]
    fn rejects_gcm_without_nonce() {
        let req = base().with_encryption(EncryptionSpec::new("GCM", KEY16.to_vec(), Vec::new()));
        assert_eq!(req.validate(), Err(ValidationError::MissingNonce));
    }

    #[test]
    fn gcm_nonce_length_not_enforced_here() {
        // Any non-empty nonce passes; the cipher layer enforces 12 bytes.
        let req = base().with_encryption(EncryptionSpec::new("GCM", KEY16.to_vec(), vec![1u8; 5]));
        assert_eq!(req.validate(), Ok(()));
    }

    #[test]
    fn ecb_needs_no_iv() {
        let req = base().with_encryption(EncryptionSpec::new("ECB", KEY16.to_vec(), Vec::new()));
        assert_eq!(req.validate(), Ok(()));
    }

    #[test]
    fn validation_leaves_request_untouched() {
        let mut req = base();
        req.volume = Some(42);
        let before = req.clone();
        let _ = req.validate();
        assert_eq!(req, before);
    }
}
