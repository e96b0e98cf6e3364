//! Request and response types exchanged with the Bark gateway.
//!
//! [`NotificationRequest`] serialises to the gateway's `POST /push` JSON body.
//! Empty strings, empty lists and unset numbers are omitted from the wire form;
//! numeric fields are `Option`s so that `badge = 0` stays distinct from "unset".

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

// ---------------------------------------------------------------------------
// Encryption options
// ---------------------------------------------------------------------------

/// Block cipher mode used to encrypt a notification payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EncMode {
    /// Electronic codebook. Identical plaintext blocks produce identical
    /// ciphertext blocks, so message structure leaks.
    Ecb,
    /// Cipher block chaining with a 16-byte IV.
    Cbc,
    /// Galois/counter mode (AEAD) with a 12-byte nonce.
    Gcm,
}

impl EncMode {
    /// Canonical upper-case name as understood by the gateway.
    pub fn as_str(self) -> &'static str {
        match self {
            EncMode::Ecb => "ECB",
            EncMode::Cbc => "CBC",
            EncMode::Gcm => "GCM",
        }
    }
}

impl fmt::Display for EncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EncMode {
    type Err = ValidationError;

    /// Parse a mode name, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ECB" => Ok(EncMode::Ecb),
            "CBC" => Ok(EncMode::Cbc),
            "GCM" => Ok(EncMode::Gcm),
            _ => Err(ValidationError::UnsupportedMode(s.to_owned())),
        }
    }
}

/// Symmetric encryption parameters for a single request.
///
/// `mode` is kept as the caller supplied it and normalised through
/// [`EncMode::from_str`] wherever it is consumed. `iv` holds the CBC IV or the
/// GCM nonce and is ignored for ECB.
///
/// Key and IV bytes are zeroed on drop and never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptionSpec {
    /// Mode name, e.g. `"cbc"` or `"GCM"`.
    pub mode: String,
    /// AES key: 16, 24 or 32 bytes.
    pub key: Vec<u8>,
    /// CBC IV (16 bytes) or GCM nonce (12 bytes). Empty for ECB.
    pub iv: Vec<u8>,
}

impl EncryptionSpec {
    /// Construct a spec from a mode name, key and IV/nonce.
    pub fn new(mode: impl Into<String>, key: impl Into<Vec<u8>>, iv: impl Into<Vec<u8>>) -> Self {
        Self {
            mode: mode.into(),
            key: key.into(),
            iv: iv.into(),
        }
    }

    /// Normalise the mode name into an [`EncMode`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnsupportedMode`] for anything other than
    /// ECB, CBC or GCM.
    pub fn parsed_mode(&self) -> Result<EncMode, ValidationError> {
        self.mode.parse()
    }
}

impl Drop for EncryptionSpec {
    fn drop(&mut self) {
        self.key.iter_mut().for_each(|b| *b = 0);
        self.iv.iter_mut().for_each(|b| *b = 0);
    }
}

impl fmt::Debug for EncryptionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionSpec")
            .field("mode", &self.mode)
            .field("key", &format_args!("[REDACTED; {}]", self.key.len()))
            .field("iv", &format_args!("[REDACTED; {}]", self.iv.len()))
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Push request
// ---------------------------------------------------------------------------

/// Body of `POST /push`.
///
/// `enc` never reaches the wire; when present the request is sent as an
/// encrypted envelope instead (see `bark::payload::assemble`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationRequest {
    /// Single routing key.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub device_key: String,
    /// Batch routing keys.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub device_keys: Vec<String>,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub body: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub markdown: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub subtitle: String,

    /// Notification group shown in the client's history.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub group: String,
    /// URL opened when the notification is tapped.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub icon: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub sound: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<i64>,
    /// Interruption level: `active`, `timeSensitive`, `passive` or `critical`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub level: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub copy: String,
    #[serde(rename = "autoCopy", skip_serializing_if = "String::is_empty")]
    pub auto_copy: String,
    #[serde(rename = "isArchive", skip_serializing_if = "Option::is_none")]
    pub is_archive: Option<i64>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub call: String,
    /// Critical alert volume, 0 to 10.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<i64>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub action: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub delete: String,

    #[serde(skip)]
    pub enc: Option<EncryptionSpec>,
}

impl NotificationRequest {
    /// A request for one device carrying a plain body.
    pub fn new(device_key: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            device_key: device_key.into(),
            body: body.into(),
            ..Self::default()
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Encrypt this request with `spec` when it is assembled.
    pub fn with_encryption(mut self, spec: EncryptionSpec) -> Self {
        self.enc = Some(spec);
        self
    }
}

// ---------------------------------------------------------------------------
// Gateway response
// ---------------------------------------------------------------------------

/// Response body returned by the gateway for every push.
///
/// `code == 200` means the push was accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushResponse {
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

impl PushResponse {
    /// Whether the gateway accepted the push.
    pub fn is_success(&self) -> bool {
        self.code == 200
    }
}
