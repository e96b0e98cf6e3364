//! Configuration loading and validation for the `bark-push` binary.
//!
//! Every value comes from a `BARK_`-prefixed environment variable, e.g.
//! `BARK_DEVICE_KEY`, `BARK_TITLE`, `BARK_AUTO_COPY`, `BARK_ENC_MODE`. Each
//! notification field has a variable of the same name in upper snake case.

use anyhow::{Context, Result};
use bark::{EncryptionSpec, NotificationRequest};
use serde::Deserialize;

/// Validated push configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Gateway base URL; scheme optional.
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Connect and whole-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub device_key: String,
    /// Comma-separated list of additional device keys.
    #[serde(default)]
    pub device_keys: String,

    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub markdown: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub sound: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub badge: Option<i64>,
    #[serde(default)]
    pub copy: String,
    #[serde(default)]
    pub auto_copy: String,
    #[serde(default)]
    pub is_archive: Option<i64>,
    #[serde(default)]
    pub call: String,
    #[serde(default)]
    pub volume: Option<i64>,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub delete: String,

    /// `ECB`, `CBC` or `GCM`, any case. Requires `enc_key`.
    #[serde(default)]
    pub enc_mode: Option<String>,
    /// Raw key text; its UTF-8 bytes are the AES key.
    #[serde(default)]
    pub enc_key: Option<String>,
    /// CBC IV or GCM nonce as text.
    #[serde(default)]
    pub enc_iv: Option<String>,
}

fn default_server_url() -> String {
    bark::client::DEFAULT_URL.into()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from `BARK_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or the combination is invalid.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::with_prefix("BARK"))
            .build()
            .context("failed to build bark-push configuration")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise bark-push configuration")?;

        c.validate()?;
        Ok(c)
    }

    fn validate(&self) -> Result<()> {
        if self.server_url.trim().is_empty() {
            anyhow::bail!("BARK_SERVER_URL must not be empty");
        }
        if self.timeout_secs == 0 {
            anyhow::bail!("BARK_TIMEOUT_SECS must be > 0");
        }
        if self.enc_mode.is_some() != self.enc_key.is_some() {
            anyhow::bail!("BARK_ENC_MODE and BARK_ENC_KEY must be set together");
        }
        Ok(())
    }

    /// Build the notification described by this configuration.
    pub fn to_request(&self) -> NotificationRequest {
        let enc = match (&self.enc_mode, &self.enc_key) {
            (Some(mode), Some(key)) => Some(EncryptionSpec::new(
                mode.as_str(),
                key.as_bytes(),
                self.enc_iv.as_deref().unwrap_or_default().as_bytes(),
            )),
            _ => None,
        };

        NotificationRequest {
            device_key: self.device_key.trim().to_owned(),
            device_keys: self
                .device_keys
                .split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_owned)
                .collect(),
            title: self.title.clone(),
            body: self.body.clone(),
            markdown: self.markdown.clone(),
            subtitle: self.subtitle.clone(),
            group: self.group.clone(),
            url: self.url.clone(),
            icon: self.icon.clone(),
            sound: self.sound.clone(),
            level: self.level.clone(),
            badge: self.badge,
            copy: self.copy.clone(),
            auto_copy: self.auto_copy.clone(),
            is_archive: self.is_archive,
            call: self.call.clone(),
            volume: self.volume,
            action: self.action.clone(),
            id: self.id.clone(),
            delete: self.delete.clone(),
            enc,
        }
    }
}

// Key material stays out of debug output.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("server_url", &self.server_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("log_level", &self.log_level)
            .field("enc_mode", &self.enc_mode)
            .field("enc_key", &self.enc_key.as_ref().map(|_| "[REDACTED]"))
            .field("enc_iv", &self.enc_iv.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}
