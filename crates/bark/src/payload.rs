//! Builds the `POST /push` request body.
//!
//! A request without encryption is sent as its own JSON form. An encrypted
//! request becomes an envelope:
//!
//! ```text
//! {"ciphertext": "<base64>", "device_key": "..."}      one routing key
//! {"ciphertext": "<base64>", "device_keys": [...]}     two or more
//! ```
//!
//! # Trust boundary
//!
//! Device keys and the encryption spec are removed before the notification is
//! encrypted. The ciphertext may be relayed to every target device, so it must
//! not disclose the other recipients; the gateway reads the routing keys from
//! the outer envelope instead.

use bark_common::NotificationRequest;
use serde::Serialize;

use crate::crypto;
use crate::error::{AssemblyError, PushError};

/// Outer body sent when the notification content is encrypted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncryptedEnvelope {
    pub ciphertext: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_keys: Option<Vec<String>>,
}

/// Serialise `req` into the bytes posted to the gateway.
///
/// Does not validate; callers run
/// [`NotificationRequest::validate`](bark_common::NotificationRequest::validate)
/// first. `req` is never modified, and every field it carries reaches the
/// gateway unchanged.
///
/// # Errors
///
/// - [`PushError::Crypto`] if the encryption parameters are malformed.
/// - [`PushError::Assembly`] if an encrypted request has no usable routing key.
/// - [`PushError::Serialization`] if JSON encoding fails.
pub fn assemble(req: &NotificationRequest) -> Result<Vec<u8>, PushError> {
    let Some(spec) = &req.enc else {
        return Ok(serde_json::to_vec(req)?);
    };

    let routing = routing_keys(&req.device_key, &req.device_keys);

    let mut content = req.clone();
    content.device_key.clear();
    content.device_keys.clear();
    content.enc = None;

    let plaintext = serde_json::to_vec(&content)?;
    let ciphertext = crypto::encrypt(&plaintext, spec)?;

    let envelope = match routing.len() {
        0 => return Err(AssemblyError::MissingRoutingKey.into()),
        1 => EncryptedEnvelope {
            ciphertext,
            device_key: routing.into_iter().next(),
            device_keys: None,
        },
        _ => EncryptedEnvelope {
            ciphertext,
            device_key: None,
            device_keys: Some(routing),
        },
    };

    Ok(serde_json::to_vec(&envelope)?)
}

/// Merge the single key into the list: list order first, single key last,
/// empty strings and duplicates dropped.
fn routing_keys(device_key: &str, device_keys: &[String]) -> Vec<String> {
    let mut keys: Vec<String> = Vec::with_capacity(device_keys.len() + 1);
    for key in device_keys.iter().map(String::as_str).chain(std::iter::once(device_key)) {
        if !key.is_empty() && !keys.iter().any(|k| k == key) {
            keys.push(key.to_owned());
        }
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use bark_common::EncryptionSpec;
    use serde_json::{json, Value};

    const KEY16: &[u8] = b"1234567890abcdef";
    const IV16: &[u8] = b"1111111111111111";

    fn cbc_spec() -> EncryptionSpec {
        EncryptionSpec::new("CBC", KEY16.to_vec(), IV16.to_vec())
    }

    fn parse(bytes: &[u8]) -> Value {
        serde_json::from_slice(bytes).unwrap()
    }

    #[test]
    fn plain_request_is_sent_verbatim() {
        let req = NotificationRequest::new("abc", "B").with_title("T");
        let value = parse(&assemble(&req).unwrap());
        assert_eq!(value, json!({"device_key": "abc", "title": "T", "body": "B"}));
        assert!(value.get("ciphertext").is_none());
    }

    #[test]
    fn plain_request_round_trips() {
        let req = NotificationRequest {
            device_keys: vec!["a".into(), "b".into()],
            title: "T".into(),
            markdown: "# hi".into(),
            group: "ops".into(),
            badge: Some(0),
            is_archive: Some(1),
            volume: Some(5),
            level: "critical".into(),
            ..NotificationRequest::default()
        };
        let decoded: NotificationRequest = serde_json::from_slice(&assemble(&req).unwrap()).unwrap();
        assert_eq!(decoded, req);
    }

    #[test]
    fn encrypted_envelope_has_only_ciphertext_and_device_key() {
        let req = NotificationRequest::new("abc", "B")
            .with_title("T")
            .with_encryption(cbc_spec());
        let value = parse(&assemble(&req).unwrap());

        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert_eq!(obj["device_key"], "abc");

        let plain = crypto::decrypt(obj["ciphertext"].as_str().unwrap(), &cbc_spec()).unwrap();
        let text = String::from_utf8(plain).unwrap();
        assert!(text.contains(r#"title":"T""#));
        assert!(text.contains(r#"body":"B""#));
        assert!(!text.contains("device_key"));
        assert!(!text.contains("abc"));
    }

    #[test]
    fn ciphertext_is_standard_base64() {
        let req = NotificationRequest::new("abc", "B").with_encryption(cbc_spec());
        let value = parse(&assemble(&req).unwrap());
        let raw = STANDARD.decode(value["ciphertext"].as_str().unwrap()).unwrap();
        assert_eq!(raw.len() % 16, 0);
    }

    #[test]
    fn merged_keys_become_device_keys() {
        let req = NotificationRequest {
            device_key: "a".into(),
            device_keys: vec!["a".into(), "b".into(), "c".into()],
            body: "B".into(),
            enc: Some(cbc_spec()),
            ..NotificationRequest::default()
        };
        let value = parse(&assemble(&req).unwrap());
        assert_eq!(value["device_keys"], json!(["a", "b", "c"]));
        assert!(value.get("device_key").is_none());
    }

    #[test]
    fn single_key_is_appended_after_list() {
        let req = NotificationRequest {
            device_key: "z".into(),
            device_keys: vec!["a".into(), "a".into()],
            body: "B".into(),
            enc: Some(cbc_spec()),
            ..NotificationRequest::default()
        };
        let value = parse(&assemble(&req).unwrap());
        assert_eq!(value["device_keys"], json!(["a", "z"]));
    }

    #[test]
    fn one_distinct_key_collapses_to_device_key() {
        let req = NotificationRequest {
            device_keys: vec!["only".into(), "only".into()],
            body: "B".into(),
            enc: Some(EncryptionSpec::new("GCM", KEY16.to_vec(), b"abcdefghijkl".to_vec())),
            ..NotificationRequest::default()
        };
        let value = parse(&assemble(&req).unwrap());
        assert_eq!(value["device_key"], "only");
        assert!(value.get("device_keys").is_none());
    }

    #[test]
    fn encrypted_request_without_routing_keys_fails() {
        let req = NotificationRequest {
            device_keys: vec![String::new()],
            body: "B".into(),
            enc: Some(cbc_spec()),
            ..NotificationRequest::default()
        };
        assert!(matches!(
            assemble(&req),
            Err(PushError::Assembly(AssemblyError::MissingRoutingKey))
        ));

        let bare = NotificationRequest {
            body: "B".into(),
            enc: Some(cbc_spec()),
            ..NotificationRequest::default()
        };
        assert!(matches!(
            assemble(&bare),
            Err(PushError::Assembly(AssemblyError::MissingRoutingKey))
        ));
    }

    #[test]
    fn cipher_errors_propagate() {
        let req = NotificationRequest::new("abc", "B").with_encryption(EncryptionSpec::new(
            "GCM",
            KEY16.to_vec(),
            IV16.to_vec(),
        ));
        assert!(matches!(
            assemble(&req),
            Err(PushError::Crypto(crypto::CipherError::InvalidNonceLength(16)))
        ));
    }

    #[test]
    fn accepted_out_of_range_volume_is_sent_unchanged() {
        let mut req = NotificationRequest::new("abc", "B");
        req.volume = Some(42);
        assert_eq!(req.validate(), Ok(()));

        let decoded: NotificationRequest = serde_json::from_slice(&assemble(&req).unwrap()).unwrap();
        assert_eq!(decoded, req);
        assert_eq!(decoded.volume, Some(42));
    }

    #[test]
    fn encrypted_content_keeps_volume() {
        let mut req = NotificationRequest::new("abc", "B").with_encryption(cbc_spec());
        req.volume = Some(-3);
        let value = parse(&assemble(&req).unwrap());
        let plain = crypto::decrypt(value["ciphertext"].as_str().unwrap(), &cbc_spec()).unwrap();
        let inner: Value = serde_json::from_slice(&plain).unwrap();
        assert_eq!(inner["volume"], -3);
    }

    #[test]
    fn routing_keys_merge_rules() {
        assert_eq!(routing_keys("", &[]), Vec::<String>::new());
        assert_eq!(routing_keys("a", &[]), vec!["a"]);
        assert_eq!(
            routing_keys("b", &["a".into(), "".into(), "b".into()]),
            vec!["a", "b"]
        );
    }
}
