//! AES payload encryption for the three modes the Bark app understands.
//!
//! This module is free of HTTP and serialisation concerns. It turns plaintext
//! bytes into the base64 string carried in an envelope's `ciphertext` field,
//! and back again.
//!
//! # Ciphertext format
//!
//! ```text
//! ECB / CBC:  base64(AES(PKCS7(plaintext)))
//! GCM:        base64(ciphertext || tag)      (no padding, 16-byte tag)
//! ```
//!
//! Standard base64 alphabet with `=` padding. The IV/nonce is not embedded;
//! the receiving device is configured with it out of band.

pub mod cipher;

pub use cipher::{decrypt, encrypt, CipherError, BLOCK_SIZE, GCM_NONCE_LEN};
