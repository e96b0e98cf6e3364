//! AES-ECB, AES-CBC and AES-GCM encryption of serialised notifications.
//!
//! **ECB is deterministic.** Identical 16-byte plaintext blocks under the same
//! key produce identical ciphertext blocks, and nothing is authenticated. It is
//! supported because Bark clients accept it, not because it is a good choice;
//! prefer GCM.
//!
//! **Never reuse a GCM nonce with the same key.** Reuse breaks both
//! confidentiality and authentication.

use aes::{Aes128, Aes192, Aes256};
use aes_gcm::aead::{consts::U12, Aead};
use aes_gcm::{Aes128Gcm, Aes256Gcm, AesGcm};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use cbc::cipher::{
    block_padding::Pkcs7, generic_array::GenericArray, BlockCipher, BlockDecryptMut,
    BlockEncryptMut, KeyInit, KeyIvInit,
};
use thiserror::Error;

use bark_common::validate::VALID_KEY_LENGTHS;
use bark_common::{EncMode, EncryptionSpec};

/// AES block size in bytes; also the required CBC IV length.
pub const BLOCK_SIZE: usize = 16;

/// Required GCM nonce length in bytes (96 bits).
pub const GCM_NONCE_LEN: usize = 12;

/// AES-192 in GCM mode with the standard 96-bit nonce.
type Aes192Gcm = AesGcm<Aes192, U12>;

/// Errors produced by the cipher layer.
///
/// Every variant reflects malformed caller input or data; none are transient.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CipherError {
    /// The key is not 16, 24 or 32 bytes.
    #[error("invalid key length: expected 16, 24 or 32 bytes, got {0}")]
    InvalidKeyLength(usize),

    /// The CBC IV is not exactly [`BLOCK_SIZE`] bytes.
    #[error("CBC IV length must be {BLOCK_SIZE} bytes, got {0}")]
    InvalidIvLength(usize),

    /// The GCM nonce is not exactly [`GCM_NONCE_LEN`] bytes.
    #[error("GCM nonce length must be {GCM_NONCE_LEN} bytes, got {0}")]
    InvalidNonceLength(usize),

    /// The mode string is not ECB, CBC or GCM.
    #[error("unsupported encryption mode: {0}")]
    UnsupportedMode(String),

    /// AES-GCM sealing or opening failed (on decrypt: wrong key or tampered data).
    #[error("aead operation failed")]
    AeadFailure,

    /// The ciphertext is not valid standard base64.
    #[error("ciphertext is not valid base64")]
    InvalidEncoding,

    /// Decrypted ECB/CBC data is not block aligned or carries bad PKCS7 padding.
    #[error("invalid PKCS7 padding")]
    InvalidPadding,
}

/// Run a generic helper on the AES variant picked by `$key.len()`.
macro_rules! for_key_len {
    ($key:expr, $helper:ident::<$a128:ty, $a192:ty, $a256:ty>($($arg:expr),* $(,)?)) => {
        match $key.len() {
            16 => $helper::<$a128>($($arg),*),
            24 => $helper::<$a192>($($arg),*),
            32 => $helper::<$a256>($($arg),*),
            n => Err(CipherError::InvalidKeyLength(n)),
        }
    };
}

/// Encrypt `plaintext` according to `spec` and return standard base64.
///
/// ECB and CBC pad with PKCS7 first. GCM seals with empty associated data and
/// appends the 16-byte tag.
///
/// `spec` is only read. Nothing is encrypted if any parameter is malformed.
///
/// # Errors
///
/// - [`CipherError::UnsupportedMode`] for a mode other than ECB, CBC or GCM.
/// - [`CipherError::InvalidKeyLength`] if the key is not 16, 24 or 32 bytes.
/// - [`CipherError::InvalidIvLength`] if a CBC IV is not 16 bytes.
/// - [`CipherError::InvalidNonceLength`] if a GCM nonce is not 12 bytes.
pub fn encrypt(plaintext: &[u8], spec: &EncryptionSpec) -> Result<String, CipherError> {
    let mode = parse_mode(spec)?;
    let key = check_key(&spec.key)?;
    let iv = spec.iv.as_slice();

    let encrypted = match mode {
        EncMode::Ecb => for_key_len!(key, ecb_encrypt::<Aes128, Aes192, Aes256>(key, plaintext))?,
        EncMode::Cbc => {
            check_iv(iv)?;
            for_key_len!(key, cbc_encrypt::<Aes128, Aes192, Aes256>(key, iv, plaintext))?
        }
        EncMode::Gcm => {
            check_nonce(iv)?;
            for_key_len!(key, gcm_seal::<Aes128Gcm, Aes192Gcm, Aes256Gcm>(key, iv, plaintext))?
        }
    };

    Ok(STANDARD.encode(encrypted))
}

/// Decrypt a base64 ciphertext produced by [`encrypt`] with the same `spec`.
///
/// # Errors
///
/// Everything [`encrypt`] can return, plus:
/// - [`CipherError::InvalidEncoding`] if `ciphertext` is not base64.
/// - [`CipherError::InvalidPadding`] for misaligned ECB/CBC data or bad padding.
/// - [`CipherError::AeadFailure`] if GCM authentication fails.
pub fn decrypt(ciphertext: &str, spec: &EncryptionSpec) -> Result<Vec<u8>, CipherError> {
    let mode = parse_mode(spec)?;
    let key = check_key(&spec.key)?;
    let iv = spec.iv.as_slice();
    let data = STANDARD
        .decode(ciphertext)
        .map_err(|_| CipherError::InvalidEncoding)?;

    match mode {
        EncMode::Ecb => {
            check_aligned(&data)?;
            for_key_len!(key, ecb_decrypt::<Aes128, Aes192, Aes256>(key, &data))
        }
        EncMode::Cbc => {
            check_iv(iv)?;
            check_aligned(&data)?;
            for_key_len!(key, cbc_decrypt::<Aes128, Aes192, Aes256>(key, iv, &data))
        }
        EncMode::Gcm => {
            check_nonce(iv)?;
            for_key_len!(key, gcm_open::<Aes128Gcm, Aes192Gcm, Aes256Gcm>(key, iv, &data))
        }
    }
}

// ---------------------------------------------------------------------------
// Parameter checks
// ---------------------------------------------------------------------------

fn parse_mode(spec: &EncryptionSpec) -> Result<EncMode, CipherError> {
    spec.parsed_mode()
        .map_err(|_| CipherError::UnsupportedMode(spec.mode.clone()))
}

fn check_key(key: &[u8]) -> Result<&[u8], CipherError> {
    if VALID_KEY_LENGTHS.contains(&key.len()) {
        Ok(key)
    } else {
        Err(CipherError::InvalidKeyLength(key.len()))
    }
}

fn check_iv(iv: &[u8]) -> Result<(), CipherError> {
    if iv.len() != BLOCK_SIZE {
        return Err(CipherError::InvalidIvLength(iv.len()));
    }
    Ok(())
}

fn check_nonce(nonce: &[u8]) -> Result<(), CipherError> {
    if nonce.len() != GCM_NONCE_LEN {
        return Err(CipherError::InvalidNonceLength(nonce.len()));
    }
    Ok(())
}

fn check_aligned(data: &[u8]) -> Result<(), CipherError> {
    if data.is_empty() || data.len() % BLOCK_SIZE != 0 {
        return Err(CipherError::InvalidPadding);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Mode helpers, generic over the AES key size
// ---------------------------------------------------------------------------

// ECB and CBC pad with PKCS7 on encrypt and verify it on decrypt.

fn ecb_encrypt<C>(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CipherError>
where
    C: BlockEncryptMut + BlockCipher + KeyInit,
{
    Ok(ecb::Encryptor::<C>::new_from_slice(key)
        .map_err(|_| CipherError::InvalidKeyLength(key.len()))?
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext))
}

fn ecb_decrypt<C>(key: &[u8], data: &[u8]) -> Result<Vec<u8>, CipherError>
where
    C: BlockDecryptMut + BlockCipher + KeyInit,
{
    ecb::Decryptor::<C>::new_from_slice(key)
        .map_err(|_| CipherError::InvalidKeyLength(key.len()))?
        .decrypt_padded_vec_mut::<Pkcs7>(data)
        .map_err(|_| CipherError::InvalidPadding)
}

fn cbc_encrypt<C>(key: &[u8], iv: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CipherError>
where
    C: BlockEncryptMut + BlockCipher + KeyInit,
{
    Ok(cbc::Encryptor::<C>::new_from_slices(key, iv)
        .map_err(|_| CipherError::InvalidKeyLength(key.len()))?
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext))
}

fn cbc_decrypt<C>(key: &[u8], iv: &[u8], data: &[u8]) -> Result<Vec<u8>, CipherError>
where
    C: BlockDecryptMut + BlockCipher + KeyInit,
{
    cbc::Decryptor::<C>::new_from_slices(key, iv)
        .map_err(|_| CipherError::InvalidKeyLength(key.len()))?
        .decrypt_padded_vec_mut::<Pkcs7>(data)
        .map_err(|_| CipherError::InvalidPadding)
}

fn gcm_seal<A: Aead + KeyInit>(key: &[u8], nonce: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CipherError> {
    let cipher = A::new_from_slice(key).map_err(|_| CipherError::InvalidKeyLength(key.len()))?;
    cipher
        .encrypt(GenericArray::from_slice(nonce), plaintext)
        .map_err(|_| CipherError::AeadFailure)
}

fn gcm_open<A: Aead + KeyInit>(key: &[u8], nonce: &[u8], sealed: &[u8]) -> Result<Vec<u8>, CipherError> {
    let cipher = A::new_from_slice(key).map_err(|_| CipherError::InvalidKeyLength(key.len()))?;
    cipher
        .decrypt(GenericArray::from_slice(nonce), sealed)
        .map_err(|_| CipherError::AeadFailure)
}
