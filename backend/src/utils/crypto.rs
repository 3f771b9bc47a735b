//! AES-256-GCM sealing with an explicitly supplied key.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let key = SecretKey::from_config(&config.token_secret)?;
//! let cipher = TokenCipher::new(&key);
//! let sealed = cipher.seal(b"header", b"payload")?;
//! let opened = cipher.open(b"header", &sealed)?;
//! ```

use aes_gcm::aead::rand_core::{OsRng, RngCore};
use aes_gcm::{
    Aes256Gcm, Key, Nonce,
    aead::{Aead, KeyInit, Payload},
};
use base64::{Engine as _, engine::general_purpose};

/// Size of the AES-256 key in bytes.
pub const KEY_LEN: usize = 32;

/// Size of the GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

#[derive(Debug, PartialEq, Eq)]
pub enum CryptoError {
    InvalidKey,
    EncryptionFailed,
    DecryptionFailed,
    InvalidData,
}

impl std::fmt::Display for CryptoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CryptoError::InvalidKey => write!(
                f,
                "Invalid key: expected {KEY_LEN} raw bytes or base64 of {KEY_LEN} bytes"
            ),
            CryptoError::EncryptionFailed => write!(f, "Encryption failed"),
            CryptoError::DecryptionFailed => write!(f, "Decryption failed"),
            CryptoError::InvalidData => write!(f, "Invalid data format"),
        }
    }
}

impl std::error::Error for CryptoError {}

/// Process-wide secret key material, fixed after startup.
#[derive(Clone)]
pub struct SecretKey([u8; KEY_LEN]);

impl SecretKey {
    /// Parses the configured secret.
    ///
    /// Accepts standard base64 that decodes to exactly 32 bytes (surrounding
    /// whitespace ignored), or a raw string of exactly 32 bytes taken as-is.
    pub fn from_config(secret: &str) -> Result<Self, CryptoError> {
        if let Ok(decoded) = general_purpose::STANDARD.decode(secret.trim()) {
            if let Ok(bytes) = <[u8; KEY_LEN]>::try_from(decoded.as_slice()) {
                return Ok(Self(bytes));
            }
        }

        <[u8; KEY_LEN]>::try_from(secret.as_bytes())
            .map(Self)
            .map_err(|_| CryptoError::InvalidKey)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

/// AES-256-GCM cipher bound to one key.
#[derive(Clone)]
pub struct TokenCipher {
    cipher: Aes256Gcm,
}

impl TokenCipher {
    pub fn new(key: &SecretKey) -> Self {
        let key = Key::<Aes256Gcm>::from_slice(key.as_bytes());
        Self {
            cipher: Aes256Gcm::new(key),
        }
    }

    /// Encrypts `plaintext`, authenticating `aad` alongside it.
    /// Each call uses a fresh random nonce; the output is `nonce || ciphertext`.
    pub fn seal(&self, aad: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(
                nonce,
                Payload {
                    msg: plaintext,
                    aad,
                },
            )
            .map_err(|_| CryptoError::EncryptionFailed)?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&ciphertext);
        Ok(sealed)
    }

    /// Reverses [`TokenCipher::seal`]. Fails if the data or `aad` was altered.
    pub fn open(&self, aad: &[u8], sealed: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if sealed.len() < NONCE_LEN {
            return Err(CryptoError::InvalidData);
        }

        let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);

        self.cipher
            .decrypt(
                nonce,
                Payload {
                    msg: ciphertext,
                    aad,
                },
            )
            .map_err(|_| CryptoError::DecryptionFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW_SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn test_key_from_raw_and_base64() {
        let raw = SecretKey::from_config(RAW_SECRET).unwrap();
        assert_eq!(raw.as_bytes(), RAW_SECRET.as_bytes());

        let encoded = general_purpose::STANDARD.encode([7u8; KEY_LEN]);
        let decoded = SecretKey::from_config(&encoded).unwrap();
        assert_eq!(decoded.as_bytes(), &[7u8; KEY_LEN]);
    }

    #[test]
    fn test_raw_key_keeps_whitespace() {
        let padded = format!(" {}", &RAW_SECRET[..KEY_LEN - 1]);
        let key = SecretKey::from_config(&padded).unwrap();
        assert_eq!(key.as_bytes(), padded.as_bytes());

        let spaced = format!(" {RAW_SECRET} ");
        assert_eq!(
            SecretKey::from_config(&spaced).unwrap_err(),
            CryptoError::InvalidKey
        );

        let encoded = format!("{}\n", general_purpose::STANDARD.encode([7u8; KEY_LEN]));
        assert_eq!(
            SecretKey::from_config(&encoded).unwrap().as_bytes(),
            &[7u8; KEY_LEN]
        );
    }

    #[test]
    fn test_key_rejects_wrong_length() {
        assert_eq!(
            SecretKey::from_config("too-short").unwrap_err(),
            CryptoError::InvalidKey
        );
        let encoded = general_purpose::STANDARD.encode([1u8; 16]);
        assert_eq!(
            SecretKey::from_config(&encoded).unwrap_err(),
            CryptoError::InvalidKey
        );
    }

    #[test]
    fn test_key_debug_is_redacted() {
        let key = SecretKey::from_config(RAW_SECRET).unwrap();
        assert_eq!(format!("{key:?}"), "SecretKey(<redacted>)");
    }

    #[test]
    fn test_seal_open() {
        let cipher = TokenCipher::new(&SecretKey::from_config(RAW_SECRET).unwrap());

        let sealed = cipher.seal(b"v1", b"Test message").unwrap();
        assert_eq!(cipher.open(b"v1", &sealed).unwrap(), b"Test message");
    }

    #[test]
    fn test_unique_nonces() {
        let cipher = TokenCipher::new(&SecretKey::from_config(RAW_SECRET).unwrap());

        let first = cipher.seal(b"", b"Same message").unwrap();
        let second = cipher.seal(b"", b"Same message").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_open_rejects_tampering() {
        let cipher = TokenCipher::new(&SecretKey::from_config(RAW_SECRET).unwrap());
        let sealed = cipher.seal(b"v1", b"payload").unwrap();

        assert_eq!(
            cipher.open(b"v2", &sealed).unwrap_err(),
            CryptoError::DecryptionFailed
        );

        let mut flipped = sealed.clone();
        let last = flipped.len() - 1;
        flipped[last] ^= 0x01;
        assert_eq!(
            cipher.open(b"v1", &flipped).unwrap_err(),
            CryptoError::DecryptionFailed
        );

        assert_eq!(
            cipher.open(b"v1", &sealed[..4]).unwrap_err(),
            CryptoError::InvalidData
        );

        let other = TokenCipher::new(&SecretKey::from_config(&"z".repeat(KEY_LEN)).unwrap());
        assert!(other.open(b"v1", &sealed).is_err());
    }
}
