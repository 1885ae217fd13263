//! Reversible token obscuring.
//!
//! Tokens travel through the caller in obscured form and are only turned
//! back into plaintext when the compose descriptor is rendered.
//!
//! Wire format (URL-safe base64, no padding):
//!
//! ```text
//! nonce (12 bytes) | AES-256-GCM ciphertext | tag (16 bytes)
//! ```
//!
//! The key is SHA-256 over a fixed label and the configured secret.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, Key, KeyInit, Nonce};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use nbspace_core::config::CredentialConfig;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use thiserror::Error;

pub const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is not valid base64")]
    Encoding,
    #[error("token is too short")]
    Truncated,
    #[error("token integrity check failed")]
    Integrity,
    #[error("decoded token is not UTF-8")]
    NotUtf8,
    #[error("token could not be encrypted")]
    Seal,
    /// Decoded fine but cannot be placed in the compose descriptor.
    #[error("token is empty or contains a quote, backslash or control character")]
    Unusable,
}

/// Turns an obscured token back into plaintext.
pub trait TokenCodec: Send + Sync {
    fn decode(&self, token: &str) -> Result<String, TokenError>;
}

/// Keyed codec; both sides must share the same secret.
#[derive(Clone)]
pub struct KeyedTokenCodec {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for KeyedTokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("KeyedTokenCodec { .. }")
    }
}

impl KeyedTokenCodec {
    pub fn new(secret: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"nbspace-token:");
        hasher.update(secret.as_bytes());
        let key: [u8; 32] = hasher.finalize().into();
        Self {
            cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key)),
        }
    }

    pub fn from_config(cfg: &CredentialConfig) -> Self {
        Self::new(&cfg.secret)
    }

    /// Obscure `plaintext` with a random nonce from the OS.
    pub fn encode(&self, plaintext: &str) -> Result<String, TokenError> {
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);
        self.encode_with_nonce(plaintext, nonce)
    }

    /// Obscure `plaintext` with a caller-chosen nonce. The same nonce must
    /// never be reused with a different plaintext.
    pub fn encode_with_nonce(
        &self,
        plaintext: &str,
        nonce: [u8; NONCE_LEN],
    ) -> Result<String, TokenError> {
        let sealed = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
            .map_err(|_| TokenError::Seal)?;
        let mut out = Vec::with_capacity(NONCE_LEN + sealed.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&sealed);
        Ok(URL_SAFE_NO_PAD.encode(out))
    }
}

impl TokenCodec for KeyedTokenCodec {
    fn decode(&self, token: &str) -> Result<String, TokenError> {
        let raw = URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|_| TokenError::Encoding)?;
        if raw.len() < NONCE_LEN + TAG_LEN {
            return Err(TokenError::Truncated);
        }
        let (nonce, sealed) = raw.split_at(NONCE_LEN);
        let plain = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), sealed)
            .map_err(|_| TokenError::Integrity)?;
        String::from_utf8(plain).map_err(|_| TokenError::NotUtf8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_recovers_plaintext() {
        let codec = KeyedTokenCodec::new("secret");
        let token = codec
            .encode("jupyter-token-0123456789abcdef0123456789abcdef")
            .unwrap();
        assert_eq!(
            codec.decode(&token).unwrap(),
            "jupyter-token-0123456789abcdef0123456789abcdef"
        );
    }

    #[test]
    fn test_encoded_form_hides_plaintext() {
        let codec = KeyedTokenCodec::new("secret");
        let token = codec.encode_with_nonce("plain-token", [7; NONCE_LEN]).unwrap();
        assert!(!token.contains("plain-token"));
        assert_eq!(
            token,
            codec.encode_with_nonce("plain-token", [7; NONCE_LEN]).unwrap()
        );
    }

    #[test]
    fn test_random_nonces_differ() {
        let codec = KeyedTokenCodec::new("secret");
        assert_ne!(codec.encode("abc").unwrap(), codec.encode("abc").unwrap());
    }

    #[test]
    fn test_wrong_secret_fails_integrity() {
        let token = KeyedTokenCodec::new("secret").encode("abc").unwrap();
        assert_eq!(
            KeyedTokenCodec::new("other").decode(&token),
            Err(TokenError::Integrity)
        );
    }

    #[test]
    fn test_tampered_token_rejected() {
        let codec = KeyedTokenCodec::new("secret");
        let token = codec.encode_with_nonce("abc", [1; NONCE_LEN]).unwrap();
        let mut raw = URL_SAFE_NO_PAD.decode(&token).unwrap();
        raw[NONCE_LEN] ^= 0x01;
        let tampered = URL_SAFE_NO_PAD.encode(raw);
        assert_eq!(codec.decode(&tampered), Err(TokenError::Integrity));
    }

    #[test]
    fn test_malformed_tokens() {
        let codec = KeyedTokenCodec::new("secret");
        assert_eq!(codec.decode("not base64 !!"), Err(TokenError::Encoding));
        assert_eq!(codec.decode("AAAA"), Err(TokenError::Truncated));
    }

    #[test]
    fn test_debug_hides_keys() {
        let dbg = format!("{:?}", KeyedTokenCodec::new("secret"));
        assert_eq!(dbg, "KeyedTokenCodec { .. }");
    }
}
