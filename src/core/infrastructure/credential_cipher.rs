//! Device-bound authenticated encryption for the credential record.
//!
//! The key is derived from the machine identifier with PBKDF2-HMAC-SHA256 and a
//! fixed salt. Ciphertext is a base64-url token:
//!
//! ```text
//! version (1 byte) | nonce (12 bytes) | ChaCha20-Poly1305 ciphertext + tag
//! ```

use crate::{
    TcwError, TcwResult,
    config::{KEY_DERIVATION_ITERATIONS, KEY_DERIVATION_SALT},
    core::infrastructure::machine_identity::MachineIdentity,
};
use base64::{Engine, engine::general_purpose::URL_SAFE};
use chacha20poly1305::{
    ChaCha20Poly1305, Key, Nonce,
    aead::{Aead, KeyInit},
};
use rand::RngCore;
use sha2::Sha256;
use std::fmt;

/// Key size for ChaCha20-Poly1305 (256 bits = 32 bytes).
pub const KEY_SIZE: usize = 32;

/// Nonce size for ChaCha20-Poly1305 (96 bits = 12 bytes).
pub const NONCE_SIZE: usize = 12;

const TAG_SIZE: usize = 16;
const TOKEN_VERSION: u8 = 0x01;
const HEADER_SIZE: usize = 1 + NONCE_SIZE;

/// Symmetric key derived from a machine identifier.
#[derive(Clone, PartialEq, Eq)]
pub struct DerivedKey([u8; KEY_SIZE]);

impl DerivedKey {
    /// Raw key bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    /// The key in base64-url form.
    #[must_use]
    pub fn encoded(&self) -> String {
        URL_SAFE.encode(self.0)
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DerivedKey(<redacted>)")
    }
}

/// Derives the credential key for `machine_id`.
///
/// Deliberately slow (480k rounds); call it once per process.
#[must_use]
pub fn derive_key(machine_id: &str) -> DerivedKey {
    let mut key = [0u8; KEY_SIZE];
    pbkdf2::pbkdf2_hmac::<Sha256>(
        machine_id.as_bytes(),
        KEY_DERIVATION_SALT,
        KEY_DERIVATION_ITERATIONS,
        &mut key,
    );
    DerivedKey(key)
}

/// Encrypts and decrypts credential payloads under one derived key.
#[derive(Clone, Debug)]
pub struct CredentialCipher {
    key: DerivedKey,
}

impl CredentialCipher {
    /// Builds a cipher for an explicit machine identifier.
    #[must_use]
    pub fn new(machine_id: &str) -> Self {
        Self::from_key(derive_key(machine_id))
    }

    #[must_use]
    pub fn from_key(key: DerivedKey) -> Self {
        Self { key }
    }

    /// Builds a cipher for the identifier reported by `identity`.
    ///
    /// Key derivation runs on the blocking pool.
    pub async fn for_machine(identity: &dyn MachineIdentity) -> TcwResult<Self> {
        let machine_id = identity.machine_id().await;
        let key = tokio::task::spawn_blocking(move || derive_key(&machine_id))
            .await
            .map_err(|e| TcwError::InvalidInput(format!("Key derivation aborted: {}", e)))?;
        Ok(Self::from_key(key))
    }

    #[must_use]
    pub fn key(&self) -> &DerivedKey {
        &self.key
    }

    /// Encrypts `plaintext` with a fresh random nonce.
    ///
    /// # Errors
    /// `InvalidInput` for empty plaintext.
    pub fn encrypt(&self, plaintext: &str) -> TcwResult<String> {
        if plaintext.is_empty() {
            return Err(TcwError::InvalidInput(
                "Empty data for encryption".to_string(),
            ));
        }

        let mut nonce = [0u8; NONCE_SIZE];
        rand::thread_rng().fill_bytes(&mut nonce);

        let ciphertext = self
            .aead()
            .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
            .map_err(|e| TcwError::InvalidInput(format!("Encryption failed: {}", e)))?;

        let mut token = Vec::with_capacity(HEADER_SIZE + ciphertext.len());
        token.push(TOKEN_VERSION);
        token.extend_from_slice(&nonce);
        token.extend_from_slice(&ciphertext);
        Ok(URL_SAFE.encode(token))
    }

    /// Decrypts a token produced by [`CredentialCipher::encrypt`].
    ///
    /// # Errors
    /// `InvalidInput` for empty input; `Decryption` for malformed, truncated,
    /// tampered tokens and tokens produced under another key.
    pub fn decrypt(&self, token: &str) -> TcwResult<String> {
        let token = token.trim();
        if token.is_empty() {
            return Err(TcwError::InvalidInput(
                "Empty data for decryption".to_string(),
            ));
        }

        let raw = URL_SAFE
            .decode(token)
            .map_err(|e| TcwError::Decryption(format!("Token is not base64: {}", e)))?;

        if raw.len() < HEADER_SIZE + TAG_SIZE {
            return Err(TcwError::Decryption(format!(
                "Token truncated: {} bytes",
                raw.len()
            )));
        }
        if raw[0] != TOKEN_VERSION {
            return Err(TcwError::Decryption(format!(
                "Unsupported token version {:#04x}",
                raw[0]
            )));
        }

        let (nonce, ciphertext) = raw[1..].split_at(NONCE_SIZE);
        let plaintext = self
            .aead()
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| {
                TcwError::Decryption("Authentication tag mismatch".to_string())
            })?;

        String::from_utf8(plaintext)
            .map_err(|e| TcwError::Decryption(format!("Plaintext is not UTF-8: {}", e)))
    }

    fn aead(&self) -> ChaCha20Poly1305 {
        ChaCha20Poly1305::new(Key::from_slice(self.key.as_bytes()))
    }
}
