//! Redaction backed by a caller-supplied primitive

use super::EncryptionService;
use crate::error::EncryptionError;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

/// A single-use, already-initialized encryption primitive
///
/// Symmetric or asymmetric; the shadow flow only cares that bytes go in and
/// ciphertext comes out. An implementation wrapping a primitive that was never
/// keyed must return [`EncryptionError::CipherNotInitialized`].
pub trait Cipher: Send + Sync {
    /// Encrypt a block of plaintext bytes
    ///
    /// # Errors
    /// Returns [`EncryptionError`] if the primitive fails.
    fn process(&self, plaintext: &[u8]) -> Result<Vec<u8>, EncryptionError>;
}

/// [`EncryptionService`] over any [`Cipher`]
///
/// Encrypts the UTF-8 bytes of the plaintext and base64-encodes the
/// ciphertext for log emission.
pub struct CipherEncryptionService {
    cipher: Box<dyn Cipher>,
}

impl CipherEncryptionService {
    /// Wrap an initialized cipher
    #[inline]
    #[must_use]
    pub fn new(cipher: impl Cipher + 'static) -> Self {
        Self {
            cipher: Box::new(cipher),
        }
    }
}

impl std::fmt::Debug for CipherEncryptionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CipherEncryptionService").finish_non_exhaustive()
    }
}

impl EncryptionService for CipherEncryptionService {
    fn encrypt(&self, plaintext: &str) -> Result<String, EncryptionError> {
        let ciphertext = self.cipher.process(plaintext.as_bytes())?;
        Ok(BASE64.encode(ciphertext))
    }
}
