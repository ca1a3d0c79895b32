//! Redaction strategies for diff output
//!
//! Diff text may contain sensitive production data, so it is never logged
//! raw. Every strategy implements [`EncryptionService`]: plaintext in,
//! printable (base64) string out. Variants:
//! - [`NoopEncryptionService`]: base64 only, no confidentiality
//! - [`CipherEncryptionService`]: wraps a caller-supplied primitive
//! - [`AesEncryptionService`]: AES-256-CBC from a hex key and IV
//! - [`PublicKeyEncryptionService`]: RSA-OAEP with SHA-256

mod aes;
mod cipher;
mod rsa;

pub use self::aes::AesEncryptionService;
pub use self::cipher::{Cipher, CipherEncryptionService};
pub use self::rsa::PublicKeyEncryptionService;

use crate::error::EncryptionError;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

/// Turns diff text into a printable, optionally confidential log value
///
/// The result is emitted into logs verbatim, so it must be printable. A
/// failure is a redaction error: the reporting step catches and logs it
/// rather than ever emitting unredacted text.
pub trait EncryptionService: Send + Sync {
    /// Encrypt the given plaintext for logging
    ///
    /// # Errors
    /// Returns [`EncryptionError`] if the underlying primitive fails.
    fn encrypt(&self, plaintext: &str) -> Result<String, EncryptionError>;
}

/// Redaction strategy without confidentiality
///
/// Base64-encodes the plaintext so the value is safely transportable in log
/// pipelines, but anyone can decode it. For public or non-sensitive data only.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEncryptionService;

impl NoopEncryptionService {
    /// Create a no-op service
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl EncryptionService for NoopEncryptionService {
    fn encrypt(&self, plaintext: &str) -> Result<String, EncryptionError> {
        Ok(BASE64.encode(plaintext.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_round_trips_through_base64() {
        let plain = "'place' changed: 'Dintelooord' -> 'Dinteloord'\n\
                     'madrigals' collection changes :\n\
                     \u{20}  1. 'Bruno' changed to 'Mirabel'\n\
                     \u{20}  0. 'Bruno' added";

        let encoded = NoopEncryptionService::new().encrypt(plain).unwrap();
        let decoded = BASE64.decode(encoded).unwrap();

        assert_eq!(String::from_utf8(decoded).unwrap(), plain);
    }

    #[test]
    fn noop_output_is_printable() {
        let encoded = NoopEncryptionService::new().encrypt("some\0binary\u{7}").unwrap();
        assert!(encoded.chars().all(|c| c.is_ascii_graphic()));
    }
}
