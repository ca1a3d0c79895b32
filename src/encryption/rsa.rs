//! Asymmetric redaction: RSA-OAEP with SHA-256
//!
//! Only the public key lives here; decryption of logged values happens
//! offline with the matching private key. Each encryption is self-contained
//! and randomized, so the same plaintext yields different ciphertexts.
//!
//! OAEP bounds the plaintext at the key's modulus size minus the padding
//! overhead (66 bytes for SHA-256). A diff text over that bound fails with
//! [`EncryptionError::PayloadTooLarge`] rather than being truncated: losing
//! part of the diff silently would defeat the point of logging it.

use super::EncryptionService;
use crate::error::EncryptionError;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use rand_core::OsRng;
use rsa::{Oaep, RsaPublicKey};
use sha2::Sha256;

/// RSA-OAEP-SHA256 [`EncryptionService`] over a public key
///
/// The key should be at least 2048 bits.
#[derive(Debug, Clone)]
pub struct PublicKeyEncryptionService {
    public_key: RsaPublicKey,
}

impl PublicKeyEncryptionService {
    /// Create a service encrypting with the given public key
    #[inline]
    #[must_use]
    pub const fn new(public_key: RsaPublicKey) -> Self {
        Self { public_key }
    }
}

impl EncryptionService for PublicKeyEncryptionService {
    fn encrypt(&self, plaintext: &str) -> Result<String, EncryptionError> {
        let ciphertext = self
            .public_key
            .encrypt(&mut OsRng, Oaep::new::<Sha256>(), plaintext.as_bytes())
            .map_err(|err| match err {
                rsa::Error::MessageTooLong => EncryptionError::PayloadTooLarge {
                    len: plaintext.len(),
                },
                other => EncryptionError::EncryptionFailed(other.to_string()),
            })?;

        Ok(BASE64.encode(ciphertext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsa::RsaPrivateKey;
    use std::sync::OnceLock;

    // Key generation is slow; share one keypair across the module.
    fn private_key() -> &'static RsaPrivateKey {
        static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
        KEY.get_or_init(|| RsaPrivateKey::new(&mut OsRng, 2048).unwrap())
    }

    #[test]
    fn encrypt_and_decrypt() {
        let private = private_key();
        let service = PublicKeyEncryptionService::new(private.to_public_key());
        let plain = "'place' changed: 'Dintelooord' -> 'Dinteloord'\n\
                     'madrigals' collection changes :\n\
                     \u{20}  1. 'Bruno' changed to 'Mirabel'\n\
                     \u{20}  0. 'Bruno' added";

        let encoded = service.encrypt(plain).unwrap();
        let decrypted = private
            .decrypt(Oaep::new::<Sha256>(), &BASE64.decode(encoded).unwrap())
            .unwrap();

        assert_eq!(String::from_utf8(decrypted).unwrap(), plain);
    }

    #[test]
    fn encryption_is_randomized() {
        let service = PublicKeyEncryptionService::new(private_key().to_public_key());

        let first = service.encrypt("same text").unwrap();
        let second = service.encrypt("same text").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn oversized_plaintext_fails_loudly() {
        let service = PublicKeyEncryptionService::new(private_key().to_public_key());

        // 2048-bit key: OAEP-SHA256 payload limit is 256 - 66 = 190 bytes
        let oversized = "x".repeat(191);
        let err = service.encrypt(&oversized).unwrap_err();
        assert!(matches!(
            err,
            EncryptionError::PayloadTooLarge { len: 191 }
        ));
    }

    #[test]
    fn payload_at_the_limit_succeeds() {
        let service = PublicKeyEncryptionService::new(private_key().to_public_key());

        let max = "x".repeat(190);
        assert!(service.encrypt(&max).is_ok());
    }
}
