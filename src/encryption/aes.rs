//! Symmetric redaction: AES-256-CBC with PKCS7 padding
//!
//! Constructed from hex-encoded key material; all validation happens at
//! construction so the first encrypt call cannot fail on bad keys. With a
//! fixed key and IV the ciphertext is deterministic per plaintext. That is an
//! accepted limitation for diagnostic logging; rotate the configuration if
//! semantic security per message is required.

use super::EncryptionService;
use crate::error::EncryptionError;
use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockEncryptMut, KeyIvInit};
use aes::Aes256;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;

/// Hex characters in a 32-byte AES-256 key
const KEY_HEX_LEN: usize = 64;
/// Hex characters in a 16-byte CBC initialization vector
const IV_HEX_LEN: usize = 32;

/// AES-256-CBC [`EncryptionService`] keyed from hex strings
#[derive(Clone)]
pub struct AesEncryptionService {
    key: [u8; 32],
    iv: [u8; 16],
}

impl AesEncryptionService {
    /// Build from a hex-encoded key (64 chars) and IV (32 chars)
    ///
    /// # Errors
    /// - [`EncryptionError::InvalidKeyLength`] / [`EncryptionError::InvalidIvLength`]
    ///   if either input has the wrong length
    /// - [`EncryptionError::InvalidHex`] if either input is not valid hex
    pub fn from_hex(key_hex: &str, iv_hex: &str) -> Result<Self, EncryptionError> {
        if key_hex.len() != KEY_HEX_LEN {
            return Err(EncryptionError::InvalidKeyLength {
                expected: KEY_HEX_LEN,
                actual: key_hex.len(),
            });
        }
        if iv_hex.len() != IV_HEX_LEN {
            return Err(EncryptionError::InvalidIvLength {
                expected: IV_HEX_LEN,
                actual: iv_hex.len(),
            });
        }

        let mut key = [0u8; 32];
        hex::decode_to_slice(key_hex, &mut key)?;
        let mut iv = [0u8; 16];
        hex::decode_to_slice(iv_hex, &mut iv)?;

        Ok(Self { key, iv })
    }
}

impl std::fmt::Debug for AesEncryptionService {
    // Key material stays out of Debug output
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AesEncryptionService").finish_non_exhaustive()
    }
}

impl EncryptionService for AesEncryptionService {
    fn encrypt(&self, plaintext: &str) -> Result<String, EncryptionError> {
        let ciphertext = Aes256CbcEnc::new(&self.key.into(), &self.iv.into())
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());
        Ok(BASE64.encode(ciphertext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aes::cipher::BlockDecryptMut;

    type Aes256CbcDec = cbc::Decryptor<Aes256>;

    const KEY: &str = "8e57d49bbee9d8cc617ab23c83e88639cf9a14461ce6518fc5e5be33cfe5438f";
    const IV: &str = "1bb9fd3c0e5c675cc69086f13f57d5f6";

    fn decrypt(service: &AesEncryptionService, encoded: &str) -> String {
        let ciphertext = BASE64.decode(encoded).unwrap();
        let plain = Aes256CbcDec::new(&service.key.into(), &service.iv.into())
            .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
            .unwrap();
        String::from_utf8(plain).unwrap()
    }

    #[test]
    fn encrypt_and_decrypt() {
        let service = AesEncryptionService::from_hex(KEY, IV).unwrap();
        let plain = "'place' changed: 'Dintelooord' -> 'Dinteloord'";

        let encoded = service.encrypt(plain).unwrap();
        assert_eq!(decrypt(&service, &encoded), plain);
    }

    #[test]
    fn same_key_and_iv_is_deterministic() {
        let a = AesEncryptionService::from_hex(KEY, IV).unwrap();
        let b = AesEncryptionService::from_hex(KEY, IV).unwrap();

        assert_eq!(a.encrypt("same text").unwrap(), b.encrypt("same text").unwrap());
    }

    #[test]
    fn wrong_key_length_fails_construction() {
        let err = AesEncryptionService::from_hex("abcd", IV).unwrap_err();
        assert!(matches!(
            err,
            EncryptionError::InvalidKeyLength {
                expected: 64,
                actual: 4
            }
        ));
    }

    #[test]
    fn wrong_iv_length_fails_construction() {
        let err = AesEncryptionService::from_hex(KEY, "00ff").unwrap_err();
        assert!(matches!(
            err,
            EncryptionError::InvalidIvLength {
                expected: 32,
                actual: 4
            }
        ));
    }

    #[test]
    fn non_hex_key_fails_construction() {
        let bad_key = "z".repeat(64);
        let err = AesEncryptionService::from_hex(&bad_key, IV).unwrap_err();
        assert!(matches!(err, EncryptionError::InvalidHex(_)));
    }

    #[test]
    fn non_hex_iv_fails_construction() {
        let bad_iv = "g".repeat(32);
        let err = AesEncryptionService::from_hex(KEY, &bad_iv).unwrap_err();
        assert!(matches!(err, EncryptionError::InvalidHex(_)));
    }

    #[test]
    fn empty_inputs_fail_with_lengths_in_message() {
        let err = AesEncryptionService::from_hex("", "").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("expected 64"));
        assert!(msg.contains("got 0"));
    }
}
