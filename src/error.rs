//! Error types for the shadow flow
//!
//! Each concern carries its own error enum:
//! - Configuration/build failures
//! - Redaction (encryption) failures
//! - Shadow task submission failures
//! - Diff computation failures
//!
//! Only [`ConfigError`] can ever reach the business caller; everything else
//! terminates at the boundary of the shadow task and is observable via logs.

/// Configuration-time errors raised by [`ShadowFlowBuilder::build`](crate::ShadowFlowBuilder::build)
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// More than one redaction strategy selected on the same builder
    #[error("an encryption service has already been configured")]
    EncryptionAlreadyConfigured,

    /// Encryption service construction failed (e.g. bad symmetric key material)
    #[error("invalid encryption setup: {0}")]
    InvalidEncryptionSetup(#[from] EncryptionError),
}

/// Errors raised by [`EncryptionService`](crate::EncryptionService) implementations
#[derive(Debug, thiserror::Error)]
pub enum EncryptionError {
    /// The wrapped cryptographic primitive was never initialized
    #[error("cipher not initialized")]
    CipherNotInitialized,

    /// Symmetric key has the wrong length
    #[error("invalid key length: expected {expected} hex characters, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    /// Initialization vector has the wrong length
    #[error("invalid iv length: expected {expected} hex characters, got {actual}")]
    InvalidIvLength { expected: usize, actual: usize },

    /// Key material is not valid hex
    #[error("hex decode error: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// Plaintext exceeds what the asymmetric scheme can encrypt in one operation
    #[error("plaintext of {len} bytes exceeds the RSA-OAEP payload limit")]
    PayloadTooLarge { len: usize },

    /// The underlying primitive failed
    #[error("encryption failed: {0}")]
    EncryptionFailed(String),
}

/// Shadow task submission errors
///
/// Raised by [`ShadowExecutor::execute`](crate::ShadowExecutor::execute) when the
/// execution context cannot accept the task. Always caught and logged by the
/// shadow flow, never surfaced to the business caller.
#[derive(Debug, thiserror::Error)]
pub enum ExecuteError {
    /// The execution context refused the task (saturated, shutting down, ...)
    #[error("shadow task rejected: {0}")]
    Rejected(String),

    /// Spawning a worker thread failed
    #[error("failed to spawn shadow worker: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Errors raised by [`Comparator`](crate::Comparator) implementations
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// A value could not be serialized for comparison
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Comparison itself failed
    #[error("comparison failed: {0}")]
    Comparison(String),
}
