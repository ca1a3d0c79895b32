//! Configuration builder for [`ShadowFlow`]
//!
//! Assembles sampling percentage, execution context, redaction strategy and
//! instance identity into one immutable engine. Redaction strategies are
//! mutually exclusive; selecting a second one fails the build. An
//! out-of-range percentage is not fatal; it disables the shadow flow and
//! logs a warning.

use crate::diff::json::JsonComparator;
use crate::diff::Comparator;
use crate::encryption::{
    AesEncryptionService, Cipher, CipherEncryptionService, EncryptionService,
    NoopEncryptionService, PublicKeyEncryptionService,
};
use crate::error::ConfigError;
use crate::executor::{ShadowExecutor, ThreadPerTaskExecutor};
use crate::flow::ShadowFlow;
use rsa::RsaPublicKey;
use serde::Serialize;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::warn;

const DEFAULT_INSTANCE_NAME: &str = "default";

/// Builder for [`ShadowFlow`]
///
/// ```
/// use shadow_flow::ShadowFlowBuilder;
///
/// #[derive(Clone, serde::Serialize)]
/// struct Order {
///     id: u64,
/// }
///
/// let flow = ShadowFlowBuilder::<Order>::new(10)
///     .with_instance_name("orders")
///     .build()
///     .unwrap();
/// assert_eq!(flow.percentage(), 10);
/// ```
pub struct ShadowFlowBuilder<T> {
    percentage: u8,
    executor: Option<Arc<dyn ShadowExecutor>>,
    runtime: Option<Handle>,
    encryption: Option<Arc<dyn EncryptionService>>,
    comparator: Option<Arc<dyn Comparator<T>>>,
    instance_name: Option<String>,
    config_error: Option<ConfigError>,
}

impl<T> ShadowFlowBuilder<T> {
    /// Create a builder for a flow sampling `percentage` percent of calls
    ///
    /// `percentage` must be in `0..=100`; zero disables the shadow flow (the
    /// current flow always runs). A value above 100 is coerced to zero with a
    /// warning rather than failing the build.
    #[must_use]
    pub fn new(percentage: u8) -> Self {
        Self {
            percentage: validate_percentage(percentage),
            executor: None,
            runtime: None,
            encryption: None,
            comparator: None,
            instance_name: None,
            config_error: None,
        }
    }

    /// Use a custom execution context for shadow tasks
    ///
    /// The shadow flow runs the new flow, the comparison and the logging on
    /// this context so the main flow is never impacted. Defaults to an
    /// unbounded thread-per-task executor.
    #[must_use]
    pub fn with_executor(mut self, executor: impl ShadowExecutor + 'static) -> Self {
        self.executor = Some(Arc::new(executor));
        self
    }

    /// Use a specific tokio runtime for the async shadow evaluations
    ///
    /// Defaults to the runtime ambient at the call site.
    #[must_use]
    pub fn with_runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    /// Log difference values encrypted with RSA-OAEP-SHA256
    ///
    /// Mutually exclusive with the other `with_*encryption*`/`with_cipher`
    /// options. The public key should be at least 2048 bits.
    #[must_use]
    pub fn with_encryption(self, public_key: RsaPublicKey) -> Self {
        self.set_encryption(Arc::new(PublicKeyEncryptionService::new(public_key)))
    }

    /// Log difference values encrypted with a caller-supplied primitive
    ///
    /// Mutually exclusive with the other encryption options.
    #[must_use]
    pub fn with_cipher(self, cipher: impl Cipher + 'static) -> Self {
        self.set_encryption(Arc::new(CipherEncryptionService::new(cipher)))
    }

    /// Log difference values encrypted with AES-256-CBC
    ///
    /// Takes a hex-encoded 32-byte key (64 characters) and 16-byte IV
    /// (32 characters); invalid key material fails the build. Mutually
    /// exclusive with the other encryption options.
    #[must_use]
    pub fn with_symmetric_encryption(mut self, key_hex: &str, iv_hex: &str) -> Self {
        match AesEncryptionService::from_hex(key_hex, iv_hex) {
            Ok(service) => self.set_encryption(Arc::new(service)),
            Err(err) => {
                self.config_error.get_or_insert(err.into());
                self
            }
        }
    }

    /// Log difference values base64-encoded but not encrypted
    ///
    /// For public or otherwise non-sensitive data only. Mutually exclusive
    /// with the other encryption options.
    #[must_use]
    pub fn with_noop_encryption(self) -> Self {
        self.set_encryption(Arc::new(NoopEncryptionService::new()))
    }

    /// Log difference values through a custom [`EncryptionService`]
    ///
    /// Mutually exclusive with the other encryption options.
    #[must_use]
    pub fn with_encryption_service(self, service: impl EncryptionService + 'static) -> Self {
        self.set_encryption(Arc::new(service))
    }

    /// Use a custom diffing capability instead of the serde-backed default
    #[must_use]
    pub fn with_comparator(mut self, comparator: impl Comparator<T> + 'static) -> Self {
        self.comparator = Some(Arc::new(comparator));
        self
    }

    /// Distinguish multiple shadow flows in one process
    ///
    /// The name ends up in every log line as `[instance=<name>]`.
    /// Defaults to `"default"`.
    #[must_use]
    pub fn with_instance_name(mut self, instance_name: impl Into<String>) -> Self {
        self.instance_name = Some(instance_name.into());
        self
    }

    fn set_encryption(mut self, service: Arc<dyn EncryptionService>) -> Self {
        if self.encryption.is_some() {
            self.config_error
                .get_or_insert(ConfigError::EncryptionAlreadyConfigured);
        } else {
            self.encryption = Some(service);
        }
        self
    }
}

impl<T> ShadowFlowBuilder<T>
where
    T: Serialize + 'static,
{
    /// Build the [`ShadowFlow`]
    ///
    /// # Errors
    /// Returns [`ConfigError`] if more than one redaction strategy was
    /// selected, or if a selected strategy failed to construct. When several
    /// configuration errors occurred, the first one recorded wins; later
    /// setters (valid or not) do not replace it.
    pub fn build(self) -> Result<ShadowFlow<T>, ConfigError> {
        if let Some(err) = self.config_error {
            return Err(err);
        }

        Ok(ShadowFlow::new(
            self.percentage,
            self.executor
                .unwrap_or_else(|| Arc::new(ThreadPerTaskExecutor::new())),
            self.runtime,
            self.encryption,
            self.comparator
                .unwrap_or_else(|| Arc::new(JsonComparator::new())),
            self.instance_name
                .unwrap_or_else(|| DEFAULT_INSTANCE_NAME.to_string()),
        ))
    }
}

fn validate_percentage(percentage: u8) -> u8 {
    if percentage > 100 {
        warn!(
            "Invalid percentage! Must be within the range of 0 and 100. Got {percentage}. \
             The shadow flow will be effectively disabled by setting it to 0%."
        );
        return 0;
    }
    percentage
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EncryptionError;

    const KEY: &str = "8e57d49bbee9d8cc617ab23c83e88639cf9a14461ce6518fc5e5be33cfe5438f";
    const IV: &str = "1bb9fd3c0e5c675cc69086f13f57d5f6";

    #[derive(Clone, serde::Serialize)]
    struct Model {
        value: u32,
    }

    #[test]
    fn valid_percentage_is_kept() {
        let flow = ShadowFlowBuilder::<Model>::new(42).build().unwrap();
        assert_eq!(flow.percentage(), 42);
    }

    #[test]
    fn out_of_range_percentage_is_coerced_to_zero() {
        let flow = ShadowFlowBuilder::<Model>::new(150).build().unwrap();
        assert_eq!(flow.percentage(), 0);
    }

    #[test]
    fn boundary_percentages_are_valid() {
        assert_eq!(ShadowFlowBuilder::<Model>::new(0).build().unwrap().percentage(), 0);
        assert_eq!(
            ShadowFlowBuilder::<Model>::new(100).build().unwrap().percentage(),
            100
        );
    }

    #[test]
    fn instance_name_defaults() {
        let flow = ShadowFlowBuilder::<Model>::new(0).build().unwrap();
        assert_eq!(flow.instance_name(), "default");
    }

    #[test]
    fn two_encryption_strategies_fail_the_build() {
        let result = ShadowFlowBuilder::<Model>::new(0)
            .with_noop_encryption()
            .with_symmetric_encryption(KEY, IV)
            .build();

        assert!(matches!(
            result,
            Err(ConfigError::EncryptionAlreadyConfigured)
        ));
    }

    #[test]
    fn bad_symmetric_key_fails_the_build() {
        let result = ShadowFlowBuilder::<Model>::new(0)
            .with_symmetric_encryption("deadbeef", IV)
            .build();

        assert!(matches!(
            result,
            Err(ConfigError::InvalidEncryptionSetup(
                EncryptionError::InvalidKeyLength { expected: 64, .. }
            ))
        ));
    }

    #[test]
    fn symmetric_encryption_builds_with_valid_key_material() {
        assert!(ShadowFlowBuilder::<Model>::new(10)
            .with_symmetric_encryption(KEY, IV)
            .build()
            .is_ok());
    }

    #[test]
    fn first_configuration_error_wins() {
        // Conflict recorded first; the later invalid key does not mask it
        let result = ShadowFlowBuilder::<Model>::new(0)
            .with_noop_encryption()
            .with_noop_encryption()
            .with_symmetric_encryption("bad", "bad")
            .build();

        assert!(matches!(
            result,
            Err(ConfigError::EncryptionAlreadyConfigured)
        ));
    }
}
