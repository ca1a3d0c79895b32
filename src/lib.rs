//! Shadow Flow - safe migration between code paths
//!
//! Run a candidate replacement ("new flow") in the shadow of the code path
//! you trust today ("current flow"):
//! - Every call executes the current flow and returns its result unchanged
//! - A sampled percentage of calls additionally runs the new flow on a
//!   separate execution context, diffs the results and logs the differences
//! - Nothing on the shadow path (latency, errors, rejected submissions)
//!   ever affects the caller
//! - Difference values are only logged through a pluggable encryption
//!   strategy, never raw
//!
//! # Example
//!
//! ```
//! use shadow_flow::ShadowFlowBuilder;
//!
//! #[derive(Clone, serde::Serialize)]
//! struct Account {
//!     iban: String,
//!     balance: i64,
//! }
//!
//! # fn legacy_lookup() -> Result<Account, String> {
//! #     Ok(Account { iban: "NL00RABO0123456789".into(), balance: 100 })
//! # }
//! # fn rewritten_lookup() -> Result<Account, String> { legacy_lookup() }
//! let shadow_flow = ShadowFlowBuilder::<Account>::new(10)
//!     .with_instance_name("account-lookup")
//!     .build()
//!     .unwrap();
//!
//! // Returns the legacy result; 10% of calls also run the rewrite and
//! // log any differences.
//! let account = shadow_flow.compare(legacy_lookup, rewritten_lookup).unwrap();
//! assert_eq!(account.balance, 100);
//! ```

// Core modules
pub mod builder;
pub mod diff;
pub mod encryption;
pub mod error;
pub mod executor;
pub mod flow;
mod sampling;

// Re-exports for convenience
pub use builder::ShadowFlowBuilder;
pub use diff::json::JsonComparator;
pub use diff::{Comparator, DiffReport, PropertyChange};
pub use encryption::{
    AesEncryptionService, Cipher, CipherEncryptionService, EncryptionService,
    NoopEncryptionService, PublicKeyEncryptionService,
};
pub use error::{ConfigError, DiffError, EncryptionError, ExecuteError};
pub use executor::{InlineExecutor, ShadowExecutor, ShadowTask, ThreadPerTaskExecutor};
pub use flow::ShadowFlow;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with shadow flows
    pub use crate::{
        Comparator, DiffReport, EncryptionService, ShadowExecutor, ShadowFlow,
        ShadowFlowBuilder,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
