//! Diffing capability seam
//!
//! The shadow flow does not implement object diffing itself; it consumes the
//! [`Comparator`] contract. A serde-backed default lives in [`json`]; anything
//! that can turn two values into a [`DiffReport`] can be plugged in instead.

pub mod json;

use crate::error::DiffError;

/// Compares a current-flow value against a new-flow value
///
/// The type parameter is the comparison model: for collection comparisons it
/// identifies the element type, which the diffing capability needs to compare
/// heterogeneous collection contents correctly.
pub trait Comparator<T>: Send + Sync {
    /// Compare two values
    ///
    /// # Errors
    /// Returns [`DiffError`] if the values cannot be compared.
    fn compare(&self, current: &T, candidate: &T) -> Result<DiffReport, DiffError>;

    /// Compare two collections element-wise
    ///
    /// # Errors
    /// Returns [`DiffError`] if the collections cannot be compared.
    fn compare_collections(&self, current: &[T], candidate: &[T])
        -> Result<DiffReport, DiffError>;
}

/// A single changed attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyChange {
    /// Name of the attribute that changed
    pub property: String,
    /// Human-readable rendering of the change
    pub pretty: String,
}

impl PropertyChange {
    /// Create a new property change
    #[inline]
    #[must_use]
    pub fn new(property: impl Into<String>, pretty: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            pretty: pretty.into(),
        }
    }
}

/// Result of comparing two values
///
/// Changes keep the order in which the comparator enumerated them; nothing is
/// re-sorted here.
#[derive(Debug, Clone, Default)]
pub struct DiffReport {
    changes: Vec<PropertyChange>,
}

impl DiffReport {
    /// Report with no changes
    #[inline]
    #[must_use]
    pub const fn unchanged() -> Self {
        Self {
            changes: Vec::new(),
        }
    }

    /// Report from a list of changes
    #[inline]
    #[must_use]
    pub fn new(changes: Vec<PropertyChange>) -> Self {
        Self { changes }
    }

    /// Whether any attribute differed
    #[inline]
    #[must_use]
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    /// The changed attribute names, in enumeration order
    #[must_use]
    pub fn changed_attribute_names(&self) -> Vec<&str> {
        self.changes.iter().map(|c| c.property.as_str()).collect()
    }

    /// Comma-joined attribute names for the summary log line
    #[must_use]
    pub fn attribute_summary(&self) -> String {
        self.changed_attribute_names().join(", ")
    }

    /// Newline-joined pretty renderings of every change
    #[must_use]
    pub fn pretty_changes(&self) -> String {
        self.changes
            .iter()
            .map(|c| c.pretty.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The individual changes
    #[inline]
    #[must_use]
    pub fn changes(&self) -> &[PropertyChange] {
        &self.changes
    }
}
