//! Serde-backed default comparator
//!
//! Compares two values by serializing them to JSON and diffing the top-level
//! attributes. With `serde_json`'s `preserve_order` feature the reported
//! attribute order follows the struct's declaration order.
//!
//! This is the batteries-included comparator used when no custom
//! [`Comparator`] is configured on the builder. It deliberately stays at
//! attribute granularity: a changed nested object or collection is reported as
//! one change on the attribute holding it.

use super::{Comparator, DiffReport, PropertyChange};
use crate::error::DiffError;
use serde::Serialize;
use serde_json::Value;

/// Default [`Comparator`] over any `Serialize` model
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonComparator;

impl JsonComparator {
    /// Create a new JSON comparator
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl<T: Serialize> Comparator<T> for JsonComparator {
    fn compare(&self, current: &T, candidate: &T) -> Result<DiffReport, DiffError> {
        let a = serde_json::to_value(current)?;
        let b = serde_json::to_value(candidate)?;
        Ok(DiffReport::new(value_changes(&a, &b)))
    }

    fn compare_collections(
        &self,
        current: &[T],
        candidate: &[T],
    ) -> Result<DiffReport, DiffError> {
        let mut changes = Vec::new();

        if current.len() != candidate.len() {
            changes.push(PropertyChange::new(
                "size",
                format!(
                    "'size' changed: {} -> {}",
                    current.len(),
                    candidate.len()
                ),
            ));
        }

        for (idx, (a, b)) in current.iter().zip(candidate).enumerate() {
            let a = serde_json::to_value(a)?;
            let b = serde_json::to_value(b)?;
            for change in value_changes(&a, &b) {
                changes.push(PropertyChange::new(
                    format!("[{idx}].{}", change.property),
                    format!("element {idx}: {}", change.pretty),
                ));
            }
        }

        Ok(DiffReport::new(changes))
    }
}

/// Diff two JSON values at top-level-attribute granularity
fn value_changes(a: &Value, b: &Value) -> Vec<PropertyChange> {
    match (a, b) {
        (Value::Object(current), Value::Object(candidate)) => {
            let mut changes = Vec::new();

            for (key, old) in current {
                match candidate.get(key) {
                    Some(new) if old == new => {}
                    Some(new) => changes.push(PropertyChange::new(
                        key,
                        format!("'{key}' changed: {old} -> {new}"),
                    )),
                    None => changes.push(PropertyChange::new(
                        key,
                        format!("'{key}' removed: {old}"),
                    )),
                }
            }

            for (key, new) in candidate {
                if !current.contains_key(key) {
                    changes.push(PropertyChange::new(key, format!("'{key}' added: {new}")));
                }
            }

            changes
        }
        _ if a == b => Vec::new(),
        _ => vec![PropertyChange::new(
            "value",
            format!("'value' changed: {a} -> {b}"),
        )],
    }
}
