//! Feature alignment
//!
//! Reshapes an encoded record into the exact vector shape the scorer was
//! trained on: zero-init in catalog order, sparse overwrite for columns the
//! record carries, ignore everything else. This explicit algorithm replaces
//! any reliance on dataframe-join semantics, so there is no implicit type
//! coercion and no ordering ambiguity.

use crate::features::catalog::ColumnCatalog;
use crate::features::encode::EncodedRecord;

/// A fixed-length vector whose positions correspond 1:1 to catalog columns.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedVector {
    values: Vec<f32>,
    matched: usize,
}

impl AlignedVector {
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn into_values(self) -> Vec<f32> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// How many catalog columns the record actually supplied. Zero means
    /// the record and catalog share nothing, which callers should treat as
    /// a malformed request rather than score silently.
    pub fn matched_columns(&self) -> usize {
        self.matched
    }
}

/// Align an encoded record against a catalog.
///
/// Total for any record: never fails, and the output length is always
/// exactly `catalog.len()`. Keys the catalog does not know are discarded;
/// this is what makes unseen categorical levels (and future extra or
/// renamed raw fields) harmless. Output order is catalog order only,
/// regardless of the record's key order.
pub fn align(record: &EncodedRecord, catalog: &ColumnCatalog) -> AlignedVector {
    let mut values = Vec::with_capacity(catalog.len());
    let mut matched = 0;

    for name in catalog.columns() {
        match record.get(name) {
            Some(value) => {
                values.push(value as f32);
                matched += 1;
            }
            None => values.push(0.0),
        }
    }

    AlignedVector { values, matched }
}
