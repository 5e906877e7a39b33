//! Per-request input errors
//!
//! Only genuinely malformed records are errors. An unknown categorical level
//! is never one: it encodes as the reference class and scoring proceeds.

use thiserror::Error;

/// A raw record that cannot be turned into a feature vector.
///
/// These are request-scoped and recoverable: the offending record is
/// rejected, other records are unaffected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    /// Neither `birth_date` nor `age` is present, so age cannot be derived.
    #[error("record provides neither `birth_date` nor `age`")]
    MissingAge,

    /// A training row without the `default_flag` label.
    #[error("training row is missing `default_flag`")]
    MissingLabel,

    /// The encoded record shares no columns with the model catalog.
    ///
    /// Every well-formed record matches at least the numeric columns, so
    /// this almost certainly means the catalog belongs to a different
    /// encoding scheme. Rejected loudly rather than scoring an all-zero
    /// vector.
    #[error("record shares no columns with the model catalog")]
    NoCatalogOverlap,
}
