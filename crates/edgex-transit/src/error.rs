//! Errors raised while reading or writing Transit.

use thiserror::Error;

/// Failure to decode or encode a Transit document.
#[derive(Debug, Error)]
pub enum TransitError {
    /// The payload is not valid JSON.
    #[error("malformed transit JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// An escaped string used an unknown or malformed escape.
    #[error("invalid escape sequence '{value}': {message}")]
    InvalidEscape {
        /// Raw string as it appeared on the wire.
        value: String,
        /// Parser diagnostic.
        message: String,
    },
    /// A `^N` cache reference pointed at an unpopulated slot.
    #[error("cache reference '{code}' does not name a cached value")]
    CacheMiss {
        /// Raw cache code.
        code: String,
    },
    /// A `["^ ", …]` array had a dangling key.
    #[error("map-as-array has an odd number of elements ({len})")]
    OddMapEntries {
        /// Number of key/value elements after the marker.
        len: usize,
    },
    /// A tag appeared outside the first slot of a two-element array or
    /// single-entry object.
    #[error("tag '{tag}' is not valid in this position")]
    MisplacedTag {
        /// Offending tag.
        tag: String,
    },
    /// A built-in tag wrapped a representation of the wrong shape.
    #[error("tag '{tag}' expects {expected}")]
    InvalidTagRep {
        /// Tag name.
        tag: String,
        /// Description of the required representation.
        expected: &'static str,
    },
    /// A value cannot be represented on the wire.
    #[error("cannot encode {kind}: {message}")]
    Unencodable {
        /// Kind of the offending value.
        kind: &'static str,
        /// Details.
        message: String,
    },
}

impl TransitError {
    pub(crate) fn invalid_escape(value: &str, message: impl Into<String>) -> Self {
        Self::InvalidEscape {
            value: value.to_owned(),
            message: message.into(),
        }
    }
}
