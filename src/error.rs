//! The error type used by this crate.
//!
//! Almost everything in this crate is deliberately lenient: an accessor
//! given an unknown alias or the wrong expected type is a silent no-op (for
//! setters) or returns a default value (for getters); a truncated encoded
//! buffer simply stops decoding early; a JSON node of the wrong kind for a
//! field is skipped. None of that goes through [`Error`]. The one place a
//! hard failure exists is the schema loader: a descriptor whose declared
//! lengths don't fit the bytes it was given cannot be interpreted at all.

use thiserror::Error;

/// Errors produced by this crate.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum SchemaError {
    /// The schema descriptor bytes don't satisfy the grammar: a declared
    /// length would read past the end of the input. Any models already
    /// parsed before the failure are discarded along with the rest.
    #[error("malformed schema descriptor: {reason}")]
    MalformedDescriptor {
        /// What, specifically, ran past the end of the input.
        reason: String,
    },
}

/// Convenience alias for results that can fail with [`SchemaError`].
pub type Result<T> = core::result::Result<T, SchemaError>;
