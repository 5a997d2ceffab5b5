//! Error type for `tomledit-core`.
//!
//! `Done` (iteration complete) is deliberately not a variant here: it is not
//! an error, and is modeled as `Ok(None)` from the navigator functions that
//! can reach end-of-span (see [`crate::navigator::find_next`]).

use thiserror::Error;

/// Errors returned by `tomledit-core` operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A file could not be read or written.
    #[error("io error: {message}")]
    Io {
        /// Human-readable description (an `io::Error` doesn't implement
        /// `Clone`/`PartialEq`, so it is flattened to a message here).
        message: String,
    },

    /// The document, or the bytes supplied to an edit, violate TOML's
    /// lexical grammar at the point of parsing.
    #[error("syntax error: {message}")]
    Syntax {
        /// What the lexer expected, or what condition failed.
        message: &'static str,
    },

    /// `find_by_name` (or `get_string`) found no element with that name.
    /// Ordinary control flow, not a defect.
    #[error("not found")]
    NotFound,

    /// The span handed to an operation has the wrong shape for it:
    /// `keyval_slice` on a non-keyval span, `get_text` on a multi-line span,
    /// `set_value` on a span that is not a value.
    #[error("type mismatch: {message}")]
    TypeMismatch {
        /// What shape was expected.
        message: &'static str,
    },

    /// A null/empty cursor, or `find_next` called on a leaf/slice span kind.
    #[error("invalid argument: {message}")]
    InvalidArg {
        /// What was wrong with the argument.
        message: &'static str,
    },
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io {
            message: err.to_string(),
        }
    }
}

/// `tomledit-core`'s result alias.
pub type Result<T> = std::result::Result<T, Error>;
