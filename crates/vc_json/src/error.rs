use alloc::string::String;

use thiserror::Error;

/// Result alias used throughout the codec.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Errors produced while resolving contracts, reading or writing JSON.
///
/// Paths are rendered in the `$.Member[index]` form, rooted at the value
/// passed to the codec.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A type's declaration cannot be turned into a usable contract.
    #[error("invalid contract for `{type_path}`: {reason}")]
    Contract {
        type_path: &'static str,
        reason: String,
    },
    /// An instance could not be produced or populated.
    #[error("cannot materialize `{type_path}` at {path}: {reason}")]
    Materialization {
        type_path: &'static str,
        path: String,
        reason: String,
    },
    /// A JSON value does not fit the target type.
    #[error("cannot convert {path} into `{target}`: {reason}")]
    Conversion {
        path: String,
        target: &'static str,
        reason: String,
    },
    /// The requested operation has no defined behavior.
    #[error("unsupported operation: {0}")]
    Unsupported(String),
    /// `Settings::max_depth` was exceeded.
    #[error("maximum nesting depth of {0} exceeded")]
    DepthExceeded(usize),
    /// The text is not well-formed JSON.
    #[error(transparent)]
    Syntax(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    #[inline]
    pub(crate) fn contract(type_path: &'static str, reason: impl Into<String>) -> Self {
        Self::Contract {
            type_path,
            reason: reason.into(),
        }
    }
}
