//! Error types for the declaration model.

use thiserror::Error;

/// Errors raised while querying or rewriting a [`CppModule`](crate::CppModule).
#[derive(Debug, Error)]
pub enum ModelError {
    /// A path pattern failed to compile as a regular expression.
    #[error("Invalid path pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A kind name did not match any known element kind.
    #[error("Unknown element kind: {0}")]
    UnknownKind(String),

    /// A `move` rule found no destination element.
    #[error("No element matches move target '{0}'")]
    MissingTarget(String),

    /// A model document could not be turned into a module.
    #[error("Invalid model document: {0}")]
    InvalidDocument(String),
}
