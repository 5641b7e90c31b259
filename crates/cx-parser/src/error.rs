//! Parser error types for cx-parser.

use std::path::PathBuf;

/// Errors that can occur while reading and parsing headers.
#[derive(Debug, thiserror::Error)]
pub enum ParserError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Header path has no file name: {}", .0.display())]
    InvalidFileName(PathBuf),

    #[error("No header files given")]
    NoHeaders,

    /// Only raised in strict mode; otherwise syntax errors are logged and the
    /// unparsable region is skipped.
    #[error("Syntax error in {file} at line {line}, column {column}: {snippet}")]
    Syntax {
        file: String,
        line: usize,
        column: usize,
        snippet: String,
    },
}
