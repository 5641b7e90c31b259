//! Template error types.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::location::Location;

/// One compiler message, with the template position it maps back to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    pub location: Option<Location>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{location}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

fn join_diagnostics(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Error)]
pub enum TemplateError {
    /// Structural error in the template text.
    #[error("{location}: {message}")]
    Parse { location: Location, message: String },

    /// Includes nested deeper than the tokenizer allows.
    #[error("{location}: include depth exceeds {limit} while including '{file}'")]
    IncludeDepth {
        location: Location,
        file: String,
        limit: usize,
    },

    /// An include resolver could not find the requested file.
    #[error("Include not found: {0}")]
    IncludeNotFound(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A `<# #>` block appeared after the first `<#+ #>` helper.
    #[error("{location}: code block after a helper block")]
    BlockAfterHelper { location: Location },

    /// The assembled script did not compile.
    #[error("Template {file} failed to compile: {}", join_diagnostics(.diagnostics))]
    Compile {
        file: String,
        diagnostics: Vec<Diagnostic>,
    },

    /// A parameter the template declares was not supplied.
    #[error("Missing template parameter: {0}")]
    MissingParameter(String),

    /// A supplied parameter does not have the declared type.
    #[error("Parameter '{name}' expects {expected}, got {actual}")]
    ParameterType {
        name: String,
        expected: String,
        actual: String,
    },

    /// The script failed while running.
    #[error("{}{message}", .location.as_ref().map(|l| format!("{l}: ")).unwrap_or_default())]
    Runtime {
        location: Option<Location>,
        message: String,
    },

    /// Bad `{N}` format string passed to `write_format`.
    #[error("Format error: {0}")]
    Format(String),
}
