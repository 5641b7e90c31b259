//! Sources for `<#@ include file="…" #>`.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::errors::TemplateError;

/// Supplies the text of included templates.
pub trait IncludeResolver: Send + Sync {
    /// Return the contents of `file`.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::IncludeNotFound`] or [`TemplateError::Io`].
    fn resolve(&self, file: &str) -> Result<String, TemplateError>;
}

/// Rejects every include.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIncludes;

impl IncludeResolver for NoIncludes {
    fn resolve(&self, file: &str) -> Result<String, TemplateError> {
        Err(TemplateError::IncludeNotFound(file.to_string()))
    }
}

/// Looks includes up in an ordered list of directories.
#[derive(Debug, Clone, Default)]
pub struct FileIncludeResolver {
    search_dirs: Vec<PathBuf>,
}

impl FileIncludeResolver {
    #[must_use]
    pub fn new(search_dirs: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            search_dirs: search_dirs.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn search_dirs(&self) -> &[PathBuf] {
        &self.search_dirs
    }
}

impl IncludeResolver for FileIncludeResolver {
    fn resolve(&self, file: &str) -> Result<String, TemplateError> {
        let requested = PathBuf::from(file);
        let candidates: Vec<PathBuf> = if requested.is_absolute() {
            vec![requested]
        } else {
            self.search_dirs.iter().map(|dir| dir.join(file)).collect()
        };

        let Some(path) = candidates.into_iter().find(|p| p.is_file()) else {
            return Err(TemplateError::IncludeNotFound(file.to_string()));
        };
        tracing::debug!(path = %path.display(), "resolved include");
        std::fs::read_to_string(&path).map_err(|source| TemplateError::Io { path, source })
    }
}

/// Includes served from a map, keyed by the `file` attribute.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIncludes {
    files: HashMap<String, String>,
}

impl InMemoryIncludes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, file: impl Into<String>, text: impl Into<String>) -> Self {
        self.files.insert(file.into(), text.into());
        self
    }
}

impl IncludeResolver for InMemoryIncludes {
    fn resolve(&self, file: &str) -> Result<String, TemplateError> {
        self.files
            .get(file)
            .cloned()
            .ok_or_else(|| TemplateError::IncludeNotFound(file.to_string()))
    }
}
