//! Header parsing entry points.

use std::path::Path;

use ast_grep_core::{Doc, Node};
use ast_grep_language::{LanguageExt, SupportLang};
use cx_core::{CppElement, CppModule, ElementKind, NodeId};

use crate::annotations;
use crate::error::ParserError;
use crate::extract::Extractor;

/// Parses C/C++ headers into `Include` subtrees of a [`CppModule`].
#[derive(Debug, Clone, Default)]
pub struct HeaderParser {
    dll_name: Option<String>,
    strict: bool,
}

impl HeaderParser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// DLL recorded on every free function parsed.
    #[must_use]
    pub fn with_dll_name(mut self, dll_name: impl Into<String>) -> Self {
        self.dll_name = Some(dll_name.into());
        self
    }

    /// Fail on the first syntax error instead of skipping the region.
    #[must_use]
    pub const fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Parse `source` and append it to `module` as an `Include` named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ParserError::Syntax`] in strict mode when the header does not
    /// parse cleanly.
    pub fn parse_header(
        &self,
        module: &mut CppModule,
        name: &str,
        source: &str,
    ) -> Result<NodeId, ParserError> {
        let prepared = annotations::prepare(source);
        let tree = SupportLang::Cpp.ast_grep(&prepared.masked);
        let root = tree.root();
        self.check_syntax(name, &prepared.masked, &root)?;

        let include = module.add_new(module.root(), CppElement::new(name, ElementKind::Include));
        let mut extractor =
            Extractor::new(module, source, &prepared.guids, self.dll_name.as_deref());
        extractor.extract_items(include, &root);
        tracing::debug!(
            include = name,
            declarations = module.children(include).len(),
            "parsed header"
        );
        Ok(include)
    }

    /// Read and parse one header; the include is named after the file stem.
    ///
    /// # Errors
    ///
    /// Returns [`ParserError::Io`] when the file cannot be read,
    /// [`ParserError::InvalidFileName`] for paths without a stem, and parse
    /// errors as [`parse_header`](Self::parse_header).
    pub fn parse_file(&self, module: &mut CppModule, path: &Path) -> Result<NodeId, ParserError> {
        let name = include_name(path)?;
        let source = std::fs::read_to_string(path).map_err(|source| ParserError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse_header(module, &name, &source)
    }

    /// Build a module from a list of header files, in order.
    ///
    /// # Errors
    ///
    /// Returns [`ParserError::NoHeaders`] for an empty list, otherwise the
    /// first error from [`parse_file`](Self::parse_file).
    pub fn parse_files<P: AsRef<Path>>(
        &self,
        module_name: &str,
        paths: &[P],
    ) -> Result<CppModule, ParserError> {
        if paths.is_empty() {
            return Err(ParserError::NoHeaders);
        }
        let mut module = CppModule::new(module_name);
        for path in paths {
            self.parse_file(&mut module, path.as_ref())?;
        }
        Ok(module)
    }

    /// Parse a single in-memory header into a fresh module.
    ///
    /// # Errors
    ///
    /// As [`parse_header`](Self::parse_header).
    pub fn parse_source(
        &self,
        module_name: &str,
        include: &str,
        source: &str,
    ) -> Result<CppModule, ParserError> {
        let mut module = CppModule::new(module_name);
        self.parse_header(&mut module, include, source)?;
        Ok(module)
    }

    fn check_syntax<D: Doc>(
        &self,
        file: &str,
        text: &str,
        root: &Node<'_, D>,
    ) -> Result<(), ParserError> {
        let mut errors = Vec::new();
        collect_errors(root, &mut errors);
        for &(start, end) in &errors {
            let (line, column) = line_column(text, start);
            let snippet: String = text
                .get(start..end)
                .unwrap_or_default()
                .lines()
                .next()
                .unwrap_or_default()
                .chars()
                .take(40)
                .collect();
            if self.strict {
                return Err(ParserError::Syntax {
                    file: file.to_string(),
                    line,
                    column,
                    snippet,
                });
            }
            tracing::warn!(file, line, column, %snippet, "syntax error in header");
        }
        Ok(())
    }
}

/// Include name for a header path: its file stem.
///
/// # Errors
///
/// Returns [`ParserError::InvalidFileName`] when the path has no UTF-8 stem.
pub fn include_name(path: &Path) -> Result<String, ParserError> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
        .ok_or_else(|| ParserError::InvalidFileName(path.to_path_buf()))
}

fn collect_errors<D: Doc>(node: &Node<'_, D>, out: &mut Vec<(usize, usize)>) {
    if node.kind().as_ref() == "ERROR" {
        let range = node.range();
        out.push((range.start, range.end));
        return;
    }
    for child in node.children() {
        collect_errors(&child, out);
    }
}

/// 1-based line and column of a byte offset.
fn line_column(text: &str, offset: usize) -> (usize, usize) {
    let before = text.get(..offset).unwrap_or(text);
    let line = before.matches('\n').count() + 1;
    let column = before.rfind('\n').map_or(before.len(), |nl| before.len() - nl - 1) + 1;
    (line, column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn include_name_is_file_stem() {
        assert_eq!(include_name(Path::new("sdk/d3d11.h")).unwrap(), "d3d11");
        assert!(include_name(Path::new("")).is_err());
    }

    #[test]
    fn line_column_counts_from_one() {
        let text = "ab\ncd\nef";
        assert_eq!(line_column(text, 0), (1, 1));
        assert_eq!(line_column(text, 4), (2, 2));
        assert_eq!(line_column(text, 6), (3, 1));
    }

    #[test]
    fn strict_mode_rejects_syntax_errors() {
        let err = HeaderParser::new()
            .strict(true)
            .parse_source("m", "broken", "struct Ok { int x; };\n@@@\n")
            .unwrap_err();
        assert!(matches!(err, ParserError::Syntax { ref file, .. } if file == "broken"));
    }

    #[test]
    fn lenient_mode_keeps_going() {
        let module = HeaderParser::new()
            .parse_source("m", "partial", "struct Ok { int x; };\n@@@ ;\nenum E { A };\n")
            .unwrap();
        let include = module.children(module.root())[0];
        assert!(!module.children(include).is_empty());
    }

    #[test]
    fn parse_files_requires_input() {
        let paths: [&Path; 0] = [];
        assert!(matches!(
            HeaderParser::new().parse_files("m", &paths),
            Err(ParserError::NoHeaders)
        ));
    }
}
