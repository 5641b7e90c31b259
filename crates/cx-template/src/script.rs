//! Assembly of a token stream into one rhai script.
//!
//! The script has three sections, in order: imports, the body (everything
//! up to the first helper), and the helper section. Every fragment is
//! preceded by a `// #line` comment and recorded in a line map so compiler
//! and runtime positions can be reported against the template.

use std::fmt::Write as _;

use crate::errors::TemplateError;
use crate::location::Location;
use crate::parameter::ParamType;
use crate::token::{Directive, Token, TokenKind};

/// Script line (1-based) where a template fragment starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMarker {
    pub script_line: usize,
    pub location: Location,
}

/// A parameter declared with `<#@ parameter name="…" type="…" #>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredParameter {
    pub name: String,
    pub param_type: ParamType,
}

/// The assembled script and what the directives declared.
#[derive(Debug, Clone, Default)]
pub struct Script {
    pub source: String,
    pub line_map: Vec<LineMarker>,
    pub parameters: Vec<DeclaredParameter>,
    pub output_extension: Option<String>,
}

impl Script {
    /// Build the script for `tokens`.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::BlockAfterHelper`] when a code block follows a
    /// helper, and [`TemplateError::Parse`] for directives missing required
    /// attributes.
    pub fn assemble(tokens: &[Token]) -> Result<Self, TemplateError> {
        let mut imports = Section::default();
        let mut body = Section::default();
        let mut helpers = Section::default();
        let mut parameters = Vec::new();
        let mut output_extension = None;
        let mut in_helpers = false;

        for token in tokens {
            let target = if in_helpers { &mut helpers } else { &mut body };
            match &token.kind {
                TokenKind::Content => target.push(&token.location, &content_statements(&token.value)),
                TokenKind::Expression => {
                    target.push(&token.location, &format!("write({}\n);", token.value));
                }
                TokenKind::Block => {
                    if in_helpers {
                        return Err(TemplateError::BlockAfterHelper {
                            location: token.location.clone(),
                        });
                    }
                    body.push(&token.location, &token.value);
                }
                TokenKind::Helper => {
                    in_helpers = true;
                    helpers.push(&token.location, &token.value);
                }
                TokenKind::Directive(directive) => match directive.name.to_ascii_lowercase().as_str() {
                    "import" => imports.push(&token.location, &import_statement(directive, &token.location)?),
                    "parameter" => parameters.push(declared_parameter(directive, &token.location)?),
                    "output" => {
                        output_extension = directive.attribute("extension").map(str::to_string);
                    }
                    "template" | "assembly" => {
                        tracing::debug!(directive = %directive.name, "directive has no effect");
                    }
                    _ => tracing::warn!(
                        directive = %directive.name,
                        location = %token.location,
                        "ignoring unknown directive"
                    ),
                },
            }
        }

        let mut script = Self {
            parameters,
            output_extension,
            ..Self::default()
        };
        for section in [imports, body, helpers] {
            script.append(section);
        }
        Ok(script)
    }

    fn append(&mut self, section: Section) {
        let offset = self.source.matches('\n').count();
        self.line_map.extend(section.markers.into_iter().map(|m| LineMarker {
            script_line: m.script_line + offset,
            location: m.location,
        }));
        self.source.push_str(&section.text);
    }

    /// Template location for a 1-based script line.
    #[must_use]
    pub fn locate(&self, script_line: usize) -> Option<Location> {
        let marker = self
            .line_map
            .iter()
            .take_while(|m| m.script_line <= script_line)
            .last()?;
        let delta = u32::try_from(script_line - marker.script_line).unwrap_or(u32::MAX);
        let mut location = marker.location.clone();
        if delta > 0 {
            location.line = location.line.saturating_add(delta);
            location.column = 1;
        }
        Some(location)
    }

    #[must_use]
    pub fn declared(&self, name: &str) -> Option<&DeclaredParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

#[derive(Default)]
struct Section {
    text: String,
    markers: Vec<LineMarker>,
}

impl Section {
    fn push(&mut self, location: &Location, code: &str) {
        let _ = writeln!(self.text, "// #line {location}");
        self.markers.push(LineMarker {
            script_line: self.text.matches('\n').count() + 1,
            location: location.clone(),
        });
        self.text.push_str(code);
        self.text.push('\n');
    }
}

/// `write_line` per complete line, `write` for a trailing partial line.
fn content_statements(text: &str) -> String {
    let mut out = String::new();
    let mut lines = text.split('\n').peekable();
    while let Some(line) = lines.next() {
        if lines.peek().is_some() {
            let _ = write!(out, "write_line(\"{}\"); ", escape(line));
        } else if !line.is_empty() {
            let _ = write!(out, "write(\"{}\"); ", escape(line));
        }
    }
    out.trim_end().to_string()
}

/// Escape text for a rhai double-quoted string literal.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out
}

fn missing(directive: &Directive, attribute: &str, location: &Location) -> TemplateError {
    TemplateError::Parse {
        location: location.clone(),
        message: format!("{} directive requires a {attribute} attribute", directive.name),
    }
}

fn import_statement(directive: &Directive, location: &Location) -> Result<String, TemplateError> {
    let namespace = directive
        .attribute("namespace")
        .ok_or_else(|| missing(directive, "namespace", location))?;
    Ok(match directive.attribute("as") {
        Some(alias) => format!("import \"{}\" as {alias};", escape(namespace)),
        None => format!("import \"{}\";", escape(namespace)),
    })
}

fn declared_parameter(
    directive: &Directive,
    location: &Location,
) -> Result<DeclaredParameter, TemplateError> {
    let name = directive
        .attribute("name")
        .ok_or_else(|| missing(directive, "name", location))?;
    let type_name = directive.attribute("type").unwrap_or("any");
    let param_type = ParamType::from_name(type_name).ok_or_else(|| TemplateError::Parse {
        location: location.clone(),
        message: format!("unknown parameter type '{type_name}'"),
    })?;
    Ok(DeclaredParameter {
        name: name.to_string(),
        param_type,
    })
}
