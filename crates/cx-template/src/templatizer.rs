//! The output writer templates write into.

use std::fmt;

use crate::errors::TemplateError;

/// Accumulates generated text, prefixing every non-empty line with the
/// current indentation.
///
/// Indents form a stack; the prefix is their concatenation in push order.
/// The prefix is applied when the first character of a line is written, so
/// pushing an indent mid-line affects the next line only.
#[derive(Debug, Clone)]
pub struct Templatizer {
    buffer: String,
    indents: Vec<String>,
    at_line_start: bool,
}

impl Default for Templatizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Templatizer {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buffer: String::new(),
            indents: Vec::new(),
            at_line_start: true,
        }
    }

    pub fn write(&mut self, text: &str) {
        for (index, segment) in text.split('\n').enumerate() {
            if index > 0 {
                self.buffer.push('\n');
                self.at_line_start = true;
            }
            if segment.is_empty() {
                continue;
            }
            if self.at_line_start {
                for indent in &self.indents {
                    self.buffer.push_str(indent);
                }
                self.at_line_start = false;
            }
            self.buffer.push_str(segment);
        }
    }

    pub fn write_line(&mut self, text: &str) {
        self.write(text);
        self.new_line();
    }

    pub fn new_line(&mut self) {
        self.buffer.push('\n');
        self.at_line_start = true;
    }

    /// Write `format` with `{0}`, `{1}`… replaced by `args`.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Format`] for malformed placeholders.
    pub fn write_format<T: fmt::Display>(
        &mut self,
        format: &str,
        args: &[T],
    ) -> Result<(), TemplateError> {
        let text = format_text(format, args)?;
        self.write(&text);
        Ok(())
    }

    /// `write_format` followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Format`] for malformed placeholders.
    pub fn write_line_format<T: fmt::Display>(
        &mut self,
        format: &str,
        args: &[T],
    ) -> Result<(), TemplateError> {
        self.write_format(format, args)?;
        self.new_line();
        Ok(())
    }

    pub fn write_display(&mut self, value: &impl fmt::Display) {
        self.write(&value.to_string());
    }

    pub fn push_indent(&mut self, indent: impl Into<String>) {
        self.indents.push(indent.into());
    }

    pub fn pop_indent(&mut self) -> Option<String> {
        self.indents.pop()
    }

    pub fn clear_indent(&mut self) {
        self.indents.clear();
    }

    #[must_use]
    pub fn current_indent(&self) -> String {
        self.indents.concat()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.buffer
    }

    /// Drop all text and indentation.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.indents.clear();
        self.at_line_start = true;
    }

    /// Return the accumulated text and reset the writer.
    pub fn take(&mut self) -> String {
        let text = std::mem::take(&mut self.buffer);
        self.clear();
        text
    }
}

impl fmt::Display for Templatizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.buffer)
    }
}

/// Expand `{N}` placeholders with the `N`th argument. `{{` and `}}` are
/// literal braces.
///
/// # Errors
///
/// Returns [`TemplateError::Format`] for an unclosed or non-numeric
/// placeholder, an index past the end of `args`, or a stray `}`.
pub fn format_text<T: fmt::Display>(format: &str, args: &[T]) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(format.len());
    let mut chars = format.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut digits = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(d) if d.is_ascii_digit() => digits.push(d),
                        Some(other) => {
                            return Err(TemplateError::Format(format!(
                                "unexpected '{other}' in placeholder of \"{format}\""
                            )));
                        }
                        None => {
                            return Err(TemplateError::Format(format!(
                                "unclosed placeholder in \"{format}\""
                            )));
                        }
                    }
                }
                let index: usize = digits.parse().map_err(|_| {
                    TemplateError::Format(format!("empty placeholder in \"{format}\""))
                })?;
                let arg = args.get(index).ok_or_else(|| {
                    TemplateError::Format(format!(
                        "placeholder {{{index}}} has no argument ({} given)",
                        args.len()
                    ))
                })?;
                out.push_str(&arg.to_string());
            }
            '}' => {
                return Err(TemplateError::Format(format!(
                    "unmatched '}}' in \"{format}\""
                )));
            }
            other => out.push(other),
        }
    }
    Ok(out)
}
