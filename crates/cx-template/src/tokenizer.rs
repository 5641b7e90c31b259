//! Character-level state machine splitting template text into [`Token`]s.
//!
//! ```text
//! Content ──<#──▶ Block ──#>──▶ Content
//!         ──<#=─▶ Expression
//!         ──<#+─▶ Helper
//!         ──<#@─▶ Directive ─▶ DirectiveName ⇄ DirectiveValue ──#>──▶ Content
//! ```
//!
//! Inside code regions `\#>` stands for a literal `#>`. One newline right
//! after a closing `#>` is swallowed for blocks, helpers and directives so
//! that lines holding only code leave no blank line behind; expressions keep
//! it.

use crate::errors::TemplateError;
use crate::include::{IncludeResolver, NoIncludes};
use crate::location::Location;
use crate::token::{Directive, Token, TokenKind};

/// Default bound on `include` nesting.
pub const MAX_INCLUDE_DEPTH: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Content,
    Block,
    Expression,
    Helper,
    Directive,
    DirectiveName,
    DirectiveValue,
    Eof,
}

/// Turns template text into tokens, expanding includes in place.
pub struct Tokenizer<'r> {
    resolver: &'r dyn IncludeResolver,
    max_depth: usize,
}

impl Default for Tokenizer<'static> {
    fn default() -> Self {
        Self::new(&NoIncludes)
    }
}

impl<'r> Tokenizer<'r> {
    #[must_use]
    pub fn new(resolver: &'r dyn IncludeResolver) -> Self {
        Self {
            resolver,
            max_depth: MAX_INCLUDE_DEPTH,
        }
    }

    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Tokenize `text`, reporting locations against `file`.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Parse`] for unterminated regions and malformed
    /// directives, and include errors from the resolver.
    pub fn tokenize(&self, file: &str, text: &str) -> Result<Vec<Token>, TemplateError> {
        let mut tokens = Vec::new();
        self.run(file, text, 0, &mut tokens)?;
        Ok(tokens)
    }

    fn run(
        &self,
        file: &str,
        text: &str,
        depth: usize,
        tokens: &mut Vec<Token>,
    ) -> Result<(), TemplateError> {
        let mut lexer = Lexer::new(file, text);
        let mut state = State::Content;
        let mut buffer = String::new();
        let mut start = lexer.location();
        let mut directive = Directive {
            name: String::new(),
            attributes: Vec::new(),
        };
        let mut attribute = String::new();

        while state != State::Eof {
            match state {
                State::Content => {
                    if lexer.at_end() {
                        if !buffer.is_empty() {
                            tokens.push(Token::new(TokenKind::Content, take(&mut buffer), start));
                        }
                        state = State::Eof;
                        start = lexer.location();
                        continue;
                    }
                    if lexer.starts_with("<#") {
                        if !buffer.is_empty() {
                            tokens.push(Token::new(TokenKind::Content, take(&mut buffer), start.clone()));
                        }
                        lexer.advance_by(2);
                        state = match lexer.peek() {
                            Some('@') => State::Directive,
                            Some('=') => State::Expression,
                            Some('+') => State::Helper,
                            _ => State::Block,
                        };
                        if state != State::Block {
                            lexer.advance();
                        }
                        start = lexer.location();
                        continue;
                    }
                    if buffer.is_empty() {
                        start = lexer.location();
                    }
                    if let Some(c) = lexer.advance() {
                        buffer.push(c);
                    }
                }

                State::Block | State::Expression | State::Helper => {
                    if lexer.at_end() {
                        return Err(lexer.error(format!("unterminated {} region", region_name(state))));
                    }
                    if lexer.starts_with("\\#>") {
                        lexer.advance_by(3);
                        buffer.push_str("#>");
                        continue;
                    }
                    if lexer.starts_with("#>") {
                        lexer.advance_by(2);
                        let kind = match state {
                            State::Block => TokenKind::Block,
                            State::Expression => TokenKind::Expression,
                            _ => TokenKind::Helper,
                        };
                        if state != State::Expression {
                            lexer.skip_newline();
                        }
                        tokens.push(Token::new(kind, take(&mut buffer), start.clone()));
                        state = State::Content;
                        start = lexer.location();
                        continue;
                    }
                    if let Some(c) = lexer.advance() {
                        buffer.push(c);
                    }
                }

                State::Directive => {
                    lexer.skip_whitespace();
                    let name = lexer.take_identifier();
                    if name.is_empty() {
                        return Err(lexer.error("expected directive name"));
                    }
                    directive = Directive {
                        name,
                        attributes: Vec::new(),
                    };
                    state = State::DirectiveName;
                }

                State::DirectiveName => {
                    lexer.skip_whitespace();
                    if lexer.at_end() {
                        return Err(lexer.error("unterminated directive"));
                    }
                    if lexer.starts_with("#>") {
                        lexer.advance_by(2);
                        lexer.skip_newline();
                        let finished = std::mem::replace(
                            &mut directive,
                            Directive {
                                name: String::new(),
                                attributes: Vec::new(),
                            },
                        );
                        self.finish_directive(finished, file, &start, depth, tokens)?;
                        state = State::Content;
                        start = lexer.location();
                        continue;
                    }
                    attribute = lexer.take_identifier();
                    if attribute.is_empty() {
                        return Err(lexer.error("expected attribute name in directive"));
                    }
                    lexer.skip_whitespace();
                    if !lexer.eat('=') {
                        return Err(lexer.error(format!("expected '=' after attribute '{attribute}'")));
                    }
                    lexer.skip_whitespace();
                    if !lexer.eat('"') {
                        return Err(lexer.error(format!("expected '\"' to open value of '{attribute}'")));
                    }
                    state = State::DirectiveValue;
                }

                State::DirectiveValue => {
                    match lexer.advance() {
                        None => return Err(lexer.error("unterminated directive attribute value")),
                        Some('\\') if matches!(lexer.peek(), Some('"' | '\\')) => {
                            if let Some(c) = lexer.advance() {
                                buffer.push(c);
                            }
                        }
                        Some('"') => {
                            directive
                                .attributes
                                .push((take(&mut attribute), take(&mut buffer)));
                            state = State::DirectiveName;
                        }
                        Some(c) => buffer.push(c),
                    }
                }

                State::Eof => {}
            }
        }
        Ok(())
    }

    fn finish_directive(
        &self,
        directive: Directive,
        file: &str,
        location: &Location,
        depth: usize,
        tokens: &mut Vec<Token>,
    ) -> Result<(), TemplateError> {
        if !directive.name.eq_ignore_ascii_case("include") {
            let value = render_directive(&directive);
            tokens.push(Token::new(TokenKind::Directive(directive), value, location.clone()));
            return Ok(());
        }

        let Some(target) = directive.attribute("file") else {
            return Err(TemplateError::Parse {
                location: location.clone(),
                message: "include directive requires a file attribute".into(),
            });
        };
        if depth >= self.max_depth {
            return Err(TemplateError::IncludeDepth {
                location: location.clone(),
                file: target.to_string(),
                limit: self.max_depth,
            });
        }
        tracing::debug!(from = file, include = target, depth, "expanding include");
        let text = self.resolver.resolve(target)?;
        self.run(target, &text, depth + 1, tokens)
    }
}

fn region_name(state: State) -> &'static str {
    match state {
        State::Expression => "expression",
        State::Helper => "helper",
        _ => "block",
    }
}

fn take(buffer: &mut String) -> String {
    std::mem::take(buffer)
}

fn render_directive(directive: &Directive) -> String {
    let mut out = directive.name.clone();
    for (key, value) in &directive.attributes {
        out.push_str(&format!(" {key}=\"{value}\""));
    }
    out
}

// ── Lexer ──────────────────────────────────────────────────────────────

struct Lexer<'a> {
    file: &'a str,
    chars: Vec<char>,
    position: usize,
    line: u32,
    column: u32,
}

impl<'a> Lexer<'a> {
    fn new(file: &'a str, text: &str) -> Self {
        Self {
            file,
            chars: text.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    fn location(&self) -> Location {
        Location::new(self.file, self.line, self.column)
    }

    fn error(&self, message: impl Into<String>) -> TemplateError {
        TemplateError::Parse {
            location: self.location(),
            message: message.into(),
        }
    }

    fn at_end(&self) -> bool {
        self.position >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    fn starts_with(&self, pattern: &str) -> bool {
        let mut index = self.position;
        for expected in pattern.chars() {
            if self.chars.get(index) != Some(&expected) {
                return false;
            }
            index += 1;
        }
        true
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.position += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn advance_by(&mut self, count: usize) {
        for _ in 0..count {
            self.advance();
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn skip_newline(&mut self) {
        if self.starts_with("\r\n") {
            self.advance_by(2);
        } else if self.peek() == Some('\n') {
            self.advance();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn take_identifier(&mut self) -> String {
        let mut ident = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' || c == '-' || c == '.' {
                ident.push(c);
                self.advance();
            } else {
                break;
            }
        }
        ident
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds_and_values(text: &str) -> Vec<(String, String)> {
        Tokenizer::default()
            .tokenize("t.tt", text)
            .unwrap()
            .into_iter()
            .map(|t| (t.kind.as_str().to_string(), t.value))
            .collect()
    }

    fn pair(kind: &str, value: &str) -> (String, String) {
        (kind.to_string(), value.to_string())
    }

    #[test]
    fn plain_text_is_one_content_token() {
        assert_eq!(kinds_and_values("plain text"), vec![pair("content", "plain text")]);
    }

    #[test]
    fn block_splits_content() {
        assert_eq!(
            kinds_and_values("a<#b#>c"),
            vec![pair("content", "a"), pair("block", "b"), pair("content", "c")]
        );
    }

    #[test]
    fn expression_token() {
        assert_eq!(kinds_and_values("<#=expr#>"), vec![pair("expression", "expr")]);
    }

    #[test]
    fn helper_token() {
        assert_eq!(
            kinds_and_values("<#+ fn f() {} #>"),
            vec![pair("helper", " fn f() {} ")]
        );
    }

    #[test]
    fn newline_skipped_after_block_and_helper_only() {
        assert_eq!(
            kinds_and_values("<# x #>\nA<#= y #>\nB<#+ z #>\r\nC"),
            vec![
                pair("block", " x "),
                pair("content", "A"),
                pair("expression", " y "),
                pair("content", "\nB"),
                pair("helper", " z "),
                pair("content", "C"),
            ]
        );
    }

    #[test]
    fn only_one_newline_is_skipped() {
        assert_eq!(
            kinds_and_values("<# x #>\n\nA"),
            vec![pair("block", " x "), pair("content", "\nA")]
        );
    }

    #[test]
    fn escaped_terminator_stays_in_code() {
        assert_eq!(
            kinds_and_values(r#"<# let s = "\#>"; #>"#),
            vec![pair("block", r##" let s = "#>"; "##)]
        );
    }

    #[test]
    fn directive_attributes_are_parsed() {
        let tokens = Tokenizer::default()
            .tokenize("t.tt", "<#@ parameter name=\"element\" type=\"map\" #>\nbody")
            .unwrap();
        assert_eq!(tokens.len(), 2);
        let TokenKind::Directive(directive) = &tokens[0].kind else {
            panic!("expected directive, got {:?}", tokens[0].kind);
        };
        assert_eq!(directive.name, "parameter");
        assert_eq!(directive.attribute("name"), Some("element"));
        assert_eq!(directive.attribute("TYPE"), Some("map"));
        assert_eq!(tokens[1].value, "body");
    }

    #[test]
    fn locations_are_one_based() {
        let tokens = Tokenizer::default().tokenize("t.tt", "ab\ncd<#= x #>").unwrap();
        assert_eq!(tokens[0].location, Location::new("t.tt", 1, 1));
        assert_eq!(tokens[1].location, Location::new("t.tt", 2, 6));
    }

    #[test]
    fn unterminated_block_reports_end_location() {
        let err = Tokenizer::default().tokenize("t.tt", "a\n<# open").unwrap_err();
        match err {
            TemplateError::Parse { location, message } => {
                assert_eq!(location, Location::new("t.tt", 2, 8));
                assert!(message.contains("unterminated block"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn malformed_directive_is_parse_error() {
        for text in ["<#@ #>", "<#@ output extension #>", "<#@ output extension=cs #>", "<#@ output extension=\"cs"] {
            let err = Tokenizer::default().tokenize("t.tt", text).unwrap_err();
            assert!(matches!(err, TemplateError::Parse { .. }), "{text}: {err:?}");
        }
    }
}
