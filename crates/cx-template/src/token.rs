use serde::Serialize;

use crate::location::Location;

/// A `<#@ name attr="value" … #>` directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Directive {
    pub name: String,
    pub attributes: Vec<(String, String)>,
}

impl Directive {
    /// Attribute value by name, ignoring ASCII case.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Content,
    Block,
    Expression,
    Helper,
    Directive(Directive),
}

impl TokenKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::Block => "block",
            Self::Expression => "expression",
            Self::Helper => "helper",
            Self::Directive(_) => "directive",
        }
    }
}

/// One lexical unit of a template.
///
/// `value` is the text between the delimiters for code tokens, the raw
/// text for content, and the directive source for directives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub location: Location,
}

impl Token {
    #[must_use]
    pub fn new(kind: TokenKind, value: impl Into<String>, location: Location) -> Self {
        Self {
            kind,
            value: value.into(),
            location,
        }
    }
}
