//! # cx-template
//!
//! Text templates with `<# … #>` code regions, executed by an embedded rhai
//! engine.
//!
//! Template syntax:
//! - plain text is copied to the output
//! - `<# code #>` runs statements
//! - `<#= expr #>` writes the value of an expression
//! - `<#+ code #>` declares helper functions, placed after the main body
//! - `<#@ name attr="value" #>` directives: `include`, `import`,
//!   `parameter`, `output`
//!
//! The pipeline is [`tokenizer`] → [`script`] → [`engine`], with output
//! accumulated in a [`Templatizer`].

pub mod engine;
pub mod errors;
pub mod include;
pub mod location;
pub mod parameter;
pub mod script;
pub mod templatizer;
pub mod token;
pub mod tokenizer;

pub use engine::{CompiledTemplate, TemplateEngine};
pub use errors::{Diagnostic, TemplateError};
pub use include::{FileIncludeResolver, InMemoryIncludes, IncludeResolver, NoIncludes};
pub use location::Location;
pub use parameter::{ParamType, TemplateParameter};
pub use templatizer::{Templatizer, format_text};
pub use token::{Directive, Token, TokenKind};
pub use tokenizer::Tokenizer;
