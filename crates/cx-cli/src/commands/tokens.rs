use anyhow::Context;
use cx_template::Token;
use serde::Serialize;

use crate::bootstrap::load_config;
use crate::cli::root_commands::TokensArgs;
use crate::cli::{GlobalFlags, OutputFormat};
use crate::output::output;
use crate::pipeline;

#[derive(Debug, Serialize)]
struct TokenRow {
    location: String,
    kind: &'static str,
    value: String,
}

impl From<&Token> for TokenRow {
    fn from(token: &Token) -> Self {
        Self {
            location: token.location.to_string(),
            kind: token.kind.as_str(),
            value: token.value.replace('\r', "\\r").replace('\n', "\\n"),
        }
    }
}

/// Handle `cxgen tokens`.
pub fn handle(args: &TokensArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let config = load_config(flags)?;
    let path = pipeline::resolve_template(&config.general, &args.template)?;
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read template {}", path.display()))?;
    let tokens = pipeline::template_engine(&config.general)
        .tokenize(&path.display().to_string(), &text)?;

    match flags.format {
        OutputFormat::Table => {
            let rows: Vec<TokenRow> = tokens.iter().map(TokenRow::from).collect();
            output(&rows, flags.format)
        }
        OutputFormat::Json | OutputFormat::Raw => output(&tokens, flags.format),
    }
}
