use std::path::PathBuf;

use clap::{Args, Subcommand};
use cx_core::Kind;

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Parse headers, apply rules and render every configured job.
    Generate(GenerateArgs),
    /// Parse headers and print the model document.
    Parse(ParseArgs),
    /// List model elements whose full name matches a pattern.
    Find(FindArgs),
    /// Render one template to stdout.
    Render(RenderArgs),
    /// Dump the token stream of a template.
    Tokens(TokensArgs),
    /// Print a registered JSON schema, or list them.
    Schema(SchemaArgs),
}

#[derive(Clone, Debug, Args)]
pub struct GenerateArgs {
    /// Write outputs under this directory instead of `general.output_dir`
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Skip failing jobs instead of stopping
    #[arg(long)]
    pub keep_going: bool,

    /// Render jobs one at a time
    #[arg(long)]
    pub serial: bool,

    /// Render but do not write any file
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Clone, Debug, Args)]
pub struct ParseArgs {
    /// Header files (defaults to `general.headers`)
    pub headers: Vec<PathBuf>,

    /// Module name (defaults to `general.module_name`)
    #[arg(short, long)]
    pub module: Option<String>,

    /// DLL name recorded on free functions
    #[arg(long)]
    pub dll: Option<String>,

    /// Fail on the first syntax error
    #[arg(long)]
    pub strict: bool,

    /// Apply the configured rules before printing
    #[arg(long)]
    pub rules: bool,
}

#[derive(Clone, Debug, Args)]
pub struct FindArgs {
    /// Regex matched against the whole full name
    pub pattern: String,

    /// Restrict matches to one element kind
    #[arg(short, long)]
    pub kind: Option<Kind>,

    /// Search the model before the configured rules run
    #[arg(long)]
    pub no_rules: bool,
}

#[derive(Clone, Debug, Args)]
pub struct RenderArgs {
    /// Template file, as a path or relative to `general.template_dirs`
    pub template: PathBuf,

    /// Render once per element matching this pattern
    #[arg(short, long)]
    pub element: Option<String>,

    /// Kind filter for `--element`
    #[arg(short, long, requires = "element")]
    pub kind: Option<Kind>,

    /// Extra string parameter, `name=value` (repeatable)
    #[arg(long = "param", value_parser = parse_key_value)]
    pub params: Vec<(String, String)>,
}

#[derive(Clone, Debug, Args)]
pub struct TokensArgs {
    /// Template file, as a path or relative to `general.template_dirs`
    pub template: PathBuf,
}

#[derive(Clone, Debug, Args)]
pub struct SchemaArgs {
    /// Schema name; omit to list registered names
    pub name: Option<String>,
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected name=value, got '{raw}'"))
}
