use anyhow::Context;
use cx_core::{CppModule, apply_rules};

use crate::bootstrap::load_config;
use crate::cli::GlobalFlags;
use crate::cli::root_commands::ParseArgs;
use crate::output::output;
use crate::pipeline;

/// Handle `cxgen parse`.
pub fn handle(args: &ParseArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let config = load_config(flags)?;
    let general = &config.general;

    let mut module = if args.headers.is_empty() {
        pipeline::load_model(general)?
    } else {
        let module_name = args.module.as_deref().unwrap_or(&general.module_name);
        let dll_name = args.dll.as_deref().or(general.dll_name.as_deref());
        let parser = pipeline::header_parser(dll_name, args.strict || general.strict);
        let mut module = CppModule::new(module_name);
        for path in &args.headers {
            parser
                .parse_file(&mut module, path)
                .with_context(|| format!("failed to parse {}", path.display()))?;
        }
        module
    };

    if args.rules {
        let affected = apply_rules(&mut module, &config.rules, &general.include_scope())
            .context("failed to apply rules")?;
        tracing::debug!(affected, "rules applied");
    }

    output(&module.to_document(module.root()), flags.format)
}
