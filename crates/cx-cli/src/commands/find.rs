use cx_core::Kind;
use serde::Serialize;

use crate::bootstrap::load_config;
use crate::cli::GlobalFlags;
use crate::cli::root_commands::FindArgs;
use crate::output::output;
use crate::pipeline;

#[derive(Debug, Serialize)]
struct FoundElement {
    full_name: String,
    kind: Kind,
    mapped_name: Option<String>,
}

/// Handle `cxgen find`.
pub fn handle(args: &FindArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let config = load_config(flags)?;
    let module = if args.no_rules {
        pipeline::load_model(&config.general)?
    } else {
        pipeline::prepare_model(&config)?.0
    };

    let scope = config.general.include_scope();
    let found: Vec<FoundElement> =
        pipeline::matching_views(&module, &args.pattern, args.kind, &scope)?
            .into_iter()
            .map(|view| FoundElement {
                full_name: view.full_name.unwrap_or_default(),
                kind: view.kind.kind(),
                mapped_name: view.mapped_name,
            })
            .collect();
    tracing::debug!(pattern = %args.pattern, matches = found.len(), "find");
    output(&found, flags.format)
}
