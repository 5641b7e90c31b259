use std::io::Write;

use anyhow::Context;

use crate::bootstrap::load_config;
use crate::cli::GlobalFlags;
use crate::cli::root_commands::RenderArgs;
use crate::pipeline;

/// Handle `cxgen render`. Output is the generated text itself, whatever
/// `--format` says.
pub fn handle(args: &RenderArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let config = load_config(flags)?;
    let general = &config.general;
    let path = pipeline::resolve_template(general, &args.template)?;
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read template {}", path.display()))?;
    let compiled = pipeline::template_engine(general)
        .compile(&path.display().to_string(), &text)
        .with_context(|| format!("template {} does not compile", path.display()))?;

    let mut rendered = Vec::new();
    if args.element.is_some() || general.has_input() {
        let (module, _) = pipeline::prepare_model(&config)?;
        let module_param = pipeline::module_parameter(&module.view(module.root()))?;
        if let Some(pattern) = &args.element {
            let views =
                pipeline::matching_views(&module, pattern, args.kind, &general.include_scope())?;
            if views.is_empty() {
                tracing::warn!(%pattern, "no element matches");
            }
            for view in &views {
                let parameters =
                    pipeline::render_parameters(&module_param, Some(view), args.params.clone())?;
                rendered.push(compiled.process(&parameters)?);
            }
        } else {
            let parameters = pipeline::render_parameters(&module_param, None, args.params.clone())?;
            rendered.push(compiled.process(&parameters)?);
        }
    } else {
        let parameters: Vec<_> = args
            .params
            .iter()
            .map(|(name, value)| cx_template::TemplateParameter::string(name, value))
            .collect();
        rendered.push(compiled.process(&parameters)?);
    }

    let mut stdout = std::io::stdout().lock();
    for text in rendered {
        stdout.write_all(text.as_bytes())?;
    }
    stdout.flush()?;
    Ok(())
}
