use anyhow::bail;

use crate::bootstrap::load_config;
use crate::cli::root_commands::GenerateArgs;
use crate::cli::{GlobalFlags, OutputFormat};
use crate::output::output;
use crate::pipeline::{self, GenerateOptions};

/// Handle `cxgen generate`.
pub fn handle(args: &GenerateArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let config = load_config(flags)?;
    if config.jobs.is_empty() {
        bail!("generate: no [[jobs]] configured");
    }

    let options = GenerateOptions {
        output_dir: args.output_dir.clone(),
        keep_going: args.keep_going,
        serial: args.serial,
        dry_run: args.dry_run,
    };
    let report = pipeline::generate(&config, &options)?;
    tracing::info!(
        outputs = report.outputs.len(),
        failures = report.failures.len(),
        "generation finished"
    );

    match flags.format {
        OutputFormat::Table => output(&report.outputs, flags.format)?,
        OutputFormat::Json | OutputFormat::Raw => output(&report, flags.format)?,
    }
    if !report.failures.is_empty() {
        bail!("{} job(s) failed", report.failures.len());
    }
    Ok(())
}
