use anyhow::Context;
use cx_config::CxConfig;

use crate::cli::GlobalFlags;

/// Load and validate configuration: `--config` when given, otherwise the
/// layered user/project/env chain. `.env` is read either way.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<CxConfig> {
    let config = match &flags.config {
        Some(path) => {
            let _ = dotenvy::dotenv();
            CxConfig::load_from(path)
                .with_context(|| format!("failed to load config file {}", path.display()))?
        }
        None => CxConfig::load_with_dotenv().context("failed to load cxgen configuration")?,
    };
    config.validate().context("invalid cxgen configuration")?;
    tracing::debug!(
        rules = config.rules.len(),
        jobs = config.jobs.len(),
        "configuration loaded"
    );
    Ok(config)
}
