//! # cx-config
//!
//! Layered configuration loading for cxgen using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`CXGEN_*` prefix, `__` as separator)
//! 2. Project-level `cxgen.toml`
//! 3. User-level `~/.config/cxgen/config.toml`
//! 4. Built-in defaults
//!
//! Figment maps `CXGEN_GENERAL__OUTPUT_DIR` -> `general.output_dir`.
//!
//! # Usage
//!
//! ```no_run
//! use cx_config::CxConfig;
//!
//! let config = CxConfig::load_with_dotenv().expect("config");
//! config.validate().expect("valid config");
//! for job in &config.jobs {
//!     println!("{} -> {}", job.label(), job.output);
//! }
//! ```

mod error;
mod general;
mod job;

pub use error::ConfigError;
pub use general::GeneralConfig;
pub use job::JobConfig;

use std::path::{Path, PathBuf};

use cx_core::{Query, Rule, RuleAction};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Project-local config file name.
pub const PROJECT_FILE: &str = "cxgen.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct CxConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    /// Applied in order before any job runs.
    #[serde(default)]
    pub rules: Vec<Rule>,
    #[serde(default)]
    pub jobs: Vec<JobConfig>,
}

impl CxConfig {
    /// Load configuration from the user and project files plus environment
    /// variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] when a source cannot be read or does
    /// not fit the config shape.
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self::figment().extract()?)
    }

    /// [`load`](Self::load) after reading `.env` into the process environment.
    ///
    /// # Errors
    ///
    /// As [`load`](Self::load).
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        // a missing .env is fine
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Load an explicit config file in place of the user and project files.
    /// Environment variables still override it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] when `path` does not exist, otherwise
    /// as [`load`](Self::load).
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let figment = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Self::env());
        Ok(figment.extract()?)
    }

    /// Build the figment provider chain.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        let local_path = PathBuf::from(PROJECT_FILE);
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Self::env())
    }

    /// Check what serde cannot: patterns compile and every job names a
    /// template and an output.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError::InvalidValue`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (idx, rule) in self.rules.iter().enumerate() {
            let field = format!("rules[{idx}].pattern");
            check_pattern(&field, &rule.pattern)?;
            if let RuleAction::Move { to } = &rule.action {
                check_pattern(&format!("rules[{idx}].to"), to)?;
            }
        }
        for (idx, job) in self.jobs.iter().enumerate() {
            if job.template.as_os_str().is_empty() {
                return Err(ConfigError::invalid(
                    format!("jobs[{idx}].template"),
                    "a job needs a template",
                ));
            }
            if job.output.trim().is_empty() {
                return Err(ConfigError::invalid(
                    format!("jobs[{idx}].output"),
                    "a job needs an output path",
                ));
            }
            if let Some(pattern) = &job.pattern {
                check_pattern(&format!("jobs[{idx}].pattern"), pattern)?;
            }
        }
        Ok(())
    }

    fn env() -> Env {
        Env::prefixed("CXGEN_").split("__")
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("cxgen").join("config.toml"))
    }
}

fn check_pattern(field: &str, pattern: &str) -> Result<(), ConfigError> {
    if pattern.is_empty() {
        return Err(ConfigError::invalid(field, "pattern must not be empty"));
    }
    Query::new(pattern).map_err(|err| ConfigError::invalid(field, err))?;
    Ok(())
}
