//! General generation settings.

use std::path::PathBuf;

use cx_core::IncludeScope;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

fn default_module_name() -> String {
    "module".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("generated")
}

fn default_template_dirs() -> Vec<PathBuf> {
    vec![PathBuf::from("templates")]
}

const fn default_parallel() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct GeneralConfig {
    /// Name of the module built from the headers.
    #[serde(default = "default_module_name")]
    pub module_name: String,

    /// Directory job outputs are written under.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Directories searched, in order, for templates and `<#@ include #>` files.
    #[serde(default = "default_template_dirs")]
    pub template_dirs: Vec<PathBuf>,

    /// Headers parsed into the module, one `Include` each.
    #[serde(default)]
    pub headers: Vec<PathBuf>,

    /// JSON model document used instead of `headers`.
    #[serde(default)]
    pub model: Option<PathBuf>,

    /// DLL name recorded on parsed free functions.
    #[serde(default)]
    pub dll_name: Option<String>,

    /// Fail on header syntax errors instead of skipping them.
    #[serde(default)]
    pub strict: bool,

    /// Render jobs on the rayon pool.
    #[serde(default = "default_parallel")]
    pub parallel: bool,

    /// Skip a failing job and carry on with the rest.
    #[serde(default)]
    pub keep_going: bool,

    /// Include names rules and jobs are scoped to; empty means all.
    #[serde(default)]
    pub context: Vec<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            module_name: default_module_name(),
            output_dir: default_output_dir(),
            template_dirs: default_template_dirs(),
            headers: Vec::new(),
            model: None,
            dll_name: None,
            strict: false,
            parallel: default_parallel(),
            keep_going: false,
            context: Vec::new(),
        }
    }
}

impl GeneralConfig {
    /// Whether any model source is configured.
    #[must_use]
    pub fn has_input(&self) -> bool {
        self.model.is_some() || !self.headers.is_empty()
    }

    /// Scope that rules and jobs apply within.
    #[must_use]
    pub fn include_scope(&self) -> IncludeScope {
        IncludeScope::new(self.context.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = GeneralConfig::default();
        assert_eq!(config.module_name, "module");
        assert_eq!(config.output_dir, PathBuf::from("generated"));
        assert_eq!(config.template_dirs, vec![PathBuf::from("templates")]);
        assert!(config.parallel);
        assert!(!config.keep_going);
        assert!(!config.has_input());
    }
}
