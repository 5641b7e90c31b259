//! Template jobs: which template to render, against what, and where the
//! output goes.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use cx_core::Kind;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct JobConfig {
    /// Label used in logs and progress output; defaults to the template stem.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Template file, relative to one of `general.template_dirs`.
    #[serde(default)]
    pub template: PathBuf,

    /// Render once per element matching this pattern; absent renders once
    /// against the module.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<Kind>,

    /// Output path under `general.output_dir`; `{name}` and `{full_name}`
    /// are replaced per rendered element.
    #[serde(default)]
    pub output: String,

    /// Extra string parameters bound in the template scope.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, String>,
}

impl JobConfig {
    #[must_use]
    pub fn new(template: impl Into<PathBuf>, output: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            output: output.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>, kind: Option<Kind>) -> Self {
        self.pattern = Some(pattern.into());
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn label(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        self.template
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("job")
            .to_string()
    }

    /// Output file for one render, relative to `output_dir`.
    #[must_use]
    pub fn output_path(&self, output_dir: &Path, name: &str, full_name: &str) -> PathBuf {
        let relative = self
            .output
            .replace("{name}", &flatten(name))
            .replace("{full_name}", &flatten(full_name));
        output_dir.join(relative)
    }

    /// Whether the output differs per element.
    #[must_use]
    pub fn is_templated_output(&self) -> bool {
        self.output.contains("{name}") || self.output.contains("{full_name}")
    }
}

fn flatten(path: &str) -> String {
    path.replace("::", "_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn label_falls_back_to_template_stem() {
        let job = JobConfig::new("structs/record.tt", "out.rs");
        assert_eq!(job.label(), "record");

        let named = JobConfig {
            name: Some("records".into()),
            ..job
        };
        assert_eq!(named.label(), "records");
    }

    #[test]
    fn output_path_expands_placeholders() {
        let job = JobConfig::new("record.tt", "{full_name}/{name}.rs");
        let path = job.output_path(Path::new("gen"), "Desc", "d3d11::Desc");
        assert_eq!(path, PathBuf::from("gen/d3d11_Desc/Desc.rs"));
        assert!(job.is_templated_output());
    }

    #[test]
    fn fixed_output_is_not_templated() {
        let job = JobConfig::new("all.tt", "all.rs");
        assert!(!job.is_templated_output());
        assert_eq!(
            job.output_path(Path::new("gen"), "x", "a::x"),
            PathBuf::from("gen/all.rs")
        );
    }
}
