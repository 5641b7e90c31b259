//! Generation pipeline: load model → apply rules → render jobs → write.
//!
//! Jobs render independently, on the rayon pool when `general.parallel` is
//! set. Each job compiles its own template (a compiled template is tied to
//! the thread that built it) and renders against owned [`ElementView`]
//! snapshots. Files are written afterwards, sequentially, in job order.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use cx_config::{CxConfig, GeneralConfig, JobConfig};
use cx_core::{CppModule, ElementDocument, ElementView, IncludeScope, Query, apply_rules};
use cx_parser::HeaderParser;
use cx_template::{FileIncludeResolver, TemplateEngine, TemplateError, TemplateParameter};
use rayon::prelude::*;
use serde::Serialize;

use crate::progress::Progress;

/// Options the CLI layers over `[general]`.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub output_dir: Option<PathBuf>,
    pub keep_going: bool,
    pub serial: bool,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutputEntry {
    pub job: String,
    pub path: String,
    pub bytes: usize,
    pub status: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobFailure {
    pub job: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateReport {
    pub module: String,
    pub elements: usize,
    pub rules_affected: usize,
    pub outputs: Vec<OutputEntry>,
    pub failures: Vec<JobFailure>,
}

/// One rendered file.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub path: PathBuf,
    pub text: String,
}

/// Element a job renders against; `view` is `None` for whole-module jobs.
#[derive(Debug, Clone)]
struct Target {
    name: String,
    full_name: String,
    view: Option<ElementView>,
}

/// A job with its template located and its targets resolved.
#[derive(Debug)]
struct JobPlan<'a> {
    label: String,
    job: &'a JobConfig,
    template: PathBuf,
    targets: Vec<Target>,
}

// ── Model ──────────────────────────────────────────────────────────────────

/// Build the module from `general.model` or `general.headers`.
pub fn load_model(general: &GeneralConfig) -> anyhow::Result<CppModule> {
    if let Some(path) = &general.model {
        return load_document(path);
    }
    if general.headers.is_empty() {
        bail!("no input: set general.headers or general.model");
    }

    let parser = header_parser(general.dll_name.as_deref(), general.strict);
    let progress = Progress::bar(general.headers.len() as u64, "parsing headers");
    let mut module = CppModule::new(&general.module_name);
    for path in &general.headers {
        progress.set_message(&path.display().to_string());
        if let Err(error) = parser.parse_file(&mut module, path) {
            progress.finish_err("parse failed");
            return Err(error).with_context(|| format!("failed to parse {}", path.display()));
        }
        progress.inc(1);
    }
    progress.finish_ok("headers parsed");
    Ok(module)
}

/// Build a module from a JSON model document.
pub fn load_document(path: &Path) -> anyhow::Result<CppModule> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read model document {}", path.display()))?;
    let document: ElementDocument = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a model document", path.display()))?;
    CppModule::from_document(&document)
        .with_context(|| format!("invalid model document {}", path.display()))
}

#[must_use]
pub fn header_parser(dll_name: Option<&str>, strict: bool) -> HeaderParser {
    let parser = HeaderParser::new().strict(strict);
    match dll_name {
        Some(dll) => parser.with_dll_name(dll),
        None => parser,
    }
}

/// Load the model and run the configured rules over it.
pub fn prepare_model(config: &CxConfig) -> anyhow::Result<(CppModule, usize)> {
    let mut module = load_model(&config.general)?;
    let affected = apply_rules(&mut module, &config.rules, &config.general.include_scope())
        .context("failed to apply rules")?;
    tracing::debug!(rules = config.rules.len(), affected, "rules applied");
    Ok((module, affected))
}

// ── Templates ──────────────────────────────────────────────────────────────

/// Template engine resolving includes and script imports from the
/// configured template directories.
#[must_use]
pub fn template_engine(general: &GeneralConfig) -> TemplateEngine {
    let engine =
        TemplateEngine::new().with_resolver(FileIncludeResolver::new(general.template_dirs.clone()));
    match general.template_dirs.iter().find(|dir| dir.is_dir()) {
        Some(dir) => engine.with_module_dir(dir.clone()),
        None => engine,
    }
}

/// Find a template in the template directories, then as a plain path.
pub fn resolve_template(general: &GeneralConfig, template: &Path) -> anyhow::Result<PathBuf> {
    if template.is_absolute() && template.is_file() {
        return Ok(template.to_path_buf());
    }
    general
        .template_dirs
        .iter()
        .map(|dir| dir.join(template))
        .chain(std::iter::once(template.to_path_buf()))
        .find(|candidate| candidate.is_file())
        .with_context(|| {
            format!(
                "template {} not found in {:?}",
                template.display(),
                general.template_dirs
            )
        })
}

/// The `module` parameter. Converting the whole tree is costly, so build it
/// once and clone it into each render.
pub fn module_parameter(module: &ElementView) -> Result<TemplateParameter, TemplateError> {
    TemplateParameter::from_serialize("module", module)
}

/// Parameters every render gets: `module`, `element` when rendering per
/// element, then the job's string parameters.
pub fn render_parameters(
    module: &TemplateParameter,
    element: Option<&ElementView>,
    extra: impl IntoIterator<Item = (String, String)>,
) -> Result<Vec<TemplateParameter>, TemplateError> {
    let mut parameters = vec![module.clone()];
    if let Some(element) = element {
        parameters.push(TemplateParameter::from_serialize("element", element)?);
    }
    parameters.extend(
        extra
            .into_iter()
            .map(|(name, value)| TemplateParameter::string(name, value)),
    );
    Ok(parameters)
}

/// Elements matching `pattern` that lie within `scope`, as render targets.
pub fn matching_views(
    module: &CppModule,
    pattern: &str,
    kind: Option<cx_core::Kind>,
    scope: &IncludeScope,
) -> anyhow::Result<Vec<ElementView>> {
    let query = Query::new(pattern)?.with_kind(kind);
    Ok(scope
        .filter(module, module.query(module.root(), &query))
        .into_iter()
        .map(|id| module.view(id))
        .collect())
}

// ── Jobs ───────────────────────────────────────────────────────────────────

fn plan_jobs<'a>(config: &'a CxConfig, module: &CppModule) -> anyhow::Result<Vec<JobPlan<'a>>> {
    let scope = config.general.include_scope();
    config
        .jobs
        .iter()
        .map(|job| {
            let label = job.label();
            let template = resolve_template(&config.general, &job.template)
                .with_context(|| format!("job '{label}'"))?;
            let targets = match &job.pattern {
                Some(pattern) => {
                    matching_views(module, pattern, job.kind, &scope)?
                        .into_iter()
                        .map(|view| Target {
                            name: view
                                .mapped_name
                                .clone()
                                .or_else(|| view.name.clone())
                                .unwrap_or_default(),
                            full_name: view.full_name.clone().unwrap_or_default(),
                            view: Some(view),
                        })
                        .collect()
                }
                None => vec![Target {
                    name: module.name().to_string(),
                    full_name: module.name().to_string(),
                    view: None,
                }],
            };
            if targets.is_empty() {
                tracing::warn!(job = %label, "job pattern matched nothing");
            }
            tracing::debug!(job = %label, targets = targets.len(), "planned job");
            Ok(JobPlan {
                label,
                job,
                template,
                targets,
            })
        })
        .collect()
}

/// Compile the job's template once and render every target. Targets that
/// map to the same output path are concatenated in match order.
fn render_job(
    engine: &TemplateEngine,
    plan: &JobPlan<'_>,
    module_view: &ElementView,
    output_dir: &Path,
) -> Result<Vec<Rendered>, TemplateError> {
    let text = fs::read_to_string(&plan.template).map_err(|source| TemplateError::Io {
        path: plan.template.clone(),
        source,
    })?;
    let compiled = engine.compile(&plan.template.display().to_string(), &text)?;
    let module = module_parameter(module_view)?;

    let mut outputs: Vec<Rendered> = Vec::new();
    for target in &plan.targets {
        let parameters =
            render_parameters(&module, target.view.as_ref(), plan.job.parameters.clone())?;
        let text = compiled.process(&parameters)?;

        let mut path = plan
            .job
            .output_path(output_dir, &target.name, &target.full_name);
        if path.extension().is_none()
            && let Some(extension) = compiled.output_extension()
        {
            path.set_extension(extension.trim_start_matches('.'));
        }
        match outputs.iter_mut().find(|rendered| rendered.path == path) {
            Some(existing) => existing.text.push_str(&text),
            None => outputs.push(Rendered { path, text }),
        }
    }
    Ok(outputs)
}

/// Run every job of `config` against an already prepared module.
pub fn run_jobs(
    config: &CxConfig,
    module: &CppModule,
    options: &GenerateOptions,
) -> anyhow::Result<(Vec<OutputEntry>, Vec<JobFailure>)> {
    let output_dir = options
        .output_dir
        .clone()
        .unwrap_or_else(|| config.general.output_dir.clone());
    let keep_going = options.keep_going || config.general.keep_going;
    let plans = plan_jobs(config, module)?;
    let engine = template_engine(&config.general);
    let module_view = module.view(module.root());

    let progress = Progress::bar(plans.len() as u64, "rendering");
    let render = |plan: &JobPlan<'_>| {
        let result = render_job(&engine, plan, &module_view, &output_dir);
        progress.inc(1);
        result
    };
    let results: Vec<_> = if config.general.parallel && !options.serial {
        plans.par_iter().map(render).collect()
    } else {
        plans.iter().map(render).collect()
    };

    let mut outputs = Vec::new();
    let mut failures = Vec::new();
    for (plan, result) in plans.iter().zip(results) {
        let rendered = match result {
            Ok(rendered) => rendered,
            Err(error) if keep_going => {
                tracing::warn!(job = %plan.label, %error, "job failed, continuing");
                failures.push(JobFailure {
                    job: plan.label.clone(),
                    error: error.to_string(),
                });
                continue;
            }
            Err(error) => {
                progress.finish_err("generation failed");
                return Err(error).with_context(|| format!("job '{}' failed", plan.label));
            }
        };
        for file in rendered {
            if !options.dry_run {
                write_output(&file)?;
            }
            outputs.push(OutputEntry {
                job: plan.label.clone(),
                path: file.path.display().to_string(),
                bytes: file.text.len(),
                status: if options.dry_run { "dry_run" } else { "written" },
            });
        }
    }
    progress.finish_ok("done");
    Ok((outputs, failures))
}

/// The full pipeline.
pub fn generate(config: &CxConfig, options: &GenerateOptions) -> anyhow::Result<GenerateReport> {
    let (module, rules_affected) = prepare_model(config)?;
    let (outputs, failures) = run_jobs(config, &module, options)?;
    Ok(GenerateReport {
        module: module.name().to_string(),
        elements: module.descendants(module.root()).len(),
        rules_affected,
        outputs,
        failures,
    })
}

fn write_output(file: &Rendered) -> anyhow::Result<()> {
    if let Some(parent) = file.path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(&file.path, &file.text)
        .with_context(|| format!("failed to write {}", file.path.display()))?;
    tracing::debug!(path = %file.path.display(), bytes = file.text.len(), "wrote output");
    Ok(())
}
