//! Compiling and running templates.
//!
//! A [`CompiledTemplate`] owns its own rhai [`Engine`] whose native `write*`
//! and indent functions append to a shared [`Templatizer`]. Templates are
//! compiled once and can be processed repeatedly with different parameters.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

use rhai::module_resolvers::FileModuleResolver;
use rhai::{AST, Array, Dynamic, Engine, EvalAltResult, ImmutableString, Position, Scope};

use crate::errors::{Diagnostic, TemplateError};
use crate::include::{IncludeResolver, NoIncludes};
use crate::location::Location;
use crate::parameter::TemplateParameter;
use crate::script::Script;
use crate::templatizer::Templatizer;
use crate::token::Token;
use crate::tokenizer::{MAX_INCLUDE_DEPTH, Tokenizer};

type Writer = Rc<RefCell<Templatizer>>;

/// Entry point for tokenizing, compiling and rendering templates.
///
/// The engine itself holds no script state and is cheap to clone; every
/// compiled template gets a fresh rhai engine.
#[derive(Clone)]
pub struct TemplateEngine {
    resolver: Arc<dyn IncludeResolver>,
    module_dir: Option<PathBuf>,
    max_include_depth: usize,
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TemplateEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateEngine")
            .field("module_dir", &self.module_dir)
            .field("max_include_depth", &self.max_include_depth)
            .finish_non_exhaustive()
    }
}

impl TemplateEngine {
    #[must_use]
    pub fn new() -> Self {
        Self {
            resolver: Arc::new(NoIncludes),
            module_dir: None,
            max_include_depth: MAX_INCLUDE_DEPTH,
        }
    }

    #[must_use]
    pub fn with_resolver(mut self, resolver: impl IncludeResolver + 'static) -> Self {
        self.resolver = Arc::new(resolver);
        self
    }

    /// Directory searched by `<#@ import namespace="…" #>`.
    #[must_use]
    pub fn with_module_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.module_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub const fn with_max_include_depth(mut self, depth: usize) -> Self {
        self.max_include_depth = depth;
        self
    }

    /// # Errors
    ///
    /// Returns tokenizer errors; see [`Tokenizer::tokenize`].
    pub fn tokenize(&self, file: &str, text: &str) -> Result<Vec<Token>, TemplateError> {
        Tokenizer::new(self.resolver.as_ref())
            .with_max_depth(self.max_include_depth)
            .tokenize(file, text)
    }

    /// Tokenize and compile `text`.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Parse`] for malformed templates and
    /// [`TemplateError::Compile`] when the generated script does not compile.
    pub fn compile(&self, file: &str, text: &str) -> Result<CompiledTemplate, TemplateError> {
        let tokens = self.tokenize(file, text)?;
        self.compile_tokens(file, &tokens)
    }

    /// Compile an already tokenized template.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::BlockAfterHelper`] or
    /// [`TemplateError::Compile`].
    pub fn compile_tokens(
        &self,
        file: &str,
        tokens: &[Token],
    ) -> Result<CompiledTemplate, TemplateError> {
        let script = Script::assemble(tokens)?;
        let writer: Writer = Rc::new(RefCell::new(Templatizer::new()));
        let mut engine = Engine::new();
        if let Some(dir) = &self.module_dir {
            engine.set_module_resolver(FileModuleResolver::new_with_path(dir));
        }
        engine.on_print(|text| tracing::info!(target: "cxgen::template", "{text}"));
        engine.on_debug(|text, source, pos| {
            tracing::debug!(target: "cxgen::template", ?source, %pos, "{text}");
        });
        register_writer(&mut engine, &writer);

        let ast = engine.compile(&script.source).map_err(|error| {
            let location = script_location(&script, error.1);
            TemplateError::Compile {
                file: file.to_string(),
                diagnostics: vec![Diagnostic {
                    message: error.0.to_string(),
                    location,
                }],
            }
        })?;
        tracing::debug!(
            file,
            lines = script.source.lines().count(),
            parameters = script.parameters.len(),
            "compiled template"
        );

        Ok(CompiledTemplate {
            file: file.to_string(),
            engine,
            ast,
            writer,
            script,
        })
    }

    /// Compile and process in one step.
    ///
    /// # Errors
    ///
    /// Any error from [`compile`](Self::compile) or
    /// [`CompiledTemplate::process`].
    pub fn render(
        &self,
        file: &str,
        text: &str,
        parameters: &[TemplateParameter],
    ) -> Result<String, TemplateError> {
        self.compile(file, text)?.process(parameters)
    }

    /// Read, compile and process a template file.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Io`] if the file cannot be read, otherwise as
    /// [`render`](Self::render).
    pub fn render_file(
        &self,
        path: &Path,
        parameters: &[TemplateParameter],
    ) -> Result<String, TemplateError> {
        let text = std::fs::read_to_string(path).map_err(|source| TemplateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.render(&path.display().to_string(), &text, parameters)
    }
}

/// A template ready to run.
pub struct CompiledTemplate {
    file: String,
    engine: Engine,
    ast: AST,
    writer: Writer,
    script: Script,
}

impl std::fmt::Debug for CompiledTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledTemplate")
            .field("file", &self.file)
            .field("script", &self.script)
            .finish_non_exhaustive()
    }
}

impl CompiledTemplate {
    #[must_use]
    pub fn file(&self) -> &str {
        &self.file
    }

    /// The generated script, for debugging templates.
    #[must_use]
    pub const fn script(&self) -> &Script {
        &self.script
    }

    /// Extension requested by `<#@ output extension="…" #>`.
    #[must_use]
    pub fn output_extension(&self) -> Option<&str> {
        self.script.output_extension.as_deref()
    }

    /// Bind `parameters` and run the template, returning the generated text.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::MissingParameter`] when a declared parameter
    /// is absent, [`TemplateError::ParameterType`] when a value does not match
    /// its declared type, and [`TemplateError::Runtime`] when the script fails.
    pub fn process(&self, parameters: &[TemplateParameter]) -> Result<String, TemplateError> {
        let mut scope = Scope::new();
        for declared in &self.script.parameters {
            let supplied = parameters
                .iter()
                .find(|p| p.name == declared.name)
                .ok_or_else(|| TemplateError::MissingParameter(declared.name.clone()))?;
            supplied.check(declared.param_type)?;
        }
        for parameter in parameters {
            parameter.check(parameter.param_type)?;
            scope.push_dynamic(parameter.name.as_str(), parameter.value.clone());
        }

        self.writer.borrow_mut().clear();
        let result = self.engine.run_ast_with_scope(&mut scope, &self.ast);
        let text = self.writer.borrow_mut().take();
        result.map_err(|error| self.runtime_error(&error))?;
        Ok(text)
    }

    fn runtime_error(&self, error: &EvalAltResult) -> TemplateError {
        let location = script_location(&self.script, error.position());
        let mut message = error.to_string();
        // rhai appends " (line N, position M)" for script positions
        if let Some(cut) = message.rfind(" (line ") {
            message.truncate(cut);
        }
        TemplateError::Runtime { location, message }
    }
}

fn script_location(script: &Script, position: Position) -> Option<Location> {
    position.line().and_then(|line| script.locate(line))
}

/// Text written for a script value: strings verbatim, unit as nothing,
/// anything else through its display form.
fn dynamic_text(value: &Dynamic) -> String {
    if value.is_unit() {
        String::new()
    } else {
        value.to_string()
    }
}

fn format_array(format: &str, args: &Array) -> Result<String, Box<EvalAltResult>> {
    let args: Vec<String> = args.iter().map(dynamic_text).collect();
    crate::templatizer::format_text(format, &args).map_err(|e| e.to_string().into())
}

fn register_writer(engine: &mut Engine, writer: &Writer) {
    let out = Rc::clone(writer);
    engine.register_fn("write", move |value: Dynamic| {
        out.borrow_mut().write(&dynamic_text(&value));
    });

    let out = Rc::clone(writer);
    engine.register_fn(
        "write",
        move |format: ImmutableString, args: Array| -> Result<(), Box<EvalAltResult>> {
            let text = format_array(&format, &args)?;
            out.borrow_mut().write(&text);
            Ok(())
        },
    );

    let out = Rc::clone(writer);
    engine.register_fn("write_line", move || out.borrow_mut().new_line());

    let out = Rc::clone(writer);
    engine.register_fn("write_line", move |value: Dynamic| {
        out.borrow_mut().write_line(&dynamic_text(&value));
    });

    let out = Rc::clone(writer);
    engine.register_fn(
        "write_line",
        move |format: ImmutableString, args: Array| -> Result<(), Box<EvalAltResult>> {
            let text = format_array(&format, &args)?;
            out.borrow_mut().write_line(&text);
            Ok(())
        },
    );

    let out = Rc::clone(writer);
    engine.register_fn("push_indent", move |indent: ImmutableString| {
        out.borrow_mut().push_indent(indent.as_str());
    });

    let out = Rc::clone(writer);
    engine.register_fn("pop_indent", move || -> ImmutableString {
        out.borrow_mut().pop_indent().unwrap_or_default().into()
    });

    let out = Rc::clone(writer);
    engine.register_fn("clear_indent", move || out.borrow_mut().clear_indent());

    let out = Rc::clone(writer);
    engine.register_fn("current_indent", move || -> ImmutableString {
        out.borrow().current_indent().into()
    });
}
