//! End-to-end template rendering: includes, imports, structured parameters.

use cx_template::{
    FileIncludeResolver, InMemoryIncludes, TemplateEngine, TemplateError, TemplateParameter,
    TokenKind,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde::Serialize;

#[derive(Serialize)]
struct Field {
    name: &'static str,
    type_name: &'static str,
}

#[derive(Serialize)]
struct Record {
    name: &'static str,
    fields: Vec<Field>,
}

const STRUCT_TEMPLATE: &str = "\
<#@ parameter name=\"element\" type=\"map\" #>
<#@ output extension=\".rs\" #>
pub struct <#= element.name #> {
<# push_indent(\"    \"); #>
<# for field in element.fields { #>
pub <#= field.name #>: <#= map_type(field.type_name) #>,
<# } #>
<# pop_indent(); #>
}
<#+ fn map_type(name) { if name == \"int\" { \"i32\" } else { name } } #>
";

#[test]
fn renders_struct_from_serialized_parameter() {
    let record = Record {
        name: "Point",
        fields: vec![
            Field {
                name: "x",
                type_name: "int",
            },
            Field {
                name: "label",
                type_name: "String",
            },
        ],
    };
    let engine = TemplateEngine::new();
    let template = engine.compile("struct.tt", STRUCT_TEMPLATE).expect("compiles");
    assert_eq!(template.output_extension(), Some(".rs"));

    let param = TemplateParameter::from_serialize("element", &record).expect("serializable");
    let out = template.process(&[param]).expect("renders");
    assert_eq!(
        out,
        "pub struct Point {\n    pub x: i32,\n    pub label: String,\n}\n"
    );
}

#[test]
fn includes_expand_in_place() {
    let engine = TemplateEngine::new().with_resolver(
        InMemoryIncludes::new()
            .with("header.tt", "// generated <#= 1 + 1 #>\n")
            .with("nested.tt", "<#@ include file=\"header.tt\" #>\nnested\n"),
    );
    let out = engine
        .render("main.tt", "<#@ include file=\"nested.tt\" #>\nbody\n", &[])
        .expect("renders");
    assert_eq!(out, "// generated 2\nnested\nbody\n");
}

#[test]
fn include_tokens_carry_included_file_name() {
    let engine = TemplateEngine::new()
        .with_resolver(InMemoryIncludes::new().with("inc.tt", "<#= x #>"));
    let tokens = engine
        .tokenize("main.tt", "a<#@ include file=\"inc.tt\" #>")
        .expect("tokenizes");
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[1].kind, TokenKind::Expression);
    assert_eq!(tokens[1].location.file, "inc.tt");
}

#[test]
fn recursive_include_hits_depth_limit() {
    let engine = TemplateEngine::new()
        .with_resolver(InMemoryIncludes::new().with("loop.tt", "<#@ include file=\"loop.tt\" #>"))
        .with_max_include_depth(4);
    let err = engine
        .tokenize("main.tt", "<#@ include file=\"loop.tt\" #>")
        .unwrap_err();
    assert!(matches!(err, TemplateError::IncludeDepth { limit: 4, .. }), "{err:?}");
}

#[test]
fn missing_include_is_error() {
    let err = TemplateEngine::new()
        .tokenize("main.tt", "<#@ include file=\"absent.tt\" #>")
        .unwrap_err();
    assert!(matches!(err, TemplateError::IncludeNotFound(ref f) if f == "absent.tt"));
}

#[test]
fn file_includes_and_script_modules() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("banner.tt"), "== <#= title #> ==\n").expect("write include");
    std::fs::write(
        dir.path().join("util.rhai"),
        "fn shout(s) { s.to_upper() }\n",
    )
    .expect("write module");

    let engine = TemplateEngine::new()
        .with_resolver(FileIncludeResolver::new([dir.path()]))
        .with_module_dir(dir.path());
    let text = "<#@ import namespace=\"util\" as=\"u\" #>\n\
                <#@ parameter name=\"title\" type=\"string\" #>\n\
                <#@ include file=\"banner.tt\" #>\n\
                <#= u::shout(title) #>";
    let out = engine
        .render("page.tt", text, &[TemplateParameter::string("title", "docs")])
        .expect("renders");
    assert_eq!(out, "== docs ==\nDOCS");
}

#[test]
fn render_file_reads_from_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("hello.tt");
    std::fs::write(&path, "Hello <#= \"world\" #>").expect("write template");
    let out = TemplateEngine::new().render_file(&path, &[]).expect("renders");
    assert_eq!(out, "Hello world");
}

#[rstest]
#[case::unterminated_block("<# x")]
#[case::unterminated_expression("<#= x")]
#[case::unterminated_helper("<#+ x")]
#[case::unterminated_directive("<#@ output")]
fn unterminated_regions_fail_to_tokenize(#[case] text: &str) {
    let err = TemplateEngine::new().compile("bad.tt", text).unwrap_err();
    assert!(matches!(err, TemplateError::Parse { .. }), "{err:?}");
}
