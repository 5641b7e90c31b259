//! Drive the `cxgen` binary end to end in a scratch project.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use pretty_assertions::assert_eq;

const HEADER: &str = "\
/// Blend modes.
enum Blend { BLEND_ZERO = 1, BLEND_ONE = 2 };
struct Viewport { float x; float y; float width; float height; };
";

const CONFIG: &str = r#"
[general]
module_name = "gfx"
output_dir = "out"
template_dirs = ["templates"]
headers = ["gfx.h"]
parallel = false

[[rules]]
pattern = "gfx::Viewport"
action = "describe"
text = "Render target region."

[[jobs]]
template = "enum.tt"
pattern = "gfx::.*"
kind = "enum"
output = "{full_name}.txt"
"#;

const ENUM_TEMPLATE: &str = "\
<#@ parameter name=\"element\" type=\"map\" #>
<#= element.name #>:
<# for item in element.children { #>
  <#= item.name #> = <#= item.value #>
<# } #>
";

fn project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::create_dir_all(dir.path().join("templates")).unwrap();
    fs::write(dir.path().join("gfx.h"), HEADER).unwrap();
    fs::write(dir.path().join("cxgen.toml"), CONFIG).unwrap();
    fs::write(dir.path().join("templates/enum.tt"), ENUM_TEMPLATE).unwrap();
    dir
}

fn cxgen(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cxgen"))
        .args(args)
        .current_dir(dir)
        .env_remove("CXGEN_LOG")
        .output()
        .expect("cxgen runs")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn generate_writes_configured_outputs() {
    let dir = project();
    let result = cxgen(dir.path(), &["generate"]);
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));

    let report: serde_json::Value = serde_json::from_str(&stdout(&result)).expect("json report");
    assert_eq!(report["module"], "gfx");
    assert_eq!(report["outputs"].as_array().map(Vec::len), Some(1));

    let text = fs::read_to_string(dir.path().join("out/gfx_Blend.txt")).expect("output");
    assert_eq!(text, "Blend:\n  BLEND_ZERO = 1\n  BLEND_ONE = 2\n");
}

#[test]
fn find_applies_rules_first() {
    let dir = project();
    let result = cxgen(dir.path(), &["find", ".*", "--kind", "struct"]);
    assert!(result.status.success());

    let found: serde_json::Value = serde_json::from_str(&stdout(&result)).expect("json");
    assert_eq!(found[0]["full_name"], "gfx::Viewport");
    assert_eq!(found[0]["kind"], "struct");
}

#[test]
fn parse_prints_model_document() {
    let dir = project();
    let result = cxgen(dir.path(), &["--format", "raw", "parse", "gfx.h", "--module", "m"]);
    assert!(result.status.success());

    let document: serde_json::Value = serde_json::from_str(stdout(&result).trim()).expect("json");
    assert_eq!(document["name"], "m");
    assert_eq!(document["children"][0]["name"], "gfx");
}

#[test]
fn render_prints_to_stdout() {
    let dir = project();
    let result = cxgen(dir.path(), &["render", "enum.tt", "--element", ".*::Blend"]);
    assert!(result.status.success());
    assert_eq!(stdout(&result), "Blend:\n  BLEND_ZERO = 1\n  BLEND_ONE = 2\n");
}

#[test]
fn tokens_table_lists_kinds() {
    let dir = project();
    let result = cxgen(dir.path(), &["--format", "table", "tokens", "enum.tt"]);
    assert!(result.status.success());
    let text = stdout(&result);
    assert!(text.contains("directive"));
    assert!(text.contains("expression"));
    assert!(text.contains("block"));
}

#[test]
fn schema_lists_names() {
    let dir = project();
    let result = cxgen(dir.path(), &["schema"]);
    assert!(result.status.success());
    let names: Vec<String> = serde_json::from_str(&stdout(&result)).expect("json");
    assert!(names.contains(&"element_document".to_string()));
    assert!(names.contains(&"config".to_string()));
}

#[test]
fn errors_exit_nonzero_with_prefix() {
    let dir = project();
    let result = cxgen(dir.path(), &["schema", "nope"]);
    assert_eq!(result.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&result.stderr).starts_with("cxgen error: unknown schema 'nope'"));
}

#[test]
fn invalid_config_is_reported() {
    let dir = project();
    fs::write(
        dir.path().join("bad.toml"),
        "[[rules]]\npattern = \"\"\naction = \"remove\"\n",
    )
    .unwrap();
    let result = cxgen(dir.path(), &["--config", "bad.toml", "find", ".*"]);
    assert_eq!(result.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&result.stderr).contains("rules[0].pattern"));
}
