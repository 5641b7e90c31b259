use cx_core::{CppModule, ElementKind, FieldInfo, Kind, MethodInfo, NodeId, ParameterInfo};

use crate::HeaderParser;

mod function_tests;
mod interface_tests;
mod smoke_fixture_tests;

fn parse(source: &str) -> CppModule {
    HeaderParser::new()
        .parse_source("test", "sample", source)
        .expect("header should parse")
}

fn fixture_module() -> CppModule {
    let source = include_str!("../../../tests/fixtures/sample.h");
    HeaderParser::new()
        .with_dll_name("sample.dll")
        .parse_source("test", "sample", source)
        .expect("fixture should parse")
}

fn find_by_name(module: &CppModule, full_name: &str) -> NodeId {
    module
        .find_first(&regex_escape(full_name), None)
        .expect("valid pattern")
        .unwrap_or_else(|| {
            let available: Vec<_> = module
                .descendants(module.root())
                .into_iter()
                .filter_map(|id| {
                    module
                        .full_name(id)
                        .map(|name| format!("{}: {name}", module[id].kind()))
                })
                .collect();
            panic!(
                "element {full_name:?} not found. Available elements:\n{}",
                available.join("\n")
            );
        })
}

fn find_all_by_kind(module: &CppModule, kind: Kind) -> Vec<NodeId> {
    module.find(".*", Some(kind)).expect("valid pattern")
}

fn child_names(module: &CppModule, id: NodeId) -> Vec<String> {
    module
        .children(id)
        .iter()
        .filter_map(|&child| module[child].name.clone())
        .collect()
}

fn regex_escape(text: &str) -> String {
    text.replace('.', "\\.")
}

fn field(module: &CppModule, full_name: &str) -> FieldInfo {
    match &module[find_by_name(module, full_name)].kind {
        ElementKind::Field(info) => info.clone(),
        other => panic!("{full_name} is not a field: {other:?}"),
    }
}

fn callable(module: &CppModule, full_name: &str) -> MethodInfo {
    match &module[find_by_name(module, full_name)].kind {
        ElementKind::Method(info) | ElementKind::Function(info) => info.clone(),
        other => panic!("{full_name} is not callable: {other:?}"),
    }
}

fn parameter(module: &CppModule, full_name: &str) -> ParameterInfo {
    match &module[find_by_name(module, full_name)].kind {
        ElementKind::Parameter(info) => info.clone(),
        other => panic!("{full_name} is not a parameter: {other:?}"),
    }
}
