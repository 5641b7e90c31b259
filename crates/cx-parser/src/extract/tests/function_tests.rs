use super::*;
use cx_core::{CallingConvention, ParamDirection};
use pretty_assertions::assert_eq;
use rstest::rstest;

// ════════════════════════════════════════════════════════════════
// Free functions
// ════════════════════════════════════════════════════════════════

#[test]
fn extern_c_functions_land_in_include() {
    let module = fixture_module();
    let create = find_by_name(&module, "sample::SampleCreateResource");
    assert_eq!(module[create].kind(), Kind::Function);
    assert_eq!(
        module[create].description.as_deref(),
        Some("Creates a resource.")
    );
    let info = callable(&module, "sample::SampleCreateResource");
    assert_eq!(info.calling_convention, CallingConvention::StdCall);
    assert_eq!(info.dll_name.as_deref(), Some("sample.dll"));
    assert_eq!(info.offset, 0);
    assert_eq!(callable(&module, "sample::SampleLog").offset, 1);
}

#[test]
fn out_pointer_parameter() {
    let module = fixture_module();
    let out = parameter(&module, "sample::SampleCreateResource::ppResource");
    assert_eq!(out.direction, ParamDirection::Out);
    assert_eq!(out.type_ref.to_string(), "ISampleResource**");
}

#[rstest]
#[case("int __cdecl f(void);", CallingConvention::CDecl)]
#[case("int __stdcall f(void);", CallingConvention::StdCall)]
#[case("int WINAPI f(void);", CallingConvention::StdCall)]
#[case("int __fastcall f(void);", CallingConvention::FastCall)]
#[case("int f(void);", CallingConvention::Unknown)]
fn calling_conventions(#[case] source: &str, #[case] expected: CallingConvention) {
    let module = parse(source);
    assert_eq!(callable(&module, "sample::f").calling_convention, expected);
}

#[test]
fn return_pointer_and_const() {
    let module = parse("const char* name_of(int id);\n");
    let id = find_by_name(&module, "sample::name_of");
    let ret = module.return_type(id).expect("return type");
    match &module[ret].kind {
        ElementKind::Type(info) => assert_eq!(info.to_string(), "const char*"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn unnamed_parameters_get_positional_names() {
    let module = parse("void blit(int, float*);\n");
    let id = find_by_name(&module, "sample::blit");
    assert_eq!(child_names(&module, id), ["arg0", "arg1"]);
    assert_eq!(parameter(&module, "sample::blit::arg1").type_ref.pointer, "*");
}

#[test]
fn default_arguments_are_optional() {
    let module = parse("void resize(int width, int height = 0);\n");
    assert!(!parameter(&module, "sample::resize::width").is_optional);
    assert!(parameter(&module, "sample::resize::height").is_optional);
}

#[test]
fn variables_and_function_pointers_are_not_functions() {
    let module = parse("extern int counter;\nvoid (*handler)(int);\n");
    assert!(find_all_by_kind(&module, Kind::Function).is_empty());
}

#[test]
fn inline_definitions_are_functions() {
    let module = parse("static inline int twice(int x) { return x * 2; }\n");
    let id = find_by_name(&module, "sample::twice");
    assert_eq!(child_names(&module, id), ["x"]);
}
