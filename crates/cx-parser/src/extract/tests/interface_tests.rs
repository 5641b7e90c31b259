use super::*;
use cx_core::{CallingConvention, ParamDirection};
use pretty_assertions::assert_eq;

// ════════════════════════════════════════════════════════════════
// COM-style interfaces
// ════════════════════════════════════════════════════════════════

#[test]
fn midl_interface_becomes_interface() {
    let module = fixture_module();
    let id = find_by_name(&module, "sample::ISampleResource");
    match &module[id].kind {
        ElementKind::Interface(info) => {
            assert_eq!(info.base.as_deref(), Some("IUnknown"));
            assert_eq!(
                info.guid.as_deref(),
                Some("c0bfa96c-e089-44fb-8eaf-26f8796190da")
            );
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(child_names(&module, id), ["GetDesc", "SetName"]);
    assert_eq!(
        module[id].description.as_deref(),
        Some("A resource that can be named.")
    );
}

#[test]
fn vtable_slots_follow_base_interface() {
    let module = fixture_module();
    assert_eq!(callable(&module, "sample::ISampleResource::GetDesc").offset, 3);
    assert_eq!(callable(&module, "sample::ISampleResource::SetName").offset, 4);
    assert_eq!(callable(&module, "sample::ISampleTexture::GetMipCount").offset, 5);
}

#[test]
fn method_calling_convention_from_macro() {
    let module = fixture_module();
    let method = callable(&module, "sample::ISampleResource::GetDesc");
    assert_eq!(method.calling_convention, CallingConvention::StdCall);
    assert_eq!(method.dll_name, None);
}

#[test]
fn method_return_type_is_a_type_node() {
    let module = fixture_module();
    let id = find_by_name(&module, "sample::ISampleTexture::GetMipCount");
    let ret = module.return_type(id).expect("return type");
    match &module[ret].kind {
        ElementKind::Type(info) => assert_eq!(info.type_name, "UINT"),
        other => panic!("unexpected {other:?}"),
    }
    assert!(module.children(id).is_empty(), "(void) declares no parameters");
}

#[test]
fn sal_annotations_set_direction() {
    let module = fixture_module();
    let desc = parameter(&module, "sample::ISampleResource::GetDesc::pDesc");
    assert_eq!(desc.direction, ParamDirection::Out);
    assert_eq!(desc.type_ref.type_name, "SAMPLE_DESC");
    assert_eq!(desc.type_ref.pointer, "*");

    let name = parameter(&module, "sample::ISampleResource::SetName::name");
    assert_eq!(name.direction, ParamDirection::In);
    assert!(name.type_ref.is_const);
    assert!(!name.is_optional);

    let reserved = parameter(&module, "sample::ISampleResource::SetName::reserved");
    assert!(reserved.is_optional);
}

#[test]
fn method_doc_comment() {
    let module = fixture_module();
    let id = find_by_name(&module, "sample::ISampleResource::SetName");
    assert_eq!(module[id].description.as_deref(), Some("Sets the debug name."));
}

#[test]
fn plain_virtual_class_is_interface() {
    let module = parse(
        "class IRender {\npublic:\n    virtual ~IRender();\n    virtual void Draw(int count) = 0;\n};\n",
    );
    let id = find_by_name(&module, "sample::IRender");
    assert_eq!(module[id].kind(), Kind::Interface);
    // the destructor occupies slot 0 but is not modelled
    assert_eq!(child_names(&module, id), ["Draw"]);
    assert_eq!(callable(&module, "sample::IRender::Draw").offset, 1);
}
