//! Structural and query properties of the declaration model.

use cx_core::{
    CppElement, CppModule, ElementKind, EnumInfo, EnumItemInfo, FieldInfo, Kind, MethodInfo,
    NodeId, StructInfo, TypeInfo,
};
use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};

struct Sample {
    module: CppModule,
    include: NodeId,
    bar: NodeId,
    field: NodeId,
    color: NodeId,
    red: NodeId,
}

#[fixture]
fn sample() -> Sample {
    let mut module = CppModule::new("sample");
    let root = module.root();
    let include = module.add_new(root, CppElement::new("foo", ElementKind::Include));
    let bar = module.add_new(
        include,
        CppElement::new("Bar", ElementKind::Struct(StructInfo::default())),
    );
    let field = module.add_new(
        bar,
        CppElement::new(
            "x",
            ElementKind::Field(FieldInfo {
                type_ref: TypeInfo::new("int"),
                ..FieldInfo::default()
            }),
        ),
    );
    let color = module.add_new(
        include,
        CppElement::new("Color", ElementKind::Enum(EnumInfo::default())),
    );
    let red = module.add_new(
        color,
        CppElement::new("RED", ElementKind::EnumItem(EnumItemInfo::default())),
    );
    let run = module.add_new(
        include,
        CppElement::new("Run", ElementKind::Function(MethodInfo::default())),
    );
    module.set_return_type(run, TypeInfo::new("int"));
    Sample {
        module,
        include,
        bar,
        field,
        color,
        red,
    }
}

#[rstest]
fn find_first_returns_exactly_the_struct(sample: Sample) {
    let found = sample
        .module
        .find_first("foo::Bar", Some(Kind::Struct))
        .expect("valid pattern");
    assert_eq!(found, Some(sample.bar));
}

#[rstest]
fn full_name_follows_parent_chain(sample: Sample) {
    let m = &sample.module;
    assert_eq!(m.full_name(sample.include).as_deref(), Some("foo"));
    assert_eq!(m.full_name(sample.field).as_deref(), Some("foo::Bar::x"));
    assert_eq!(m.full_name(sample.color).as_deref(), Some("foo::Color"));
    assert_eq!(m.full_name(sample.red).as_deref(), Some("RED"));
}

#[rstest]
#[case::everything(".*")]
#[case::qualified("foo::.*")]
#[case::fields(".*::x")]
#[case::enum_items("[A-Z]+")]
fn kind_filter_narrows_results(sample: Sample, #[case] pattern: &str) {
    let all = sample.module.find(pattern, None).expect("valid pattern");
    let regex = regex::Regex::new(&format!("^(?:{pattern})$")).expect("valid regex");
    for kind in Kind::ALL {
        let filtered = sample.module.find(pattern, Some(kind)).expect("valid pattern");
        assert!(filtered.iter().all(|id| all.contains(id)));
        assert!(filtered.iter().all(|&id| sample.module[id].kind() == kind));
    }
    for id in all {
        let full = sample.module.full_name(id).expect("matched elements have names");
        assert!(regex.is_match(&full), "{full} should match {pattern}");
    }
}

#[rstest]
#[case::struct_kind("foo::Bar", Some(Kind::Struct))]
#[case::any_kind("foo::.*", None)]
#[case::enum_items("RED", Some(Kind::EnumItem))]
#[case::return_type("foo::Run::return", Some(Kind::Type))]
#[case::function_and_return("foo::Run.*", None)]
fn remove_matching_leaves_no_matches(
    mut sample: Sample,
    #[case] pattern: &str,
    #[case] kind: Option<Kind>,
) {
    let removed = sample
        .module
        .remove_matching(pattern, kind)
        .expect("valid pattern");
    assert!(removed > 0);
    assert!(sample.module.find(pattern, kind).expect("valid pattern").is_empty());
}

#[rstest]
fn remove_then_add_restores_parent(mut sample: Sample) {
    let m = &mut sample.module;
    assert!(m.remove(sample.include, sample.bar));
    assert_eq!(m.parent(sample.bar), None);
    assert_eq!(m.parent(sample.field), Some(sample.bar));

    m.add(sample.include, sample.bar);
    assert_eq!(m.parent(sample.bar), Some(sample.include));
    assert_eq!(m.children(sample.include).last(), Some(&sample.bar));
}

#[rstest]
fn removal_during_walk_keeps_pre_order(mut sample: Sample) {
    let mut seen = Vec::new();
    sample
        .module
        .modify(".*", None, |_, matched| {
            seen.push(matched.full_name.to_string());
            matched.full_name == "foo::Bar"
        })
        .expect("valid pattern");
    assert_eq!(
        seen,
        vec![
            "",
            "foo",
            "foo::Bar",
            "foo::Bar::x",
            "foo::Color",
            "RED",
            "foo::Run",
            "foo::Run::return"
        ]
    );
    assert_eq!(sample.module.children(sample.include)[0], sample.color);
}
