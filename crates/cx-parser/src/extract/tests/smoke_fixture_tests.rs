use super::*;
use pretty_assertions::assert_eq;

// ════════════════════════════════════════════════════════════════
// Fixture smoke tests
// ════════════════════════════════════════════════════════════════

#[test]
fn fixture_has_one_include() {
    let module = fixture_module();
    assert_eq!(child_names(&module, module.root()), ["sample"]);
    let include = module.children(module.root())[0];
    assert_eq!(module[include].kind(), Kind::Include);
}

#[test]
fn fixture_top_level_declarations() {
    let module = fixture_module();
    let include = module.children(module.root())[0];
    assert_eq!(
        child_names(&module, include),
        [
            "SAMPLE_FORMAT",
            "Filter",
            "SAMPLE_DESC",
            "SampleValue",
            "ISampleResource",
            "ISampleTexture",
            "SampleCreateResource",
            "SampleLog",
        ]
    );
}

#[test]
fn fixture_kind_counts() {
    let module = fixture_module();
    assert_eq!(find_all_by_kind(&module, Kind::Enum).len(), 2);
    assert_eq!(find_all_by_kind(&module, Kind::Struct).len(), 2);
    assert_eq!(find_all_by_kind(&module, Kind::Interface).len(), 2);
    assert_eq!(find_all_by_kind(&module, Kind::Method).len(), 3);
    assert_eq!(find_all_by_kind(&module, Kind::Function).len(), 2);
}

#[test]
fn every_element_is_reachable_from_root() {
    let module = fixture_module();
    for id in module.descendants(module.root()) {
        assert!(module.is_ancestor_or_self(module.root(), id), "{id} detached");
    }
}
