//! Read-only element snapshots handed to templates.
//!
//! A view carries the derived names (`full_name`, `path`, `mapped_name`) that
//! a template cannot compute without the arena. Views own their data, so they
//! can be sent to other threads while the module stays put.

use schemars::JsonSchema;
use serde::Serialize;

use crate::element::{ElementKind, NodeId};
use crate::module::CppModule;
use crate::tag::Tag;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct ElementView {
    #[serde(flatten)]
    pub kind: ElementKind,
    pub name: Option<String>,
    pub full_name: Option<String>,
    pub path: Option<String>,
    pub description: Option<String>,
    pub remarks: Option<String>,
    pub tag: Option<Tag>,
    pub mapped_name: Option<String>,
    pub return_type: Option<Box<ElementView>>,
    pub children: Vec<ElementView>,
}

impl CppModule {
    #[must_use]
    pub fn view(&self, id: NodeId) -> ElementView {
        let element = &self[id];
        ElementView {
            kind: element.kind.clone(),
            name: element.name.clone(),
            full_name: self.full_name(id),
            path: self.path(id),
            description: element.description.clone(),
            remarks: element.remarks.clone(),
            tag: element.tag.clone(),
            mapped_name: element.mapped_name().map(str::to_string),
            return_type: element.return_type.map(|ret| Box::new(self.view(ret))),
            children: element.children.iter().map(|&c| self.view(c)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{CppElement, StructInfo};
    use crate::tag::MappingRule;

    #[test]
    fn view_carries_derived_names() {
        let mut module = CppModule::new("m");
        let root = module.root();
        let inc = module.add_new(root, CppElement::new("foo", ElementKind::Include));
        let bar = module.add_new(
            inc,
            CppElement::new("Bar", ElementKind::Struct(StructInfo::default())).with_tag(
                Tag::Mapping(MappingRule {
                    name: Some("RenamedBar".into()),
                    ..MappingRule::default()
                }),
            ),
        );

        let view = module.view(bar);
        assert_eq!(view.full_name.as_deref(), Some("foo::Bar"));
        assert_eq!(view.path.as_deref(), Some("foo"));
        assert_eq!(view.mapped_name.as_deref(), Some("RenamedBar"));

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["kind"], "struct");
        assert_eq!(json["is_union"], false);
    }
}
