//! Nested JSON form of a declaration tree.
//!
//! Used as an alternate front end (`general.model`) and as the output of
//! `cxgen parse`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::element::{CppElement, ElementKind, NodeId};
use crate::errors::ModelError;
use crate::module::CppModule;
use crate::tag::Tag;

/// One element and its subtree, owning its children directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ElementDocument {
    #[serde(flatten)]
    pub kind: ElementKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<Tag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<Box<ElementDocument>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ElementDocument>,
}

impl ElementDocument {
    fn element(&self) -> CppElement {
        CppElement {
            name: self.name.clone(),
            description: self.description.clone(),
            remarks: self.remarks.clone(),
            tag: self.tag.clone(),
            ..CppElement::anonymous(self.kind.clone())
        }
    }
}

impl CppModule {
    /// Snapshot the subtree rooted at `id`.
    #[must_use]
    pub fn to_document(&self, id: NodeId) -> ElementDocument {
        let element = &self[id];
        ElementDocument {
            kind: element.kind.clone(),
            name: element.name.clone(),
            description: element.description.clone(),
            remarks: element.remarks.clone(),
            tag: element.tag.clone(),
            return_type: element
                .return_type
                .map(|ret| Box::new(self.to_document(ret))),
            children: element
                .children
                .iter()
                .map(|&child| self.to_document(child))
                .collect(),
        }
    }

    /// Build a module from a document whose root is a `module` element.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidDocument`] if the root is another kind.
    pub fn from_document(document: &ElementDocument) -> Result<Self, ModelError> {
        if !matches!(document.kind, ElementKind::Module) {
            return Err(ModelError::InvalidDocument(format!(
                "root element must be a module, found {}",
                document.kind.kind()
            )));
        }
        let mut module = Self::new(document.name.clone().unwrap_or_default());
        let root = module.root();
        module[root].description.clone_from(&document.description);
        module[root].remarks.clone_from(&document.remarks);
        module[root].tag.clone_from(&document.tag);
        for child in &document.children {
            module.import(root, child);
        }
        Ok(module)
    }

    /// Append a copy of `document` under `parent`. Returns the new subtree root.
    pub fn import(&mut self, parent: NodeId, document: &ElementDocument) -> NodeId {
        let id = self.add_new(parent, document.element());
        self.import_body(id, document);
        id
    }

    fn import_body(&mut self, id: NodeId, document: &ElementDocument) {
        if let Some(ret) = &document.return_type {
            let info = match &ret.kind {
                ElementKind::Type(info) => info.clone(),
                other => other.type_info().cloned().unwrap_or_default(),
            };
            let ret_id = self.set_return_type(id, info);
            let node = &mut self[ret_id];
            if ret.name.is_some() {
                node.name.clone_from(&ret.name);
            }
            node.description.clone_from(&ret.description);
            node.remarks.clone_from(&ret.remarks);
            node.tag.clone_from(&ret.tag);
        }
        for child in &document.children {
            self.import(id, child);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{MethodInfo, ParameterInfo, TypeInfo};
    use pretty_assertions::assert_eq;

    #[test]
    fn document_round_trip_preserves_shape() {
        let mut module = CppModule::new("sample");
        let root = module.root();
        let inc = module.add_new(root, CppElement::new("api", ElementKind::Include));
        let f = module.add_new(
            inc,
            CppElement::new("Open", ElementKind::Function(MethodInfo::default()))
                .with_description("Opens a handle."),
        );
        module.set_return_type(f, TypeInfo::new("HANDLE"));
        module.add_new(
            f,
            CppElement::new(
                "path",
                ElementKind::Parameter(ParameterInfo {
                    type_ref: TypeInfo::new("char").with_const(true).with_pointer("*"),
                    ..ParameterInfo::default()
                }),
            ),
        );

        let doc = module.to_document(root);
        let json = serde_json::to_string(&doc).unwrap();
        let back: ElementDocument = serde_json::from_str(&json).unwrap();
        let rebuilt = CppModule::from_document(&back).unwrap();

        assert_eq!(rebuilt.to_document(rebuilt.root()), doc);
        let open = rebuilt.find_first("api::Open", None).unwrap().unwrap();
        assert!(rebuilt.return_type(open).is_some());
    }

    #[test]
    fn return_type_keeps_its_notes() {
        let mut module = CppModule::new("sample");
        let root = module.root();
        let f = module.add_new(
            root,
            CppElement::new("Close", ElementKind::Function(MethodInfo::default())),
        );
        let ret = module.set_return_type(f, TypeInfo::new("BOOL"));
        module[ret].description = Some("Non-zero on success.".into());
        module[ret].remarks = Some("See GetLastError.".into());

        let doc = module.to_document(root);
        let rebuilt = CppModule::from_document(&doc).unwrap();
        let close = rebuilt.find_first("Close", None).unwrap().unwrap();
        let rebuilt_ret = rebuilt.return_type(close).unwrap();

        assert_eq!(rebuilt[rebuilt_ret].remarks.as_deref(), Some("See GetLastError."));
        assert_eq!(rebuilt.full_name(rebuilt_ret).as_deref(), Some("Close::return"));
        assert_eq!(rebuilt.to_document(rebuilt.root()), doc);
    }

    #[test]
    fn document_json_is_flat_per_node() {
        let json = serde_json::json!({
            "kind": "module",
            "name": "m",
            "children": [
                {"kind": "include", "name": "a", "children": [
                    {"kind": "enum", "name": "E", "underlying_type": "int", "children": [
                        {"kind": "enum_item", "name": "E_A", "value": "1"}
                    ]}
                ]}
            ]
        });
        let doc: ElementDocument = serde_json::from_value(json).unwrap();
        let module = CppModule::from_document(&doc).unwrap();
        assert!(module.find_first("E_A", None).unwrap().is_some());
        assert!(module.find_first("a::E", None).unwrap().is_some());
    }

    #[test]
    fn non_module_root_is_rejected() {
        let doc = ElementDocument {
            kind: ElementKind::Include,
            name: Some("x".into()),
            description: None,
            remarks: None,
            tag: None,
            return_type: None,
            children: Vec::new(),
        };
        assert!(matches!(
            CppModule::from_document(&doc),
            Err(ModelError::InvalidDocument(_))
        ));
    }
}
