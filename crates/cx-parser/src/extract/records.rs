//! Enums, structs, unions and COM-style interfaces.

use ast_grep_core::{Doc, Node};
use cx_core::{
    ElementKind, EnumInfo, EnumItemInfo, FieldInfo, InterfaceInfo, MethodInfo, NodeId, StructInfo,
};

use super::declarators::{Declared, base_type, declarators, is_const, normalize};
use super::{Extractor, element, member_doc};

impl Extractor<'_> {
    /// `enum`, `enum class` and the enum inside `typedef enum`.
    pub(super) fn extract_enum<D: Doc>(
        &mut self,
        parent: NodeId,
        node: &Node<'_, D>,
        alias: Option<String>,
        doc: String,
    ) -> Option<NodeId> {
        let body = node.field("body")?;
        let name = alias.or_else(|| node.field("name").map(|n| n.text().to_string()));
        let info = EnumInfo {
            underlying_type: node.field("base").map(|base| normalize(&base.text())),
        };
        let id = self
            .module
            .add_new(parent, element(name, ElementKind::Enum(info), doc));

        let items: Vec<_> = body.children().collect();
        for (idx, item) in items.iter().enumerate() {
            if item.kind().as_ref() != "enumerator" {
                continue;
            }
            let Some(name) = item.field("name") else {
                continue;
            };
            let info = EnumItemInfo {
                value: item.field("value").map(|value| normalize(&value.text())),
            };
            self.module.add_new(
                id,
                element(
                    Some(name.text().to_string()),
                    ElementKind::EnumItem(info),
                    member_doc(&items, idx),
                ),
            );
        }
        Some(id)
    }

    /// `typedef struct {…} NAME;` and friends. The typedef name wins over the
    /// tag name; aliases without a body are ignored.
    pub(super) fn extract_typedef<D: Doc>(&mut self, parent: NodeId, node: &Node<'_, D>, doc: String) {
        let Some(ty) = node.field("type") else {
            return;
        };
        if ty.field("body").is_none() {
            return;
        }
        let alias = node
            .children()
            .find(|c| c.kind().as_ref() == "type_identifier")
            .map(|c| c.text().to_string());
        match ty.kind().as_ref() {
            "enum_specifier" => {
                self.extract_enum(parent, &ty, alias, doc);
            }
            "struct_specifier" | "union_specifier" | "class_specifier" => {
                self.extract_record(parent, &ty, alias, doc);
            }
            _ => {}
        }
    }

    /// A record with a body: `Interface` when it declares virtual methods,
    /// `Struct` otherwise.
    pub(super) fn extract_record<D: Doc>(
        &mut self,
        parent: NodeId,
        node: &Node<'_, D>,
        alias: Option<String>,
        doc: String,
    ) -> Option<NodeId> {
        let body = node.field("body")?;
        let tag_name = node.field("name").map(|n| n.text().to_string());
        let base = base_classes(node).into_iter().next();
        let members: Vec<_> = body.children().collect();

        if members.iter().any(is_virtual_method) {
            let guid = [alias.as_ref(), tag_name.as_ref()]
                .into_iter()
                .flatten()
                .find_map(|n| self.guids.get(n))
                .cloned();
            let name = alias.or(tag_name);
            Some(self.extract_interface(parent, name, InterfaceInfo { base, guid }, &members, doc))
        } else {
            let info = StructInfo {
                align: self.pack,
                is_union: node.kind().as_ref() == "union_specifier",
                base,
            };
            let name = alias.or(tag_name);
            Some(self.extract_struct(parent, name, info, &members, doc))
        }
    }

    fn extract_struct<D: Doc>(
        &mut self,
        parent: NodeId,
        name: Option<String>,
        info: StructInfo,
        members: &[Node<'_, D>],
        doc: String,
    ) -> NodeId {
        let id = self
            .module
            .add_new(parent, element(name, ElementKind::Struct(info), doc));
        let mut index = 0u32;
        let mut bit_offset = 0u32;

        for (idx, member) in members.iter().enumerate() {
            if member.kind().as_ref() != "field_declaration" {
                continue;
            }
            if let Some(ty) = member.field("type")
                && ty.field("body").is_some()
            {
                if ty.kind().as_ref() == "enum_specifier" {
                    self.extract_enum(id, &ty, None, String::new());
                } else {
                    self.extract_record(id, &ty, None, String::new());
                }
            }

            let doc = member_doc(members, idx);
            let base = base_type(member);
            let is_const = is_const(member);
            let width = bit_width(member);
            let fields = declarators(member);
            if fields.is_empty()
                && let Some(width) = width
            {
                // unnamed bit field: padding only
                bit_offset += width;
                continue;
            }

            for declarator in fields {
                let declared = Declared::resolve(&declarator);
                if declared.is_callable() {
                    continue;
                }
                let Some(field_name) = declared.name.clone() else {
                    continue;
                };
                let info = FieldInfo {
                    type_ref: declared.type_info(&base, is_const),
                    offset: index,
                    is_bit_field: width.is_some(),
                    bit_offset: if width.is_some() { bit_offset } else { 0 },
                    bit_width: width,
                };
                self.module.add_new(
                    id,
                    element(Some(field_name), ElementKind::Field(info), doc.clone()),
                );
                index += 1;
                bit_offset = width.map_or(0, |w| bit_offset + w);
            }
        }
        id
    }

    /// Methods get consecutive vtable slots after the base interface's.
    fn extract_interface<D: Doc>(
        &mut self,
        parent: NodeId,
        name: Option<String>,
        info: InterfaceInfo,
        members: &[Node<'_, D>],
        doc: String,
    ) -> NodeId {
        let mut slot = info
            .base
            .as_ref()
            .and_then(|base| self.vtable_sizes.get(base))
            .copied()
            .unwrap_or(0);
        if let Some(base) = &info.base
            && !self.vtable_sizes.contains_key(base)
        {
            tracing::debug!(%base, "base interface not seen, slots start at 0");
        }
        let key = name.clone();
        let id = self
            .module
            .add_new(parent, element(name, ElementKind::Interface(info), doc));

        for (idx, member) in members.iter().enumerate() {
            if !is_virtual_method(member) {
                continue;
            }
            let Some(declarator) = member.field("declarator") else {
                continue;
            };
            let declared = Declared::resolve(&declarator);
            if !declared.is_callable() {
                continue;
            }
            if declared.name.as_deref().is_some_and(|n| n.starts_with('~')) {
                slot += 1;
                continue;
            }
            let info = MethodInfo {
                calling_convention: self.calling_convention_of(member, &declared),
                offset: slot,
                dll_name: None,
            };
            self.extract_callable(
                id,
                member,
                &declared,
                ElementKind::Method(info),
                member_doc(members, idx),
            );
            slot += 1;
        }

        if let Some(key) = key {
            self.vtable_sizes.insert(key, slot);
        }
        id
    }
}

fn is_virtual_method<D: Doc>(member: &Node<'_, D>) -> bool {
    matches!(
        member.kind().as_ref(),
        "field_declaration" | "function_definition" | "declaration"
    ) && member.children().any(|c| c.kind().as_ref() == "virtual")
}

fn base_classes<D: Doc>(node: &Node<'_, D>) -> Vec<String> {
    node.children()
        .filter(|c| c.kind().as_ref() == "base_class_clause")
        .flat_map(|clause| {
            clause
                .children()
                .filter(|c| {
                    matches!(
                        c.kind().as_ref(),
                        "type_identifier" | "qualified_identifier" | "template_type"
                    )
                })
                .map(|c| c.text().to_string())
                .collect::<Vec<_>>()
        })
        .collect()
}

fn bit_width<D: Doc>(member: &Node<'_, D>) -> Option<u32> {
    let clause = member
        .children()
        .find(|c| c.kind().as_ref() == "bitfield_clause")?;
    let literal = clause
        .children()
        .find(|c| c.kind().as_ref() == "number_literal")?;
    literal.text().trim().parse().ok()
}
