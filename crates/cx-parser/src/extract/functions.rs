//! Free functions, their parameters and return types.

use ast_grep_core::{Doc, Node};
use cx_core::{
    CallingConvention, CppElement, ElementKind, MethodInfo, NodeId, ParameterInfo, TypeInfo,
};

use super::declarators::{Declared, base_type, declarators, is_const};
use super::{Extractor, element};
use crate::annotations;

impl Extractor<'_> {
    /// A `declaration`: a record or enum declared in place, function
    /// prototypes, or variables (ignored).
    pub(super) fn extract_declaration<D: Doc>(
        &mut self,
        parent: NodeId,
        node: &Node<'_, D>,
        doc: String,
    ) {
        if let Some(ty) = node.field("type")
            && ty.field("body").is_some()
        {
            match ty.kind().as_ref() {
                "enum_specifier" => {
                    self.extract_enum(parent, &ty, None, doc.clone());
                }
                "struct_specifier" | "union_specifier" | "class_specifier" => {
                    self.extract_record(parent, &ty, None, doc.clone());
                }
                _ => {}
            }
        }
        for declarator in declarators(node) {
            let declared = Declared::resolve(&declarator);
            if declared.is_callable() {
                self.extract_function(parent, node, &declared, doc.clone());
            }
        }
    }

    /// Out-of-line member definitions, destructors and operators are skipped.
    pub(super) fn extract_function<D: Doc>(
        &mut self,
        parent: NodeId,
        node: &Node<'_, D>,
        declared: &Declared<'_, D>,
        doc: String,
    ) {
        let Some(name) = declared.name.as_deref() else {
            return;
        };
        if name.contains("::") || name.starts_with('~') || name.starts_with("operator") {
            tracing::debug!(name, "skipping non-free function");
            return;
        }
        let info = MethodInfo {
            calling_convention: self.calling_convention_of(node, declared),
            offset: self.function_index,
            dll_name: self.dll_name.map(str::to_string),
        };
        self.function_index += 1;
        self.extract_callable(parent, node, declared, ElementKind::Function(info), doc);
    }

    /// Create a method or function element with its return type and
    /// parameters.
    pub(super) fn extract_callable<D: Doc>(
        &mut self,
        parent: NodeId,
        node: &Node<'_, D>,
        declared: &Declared<'_, D>,
        kind: ElementKind,
        doc: String,
    ) -> NodeId {
        let id = self
            .module
            .add_new(parent, element(declared.name.clone(), kind, doc));
        let return_type = declared.type_info(&base_type(node), is_const(node));
        self.module.set_return_type(id, return_type);
        if let Some(parameters) = &declared.parameters {
            self.extract_parameters(id, parameters);
        }
        id
    }

    /// Calling convention spelled between the start of the declaration and
    /// its parameter list.
    pub(super) fn calling_convention_of<D: Doc>(
        &self,
        node: &Node<'_, D>,
        declared: &Declared<'_, D>,
    ) -> CallingConvention {
        let range = node.range();
        let end = declared
            .parameters
            .as_ref()
            .map_or(range.end, |params| params.range().start);
        annotations::calling_convention(self.raw(range.start, end))
    }

    fn extract_parameters<D: Doc>(&mut self, owner: NodeId, list: &Node<'_, D>) {
        // SAL annotations were blanked, so a parameter's own range starts
        // after them; read from the preceding `(` or `,` instead.
        let mut previous_end = list.range().start;
        let mut index = 0usize;
        for param in list.children() {
            let range = param.range();
            let kind = param.kind();
            if matches!(
                kind.as_ref(),
                "parameter_declaration" | "optional_parameter_declaration"
            ) {
                let base = base_type(&param);
                let declared = param.field("declarator").map(|d| Declared::resolve(&d));
                let unnamed_void = base == "void"
                    && declared.as_ref().is_none_or(|d| d.pointer.is_empty() && d.name.is_none());
                if !unnamed_void {
                    let type_ref = match &declared {
                        Some(declared) => declared.type_info(&base, is_const(&param)),
                        None => TypeInfo::new(base).with_const(is_const(&param)),
                    };
                    let (direction, optional) =
                        annotations::parameter_direction(self.raw(previous_end, range.end));
                    let name = declared
                        .and_then(|d| d.name)
                        .unwrap_or_else(|| format!("arg{index}"));
                    let info = ParameterInfo {
                        type_ref,
                        direction,
                        is_optional: optional
                            || kind.as_ref() == "optional_parameter_declaration",
                    };
                    self.module
                        .add_new(owner, CppElement::new(name, ElementKind::Parameter(info)));
                    index += 1;
                }
            } else if kind.as_ref() == "variadic_parameter" || kind.as_ref() == "..." {
                tracing::debug!("variadic parameter not modelled");
            }
            previous_end = range.end;
        }
    }
}
