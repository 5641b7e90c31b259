//! Declarator unwrapping: names, pointer markers, array dimensions and
//! function parameter lists.

use ast_grep_core::{Doc, Node};
use cx_core::TypeInfo;

/// Node kinds that can appear as a declarator in a declaration.
const DECLARATOR_KINDS: &[&str] = &[
    "identifier",
    "field_identifier",
    "type_identifier",
    "qualified_identifier",
    "destructor_name",
    "operator_name",
    "pointer_declarator",
    "reference_declarator",
    "array_declarator",
    "function_declarator",
    "parenthesized_declarator",
    "init_declarator",
];

fn is_declarator<D: Doc>(node: &Node<'_, D>) -> bool {
    DECLARATOR_KINDS.contains(&node.kind().as_ref())
}

/// What a declarator says about the entity it declares.
pub(crate) struct Declared<'r, D: Doc> {
    pub name: Option<String>,
    /// Indirection collected on the way to the name.
    pub pointer: String,
    dimensions: Vec<String>,
    /// Parameter list of the first function declarator met.
    pub parameters: Option<Node<'r, D>>,
    has_function: bool,
    /// A pointer wraps the function declarator: `void (*cb)(int)`.
    function_pointer: bool,
}

impl<'r, D: Doc> Declared<'r, D> {
    pub(crate) fn resolve(node: &Node<'r, D>) -> Self {
        let mut declared = Self {
            name: None,
            pointer: String::new(),
            dimensions: Vec::new(),
            parameters: None,
            has_function: false,
            function_pointer: false,
        };
        declared.visit(node);
        declared
    }

    fn visit(&mut self, node: &Node<'r, D>) {
        match node.kind().as_ref() {
            "identifier" | "field_identifier" | "type_identifier" | "qualified_identifier"
            | "destructor_name" | "operator_name" => {
                self.name = Some(node.text().to_string());
            }
            "pointer_declarator" => {
                self.pointer.push('*');
                self.function_pointer |= self.has_function;
                self.visit_field(node, "declarator");
            }
            "reference_declarator" => {
                let marker = if node.text().contains("&&") { "&&" } else { "&" };
                self.pointer.push_str(marker);
                self.visit_inner(node);
            }
            "array_declarator" => {
                self.dimensions.push(
                    node.field("size")
                        .map(|size| size.text().trim().to_string())
                        .unwrap_or_default(),
                );
                self.visit_field(node, "declarator");
            }
            "function_declarator" => {
                if !self.has_function {
                    self.has_function = true;
                    self.parameters = node.field("parameters");
                }
                self.visit_field(node, "declarator");
            }
            "init_declarator" => self.visit_field(node, "declarator"),
            "parenthesized_declarator" => self.visit_inner(node),
            _ => {}
        }
    }

    fn visit_field(&mut self, node: &Node<'r, D>, field: &str) {
        if let Some(inner) = node.field(field) {
            self.visit(&inner);
        }
    }

    fn visit_inner(&mut self, node: &Node<'r, D>) {
        if let Some(inner) = node.children().find(|c| is_declarator(c)) {
            self.visit(&inner);
        }
    }

    /// A function or method declaration, not a function pointer.
    pub(crate) const fn is_callable(&self) -> bool {
        self.has_function && !self.function_pointer
    }

    /// Array dimensions in source order, joined so `[a][b]` renders back.
    fn dimension(&self) -> Option<String> {
        if self.dimensions.is_empty() {
            return None;
        }
        let dims: Vec<&str> = self.dimensions.iter().rev().map(String::as_str).collect();
        Some(dims.join("]["))
    }

    pub(crate) fn type_info(&self, base: &str, is_const: bool) -> TypeInfo {
        let info = TypeInfo::new(base)
            .with_pointer(self.pointer.as_str())
            .with_const(is_const);
        match self.dimension() {
            Some(dimension) => info.with_array(dimension),
            None => info,
        }
    }
}

/// The declarators of a declaration, skipping its `type` node.
pub(crate) fn declarators<'r, D: Doc>(node: &Node<'r, D>) -> Vec<Node<'r, D>> {
    let type_range = node.field("type").map(|ty| ty.range());
    node.children()
        .filter(|child| Some(child.range()) != type_range && is_declarator(child))
        .collect()
}

/// Spelling of a declaration's `type`; records and enums by their tag name.
pub(crate) fn base_type<D: Doc>(node: &Node<'_, D>) -> String {
    let Some(ty) = node.field("type") else {
        return String::new();
    };
    match ty.kind().as_ref() {
        "struct_specifier" | "union_specifier" | "class_specifier" | "enum_specifier" => ty
            .field("name")
            .map(|name| name.text().to_string())
            .unwrap_or_default(),
        _ => normalize(&ty.text()),
    }
}

pub(crate) fn is_const<D: Doc>(node: &Node<'_, D>) -> bool {
    node.children()
        .any(|c| c.kind().as_ref() == "type_qualifier" && c.text().as_ref() == "const")
}

/// Collapse runs of whitespace, so `unsigned   int` reads `unsigned int`.
pub(crate) fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
