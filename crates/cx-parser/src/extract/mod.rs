//! Walks a parsed header and builds cx-core elements under an `Include`.
//!
//! The walker dispatches on tree-sitter node kinds. Namespaces, `extern "C"`
//! blocks and preprocessor conditionals are transparent: their declarations
//! land directly in the include.

mod declarators;
mod functions;
mod records;

#[cfg(test)]
mod tests;

use std::collections::HashMap;

use ast_grep_core::{Doc, Node};
use cx_core::{CppElement, CppModule, ElementKind, NodeId};

use declarators::Declared;

/// Vtable sizes of base interfaces that headers normally include rather
/// than declare.
const KNOWN_VTABLES: &[(&str, u32)] = &[("IUnknown", 3), ("IInspectable", 6)];

pub(crate) struct Extractor<'a> {
    module: &'a mut CppModule,
    /// Unmasked header text; node byte ranges index into it.
    source: &'a str,
    guids: &'a HashMap<String, String>,
    dll_name: Option<&'a str>,
    vtable_sizes: HashMap<String, u32>,
    pack_stack: Vec<Option<u32>>,
    pack: Option<u32>,
    function_index: u32,
}

impl<'a> Extractor<'a> {
    pub(crate) fn new(
        module: &'a mut CppModule,
        source: &'a str,
        guids: &'a HashMap<String, String>,
        dll_name: Option<&'a str>,
    ) -> Self {
        Self {
            module,
            source,
            guids,
            dll_name,
            vtable_sizes: KNOWN_VTABLES
                .iter()
                .map(|&(name, size)| (name.to_string(), size))
                .collect(),
            pack_stack: Vec::new(),
            pack: None,
            function_index: 0,
        }
    }

    /// Extract every declaration directly inside `container`.
    pub(crate) fn extract_items<D: Doc>(&mut self, parent: NodeId, container: &Node<'_, D>) {
        let children: Vec<_> = container.children().collect();
        for (idx, child) in children.iter().enumerate() {
            match child.kind().as_ref() {
                "comment" => {}
                "namespace_definition" => {
                    if let Some(body) = child.field("body") {
                        self.extract_items(parent, &body);
                    }
                }
                "linkage_specification" => match child.field("body") {
                    Some(body) if body.kind().as_ref() == "declaration_list" => {
                        self.extract_items(parent, &body);
                    }
                    Some(body) => {
                        let doc = collect_doc_comment(&children, idx);
                        self.extract_item(parent, &body, doc);
                    }
                    None => {}
                },
                "preproc_ifdef" | "preproc_if" | "preproc_else" | "preproc_elif"
                | "preproc_elifdef" => self.extract_items(parent, child),
                "preproc_call" => self.pragma(child),
                _ => {
                    let doc = collect_doc_comment(&children, idx);
                    self.extract_item(parent, child, doc);
                }
            }
        }
    }

    fn extract_item<D: Doc>(&mut self, parent: NodeId, node: &Node<'_, D>, doc: String) {
        match node.kind().as_ref() {
            "enum_specifier" => {
                self.extract_enum(parent, node, None, doc);
            }
            "struct_specifier" | "union_specifier" | "class_specifier" => {
                self.extract_record(parent, node, None, doc);
            }
            "type_definition" => self.extract_typedef(parent, node, doc),
            "declaration" => self.extract_declaration(parent, node, doc),
            "function_definition" => {
                if let Some(declarator) = node.field("declarator") {
                    let declared = Declared::resolve(&declarator);
                    if declared.is_callable() {
                        self.extract_function(parent, node, &declared, doc);
                    }
                }
            }
            "ERROR" => tracing::warn!(
                line = node.start_pos().line() + 1,
                "skipping unparsable region"
            ),
            _ => {}
        }
    }

    /// `#pragma pack` bookkeeping; the current value becomes struct alignment.
    fn pragma<D: Doc>(&mut self, node: &Node<'_, D>) {
        let is_pragma = node
            .field("directive")
            .is_some_and(|d| d.text().trim() == "#pragma");
        let Some(argument) = node.field("argument").filter(|_| is_pragma) else {
            return;
        };
        let argument = argument.text();
        let Some(args) = argument.trim().strip_prefix("pack") else {
            return;
        };
        let args = args.trim().trim_start_matches('(').trim_end_matches(')');
        let parts: Vec<&str> = args
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        match parts.as_slice() {
            [] => self.pack = None,
            ["push", rest @ ..] => {
                self.pack_stack.push(self.pack);
                if let Some(n) = rest.iter().find_map(|p| p.parse::<u32>().ok()) {
                    self.pack = Some(n);
                }
            }
            ["pop", ..] => self.pack = self.pack_stack.pop().flatten(),
            [n] => self.pack = n.parse().ok(),
            _ => tracing::debug!(pragma = %argument, "ignoring pragma"),
        }
    }

    /// Original (unmasked) text between two byte offsets.
    fn raw(&self, start: usize, end: usize) -> &'a str {
        self.source.get(start..end).unwrap_or_default()
    }
}

fn element(name: Option<String>, kind: ElementKind, doc: String) -> CppElement {
    let element = match name {
        Some(name) => CppElement::new(name, kind),
        None => CppElement::anonymous(kind),
    };
    if doc.is_empty() {
        element
    } else {
        element.with_description(doc)
    }
}

// ── Doc comment helpers ────────────────────────────────────────────

/// Contiguous comments directly above `siblings[idx]`. A blank line ends
/// the block, and so does a comment trailing the previous declaration.
fn collect_doc_comment<D: Doc>(siblings: &[Node<'_, D>], idx: usize) -> String {
    let mut comments = Vec::new();
    let target_line = siblings[idx].start_pos().line();

    let mut i = idx;
    while i > 0 {
        i -= 1;
        let sibling = &siblings[i];
        if sibling.kind().as_ref() != "comment" {
            break;
        }
        if i > 0 && trails(&siblings[i - 1], sibling) {
            break;
        }
        let comment_end = sibling.end_pos().line();
        let next_start = if i + 1 < idx {
            siblings[i + 1].start_pos().line()
        } else {
            target_line
        };
        if next_start > comment_end + 1 {
            break;
        }
        let stripped = strip_comment(&sibling.text());
        if !stripped.is_empty() {
            comments.push(stripped);
        }
    }
    comments.reverse();
    comments.join("\n")
}

/// Whether `comment` sits on the line where `previous` ends. Preprocessor
/// lines own their newline, so they never have trailing comments.
fn trails<D: Doc>(previous: &Node<'_, D>, comment: &Node<'_, D>) -> bool {
    previous.kind().as_ref() != "comment"
        && !previous.text().ends_with('\n')
        && previous.end_pos().line() == comment.start_pos().line()
}

/// Comment on the same line right after `siblings[idx]`, past any `,`.
fn trailing_comment<D: Doc>(siblings: &[Node<'_, D>], idx: usize) -> Option<String> {
    let line = siblings[idx].end_pos().line();
    siblings
        .get(idx + 1..)?
        .iter()
        .find(|s| !matches!(s.kind().as_ref(), "," | ";"))
        .filter(|s| s.kind().as_ref() == "comment" && s.start_pos().line() == line)
        .map(|s| strip_comment(&s.text()))
        .filter(|text| !text.is_empty())
}

/// Leading doc comment, or the trailing one for members documented inline.
fn member_doc<D: Doc>(members: &[Node<'_, D>], idx: usize) -> String {
    let doc = collect_doc_comment(members, idx);
    if doc.is_empty() {
        trailing_comment(members, idx).unwrap_or_default()
    } else {
        doc
    }
}

fn strip_comment(text: &str) -> String {
    let text = text.trim();
    if let Some(rest) = text.strip_prefix("//") {
        return rest.trim_start_matches(['/', '!', '<']).trim().to_string();
    }
    let inner = text
        .strip_prefix("/**")
        .or_else(|| text.strip_prefix("/*"))
        .unwrap_or(text);
    let inner = inner.strip_prefix('<').unwrap_or(inner);
    let inner = inner.strip_suffix("*/").unwrap_or(inner);
    inner
        .lines()
        .map(|line| {
            let trimmed = line.trim();
            let stripped = trimmed
                .strip_prefix("* ")
                .unwrap_or_else(|| trimmed.strip_prefix('*').unwrap_or(trimmed));
            stripped.trim()
        })
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
