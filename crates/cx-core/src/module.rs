//! The arena that owns a declaration tree.
//!
//! Every element lives in one `Vec` and refers to its parent and children by
//! [`NodeId`]. Detaching an element never frees its slot, so ids stay valid
//! for the life of the module and a detached subtree can be re-attached.

use std::ops::{Index, IndexMut};

use crate::element::{CppElement, ElementKind, NodeId, TypeInfo};
use crate::kind::Kind;

/// Name given to the synthetic return-type node of methods and functions.
pub const RETURN_NAME: &str = "return";

/// Owner of a C++ declaration tree rooted at a `Module` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CppModule {
    nodes: Vec<CppElement>,
    root: NodeId,
}

impl CppModule {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            nodes: vec![CppElement::new(name, ElementKind::Module)],
            root: NodeId(0),
        }
    }

    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Name of the root module element.
    #[must_use]
    pub fn name(&self) -> &str {
        self[self.root].name().unwrap_or_default()
    }

    /// Number of slots in the arena, detached elements included.
    #[must_use]
    pub const fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&CppElement> {
        self.nodes.get(id.index())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut CppElement> {
        self.nodes.get_mut(id.index())
    }

    // ── Construction ───────────────────────────────────────────────────

    /// Store `element` as a new detached node.
    ///
    /// Structural links carried by the value are dropped; use [`add`](Self::add)
    /// to place it in the tree.
    pub fn create(&mut self, element: CppElement) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(element.unlinked());
        id
    }

    /// Create `element` and append it under `parent`.
    pub fn add_new(&mut self, parent: NodeId, element: CppElement) -> NodeId {
        let id = self.create(element);
        self.add(parent, id);
        id
    }

    /// Give a method or function its return type, replacing any previous one.
    ///
    /// The return type is a `Type` node named `return` whose parent is the
    /// owner, kept outside the owner's children.
    pub fn set_return_type(&mut self, owner: NodeId, info: TypeInfo) -> NodeId {
        if let Some(previous) = self[owner].return_type {
            self[previous].parent = None;
        }
        let id = self.create(CppElement::new(RETURN_NAME, ElementKind::Type(info)));
        self[id].parent = Some(owner);
        self[owner].return_type = Some(id);
        id
    }

    // ── Structure ──────────────────────────────────────────────────────

    /// Append `child` as the last child of `parent`, detaching it from any
    /// previous parent first.
    ///
    /// Attaching an element under itself or one of its descendants would form
    /// a cycle; that request is ignored.
    pub fn add(&mut self, parent: NodeId, child: NodeId) {
        if self.is_ancestor_or_self(child, parent) {
            tracing::warn!(%parent, %child, "ignoring add that would create a cycle");
            return;
        }
        self.detach(child);
        self[child].parent = Some(parent);
        self[parent].children.push(child);
    }

    pub fn add_all(&mut self, parent: NodeId, children: impl IntoIterator<Item = NodeId>) {
        for child in children {
            self.add(parent, child);
        }
    }

    /// Detach `child` if `parent` currently owns it. Returns whether it did.
    pub fn remove(&mut self, parent: NodeId, child: NodeId) -> bool {
        if self[child].parent != Some(parent) {
            return false;
        }
        self.detach(child);
        true
    }

    /// Unlink `child` from its parent. Its own descendants stay attached to it.
    pub fn detach(&mut self, child: NodeId) {
        let Some(parent) = self[child].parent.take() else {
            return;
        };
        let owner = &mut self[parent];
        if owner.return_type == Some(child) {
            owner.return_type = None;
        } else {
            owner.children.retain(|&id| id != child);
        }
    }

    // ── Queries ────────────────────────────────────────────────────────

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self[id].parent
    }

    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self[id].children
    }

    #[must_use]
    pub fn return_type(&self, id: NodeId) -> Option<NodeId> {
        self[id].return_type
    }

    /// Children followed by the return type, if the element has one.
    #[must_use]
    pub fn all_items(&self, id: NodeId) -> Vec<NodeId> {
        let element = &self[id];
        element
            .children
            .iter()
            .copied()
            .chain(element.return_type)
            .collect()
    }

    /// Whether `id` is a method or function's return-type node.
    #[must_use]
    pub fn is_return_type(&self, id: NodeId) -> bool {
        self[id]
            .parent
            .is_some_and(|parent| self[parent].return_type == Some(id))
    }

    /// Whether `ancestor` is `id` or lies on its parent chain.
    #[must_use]
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self[node].parent;
        }
        false
    }

    /// Pre-order walk over `id` and everything reachable through `all_items`.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.all_items(node).into_iter().rev());
        }
        out
    }

    /// Qualified name, computed from the current tree shape.
    ///
    /// The module itself has an empty full name, enum items are never
    /// qualified, anonymous elements have none.
    #[must_use]
    pub fn full_name(&self, id: NodeId) -> Option<String> {
        let element = &self[id];
        match element.kind() {
            Kind::Module => Some(String::new()),
            _ => {
                let name = element.name()?;
                let path = self.path(id)?;
                if path.is_empty() {
                    Some(name.to_string())
                } else {
                    Some(format!("{path}::{name}"))
                }
            }
        }
    }

    /// Full name of the parent; empty for the module and enum items.
    ///
    /// Detached elements have no path, so neither they nor their descendants
    /// have a full name until they are attached again.
    #[must_use]
    pub fn path(&self, id: NodeId) -> Option<String> {
        let element = &self[id];
        if element.kind() == Kind::EnumItem || id == self.root {
            return Some(String::new());
        }
        self.full_name(element.parent?)
    }

    /// First ancestor (starting at the parent) of the given kind.
    #[must_use]
    pub fn ancestor_of_kind(&self, id: NodeId, kind: Kind) -> Option<NodeId> {
        let mut current = self[id].parent;
        while let Some(node) = current {
            if self[node].kind() == kind {
                return Some(node);
            }
            current = self[node].parent;
        }
        None
    }
}

impl Index<NodeId> for CppModule {
    type Output = CppElement;

    fn index(&self, id: NodeId) -> &Self::Output {
        &self.nodes[id.index()]
    }
}

impl IndexMut<NodeId> for CppModule {
    fn index_mut(&mut self, id: NodeId) -> &mut Self::Output {
        &mut self.nodes[id.index()]
    }
}
