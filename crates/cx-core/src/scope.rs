//! Restricting rules and jobs to some of a module's includes.
//!
//! Scoping filters query results after the fact. Path queries always walk
//! the whole tree, so a scope can only drop matches that live under an
//! unlisted top-level element; it never changes what a query itself finds.

use crate::element::NodeId;
use crate::module::CppModule;

/// Names of top-level elements (normally includes) that rules and jobs may
/// touch. An empty scope admits everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncludeScope {
    names: Vec<String>,
}

impl IncludeScope {
    #[must_use]
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        self.names.is_empty()
    }

    /// Whether `id` is the module root or lies under a listed top-level
    /// element. Detached elements are never admitted by a non-empty scope.
    #[must_use]
    pub fn admits(&self, module: &CppModule, id: NodeId) -> bool {
        if self.is_unrestricted() {
            return true;
        }
        let root = module.root();
        let mut current = id;
        loop {
            match module.parent(current) {
                Some(parent) if parent == root => break,
                Some(parent) => current = parent,
                None => return current == root,
            }
        }
        module[current]
            .name()
            .is_some_and(|name| self.names.iter().any(|n| n == name))
    }

    /// Keep the admitted ids, in their original order.
    #[must_use]
    pub fn filter(&self, module: &CppModule, ids: Vec<NodeId>) -> Vec<NodeId> {
        if self.is_unrestricted() {
            return ids;
        }
        ids.into_iter().filter(|&id| self.admits(module, id)).collect()
    }
}
