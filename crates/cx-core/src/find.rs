//! Regex path queries over a declaration tree.
//!
//! A [`Query`] matches elements whose full name (`Include::Struct::Field`)
//! matches the pattern end to end, optionally restricted to one [`Kind`].
//! Walks are depth-first pre-order through
//! [`CppModule::all_items`], starting with (and including) the traversal root.
//!
//! The mutating walk hands each match to a modifier that may edit the
//! element's data and ask for the element to be detached. Detaching happens
//! in the parent's frame once all of its children have been visited, so the
//! tree shape never changes under a running path computation.

use regex::Regex;

use crate::element::{CppElement, NodeId};
use crate::errors::ModelError;
use crate::kind::Kind;
use crate::module::CppModule;

/// A compiled path query.
#[derive(Debug, Clone)]
pub struct Query {
    pattern: String,
    regex: Regex,
    kind: Option<Kind>,
}

impl Query {
    /// Compile `pattern`, anchored as `^(?:pattern)$`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidPattern`] if the pattern is not a valid regex.
    pub fn new(pattern: &str) -> Result<Self, ModelError> {
        let regex = Regex::new(&format!("^(?:{pattern})$")).map_err(|source| {
            ModelError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            }
        })?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
            kind: None,
        })
    }

    #[must_use]
    pub const fn with_kind(mut self, kind: Option<Kind>) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    #[must_use]
    pub const fn regex(&self) -> &Regex {
        &self.regex
    }

    #[must_use]
    pub const fn kind(&self) -> Option<Kind> {
        self.kind
    }

    /// Whether an element with this full name and kind is a match.
    #[must_use]
    pub fn is_match(&self, full_name: &str, kind: Kind) -> bool {
        self.kind.is_none_or(|wanted| wanted == kind) && self.regex.is_match(full_name)
    }
}

/// A matched element handed to a modifier.
#[derive(Debug)]
pub struct Matched<'a> {
    pub id: NodeId,
    /// Full name at the time of the match.
    pub full_name: &'a str,
    pub element: &'a mut CppElement,
}

impl CppModule {
    /// Matches in pre-order, starting at `from`.
    #[must_use]
    pub fn query(&self, from: NodeId, query: &Query) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect(from, query, &mut out);
        out
    }

    fn collect(&self, id: NodeId, query: &Query, out: &mut Vec<NodeId>) {
        if self
            .full_name(id)
            .is_some_and(|full| query.is_match(&full, self[id].kind()))
        {
            out.push(id);
        }
        for child in self.all_items(id) {
            self.collect(child, query, out);
        }
    }

    /// Run `modifier` on every match under `from` and detach the ones it
    /// flags for removal. Returns the matches in pre-order.
    ///
    /// The traversal root is never detached.
    pub fn query_mut<F>(&mut self, from: NodeId, query: &Query, mut modifier: F) -> Vec<NodeId>
    where
        F: FnMut(&Regex, Matched<'_>) -> bool,
    {
        let mut out = Vec::new();
        if self.visit(from, query, &mut modifier, &mut out) {
            tracing::debug!(root = %from, "ignoring removal of traversal root");
        }
        out
    }

    fn visit<F>(
        &mut self,
        id: NodeId,
        query: &Query,
        modifier: &mut F,
        out: &mut Vec<NodeId>,
    ) -> bool
    where
        F: FnMut(&Regex, Matched<'_>) -> bool,
    {
        let mut remove = false;
        let kind = self[id].kind();
        match self.full_name(id) {
            Some(full) if query.is_match(&full, kind) => {
                out.push(id);
                remove = modifier(
                    query.regex(),
                    Matched {
                        id,
                        full_name: &full,
                        element: &mut self[id],
                    },
                );
            }
            _ => {}
        }

        let mut doomed = Vec::new();
        for child in self.all_items(id) {
            if self.visit(child, query, modifier, out) {
                doomed.push(child);
            }
        }
        for child in doomed {
            self.remove(id, child);
        }
        remove
    }

    // ── Convenience forms over the module root ─────────────────────────

    /// Every element matching `pattern` and `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidPattern`] for a malformed pattern.
    pub fn find(&self, pattern: &str, kind: Option<Kind>) -> Result<Vec<NodeId>, ModelError> {
        let query = Query::new(pattern)?.with_kind(kind);
        Ok(self.query(self.root(), &query))
    }

    /// First match in pre-order.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidPattern`] for a malformed pattern.
    pub fn find_first(
        &self,
        pattern: &str,
        kind: Option<Kind>,
    ) -> Result<Option<NodeId>, ModelError> {
        Ok(self.find(pattern, kind)?.into_iter().next())
    }

    /// Every element matching `pattern`, any kind.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidPattern`] for a malformed pattern.
    pub fn find_all(&self, pattern: &str) -> Result<Vec<NodeId>, ModelError> {
        self.find(pattern, None)
    }

    /// Detach every match. Returns how many elements were matched.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidPattern`] for a malformed pattern.
    pub fn remove_matching(
        &mut self,
        pattern: &str,
        kind: Option<Kind>,
    ) -> Result<usize, ModelError> {
        let query = Query::new(pattern)?.with_kind(kind);
        let root = self.root();
        Ok(self.query_mut(root, &query, |_, _| true).len())
    }

    /// Run `modifier` on every match from the module root.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidPattern`] for a malformed pattern.
    pub fn modify<F>(
        &mut self,
        pattern: &str,
        kind: Option<Kind>,
        modifier: F,
    ) -> Result<Vec<NodeId>, ModelError>
    where
        F: FnMut(&Regex, Matched<'_>) -> bool,
    {
        let query = Query::new(pattern)?.with_kind(kind);
        let root = self.root();
        Ok(self.query_mut(root, &query, modifier))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ElementKind, FieldInfo, MethodInfo, StructInfo, TypeInfo};
    use pretty_assertions::assert_eq;

    fn sample() -> (CppModule, NodeId, NodeId, NodeId) {
        let mut module = CppModule::new("m");
        let root = module.root();
        let inc = module.add_new(root, CppElement::new("foo", ElementKind::Include));
        let bar = module.add_new(
            inc,
            CppElement::new("Bar", ElementKind::Struct(StructInfo::default())),
        );
        let x = module.add_new(
            bar,
            CppElement::new(
                "x",
                ElementKind::Field(FieldInfo {
                    type_ref: TypeInfo::new("int"),
                    ..FieldInfo::default()
                }),
            ),
        );
        (module, inc, bar, x)
    }

    #[test]
    fn pattern_is_anchored() {
        let (module, _, bar, _) = sample();
        assert_eq!(module.find("foo::Bar", None).unwrap(), vec![bar]);
        assert!(module.find("Bar", None).unwrap().is_empty());
        assert!(module.find("foo::Ba", None).unwrap().is_empty());
    }

    #[test]
    fn alternation_is_grouped_by_anchor() {
        let (module, inc, bar, _) = sample();
        assert_eq!(module.find("foo|foo::Bar", None).unwrap(), vec![inc, bar]);
    }

    #[test]
    fn root_is_visited_with_empty_name() {
        let (module, _, _, _) = sample();
        assert_eq!(module.find("", None).unwrap(), vec![module.root()]);
    }

    #[test]
    fn invalid_pattern_is_error() {
        let (module, _, _, _) = sample();
        let err = module.find("foo(", None).unwrap_err();
        assert!(matches!(err, ModelError::InvalidPattern { .. }));
    }

    #[test]
    fn modifier_edits_in_place() {
        let (mut module, _, bar, _) = sample();
        let matched = module
            .modify("foo::.*", Some(Kind::Struct), |_, m| {
                m.element.description = Some(format!("was {}", m.full_name));
                false
            })
            .unwrap();
        assert_eq!(matched, vec![bar]);
        assert_eq!(module[bar].description.as_deref(), Some("was foo::Bar"));
    }

    #[test]
    fn removal_request_for_traversal_root_is_ignored() {
        let (mut module, inc, _, _) = sample();
        let query = Query::new("foo").unwrap();
        module.query_mut(inc, &query, |_, _| true);
        assert_eq!(module.parent(inc), Some(module.root()));
    }

    #[test]
    fn removed_return_type_no_longer_matches() {
        let mut module = CppModule::new("m");
        let root = module.root();
        let f = module.add_new(
            root,
            CppElement::new("Run", ElementKind::Function(MethodInfo::default())),
        );
        module.set_return_type(f, TypeInfo::new("void"));

        assert_eq!(module.remove_matching("Run::return", None).unwrap(), 1);
        assert_eq!(module.return_type(f), None);
        assert!(module.find("Run::return", None).unwrap().is_empty());
    }

    #[test]
    fn detached_subtree_has_no_matches() {
        let (mut module, _, bar, x) = sample();
        module.detach(bar);

        let query = Query::new(".*").unwrap();
        assert!(module.query(bar, &query).is_empty());
        assert!(module.find("foo::Bar::x", None).unwrap().is_empty());
        assert_eq!(module.parent(x), Some(bar));
    }
}
