//! Mapping rules: ordered pattern/action pairs applied to a module before
//! generation.

use schemars::JsonSchema;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::find::Query;
use crate::kind::Kind;
use crate::element::NodeId;
use crate::module::CppModule;
use crate::scope::IncludeScope;
use crate::tag::{MappingRule, Tag};

/// What a rule does to each element it matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RuleAction {
    /// Detach the element.
    Remove,
    /// Replace the element's name with the pattern substituted into `name`
    /// (`$1`, `${name}` refer to capture groups of the pattern).
    Rename { name: String },
    /// Attach or merge a mapping tag.
    Tag { mapping: MappingRule },
    /// Attach a free-form note tag.
    Note { text: String },
    /// Set the element's description.
    Describe { text: String },
    /// Re-parent the element under the first element matching `to`.
    Move { to: String },
}

impl RuleAction {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Remove => "remove",
            Self::Rename { .. } => "rename",
            Self::Tag { .. } => "tag",
            Self::Note { .. } => "note",
            Self::Describe { .. } => "describe",
            Self::Move { .. } => "move",
        }
    }
}

/// A path pattern, an optional kind filter and the action to run on matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Rule {
    pub pattern: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<Kind>,
    #[serde(flatten)]
    pub action: RuleAction,
}

impl Rule {
    #[must_use]
    pub fn new(pattern: impl Into<String>, kind: Option<Kind>, action: RuleAction) -> Self {
        Self {
            pattern: pattern.into(),
            kind,
            action,
        }
    }

    /// Apply this rule to the matches `scope` admits. Returns the number of
    /// affected elements.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidPattern`] for a malformed pattern and
    /// [`ModelError::MissingTarget`] when a `move` destination does not exist.
    pub fn apply(&self, module: &mut CppModule, scope: &IncludeScope) -> Result<usize, ModelError> {
        let query = Query::new(&self.pattern)?.with_kind(self.kind);
        let root = module.root();
        let targets = scope.filter(module, module.query(root, &query));

        let affected = match &self.action {
            RuleAction::Move { to } => Self::move_matches(module, targets, to)?,
            action => {
                let admitted: HashSet<NodeId> = targets.iter().copied().collect();
                module.query_mut(root, &query, |regex, matched| {
                    if !admitted.contains(&matched.id) {
                        return false;
                    }
                    match action {
                        RuleAction::Remove => return true,
                        RuleAction::Rename { name } => {
                            let renamed = regex.replace(matched.full_name, name.as_str());
                            matched.element.name = Some(renamed.into_owned());
                        }
                        RuleAction::Tag { mapping } => {
                            Tag::attach(&mut matched.element.tag, Tag::Mapping(mapping.clone()));
                        }
                        RuleAction::Note { text } => {
                            Tag::attach(&mut matched.element.tag, Tag::Note(text.clone()));
                        }
                        RuleAction::Describe { text } => {
                            matched.element.description = Some(text.clone());
                        }
                        RuleAction::Move { .. } => {}
                    }
                    false
                });
                targets.len()
            }
        };

        tracing::debug!(
            pattern = %self.pattern,
            action = self.action.as_str(),
            affected,
            "applied rule"
        );
        Ok(affected)
    }

    // Resolve everything first, then re-parent, so no full name is computed
    // on a half-moved tree.
    fn move_matches(
        module: &mut CppModule,
        matches: Vec<NodeId>,
        to: &str,
    ) -> Result<usize, ModelError> {
        let target = module
            .find_first(to, None)?
            .ok_or_else(|| ModelError::MissingTarget(to.to_string()))?;

        let mut moved = 0;
        for id in matches {
            if module.is_ancestor_or_self(id, target) || module.is_return_type(id) {
                tracing::warn!(
                    element = module.full_name(id).unwrap_or_default(),
                    target = to,
                    "skipping element that cannot move"
                );
                continue;
            }
            if id == module.root() {
                continue;
            }
            module.add(target, id);
            moved += 1;
        }
        Ok(moved)
    }
}

/// Apply `rules` in order within `scope`. Returns the total number of
/// affected elements.
///
/// # Errors
///
/// Stops at the first rule that fails.
pub fn apply_rules(
    module: &mut CppModule,
    rules: &[Rule],
    scope: &IncludeScope,
) -> Result<usize, ModelError> {
    rules.iter().try_fold(0, |total, rule| {
        Ok(total + rule.apply(module, scope)?)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{CppElement, ElementKind, EnumInfo, EnumItemInfo, StructInfo};
    use pretty_assertions::assert_eq;

    fn module() -> CppModule {
        let mut module = CppModule::new("m");
        let root = module.root();
        let inc = module.add_new(root, CppElement::new("d3d", ElementKind::Include));
        let e = module.add_new(
            inc,
            CppElement::new("D3D_FEATURE_LEVEL", ElementKind::Enum(EnumInfo::default())),
        );
        module.add_new(
            e,
            CppElement::new("D3D_FEATURE_LEVEL_11_0", ElementKind::EnumItem(EnumItemInfo::default())),
        );
        module.add_new(
            inc,
            CppElement::new("D3D_BOX", ElementKind::Struct(StructInfo::default())),
        );
        module
    }

    #[test]
    fn rename_substitutes_captures() {
        let mut m = module();
        let rule = Rule::new(
            "d3d::D3D_(.*)",
            Some(Kind::Struct),
            RuleAction::Rename {
                name: "Dx$1".into(),
            },
        );
        assert_eq!(rule.apply(&mut m, &IncludeScope::default()).unwrap(), 1);
        assert!(m.find_first("d3d::DxBOX", None).unwrap().is_some());
    }

    #[test]
    fn remove_detaches_enum_items() {
        let mut m = module();
        let rule = Rule::new("D3D_FEATURE_LEVEL_.*", None, RuleAction::Remove);
        assert_eq!(rule.apply(&mut m, &IncludeScope::default()).unwrap(), 1);
        assert!(m.find_all("D3D_FEATURE_LEVEL_.*").unwrap().is_empty());
    }

    #[test]
    fn move_requires_target() {
        let mut m = module();
        let rule = Rule::new(
            "d3d::D3D_BOX",
            None,
            RuleAction::Move {
                to: "nowhere".into(),
            },
        );
        let err = rule.apply(&mut m, &IncludeScope::default()).unwrap_err();
        assert!(matches!(err, ModelError::MissingTarget(ref t) if t == "nowhere"));
    }

    #[test]
    fn move_reparents_matches() {
        let mut m = module();
        let root = m.root();
        m.add_new(root, CppElement::new("common", ElementKind::Include));
        let rule = Rule::new(
            "d3d::D3D_BOX",
            None,
            RuleAction::Move {
                to: "common".into(),
            },
        );
        assert_eq!(rule.apply(&mut m, &IncludeScope::default()).unwrap(), 1);
        assert!(m.find_first("common::D3D_BOX", None).unwrap().is_some());
        assert!(m.find_first("d3d::D3D_BOX", None).unwrap().is_none());
    }

    #[test]
    fn scope_limits_rules_to_listed_includes() {
        let mut m = module();
        let root = m.root();
        let other = m.add_new(root, CppElement::new("d3d12", ElementKind::Include));
        m.add_new(
            other,
            CppElement::new("D3D_BOX", ElementKind::Struct(StructInfo::default())),
        );
        let rule = Rule::new(".*::D3D_BOX", None, RuleAction::Remove);

        let scope = IncludeScope::new(["d3d12"]);
        assert_eq!(rule.apply(&mut m, &scope).unwrap(), 1);
        assert!(m.find_first("d3d::D3D_BOX", None).unwrap().is_some());
        assert!(m.find_first("d3d12::D3D_BOX", None).unwrap().is_none());
    }

    #[test]
    fn rules_deserialize_with_flattened_action() {
        let rule: Rule = serde_json::from_value(serde_json::json!({
            "pattern": "d3d::.*",
            "kind": "struct",
            "action": "tag",
            "mapping": {"name": "Box", "visibility": "internal"}
        }))
        .unwrap();
        assert_eq!(rule.kind, Some(Kind::Struct));
        assert!(matches!(rule.action, RuleAction::Tag { ref mapping } if mapping.name.as_deref() == Some("Box")));
    }

    #[test]
    fn apply_rules_sums_counts() {
        let mut m = module();
        let rules = vec![
            Rule::new("d3d::.*", None, RuleAction::Describe { text: "x".into() }),
            Rule::new("D3D_FEATURE_LEVEL_11_0", None, RuleAction::Note { text: "n".into() }),
        ];
        assert_eq!(apply_rules(&mut m, &rules, &IncludeScope::default()).unwrap(), 3);
    }
}
