//! Annotations attached to elements by rules.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Generated-code visibility requested by a mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    Internal,
    Private,
}

impl Visibility {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Internal => "internal",
            Self::Private => "private",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an element should appear in generated code. Unset fields keep the
/// element's own values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MappingRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pointer: Option<String>,
}

impl MappingRule {
    /// Overwrite the fields `other` sets; leave the rest untouched.
    pub fn merge(&mut self, other: &Self) {
        fn take(slot: &mut Option<String>, value: Option<&String>) {
            if let Some(value) = value {
                *slot = Some(value.clone());
            }
        }
        take(&mut self.name, other.name.as_ref());
        take(&mut self.namespace, other.namespace.as_ref());
        take(&mut self.type_name, other.type_name.as_ref());
        take(&mut self.pointer, other.pointer.as_ref());
        if other.visibility.is_some() {
            self.visibility = other.visibility;
        }
    }
}

/// Closed set of element annotations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Tag {
    Mapping(MappingRule),
    Note(String),
}

impl Tag {
    /// Apply `incoming` onto an element's tag slot.
    ///
    /// Mapping onto mapping merges field by field; every other combination
    /// replaces the slot.
    pub fn attach(slot: &mut Option<Self>, incoming: Self) {
        match (slot.as_mut(), incoming) {
            (Some(Self::Mapping(existing)), Self::Mapping(update)) => existing.merge(&update),
            (_, incoming) => *slot = Some(incoming),
        }
    }

    #[must_use]
    pub const fn as_mapping(&self) -> Option<&MappingRule> {
        match self {
            Self::Mapping(rule) => Some(rule),
            Self::Note(_) => None,
        }
    }
}
