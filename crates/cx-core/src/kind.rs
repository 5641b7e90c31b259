//! The closed set of declaration kinds.
//!
//! All kinds use `snake_case` serialization, the same spelling accepted by
//! [`Kind::from_str`] and used in rule files.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// Discriminant of a [`CppElement`](crate::CppElement), used for kind filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    Module,
    Include,
    Enum,
    EnumItem,
    Struct,
    Interface,
    Type,
    Field,
    Method,
    Function,
    Parameter,
}

impl Kind {
    pub const ALL: [Self; 11] = [
        Self::Module,
        Self::Include,
        Self::Enum,
        Self::EnumItem,
        Self::Struct,
        Self::Interface,
        Self::Type,
        Self::Field,
        Self::Method,
        Self::Function,
        Self::Parameter,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Module => "module",
            Self::Include => "include",
            Self::Enum => "enum",
            Self::EnumItem => "enum_item",
            Self::Struct => "struct",
            Self::Interface => "interface",
            Self::Type => "type",
            Self::Field => "field",
            Self::Method => "method",
            Self::Function => "function",
            Self::Parameter => "parameter",
        }
    }

    /// Kinds that own a return-type node next to their children.
    #[must_use]
    pub const fn is_callable(self) -> bool {
        matches!(self, Self::Method | Self::Function)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| ModelError::UnknownKind(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_display_spelling() {
        for kind in Kind::ALL {
            assert_eq!(kind.to_string().parse::<Kind>().unwrap(), kind);
        }
    }

    #[test]
    fn parse_is_lenient_about_case_and_dashes() {
        assert_eq!("Enum-Item".parse::<Kind>().unwrap(), Kind::EnumItem);
        assert_eq!(" STRUCT ".parse::<Kind>().unwrap(), Kind::Struct);
    }

    #[test]
    fn parse_rejects_unknown() {
        let err = "namespace".parse::<Kind>().unwrap_err();
        assert!(matches!(err, ModelError::UnknownKind(ref s) if s == "namespace"));
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&Kind::EnumItem).unwrap();
        assert_eq!(json, "\"enum_item\"");
    }
}
