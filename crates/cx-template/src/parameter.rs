//! Values bound into a template's script scope.

use std::fmt;

use rhai::{Array, Dynamic, FLOAT, INT, ImmutableString, Map};
use serde::Serialize;

use crate::errors::TemplateError;

/// Declared type of a template parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
    String,
    Int,
    Float,
    Bool,
    Array,
    Map,
    Any,
}

impl ParamType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Array => "array",
            Self::Map => "map",
            Self::Any => "any",
        }
    }

    /// Parse a type name as written in `<#@ parameter type="…" #>`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "string" | "str" => Some(Self::String),
            "int" | "i64" | "integer" => Some(Self::Int),
            "float" | "f64" | "double" => Some(Self::Float),
            "bool" | "boolean" => Some(Self::Bool),
            "array" | "list" => Some(Self::Array),
            "map" | "object" | "element" => Some(Self::Map),
            "any" | "dynamic" | "" => Some(Self::Any),
            _ => None,
        }
    }

    /// Most specific type describing `value`.
    #[must_use]
    pub fn of(value: &Dynamic) -> Self {
        [
            Self::String,
            Self::Int,
            Self::Float,
            Self::Bool,
            Self::Array,
            Self::Map,
        ]
        .into_iter()
        .find(|ty| ty.accepts(value))
        .unwrap_or(Self::Any)
    }

    #[must_use]
    pub fn accepts(self, value: &Dynamic) -> bool {
        match self {
            Self::String => value.is::<ImmutableString>(),
            Self::Int => value.is::<INT>(),
            Self::Float => value.is::<FLOAT>(),
            Self::Bool => value.is::<bool>(),
            Self::Array => value.is::<Array>(),
            Self::Map => value.is::<Map>(),
            Self::Any => true,
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, typed value supplied by the caller of a template.
#[derive(Debug, Clone)]
pub struct TemplateParameter {
    pub name: String,
    pub param_type: ParamType,
    pub value: Dynamic,
}

impl TemplateParameter {
    #[must_use]
    pub fn new(name: impl Into<String>, param_type: ParamType, value: Dynamic) -> Self {
        Self {
            name: name.into(),
            param_type,
            value,
        }
    }

    #[must_use]
    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, ParamType::String, Dynamic::from(value.into()))
    }

    /// Convert any serializable value; structs become maps.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Runtime`] if the value cannot be represented.
    pub fn from_serialize<T: Serialize + ?Sized>(
        name: impl Into<String>,
        value: &T,
    ) -> Result<Self, TemplateError> {
        let name = name.into();
        let value = rhai::serde::to_dynamic(value).map_err(|e| TemplateError::Runtime {
            location: None,
            message: format!("cannot convert parameter '{name}': {e}"),
        })?;
        Ok(Self::new(name, ParamType::of(&value), value))
    }

    /// Check the value against the caller's declared type.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::ParameterType`] on mismatch.
    pub fn check(&self, expected: ParamType) -> Result<(), TemplateError> {
        if expected.accepts(&self.value) {
            Ok(())
        } else {
            Err(TemplateError::ParameterType {
                name: self.name.clone(),
                expected: expected.to_string(),
                actual: self.value.type_name().to_string(),
            })
        }
    }
}
