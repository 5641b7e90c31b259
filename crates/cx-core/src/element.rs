//! Declaration nodes and their kind-specific payloads.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::kind::Kind;
use crate::tag::Tag;

/// Index of an element inside its owning [`CppModule`](crate::CppModule).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Shared attributes
// ---------------------------------------------------------------------------

/// A reference to a C++ type as written on a field, parameter or return value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TypeInfo {
    pub type_name: String,
    /// Indirection marker: `""`, `"*"`, `"**"`, `"&"`.
    #[serde(default)]
    pub pointer: String,
    #[serde(default)]
    pub is_const: bool,
    #[serde(default)]
    pub is_array: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub array_dimension: Option<String>,
}

impl TypeInfo {
    #[must_use]
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_pointer(mut self, pointer: impl Into<String>) -> Self {
        self.pointer = pointer.into();
        self
    }

    #[must_use]
    pub const fn with_const(mut self, is_const: bool) -> Self {
        self.is_const = is_const;
        self
    }

    #[must_use]
    pub fn with_array(mut self, dimension: impl Into<String>) -> Self {
        self.is_array = true;
        self.array_dimension = Some(dimension.into());
        self
    }

    #[must_use]
    pub fn is_pointer(&self) -> bool {
        !self.pointer.is_empty()
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_const {
            f.write_str("const ")?;
        }
        write!(f, "{}{}", self.type_name, self.pointer)?;
        if self.is_array {
            write!(f, "[{}]", self.array_dimension.as_deref().unwrap_or(""))?;
        }
        Ok(())
    }
}

/// Calling convention of a method or function.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum CallingConvention {
    #[default]
    Unknown,
    StdCall,
    FastCall,
    ThisCall,
    CDecl,
}

impl CallingConvention {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::StdCall => "std_call",
            Self::FastCall => "fast_call",
            Self::ThisCall => "this_call",
            Self::CDecl => "c_decl",
        }
    }
}

impl fmt::Display for CallingConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data flow direction of a parameter.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ParamDirection {
    #[default]
    In,
    Out,
    InOut,
}

impl ParamDirection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
            Self::InOut => "in_out",
        }
    }
}

impl fmt::Display for ParamDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Kind payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EnumInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub underlying_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EnumItemInfo {
    /// Initializer as written in the header, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StructInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<u32>,
    #[serde(default)]
    pub is_union: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct InterfaceInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FieldInfo {
    pub type_ref: TypeInfo,
    /// Declaration index inside the owning struct.
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub is_bit_field: bool,
    #[serde(default)]
    pub bit_offset: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bit_width: Option<u32>,
}

/// Payload shared by methods and free functions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MethodInfo {
    #[serde(default)]
    pub calling_convention: CallingConvention,
    /// Vtable slot for interface methods, declaration index otherwise.
    #[serde(default)]
    pub offset: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dll_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ParameterInfo {
    pub type_ref: TypeInfo,
    #[serde(default)]
    pub direction: ParamDirection,
    #[serde(default)]
    pub is_optional: bool,
}

/// Kind tag plus the attributes that only make sense for that kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ElementKind {
    Module,
    Include,
    Enum(EnumInfo),
    EnumItem(EnumItemInfo),
    Struct(StructInfo),
    Interface(InterfaceInfo),
    Type(TypeInfo),
    Field(FieldInfo),
    Method(MethodInfo),
    Function(MethodInfo),
    Parameter(ParameterInfo),
}

impl ElementKind {
    #[must_use]
    pub const fn kind(&self) -> Kind {
        match self {
            Self::Module => Kind::Module,
            Self::Include => Kind::Include,
            Self::Enum(_) => Kind::Enum,
            Self::EnumItem(_) => Kind::EnumItem,
            Self::Struct(_) => Kind::Struct,
            Self::Interface(_) => Kind::Interface,
            Self::Type(_) => Kind::Type,
            Self::Field(_) => Kind::Field,
            Self::Method(_) => Kind::Method,
            Self::Function(_) => Kind::Function,
            Self::Parameter(_) => Kind::Parameter,
        }
    }

    /// Type reference of fields, parameters and standalone types.
    #[must_use]
    pub const fn type_info(&self) -> Option<&TypeInfo> {
        match self {
            Self::Type(info) => Some(info),
            Self::Field(field) => Some(&field.type_ref),
            Self::Parameter(param) => Some(&param.type_ref),
            _ => None,
        }
    }

    pub fn type_info_mut(&mut self) -> Option<&mut TypeInfo> {
        match self {
            Self::Type(info) => Some(info),
            Self::Field(field) => Some(&mut field.type_ref),
            Self::Parameter(param) => Some(&mut param.type_ref),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// CppElement
// ---------------------------------------------------------------------------

/// One C++ declaration.
///
/// Structure (`parent`, `children`, return type) is owned by the
/// [`CppModule`](crate::CppModule) arena and only changes through its methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CppElement {
    pub name: Option<String>,
    pub description: Option<String>,
    pub remarks: Option<String>,
    pub tag: Option<Tag>,
    pub kind: ElementKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) return_type: Option<NodeId>,
}

impl CppElement {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ElementKind) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::anonymous(kind)
        }
    }

    #[must_use]
    pub const fn anonymous(kind: ElementKind) -> Self {
        Self {
            name: None,
            description: None,
            remarks: None,
            tag: None,
            kind,
            parent: None,
            children: Vec::new(),
            return_type: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_remarks(mut self, remarks: impl Into<String>) -> Self {
        self.remarks = Some(remarks.into());
        self
    }

    #[must_use]
    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tag = Some(tag);
        self
    }

    #[must_use]
    pub const fn kind(&self) -> Kind {
        self.kind.kind()
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    #[must_use]
    pub const fn return_type(&self) -> Option<NodeId> {
        self.return_type
    }

    /// Output name: the mapping tag's rename when present, the C++ name otherwise.
    #[must_use]
    pub fn mapped_name(&self) -> Option<&str> {
        match &self.tag {
            Some(Tag::Mapping(rule)) => rule.name.as_deref().or(self.name.as_deref()),
            _ => self.name.as_deref(),
        }
    }

    /// Detached copy without structural links.
    #[must_use]
    pub(crate) fn unlinked(&self) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            return_type: None,
            ..self.clone()
        }
    }
}
