//! # cx-core
//!
//! Declaration model and rule engine for cxgen.
//!
//! This crate provides the types every other cxgen crate builds on:
//! - `CppModule`, an arena owning a tree of `CppElement` declarations
//! - `Kind` and the kind-specific payloads carried by each element
//! - the regex path engine (`find`, `modify`, `remove_matching`)
//! - mapping rules applied to a module before generation, optionally
//!   scoped to some includes
//! - serializable documents and the read-only views templates receive

pub mod document;
pub mod element;
pub mod errors;
pub mod find;
pub mod kind;
pub mod module;
pub mod rules;
pub mod scope;
pub mod tag;
pub mod view;

pub use document::ElementDocument;
pub use element::{
    CallingConvention, CppElement, ElementKind, EnumInfo, EnumItemInfo, FieldInfo, InterfaceInfo,
    MethodInfo, NodeId, ParamDirection, ParameterInfo, StructInfo, TypeInfo,
};
pub use errors::ModelError;
pub use find::{Matched, Query};
pub use kind::Kind;
pub use module::CppModule;
pub use rules::{Rule, RuleAction, apply_rules};
pub use scope::IncludeScope;
pub use tag::{MappingRule, Tag, Visibility};
pub use view::ElementView;
