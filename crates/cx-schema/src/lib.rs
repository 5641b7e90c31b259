//! # cx-schema
//!
//! JSON Schema generation, validation, and registry for cxgen.
//!
//! Model and config types derive `JsonSchema` in `cx-core` and `cx-config`.
//! This crate collects their schemas under stable names, validates JSON
//! values against them, and backs the `cxgen schema` command.

mod error;
mod registry;

pub use error::SchemaError;
pub use registry::SchemaRegistry;
